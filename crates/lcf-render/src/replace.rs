use lcf_schemas::{
    Fingerprint, Invoice, FIELD_TYPE, META_BUNDLE, META_ENTITY, META_ENTITY_TYPE,
    META_FIELD_NAME, META_HASH, META_TYPE, META_VIEW_MODE,
};
use serde::{Deserialize, Serialize};

use crate::selector;

/// Instruction for a browser to replace the payment widget of one field with
/// the field rendered for `entity_type`/`entity` in `view_mode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceCommand {
    pub selector: String,
    pub hash: String,
    pub invoice_id: String,
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
    pub entity: String,
    pub view_mode: String,
    pub field_name: String,
}

/// Build the replace command for an invoice created by this system.
///
/// `None` for invoices of any other type or missing one of the coordinates
/// needed to find the field again. Payment status is the caller's concern.
pub fn replace_command_for(invoice: &Invoice) -> Option<ReplaceCommand> {
    if invoice.metadata_value(META_TYPE) != Some(FIELD_TYPE) {
        return None;
    }
    let hash = invoice.metadata_value(META_HASH)?;
    let entity_type = invoice.metadata_value(META_ENTITY_TYPE)?;
    let entity = invoice.metadata_value(META_ENTITY)?;
    let view_mode = invoice.metadata_value(META_VIEW_MODE)?;
    let field_name = invoice.metadata_value(META_FIELD_NAME)?;

    Some(ReplaceCommand {
        selector: selector(&Fingerprint::from_hex(hash)),
        hash: hash.to_string(),
        invoice_id: invoice.id.clone(),
        entity_type: entity_type.to_string(),
        bundle: invoice.metadata_value(META_BUNDLE).map(str::to_string),
        entity: entity.to_string(),
        view_mode: view_mode.to_string(),
        field_name: field_name.to_string(),
    })
}
