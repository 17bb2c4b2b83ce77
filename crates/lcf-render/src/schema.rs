use lcf_schemas::{
    FIELD_TYPE, META_BUNDLE, META_ENTITY, META_ENTITY_TYPE, META_FIELD_NAME, META_HASH, META_IP,
    META_SESSION, META_UID, META_VIEW_MODE,
};
use serde::Serialize;

/// Human label of the field invoice type.
pub const TYPE_LABEL: &str = "Lightning Charge Field";

/// Labels for the metadata keys an invoice of this type may carry, for
/// invoice listings and admin screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataSchema {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub label: &'static str,
    pub fields: Vec<(&'static str, &'static str)>,
}

impl MetadataSchema {
    pub fn label_for(&self, key: &str) -> Option<&'static str> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, l)| *l)
    }
}

pub fn metadata_schema() -> MetadataSchema {
    MetadataSchema {
        kind: FIELD_TYPE,
        label: TYPE_LABEL,
        fields: vec![
            (META_ENTITY_TYPE, "Entity Type"),
            (META_BUNDLE, "Bundle"),
            (META_ENTITY, "Entity"),
            (META_VIEW_MODE, "View Mode"),
            (META_FIELD_NAME, "Field"),
            (META_UID, "User"),
            (META_IP, "IP Address"),
            (META_SESSION, "Session"),
            (META_HASH, "Hash"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_identity_key_is_labelled() {
        let s = metadata_schema();
        assert_eq!(s.kind, "lightning_charge_field");
        assert_eq!(s.label_for("uid"), Some("User"));
        assert_eq!(s.label_for("ip"), Some("IP Address"));
        assert_eq!(s.label_for("hash"), Some("Hash"));
        assert_eq!(s.label_for("amount"), None);
    }
}
