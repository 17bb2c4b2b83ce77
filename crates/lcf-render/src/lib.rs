//! lcf-render
//!
//! Adapters between a resolution and whatever draws the field:
//! - [`view_field`] decides what a formatter shows for one resolution.
//! - [`replace_command_for`] turns a paid invoice into the replace command a
//!   browser applies to swap the payment widget for the unlocked field.
//! - [`metadata_schema`] labels the invoice metadata this system writes.
//!
//! Nothing here produces markup; hosts do.

mod replace;
mod schema;
mod view;

pub use replace::{replace_command_for, ReplaceCommand};
pub use schema::{metadata_schema, MetadataSchema, TYPE_LABEL};
pub use view::{view_field, FieldView, UNAVAILABLE_MESSAGE};

use lcf_schemas::Fingerprint;

/// DOM id prefix of the element wrapping a field's invoice widget.
pub const WRAPPER_PREFIX: &str = "lightning-charge-field-";

/// CSS class on the invoice wrapper.
pub const INVOICE_CLASS: &str = "lightning-charge-field-invoice";

pub fn wrapper_id(fp: &Fingerprint) -> String {
    format!("{WRAPPER_PREFIX}{fp}")
}

/// CSS id selector for [`wrapper_id`].
pub fn selector(fp: &Fingerprint) -> String {
    format!("#{}", wrapper_id(fp))
}
