//! lcf-schemas
//!
//! Value types shared by every lcf crate: payment contexts, prices,
//! fingerprints, invoices and ledger rows. No I/O lives here.

mod amount;
mod context;
mod invoice;

pub use amount::{Amount, AmountError, AMOUNT_SCALE, UNITS_PER_WHOLE};
pub use context::{Fingerprint, Identity, PaymentContext, Price};
pub use invoice::{CreateInvoiceRequest, Invoice, InvoiceStatus, LedgerEntry};

/// Value of the `type` metadata key on every invoice this system creates.
pub const FIELD_TYPE: &str = "lightning_charge_field";

// Invoice metadata keys.
pub const META_TYPE: &str = "type";
pub const META_ENTITY_TYPE: &str = "entity_type";
pub const META_BUNDLE: &str = "bundle";
pub const META_ENTITY: &str = "entity";
pub const META_VIEW_MODE: &str = "view_mode";
pub const META_FIELD_NAME: &str = "field_name";
pub const META_UID: &str = "uid";
pub const META_IP: &str = "ip";
pub const META_SESSION: &str = "session";
pub const META_HASH: &str = "hash";
