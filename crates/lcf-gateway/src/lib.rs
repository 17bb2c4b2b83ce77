//! lcf-gateway
//!
//! Boundary to the external invoicing service.
//!
//! This crate owns the [`InvoiceGateway`] trait and one concrete
//! implementation, [`LightningChargeClient`], which speaks the Lightning
//! Charge REST API. Gateway `create` is **not** idempotent: every call makes a
//! new invoice exist at the service. Idempotency is layered on top by the
//! reconciliation engine through the ledger.

mod lightning_charge;

pub use lightning_charge::{LightningChargeClient, WireInvoice};

use std::fmt;

use async_trait::async_trait;
use lcf_schemas::{CreateInvoiceRequest, Invoice};

/// Errors an [`InvoiceGateway`] implementation may return.
///
/// A missing invoice is not an error: [`InvoiceGateway::fetch`] answers
/// `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Network or transport failure.
    Transport(String),
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The service answered with a non-success status.
    Api { status: u16, message: String },
    /// A response payload could not be decoded.
    Decode(String),
    /// The client is misconfigured (bad base URL, unusable TLS setup, ...).
    Config(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(msg) => write!(f, "gateway transport error: {msg}"),
            GatewayError::Timeout => write!(f, "gateway request timed out"),
            GatewayError::Api { status, message } => {
                write!(f, "gateway api error status={status}: {message}")
            }
            GatewayError::Decode(msg) => write!(f, "gateway decode error: {msg}"),
            GatewayError::Config(msg) => write!(f, "gateway config error: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {}

/// External invoicing service contract.
///
/// Implementations must be object-safe and `Send + Sync` so the engine can
/// hold an `Arc<dyn InvoiceGateway>` across request tasks.
#[async_trait]
pub trait InvoiceGateway: Send + Sync {
    /// Human-readable name of the backing service (e.g. `"lightning-charge"`).
    fn name(&self) -> &'static str;

    /// Create a new invoice. Each call creates a distinct invoice.
    async fn create(&self, req: &CreateInvoiceRequest) -> Result<Invoice, GatewayError>;

    /// Fetch an invoice by id; `Ok(None)` when the service does not know it.
    async fn fetch(&self, id: &str) -> Result<Option<Invoice>, GatewayError>;
}
