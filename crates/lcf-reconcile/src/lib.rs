//! lcf-reconcile
//!
//! Reconciliation engine: fingerprint a payment context, look up the
//! invoices already issued for it, keep the ones that still match the
//! requested price, and create a fresh invoice when none of them is live.
//!
//! Decisions:
//! - Ledger rows are walked oldest first; the result keeps that order and the
//!   newly created invoice (if any) goes last.
//! - An invoice the service no longer knows is skipped silently.
//! - A price mismatch excludes the invoice but never deletes its ledger row.
//! - `Expired` invoices stay in the result and do not block creation.
//! - Failures propagate; nothing is retried here.

mod engine;
mod policy;

pub use engine::ReconciliationEngine;
pub use policy::{price_matches, suppresses_creation};

use std::fmt;

use lcf_db::StorageError;
use lcf_gateway::GatewayError;
use lcf_schemas::{Fingerprint, Invoice, InvoiceStatus};
use serde::Serialize;

/// Outcome of one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Needed by renderers to build the wrapper selector.
    pub fingerprint: Fingerprint,
    /// Matching invoices, oldest first, de-duplicated by id.
    pub invoices: Vec<Invoice>,
    /// Id of the invoice created by this call, if one was.
    pub created: Option<String>,
}

impl Resolution {
    pub fn created_invoice(&self) -> bool {
        self.created.is_some()
    }

    pub fn has_paid(&self) -> bool {
        self.invoices.iter().any(|i| i.status == InvoiceStatus::Paid)
    }
}

/// Why a resolution failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    Storage(StorageError),
    Gateway(GatewayError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Storage(e) => write!(f, "resolve failed: {e}"),
            ResolveError::Gateway(e) => write!(f, "resolve failed: {e}"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Storage(e) => Some(e),
            ResolveError::Gateway(e) => Some(e),
        }
    }
}

impl From<StorageError> for ResolveError {
    fn from(e: StorageError) -> Self {
        ResolveError::Storage(e)
    }
}

impl From<GatewayError> for ResolveError {
    fn from(e: GatewayError) -> Self {
        ResolveError::Gateway(e)
    }
}
