//! Request and response types for the lcf-daemon HTTP endpoints.
//!
//! No business logic lives here.

use lcf_render::FieldView;
use lcf_schemas::{Fingerprint, PaymentContext, Price};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
    pub config_hash: Option<String>,
}

/// Body of `POST /v1/fields/resolve`.
///
/// The host passes the payer identity explicitly inside `context`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub context: PaymentContext,
    /// Overrides the configured price for this field.
    #[serde(default)]
    pub price: Option<Price>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveResponse {
    /// Absent when resolution failed.
    pub fingerprint: Option<Fingerprint>,
    pub selector: Option<String>,
    pub view: FieldView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookResponse {
    pub replaced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
