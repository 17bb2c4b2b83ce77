use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Amount, Fingerprint};

/// Invoice lifecycle as reported by the invoicing service.
///
/// Only `Unpaid`, `Paid` and `Expired` carry meaning for reconciliation; any
/// other status string is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
    Expired,
    Other(String),
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Expired => "expired",
            InvoiceStatus::Other(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "unpaid" => InvoiceStatus::Unpaid,
            "paid" => InvoiceStatus::Paid,
            "expired" => InvoiceStatus::Expired,
            other => InvoiceStatus::Other(other.to_string()),
        }
    }

    /// `Unpaid` and `Paid` invoices satisfy a fingerprint; anything else
    /// (notably `Expired`) must be supplemented by a fresh invoice.
    pub fn is_live(&self) -> bool {
        matches!(self, InvoiceStatus::Unpaid | InvoiceStatus::Paid)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InvoiceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InvoiceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(InvoiceStatus::parse(&raw))
    }
}

/// An invoice as seen through the gateway. Read-only from the core's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    /// Quoted amount; `None` for priceless (donation) invoices.
    pub amount: Option<Amount>,
    pub currency: Option<String>,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub description: Option<String>,
    /// BOLT11 payment request.
    #[serde(default)]
    pub payreq: Option<String>,
    #[serde(default)]
    pub msatoshi: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Invoice {
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(|s| s.as_str())
    }

    /// The fingerprint this invoice was created for, if it carries one.
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.metadata_value(crate::META_HASH)
            .map(Fingerprint::from_hex)
    }
}

/// Parameters for creating one invoice at the gateway.
///
/// `amount` and `currency` are either both present or both absent; the
/// constructor enforces that by taking a [`crate::Price`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateInvoiceRequest {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
}

impl CreateInvoiceRequest {
    pub fn new(
        description: impl Into<String>,
        price: &crate::Price,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        let (amount, currency) = match price {
            crate::Price::Fixed { amount, currency } => (Some(*amount), Some(currency.clone())),
            crate::Price::Donation => (None, None),
        };
        Self {
            description: description.into(),
            amount,
            currency,
            metadata,
            expiry_secs: None,
            webhook: None,
        }
    }
}

/// One row of the invoice ledger: fingerprint → external invoice id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub invoice_id: String,
    pub hash: Fingerprint,
    pub created_at: Option<DateTime<Utc>>,
}
