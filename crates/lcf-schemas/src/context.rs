use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Amount;

/// Who is asking to pay.
///
/// Anonymous payers are told apart by client IP *and* session id; an
/// authenticated payer is identified by user id alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    Authenticated { uid: String },
    Anonymous { ip: String, session: String },
}

impl Identity {
    pub fn user(uid: impl Into<String>) -> Self {
        Identity::Authenticated { uid: uid.into() }
    }

    pub fn anonymous(ip: impl Into<String>, session: impl Into<String>) -> Self {
        Identity::Anonymous {
            ip: ip.into(),
            session: session.into(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous { .. })
    }
}

/// The price requested for a field.
///
/// `Donation` creates priceless invoices and accepts any existing invoice for
/// the same fingerprint regardless of its amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Price {
    Fixed { amount: Amount, currency: String },
    Donation,
}

impl Price {
    pub fn fixed(amount: Amount, currency: impl Into<String>) -> Self {
        Price::Fixed {
            amount,
            currency: currency.into(),
        }
    }

    pub fn is_donation(&self) -> bool {
        matches!(self, Price::Donation)
    }
}

/// Everything that identifies one payable field rendering for one payer.
///
/// `entity_label` and `field_label` only feed the invoice description; they do
/// not participate in the fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentContext {
    pub entity_type: String,
    pub bundle: String,
    pub entity: String,
    pub view_mode: String,
    pub field_name: String,
    pub identity: Identity,
    #[serde(default)]
    pub entity_label: String,
    #[serde(default)]
    pub field_label: String,
}

impl PaymentContext {
    /// Invoice description shown to the payer: `"<entity label> <field label>"`.
    pub fn description(&self) -> String {
        format!("{} {}", self.entity_label, self.field_label)
            .trim()
            .to_string()
    }
}

/// Hex-encoded SHA-256 of a canonical [`PaymentContext`] serialization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already computed hex digest (e.g. read back from the ledger or
    /// from invoice metadata).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Fingerprint(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_joins_labels() {
        let ctx = PaymentContext {
            entity_type: "node".into(),
            bundle: "article".into(),
            entity: "42".into(),
            view_mode: "full".into(),
            field_name: "field_pay".into(),
            identity: Identity::user("7"),
            entity_label: "My article".into(),
            field_label: "Premium body".into(),
        };
        assert_eq!(ctx.description(), "My article Premium body");
    }

    #[test]
    fn identity_deserializes_untagged() {
        let a: Identity = serde_json::from_str(r#"{"uid":"7"}"#).unwrap();
        assert_eq!(a, Identity::user("7"));
        let b: Identity = serde_json::from_str(r#"{"ip":"10.0.0.1","session":"abc"}"#).unwrap();
        assert!(b.is_anonymous());
    }

    #[test]
    fn price_json_shape() {
        let p: Price =
            serde_json::from_str(r#"{"mode":"fixed","amount":"5.00","currency":"USD"}"#).unwrap();
        assert_eq!(p, Price::fixed(Amount::parse("5").unwrap(), "USD"));
        let d: Price = serde_json::from_str(r#"{"mode":"donation"}"#).unwrap();
        assert!(d.is_donation());
    }
}
