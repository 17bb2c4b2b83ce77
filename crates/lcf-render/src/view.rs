use lcf_reconcile::{Resolution, ResolveError};
use lcf_schemas::{Invoice, InvoiceStatus};
use serde::Serialize;

use crate::{wrapper_id, INVOICE_CLASS};

pub const UNAVAILABLE_MESSAGE: &str =
    "The field is not available at this time, please try again later.";

/// What a field formatter should draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldView {
    /// Resolution failed and the field is configured to hide on error.
    Hidden,
    /// Resolution failed; show a generic retry message.
    Unavailable { message: String },
    /// A linked invoice is paid; the payment widget is suppressed.
    Paid { invoice_id: String },
    /// Show the payment widget for `invoice` inside `wrapper_id`.
    Invoice {
        wrapper_id: String,
        class: String,
        invoice: Invoice,
    },
    /// Nothing to show (every linked invoice expired and none was created).
    Empty,
}

impl FieldView {
    pub fn is_paid(&self) -> bool {
        matches!(self, FieldView::Paid { .. })
    }
}

/// Map a resolution outcome onto a view.
///
/// Expired invoices are skipped. The first paid invoice wins outright;
/// otherwise the last remaining invoice is shown, which is the freshly
/// created one when the engine had to create.
pub fn view_field(outcome: Result<&Resolution, &ResolveError>, hide_on_error: bool) -> FieldView {
    let res = match outcome {
        Ok(res) => res,
        Err(_) if hide_on_error => return FieldView::Hidden,
        Err(_) => {
            return FieldView::Unavailable {
                message: UNAVAILABLE_MESSAGE.to_string(),
            }
        }
    };

    let mut shown: Option<&Invoice> = None;
    for invoice in &res.invoices {
        match invoice.status {
            InvoiceStatus::Expired => continue,
            InvoiceStatus::Paid => {
                return FieldView::Paid {
                    invoice_id: invoice.id.clone(),
                }
            }
            _ => shown = Some(invoice),
        }
    }

    match shown {
        Some(invoice) => FieldView::Invoice {
            wrapper_id: wrapper_id(&res.fingerprint),
            class: INVOICE_CLASS.to_string(),
            invoice: invoice.clone(),
        },
        None => FieldView::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcf_gateway::GatewayError;
    use lcf_schemas::Fingerprint;
    use lcf_testkit::{invoice, price};

    fn resolution(invoices: Vec<Invoice>) -> Resolution {
        Resolution {
            fingerprint: Fingerprint::from_hex("ff"),
            invoices,
            created: None,
        }
    }

    #[test]
    fn error_hides_or_apologises() {
        let err = ResolveError::Gateway(GatewayError::Timeout);
        assert_eq!(view_field(Err(&err), true), FieldView::Hidden);
        assert_eq!(
            view_field(Err(&err), false),
            FieldView::Unavailable {
                message: UNAVAILABLE_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn paid_wins_over_later_unpaid() {
        let p = price("1", "USD");
        let res = resolution(vec![
            invoice("a", &p, InvoiceStatus::Paid, "ff"),
            invoice("b", &p, InvoiceStatus::Unpaid, "ff"),
        ]);
        assert_eq!(
            view_field(Ok(&res), false),
            FieldView::Paid {
                invoice_id: "a".to_string()
            }
        );
    }

    #[test]
    fn last_unexpired_invoice_is_shown() {
        let p = price("1", "USD");
        let res = resolution(vec![
            invoice("old", &p, InvoiceStatus::Expired, "ff"),
            invoice("a", &p, InvoiceStatus::Unpaid, "ff"),
            invoice("b", &p, InvoiceStatus::Unpaid, "ff"),
            invoice("late", &p, InvoiceStatus::Expired, "ff"),
        ]);
        match view_field(Ok(&res), false) {
            FieldView::Invoice {
                wrapper_id,
                class,
                invoice,
            } => {
                assert_eq!(wrapper_id, "lightning-charge-field-ff");
                assert_eq!(class, INVOICE_CLASS);
                assert_eq!(invoice.id, "b");
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn only_expired_is_empty() {
        let p = price("1", "USD");
        let res = resolution(vec![invoice("old", &p, InvoiceStatus::Expired, "ff")]);
        assert_eq!(view_field(Ok(&res), true), FieldView::Empty);
    }

    #[test]
    fn view_serializes_with_kind_tag() {
        let v = serde_json::to_value(FieldView::Hidden).unwrap();
        assert_eq!(v["kind"], "hidden");
    }
}
