//! Per-invoice decisions made while resolving a fingerprint.
//!
//! Pure functions: no IO, no clock.

use lcf_schemas::{Invoice, Price};

/// Does `invoice` satisfy the requested `price`?
///
/// Donation mode accepts any invoice linked to the fingerprint. A fixed price
/// requires the same currency and the same amount, compared numerically
/// (`5` == `5.00`). A priceless invoice never satisfies a fixed price.
pub fn price_matches(invoice: &Invoice, price: &Price) -> bool {
    match price {
        Price::Donation => true,
        Price::Fixed { amount, currency } => {
            invoice.amount.as_ref() == Some(amount)
                && invoice.currency.as_deref() == Some(currency.as_str())
        }
    }
}

/// Does a matching invoice make creating a new one unnecessary?
///
/// Only `Unpaid` and `Paid` do. `Expired` (and any status we do not
/// interpret) is kept in the result but superseded by a fresh invoice.
pub fn suppresses_creation(invoice: &Invoice) -> bool {
    invoice.status.is_live()
}
