//! lcf-testkit
//!
//! In-memory stand-ins for the ledger and the invoicing service, plus
//! fixtures for the contexts and invoices the scenario tests keep building.

mod gateway;
mod ledger;

pub use gateway::FakeGateway;
pub use ledger::InMemoryLedger;

use std::collections::BTreeMap;

use lcf_schemas::{Amount, Identity, Invoice, InvoiceStatus, PaymentContext, Price};

/// `node` / `article` / `42` / `full` / `field_pay` for an authenticated user.
pub fn article_context(uid: &str) -> PaymentContext {
    PaymentContext {
        entity_type: "node".to_string(),
        bundle: "article".to_string(),
        entity: "42".to_string(),
        view_mode: "full".to_string(),
        field_name: "field_pay".to_string(),
        identity: Identity::user(uid),
        entity_label: "My article".to_string(),
        field_label: "Pay".to_string(),
    }
}

/// Same field as [`article_context`], for an anonymous visitor.
pub fn anonymous_article_context(ip: &str, session: &str) -> PaymentContext {
    PaymentContext {
        identity: Identity::anonymous(ip, session),
        ..article_context("0")
    }
}

/// Fixed price from a decimal string. Panics on malformed input.
pub fn price(amount: &str, currency: &str) -> Price {
    match Amount::parse(amount) {
        Ok(a) => Price::fixed(a, currency),
        Err(e) => panic!("bad test amount {amount:?}: {e}"),
    }
}

/// Invoice as the service would report it, with the given fingerprint in
/// its `hash` metadata.
pub fn invoice(id: &str, price: &Price, status: InvoiceStatus, hash: &str) -> Invoice {
    let (amount, currency) = match price {
        Price::Fixed { amount, currency } => (Some(*amount), Some(currency.clone())),
        Price::Donation => (None, None),
    };
    let mut metadata = BTreeMap::new();
    metadata.insert(lcf_schemas::META_TYPE.to_string(), lcf_schemas::FIELD_TYPE.to_string());
    metadata.insert(lcf_schemas::META_HASH.to_string(), hash.to_string());
    Invoice {
        id: id.to_string(),
        amount,
        currency,
        status,
        description: None,
        payreq: Some(format!("lnfake-{id}")),
        msatoshi: None,
        expires_at: None,
        paid_at: None,
        metadata,
    }
}

/// Full metadata (entity members, identity and hash) for `ctx`.
pub fn metadata_for(ctx: &PaymentContext) -> BTreeMap<String, String> {
    let fp = lcf_fingerprint::fingerprint(ctx);
    lcf_fingerprint::invoice_metadata(ctx, &fp)
}
