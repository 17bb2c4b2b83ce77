//! lcf-fingerprint
//!
//! Identity hasher: turns a [`PaymentContext`] into a stable [`Fingerprint`].
//!
//! # Canonical form
//!
//! The context is written as compact JSON with a fixed member order:
//!
//! ```text
//! type, entity_type, bundle, entity, view_mode, field_name, uid | (ip, session)
//! ```
//!
//! and the SHA-256 of that string is hex-encoded. The order comes from
//! [`members`], never from caller input, so the result does not depend on how
//! the context was assembled. Labels, amount and currency are not part of the
//! canonical form.
//!
//! `type` leads the list, ahead of the documented entity order that starts at
//! `entity_type`. Stored ledger hashes depend on that position.
//!
//! The same members (plus `hash`) become the invoice metadata, which is how
//! downstream consumers correlate a paid invoice back to the field it unlocks.

use std::collections::BTreeMap;

use lcf_schemas::{
    Fingerprint, Identity, PaymentContext, FIELD_TYPE, META_BUNDLE, META_ENTITY,
    META_ENTITY_TYPE, META_FIELD_NAME, META_HASH, META_IP, META_SESSION, META_TYPE, META_UID,
    META_VIEW_MODE,
};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hashed members of `ctx`, in canonical order.
pub fn members(ctx: &PaymentContext) -> Vec<(&'static str, &str)> {
    let mut out = vec![
        (META_TYPE, FIELD_TYPE),
        (META_ENTITY_TYPE, ctx.entity_type.as_str()),
        (META_BUNDLE, ctx.bundle.as_str()),
        (META_ENTITY, ctx.entity.as_str()),
        (META_VIEW_MODE, ctx.view_mode.as_str()),
        (META_FIELD_NAME, ctx.field_name.as_str()),
    ];
    match &ctx.identity {
        Identity::Authenticated { uid } => out.push((META_UID, uid.as_str())),
        Identity::Anonymous { ip, session } => {
            out.push((META_IP, ip.as_str()));
            out.push((META_SESSION, session.as_str()));
        }
    }
    out
}

/// Canonical JSON the fingerprint is computed over.
pub fn canonical_json(ctx: &PaymentContext) -> String {
    let mut out = String::from("{");
    for (i, (key, value)) in members(ctx).into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&json_string(key));
        out.push(':');
        out.push_str(&json_string(value));
    }
    out.push('}');
    out
}

/// Deterministic fingerprint of a payment context.
pub fn fingerprint(ctx: &PaymentContext) -> Fingerprint {
    Fingerprint::from_hex(sha256_hex(canonical_json(ctx).as_bytes()))
}

/// Metadata attached to an invoice created for `ctx`, including the `hash`
/// correlation token.
pub fn invoice_metadata(ctx: &PaymentContext, fp: &Fingerprint) -> BTreeMap<String, String> {
    let mut m: BTreeMap<String, String> = members(ctx)
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    m.insert(META_HASH.to_string(), fp.as_str().to_string());
    m
}

/// JSON string literal with serde_json's escaping.
fn json_string(s: &str) -> String {
    Value::from(s).to_string()
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
