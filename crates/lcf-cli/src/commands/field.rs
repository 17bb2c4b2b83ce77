use anyhow::{Context, Result};
use lcf_daemon::boot;
use lcf_render::{selector, view_field};
use lcf_schemas::PaymentContext;

use super::PriceArgs;

/// Print the fingerprint of a context. No I/O.
pub fn fingerprint(ctx: &PaymentContext) {
    let fp = lcf_fingerprint::fingerprint(ctx);
    println!("fingerprint={}", fp);
    println!("selector={}", selector(&fp));
    println!("canonical={}", lcf_fingerprint::canonical_json(ctx));
}

/// Run the engine against Postgres and Lightning Charge and print the
/// resolution plus the view a formatter would draw.
pub async fn resolve(config_paths: &[String], ctx: &PaymentContext, price: &PriceArgs) -> Result<()> {
    let config_paths = boot::resolve_config_paths(config_paths);
    let loaded = boot::load_config(&config_paths)?;
    tracing::debug!(layers = config_paths.len(), config_hash = %loaded.config_hash, "config loaded");
    let settings = loaded.settings()?;
    let defaults = boot::field_defaults(&settings)?;
    let price = match price.price()? {
        Some(p) => p,
        None => defaults.price.clone(),
    };

    let engine = boot::engine_from_env(&settings).await?;
    let outcome = engine.resolve_invoices(ctx, &price).await;
    let view = view_field(outcome.as_ref(), defaults.hide_on_error);

    let res = outcome.context("resolve failed")?;
    let out = serde_json::json!({
        "config_hash": loaded.config_hash,
        "fingerprint": res.fingerprint,
        "selector": selector(&res.fingerprint),
        "created": res.created,
        "invoices": res.invoices,
        "view": view,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
