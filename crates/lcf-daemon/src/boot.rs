//! Startup wiring: configuration, secrets, ledger pool and gateway client.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use lcf_config::{GatewaySettings, LoadedConfig, Settings};
use lcf_db::PgInvoiceLedger;
use lcf_gateway::LightningChargeClient;
use lcf_reconcile::ReconciliationEngine;
use tracing::info;

use crate::state::{AppState, FieldDefaults};

/// Comma-separated list of YAML layers, base first.
pub const ENV_CONFIG_PATHS: &str = "LCF_CONFIG_PATHS";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

/// Config layers named by `raw` (the value of [`ENV_CONFIG_PATHS`]), or the
/// default file when unset and present.
pub fn config_paths(raw: Option<&str>) -> Vec<String> {
    let listed: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if !listed.is_empty() {
        return listed;
    }
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        vec![DEFAULT_CONFIG_PATH.to_string()]
    } else {
        Vec::new()
    }
}

/// Explicit layers win; otherwise [`ENV_CONFIG_PATHS`], then the default file.
pub fn resolve_config_paths(explicit: &[String]) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    let raw = std::env::var(ENV_CONFIG_PATHS).ok();
    config_paths(raw.as_deref())
}

/// Load the layered config; no layers means all defaults.
pub fn load_config(paths: &[String]) -> Result<LoadedConfig> {
    if paths.is_empty() {
        return lcf_config::load_layered_yaml_from_strings(&[]);
    }
    let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    lcf_config::load_layered_yaml(&refs)
}

pub fn field_defaults(settings: &Settings) -> Result<FieldDefaults> {
    Ok(FieldDefaults {
        price: settings.field.effective_price()?,
        hide_on_error: settings.field.hide,
    })
}

/// Lightning Charge client with the token read from the environment.
pub fn gateway_client(settings: &GatewaySettings) -> Result<LightningChargeClient> {
    let token = lcf_config::resolve_gateway_token(settings)?;
    LightningChargeClient::new(
        settings.base_url.clone(),
        token.expose(),
        Duration::from_millis(settings.timeout_ms),
    )
    .context("failed to build lightning charge client")
}

/// Engine over the Postgres ledger and the Lightning Charge gateway.
///
/// Refuses to start when the ledger table is missing; run `lcf db migrate`.
pub async fn engine_from_env(settings: &Settings) -> Result<ReconciliationEngine> {
    let pool = lcf_db::connect_from_env().await?;
    let st = lcf_db::status(&pool).await?;
    if !st.has_ledger_table {
        bail!(
            "ledger table '{}' missing; run `lcf db migrate` first",
            lcf_db::TABLE_INVOICES
        );
    }

    let gateway = gateway_client(&settings.gateway)?;
    info!(base_url = gateway.base_url(), "lightning charge gateway configured");

    Ok(ReconciliationEngine::new(
        Arc::new(PgInvoiceLedger::new(pool)),
        Arc::new(gateway),
    )
    .with_webhook_url(settings.gateway.webhook_url.clone())
    .with_invoice_expiry(settings.gateway.invoice_expiry_secs))
}

/// Full daemon state from the environment.
pub async fn state_from_env() -> Result<AppState> {
    let paths = resolve_config_paths(&[]);
    let loaded = load_config(&paths)?;
    let settings = loaded.settings()?;
    info!(config_hash = %loaded.config_hash, layers = paths.len(), "config loaded");

    let defaults = field_defaults(&settings)?;
    let engine = engine_from_env(&settings).await?;
    Ok(AppState::new(engine, defaults).with_config_hash(loaded.config_hash))
}
