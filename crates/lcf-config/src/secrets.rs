//! Runtime secret resolution.
//!
//! Config YAML stores the env var NAME of the Lightning Charge token
//! (`gateway.api_token_env`). The value is read once at startup and handed to
//! the gateway constructor. Errors name the variable, never the value.

use anyhow::{bail, Result};

use crate::GatewaySettings;

/// The Lightning Charge API token. **Redacted in `Debug` output.**
#[derive(Clone)]
pub struct GatewayToken(String);

impl GatewayToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for GatewayToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GatewayToken(<REDACTED>)")
    }
}

/// Read the gateway token from the env var named in `settings.api_token_env`.
pub fn resolve_gateway_token(settings: &GatewaySettings) -> Result<GatewayToken> {
    let name = settings.api_token_env.trim();
    if name.is_empty() {
        bail!("SECRETS_MISSING: gateway.api_token_env is empty");
    }
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(GatewayToken(v)),
        _ => bail!(
            "SECRETS_MISSING: required env var '{}' (gateway api token) is not set or empty",
            name
        ),
    }
}
