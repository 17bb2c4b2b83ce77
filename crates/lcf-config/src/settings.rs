//! Typed settings read from the merged configuration document.
//!
//! ```yaml
//! field:
//!   price_mode: custom        # custom | donation
//!   price:
//!     number: "5.00"
//!     currency_code: USD
//!   hide: false               # hide the field instead of showing an error
//! gateway:
//!   base_url: "http://127.0.0.1:9112"
//!   api_token_env: "LCF_CHARGE_TOKEN"
//!   timeout_ms: 10000
//!   invoice_expiry_secs: 3600
//!   webhook_url: "http://127.0.0.1:8898/v1/hooks/invoice"
//! ```

use anyhow::{Context, Result};
use lcf_schemas::{Amount, Price};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceMode {
    #[default]
    Custom,
    Donation,
}

impl PriceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceMode::Custom => "custom",
            PriceMode::Donation => "donation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriceMode::Custom => "Custom",
            PriceMode::Donation => "Donation",
        }
    }

    pub fn all() -> [PriceMode; 2] {
        [PriceMode::Custom, PriceMode::Donation]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceSetting {
    pub number: String,
    pub currency_code: String,
}

impl Default for PriceSetting {
    fn default() -> Self {
        Self {
            number: "0.00".to_string(),
            currency_code: "USD".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    pub price_mode: PriceMode,
    pub price: PriceSetting,
    pub hide: bool,
}

impl FieldSettings {
    /// The price every resolution call should request.
    ///
    /// Donation mode ignores the configured number entirely.
    pub fn effective_price(&self) -> Result<Price> {
        match self.price_mode {
            PriceMode::Donation => Ok(Price::Donation),
            PriceMode::Custom => {
                let amount = Amount::parse(&self.price.number)
                    .with_context(|| format!("invalid field.price.number '{}'", self.price.number))?;
                let currency = self.price.currency_code.trim().to_string();
                if currency.is_empty() {
                    anyhow::bail!("field.price.currency_code must not be empty in custom mode");
                }
                Ok(Price::Fixed { amount, currency })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub base_url: String,
    /// Name of the env var holding the Lightning Charge API token.
    pub api_token_env: String,
    pub timeout_ms: u64,
    pub invoice_expiry_secs: Option<u64>,
    pub webhook_url: Option<String>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9112".to_string(),
            api_token_env: "LCF_CHARGE_TOKEN".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            invoice_expiry_secs: None,
            webhook_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub field: FieldSettings,
    pub gateway: GatewaySettings,
}

impl Settings {
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        serde_json::from_value(config_json.clone()).context("config does not match settings schema")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_field_formatter_defaults() {
        let s = Settings::from_config_json(&json!({})).unwrap();
        assert_eq!(s.field.price_mode, PriceMode::Custom);
        assert_eq!(s.field.price.number, "0.00");
        assert_eq!(s.field.price.currency_code, "USD");
        assert!(!s.field.hide);
        assert_eq!(s.gateway.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn donation_mode_ignores_number() {
        let s = Settings::from_config_json(&json!({
            "field": {"price_mode": "donation", "price": {"number": "garbage", "currency_code": "USD"}}
        }))
        .unwrap();
        assert_eq!(s.field.effective_price().unwrap(), Price::Donation);
    }

    #[test]
    fn custom_mode_parses_price() {
        let s = Settings::from_config_json(&json!({
            "field": {"price": {"number": "5.00", "currency_code": "EUR"}}
        }))
        .unwrap();
        assert_eq!(
            s.field.effective_price().unwrap(),
            Price::fixed(Amount::parse("5").unwrap(), "EUR")
        );
    }

    #[test]
    fn custom_mode_accepts_btc_satoshi_price() {
        let s = Settings::from_config_json(&json!({
            "field": {"price": {"number": "0.00001000", "currency_code": "BTC"}}
        }))
        .unwrap();
        assert_eq!(
            s.field.effective_price().unwrap(),
            Price::fixed(Amount::parse("0.00001").unwrap(), "BTC")
        );
    }

    #[test]
    fn custom_mode_rejects_bad_number() {
        let s = Settings::from_config_json(&json!({
            "field": {"price": {"number": "-1", "currency_code": "USD"}}
        }))
        .unwrap();
        assert!(s.field.effective_price().is_err());
    }

    #[test]
    fn price_mode_labels() {
        let labels: Vec<_> = PriceMode::all().iter().map(|m| m.label()).collect();
        assert_eq!(labels, vec!["Custom", "Donation"]);
    }
}
