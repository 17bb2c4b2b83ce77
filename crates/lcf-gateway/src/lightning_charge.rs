//! Lightning Charge REST client.
//!
//! Endpoints used:
//! - `POST {base}/invoice`     → 201 + invoice JSON
//! - `GET  {base}/invoice/:id` → 200 + invoice JSON | 404
//!
//! Invoice ids are opaque `[A-Za-z0-9_-]` tokens. Anything else is answered as
//! "not found" without a request, so a caller-supplied id can never address
//! another endpoint.
//!
//! Authentication is HTTP basic with user `api-token`. The token is passed in
//! by the caller (resolved from the environment at startup); do not log it.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lcf_schemas::{Amount, CreateInvoiceRequest, Invoice, InvoiceStatus};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{GatewayError, InvoiceGateway};

const BASIC_AUTH_USER: &str = "api-token";
const MAX_INVOICE_ID_LEN: usize = 128;

#[derive(Clone)]
pub struct LightningChargeClient {
    http: reqwest::Client,
    base: reqwest::Url,
    base_url: String,
    api_token: String,
}

impl std::fmt::Debug for LightningChargeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightningChargeClient")
            .field("base_url", &self.base_url)
            .field("api_token", &"<REDACTED>")
            .finish()
    }
}

impl LightningChargeClient {
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let base = reqwest::Url::parse(&base_url)
            .map_err(|e| GatewayError::Config(format!("invalid base url '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::Config(format!("invalid base url '{base_url}'")));
        }
        Ok(Self {
            http,
            base,
            base_url,
            api_token: api_token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn invoice_url(&self) -> Result<reqwest::Url, GatewayError> {
        self.url_with(&["invoice"])
    }

    fn invoice_by_id_url(&self, id: &str) -> Result<reqwest::Url, GatewayError> {
        self.url_with(&["invoice", id])
    }

    fn url_with(&self, segments: &[&str]) -> Result<reqwest::Url, GatewayError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Config(format!("invalid base url '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn create_body(req: &CreateInvoiceRequest) -> Value {
        let mut body = Map::new();
        body.insert("description".into(), Value::String(req.description.clone()));
        // Priceless invoices omit both fields; the payer picks the amount.
        if let (Some(amount), Some(currency)) = (&req.amount, &req.currency) {
            body.insert("amount".into(), Value::String(amount.to_string()));
            body.insert("currency".into(), Value::String(currency.clone()));
        }
        let metadata: Map<String, Value> = req
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        body.insert("metadata".into(), Value::Object(metadata));
        if let Some(expiry) = req.expiry_secs {
            body.insert("expiry".into(), Value::from(expiry));
        }
        if let Some(webhook) = &req.webhook {
            body.insert("webhook".into(), Value::String(webhook.clone()));
        }
        Value::Object(body)
    }
}

#[async_trait]
impl InvoiceGateway for LightningChargeClient {
    fn name(&self) -> &'static str {
        "lightning-charge"
    }

    async fn create(&self, req: &CreateInvoiceRequest) -> Result<Invoice, GatewayError> {
        let resp = self
            .http
            .post(self.invoice_url()?)
            .basic_auth(BASIC_AUTH_USER, Some(&self.api_token))
            .json(&Self::create_body(req))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(api_error(resp).await);
        }

        let wire: WireInvoice = resp.json().await.map_err(map_reqwest_error)?;
        let invoice = wire.into_invoice()?;
        tracing::debug!(invoice_id = %invoice.id, "lightning charge invoice created");
        Ok(invoice)
    }

    async fn fetch(&self, id: &str) -> Result<Option<Invoice>, GatewayError> {
        if !is_invoice_id(id) {
            tracing::debug!(invoice_id = id, "malformed invoice id; treated as not found");
            return Ok(None);
        }
        let resp = self
            .http
            .get(self.invoice_by_id_url(id)?)
            .basic_auth(BASIC_AUTH_USER, Some(&self.api_token))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(resp).await);
        }

        let wire: WireInvoice = resp.json().await.map_err(map_reqwest_error)?;
        wire.into_invoice().map(Some)
    }
}

fn is_invoice_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_INVOICE_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn map_reqwest_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_builder() {
        GatewayError::Config(e.to_string())
    } else if e.is_decode() {
        GatewayError::Decode(e.to_string())
    } else {
        GatewayError::Transport(e.to_string())
    }
}

async fn api_error(resp: reqwest::Response) -> GatewayError {
    let status = resp.status().as_u16();
    let mut message = resp.text().await.unwrap_or_default();
    if message.len() > 256 {
        let mut cut = 256;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }
    if message.trim().is_empty() {
        message = "no body".to_string();
    }
    GatewayError::Api { status, message }
}

/// Invoice JSON as emitted by Lightning Charge, both in API responses and in
/// webhook callbacks.
#[derive(Debug, Clone, Deserialize)]
pub struct WireInvoice {
    pub id: String,
    #[serde(default)]
    pub msatoshi: Option<Value>,
    #[serde(default)]
    pub quoted_currency: Option<String>,
    #[serde(default)]
    pub quoted_amount: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payreq: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub paid_at: Option<i64>,
    /// Older servers report `completed` instead of `status`.
    #[serde(default)]
    pub completed: Option<bool>,
}

impl WireInvoice {
    pub fn into_invoice(self) -> Result<Invoice, GatewayError> {
        self.into_invoice_at(Utc::now())
    }

    fn into_invoice_at(self, now: DateTime<Utc>) -> Result<Invoice, GatewayError> {
        let amount = match scalar_to_string(self.quoted_amount.as_ref()) {
            Some(raw) => Some(Amount::parse(&raw).map_err(|e| {
                GatewayError::Decode(format!("invoice {} quoted_amount: {e}", self.id))
            })?),
            None => None,
        };
        let currency = self.quoted_currency.filter(|c| !c.trim().is_empty());

        let expires_at = self.expires_at.and_then(|s| DateTime::<Utc>::from_timestamp(s, 0));
        let paid_at = self.paid_at.and_then(|s| DateTime::<Utc>::from_timestamp(s, 0));

        let status = match self.status.as_deref() {
            Some(s) => InvoiceStatus::parse(s),
            None if self.completed == Some(true) || paid_at.is_some() => InvoiceStatus::Paid,
            None if expires_at.map(|t| t <= now).unwrap_or(false) => InvoiceStatus::Expired,
            None => InvoiceStatus::Unpaid,
        };

        let mut metadata = BTreeMap::new();
        if let Some(Value::Object(map)) = self.metadata {
            for (k, v) in map {
                let s = match v {
                    Value::String(s) => s,
                    Value::Null => continue,
                    other => other.to_string(),
                };
                metadata.insert(k, s);
            }
        }

        Ok(Invoice {
            id: self.id,
            amount,
            currency,
            status,
            description: self.description,
            payreq: self.payreq,
            msatoshi: scalar_to_string(self.msatoshi.as_ref()),
            expires_at,
            paid_at,
            metadata,
        })
    }
}

/// Strings and numbers as text; null/empty/other shapes as `None`.
fn scalar_to_string(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcf_schemas::Price;
    use serde_json::json;

    fn wire(v: Value) -> WireInvoice {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn decodes_full_invoice() {
        let inv = wire(json!({
            "id": "inv_1",
            "msatoshi": "1234000",
            "quoted_currency": "USD",
            "quoted_amount": "5.00",
            "status": "unpaid",
            "payreq": "lnbc1...",
            "description": "Article Pay",
            "metadata": {"type": "lightning_charge_field", "entity": 42, "hash": "abc"},
            "expires_at": 1_700_000_000,
            "paid_at": null
        }))
        .into_invoice()
        .unwrap();

        assert_eq!(inv.id, "inv_1");
        assert_eq!(inv.amount, Some(Amount::parse("5").unwrap()));
        assert_eq!(inv.currency.as_deref(), Some("USD"));
        assert_eq!(inv.status, InvoiceStatus::Unpaid);
        assert_eq!(inv.metadata_value("entity"), Some("42"));
        assert_eq!(inv.metadata_value("hash"), Some("abc"));
        assert_eq!(inv.msatoshi.as_deref(), Some("1234000"));
        assert!(inv.expires_at.is_some());
    }

    #[test]
    fn decodes_satoshi_precision_btc_quote() {
        let inv = wire(json!({
            "id": "inv_btc",
            "quoted_currency": "BTC",
            "quoted_amount": "0.00001000",
            "status": "unpaid"
        }))
        .into_invoice()
        .unwrap();
        assert_eq!(inv.amount, Some(Amount::parse("0.00001").unwrap()));
        assert_eq!(inv.currency.as_deref(), Some("BTC"));
    }

    #[test]
    fn priceless_invoice_has_no_amount() {
        let inv = wire(json!({"id": "inv_2", "status": "unpaid"}))
            .into_invoice()
            .unwrap();
        assert!(inv.amount.is_none());
        assert!(inv.currency.is_none());
    }

    #[test]
    fn legacy_status_is_derived() {
        let now = DateTime::<Utc>::from_timestamp(2_000, 0).unwrap();

        let paid = wire(json!({"id": "a", "completed": true}))
            .into_invoice_at(now)
            .unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);

        let expired = wire(json!({"id": "b", "expires_at": 1_000}))
            .into_invoice_at(now)
            .unwrap();
        assert_eq!(expired.status, InvoiceStatus::Expired);

        let open = wire(json!({"id": "c", "expires_at": 3_000}))
            .into_invoice_at(now)
            .unwrap();
        assert_eq!(open.status, InvoiceStatus::Unpaid);
    }

    #[test]
    fn bad_amount_is_decode_error() {
        let err = wire(json!({"id": "d", "quoted_amount": "five"}))
            .into_invoice()
            .unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn create_body_omits_price_for_donation() {
        let mut meta = BTreeMap::new();
        meta.insert("hash".to_string(), "abc".to_string());
        let req = CreateInvoiceRequest::new("desc", &Price::Donation, meta);
        let body = LightningChargeClient::create_body(&req);
        assert!(body.get("amount").is_none());
        assert!(body.get("currency").is_none());
        assert_eq!(body["metadata"]["hash"], "abc");
        assert!(body.get("expiry").is_none());
    }

    #[test]
    fn invoice_ids_are_single_safe_segments() {
        assert!(is_invoice_id("inv_1"));
        assert!(is_invoice_id("Xk3-p_9"));
        for bad in ["", "..", "../info", "a/b", "a%2Fb", "a?b", "a b", "é"] {
            assert!(!is_invoice_id(bad), "{bad:?} accepted");
        }
    }

    #[test]
    fn urls_keep_base_path() {
        let c = LightningChargeClient::new("http://x/charge/", "t", Duration::from_secs(1)).unwrap();
        assert_eq!(c.invoice_url().unwrap().as_str(), "http://x/charge/invoice");
        assert_eq!(
            c.invoice_by_id_url("inv_1").unwrap().as_str(),
            "http://x/charge/invoice/inv_1"
        );
        let root = LightningChargeClient::new("http://x", "t", Duration::from_secs(1)).unwrap();
        assert_eq!(root.invoice_url().unwrap().as_str(), "http://x/invoice");
    }

    #[test]
    fn unparseable_base_url_is_config_error() {
        let err = LightningChargeClient::new("not a url", "t", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn debug_redacts_token() {
        let c = LightningChargeClient::new("http://x/", "tok-secret", Duration::from_secs(1))
            .unwrap();
        assert!(!format!("{c:?}").contains("tok-secret"));
        assert_eq!(c.base_url(), "http://x");
    }
}
