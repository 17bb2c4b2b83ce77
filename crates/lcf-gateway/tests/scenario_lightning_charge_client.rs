//! Scenario: LightningChargeClient against a mocked Lightning Charge server.
//!
//! GREEN when:
//! - create POSTs /invoice with basic auth and decodes the 201 body.
//! - donation creates send neither amount nor currency.
//! - fetch maps 404 to `Ok(None)` and 401 to `GatewayError::Api`.
//! - a slow server surfaces as `GatewayError::Timeout`.
//! - an id that is not a plain token never reaches the server.

use std::collections::BTreeMap;
use std::time::Duration;

use httpmock::prelude::*;
use lcf_gateway::{GatewayError, InvoiceGateway, LightningChargeClient};
use lcf_schemas::{Amount, CreateInvoiceRequest, InvoiceStatus, Price};
use serde_json::json;

const TOKEN: &str = "tok-123";
// base64("api-token:tok-123")
const BASIC: &str = "Basic YXBpLXRva2VuOnRvay0xMjM=";

fn client(server: &MockServer) -> LightningChargeClient {
    LightningChargeClient::new(server.base_url(), TOKEN, Duration::from_secs(5)).unwrap()
}

fn meta() -> BTreeMap<String, String> {
    let mut m = BTreeMap::new();
    m.insert("type".to_string(), "lightning_charge_field".to_string());
    m.insert("hash".to_string(), "abc".to_string());
    m
}

#[tokio::test]
async fn create_fixed_price_invoice() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/invoice")
                .header("authorization", BASIC)
                .json_body(json!({
                    "description": "Article Pay",
                    "amount": "5.00",
                    "currency": "USD",
                    "metadata": {"type": "lightning_charge_field", "hash": "abc"},
                    "expiry": 3600
                }));
            then.status(201).json_body(json!({
                "id": "inv_1",
                "msatoshi": "1000",
                "quoted_currency": "USD",
                "quoted_amount": "5.00",
                "status": "unpaid",
                "payreq": "lnbc1",
                "description": "Article Pay",
                "metadata": {"type": "lightning_charge_field", "hash": "abc"},
                "expires_at": 4_000_000_000i64
            }));
        })
        .await;

    let price = Price::fixed(Amount::parse("5.00").unwrap(), "USD");
    let mut req = CreateInvoiceRequest::new("Article Pay", &price, meta());
    req.expiry_secs = Some(3600);

    let inv = client(&server).create(&req).await.unwrap();
    mock.assert_async().await;

    assert_eq!(inv.id, "inv_1");
    assert_eq!(inv.status, InvoiceStatus::Unpaid);
    assert_eq!(inv.amount, Some(Amount::parse("5").unwrap()));
    assert_eq!(inv.metadata_value("hash"), Some("abc"));
}

#[tokio::test]
async fn create_donation_omits_amount_and_currency() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/invoice").json_body(json!({
                "description": "Article Tip",
                "metadata": {"type": "lightning_charge_field", "hash": "abc"}
            }));
            then.status(201)
                .json_body(json!({"id": "inv_d", "status": "unpaid", "metadata": {"hash": "abc"}}));
        })
        .await;

    let req = CreateInvoiceRequest::new("Article Tip", &Price::Donation, meta());
    let inv = client(&server).create(&req).await.unwrap();
    mock.assert_async().await;
    assert!(inv.amount.is_none());
}

#[tokio::test]
async fn fetch_known_and_unknown_invoices() {
    let server = MockServer::start_async().await;
    let paid = server
        .mock_async(|when, then| {
            when.method(GET).path("/invoice/inv_paid").header("authorization", BASIC);
            then.status(200).json_body(json!({
                "id": "inv_paid",
                "quoted_currency": "USD",
                "quoted_amount": 5,
                "status": "paid",
                "paid_at": 1_700_000_000
            }));
        })
        .await;
    let missing = server
        .mock_async(|when, then| {
            when.method(GET).path("/invoice/inv_gone");
            then.status(404).body("Not Found");
        })
        .await;

    let c = client(&server);
    let inv = c.fetch("inv_paid").await.unwrap().expect("invoice present");
    assert_eq!(inv.status, InvoiceStatus::Paid);
    assert!(inv.paid_at.is_some());
    assert_eq!(inv.amount, Some(Amount::parse("5.00").unwrap()));

    assert!(c.fetch("inv_gone").await.unwrap().is_none());

    paid.assert_async().await;
    missing.assert_async().await;
}

#[tokio::test]
async fn unauthorized_is_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/invoice/inv_1");
            then.status(401).body("Unauthorized");
        })
        .await;

    let err = client(&server).fetch("inv_1").await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::Api {
            status: 401,
            message: "Unauthorized".to_string()
        }
    );
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/invoice");
            then.status(201)
                .delay(Duration::from_millis(1_000))
                .json_body(json!({"id": "late", "status": "unpaid"}));
        })
        .await;

    let c = LightningChargeClient::new(server.base_url(), TOKEN, Duration::from_millis(100)).unwrap();
    let req = CreateInvoiceRequest::new("x", &Price::Donation, meta());
    let err = c.create(&req).await.unwrap_err();
    assert_eq!(err, GatewayError::Timeout);
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/invoice/bad");
            then.status(200).body("not json");
        })
        .await;

    let err = client(&server).fetch("bad").await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn path_like_ids_never_leave_the_invoice_route() {
    let server = MockServer::start_async().await;
    let info = server
        .mock_async(|when, then| {
            when.method(GET).path("/info");
            then.status(200)
                .json_body(json!({"id": "node-info", "status": "paid"}));
        })
        .await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET).path("/invoice");
            then.status(200)
                .json_body(json!({"id": "listing", "status": "paid"}));
        })
        .await;

    let c = client(&server);
    for id in ["../info", "..", "inv/../../info", "%2e%2e%2finfo"] {
        assert_eq!(c.fetch(id).await.unwrap(), None, "id {id:?}");
    }

    info.assert_hits_async(0).await;
    listing.assert_hits_async(0).await;
}
