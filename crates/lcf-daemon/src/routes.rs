//! Axum router and HTTP handlers for lcf-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Tests in `tests/` compose the bare router directly.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use lcf_gateway::WireInvoice;
use lcf_render::{metadata_schema, replace_command_for, selector, view_field};
use lcf_schemas::InvoiceStatus;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};

use crate::{
    api_types::{ErrorResponse, HealthResponse, HookResponse, ResolveRequest, ResolveResponse},
    state::{AppState, BusMsg},
};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/stream", get(stream))
        .route("/v1/fields/schema", get(field_schema))
        .route("/v1/fields/resolve", post(resolve_field))
        .route("/v1/hooks/invoice", post(invoice_hook))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
            config_hash: st.config_hash.clone(),
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/fields/schema
// ---------------------------------------------------------------------------

pub(crate) async fn field_schema() -> impl IntoResponse {
    (StatusCode::OK, Json(metadata_schema()))
}

// ---------------------------------------------------------------------------
// POST /v1/fields/resolve
// ---------------------------------------------------------------------------

/// Resolve the invoices for one field rendering and answer with the view the
/// host should draw. Resolution failures are folded into the view (hidden or
/// retry message) rather than surfaced as HTTP errors.
pub(crate) async fn resolve_field(
    State(st): State<Arc<AppState>>,
    Json(req): Json<ResolveRequest>,
) -> impl IntoResponse {
    let price = req.price.unwrap_or_else(|| st.defaults.price.clone());
    let outcome = st.engine.resolve_invoices(&req.context, &price).await;

    if let Err(e) = &outcome {
        warn!(
            entity_type = %req.context.entity_type,
            entity = %req.context.entity,
            field_name = %req.context.field_name,
            error = %e,
            "field resolution failed"
        );
    }

    let view = view_field(outcome.as_ref(), st.defaults.hide_on_error);
    let fingerprint = outcome.ok().map(|r| r.fingerprint);
    let selector = fingerprint.as_ref().map(selector);

    (
        StatusCode::OK,
        Json(ResolveResponse {
            fingerprint,
            selector,
            view,
        }),
    )
}

// ---------------------------------------------------------------------------
// POST /v1/hooks/invoice
// ---------------------------------------------------------------------------

/// Lightning Charge payment webhook.
///
/// The body is only trusted for the invoice id; status and metadata are
/// re-read from the gateway before anything is broadcast.
pub(crate) async fn invoice_hook(
    State(st): State<Arc<AppState>>,
    Json(body): Json<WireInvoice>,
) -> Response {
    let invoice = match st.engine.gateway().fetch(&body.id).await {
        Ok(Some(inv)) => inv,
        Ok(None) => {
            info!(invoice_id = %body.id, "webhook for unknown invoice");
            return (StatusCode::OK, Json(HookResponse { replaced: false })).into_response();
        }
        Err(e) => {
            warn!(invoice_id = %body.id, error = %e, "webhook invoice fetch failed");
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    if invoice.status != InvoiceStatus::Paid {
        return (StatusCode::OK, Json(HookResponse { replaced: false })).into_response();
    }

    let Some(cmd) = replace_command_for(&invoice) else {
        return (StatusCode::OK, Json(HookResponse { replaced: false })).into_response();
    };

    info!(invoice_id = %invoice.id, selector = %cmd.selector, "invoice paid; replace broadcast");
    let _ = st.bus.send(BusMsg::Replace(cmd));
    (StatusCode::OK, Json(HookResponse { replaced: true })).into_response()
}

// ---------------------------------------------------------------------------
// GET /v1/stream
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(
    rx: broadcast::Receiver<BusMsg>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(m) => {
                let data = serde_json::to_string(&m).ok()?;
                Some(Ok(Event::default().event(m.event_name()).data(data)))
            }
            Err(_) => None, // lagged
        }
    })
}
