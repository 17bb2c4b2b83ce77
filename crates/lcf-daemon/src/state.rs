//! Shared runtime state for lcf-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum.

use std::time::Duration;

use lcf_reconcile::ReconciliationEngine;
use lcf_render::ReplaceCommand;
use lcf_schemas::Price;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Messages broadcast over the internal event bus and surfaced as SSE events.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat { ts_millis: i64 },
    Replace(ReplaceCommand),
}

impl BusMsg {
    pub fn event_name(&self) -> &'static str {
        match self {
            BusMsg::Heartbeat { .. } => "heartbeat",
            BusMsg::Replace(_) => "replace",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Field defaults applied when a resolve request does not carry its own price.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDefaults {
    pub price: Price,
    pub hide_on_error: bool,
}

#[derive(Clone)]
pub struct AppState {
    /// Broadcast bus for SSE.
    pub bus: broadcast::Sender<BusMsg>,
    pub build: BuildInfo,
    pub engine: ReconciliationEngine,
    pub defaults: FieldDefaults,
    /// Hash of the effective configuration, when loaded from files.
    pub config_hash: Option<String>,
}

impl AppState {
    pub fn new(engine: ReconciliationEngine, defaults: FieldDefaults) -> Self {
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);
        Self {
            bus,
            build: BuildInfo {
                service: "lcf-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            engine,
            defaults,
            config_hash: None,
        }
    }

    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }
}

/// Spawn a background task that emits a heartbeat SSE every `interval`.
pub fn spawn_heartbeat(bus: broadcast::Sender<BusMsg>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ts = chrono::Utc::now().timestamp_millis();
            let _ = bus.send(BusMsg::Heartbeat { ts_millis: ts });
        }
    });
}
