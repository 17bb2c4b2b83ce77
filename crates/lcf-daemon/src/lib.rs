//! lcf-daemon library target.
//!
//! Exposes the router, state and boot wiring for integration tests. The
//! binary `main.rs` depends on this library target.

pub mod api_types;
pub mod boot;
pub mod routes;
pub mod state;
