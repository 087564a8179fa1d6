//! HTTP route definitions.
//!
//! ```text
//! POST /rpc     - {method, params} envelope, all coordination operations
//! GET  /health  - liveness, version, uptime
//! GET  /stats   - aggregate counters
//! GET  /dump    - full state dump (debugging)
//! ```

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the service router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rpc", post(handlers::rpc))
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .route("/dump", get(handlers::dump))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
