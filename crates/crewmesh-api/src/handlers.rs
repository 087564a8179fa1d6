//! HTTP handlers.
//!
//! Every coordination operation arrives through the single `/rpc` endpoint
//! as a `{method, params}` envelope and is routed by the core dispatcher.
//! The remaining endpoints are read-only introspection.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crewmesh_protocols::error::CoordError;

use crate::state::AppState;

/// The `/rpc` request envelope.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// Wire method name, e.g. `"register"` or `"memory.create_entity"`.
    pub method: String,

    /// Method parameters. Absent and `null` both mean "no parameters".
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Error body returned for failed operations.
#[derive(Debug, Serialize)]
pub struct RpcErrorBody {
    pub error: RpcErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct RpcErrorDetail {
    /// Stable machine-readable kind, e.g. `"not_found"`.
    pub kind: &'static str,
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub requests_served: u64,
}

fn status_for(err: &CoordError) -> StatusCode {
    match err {
        CoordError::Validation(_) | CoordError::UnknownMethod(_) => StatusCode::BAD_REQUEST,
        CoordError::NotFound(_) => StatusCode::NOT_FOUND,
        CoordError::Conflict(_) => StatusCode::CONFLICT,
    }
}

fn error_response(err: CoordError) -> (StatusCode, Json<RpcErrorBody>) {
    let status = status_for(&err);
    (
        status,
        Json(RpcErrorBody {
            error: RpcErrorDetail {
                kind: err.kind(),
                message: err.to_string(),
            },
        }),
    )
}

/// Dispatch one coordination operation.
pub async fn rpc(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RpcRequest>,
) -> impl IntoResponse {
    state.increment_requests();
    debug!("rpc: {}", request.method);

    match state
        .coordinator
        .dispatch_raw(&request.method, request.params)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => {
            warn!("rpc {} failed: {}", request.method, err);
            error_response(err).into_response()
        }
    }
}

/// Liveness, version, uptime.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime().as_secs(),
        requests_served: state.request_count(),
    })
}

/// Aggregate counters, same payload as the `get_stats` method.
pub async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.coordinator.stats().await)
}

/// Full dump of the coordination collections, same as `dump_state`.
pub async fn dump(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.coordinator.dump().await)
}
