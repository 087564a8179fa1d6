//! # crewmesh API
//!
//! Thin HTTP transport over the coordination core:
//!
//! - `POST /rpc` — the `{method, params}` envelope for every operation
//! - `GET /health` — liveness, version, uptime
//! - `GET /stats` / `GET /dump` — introspection
//!
//! All coordination semantics live in `crewmesh-core`; this crate only
//! translates HTTP to dispatcher calls and error kinds to status codes.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use routes::create_router;
pub use server::{ApiConfig, ApiServer};
pub use state::AppState;
