//! Health check endpoints for external orchestration
//!
//! - `/health-check` - Liveness: Is the process alive and serving HTTP?
//! - `/ready-check` - Readiness: Do all registered probes report ready?

use crate::server::readiness::ReadinessState;
use axum::{extract::State, http::StatusCode, routing::get, Router};

/// Liveness endpoint path
pub const HEALTH_CHECK_PATH: &str = "/health-check";

/// Readiness endpoint path
pub const READY_CHECK_PATH: &str = "/ready-check";

/// Liveness probe handler
///
/// Always returns 200 OK - if this responds, the process is alive.
async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe handler
///
/// Returns 200 OK if ready, 503 Service Unavailable if not. Reads the stored
/// result of the last evaluation pass and never runs a probe itself.
async fn ready_check(State(readiness): State<ReadinessState>) -> StatusCode {
    if readiness.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Build the router for the health endpoints
///
/// Each health check owns its router, so several instances can coexist in one
/// process.
pub fn build_router(readiness: ReadinessState) -> Router {
    Router::new()
        .route(HEALTH_CHECK_PATH, get(health_check))
        .route(READY_CHECK_PATH, get(ready_check))
        .with_state(readiness)
}
