//! Liveness probe.

use axum::Json;

use super::super::types::HealthResponse;

/// GET /health - Unauthenticated liveness check.
pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
