//! GET /health — static liveness check.

use axum::Json;
use chrono::Utc;
use serde::Serialize;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "soberstride-api";

/// Response payload for /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always true; the endpoint never fails.
    pub ok: bool,
    /// Service identifier.
    pub service: &'static str,
    /// Current server time, RFC3339.
    pub ts: String,
}

/// Handler: GET /health
///
/// No inputs, no side effects; reports service metadata regardless of the
/// state of the advice generator or the persistence sink.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: SERVICE_NAME,
        ts: Utc::now().to_rfc3339(),
    })
}
