//! Liveness, readiness and metrics endpoints (no auth)

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use super::AppState;
use crate::observability::metrics::{gather_metrics, metrics_content_type};

/// `GET /healthz` - the process is up
pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /readyz` - the server is accepting requests
///
/// A sealed vault is still ready: unseal goes through this same server.
pub async fn readyz(State(state): State<AppState>) -> Json<serde_json::Value> {
    let status = state.store.status().await;
    Json(json!({
        "status": "ready",
        "vault": status.as_str(),
        "initialized": status.initialized,
    }))
}

/// `GET /metrics` - Prometheus text format
pub async fn metrics() -> Response {
    match gather_metrics() {
        Ok(body) => ([(CONTENT_TYPE, metrics_content_type())], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
