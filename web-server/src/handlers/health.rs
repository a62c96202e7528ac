//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    artifacts_loaded: bool,
    timestamp: i64,
}

/// Liveness; a failed artifact load reports "degraded" but still answers
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let loaded = state.loader.is_loaded();
    Json(HealthResponse {
        status: if loaded { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        artifacts_loaded: loaded,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
