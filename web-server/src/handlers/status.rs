//! Status handler

use axum::{extract::State, Json};

use newscheck_core::logic::model::inference;

use crate::AppState;
use crate::models::StatusResponse;

/// Artifact load state and engine counters
pub async fn get(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        artifacts: state.loader.status(),
        engine: inference::get_stats(),
        active_sessions: state.sessions.len(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
