//! Check handler

use axum::{extract::State, Json};
use validator::Validate;

use newscheck_core::{check, CheckOutcome};

use crate::{AppState, AppResult, AppError};
use crate::middleware::session::SessionContext;
use crate::models::{CheckRequest, CheckResponse, HistoryView, PredictionView};

/// Score submitted text and record it in the session history
pub async fn submit(
    State(state): State<AppState>,
    ctx: SessionContext,
    Json(req): Json<CheckRequest>,
) -> AppResult<Json<CheckResponse>> {
    req.validate()?;

    let mut history = ctx.session.history.lock();

    match check(&req.text, &state.loader, &mut history) {
        CheckOutcome::Completed(result) => {
            tracing::info!(
                "Session {} check: {} ({})",
                ctx.id(),
                result.label,
                result.confidence_percent()
            );
            Ok(Json(CheckResponse {
                result: PredictionView::from(&result),
                history: HistoryView::from(&*history),
            }))
        }
        CheckOutcome::EmptyInput => Err(AppError::EmptyInput),
        CheckOutcome::Failed(e) => Err(AppError::InferenceFailed(e.to_string())),
        CheckOutcome::ArtifactsUnavailable(e) => {
            let paths = state.loader.paths();
            Err(AppError::ArtifactsUnavailable {
                message: e.to_string(),
                remediation: e.remediation(&paths.model_file_name(), &paths.vectorizer_file_name()),
            })
        }
    }
}
