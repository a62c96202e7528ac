//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Check errors
    #[error("Please enter some text to analyze.")]
    EmptyInput,

    #[error("Model files not found or could not be loaded: {message}")]
    ArtifactsUnavailable {
        message: String,
        remediation: Vec<String>,
    },

    #[error("Prediction error: {0}")]
    InferenceFailed(String),

    // Validation errors
    #[error("{0}")]
    ValidationError(String),

    // Generic errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::EmptyInput => "empty_input",
            AppError::ArtifactsUnavailable { .. } => "artifacts_unavailable",
            AppError::InferenceFailed(_) => "inference_failed",
            AppError::ValidationError(_) => "validation_error",
            AppError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, severity) = match &self {
            AppError::EmptyInput => (StatusCode::UNPROCESSABLE_ENTITY, "warning"),
            AppError::ArtifactsUnavailable { message, .. } => {
                tracing::error!("Artifacts unavailable: {}", message);
                (StatusCode::SERVICE_UNAVAILABLE, "error")
            }
            AppError::InferenceFailed(msg) => {
                tracing::warn!("Inference failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "error")
            }
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "error"),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "error")
            }
        };

        let remediation = match &self {
            AppError::ArtifactsUnavailable { remediation, .. } => remediation.clone(),
            _ => Vec::new(),
        };

        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
            "severity": severity,
            "remediation": remediation,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
