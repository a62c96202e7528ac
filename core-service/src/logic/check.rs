//! Check flow - one "Check Authenticity" submission
//!
//! Gates on artifact availability and blank input, runs inference, and
//! records successful results in the session history. Every failure comes
//! back as a [`CheckOutcome`] variant; nothing here panics or retries.

use super::history::{HistoryBuffer, HistoryEntry};
use super::model::{inference, ArtifactLoadError, ArtifactLoader, InferenceError, PredictionResult};

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Artifacts failed to load; inference is disabled
    ArtifactsUnavailable(ArtifactLoadError),
    /// Blank or whitespace-only text
    EmptyInput,
    /// Inference failed; history untouched
    Failed(InferenceError),
    /// Scored and appended to history
    Completed(PredictionResult),
}

impl CheckOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

pub fn check(text: &str, loader: &ArtifactLoader, history: &mut HistoryBuffer) -> CheckOutcome {
    let artifacts = match loader.load() {
        Ok(artifacts) => artifacts,
        Err(e) => return CheckOutcome::ArtifactsUnavailable(e),
    };

    if text.trim().is_empty() {
        return CheckOutcome::EmptyInput;
    }

    match inference::predict(text, artifacts.classifier(), artifacts.vectorizer()) {
        Ok(result) => {
            history.append(HistoryEntry::new(text, result.clone()));
            CheckOutcome::Completed(result)
        }
        Err(e) => CheckOutcome::Failed(e),
    }
}
