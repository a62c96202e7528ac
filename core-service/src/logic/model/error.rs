//! Error types for artifact loading and inference.

use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// ARTIFACT LOAD ERRORS
// ============================================================================

/// Failure to bring the classifier or vectorizer into memory.
///
/// Non-fatal: the loader caches it and callers switch to an error display
/// instead of attempting inference.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArtifactLoadError {
    #[error("artifact not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot read artifact {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("artifact {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("artifact {} is invalid: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

impl ArtifactLoadError {
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path }
            | Self::Unreadable { path, .. }
            | Self::Corrupt { path, .. }
            | Self::Invalid { path, .. } => path,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Unreadable { .. } => "unreadable",
            Self::Corrupt { .. } => "corrupt",
            Self::Invalid { .. } => "invalid",
        }
    }

    /// Steps an operator can take to fix the load
    pub fn remediation(&self, model_file: &str, vectorizer_file: &str) -> Vec<String> {
        let dir = self
            .path()
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ".".to_string());
        vec![
            format!(
                "Make sure both '{}' and '{}' are in '{}'",
                model_file, vectorizer_file, dir
            ),
            "Check that the server process has permission to read these files".to_string(),
            "Check that the files aren't corrupted (re-export them if unsure)".to_string(),
        ]
    }
}

// ============================================================================
// INFERENCE ERRORS
// ============================================================================

/// Failure while scoring one text. The loaded artifacts stay usable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("feature vector has {actual} columns, classifier expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("class probabilities unavailable: {0}")]
    ProbabilitiesUnavailable(String),

    #[error("malformed probability vector: {0}")]
    MalformedProbabilities(String),

    #[error("classifier predicted label {0}, expected 0 or 1")]
    UnexpectedLabel(i64),

    #[error("text transform failed: {0}")]
    Transform(String),
}
