//! Configuration module

use std::env;
use std::path::PathBuf;

use newscheck_core::constants::{
    DEFAULT_HISTORY_CAPACITY, DEFAULT_MODEL_DIR, DEFAULT_MODEL_FILE, DEFAULT_VECTORIZER_FILE,
};
use newscheck_core::ArtifactPaths;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Directory holding the model artifacts
    pub model_dir: PathBuf,

    /// Classifier artifact file name
    pub model_file: String,

    /// Vectorizer artifact file name
    pub vectorizer_file: String,

    /// Max history entries kept per session
    pub history_capacity: usize,

    /// Sessions idle longer than this are dropped
    pub session_idle_minutes: i64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            model_dir: env::var("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_DIR)),

            model_file: env::var("MODEL_FILE")
                .unwrap_or_else(|_| DEFAULT_MODEL_FILE.to_string()),

            vectorizer_file: env::var("VECTORIZER_FILE")
                .unwrap_or_else(|_| DEFAULT_VECTORIZER_FILE.to_string()),

            history_capacity: env::var("HISTORY_CAPACITY")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(DEFAULT_HISTORY_CAPACITY),

            session_idle_minutes: env::var("SESSION_IDLE_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .filter(|m: &i64| *m > 0)
                .unwrap_or(60),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.model_dir, &self.model_file, &self.vectorizer_file)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            vectorizer_file: DEFAULT_VECTORIZER_FILE.to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            session_idle_minutes: 60,
            environment: "development".to_string(),
        }
    }
}
