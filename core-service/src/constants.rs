//! Central Configuration Constants
//!
//! Single source of truth for artifact names and history defaults.

/// Default directory holding the model artifacts
pub const DEFAULT_MODEL_DIR: &str = ".";

/// Default classifier artifact file name
pub const DEFAULT_MODEL_FILE: &str = "ensemble_fake_news_model.json";

/// Default vectorizer artifact file name
pub const DEFAULT_VECTORIZER_FILE: &str = "tfidf_vectorizer.json";

/// Max entries a session history keeps in memory
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Number of history entries surfaced to the page
pub const HISTORY_DISPLAY_WINDOW: usize = 5;

/// Characters of input text shown in a history preview
pub const HISTORY_PREVIEW_CHARS: usize = 50;

/// Allowed deviation of a probability vector's sum from 1.0
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Crate version
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
