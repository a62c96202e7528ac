//! Fake News Detector - Core
//!
//! Loads the fitted classifier and TF-IDF vectorizer once per process,
//! scores news text as REAL or FAKE, and keeps a per-session history of
//! past checks.
//!
//! ```text
//!  text ──► check() ──► ArtifactLoader (cached once) ──► inference::predict()
//!                                                            │
//!              HistoryBuffer ◄──── PredictionResult ◄────────┘
//! ```

pub mod constants;
pub mod logic;

pub use logic::check::{check, CheckOutcome};
pub use logic::history::{HistoryBuffer, HistoryEntry};
pub use logic::model::{
    ArtifactLoadError, ArtifactLoader, ArtifactMetadata, ArtifactPaths, BinaryClassifier,
    EngineStats, FeatureVector, InferenceError, LoadedArtifacts, LoaderStatus, PredictionResult,
    TextVectorizer, Verdict,
};
