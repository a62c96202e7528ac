//! Model Module - Artifact Loading & Inference Engine
//!
//! Separates the artifact formats from the inference flow so a different
//! vectorizer or classifier kind can be swapped in without touching callers.

pub mod error;
pub mod vectorizer;
pub mod classifier;
pub mod artifacts;
pub mod inference;


// Re-export common types
pub use error::{ArtifactLoadError, InferenceError};
pub use vectorizer::{FeatureVector, TextVectorizer, TfidfVectorizer, VectorizerArtifact};
pub use classifier::{BinaryClassifier, ClassifierArtifact};
pub use artifacts::{ArtifactLoader, ArtifactMetadata, ArtifactPaths, LoadedArtifacts, LoaderStatus};
pub use inference::{EngineStats, PredictionResult, Verdict};
