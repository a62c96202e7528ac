//! Artifact Loader - one-time load of classifier + vectorizer
//!
//! The first `load()` reads both JSON artifacts from disk; the outcome,
//! success or failure, is cached for the lifetime of the loader. Loaded
//! artifacts are immutable and handed out as `Arc` so concurrent sessions
//! share them without locking.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{DEFAULT_MODEL_DIR, DEFAULT_MODEL_FILE, DEFAULT_VECTORIZER_FILE};
use super::classifier::{BinaryClassifier, ClassifierArtifact, ClassifierSpec};
use super::error::ArtifactLoadError;
use super::vectorizer::{TextVectorizer, VectorizerArtifact, VectorizerSpec};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Where the two artifacts live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub vectorizer: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: impl AsRef<Path>, model_file: &str, vectorizer_file: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(model_file),
            vectorizer: dir.join(vectorizer_file),
        }
    }

    pub fn model_file_name(&self) -> String {
        file_name(&self.model)
    }

    pub fn vectorizer_file_name(&self) -> String {
        file_name(&self.vectorizer)
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::in_dir(DEFAULT_MODEL_DIR, DEFAULT_MODEL_FILE, DEFAULT_VECTORIZER_FILE)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Artifact metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub model_path: String,
    pub vectorizer_path: String,
    pub model_sha256: String,
    pub vectorizer_sha256: String,
    pub classifier_kind: String,
    pub vectorizer_kind: String,
    pub n_features: usize,
    pub vocabulary_size: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Classifier and vectorizer ready for inference
pub struct LoadedArtifacts {
    classifier: Box<dyn BinaryClassifier>,
    vectorizer: Box<dyn TextVectorizer>,
    metadata: ArtifactMetadata,
}

impl LoadedArtifacts {
    pub fn new(
        classifier: Box<dyn BinaryClassifier>,
        vectorizer: Box<dyn TextVectorizer>,
        metadata: ArtifactMetadata,
    ) -> Self {
        Self { classifier, vectorizer, metadata }
    }

    pub fn classifier(&self) -> &dyn BinaryClassifier {
        self.classifier.as_ref()
    }

    pub fn vectorizer(&self) -> &dyn TextVectorizer {
        self.vectorizer.as_ref()
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }
}

impl std::fmt::Debug for LoadedArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedArtifacts")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Load state for the status endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoaderStatus {
    NotLoaded,
    Ready { metadata: ArtifactMetadata },
    Failed { code: String, error: String },
}

// ============================================================================
// LOADER
// ============================================================================

type LoadOutcome = Result<Arc<LoadedArtifacts>, ArtifactLoadError>;

/// Process-wide artifact cache
pub struct ArtifactLoader {
    paths: ArtifactPaths,
    cell: OnceCell<LoadOutcome>,
}

impl ArtifactLoader {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            cell: OnceCell::new(),
        }
    }

    /// Loader that already holds artifacts and never touches disk
    pub fn from_artifacts(artifacts: LoadedArtifacts) -> Self {
        Self {
            paths: ArtifactPaths::default(),
            cell: OnceCell::with_value(Ok(Arc::new(artifacts))),
        }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Load on first call, cached afterwards
    pub fn load(&self) -> Result<Arc<LoadedArtifacts>, ArtifactLoadError> {
        self.cell
            .get_or_init(|| match load_from_disk(&self.paths) {
                Ok(artifacts) => {
                    let meta = artifacts.metadata();
                    log::info!(
                        "Model artifacts loaded: {} ({} features, vocabulary {})",
                        meta.classifier_kind,
                        meta.n_features,
                        meta.vocabulary_size
                    );
                    Ok(Arc::new(artifacts))
                }
                Err(e) => {
                    log::error!("Error loading model files: {}", e);
                    Err(e)
                }
            })
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.cell.get(), Some(Ok(_)))
    }

    /// Current state without triggering a load
    pub fn status(&self) -> LoaderStatus {
        match self.cell.get() {
            None => LoaderStatus::NotLoaded,
            Some(Ok(artifacts)) => LoaderStatus::Ready {
                metadata: artifacts.metadata().clone(),
            },
            Some(Err(e)) => LoaderStatus::Failed {
                code: e.code().to_string(),
                error: e.to_string(),
            },
        }
    }
}

// ============================================================================
// DISK LOADING
// ============================================================================

/// Read, parse and validate both artifacts
pub fn load_from_disk(paths: &ArtifactPaths) -> Result<LoadedArtifacts, ArtifactLoadError> {
    log::info!(
        "Loading model artifacts: {} + {}",
        paths.model.display(),
        paths.vectorizer.display()
    );

    let (model_bytes, model_sha256) = read_artifact(&paths.model)?;
    let (vectorizer_bytes, vectorizer_sha256) = read_artifact(&paths.vectorizer)?;

    let vectorizer_spec: VectorizerSpec = serde_json::from_slice(&vectorizer_bytes)
        .map_err(|e| corrupt(&paths.vectorizer, e))?;
    let classifier_spec: ClassifierSpec =
        serde_json::from_slice(&model_bytes).map_err(|e| corrupt(&paths.model, e))?;

    let vectorizer = VectorizerArtifact::build(vectorizer_spec).map_err(|reason| {
        ArtifactLoadError::Invalid {
            path: paths.vectorizer.clone(),
            reason,
        }
    })?;
    let classifier = ClassifierArtifact::build(classifier_spec).map_err(|reason| {
        ArtifactLoadError::Invalid {
            path: paths.model.clone(),
            reason,
        }
    })?;

    // Column 0 must be FAKE and column 1 REAL
    if classifier.classes() != [0, 1] {
        return Err(ArtifactLoadError::Invalid {
            path: paths.model.clone(),
            reason: format!(
                "classifier classes must be [0, 1], got {:?}",
                classifier.classes()
            ),
        });
    }

    if classifier.n_features() != vectorizer.n_features() {
        return Err(ArtifactLoadError::Invalid {
            path: paths.model.clone(),
            reason: format!(
                "classifier expects {} features but vectorizer produces {}",
                classifier.n_features(),
                vectorizer.n_features()
            ),
        });
    }

    let metadata = ArtifactMetadata {
        model_path: paths.model.display().to_string(),
        vectorizer_path: paths.vectorizer.display().to_string(),
        model_sha256,
        vectorizer_sha256,
        classifier_kind: classifier.kind(),
        vectorizer_kind: vectorizer.kind().to_string(),
        n_features: vectorizer.n_features(),
        vocabulary_size: vectorizer.vocabulary_size(),
        loaded_at: Utc::now(),
    };

    Ok(LoadedArtifacts::new(
        Box::new(classifier),
        Box::new(vectorizer),
        metadata,
    ))
}

/// Read file bytes and their SHA-256
fn read_artifact(path: &Path) -> Result<(Vec<u8>, String), ArtifactLoadError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ArtifactLoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ArtifactLoadError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    Ok((bytes, digest))
}

fn corrupt(path: &Path, e: serde_json::Error) -> ArtifactLoadError {
    ArtifactLoadError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}
