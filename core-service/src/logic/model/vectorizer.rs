//! Text Vectorizer - TF-IDF feature extraction
//!
//! Applies an already-fitted TF-IDF vocabulary to raw text. Nothing here
//! learns: vocabulary, IDF weights and analyzer settings all come from the
//! exported artifact.

use std::collections::{BTreeMap, HashMap, HashSet};

use ndarray::{Array1, ArrayView1};
use regex::Regex;
use serde::Deserialize;

use super::error::InferenceError;

/// Default token pattern: words of two or more word characters
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Sparse feature vector. Entries are sorted by column, unique, and every
/// column is `< dim`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Build from `(column, value)` pairs. Zero values and columns outside
    /// `dim` are dropped; repeated columns are summed.
    pub fn from_sparse(dim: usize, entries: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for (col, value) in entries {
            if col < dim {
                *merged.entry(col).or_insert(0.0) += value;
            }
        }

        Self {
            dim,
            entries: merged.into_iter().filter(|(_, v)| *v != 0.0).collect(),
        }
    }

    pub fn zeros(dim: usize) -> Self {
        Self { dim, entries: Vec::new() }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn get(&self, col: usize) -> f64 {
        self.entries
            .binary_search_by_key(&col, |(c, _)| *c)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    /// Dot product with a dense weight row of the same dimension
    pub fn dot(&self, weights: ArrayView1<'_, f64>) -> f64 {
        self.entries.iter().map(|(col, v)| weights[*col] * v).sum()
    }
}

// ============================================================================
// VECTORIZER TRAIT
// ============================================================================

/// Fitted text-to-feature transformer
pub trait TextVectorizer: Send + Sync {
    fn transform(&self, text: &str) -> Result<FeatureVector, InferenceError>;

    /// Output dimension
    fn n_features(&self) -> usize;
}

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

/// Vectorizer artifact as exported to JSON
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VectorizerSpec {
    Tfidf(TfidfParams),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// Parameters of a fitted TF-IDF vectorizer
#[derive(Debug, Clone, Deserialize)]
pub struct TfidfParams {
    /// term -> column
    pub vocabulary: HashMap<String, usize>,

    /// Per-column IDF weights; absent when the vectorizer was fitted without IDF
    #[serde(default)]
    pub idf: Option<Vec<f64>>,

    /// Output dimension; inferred from `idf` or the vocabulary when absent
    #[serde(default)]
    pub n_features: Option<usize>,

    #[serde(default = "default_true")]
    pub lowercase: bool,

    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,

    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    #[serde(default)]
    pub stop_words: Vec<String>,

    #[serde(default)]
    pub sublinear_tf: bool,

    #[serde(default)]
    pub binary: bool,

    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

// ============================================================================
// TF-IDF IMPLEMENTATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Option<Array1<f64>>,
    n_features: usize,
    lowercase: bool,
    token_pattern: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    sublinear_tf: bool,
    binary: bool,
    norm: Option<Norm>,
}

impl TfidfVectorizer {
    /// Validate exported parameters and compile the analyzer
    pub fn from_params(params: TfidfParams) -> Result<Self, String> {
        let (min_n, max_n) = params.ngram_range;
        if min_n < 1 || min_n > max_n {
            return Err(format!("invalid ngram_range ({}, {})", min_n, max_n));
        }

        let token_pattern = Regex::new(&params.token_pattern)
            .map_err(|e| format!("invalid token_pattern: {}", e))?;

        if params.vocabulary.is_empty() {
            return Err("vocabulary is empty".to_string());
        }

        let max_col = params.vocabulary.values().copied().max().unwrap_or(0);
        let n_features = params
            .n_features
            .or_else(|| params.idf.as_ref().map(Vec::len))
            .unwrap_or(max_col + 1);

        if max_col >= n_features {
            return Err(format!(
                "vocabulary column {} out of range for {} features",
                max_col, n_features
            ));
        }

        let idf = match params.idf {
            Some(weights) => {
                if weights.len() != n_features {
                    return Err(format!(
                        "idf has {} weights, expected {}",
                        weights.len(),
                        n_features
                    ));
                }
                if weights.iter().any(|w| !w.is_finite()) {
                    return Err("idf contains non-finite weights".to_string());
                }
                Some(Array1::from_vec(weights))
            }
            None => None,
        };

        Ok(Self {
            vocabulary: params.vocabulary,
            idf,
            n_features,
            lowercase: params.lowercase,
            token_pattern,
            ngram_range: params.ngram_range,
            stop_words: params.stop_words.into_iter().collect(),
            sublinear_tf: params.sublinear_tf,
            binary: params.binary,
            norm: params.norm,
        })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Tokenize, drop stop words, then expand into word n-grams
    fn analyze(&self, text: &str) -> Vec<String> {
        let doc = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&doc)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }
}

impl TextVectorizer for TfidfVectorizer {
    fn transform(&self, text: &str) -> Result<FeatureVector, InferenceError> {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(text) {
            if let Some(&col) = self.vocabulary.get(&term) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(col, count)| {
                let tf = if self.binary {
                    1.0
                } else if self.sublinear_tf {
                    1.0 + count.ln()
                } else {
                    count
                };
                let weight = match &self.idf {
                    Some(idf) => tf * idf[col],
                    None => tf,
                };
                (col, weight)
            })
            .collect();

        if let Some(norm) = self.norm {
            let length = match norm {
                Norm::L2 => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
                Norm::L1 => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            };
            if length > 0.0 {
                for (_, v) in entries.iter_mut() {
                    *v /= length;
                }
            }
        }

        if entries.iter().any(|(_, v)| !v.is_finite()) {
            return Err(InferenceError::Transform(
                "non-finite feature weight".to_string(),
            ));
        }

        Ok(FeatureVector::from_sparse(self.n_features, entries))
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

// ============================================================================
// LOADED VECTORIZER
// ============================================================================

/// A vectorizer artifact after validation
#[derive(Debug, Clone)]
pub enum VectorizerArtifact {
    Tfidf(TfidfVectorizer),
}

impl VectorizerArtifact {
    pub fn build(spec: VectorizerSpec) -> Result<Self, String> {
        match spec {
            VectorizerSpec::Tfidf(params) => TfidfVectorizer::from_params(params).map(Self::Tfidf),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tfidf(_) => "tfidf",
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        match self {
            Self::Tfidf(v) => v.vocabulary_size(),
        }
    }
}

impl TextVectorizer for VectorizerArtifact {
    fn transform(&self, text: &str) -> Result<FeatureVector, InferenceError> {
        match self {
            Self::Tfidf(v) => v.transform(text),
        }
    }

    fn n_features(&self) -> usize {
        match self {
            Self::Tfidf(v) => v.n_features(),
        }
    }
}
