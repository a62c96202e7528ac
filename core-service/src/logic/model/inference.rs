//! Inference Engine - text in, REAL/FAKE verdict out
//!
//! Runs the vectorizer and classifier on one text and derives the
//! confidence from the probability of the predicted class.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::constants::PROBABILITY_TOLERANCE;
use super::classifier::BinaryClassifier;
use super::error::InferenceError;
use super::vectorizer::TextVectorizer;

// ============================================================================
// STATE
// ============================================================================

/// Latency stats
static LATENCY_SUM: AtomicU64 = AtomicU64::new(0);
static INFERENCE_COUNT: AtomicU64 = AtomicU64::new(0);
static FAILURE_COUNT: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Real,
    Fake,
}

impl Verdict {
    /// Class index 1 is REAL, 0 is FAKE. Anything else has no verdict.
    pub fn from_class_index(index: i64) -> Option<Self> {
        match index {
            1 => Some(Self::Real),
            0 => Some(Self::Fake),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "REAL",
            Self::Fake => "FAKE",
        }
    }

    /// Column of this verdict in the probability vector
    pub fn probability_index(&self) -> usize {
        match self {
            Self::Real => 1,
            Self::Fake => 0,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: Verdict,
    /// Probability of `label`, 0.0 - 1.0
    pub confidence: f64,
    /// [p_fake, p_real]
    pub probabilities: [f64; 2],
    pub inference_time_us: u64,
}

impl PredictionResult {
    pub fn p_fake(&self) -> f64 {
        self.probabilities[0]
    }

    pub fn p_real(&self) -> f64 {
        self.probabilities[1]
    }

    /// Confidence as shown on the page, e.g. "92.0%"
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }
}

/// Engine counters for the status page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub inference_count: u64,
    pub failure_count: u64,
    pub avg_latency_ms: f32,
}

// ============================================================================
// PREDICTION
// ============================================================================

/// Score one text. The caller must reject blank input beforehand.
pub fn predict(
    text: &str,
    classifier: &dyn BinaryClassifier,
    vectorizer: &dyn TextVectorizer,
) -> Result<PredictionResult, InferenceError> {
    let start_time = Instant::now();

    let result = run(text, classifier, vectorizer, start_time);
    match &result {
        Ok(r) => {
            LATENCY_SUM.fetch_add(r.inference_time_us, Ordering::Relaxed);
            INFERENCE_COUNT.fetch_add(1, Ordering::Relaxed);
            log::debug!(
                "Predicted {} ({}) in {}us",
                r.label,
                r.confidence_percent(),
                r.inference_time_us
            );
        }
        Err(e) => {
            FAILURE_COUNT.fetch_add(1, Ordering::Relaxed);
            log::warn!("Inference failed: {}", e);
        }
    }
    result
}

fn run(
    text: &str,
    classifier: &dyn BinaryClassifier,
    vectorizer: &dyn TextVectorizer,
    start_time: Instant,
) -> Result<PredictionResult, InferenceError> {
    let features = vectorizer.transform(text)?;

    let index = classifier.predict(&features)?;
    let label = Verdict::from_class_index(index).ok_or(InferenceError::UnexpectedLabel(index))?;

    let proba = classifier.predict_proba(&features)?;
    let probabilities = validate_probabilities(&proba)?;

    Ok(PredictionResult {
        label,
        confidence: probabilities[label.probability_index()],
        probabilities,
        inference_time_us: start_time.elapsed().as_micros() as u64,
    })
}

fn validate_probabilities(proba: &[f64]) -> Result<[f64; 2], InferenceError> {
    let [p_fake, p_real] = proba else {
        return Err(InferenceError::MalformedProbabilities(format!(
            "expected 2 classes, got {}",
            proba.len()
        )));
    };

    if !(0.0..=1.0).contains(p_fake) || !(0.0..=1.0).contains(p_real) {
        return Err(InferenceError::MalformedProbabilities(format!(
            "values out of range: [{}, {}]",
            p_fake, p_real
        )));
    }

    let sum = p_fake + p_real;
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(InferenceError::MalformedProbabilities(format!(
            "probabilities sum to {}",
            sum
        )));
    }

    Ok([*p_fake, *p_real])
}

// ============================================================================
// HELPERS
// ============================================================================

pub fn get_stats() -> EngineStats {
    let sum = LATENCY_SUM.load(Ordering::Relaxed);
    let count = INFERENCE_COUNT.load(Ordering::Relaxed);
    let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

    EngineStats {
        inference_count: count,
        failure_count: FAILURE_COUNT.load(Ordering::Relaxed),
        avg_latency_ms: avg,
    }
}
