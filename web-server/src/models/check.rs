//! Check request/response models

use serde::{Deserialize, Serialize};
use validator::Validate;

use newscheck_core::{PredictionResult, Verdict};

use super::history::HistoryView;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckRequest {
    #[validate(length(max = 100000, message = "text is too long"))]
    pub text: String,
}

/// One bar of the probability chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbabilityBar {
    pub category: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionView {
    pub label: Verdict,
    pub confidence: f64,
    pub confidence_percent: String,
    /// Fake, then Real
    pub probabilities: Vec<ProbabilityBar>,
    pub inference_time_us: u64,
}

impl From<&PredictionResult> for PredictionView {
    fn from(result: &PredictionResult) -> Self {
        Self {
            label: result.label,
            confidence: result.confidence,
            confidence_percent: result.confidence_percent(),
            probabilities: vec![
                ProbabilityBar {
                    category: "Fake".to_string(),
                    probability: result.p_fake(),
                },
                ProbabilityBar {
                    category: "Real".to_string(),
                    probability: result.p_real(),
                },
            ],
            inference_time_us: result.inference_time_us,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub result: PredictionView,
    pub history: HistoryView,
}
