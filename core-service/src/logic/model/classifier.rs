//! Classifiers - fitted linear, naive Bayes and voting models
//!
//! Each kind scores a [`FeatureVector`] using exported weights. Class
//! labels are kept in ascending order so probability column `i` always
//! belongs to `classes[i]`.

use ndarray::{Array1, Array2};
use serde::Deserialize;

use super::error::InferenceError;
use super::vectorizer::FeatureVector;

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Fitted classifier consumed read-only by the inference engine
pub trait BinaryClassifier: Send + Sync {
    /// Predicted class label
    fn predict(&self, x: &FeatureVector) -> Result<i64, InferenceError>;

    /// Probability per class, in class order
    fn predict_proba(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError>;

    /// Expected input dimension
    fn n_features(&self) -> usize;
}

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingMode {
    #[default]
    Soft,
    Hard,
}

/// Classifier artifact as exported to JSON
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    LogisticRegression {
        coef: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_classes")]
        classes: Vec<i64>,
    },
    MultinomialNb {
        feature_log_prob: Vec<Vec<f64>>,
        class_log_prior: Vec<f64>,
        #[serde(default = "default_classes")]
        classes: Vec<i64>,
    },
    Voting {
        estimators: Vec<ClassifierSpec>,
        #[serde(default)]
        weights: Option<Vec<f64>>,
        #[serde(default)]
        voting: VotingMode,
        #[serde(default = "default_classes")]
        classes: Vec<i64>,
    },
}

fn default_classes() -> Vec<i64> {
    vec![0, 1]
}

fn check_classes(classes: &[i64]) -> Result<(), String> {
    if classes.len() < 2 {
        return Err(format!("need at least 2 classes, got {}", classes.len()));
    }
    if classes.windows(2).any(|w| w[0] >= w[1]) {
        return Err(format!("classes must be unique and ascending: {:?}", classes));
    }
    Ok(())
}

fn check_dim(expected: usize, x: &FeatureVector) -> Result<(), InferenceError> {
    if x.dim() != expected {
        return Err(InferenceError::DimensionMismatch {
            expected,
            actual: x.dim(),
        });
    }
    Ok(())
}

/// Index of the first maximum
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coef: Array1<f64>,
    intercept: f64,
    classes: [i64; 2],
}

impl LogisticRegression {
    pub fn new(coef: Vec<f64>, intercept: f64, classes: Vec<i64>) -> Result<Self, String> {
        check_classes(&classes)?;
        if classes.len() != 2 {
            return Err("logistic regression must be binary".to_string());
        }
        if coef.is_empty() {
            return Err("coef is empty".to_string());
        }
        if !intercept.is_finite() || coef.iter().any(|w| !w.is_finite()) {
            return Err("coefficients contain non-finite values".to_string());
        }

        Ok(Self {
            coef: Array1::from_vec(coef),
            intercept,
            classes: [classes[0], classes[1]],
        })
    }

    fn decision(&self, x: &FeatureVector) -> Result<f64, InferenceError> {
        check_dim(self.coef.len(), x)?;
        Ok(x.dot(self.coef.view()) + self.intercept)
    }
}

impl BinaryClassifier for LogisticRegression {
    fn predict(&self, x: &FeatureVector) -> Result<i64, InferenceError> {
        let d = self.decision(x)?;
        Ok(if d > 0.0 { self.classes[1] } else { self.classes[0] })
    }

    fn predict_proba(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        let p = sigmoid(self.decision(x)?);
        Ok(vec![1.0 - p, p])
    }

    fn n_features(&self) -> usize {
        self.coef.len()
    }
}

// ============================================================================
// MULTINOMIAL NAIVE BAYES
// ============================================================================

#[derive(Debug, Clone)]
pub struct MultinomialNb {
    feature_log_prob: Array2<f64>,
    class_log_prior: Array1<f64>,
    classes: Vec<i64>,
}

impl MultinomialNb {
    pub fn new(
        feature_log_prob: Vec<Vec<f64>>,
        class_log_prior: Vec<f64>,
        classes: Vec<i64>,
    ) -> Result<Self, String> {
        check_classes(&classes)?;
        if feature_log_prob.len() != classes.len() || class_log_prior.len() != classes.len() {
            return Err(format!(
                "{} classes but {} feature_log_prob rows and {} priors",
                classes.len(),
                feature_log_prob.len(),
                class_log_prior.len()
            ));
        }

        let cols = feature_log_prob[0].len();
        if cols == 0 || feature_log_prob.iter().any(|row| row.len() != cols) {
            return Err("feature_log_prob rows must be non-empty and equal length".to_string());
        }

        let flat: Vec<f64> = feature_log_prob.into_iter().flatten().collect();
        if flat.iter().chain(class_log_prior.iter()).any(|v| !v.is_finite()) {
            return Err("log probabilities contain non-finite values".to_string());
        }
        let feature_log_prob = Array2::from_shape_vec((classes.len(), cols), flat)
            .map_err(|e| format!("feature_log_prob shape error: {}", e))?;

        Ok(Self {
            feature_log_prob,
            class_log_prior: Array1::from_vec(class_log_prior),
            classes,
        })
    }

    fn joint_log_likelihood(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        check_dim(self.feature_log_prob.ncols(), x)?;
        Ok(self
            .feature_log_prob
            .rows()
            .into_iter()
            .zip(self.class_log_prior.iter())
            .map(|(row, prior)| x.dot(row) + prior)
            .collect())
    }
}

impl BinaryClassifier for MultinomialNb {
    fn predict(&self, x: &FeatureVector) -> Result<i64, InferenceError> {
        let jll = self.joint_log_likelihood(x)?;
        Ok(self.classes[argmax(&jll)])
    }

    fn predict_proba(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        let jll = self.joint_log_likelihood(x)?;
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = jll.iter().map(|v| (v - max).exp()).collect();
        let total: f64 = exp.iter().sum();
        Ok(exp.into_iter().map(|v| v / total).collect())
    }

    fn n_features(&self) -> usize {
        self.feature_log_prob.ncols()
    }
}

// ============================================================================
// VOTING ENSEMBLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct VotingEnsemble {
    estimators: Vec<ClassifierArtifact>,
    weights: Array1<f64>,
    voting: VotingMode,
    classes: Vec<i64>,
}

impl VotingEnsemble {
    pub fn new(
        estimators: Vec<ClassifierArtifact>,
        weights: Option<Vec<f64>>,
        voting: VotingMode,
        classes: Vec<i64>,
    ) -> Result<Self, String> {
        check_classes(&classes)?;
        if estimators.is_empty() {
            return Err("voting ensemble has no estimators".to_string());
        }

        let n_features = estimators[0].n_features();
        if estimators.iter().any(|e| e.n_features() != n_features) {
            return Err("estimators disagree on feature count".to_string());
        }
        if estimators.iter().any(|e| e.classes() != classes.as_slice()) {
            return Err(format!("estimators must share classes {:?}", classes));
        }

        let weights = weights.unwrap_or_else(|| vec![1.0; estimators.len()]);
        if weights.len() != estimators.len() {
            return Err(format!(
                "{} weights for {} estimators",
                weights.len(),
                estimators.len()
            ));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.iter().sum::<f64>() <= 0.0 {
            return Err("weights must be non-negative with a positive sum".to_string());
        }

        Ok(Self {
            estimators,
            weights: Array1::from_vec(weights),
            voting,
            classes,
        })
    }

    fn soft_average(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        let mut avg = vec![0.0; self.classes.len()];
        for (estimator, weight) in self.estimators.iter().zip(self.weights.iter()) {
            let proba = estimator.predict_proba(x)?;
            if proba.len() != avg.len() {
                return Err(InferenceError::MalformedProbabilities(format!(
                    "estimator returned {} columns for {} classes",
                    proba.len(),
                    avg.len()
                )));
            }
            for (acc, p) in avg.iter_mut().zip(proba) {
                *acc += weight * p;
            }
        }

        let total = self.weights.sum();
        Ok(avg.into_iter().map(|v| v / total).collect())
    }

    fn hard_vote(&self, x: &FeatureVector) -> Result<i64, InferenceError> {
        let mut votes = vec![0.0; self.classes.len()];
        for (estimator, weight) in self.estimators.iter().zip(self.weights.iter()) {
            let label = estimator.predict(x)?;
            let idx = self
                .classes
                .iter()
                .position(|c| *c == label)
                .ok_or(InferenceError::UnexpectedLabel(label))?;
            votes[idx] += weight;
        }
        Ok(self.classes[argmax(&votes)])
    }
}

impl BinaryClassifier for VotingEnsemble {
    fn predict(&self, x: &FeatureVector) -> Result<i64, InferenceError> {
        match self.voting {
            VotingMode::Soft => Ok(self.classes[argmax(&self.soft_average(x)?)]),
            VotingMode::Hard => self.hard_vote(x),
        }
    }

    fn predict_proba(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        match self.voting {
            VotingMode::Soft => self.soft_average(x),
            VotingMode::Hard => Err(InferenceError::ProbabilitiesUnavailable(
                "hard voting ensembles do not produce probabilities".to_string(),
            )),
        }
    }

    fn n_features(&self) -> usize {
        self.estimators[0].n_features()
    }
}

// ============================================================================
// LOADED CLASSIFIER
// ============================================================================

/// A classifier artifact after validation
#[derive(Debug, Clone)]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegression),
    MultinomialNb(MultinomialNb),
    Voting(VotingEnsemble),
}

impl ClassifierArtifact {
    pub fn build(spec: ClassifierSpec) -> Result<Self, String> {
        match spec {
            ClassifierSpec::LogisticRegression { coef, intercept, classes } => {
                LogisticRegression::new(coef, intercept, classes).map(Self::LogisticRegression)
            }
            ClassifierSpec::MultinomialNb { feature_log_prob, class_log_prior, classes } => {
                MultinomialNb::new(feature_log_prob, class_log_prior, classes).map(Self::MultinomialNb)
            }
            ClassifierSpec::Voting { estimators, weights, voting, classes } => {
                let estimators = estimators
                    .into_iter()
                    .enumerate()
                    .map(|(i, spec)| {
                        Self::build(spec).map_err(|e| format!("estimator {}: {}", i, e))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                VotingEnsemble::new(estimators, weights, voting, classes).map(Self::Voting)
            }
        }
    }

    pub fn kind(&self) -> String {
        match self {
            Self::LogisticRegression(_) => "logistic_regression".to_string(),
            Self::MultinomialNb(_) => "multinomial_nb".to_string(),
            Self::Voting(v) => {
                let members: Vec<String> = v.estimators.iter().map(|e| e.kind()).collect();
                let mode = match v.voting {
                    VotingMode::Soft => "soft",
                    VotingMode::Hard => "hard",
                };
                format!("voting[{}]({})", mode, members.join(", "))
            }
        }
    }

    pub fn classes(&self) -> &[i64] {
        match self {
            Self::LogisticRegression(m) => m.classes.as_slice(),
            Self::MultinomialNb(m) => m.classes.as_slice(),
            Self::Voting(m) => m.classes.as_slice(),
        }
    }
}

impl BinaryClassifier for ClassifierArtifact {
    fn predict(&self, x: &FeatureVector) -> Result<i64, InferenceError> {
        match self {
            Self::LogisticRegression(m) => m.predict(x),
            Self::MultinomialNb(m) => m.predict(x),
            Self::Voting(m) => m.predict(x),
        }
    }

    fn predict_proba(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        match self {
            Self::LogisticRegression(m) => m.predict_proba(x),
            Self::MultinomialNb(m) => m.predict_proba(x),
            Self::Voting(m) => m.predict_proba(x),
        }
    }

    fn n_features(&self) -> usize {
        match self {
            Self::LogisticRegression(m) => m.n_features(),
            Self::MultinomialNb(m) => m.n_features(),
            Self::Voting(m) => m.n_features(),
        }
    }
}
