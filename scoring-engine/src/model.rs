//! Scoring models
//!
//! Two statically-typed implementations of the [`ScoreModel`] capability:
//! a gradient-boosted-stump regressor producing an unbounded base credit
//! score, and a logistic-regression classifier producing a fraud
//! probability. The learning algorithms are substitutable details; callers
//! depend only on the trait plus each model's typed prediction method.

use crate::error::{Error, Result};
use crate::features::FEATURE_SCHEMA_VERSION;
use crate::types::FeatureVector;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Common capability interface for trainable scoring models.
///
/// Models are stateless at inference time apart from their immutable
/// trained parameters.
pub trait ScoreModel {
    /// Batch offline training. Replaces any previously trained state.
    fn train(&mut self, features: &[FeatureVector], labels: &[f64]) -> Result<()>;

    /// Run inference on a single normalized feature vector.
    ///
    /// Regressors return an unbounded continuous score; classifiers return
    /// the positive-class probability in [0, 1].
    fn infer(&self, features: &FeatureVector) -> Result<f64>;

    /// Whether trained state is present
    fn is_trained(&self) -> bool;

    /// Feature width of the trained state, if trained
    fn feature_count(&self) -> Option<usize>;
}

fn check_training_batch(features: &[FeatureVector], labels: &[f64]) -> Result<usize> {
    let first = features
        .first()
        .ok_or_else(|| Error::InvalidTrainingData("empty training batch".into()))?;
    let width = first.len();
    if width == 0 {
        return Err(Error::InvalidTrainingData("zero-width training batch".into()));
    }
    if features.len() != labels.len() {
        return Err(Error::InvalidTrainingData(format!(
            "{} feature rows but {} labels",
            features.len(),
            labels.len()
        )));
    }
    for (i, row) in features.iter().enumerate() {
        if row.len() != width {
            return Err(Error::InvalidTrainingData(format!(
                "ragged training batch: row {} has {} features, expected {}",
                i,
                row.len(),
                width
            )));
        }
    }
    Ok(width)
}

fn check_inference_input(features: &FeatureVector, expected: usize) -> Result<()> {
    if features.len() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}

// ============================================================================
// Credit regressor
// ============================================================================

/// Hyperparameters for the credit regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressorParams {
    /// Number of boosting rounds
    pub n_rounds: usize,

    /// Shrinkage applied to each weak learner
    pub learning_rate: f64,
}

impl Default for RegressorParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.1,
        }
    }
}

/// A depth-1 regression tree: one feature, one split, two leaf values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stump {
    /// Feature slot the split tests
    pub feature: usize,

    /// Split threshold; inputs `<= threshold` take the left leaf
    pub threshold: f64,

    /// Left leaf value
    pub left: f64,

    /// Right leaf value
    pub right: f64,
}

impl Stump {
    fn predict(&self, features: &[f64]) -> f64 {
        if features[self.feature] <= self.threshold {
            self.left
        } else {
            self.right
        }
    }
}

/// Trained regressor parameters; opaque to everyone but the regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressorState {
    /// Feature order version this state was trained against
    pub schema_version: u16,

    /// Feature width of the training batch
    pub feature_count: usize,

    /// Mean label, the ensemble's starting prediction
    pub base: f64,

    /// Boosted weak learners, applied in order
    pub stumps: Vec<Stump>,

    /// Shrinkage the stumps were trained with
    pub learning_rate: f64,
}

impl RegressorState {
    /// Structural validation used when loading persisted state
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != FEATURE_SCHEMA_VERSION {
            return Err(Error::CorruptArtifact(format!(
                "regressor schema version {} does not match expected {}",
                self.schema_version, FEATURE_SCHEMA_VERSION
            )));
        }
        if self.feature_count == 0 {
            return Err(Error::CorruptArtifact(
                "regressor covers zero features".into(),
            ));
        }
        if !self.base.is_finite() || !self.learning_rate.is_finite() {
            return Err(Error::CorruptArtifact(
                "regressor contains non-finite parameters".into(),
            ));
        }
        for stump in &self.stumps {
            if stump.feature >= self.feature_count {
                return Err(Error::CorruptArtifact(format!(
                    "stump references feature {} outside width {}",
                    stump.feature, self.feature_count
                )));
            }
            if !stump.threshold.is_finite() || !stump.left.is_finite() || !stump.right.is_finite()
            {
                return Err(Error::CorruptArtifact(
                    "stump contains non-finite parameters".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Ensemble-of-weak-learners credit score regressor.
///
/// Boosts depth-1 regression stumps against the squared-error residual.
/// Predictions are deterministic given identical trained state.
#[derive(Debug, Clone)]
pub struct CreditRegressor {
    params: RegressorParams,
    state: Option<RegressorState>,
}

impl CreditRegressor {
    /// Create an untrained regressor with the given hyperparameters
    pub fn new(params: RegressorParams) -> Self {
        Self {
            params,
            state: None,
        }
    }

    /// Reconstruct a trained regressor from persisted state
    pub fn from_state(state: RegressorState) -> Result<Self> {
        state.validate()?;
        let params = RegressorParams {
            n_rounds: state.stumps.len(),
            learning_rate: state.learning_rate,
        };
        Ok(Self {
            params,
            state: Some(state),
        })
    }

    /// Trained state, if any (persisted by the model store)
    pub fn state(&self) -> Option<&RegressorState> {
        self.state.as_ref()
    }

    /// Predict the unbounded continuous base score
    pub fn predict(&self, features: &FeatureVector) -> Result<f64> {
        self.infer(features)
    }

    /// Fit the best stump for the current residuals, or None if no split
    /// reduces the error (e.g. all residuals identical).
    fn best_stump(features: &[FeatureVector], residuals: &[f64], width: usize) -> Option<Stump> {
        let n = residuals.len() as f64;
        let total: f64 = residuals.iter().sum();
        let total_sq: f64 = residuals.iter().map(|r| r * r).sum();
        let baseline_sse: f64 = {
            let mean = total / n;
            residuals.iter().map(|r| (r - mean) * (r - mean)).sum()
        };

        let mut best: Option<(f64, Stump)> = None;

        for feature in 0..width {
            // Sort sample indices by this feature so each distinct value is
            // a candidate threshold with prefix sums on the left.
            let mut order: Vec<usize> = (0..residuals.len()).collect();
            order.sort_by(|&a, &b| {
                features[a][feature]
                    .partial_cmp(&features[b][feature])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            let mut left_n = 0.0;

            for (pos, &idx) in order.iter().enumerate() {
                let r = residuals[idx];
                left_sum += r;
                left_sq += r * r;
                left_n += 1.0;

                // Only split between distinct feature values
                if pos + 1 >= order.len() {
                    break;
                }
                let here = features[idx][feature];
                let next = features[order[pos + 1]][feature];
                if here == next {
                    continue;
                }

                let right_sum = total - left_sum;
                let right_n = n - left_n;
                let right_sq = total_sq - left_sq;

                // SSE around each side's mean
                let sse = (left_sq - left_sum * left_sum / left_n)
                    + (right_sq - right_sum * right_sum / right_n);

                if sse < baseline_sse
                    && best.as_ref().map(|(b, _)| sse < *b).unwrap_or(true)
                {
                    best = Some((
                        sse,
                        Stump {
                            feature,
                            threshold: (here + next) / 2.0,
                            left: left_sum / left_n,
                            right: right_sum / right_n,
                        },
                    ));
                }
            }
        }

        best.map(|(_, stump)| stump)
    }
}

impl ScoreModel for CreditRegressor {
    fn train(&mut self, features: &[FeatureVector], labels: &[f64]) -> Result<()> {
        let width = check_training_batch(features, labels)?;

        let base = labels.iter().sum::<f64>() / labels.len() as f64;
        let mut residuals: Vec<f64> = labels.iter().map(|y| y - base).collect();
        let mut stumps = Vec::with_capacity(self.params.n_rounds);

        for _ in 0..self.params.n_rounds {
            let Some(stump) = Self::best_stump(features, &residuals, width) else {
                break;
            };
            for (row, residual) in features.iter().zip(residuals.iter_mut()) {
                *residual -= self.params.learning_rate * stump.predict(row);
            }
            stumps.push(stump);
        }

        debug!(
            samples = features.len(),
            rounds = stumps.len(),
            base = base,
            "Credit regressor trained"
        );

        self.state = Some(RegressorState {
            schema_version: FEATURE_SCHEMA_VERSION,
            feature_count: width,
            base,
            stumps,
            learning_rate: self.params.learning_rate,
        });
        Ok(())
    }

    fn infer(&self, features: &FeatureVector) -> Result<f64> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| Error::NotTrained("credit regressor".into()))?;
        check_inference_input(features, state.feature_count)?;

        let boosted: f64 = state
            .stumps
            .iter()
            .map(|stump| state.learning_rate * stump.predict(features))
            .sum();
        Ok(state.base + boosted)
    }

    fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    fn feature_count(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.feature_count)
    }
}

impl Default for CreditRegressor {
    fn default() -> Self {
        Self::new(RegressorParams::default())
    }
}

// ============================================================================
// Fraud classifier
// ============================================================================

/// Hyperparameters for the fraud classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierParams {
    /// Gradient descent epochs over the full batch
    pub epochs: usize,

    /// Gradient descent step size
    pub learning_rate: f64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            epochs: 200,
            learning_rate: 0.1,
        }
    }
}

/// Trained classifier parameters; opaque to everyone but the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierState {
    /// Feature order version this state was trained against
    pub schema_version: u16,

    /// Per-feature weights
    pub weights: Vec<f64>,

    /// Intercept term
    pub intercept: f64,
}

impl ClassifierState {
    /// Feature width of the trained state
    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    /// Structural validation used when loading persisted state
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != FEATURE_SCHEMA_VERSION {
            return Err(Error::CorruptArtifact(format!(
                "classifier schema version {} does not match expected {}",
                self.schema_version, FEATURE_SCHEMA_VERSION
            )));
        }
        if self.weights.is_empty() {
            return Err(Error::CorruptArtifact(
                "classifier covers zero features".into(),
            ));
        }
        if !self.intercept.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::CorruptArtifact(
                "classifier contains non-finite parameters".into(),
            ));
        }
        Ok(())
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Logistic-regression fraud classifier.
///
/// Trained by batch gradient descent on the logistic loss; labels above
/// 0.5 count as the positive (fraud) class. Output is always in [0, 1].
#[derive(Debug, Clone)]
pub struct FraudClassifier {
    params: ClassifierParams,
    state: Option<ClassifierState>,
}

impl FraudClassifier {
    /// Create an untrained classifier with the given hyperparameters
    pub fn new(params: ClassifierParams) -> Self {
        Self {
            params,
            state: None,
        }
    }

    /// Reconstruct a trained classifier from persisted state
    pub fn from_state(state: ClassifierState) -> Result<Self> {
        state.validate()?;
        Ok(Self {
            params: ClassifierParams::default(),
            state: Some(state),
        })
    }

    /// Trained state, if any (persisted by the model store)
    pub fn state(&self) -> Option<&ClassifierState> {
        self.state.as_ref()
    }

    /// Predict the probability of the positive (fraud) class
    pub fn predict_probability(&self, features: &FeatureVector) -> Result<f64> {
        self.infer(features)
    }
}

impl ScoreModel for FraudClassifier {
    fn train(&mut self, features: &[FeatureVector], labels: &[f64]) -> Result<()> {
        let width = check_training_batch(features, labels)?;

        let targets: Vec<f64> = labels
            .iter()
            .map(|y| if *y > 0.5 { 1.0 } else { 0.0 })
            .collect();

        let n = features.len() as f64;
        let mut weights = vec![0.0; width];
        let mut intercept = 0.0;

        for _ in 0..self.params.epochs {
            let mut grad_w = vec![0.0; width];
            let mut grad_b = 0.0;

            for (row, target) in features.iter().zip(targets.iter()) {
                let z = intercept
                    + row
                        .iter()
                        .zip(weights.iter())
                        .map(|(x, w)| x * w)
                        .sum::<f64>();
                let error = sigmoid(z) - target;
                for (g, x) in grad_w.iter_mut().zip(row.iter()) {
                    *g += error * x;
                }
                grad_b += error;
            }

            for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
                *w -= self.params.learning_rate * g / n;
            }
            intercept -= self.params.learning_rate * grad_b / n;
        }

        debug!(
            samples = features.len(),
            epochs = self.params.epochs,
            "Fraud classifier trained"
        );

        self.state = Some(ClassifierState {
            schema_version: FEATURE_SCHEMA_VERSION,
            weights,
            intercept,
        });
        Ok(())
    }

    fn infer(&self, features: &FeatureVector) -> Result<f64> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| Error::NotTrained("fraud classifier".into()))?;
        check_inference_input(features, state.feature_count())?;

        let z = state.intercept
            + features
                .iter()
                .zip(state.weights.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>();
        Ok(sigmoid(z))
    }

    fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    fn feature_count(&self) -> Option<usize> {
        self.state.as_ref().map(ClassifierState::feature_count)
    }
}

impl Default for FraudClassifier {
    fn default() -> Self {
        Self::new(ClassifierParams::default())
    }
}
