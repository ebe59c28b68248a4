//! Feature normalization
//!
//! Normalization statistics are computed once from a representative batch
//! (`fit`) and applied read-only at inference time (`transform`). The two
//! phases are deliberately separate interface methods: statistics derived
//! from a single inference sample are meaningless.

use crate::error::{Error, Result};
use crate::features::FEATURE_SCHEMA_VERSION;
use crate::types::FeatureVector;
use serde::{Deserialize, Serialize};

/// Per-feature normalization statistics, produced by a batch fit.
///
/// Owned by the scaler; persisted as an opaque blob by the model store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerState {
    /// Feature order version this state was fit against
    pub schema_version: u16,

    /// Per-slot mean
    pub means: Vec<f64>,

    /// Per-slot scale (population standard deviation, 1.0 for constant slots)
    pub scales: Vec<f64>,
}

impl ScalerState {
    /// Number of feature slots this state covers
    pub fn feature_count(&self) -> usize {
        self.means.len()
    }

    /// Structural validation used when loading persisted state
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != FEATURE_SCHEMA_VERSION {
            return Err(Error::CorruptArtifact(format!(
                "scaler schema version {} does not match expected {}",
                self.schema_version, FEATURE_SCHEMA_VERSION
            )));
        }
        if self.means.len() != self.scales.len() {
            return Err(Error::CorruptArtifact(format!(
                "scaler has {} means but {} scales",
                self.means.len(),
                self.scales.len()
            )));
        }
        if self.means.is_empty() {
            return Err(Error::CorruptArtifact("scaler covers zero features".into()));
        }
        let finite = |v: &[f64]| v.iter().all(|x| x.is_finite());
        if !finite(&self.means) || !finite(&self.scales) {
            return Err(Error::CorruptArtifact(
                "scaler contains non-finite statistics".into(),
            ));
        }
        if self.scales.iter().any(|s| *s <= 0.0) {
            return Err(Error::CorruptArtifact(
                "scaler contains non-positive scale".into(),
            ));
        }
        Ok(())
    }
}

/// Standard (z-score) feature scaler
pub struct StandardScaler;

impl StandardScaler {
    /// Create a new scaler
    pub fn new() -> Self {
        Self
    }

    /// Compute per-slot mean and scale from a batch of feature vectors.
    ///
    /// Offline-only. The batch must be non-empty and rectangular.
    pub fn fit(&self, dataset: &[FeatureVector]) -> Result<ScalerState> {
        let first = dataset
            .first()
            .ok_or_else(|| Error::InvalidTrainingData("empty fit dataset".into()))?;
        let width = first.len();
        if width == 0 {
            return Err(Error::InvalidTrainingData("zero-width fit dataset".into()));
        }
        for (i, row) in dataset.iter().enumerate() {
            if row.len() != width {
                return Err(Error::InvalidTrainingData(format!(
                    "ragged fit dataset: row {} has {} features, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
        }

        let n = dataset.len() as f64;
        let mut means = vec![0.0; width];
        for row in dataset {
            for (slot, value) in row.iter().enumerate() {
                means[slot] += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut scales = vec![0.0; width];
        for row in dataset {
            for (slot, value) in row.iter().enumerate() {
                let delta = value - means[slot];
                scales[slot] += delta * delta;
            }
        }
        for scale in &mut scales {
            *scale = (*scale / n).sqrt();
            // Constant slots pass through unscaled instead of dividing by zero
            if *scale == 0.0 {
                *scale = 1.0;
            }
        }

        Ok(ScalerState {
            schema_version: FEATURE_SCHEMA_VERSION,
            means,
            scales,
        })
    }

    /// Apply `(x - mean) / scale` per slot using previously fit statistics.
    ///
    /// This is the only scaler operation on the inference path.
    pub fn transform(&self, state: &ScalerState, vector: &FeatureVector) -> Result<FeatureVector> {
        if vector.len() != state.feature_count() {
            return Err(Error::DimensionMismatch {
                expected: state.feature_count(),
                actual: vector.len(),
            });
        }

        Ok(vector
            .iter()
            .zip(state.means.iter().zip(state.scales.iter()))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_and_transform() {
        let scaler = StandardScaler::new();
        let dataset = vec![vec![1.0, 10.0], vec![3.0, 10.0], vec![5.0, 10.0]];

        let state = scaler.fit(&dataset).unwrap();
        assert_eq!(state.means, vec![3.0, 10.0]);

        let transformed = scaler.transform(&state, &vec![3.0, 10.0]).unwrap();
        assert_eq!(transformed, vec![0.0, 0.0]);
    }

    #[test]
    fn test_constant_slot_passes_through() {
        let scaler = StandardScaler::new();
        let state = scaler.fit(&[vec![7.0], vec![7.0]]).unwrap();

        // Zero variance slot gets scale 1.0, so transform is just centering
        assert_eq!(state.scales, vec![1.0]);
        let out = scaler.transform(&state, &vec![9.0]).unwrap();
        assert_eq!(out, vec![2.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let scaler = StandardScaler::new();
        let state = scaler.fit(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();

        let err = scaler.transform(&state, &vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let scaler = StandardScaler::new();
        assert!(matches!(
            scaler.fit(&[]),
            Err(Error::InvalidTrainingData(_))
        ));
    }

    #[test]
    fn test_ragged_dataset_rejected() {
        let scaler = StandardScaler::new();
        let result = scaler.fit(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(result, Err(Error::InvalidTrainingData(_))));
    }

    #[test]
    fn test_state_validation_rejects_version_skew() {
        let mut state = StandardScaler::new().fit(&[vec![1.0], vec![2.0]]).unwrap();
        state.schema_version = 99;

        assert!(matches!(state.validate(), Err(Error::CorruptArtifact(_))));
    }
}
