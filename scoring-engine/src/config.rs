//! Configuration for the scoring engine

use crate::error::{Error, Result};
use crate::model::{ClassifierParams, RegressorParams};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Scoring engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory for persisted model artifacts
    pub artifact_dir: PathBuf,

    /// Fraud probability above which a transaction is flagged suspicious.
    ///
    /// Independent of the HIGH tier boundary; the two happen to coincide
    /// at 0.7 by default but are configured separately.
    pub suspicion_threshold: f64,

    /// Credit regressor hyperparameters
    pub regressor: RegressorParams,

    /// Fraud classifier hyperparameters
    pub classifier: ClassifierParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("./data/models"),
            suspicion_threshold: 0.7,
            regressor: RegressorParams::default(),
            classifier: ClassifierParams::default(),
        }
    }
}

impl EngineConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = EngineConfig::default();

        if let Ok(dir) = std::env::var("SCORING_ARTIFACT_DIR") {
            config.artifact_dir = PathBuf::from(dir);
        }

        if let Ok(threshold) = std::env::var("SCORING_SUSPICION_THRESHOLD") {
            config.suspicion_threshold = threshold
                .parse()
                .map_err(|e| Error::Config(format!("Invalid suspicion threshold: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds and hyperparameters outside their sane ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.suspicion_threshold) {
            return Err(Error::Config(format!(
                "suspicion_threshold {} outside [0, 1]",
                self.suspicion_threshold
            )));
        }
        if self.regressor.learning_rate <= 0.0 || self.classifier.learning_rate <= 0.0 {
            return Err(Error::Config("learning rates must be positive".into()));
        }
        Ok(())
    }
}
