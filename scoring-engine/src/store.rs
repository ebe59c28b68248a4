//! Model artifact persistence
//!
//! # Artifacts
//!
//! - `scaler.bin` - normalization statistics for both scoring paths
//! - `credit_model.bin` - trained credit regressor state
//! - `fraud_model.bin` - trained fraud classifier state
//!
//! Loading is all-or-nothing: every artifact must be present, decodable
//! and structurally valid before anything is returned, so a partially
//! written directory can never replace a working engine state.

use crate::error::{Error, Result};
use crate::model::{ClassifierState, RegressorState};
use crate::scaler::ScalerState;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Artifact file names
const SCALER_FILE: &str = "scaler.bin";
const CREDIT_MODEL_FILE: &str = "credit_model.bin";
const FRAUD_MODEL_FILE: &str = "fraud_model.bin";

/// Normalization statistics for both scoring paths, persisted as one blob.
///
/// The credit and fraud paths carry independent statistics because they
/// are fit against different record schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    /// Applicant-path statistics (7 slots)
    pub credit: ScalerState,

    /// Transaction-path statistics (5 slots)
    pub fraud: ScalerState,
}

/// Serializes and deserializes trained engine state to a directory
pub struct ModelStore;

impl ModelStore {
    /// Create a new model store
    pub fn new() -> Self {
        Self
    }

    /// Write all three artifacts, creating the directory if needed
    pub fn save(
        &self,
        dir: &Path,
        scalers: &ScalerArtifact,
        credit: &RegressorState,
        fraud: &ClassifierState,
    ) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        std::fs::write(dir.join(SCALER_FILE), bincode::serialize(scalers)?)?;
        std::fs::write(dir.join(CREDIT_MODEL_FILE), bincode::serialize(credit)?)?;
        std::fs::write(dir.join(FRAUD_MODEL_FILE), bincode::serialize(fraud)?)?;

        info!(dir = %dir.display(), "Saved model artifacts");
        Ok(())
    }

    /// Load and validate all three artifacts.
    ///
    /// Fails with [`Error::ArtifactNotFound`] if any file is missing and
    /// [`Error::CorruptArtifact`] if decoding or structural validation
    /// (feature counts, schema version, finite parameters) fails.
    pub fn load(&self, dir: &Path) -> Result<(ScalerArtifact, RegressorState, ClassifierState)> {
        let scalers: ScalerArtifact = Self::read_artifact(dir, SCALER_FILE)?;
        let credit: RegressorState = Self::read_artifact(dir, CREDIT_MODEL_FILE)?;
        let fraud: ClassifierState = Self::read_artifact(dir, FRAUD_MODEL_FILE)?;

        scalers.credit.validate()?;
        scalers.fraud.validate()?;
        credit.validate()?;
        fraud.validate()?;

        // The models must line up with the statistics they were fit with
        if credit.feature_count != scalers.credit.feature_count() {
            return Err(Error::CorruptArtifact(format!(
                "credit model expects {} features but scaler covers {}",
                credit.feature_count,
                scalers.credit.feature_count()
            )));
        }
        if fraud.feature_count() != scalers.fraud.feature_count() {
            return Err(Error::CorruptArtifact(format!(
                "fraud model expects {} features but scaler covers {}",
                fraud.feature_count(),
                scalers.fraud.feature_count()
            )));
        }

        info!(dir = %dir.display(), "Loaded model artifacts");
        Ok((scalers, credit, fraud))
    }

    fn read_artifact<T: serde::de::DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
        let path = dir.join(file);
        if !path.is_file() {
            return Err(Error::ArtifactNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(&path)?;
        bincode::deserialize(&bytes)
            .map_err(|e| Error::CorruptArtifact(format!("{}: {}", path.display(), e)))
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new()
    }
}
