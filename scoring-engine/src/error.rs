//! Error types for the scoring engine

use thiserror::Error;

/// Result type for scoring operations
pub type Result<T> = std::result::Result<T, Error>;

/// Scoring engine errors
#[derive(Error, Debug)]
pub enum Error {
    /// Feature vector length does not match the trained state
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch {
        /// Feature count the trained state expects
        expected: usize,
        /// Feature count actually supplied
        actual: usize,
    },

    /// Inference attempted before training or loading
    #[error("Model not trained: {0}")]
    NotTrained(String),

    /// Training batch is empty, ragged, or labels do not line up
    #[error("Invalid training data: {0}")]
    InvalidTrainingData(String),

    /// Expected model artifact missing at load time
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Artifact decoded but failed structural validation
    #[error("Corrupt artifact: {0}")]
    CorruptArtifact(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
