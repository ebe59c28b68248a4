//! Risk Scoring Engine for FinRisk
//!
//! Credit scoring, transaction fraud assessment and business-loan risk
//! evaluation over already-validated structured records

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adjustments;
pub mod business;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod model;
pub mod scaler;
pub mod store;
pub mod types;

pub use adjustments::AdjustmentEngine;
pub use business::BusinessRiskEvaluator;
pub use classify::{BusinessRiskTier, FraudRiskTier};
pub use config::EngineConfig;
pub use engine::ScoringEngine;
pub use error::{Error, Result};
pub use features::FeatureExtractor;
pub use model::{CreditRegressor, FraudClassifier, ScoreModel};
pub use scaler::{ScalerState, StandardScaler};
pub use store::ModelStore;
pub use types::*;
