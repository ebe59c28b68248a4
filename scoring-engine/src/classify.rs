//! Risk tier classification
//!
//! Two independent threshold tables mapping continuous scores into
//! discrete tiers. Both are pure total functions; boundaries are half-open
//! on the lower bound, so an exact boundary value lands in the
//! lower-risk tier.

use serde::{Deserialize, Serialize};

/// Fraud risk tier derived from a fraud probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FraudRiskTier {
    /// Probability below 0.3
    Low,
    /// Probability in [0.3, 0.7)
    Medium,
    /// Probability of 0.7 or above
    High,
}

impl FraudRiskTier {
    /// Classify a fraud probability
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.7 {
            FraudRiskTier::High
        } else if probability >= 0.3 {
            FraudRiskTier::Medium
        } else {
            FraudRiskTier::Low
        }
    }
}

/// Business risk tier derived from an additive rule score.
///
/// Higher scores mean lower risk, so the tier names run opposite to the
/// fraud table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessRiskTier {
    /// Score of 70 or above
    LowRisk,
    /// Score in [40, 70)
    MediumRisk,
    /// Score below 40
    HighRisk,
}

impl BusinessRiskTier {
    /// Classify a business risk score
    pub fn from_score(score: i64) -> Self {
        if score >= 70 {
            BusinessRiskTier::LowRisk
        } else if score >= 40 {
            BusinessRiskTier::MediumRisk
        } else {
            BusinessRiskTier::HighRisk
        }
    }
}
