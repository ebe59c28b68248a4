//! Business-loan risk evaluation
//!
//! Rule-based scorer over business-profile fields. Scoring is additive
//! across three independent factors (revenue, tenure, industry), each
//! contributing a numeric delta and a human-readable factor label. The
//! maximum reachable score under the current rule set is 80
//! (30 revenue + 25 tenure + 25 industry).

use crate::classify::BusinessRiskTier;
use crate::types::{BusinessProfile, BusinessRiskAssessment};
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

/// Industries carrying the lowest lending risk
const LOW_RISK_INDUSTRIES: [&str; 3] = ["technology", "healthcare", "education"];

/// Industries carrying moderate lending risk
const MEDIUM_RISK_INDUSTRIES: [&str; 3] = ["retail", "manufacturing", "services"];

/// Rule-based risk scorer for business-loan applicants.
///
/// Model-free path: does not touch the feature pipeline or scoring models.
pub struct BusinessRiskEvaluator;

impl BusinessRiskEvaluator {
    /// Create a new evaluator
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a business profile into a risk score, tier and factor list
    pub fn evaluate(&self, profile: &BusinessProfile) -> BusinessRiskAssessment {
        let mut risk_score = 0i64;
        let mut factors = Vec::new();

        let annual_revenue = profile.numeric_or_zero("annual_revenue");
        if annual_revenue > 1_000_000.0 {
            risk_score += 30;
            factors.push("Strong annual revenue".to_string());
        } else if annual_revenue > 500_000.0 {
            risk_score += 20;
            factors.push("Moderate annual revenue".to_string());
        }

        let years = profile.numeric_or_zero("years_in_operation");
        if years > 5.0 {
            risk_score += 25;
            factors.push("Established business".to_string());
        } else if years > 2.0 {
            risk_score += 15;
            factors.push("Growing business".to_string());
        }

        // Industry always contributes a delta and a label
        let (industry_score, industry_factor) =
            Self::assess_industry(profile.text("industry").unwrap_or(""));
        risk_score += industry_score;
        factors.push(industry_factor.to_string());

        let risk_tier = BusinessRiskTier::from_score(risk_score);

        debug!(
            risk_score = risk_score,
            risk_tier = ?risk_tier,
            factor_count = factors.len(),
            "Business risk evaluated"
        );

        BusinessRiskAssessment {
            assessment_id: Uuid::new_v4(),
            risk_score,
            risk_tier,
            factors,
            assessed_at: Utc::now(),
        }
    }

    /// Case-insensitive industry lookup.
    ///
    /// Unknown industries fall into the high-risk bucket by default; this
    /// is a closed fallback classification, not an error. Canonical
    /// high-risk members: restaurant, entertainment, construction.
    fn assess_industry(industry: &str) -> (i64, &'static str) {
        let industry = industry.to_lowercase();
        if LOW_RISK_INDUSTRIES.contains(&industry.as_str()) {
            (25, "Low-risk industry")
        } else if MEDIUM_RISK_INDUSTRIES.contains(&industry.as_str()) {
            (15, "Medium-risk industry")
        } else {
            (5, "High-risk industry")
        }
    }
}

impl Default for BusinessRiskEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_established_technology_business() {
        let evaluator = BusinessRiskEvaluator::new();
        let profile = BusinessProfile::new()
            .with("annual_revenue", 2_000_000)
            .with("years_in_operation", 7)
            .with("industry", "technology");

        let assessment = evaluator.evaluate(&profile);

        assert_eq!(assessment.risk_score, 80);
        assert_eq!(assessment.risk_tier, BusinessRiskTier::LowRisk);
        assert_eq!(
            assessment.factors,
            vec![
                "Strong annual revenue",
                "Established business",
                "Low-risk industry"
            ]
        );
    }

    #[test]
    fn test_industry_lookup_is_case_insensitive() {
        let evaluator = BusinessRiskEvaluator::new();

        let lower = evaluator.evaluate(&BusinessProfile::new().with("industry", "technology"));
        let mixed = evaluator.evaluate(&BusinessProfile::new().with("industry", "Technology"));

        assert_eq!(lower.risk_score, mixed.risk_score);
        assert_eq!(lower.factors, mixed.factors);
    }

    #[test]
    fn test_unknown_industry_is_high_risk() {
        let evaluator = BusinessRiskEvaluator::new();
        let profile = BusinessProfile::new().with("industry", "alien-tech");

        let assessment = evaluator.evaluate(&profile);

        assert_eq!(assessment.risk_score, 5);
        assert_eq!(assessment.factors, vec!["High-risk industry"]);
        assert_eq!(assessment.risk_tier, BusinessRiskTier::HighRisk);
    }

    #[test]
    fn test_missing_industry_is_high_risk() {
        let evaluator = BusinessRiskEvaluator::new();
        let assessment = evaluator.evaluate(&BusinessProfile::new());

        assert_eq!(assessment.risk_score, 5);
        assert_eq!(assessment.factors, vec!["High-risk industry"]);
    }

    #[test]
    fn test_moderate_revenue_growing_business() {
        let evaluator = BusinessRiskEvaluator::new();
        let profile = BusinessProfile::new()
            .with("annual_revenue", 600_000)
            .with("years_in_operation", 3)
            .with("industry", "retail");

        let assessment = evaluator.evaluate(&profile);

        // 20 + 15 + 15
        assert_eq!(assessment.risk_score, 50);
        assert_eq!(assessment.risk_tier, BusinessRiskTier::MediumRisk);
        assert_eq!(
            assessment.factors,
            vec![
                "Moderate annual revenue",
                "Growing business",
                "Medium-risk industry"
            ]
        );
    }

    #[test]
    fn test_revenue_boundaries_do_not_trigger() {
        let evaluator = BusinessRiskEvaluator::new();
        let profile = BusinessProfile::new()
            .with("annual_revenue", 500_000)
            .with("years_in_operation", 2)
            .with("industry", "construction");

        let assessment = evaluator.evaluate(&profile);

        // Only the industry fallback contributes
        assert_eq!(assessment.risk_score, 5);
    }
}
