//! Deterministic credit score adjustments
//!
//! Bonus rules applied on top of the regressor's base prediction. Rules
//! are additive and independently triggered; the combined score is clamped
//! to the credit score range only after every adjustment has been added.

use crate::types::ApplicantRecord;

/// Lower bound of the credit score range
pub const MIN_CREDIT_SCORE: f64 = 300.0;

/// Upper bound of the credit score range
pub const MAX_CREDIT_SCORE: f64 = 850.0;

/// A single additive bonus rule over a raw applicant field
struct AdjustmentRule {
    field: &'static str,
    label: &'static str,
    bonus: f64,
    triggers: fn(f64) -> bool,
}

const RULES: [AdjustmentRule; 3] = [
    AdjustmentRule {
        field: "payment_history_score",
        label: "Strong payment history",
        bonus: 50.0,
        triggers: |v| v > 90.0,
    },
    AdjustmentRule {
        field: "years_of_credit_history",
        label: "Long credit history",
        bonus: 30.0,
        triggers: |v| v > 5.0,
    },
    AdjustmentRule {
        field: "credit_utilization",
        label: "Low credit utilization",
        bonus: 40.0,
        triggers: |v| v < 30.0,
    },
];

/// Applies rule-based bonuses to a model's base credit score.
///
/// Pure over the raw (unscaled) record; independent of the model.
pub struct AdjustmentEngine;

impl AdjustmentEngine {
    /// Create a new adjustment engine
    pub fn new() -> Self {
        Self
    }

    /// Total additive adjustment for the record
    pub fn adjust(&self, record: &ApplicantRecord) -> f64 {
        self.adjust_with_factors(record).0
    }

    /// Total adjustment plus the labels of the rules that fired
    pub fn adjust_with_factors(&self, record: &ApplicantRecord) -> (f64, Vec<&'static str>) {
        let mut total = 0.0;
        let mut factors = Vec::new();

        for rule in &RULES {
            if (rule.triggers)(record.numeric_or_zero(rule.field)) {
                total += rule.bonus;
                factors.push(rule.label);
            }
        }

        (total, factors)
    }

    /// Clamp an adjusted score into the credit range and round to 2 decimals.
    ///
    /// Must be applied after the adjustment is added, never before, so
    /// bonuses cannot push an already-capped score further.
    pub fn finalize(&self, adjusted: f64) -> f64 {
        let clamped = adjusted.clamp(MIN_CREDIT_SCORE, MAX_CREDIT_SCORE);
        (clamped * 100.0).round() / 100.0
    }
}

impl Default for AdjustmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_trigger() {
        let engine = AdjustmentEngine::new();
        let record = ApplicantRecord::new()
            .with("payment_history_score", 95)
            .with("years_of_credit_history", 6)
            .with("credit_utilization", 20);

        assert_eq!(engine.adjust(&record), 120.0);
    }

    #[test]
    fn test_rules_are_independent() {
        let engine = AdjustmentEngine::new();

        let payment_only = ApplicantRecord::new()
            .with("payment_history_score", 95)
            .with("credit_utilization", 80);
        assert_eq!(engine.adjust(&payment_only), 50.0);

        let history_only = ApplicantRecord::new()
            .with("years_of_credit_history", 10)
            .with("credit_utilization", 50);
        assert_eq!(engine.adjust(&history_only), 30.0);
    }

    #[test]
    fn test_missing_utilization_counts_as_low() {
        // A missing field reads as 0.0, which is below the 30 threshold
        let engine = AdjustmentEngine::new();
        let (total, factors) = engine.adjust_with_factors(&ApplicantRecord::new());

        assert_eq!(total, 40.0);
        assert_eq!(factors, vec!["Low credit utilization"]);
    }

    #[test]
    fn test_boundaries_do_not_trigger() {
        let engine = AdjustmentEngine::new();
        let record = ApplicantRecord::new()
            .with("payment_history_score", 90)
            .with("years_of_credit_history", 5)
            .with("credit_utilization", 30);

        assert_eq!(engine.adjust(&record), 0.0);
    }

    #[test]
    fn test_finalize_clamps_after_adjustment() {
        let engine = AdjustmentEngine::new();

        assert_eq!(engine.finalize(800.0 + 120.0), 850.0);
        assert_eq!(engine.finalize(250.0), 300.0);
        assert_eq!(engine.finalize(620.004), 620.0);
        assert_eq!(engine.finalize(619.996), 620.0);
    }
}
