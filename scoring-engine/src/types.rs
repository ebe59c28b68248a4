//! Core types for the scoring engine

use crate::classify::{BusinessRiskTier, FraudRiskTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Ordered numeric feature encoding of a record.
///
/// Slot order is a fixed contract between the extractor, the scaler and the
/// models; see [`crate::features`] for the named order constants.
pub type FeatureVector = Vec<f64>;

/// Reads a numeric value out of a semi-structured field.
///
/// JSON numbers pass through; numeric strings are parsed. Anything else
/// (booleans, arrays, objects, non-numeric strings) reads as absent.
fn coerce_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

macro_rules! record_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Map<String, Value>);

        impl $name {
            /// Create an empty record
            pub fn new() -> Self {
                Self(Map::new())
            }

            /// Read a field as a number, if present and coercible
            pub fn numeric(&self, key: &str) -> Option<f64> {
                self.0.get(key).and_then(coerce_numeric)
            }

            /// Read a field as a number, defaulting to 0.0
            pub fn numeric_or_zero(&self, key: &str) -> f64 {
                self.numeric(key).unwrap_or(0.0)
            }

            /// Read a field as a string slice, if present
            pub fn text(&self, key: &str) -> Option<&str> {
                self.0.get(key).and_then(Value::as_str)
            }

            /// Set a field, consuming and returning the record
            pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
                self.0.insert(key.to_string(), value.into());
                self
            }
        }
    };
}

record_type! {
    /// Loan applicant attributes (annual income, credit history, payment
    /// history score, debt-to-income ratio, inquiries, age, utilization).
    /// Missing keys default to 0.0; the engine never mutates the record.
    ApplicantRecord
}

record_type! {
    /// Transaction attributes for fraud assessment (amount, time of day,
    /// distance from last transaction, 24h frequency, historical average).
    TransactionRecord
}

record_type! {
    /// Business-loan applicant profile (annual revenue, years in
    /// operation, free-text industry label).
    BusinessProfile
}

/// Final credit score for an applicant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditScoreResult {
    /// Assessment ID
    pub assessment_id: Uuid,

    /// Final score, clamped to [300, 850], rounded to 2 decimal places
    pub score: f64,

    /// Raw model prediction before adjustments
    pub base_score: f64,

    /// Total rule-based adjustment applied
    pub adjustment: f64,

    /// Assessment timestamp
    pub assessed_at: DateTime<Utc>,
}

/// Fraud-likelihood assessment for a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudAssessment {
    /// Assessment ID
    pub assessment_id: Uuid,

    /// Probability of fraud, in [0, 1]
    pub probability: f64,

    /// Whether the probability exceeds the suspicion threshold
    pub is_suspicious: bool,

    /// Risk tier derived from the probability
    pub risk_tier: FraudRiskTier,

    /// Assessment timestamp
    pub assessed_at: DateTime<Utc>,
}

/// Rule-based risk assessment for a business-loan applicant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessRiskAssessment {
    /// Assessment ID
    pub assessment_id: Uuid,

    /// Sum of all triggered rule deltas (maximum 80 under the current rule set)
    pub risk_score: i64,

    /// Risk tier derived from the score
    pub risk_tier: BusinessRiskTier,

    /// Descriptions of the contributing factors, in rule order
    pub factors: Vec<String>,

    /// Assessment timestamp
    pub assessed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_coercion() {
        let record = ApplicantRecord::new()
            .with("annual_income", 85_000.5)
            .with("age", "42")
            .with("notes", "self-employed")
            .with("flagged", true);

        assert_eq!(record.numeric("annual_income"), Some(85_000.5));
        assert_eq!(record.numeric("age"), Some(42.0));
        assert_eq!(record.numeric("notes"), None);
        assert_eq!(record.numeric("flagged"), None);
        assert_eq!(record.numeric_or_zero("missing"), 0.0);
    }

    #[test]
    fn test_record_deserializes_from_request_body() {
        let body = json!({
            "annual_income": 60000,
            "years_of_credit_history": 8,
            "industry": "retail"
        });

        let record: ApplicantRecord = serde_json::from_value(body).unwrap();
        assert_eq!(record.numeric_or_zero("annual_income"), 60_000.0);
        assert_eq!(record.text("industry"), Some("retail"));
    }
}
