//! Fixed-order feature extraction
//!
//! The slot order below is a versioned contract shared by the extractor,
//! the scaler and the models. Persisted artifacts embed
//! [`FEATURE_SCHEMA_VERSION`] and are rejected on mismatch, since a silent
//! reorder would corrupt every prediction without any runtime signal.

use crate::types::{ApplicantRecord, FeatureVector, TransactionRecord};

/// Version of the feature slot ordering baked into trained artifacts
pub const FEATURE_SCHEMA_VERSION: u16 = 1;

/// Applicant feature slots, in model input order
pub const APPLICANT_FEATURES: [&str; 7] = [
    "annual_income",
    "years_of_credit_history",
    "num_accounts",
    "payment_history_score",
    "debt_to_income_ratio",
    "num_recent_inquiries",
    "age",
];

/// Transaction feature slots, in model input order
pub const TRANSACTION_FEATURES: [&str; 5] = [
    "amount",
    "time_of_day",
    "distance_from_last_transaction",
    "frequency_last_24h",
    "average_transaction_amount",
];

/// Maps semi-structured records into fixed-order numeric feature vectors.
///
/// Extraction is total: a missing or non-coercible field degrades to 0.0
/// for that slot rather than failing the whole vector.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor
    pub fn new() -> Self {
        Self
    }

    /// Extract the 7-slot applicant vector
    pub fn extract_applicant(&self, record: &ApplicantRecord) -> FeatureVector {
        APPLICANT_FEATURES
            .iter()
            .map(|&key| record.numeric_or_zero(key))
            .collect()
    }

    /// Extract the 5-slot transaction vector
    pub fn extract_transaction(&self, record: &TransactionRecord) -> FeatureVector {
        TRANSACTION_FEATURES
            .iter()
            .map(|&key| record.numeric_or_zero(key))
            .collect()
    }

    /// Number of applicant feature slots
    pub fn applicant_feature_count(&self) -> usize {
        APPLICANT_FEATURES.len()
    }

    /// Number of transaction feature slots
    pub fn transaction_feature_count(&self) -> usize {
        TRANSACTION_FEATURES.len()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applicant_extraction_order() {
        let extractor = FeatureExtractor::new();
        let record = ApplicantRecord::new()
            .with("annual_income", 85_000.0)
            .with("years_of_credit_history", 12)
            .with("num_accounts", 4)
            .with("payment_history_score", 92)
            .with("debt_to_income_ratio", 0.28)
            .with("num_recent_inquiries", 1)
            .with("age", 41);

        let features = extractor.extract_applicant(&record);

        assert_eq!(features.len(), extractor.applicant_feature_count());
        assert_eq!(features[0], 85_000.0);
        assert_eq!(features[3], 92.0);
        assert_eq!(features[6], 41.0);
    }

    #[test]
    fn test_empty_record_yields_zero_vector() {
        let extractor = FeatureExtractor::new();

        let applicant = extractor.extract_applicant(&ApplicantRecord::new());
        assert_eq!(applicant, vec![0.0; 7]);

        let transaction = extractor.extract_transaction(&TransactionRecord::new());
        assert_eq!(transaction, vec![0.0; 5]);
    }

    #[test]
    fn test_malformed_field_degrades_to_default() {
        let extractor = FeatureExtractor::new();
        let record = TransactionRecord::new()
            .with("amount", "not-a-number")
            .with("time_of_day", 14.5);

        let features = extractor.extract_transaction(&record);
        assert_eq!(features[0], 0.0);
        assert_eq!(features[1], 14.5);
    }

    #[test]
    fn test_extraction_does_not_mutate_record() {
        let extractor = FeatureExtractor::new();
        let record = ApplicantRecord::new().with("age", 30);
        let before = record.clone();

        extractor.extract_applicant(&record);
        assert_eq!(record, before);
    }
}
