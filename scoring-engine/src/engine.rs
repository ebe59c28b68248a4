//! Scoring engine facade
//!
//! Ties the pipeline together: extraction, normalization, model
//! inference, rule-based post-processing. Trained state lives in an
//! immutable snapshot behind an `RwLock<Arc<_>>`; training and restore
//! build a fresh snapshot and swap the pointer, so concurrent in-flight
//! scoring calls always complete against a consistent state.

use crate::adjustments::AdjustmentEngine;
use crate::business::BusinessRiskEvaluator;
use crate::classify::FraudRiskTier;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::features::FeatureExtractor;
use crate::model::{CreditRegressor, FraudClassifier, ScoreModel};
use crate::scaler::{ScalerState, StandardScaler};
use crate::store::{ModelStore, ScalerArtifact};
use crate::types::{
    ApplicantRecord, BusinessProfile, BusinessRiskAssessment, CreditScoreResult, FeatureVector,
    FraudAssessment, TransactionRecord,
};
use chrono::Utc;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Immutable trained state shared across concurrent scoring calls
#[derive(Clone)]
struct ModelSnapshot {
    credit_scaler: Option<ScalerState>,
    fraud_scaler: Option<ScalerState>,
    credit_model: CreditRegressor,
    fraud_model: FraudClassifier,
}

/// Risk scoring engine.
///
/// Each scoring call is a synchronous pure computation over its input and
/// the currently loaded snapshot; no internal concurrency, cancellation or
/// timeouts. Callers may score concurrently; training and restore swap in
/// a new snapshot atomically.
pub struct ScoringEngine {
    config: EngineConfig,
    extractor: FeatureExtractor,
    scaler: StandardScaler,
    adjustments: AdjustmentEngine,
    business: BusinessRiskEvaluator,
    store: ModelStore,
    snapshot: RwLock<Arc<ModelSnapshot>>,
}

impl ScoringEngine {
    /// Create an untrained engine with the given configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let snapshot = ModelSnapshot {
            credit_scaler: None,
            fraud_scaler: None,
            credit_model: CreditRegressor::new(config.regressor.clone()),
            fraud_model: FraudClassifier::new(config.classifier.clone()),
        };

        Ok(Self {
            config,
            extractor: FeatureExtractor::new(),
            scaler: StandardScaler::new(),
            adjustments: AdjustmentEngine::new(),
            business: BusinessRiskEvaluator::new(),
            store: ModelStore::new(),
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Clone the current snapshot pointer; the lock is held only for the copy
    fn current(&self) -> Arc<ModelSnapshot> {
        self.snapshot.read().clone()
    }

    /// Score a loan applicant.
    ///
    /// Extracts the applicant vector, normalizes it against the trained
    /// statistics, runs the regressor, then adds rule bonuses and clamps
    /// into [300, 850].
    pub fn score_credit(&self, record: &ApplicantRecord) -> Result<CreditScoreResult> {
        let snapshot = self.current();
        let scaler_state = snapshot
            .credit_scaler
            .as_ref()
            .ok_or_else(|| Error::NotTrained("credit scaler".into()))?;

        let vector = self.extractor.extract_applicant(record);
        let normalized = self.scaler.transform(scaler_state, &vector)?;
        let base_score = snapshot.credit_model.predict(&normalized)?;

        let adjustment = self.adjustments.adjust(record);
        let score = self.adjustments.finalize(base_score + adjustment);

        debug!(
            base_score = base_score,
            adjustment = adjustment,
            score = score,
            "Credit score computed"
        );

        Ok(CreditScoreResult {
            assessment_id: Uuid::new_v4(),
            score,
            base_score,
            adjustment,
            assessed_at: Utc::now(),
        })
    }

    /// Assess a transaction for fraud likelihood
    pub fn assess_fraud(&self, record: &TransactionRecord) -> Result<FraudAssessment> {
        let snapshot = self.current();
        let scaler_state = snapshot
            .fraud_scaler
            .as_ref()
            .ok_or_else(|| Error::NotTrained("fraud scaler".into()))?;

        let vector = self.extractor.extract_transaction(record);
        let normalized = self.scaler.transform(scaler_state, &vector)?;
        let probability = snapshot.fraud_model.predict_probability(&normalized)?;

        let is_suspicious = probability > self.config.suspicion_threshold;
        let risk_tier = FraudRiskTier::from_probability(probability);

        debug!(
            probability = probability,
            is_suspicious = is_suspicious,
            risk_tier = ?risk_tier,
            "Fraud assessment computed"
        );

        Ok(FraudAssessment {
            assessment_id: Uuid::new_v4(),
            probability,
            is_suspicious,
            risk_tier,
            assessed_at: Utc::now(),
        })
    }

    /// Assess a business-loan applicant.
    ///
    /// Model-free rule path; available even on an untrained engine.
    pub fn assess_business_risk(&self, profile: &BusinessProfile) -> BusinessRiskAssessment {
        self.business.evaluate(profile)
    }

    /// Train the credit path from a batch of historical applicant records.
    ///
    /// Fits the applicant scaler from the batch, trains the regressor on
    /// the normalized vectors, then swaps a new snapshot in.
    pub fn train_credit(&self, records: &[ApplicantRecord], labels: &[f64]) -> Result<()> {
        let features: Vec<FeatureVector> = records
            .iter()
            .map(|r| self.extractor.extract_applicant(r))
            .collect();
        let (scaler_state, model) = self.fit_path(&features, labels, || {
            CreditRegressor::new(self.config.regressor.clone())
        })?;

        let mut guard = self.snapshot.write();
        let mut next = (**guard).clone();
        next.credit_scaler = Some(scaler_state);
        next.credit_model = model;
        *guard = Arc::new(next);

        info!(samples = records.len(), "Credit path trained");
        Ok(())
    }

    /// Train the fraud path from a batch of historical transaction records
    pub fn train_fraud(&self, records: &[TransactionRecord], labels: &[f64]) -> Result<()> {
        let features: Vec<FeatureVector> = records
            .iter()
            .map(|r| self.extractor.extract_transaction(r))
            .collect();
        let (scaler_state, model) = self.fit_path(&features, labels, || {
            FraudClassifier::new(self.config.classifier.clone())
        })?;

        let mut guard = self.snapshot.write();
        let mut next = (**guard).clone();
        next.fraud_scaler = Some(scaler_state);
        next.fraud_model = model;
        *guard = Arc::new(next);

        info!(samples = records.len(), "Fraud path trained");
        Ok(())
    }

    /// Fit a scaler and train a model against the normalized batch
    fn fit_path<M: ScoreModel>(
        &self,
        features: &[FeatureVector],
        labels: &[f64],
        make_model: impl FnOnce() -> M,
    ) -> Result<(ScalerState, M)> {
        let scaler_state = self.scaler.fit(features)?;
        let normalized: Vec<FeatureVector> = features
            .iter()
            .map(|v| self.scaler.transform(&scaler_state, v))
            .collect::<Result<_>>()?;

        let mut model = make_model();
        model.train(&normalized, labels)?;
        Ok((scaler_state, model))
    }

    /// Persist the trained scaler and model state to a directory.
    ///
    /// Both scoring paths must be trained; a partially trained engine has
    /// nothing coherent to persist.
    pub fn persist(&self, dir: &Path) -> Result<()> {
        let snapshot = self.current();

        let scalers = ScalerArtifact {
            credit: snapshot
                .credit_scaler
                .clone()
                .ok_or_else(|| Error::NotTrained("credit scaler".into()))?,
            fraud: snapshot
                .fraud_scaler
                .clone()
                .ok_or_else(|| Error::NotTrained("fraud scaler".into()))?,
        };
        let credit = snapshot
            .credit_model
            .state()
            .ok_or_else(|| Error::NotTrained("credit regressor".into()))?;
        let fraud = snapshot
            .fraud_model
            .state()
            .ok_or_else(|| Error::NotTrained("fraud classifier".into()))?;

        self.store.save(dir, &scalers, credit, fraud)
    }

    /// Persist to the configured artifact directory
    pub fn persist_default(&self) -> Result<()> {
        self.persist(&self.config.artifact_dir)
    }

    /// Replace engine state with artifacts loaded from a directory.
    ///
    /// All-or-nothing: if any artifact is missing or corrupt, the current
    /// state stays in place. In-flight scoring calls complete against the
    /// snapshot they started with.
    pub fn restore(&self, dir: &Path) -> Result<()> {
        let (scalers, credit, fraud) = self.store.load(dir)?;

        let next = ModelSnapshot {
            credit_scaler: Some(scalers.credit),
            fraud_scaler: Some(scalers.fraud),
            credit_model: CreditRegressor::from_state(credit)?,
            fraud_model: FraudClassifier::from_state(fraud)?,
        };

        *self.snapshot.write() = Arc::new(next);
        info!(dir = %dir.display(), "Engine state restored");
        Ok(())
    }

    /// Restore from the configured artifact directory
    pub fn restore_default(&self) -> Result<()> {
        self.restore(&self.config.artifact_dir)
    }

    /// Whether both scoring paths have trained state loaded
    pub fn is_trained(&self) -> bool {
        let snapshot = self.current();
        snapshot.credit_scaler.is_some()
            && snapshot.fraud_scaler.is_some()
            && snapshot.credit_model.is_trained()
            && snapshot.fraud_model.is_trained()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applicant(income: f64, history: f64, payment: f64) -> ApplicantRecord {
        ApplicantRecord::new()
            .with("annual_income", income)
            .with("years_of_credit_history", history)
            .with("num_accounts", 3)
            .with("payment_history_score", payment)
            .with("debt_to_income_ratio", 0.3)
            .with("num_recent_inquiries", 1)
            .with("age", 40)
    }

    fn transaction(amount: f64, distance: f64) -> TransactionRecord {
        TransactionRecord::new()
            .with("amount", amount)
            .with("time_of_day", 13.0)
            .with("distance_from_last_transaction", distance)
            .with("frequency_last_24h", 2)
            .with("average_transaction_amount", 120.0)
    }

    fn trained_engine() -> ScoringEngine {
        let engine = ScoringEngine::new(EngineConfig::default()).unwrap();

        let applicants: Vec<ApplicantRecord> = (0..20)
            .map(|i| applicant(30_000.0 + 4_000.0 * i as f64, i as f64, 60.0 + i as f64))
            .collect();
        let credit_labels: Vec<f64> = (0..20).map(|i| 450.0 + 15.0 * i as f64).collect();
        engine.train_credit(&applicants, &credit_labels).unwrap();

        let transactions: Vec<TransactionRecord> = (0..20)
            .map(|i| transaction(50.0 + 300.0 * i as f64, 2.0 * i as f64))
            .collect();
        let fraud_labels: Vec<f64> = (0..20).map(|i| if i >= 10 { 1.0 } else { 0.0 }).collect();
        engine.train_fraud(&transactions, &fraud_labels).unwrap();

        engine
    }

    #[test]
    fn test_untrained_engine_refuses_model_paths() {
        let engine = ScoringEngine::new(EngineConfig::default()).unwrap();

        assert!(matches!(
            engine.score_credit(&applicant(50_000.0, 5.0, 80.0)),
            Err(Error::NotTrained(_))
        ));
        assert!(matches!(
            engine.assess_fraud(&transaction(100.0, 1.0)),
            Err(Error::NotTrained(_))
        ));
        assert!(!engine.is_trained());
    }

    #[test]
    fn test_business_path_works_untrained() {
        let engine = ScoringEngine::new(EngineConfig::default()).unwrap();
        let profile = BusinessProfile::new()
            .with("annual_revenue", 2_000_000)
            .with("years_in_operation", 7)
            .with("industry", "technology");

        let assessment = engine.assess_business_risk(&profile);
        assert_eq!(assessment.risk_score, 80);
    }

    #[test]
    fn test_trained_engine_scores_within_range() {
        let engine = trained_engine();
        assert!(engine.is_trained());

        let result = engine.score_credit(&applicant(95_000.0, 12.0, 95.0)).unwrap();
        assert!((300.0..=850.0).contains(&result.score));
        assert_eq!(result.adjustment, 120.0);

        let assessment = engine.assess_fraud(&transaction(4_000.0, 30.0)).unwrap();
        assert!((0.0..=1.0).contains(&assessment.probability));
    }

    #[test]
    fn test_scoring_is_deterministic_per_snapshot() {
        let engine = trained_engine();
        let record = applicant(60_000.0, 8.0, 92.0);

        let a = engine.score_credit(&record).unwrap();
        let b = engine.score_credit(&record).unwrap();
        assert_eq!(a.score, b.score);
        assert_eq!(a.base_score, b.base_score);
    }

    #[test]
    fn test_persist_requires_trained_state() {
        let engine = ScoringEngine::new(EngineConfig::default()).unwrap();
        let dir = tempfile::TempDir::new().unwrap();

        assert!(matches!(
            engine.persist(dir.path()),
            Err(Error::NotTrained(_))
        ));
    }

    #[test]
    fn test_failed_restore_leaves_state_in_place() {
        let engine = trained_engine();
        let record = applicant(60_000.0, 8.0, 92.0);
        let before = engine.score_credit(&record).unwrap();

        let empty = tempfile::TempDir::new().unwrap();
        assert!(engine.restore(empty.path()).is_err());

        let after = engine.score_credit(&record).unwrap();
        assert_eq!(before.score, after.score);
    }
}
