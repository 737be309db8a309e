//! Scoring service orchestration.
//!
//! Owns the model lifecycle (load-or-train at startup) and the per-request
//! path: feature building, scaling, prediction, risk classification, and
//! hand-off of the scored record to the storage collaborator.

use crate::config::AppConfig;
use crate::error::{InitError, ScoringError};
use crate::features::FeatureVectorBuilder;
use crate::models::evaluation::EvaluationReport;
use crate::models::forest::{ForestParams, RandomForest};
use crate::models::scaler::StandardScaler;
use crate::models::store::ModelStore;
use crate::models::synthesizer::{SynthesizerConfig, TrainingDataSynthesizer};
use crate::storage::TransactionStore;
use crate::types::response::{AggregateStats, Prediction, RiskLevel, RiskLevelThresholds, ScoreResponse};
use crate::types::transaction::ScoredTransaction;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Model lifecycle state, one pass per process lifetime:
/// `Uninitialized -> Loading -> {Ready | Training -> Ready}`.
enum ModelState {
    Uninitialized,
    Loading,
    Training,
    Ready {
        classifier: RandomForest,
        scaler: StandardScaler,
    },
}

impl ModelState {
    fn name(&self) -> &'static str {
        match self {
            ModelState::Uninitialized => "uninitialized",
            ModelState::Loading => "loading",
            ModelState::Training => "training",
            ModelState::Ready { .. } => "ready",
        }
    }
}

/// Result of one scoring request.
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    pub response: ScoreResponse,
    pub record: ScoredTransaction,
    /// False when the storage collaborator rejected the record; the score
    /// itself is still valid.
    pub persisted: bool,
}

/// Orchestrates builder -> scaler -> classifier -> risk tier for each
/// request. Construct explicitly and inject the storage collaborator;
/// tests can run independent instances with distinct seeds and artifact
/// directories.
pub struct ScoringService {
    builder: FeatureVectorBuilder,
    model_store: ModelStore,
    storage: Arc<dyn TransactionStore>,
    thresholds: RiskLevelThresholds,
    forest_params: ForestParams,
    synthesizer_config: SynthesizerConfig,
    test_fraction: f64,
    state: RwLock<ModelState>,
}

impl ScoringService {
    pub fn new(config: &AppConfig, storage: Arc<dyn TransactionStore>) -> Self {
        Self {
            builder: FeatureVectorBuilder::new(),
            model_store: ModelStore::new(config.model.artifacts_dir.clone()),
            storage,
            thresholds: config.detection.risk_levels.clone(),
            forest_params: config.model.forest_params(),
            synthesizer_config: config.training.synthesizer_config(),
            test_fraction: config.training.test_fraction,
            state: RwLock::new(ModelState::Uninitialized),
        }
    }

    /// Current lifecycle state name, for logs and tests.
    pub fn state_name(&self) -> &'static str {
        self.state.read().unwrap().name()
    }

    pub fn is_ready(&self) -> bool {
        matches!(&*self.state.read().unwrap(), ModelState::Ready { .. })
    }

    /// One-time blocking initialization: load the persisted model pair,
    /// or fall back to training when no usable pair exists.
    ///
    /// A failed training pass is fatal; there is no valid fallback past
    /// this point.
    pub fn initialize(&self) -> Result<(), InitError> {
        *self.state.write().unwrap() = ModelState::Loading;

        match self.model_store.load() {
            Ok((classifier, scaler)) => {
                info!("Loaded persisted model, scoring service ready");
                *self.state.write().unwrap() = ModelState::Ready { classifier, scaler };
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "No usable model artifacts, training from synthetic data");
                self.train()
            }
        }
    }

    fn train(&self) -> Result<(), InitError> {
        *self.state.write().unwrap() = ModelState::Training;

        let dataset =
            TrainingDataSynthesizer::new(self.synthesizer_config.clone()).synthesize();
        info!(
            samples = dataset.len(),
            fraud = dataset.fraud_count(),
            "Synthetic training data generated"
        );

        let (train, test) =
            dataset.stratified_split(self.test_fraction, self.synthesizer_config.seed);

        let mut scaler = StandardScaler::new();
        let scaled_train = scaler.fit_transform(&train.feature_rows())?;
        let scaled_test = scaler.transform_all(&test.feature_rows())?;

        let mut classifier = RandomForest::new(self.forest_params.clone());
        classifier.fit(&scaled_train, &train.labels());
        info!(
            trees = self.forest_params.trees,
            max_depth = self.forest_params.max_depth,
            "Classifier trained"
        );

        // Diagnostic only; the freshly trained model is always accepted.
        let predictions = classifier.predict_all(&scaled_test)?;
        EvaluationReport::compute(&test.labels(), &predictions).log();

        self.model_store.save(&classifier, &scaler)?;

        *self.state.write().unwrap() = ModelState::Ready { classifier, scaler };
        info!("Model trained and saved, scoring service ready");
        Ok(())
    }

    /// Score one request payload and hand the record to storage.
    pub async fn score(&self, payload: &Value) -> Result<ScoreOutcome, ScoringError> {
        let features = self.builder.build(payload);

        // Guard scope keeps the read lock away from the await below.
        let (label, probabilities) = {
            let state = self.state.read().unwrap();
            let ModelState::Ready { classifier, scaler } = &*state else {
                return Err(ScoringError::ModelNotReady { state: state.name() });
            };

            let scaled = scaler.transform(&features.to_vec())?;
            (
                classifier.predict(&scaled)?,
                classifier.predict_proba(&scaled)?,
            )
        };

        let prediction = Prediction::from_label(label);
        let confidence = probabilities[0].max(probabilities[1]);
        let risk_level = RiskLevel::from_confidence(confidence, &self.thresholds);

        let record = ScoredTransaction::from_request(
            payload,
            features,
            prediction,
            confidence,
            risk_level,
        );
        let response = ScoreResponse {
            prediction,
            probability: confidence,
            risk_level,
        };

        let persisted = match self.storage.persist_transaction(&record).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    transaction_id = %record.transaction_id,
                    error = %e,
                    "Failed to persist scored transaction, score still returned"
                );
                false
            }
        };

        debug!(
            transaction_id = %record.transaction_id,
            prediction = ?prediction,
            probability = confidence,
            risk_level = ?risk_level,
            "Transaction scored"
        );

        Ok(ScoreOutcome {
            response,
            record,
            persisted,
        })
    }

    /// Pass-through read of aggregate stats from the storage collaborator.
    pub async fn aggregate_stats(&self) -> Result<AggregateStats, crate::error::StorageError> {
        self.storage.read_aggregate_stats().await
    }
}
