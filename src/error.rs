//! Error taxonomy for the fraud scoring pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by model components (scaler, classifier) when their
/// fit-before-use contract is violated.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Predict was called on a classifier that has not been fitted or loaded.
    #[error("classifier is not trained; fit or load a model first")]
    NotTrained,

    /// Transform was called on a scaler that has not been fitted.
    #[error("scaler is not fitted; call fit before transform")]
    ScalerNotFitted,
}

/// Errors raised by the model store when persisting or loading the
/// classifier + scaler artifact pair.
#[derive(Debug, Error)]
pub enum StoreError {
    /// One or both artifacts are absent on disk.
    #[error("model artifact missing: {0}")]
    ArtifactMissing(PathBuf),

    /// An artifact exists but failed to deserialize into a usable model.
    #[error("model artifact corrupt at {path}: {reason}")]
    ArtifactCorrupt { path: PathBuf, reason: String },

    #[error("model store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model artifact serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors from the external storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to persist transaction record: {0}")]
    Persist(String),

    #[error("failed to read aggregate stats: {0}")]
    Stats(String),
}

/// Errors surfaced to callers of a scoring request.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Scoring was attempted before initialization completed.
    #[error("scoring service is not ready (state: {state})")]
    ModelNotReady { state: &'static str },

    /// Should be unreachable once the service state machine is respected.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors fatal to service initialization. There is no fallback past a
/// failed training pass.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("training produced an unusable model: {0}")]
    Model(#[from] ModelError),

    #[error("failed to persist trained model: {0}")]
    Persist(#[from] StoreError),
}
