//! Fraud Scoring Service Library
//!
//! A real-time credit card fraud scoring pipeline: synthesizes its own
//! training data when no model exists, trains and persists a random
//! forest classifier with its feature scaler, and serves per-request risk
//! scores.

pub mod config;
pub mod consumer;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod service;
pub mod storage;
pub mod types;

pub use config::AppConfig;
pub use consumer::ScoreRequestConsumer;
pub use features::{FeatureVector, FeatureVectorBuilder};
pub use models::forest::RandomForest;
pub use models::scaler::StandardScaler;
pub use models::store::ModelStore;
pub use service::ScoringService;
pub use storage::{NatsTransactionStore, TransactionStore};
pub use types::{Prediction, RiskLevel, ScoreResponse, ScoredTransaction};
