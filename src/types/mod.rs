//! Type definitions for the fraud scoring service

pub mod response;
pub mod transaction;

pub use response::{AggregateStats, Prediction, RiskLevel, RiskLevelThresholds, ScoreResponse};
pub use transaction::ScoredTransaction;
