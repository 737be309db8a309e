//! Scoring response and risk classification types

use serde::{Deserialize, Serialize};

/// Predicted class for a scored transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    Legitimate,
    Fraudulent,
}

impl Prediction {
    /// Map a classifier label (0 = legitimate, 1 = fraud) to a prediction
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Prediction::Fraudulent
        } else {
            Prediction::Legitimate
        }
    }

    pub fn is_fraud(&self) -> bool {
        matches!(self, Prediction::Fraudulent)
    }
}

/// Risk tier derived from prediction confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Determine risk tier from confidence and thresholds.
    ///
    /// Confidence strictly above `high` maps to High, strictly above
    /// `medium` maps to Medium, everything else is Low.
    pub fn from_confidence(confidence: f64, thresholds: &RiskLevelThresholds) -> Self {
        if confidence > thresholds.high {
            RiskLevel::High
        } else if confidence > thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Configurable risk tier thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLevelThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            high: 0.7,
            medium: 0.4,
        }
    }
}

/// Response returned to the caller of a scoring request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub prediction: Prediction,
    /// Confidence of the predicted class (maximum class probability)
    pub probability: f64,
    pub risk_level: RiskLevel,
}

/// Aggregate counters reported by the storage collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total: u64,
    pub fraud_count: u64,
    pub legitimate_count: u64,
}

impl AggregateStats {
    /// Fraud share as a percentage of all stored transactions.
    ///
    /// An empty store yields 0 rather than dividing by zero.
    pub fn fraud_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.fraud_count as f64 / self.total as f64 * 100.0
        }
    }
}
