//! Scored transaction record handed to the storage collaborator

use crate::features::FeatureVector;
use crate::types::response::{Prediction, RiskLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A transaction together with its scoring outcome.
///
/// Created once per request; ownership passes to the storage collaborator
/// and the core never reads it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredTransaction {
    /// Unique record identifier
    pub transaction_id: String,

    /// Last four characters of the card number; the full number is never
    /// retained
    pub card_suffix: String,

    pub merchant: String,

    pub location: String,

    /// Features the prediction was made from
    pub features: FeatureVector,

    pub prediction: Prediction,

    /// Confidence of the predicted class
    pub probability: f64,

    pub risk_level: RiskLevel,

    pub timestamp: DateTime<Utc>,
}

impl ScoredTransaction {
    /// Assemble a record from the raw payload and the scoring outcome.
    pub fn from_request(
        payload: &Value,
        features: FeatureVector,
        prediction: Prediction,
        probability: f64,
        risk_level: RiskLevel,
    ) -> Self {
        Self {
            transaction_id: uuid::Uuid::new_v4().to_string(),
            card_suffix: card_suffix(payload),
            merchant: string_field(payload, "merchant"),
            location: string_field(payload, "location"),
            features,
            prediction,
            probability,
            risk_level,
            timestamp: Utc::now(),
        }
    }
}

/// Extract the last four characters of the card number field.
fn card_suffix(payload: &Value) -> String {
    let raw = match payload.get("card_number") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "0000".to_string(),
    };
    let chars: Vec<char> = raw.chars().collect();
    let start = chars.len().saturating_sub(4);
    chars[start..].iter().collect()
}

fn string_field(payload: &Value, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => "Unknown".to_string(),
    }
}
