//! Feature vector construction for fraud scoring.
//!
//! Maps a raw request payload into the fixed-order numeric vector the
//! classifier was trained on. The field order here and in
//! [`FeatureVector::to_vec`] must stay identical to the training data
//! layout; training and inference both go through this type.

use chrono::{Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Feature names in model input order.
pub const FEATURE_NAMES: [&str; 7] = [
    "amount",
    "merchant_category",
    "hour",
    "day_of_week",
    "is_weekend",
    "transaction_count_1h",
    "avg_amount_1h",
];

/// Fixed-order numeric representation of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub amount: f64,
    pub merchant_category: f64,
    pub hour: f64,
    pub day_of_week: f64,
    pub is_weekend: f64,
    pub transaction_count_1h: f64,
    pub avg_amount_1h: f64,
}

impl FeatureVector {
    /// Flatten into model input order.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.amount,
            self.merchant_category,
            self.hour,
            self.day_of_week,
            self.is_weekend,
            self.transaction_count_1h,
            self.avg_amount_1h,
        ]
    }
}

/// Builds feature vectors from raw request payloads.
///
/// Missing or uncoercible fields degrade to per-field defaults; a partial
/// or malformed payload still produces a usable vector. The builder never
/// fails.
pub struct FeatureVectorBuilder;

impl FeatureVectorBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build a feature vector from a JSON payload.
    ///
    /// Defaults: `amount` 0, `merchant_category` 1, `hour` current UTC
    /// hour, `day_of_week` current UTC weekday (Monday = 1), `is_weekend`
    /// 0, `transaction_count_1h` 1, `avg_amount_1h` the resolved amount.
    pub fn build(&self, payload: &Value) -> FeatureVector {
        let now = Utc::now();
        let amount = numeric_field(payload, "amount").unwrap_or(0.0);

        FeatureVector {
            amount,
            merchant_category: numeric_field(payload, "merchant_category").unwrap_or(1.0),
            hour: numeric_field(payload, "hour").unwrap_or_else(|| f64::from(now.hour())),
            day_of_week: numeric_field(payload, "day_of_week")
                .unwrap_or_else(|| f64::from(now.weekday().number_from_monday())),
            is_weekend: numeric_field(payload, "is_weekend").unwrap_or(0.0),
            transaction_count_1h: numeric_field(payload, "transaction_count_1h").unwrap_or(1.0),
            avg_amount_1h: numeric_field(payload, "avg_amount_1h").unwrap_or(amount),
        }
    }

    /// Number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_NAMES.len()
    }

    /// Feature names in model input order.
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

impl Default for FeatureVectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Coerce a payload field to f64.
///
/// Accepts JSON numbers, numeric strings, and booleans (true = 1).
/// Anything else is treated as absent so the caller's default applies.
fn numeric_field(payload: &Value, key: &str) -> Option<f64> {
    match payload.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_order() {
        let builder = FeatureVectorBuilder::new();
        let payload = json!({
            "amount": 120.5,
            "merchant_category": 7,
            "hour": 14,
            "day_of_week": 3,
            "is_weekend": 0,
            "transaction_count_1h": 2,
            "avg_amount_1h": 95.0
        });

        let features = builder.build(&payload).to_vec();

        assert_eq!(features.len(), builder.feature_count());
        assert_eq!(
            features,
            vec![120.5, 7.0, 14.0, 3.0, 0.0, 2.0, 95.0]
        );
        assert_eq!(builder.feature_names()[0], "amount");
        assert_eq!(builder.feature_names()[6], "avg_amount_1h");
    }

    #[test]
    fn test_empty_payload_defaults() {
        let builder = FeatureVectorBuilder::new();

        let before = Utc::now();
        let features = builder.build(&json!({}));
        let after = Utc::now();

        assert_eq!(features.amount, 0.0);
        assert_eq!(features.merchant_category, 1.0);
        assert_eq!(features.is_weekend, 0.0);
        assert_eq!(features.transaction_count_1h, 1.0);
        assert_eq!(features.avg_amount_1h, 0.0);

        // Current-time defaults; tolerate a boundary crossing mid-test.
        let hours = [f64::from(before.hour()), f64::from(after.hour())];
        assert!(hours.contains(&features.hour));
        let days = [
            f64::from(before.weekday().number_from_monday()),
            f64::from(after.weekday().number_from_monday()),
        ];
        assert!(days.contains(&features.day_of_week));
    }

    #[test]
    fn test_malformed_fields_degrade_to_defaults() {
        let builder = FeatureVectorBuilder::new();
        let payload = json!({
            "amount": "not a number",
            "merchant_category": [1, 2],
            "is_weekend": null,
            "transaction_count_1h": {"nested": true}
        });

        let features = builder.build(&payload);

        assert_eq!(features.amount, 0.0);
        assert_eq!(features.merchant_category, 1.0);
        assert_eq!(features.is_weekend, 0.0);
        assert_eq!(features.transaction_count_1h, 1.0);
    }

    #[test]
    fn test_string_and_bool_coercion() {
        let builder = FeatureVectorBuilder::new();
        let payload = json!({
            "amount": "250.75",
            "is_weekend": true
        });

        let features = builder.build(&payload);

        assert_eq!(features.amount, 250.75);
        assert_eq!(features.is_weekend, 1.0);
        // avg_amount_1h defaults to the coerced amount
        assert_eq!(features.avg_amount_1h, 250.75);
    }
}
