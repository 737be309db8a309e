//! Feature normalization.
//!
//! Standard scaling (zero mean, unit variance) fit once on the training
//! subset and applied with the same statistics to every subsequent input.
//! Re-fitting per request would make predictions incomparable across
//! requests, so the fitted state is immutable on the inference path.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Per-feature normalization statistics learned from training data.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerStats {
    mean: Vec<f64>,
    std_dev: Vec<f64>,
}

/// Stateful standard scaler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    stats: Option<ScalerStats>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute and store normalization statistics from training rows.
    ///
    /// Calling fit again overwrites prior statistics; nothing accumulates.
    pub fn fit(&mut self, rows: &[Vec<f64>]) {
        if rows.is_empty() {
            self.stats = None;
            return;
        }

        let width = rows[0].len();
        let count = rows.len() as f64;

        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, value) in mean.iter_mut().zip(row.iter()) {
                *m += value;
            }
        }
        for m in mean.iter_mut() {
            *m /= count;
        }

        let mut std_dev = vec![0.0; width];
        for row in rows {
            for ((s, value), m) in std_dev.iter_mut().zip(row.iter()).zip(mean.iter()) {
                *s += (value - m).powi(2);
            }
        }
        for s in std_dev.iter_mut() {
            *s = (*s / count).sqrt();
            // Constant features pass through centered instead of dividing
            // by zero.
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        self.stats = Some(ScalerStats { mean, std_dev });
    }

    /// Apply the fitted statistics to a single row.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        let stats = self.stats.as_ref().ok_or(ModelError::ScalerNotFitted)?;

        Ok(row
            .iter()
            .zip(stats.mean.iter().zip(stats.std_dev.iter()))
            .map(|(value, (mean, std_dev))| (value - mean) / std_dev)
            .collect())
    }

    /// Apply the fitted statistics to many rows.
    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        rows.iter().map(|row| self.transform(row)).collect()
    }

    /// Fit on the given rows, then transform them.
    pub fn fit_transform(&mut self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        self.fit(rows);
        self.transform_all(rows)
    }

    pub fn is_fitted(&self) -> bool {
        self.stats.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_before_fit_fails() {
        let scaler = StandardScaler::new();
        let result = scaler.transform(&[1.0, 2.0]);
        assert!(matches!(result, Err(ModelError::ScalerNotFitted)));
    }

    #[test]
    fn test_fit_transform_normalizes() {
        let rows = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&rows).unwrap();

        // Columns become zero-mean
        for col in 0..2 {
            let mean: f64 = scaled.iter().map(|r| r[col]).sum::<f64>() / scaled.len() as f64;
            assert!(mean.abs() < 1e-9);
        }
        // Middle row sits at the mean
        assert!(scaled[1][0].abs() < 1e-9);
        assert!(scaled[1][1].abs() < 1e-9);
    }

    #[test]
    fn test_refit_overwrites() {
        let mut scaler = StandardScaler::new();
        scaler.fit(&[vec![0.0], vec![10.0]]);
        let first = scaler.transform(&[10.0]).unwrap();

        scaler.fit(&[vec![100.0], vec![300.0]]);
        let second = scaler.transform(&[10.0]).unwrap();

        // Statistics were replaced, not accumulated: same input, new scale.
        assert!((first[0] - 1.0).abs() < 1e-9);
        assert!(second[0] < 0.0);
    }

    #[test]
    fn test_constant_feature_passthrough() {
        let mut scaler = StandardScaler::new();
        scaler.fit(&[vec![5.0, 1.0], vec![5.0, 3.0]]);

        let scaled = scaler.transform(&[5.0, 2.0]).unwrap();
        // Zero-variance column is centered only
        assert_eq!(scaled[0], 0.0);
        assert!(scaled[1].abs() < 1e-9);
    }

    #[test]
    fn test_same_statistics_at_inference() {
        let mut scaler = StandardScaler::new();
        scaler.fit(&[vec![0.0], vec![2.0], vec![4.0]]);

        let a = scaler.transform(&[3.0]).unwrap();
        let b = scaler.transform(&[3.0]).unwrap();
        assert_eq!(a, b);
    }
}
