//! Post-training model diagnostics.
//!
//! Classification report and confusion matrix against the held-out test
//! subset. Diagnostic only: results are logged, never persisted, and do
//! not gate acceptance of a freshly trained model.

use tracing::info;

/// Precision/recall/F1 for one class.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: u64,
}

/// Row-major confusion matrix: `matrix[actual][predicted]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfusionMatrix {
    pub matrix: [[u64; 2]; 2],
}

/// Full evaluation over a labeled test subset.
#[derive(Debug, Clone, Default)]
pub struct EvaluationReport {
    /// Index 0 = legitimate, 1 = fraud
    pub per_class: [ClassMetrics; 2],
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
}

impl EvaluationReport {
    /// Compare predictions against true labels.
    pub fn compute(labels: &[u8], predictions: &[u8]) -> Self {
        let mut confusion = ConfusionMatrix::default();
        for (&actual, &predicted) in labels.iter().zip(predictions.iter()) {
            confusion.matrix[usize::from(actual)][usize::from(predicted)] += 1;
        }

        let mut per_class = [ClassMetrics::default(); 2];
        for class in 0..2 {
            let true_positive = confusion.matrix[class][class];
            let predicted_positive: u64 = (0..2).map(|a| confusion.matrix[a][class]).sum();
            let actual_positive: u64 = confusion.matrix[class].iter().sum();

            let precision = ratio(true_positive, predicted_positive);
            let recall = ratio(true_positive, actual_positive);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            per_class[class] = ClassMetrics {
                precision,
                recall,
                f1,
                support: actual_positive,
            };
        }

        let correct: u64 = (0..2).map(|c| confusion.matrix[c][c]).sum();
        let total = labels.len() as u64;

        Self {
            per_class,
            accuracy: ratio(correct, total),
            confusion,
        }
    }

    /// Log the report in classification-report form.
    pub fn log(&self) {
        info!("Model performance on held-out test set:");
        info!("  class         precision  recall  f1      support");
        for (name, metrics) in [
            ("legitimate", &self.per_class[0]),
            ("fraud", &self.per_class[1]),
        ] {
            info!(
                "  {:<12}  {:>9.3}  {:>6.3}  {:>6.3}  {:>7}",
                name, metrics.precision, metrics.recall, metrics.f1, metrics.support
            );
        }
        info!("  accuracy: {:.3}", self.accuracy);
        info!(
            "  confusion matrix [actual x predicted]: [[{}, {}], [{}, {}]]",
            self.confusion.matrix[0][0],
            self.confusion.matrix[0][1],
            self.confusion.matrix[1][0],
            self.confusion.matrix[1][1],
        );
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let labels = vec![0, 0, 1, 1];
        let report = EvaluationReport::compute(&labels, &labels);

        assert_eq!(report.accuracy, 1.0);
        for class in 0..2 {
            assert_eq!(report.per_class[class].precision, 1.0);
            assert_eq!(report.per_class[class].recall, 1.0);
            assert_eq!(report.per_class[class].f1, 1.0);
        }
        assert_eq!(report.confusion.matrix, [[2, 0], [0, 2]]);
    }

    #[test]
    fn test_mixed_predictions() {
        // actual:    0 0 0 1 1
        // predicted: 0 1 0 1 0
        let labels = vec![0, 0, 0, 1, 1];
        let predictions = vec![0, 1, 0, 1, 0];
        let report = EvaluationReport::compute(&labels, &predictions);

        assert!((report.accuracy - 0.6).abs() < 1e-9);
        // fraud precision: 1 of 2 predicted; recall: 1 of 2 actual
        assert!((report.per_class[1].precision - 0.5).abs() < 1e-9);
        assert!((report.per_class[1].recall - 0.5).abs() < 1e-9);
        assert_eq!(report.per_class[1].support, 2);
        assert_eq!(report.confusion.matrix, [[2, 1], [1, 1]]);
    }

    #[test]
    fn test_absent_class_does_not_divide_by_zero() {
        let labels = vec![0, 0, 0];
        let predictions = vec![0, 0, 0];
        let report = EvaluationReport::compute(&labels, &predictions);

        assert_eq!(report.per_class[1].precision, 0.0);
        assert_eq!(report.per_class[1].recall, 0.0);
        assert_eq!(report.per_class[1].f1, 0.0);
        assert_eq!(report.per_class[1].support, 0);
    }
}
