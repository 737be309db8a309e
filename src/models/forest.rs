//! Random forest classifier.
//!
//! Bagged ensemble of CART trees with class-balanced sample weights,
//! per-split feature subsampling, and a fixed master seed. Training data
//! is immutable during induction, so each tree is built independently.

use crate::error::ModelError;
use crate::models::tree::{DecisionTree, TreeParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Forest hyperparameters, fixed at training time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParams {
    pub trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// Trainable binary classifier (fraud / legitimate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Train on scaled feature rows and binary labels.
    ///
    /// Sample weights balance the classes (w_c = n / (2 * n_c)),
    /// compensating for the skewed fraud rate in the training data.
    pub fn fit(&mut self, rows: &[Vec<f64>], labels: &[u8]) {
        self.trees.clear();
        if rows.is_empty() {
            return;
        }

        let n = rows.len() as f64;
        let mut class_counts = [0usize; 2];
        for &label in labels {
            class_counts[usize::from(label)] += 1;
        }
        let class_weights = [
            balanced_weight(n, class_counts[0]),
            balanced_weight(n, class_counts[1]),
        ];
        let sample_weights: Vec<f64> = labels
            .iter()
            .map(|&label| class_weights[usize::from(label)])
            .collect();

        let n_features = rows[0].len();
        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
            features_per_split: ((n_features as f64).sqrt().floor() as usize).max(1),
        };

        let mut master = StdRng::seed_from_u64(self.params.seed);
        for _ in 0..self.params.trees {
            let mut tree_rng = StdRng::seed_from_u64(master.gen());

            // Bootstrap draw, same size as the training set
            let indices: Vec<usize> = (0..rows.len())
                .map(|_| tree_rng.gen_range(0..rows.len()))
                .collect();

            self.trees.push(DecisionTree::fit(
                rows,
                labels,
                &sample_weights,
                &indices,
                &tree_params,
                &mut tree_rng,
            ));
        }
    }

    /// Per-class probability distribution for one row, averaged over all
    /// trees' leaf distributions.
    pub fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], ModelError> {
        if !self.is_trained() {
            return Err(ModelError::NotTrained);
        }

        let mut sums = [0.0f64; 2];
        for tree in &self.trees {
            let proba = tree.predict_proba(row);
            sums[0] += proba[0];
            sums[1] += proba[1];
        }
        let count = self.trees.len() as f64;
        Ok([sums[0] / count, sums[1] / count])
    }

    /// Predicted class label for one row (argmax over probabilities,
    /// ties resolve to legitimate).
    pub fn predict(&self, row: &[f64]) -> Result<u8, ModelError> {
        let proba = self.predict_proba(row)?;
        Ok(u8::from(proba[1] > proba[0]))
    }

    /// Predicted labels for many rows.
    pub fn predict_all(&self, rows: &[Vec<f64>]) -> Result<Vec<u8>, ModelError> {
        rows.iter().map(|row| self.predict(row)).collect()
    }
}

fn balanced_weight(n: f64, class_count: usize) -> f64 {
    if class_count == 0 {
        0.0
    } else {
        n / (2.0 * class_count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params(seed: u64) -> ForestParams {
        ForestParams {
            trees: 15,
            max_depth: 5,
            min_samples_split: 2,
            seed,
        }
    }

    /// Two well-separated clusters, minority class ~20%.
    fn clustered_data() -> (Vec<Vec<f64>>, Vec<u8>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            let jitter = (i % 7) as f64 * 0.01;
            rows.push(vec![0.1 + jitter, 0.2 + jitter]);
            labels.push(0);
        }
        for i in 0..10 {
            let jitter = (i % 5) as f64 * 0.01;
            rows.push(vec![3.0 + jitter, 3.5 + jitter]);
            labels.push(1);
        }
        (rows, labels)
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let forest = RandomForest::new(small_params(42));
        assert!(matches!(
            forest.predict(&[0.0, 0.0]),
            Err(ModelError::NotTrained)
        ));
        assert!(matches!(
            forest.predict_proba(&[0.0, 0.0]),
            Err(ModelError::NotTrained)
        ));
    }

    #[test]
    fn test_learns_separable_clusters() {
        let (rows, labels) = clustered_data();
        let mut forest = RandomForest::new(small_params(42));
        forest.fit(&rows, &labels);

        assert!(forest.is_trained());
        assert_eq!(forest.predict(&[0.15, 0.25]).unwrap(), 0);
        assert_eq!(forest.predict(&[3.0, 3.5]).unwrap(), 1);
    }

    #[test]
    fn test_proba_distribution_sums_to_one() {
        let (rows, labels) = clustered_data();
        let mut forest = RandomForest::new(small_params(42));
        forest.fit(&rows, &labels);

        let proba = forest.predict_proba(&[1.5, 1.5]).unwrap();
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-9);
        assert!(proba[0] >= 0.0 && proba[1] >= 0.0);
    }

    #[test]
    fn test_training_is_deterministic_per_seed() {
        let (rows, labels) = clustered_data();
        let probe = vec![1.2, 1.4];

        let mut a = RandomForest::new(small_params(42));
        a.fit(&rows, &labels);
        let mut b = RandomForest::new(small_params(42));
        b.fit(&rows, &labels);

        assert_eq!(
            a.predict_proba(&probe).unwrap(),
            b.predict_proba(&probe).unwrap()
        );
    }

    #[test]
    fn test_refit_replaces_trees() {
        let (rows, labels) = clustered_data();
        let mut forest = RandomForest::new(small_params(42));
        forest.fit(&rows, &labels);
        forest.fit(&rows, &labels);

        assert_eq!(forest.params().trees, 15);
        assert!(forest.is_trained());
        let proba = forest.predict_proba(&[0.15, 0.25]).unwrap();
        assert!(proba[0] > 0.5);
    }
}
