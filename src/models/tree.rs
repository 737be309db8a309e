//! Single CART decision tree.
//!
//! Trees split on weighted gini impurity with midpoint thresholds and a
//! random feature subset per split. Leaves keep their weighted class
//! counts so the forest can average probability distributions.

use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

/// Tree growth parameters, fixed at training time by the forest.
#[derive(Debug, Clone)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub features_per_split: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        /// Weighted class counts at this leaf, index = class label
        class_weights: [f64; 2],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: TreeNode,
}

impl DecisionTree {
    /// Grow a tree over the given sample indices (typically a bootstrap
    /// draw of the training set).
    pub fn fit(
        rows: &[Vec<f64>],
        labels: &[u8],
        sample_weights: &[f64],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        Self {
            root: grow(rows, labels, sample_weights, indices, 0, params, rng),
        }
    }

    /// Per-class probability distribution for one row.
    pub fn predict_proba(&self, row: &[f64]) -> [f64; 2] {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { class_weights } => return normalize(class_weights),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }
}

fn grow(
    rows: &[Vec<f64>],
    labels: &[u8],
    sample_weights: &[f64],
    indices: &[usize],
    depth: usize,
    params: &TreeParams,
    rng: &mut StdRng,
) -> TreeNode {
    let class_weights = weighted_counts(labels, sample_weights, indices);

    let is_pure = class_weights[0] == 0.0 || class_weights[1] == 0.0;
    if depth >= params.max_depth || indices.len() < params.min_samples_split || is_pure {
        return TreeNode::Leaf { class_weights };
    }

    let Some((feature, threshold)) =
        best_split(rows, labels, sample_weights, indices, &class_weights, params, rng)
    else {
        return TreeNode::Leaf { class_weights };
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| rows[i][feature] <= threshold);

    if left_idx.is_empty() || right_idx.is_empty() {
        return TreeNode::Leaf { class_weights };
    }

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(grow(
            rows,
            labels,
            sample_weights,
            &left_idx,
            depth + 1,
            params,
            rng,
        )),
        right: Box::new(grow(
            rows,
            labels,
            sample_weights,
            &right_idx,
            depth + 1,
            params,
            rng,
        )),
    }
}

/// Scan a random feature subset for the split minimizing weighted child
/// impurity. Returns None when no split improves on the parent.
fn best_split(
    rows: &[Vec<f64>],
    labels: &[u8],
    sample_weights: &[f64],
    indices: &[usize],
    parent_counts: &[f64; 2],
    params: &TreeParams,
    rng: &mut StdRng,
) -> Option<(usize, f64)> {
    let n_features = rows[indices[0]].len();
    let subset = index::sample(rng, n_features, params.features_per_split.min(n_features));

    let parent_total = parent_counts[0] + parent_counts[1];
    let parent_impurity = gini(parent_counts);
    let mut best: Option<(f64, usize, f64)> = None;

    for feature in subset {
        let mut ordered: Vec<(f64, u8, f64)> = indices
            .iter()
            .map(|&i| (rows[i][feature], labels[i], sample_weights[i]))
            .collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left = [0.0f64; 2];
        for k in 0..ordered.len() - 1 {
            let (value, label, weight) = ordered[k];
            left[usize::from(label)] += weight;

            // Only cut between distinct values
            if value == ordered[k + 1].0 {
                continue;
            }

            let right = [parent_counts[0] - left[0], parent_counts[1] - left[1]];
            let left_total = left[0] + left[1];
            let right_total = right[0] + right[1];
            let impurity = (left_total * gini(&left) + right_total * gini(&right)) / parent_total;

            if impurity + 1e-12 < best.map_or(parent_impurity, |(b, _, _)| b) {
                let threshold = (value + ordered[k + 1].0) / 2.0;
                best = Some((impurity, feature, threshold));
            }
        }
    }

    best.map(|(_, feature, threshold)| (feature, threshold))
}

fn weighted_counts(labels: &[u8], sample_weights: &[f64], indices: &[usize]) -> [f64; 2] {
    let mut counts = [0.0f64; 2];
    for &i in indices {
        counts[usize::from(labels[i])] += sample_weights[i];
    }
    counts
}

fn gini(counts: &[f64; 2]) -> f64 {
    let total = counts[0] + counts[1];
    if total <= 0.0 {
        return 0.0;
    }
    let p0 = counts[0] / total;
    let p1 = counts[1] / total;
    1.0 - p0 * p0 - p1 * p1
}

fn normalize(counts: &[f64; 2]) -> [f64; 2] {
    let total = counts[0] + counts[1];
    if total <= 0.0 {
        return [0.5, 0.5];
    }
    [counts[0] / total, counts[1] / total]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn fit_tree(rows: &[Vec<f64>], labels: &[u8], max_depth: usize) -> DecisionTree {
        let weights = vec![1.0; rows.len()];
        let indices: Vec<usize> = (0..rows.len()).collect();
        let params = TreeParams {
            max_depth,
            min_samples_split: 2,
            features_per_split: rows[0].len(),
        };
        let mut rng = StdRng::seed_from_u64(7);
        DecisionTree::fit(rows, labels, &weights, &indices, &params, &mut rng)
    }

    #[test]
    fn test_separable_data() {
        let rows = vec![
            vec![0.0, 0.0],
            vec![0.1, 1.0],
            vec![0.2, 0.5],
            vec![5.0, 0.0],
            vec![5.1, 1.0],
            vec![5.2, 0.5],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let tree = fit_tree(&rows, &labels, 5);

        assert!(tree.predict_proba(&[0.05, 0.3])[0] > 0.99);
        assert!(tree.predict_proba(&[5.05, 0.3])[1] > 0.99);
    }

    #[test]
    fn test_depth_zero_is_prior() {
        let rows = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let labels = vec![0, 0, 0, 1];
        let tree = fit_tree(&rows, &labels, 0);

        let proba = tree.predict_proba(&[0.0]);
        assert!((proba[0] - 0.75).abs() < 1e-9);
        assert!((proba[1] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_sample_weights_shift_leaf_distribution() {
        let rows = vec![vec![0.0], vec![0.0]];
        let labels = vec![0, 1];
        let weights = vec![1.0, 3.0];
        let indices = vec![0, 1];
        let params = TreeParams {
            max_depth: 3,
            min_samples_split: 2,
            features_per_split: 1,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let tree = DecisionTree::fit(&rows, &labels, &weights, &indices, &params, &mut rng);

        // Identical feature values cannot split; the leaf reflects weights.
        let proba = tree.predict_proba(&[0.0]);
        assert!((proba[1] - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[10.0, 0.0]), 0.0);
        assert!((gini(&[5.0, 5.0]) - 0.5).abs() < 1e-9);
    }
}
