//! Synthetic training data generation.
//!
//! Used only when no trained model exists on disk. Generation is seeded
//! and column-wise, so the same (seed, size) pair always produces the
//! same dataset.

use crate::features::FeatureVector;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Poisson};
use serde::{Deserialize, Serialize};

/// A feature vector with its fraud label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainingExample {
    pub features: FeatureVector,
    /// 1 = fraud, 0 = legitimate
    pub is_fraud: u8,
}

/// Ordered sequence of labeled examples.
#[derive(Debug, Clone, Default)]
pub struct TrainingDataset {
    pub examples: Vec<TrainingExample>,
}

impl TrainingDataset {
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn fraud_count(&self) -> usize {
        self.examples.iter().filter(|e| e.is_fraud == 1).count()
    }

    /// Feature rows in model input order.
    pub fn feature_rows(&self) -> Vec<Vec<f64>> {
        self.examples.iter().map(|e| e.features.to_vec()).collect()
    }

    pub fn labels(&self) -> Vec<u8> {
        self.examples.iter().map(|e| e.is_fraud).collect()
    }

    /// Split into train/test subsets, stratified on the label so both
    /// subsets preserve the class ratio.
    pub fn stratified_split(&self, test_fraction: f64, seed: u64) -> (Self, Self) {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for (i, example) in self.examples.iter().enumerate() {
            by_class[usize::from(example.is_fraud == 1)].push(i);
        }

        let mut train = Vec::new();
        let mut test = Vec::new();
        for indices in by_class.iter_mut() {
            indices.shuffle(&mut rng);
            let test_len = (indices.len() as f64 * test_fraction).round() as usize;
            let (test_idx, train_idx) = indices.split_at(test_len.min(indices.len()));
            test.extend(test_idx.iter().map(|&i| self.examples[i]));
            train.extend(train_idx.iter().map(|&i| self.examples[i]));
        }

        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        (Self { examples: train }, Self { examples: test })
    }
}

/// Synthesizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizerConfig {
    /// Number of examples to generate
    pub samples: usize,
    /// RNG seed for full reproducibility
    pub seed: u64,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            samples: 10_000,
            seed: 42,
        }
    }
}

/// Produces labeled synthetic credit-card transaction datasets.
///
/// Amounts follow log-normal distributions (skewed positive with a heavy
/// right tail), hourly counts are Poisson, and categorical fields are
/// uniform. Labels come from a fixed rule over the generated features
/// plus bounded uniform noise, which lands near a 5% fraud rate without
/// guaranteeing it exactly.
pub struct TrainingDataSynthesizer {
    config: SynthesizerConfig,
}

impl TrainingDataSynthesizer {
    pub fn new(config: SynthesizerConfig) -> Self {
        Self { config }
    }

    /// Generate the full dataset.
    pub fn synthesize(&self) -> TrainingDataset {
        let n = self.config.samples;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        // Parameters are compile-time constants; construction cannot fail.
        let amount_dist = LogNormal::new(3.0, 1.5).expect("valid log-normal parameters");
        let avg_amount_dist = LogNormal::new(2.5, 1.0).expect("valid log-normal parameters");
        let count_dist = Poisson::new(2.0).expect("valid poisson parameter");

        // Column-wise generation in field order keeps the stream of RNG
        // draws independent of row assembly.
        let amounts: Vec<f64> = (0..n).map(|_| amount_dist.sample(&mut rng)).collect();
        let categories: Vec<f64> = (0..n).map(|_| f64::from(rng.gen_range(1..20))).collect();
        let hours: Vec<f64> = (0..n).map(|_| f64::from(rng.gen_range(0..24))).collect();
        let days: Vec<f64> = (0..n).map(|_| f64::from(rng.gen_range(1..8))).collect();
        let weekends: Vec<f64> = (0..n).map(|_| f64::from(rng.gen_range(0..2))).collect();
        let counts: Vec<f64> = (0..n).map(|_| count_dist.sample(&mut rng)).collect();
        let avg_amounts: Vec<f64> = (0..n).map(|_| avg_amount_dist.sample(&mut rng)).collect();
        let noise: Vec<f64> = (0..n).map(|_| rng.gen::<f64>() * 0.1).collect();

        let examples = (0..n)
            .map(|i| {
                let features = FeatureVector {
                    amount: amounts[i],
                    merchant_category: categories[i],
                    hour: hours[i],
                    day_of_week: days[i],
                    is_weekend: weekends[i],
                    transaction_count_1h: counts[i],
                    avg_amount_1h: avg_amounts[i],
                };
                TrainingExample {
                    features,
                    is_fraud: label_for(&features, noise[i]),
                }
            })
            .collect();

        TrainingDataset { examples }
    }
}

/// Deterministic label rule over generated features plus independent noise.
fn label_for(features: &FeatureVector, noise: f64) -> u8 {
    let mut score = 0.0;
    if features.amount > 1000.0 {
        score += 0.3;
    }
    if (2.0..=4.0).contains(&features.hour) {
        score += 0.2;
    }
    if features.transaction_count_1h > 5.0 {
        score += 0.4;
    }
    score += noise;

    u8::from(score > 0.4)
}
