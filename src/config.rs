//! Configuration management for the fraud scoring service

use crate::models::forest::ForestParams;
use crate::models::synthesizer::SynthesizerConfig;
use crate::types::response::RiskLevelThresholds;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub model: ModelConfig,
    pub training: TrainingConfig,
    pub detection: DetectionConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming scoring requests
    pub request_subject: String,
    /// Subject scored transaction records are published to
    pub record_subject: String,
    /// Subject aggregate stats are requested from
    pub stats_subject: String,
}

/// Classifier configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Directory holding the persisted classifier + scaler pair
    pub artifacts_dir: String,
    #[serde(default = "default_trees")]
    pub trees: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl ModelConfig {
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            trees: self.trees,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            seed: self.seed,
        }
    }
}

/// Training data synthesis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Fraction of the dataset held out for evaluation
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
}

impl TrainingConfig {
    pub fn synthesizer_config(&self) -> SynthesizerConfig {
        SynthesizerConfig {
            samples: self.samples,
            seed: self.seed,
        }
    }
}

/// Detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Risk tier classification thresholds
    pub risk_levels: RiskLevelThresholds,
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of concurrently processed scoring requests
    pub workers: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

fn default_trees() -> usize {
    100
}

fn default_max_depth() -> usize {
    10
}

fn default_min_samples_split() -> usize {
    2
}

fn default_seed() -> u64 {
    42
}

fn default_samples() -> usize {
    10_000
}

fn default_test_fraction() -> f64 {
    0.2
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                request_subject: "fraud.score.requests".to_string(),
                record_subject: "fraud.transactions".to_string(),
                stats_subject: "fraud.stats".to_string(),
            },
            model: ModelConfig {
                artifacts_dir: "models".to_string(),
                trees: default_trees(),
                max_depth: default_max_depth(),
                min_samples_split: default_min_samples_split(),
                seed: default_seed(),
            },
            training: TrainingConfig {
                samples: default_samples(),
                seed: default_seed(),
                test_fraction: default_test_fraction(),
            },
            detection: DetectionConfig {
                risk_levels: RiskLevelThresholds::default(),
            },
            pipeline: PipelineConfig { workers: 4 },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
