//! Model training, evaluation, and persistence components

pub mod evaluation;
pub mod forest;
pub mod scaler;
pub mod store;
pub mod synthesizer;
pub mod tree;

pub use evaluation::EvaluationReport;
pub use forest::{ForestParams, RandomForest};
pub use scaler::StandardScaler;
pub use store::ModelStore;
pub use synthesizer::{SynthesizerConfig, TrainingDataSynthesizer, TrainingDataset};
