//! Model Module - Classifier, persistence and scoring thresholds
//!
//! `bundle` ties a fitted normalizer and forest together; `inference`
//! publishes the current bundle to concurrent readers; `storage` owns the
//! file format; `threshold` turns probabilities into user-facing tiers.

pub mod normalizer;
pub mod forest;
pub mod bundle;
pub mod storage;
pub mod inference;
pub mod threshold;

// Re-export common types
pub use bundle::{FitError, ModelMetadata, TrainedModel};
pub use forest::{BinaryClassifier, ForestParams, RandomForest};
pub use inference::{Classifier, EngineStatus, PredictionResult};
pub use normalizer::Normalizer;
pub use storage::{decode_model, encode_model, load_model, save_model, ModelStoreError};
pub use threshold::{safety_score, RiskLevel, SAFE_MIN_SCORE, SUSPICIOUS_MIN_SCORE};
