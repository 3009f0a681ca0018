//! PhishGuard Core
//!
//! Lexical URL feature extraction and phishing scoring.
//!
//! ```text
//! raw URL ──► UrlFeatureExtractor ──► FeatureVector + explanations
//!                                          │
//!                                          ▼
//!                  Classifier (Arc<TrainedModel>: normalizer + forest)
//!                                          │
//!                                          ▼
//!                 PredictionResult ──► safety score ──► RiskLevel
//! ```
//!
//! `ScoringPipeline` is the entry point for serving; `logic::training` is
//! the offline job that produces the persisted model bundle.

pub mod constants;
pub mod logic;

pub use logic::error::ScoringError;
pub use logic::features::{
    Extraction, ExtractionDegraded, Feature, FeatureVector, UrlFeatureExtractor, FEATURE_COUNT,
};
pub use logic::model::{
    safety_score, Classifier, ModelMetadata, ModelStoreError, PredictionResult, RiskLevel,
    TrainedModel,
};
pub use logic::pipeline::{SafetyAssessment, ScoringPipeline};
