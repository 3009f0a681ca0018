//! Scoring Pipeline - URL in, safety assessment out
//!
//! Snapshot model → validate input → extract → predict → score → explain.
//! Each call either yields a complete `SafetyAssessment` or exactly one
//! `ScoringError`.

use std::sync::Arc;

use serde::Serialize;

use super::error::ScoringError;
use super::features::{FeatureVector, UrlFeatureExtractor};
use super::model::{safety_score, Classifier, EngineStatus, ModelMetadata, PredictionResult, RiskLevel};

/// Used when nothing else was worth saying
pub const CLEAN_EXPLANATION: &str = "Looks clean: no suspicious patterns found";

/// Verdict for one URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyAssessment {
    /// 0 (certain phishing) ..= 100 (certainly safe)
    pub safety_score: u8,
    pub risk_level: RiskLevel,
    /// Never empty
    pub explanations: Vec<String>,
    pub prediction: PredictionResult,
    pub features: FeatureVector,
    /// Features that degraded to 0 during extraction
    pub degraded_features: usize,
}

/// Pipeline health snapshot
#[derive(Debug, Clone, Serialize)]
pub struct PipelineHealth {
    pub model_trained: bool,
    pub model: Option<ModelMetadata>,
    pub engine: EngineStatus,
}

pub struct ScoringPipeline {
    extractor: UrlFeatureExtractor,
    classifier: Arc<Classifier>,
}

impl ScoringPipeline {
    pub fn new(classifier: Arc<Classifier>) -> Self {
        Self {
            extractor: UrlFeatureExtractor::default(),
            classifier,
        }
    }

    pub fn classifier(&self) -> &Arc<Classifier> {
        &self.classifier
    }

    /// Assess one URL.
    pub fn score(&self, url: &str) -> Result<SafetyAssessment, ScoringError> {
        let model = self.classifier.snapshot().ok_or(ScoringError::NotTrained)?;
        let extraction = self.extractor.extract_checked(url)?;

        let prediction = self.classifier.predict_on(&model, &extraction.vector)?;
        let safety_score = safety_score(prediction.phishing_probability);
        let risk_level = RiskLevel::from_score(safety_score);

        let mut explanations = extraction.explanations;
        if risk_level != RiskLevel::Safe {
            explanations.push(format!(
                "Model estimates a {:.1}% phishing likelihood",
                prediction.phishing_probability * 100.0
            ));
        }
        if explanations.is_empty() {
            explanations.push(CLEAN_EXPLANATION.to_string());
        }

        log::debug!(
            "Scored url ({} chars): score={} tier={} degraded={}",
            url.len(),
            safety_score,
            risk_level,
            extraction.degraded.len()
        );

        Ok(SafetyAssessment {
            safety_score,
            risk_level,
            explanations,
            prediction,
            features: extraction.vector,
            degraded_features: extraction.degraded.len(),
        })
    }

    pub fn health(&self) -> PipelineHealth {
        PipelineHealth {
            model_trained: self.classifier.is_trained(),
            model: self.classifier.metadata(),
            engine: self.classifier.status(),
        }
    }
}
