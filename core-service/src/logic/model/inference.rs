//! Inference Engine - Model publication & prediction
//!
//! The classifier owns a publication slot holding the current
//! `Arc<TrainedModel>`. Readers clone the `Arc` under a short read lock and
//! predict outside it; `install`/`reload` swap the slot atomically, so a
//! request that already took a snapshot finishes on the old model.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::bundle::{ModelMetadata, TrainedModel};
use super::storage::{load_model, ModelStoreError};
use crate::logic::error::ScoringError;
use crate::logic::features::FeatureVector;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Prediction for a single URL
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Forest's own label (averaged probability > 0.5)
    pub is_phishing: bool,
    pub phishing_probability: f64,
    pub legitimate_probability: f64,
}

impl PredictionResult {
    pub fn new(phishing_probability: f64, is_phishing: bool) -> Self {
        let p = phishing_probability.clamp(0.0, 1.0);
        Self {
            is_phishing,
            phishing_probability: p,
            legitimate_probability: 1.0 - p,
        }
    }

    /// Phishing probability as a percentage with two decimals
    pub fn phishing_percent(&self) -> f64 {
        (self.phishing_probability * 10_000.0).round() / 100.0
    }
}

/// Engine Status for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_id: Option<String>,
    pub model_source: Option<String>,
    pub avg_latency_ms: f64,
    pub inference_count: u64,
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Shared classifier; one per serving process
#[derive(Debug, Default)]
pub struct Classifier {
    model: RwLock<Option<Arc<TrainedModel>>>,
    source: RwLock<Option<PathBuf>>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl Classifier {
    /// Classifier with no model; every prediction is `NotTrained`
    pub fn untrained() -> Self {
        Self::default()
    }

    pub fn with_model(model: TrainedModel) -> Self {
        let classifier = Self::untrained();
        classifier.install(model);
        classifier
    }

    /// Load `path`, or log why not and stay untrained.
    pub fn load_or_untrained(path: &Path) -> Self {
        let classifier = Self::untrained();
        *classifier.source.write() = Some(path.to_path_buf());

        if !path.exists() {
            log::warn!(
                "No model file at {}; run phishguard-train to create one",
                path.display()
            );
            return classifier;
        }

        match load_model(path) {
            Ok(model) => {
                log::info!(
                    "Loaded model {} from {}",
                    model.metadata().model_id,
                    path.display()
                );
                classifier.install(model);
            }
            Err(e) => {
                log::error!("Failed to load model from {}: {}", path.display(), e);
            }
        }
        classifier
    }

    pub fn is_trained(&self) -> bool {
        self.model.read().is_some()
    }

    /// Current model, if any. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Option<Arc<TrainedModel>> {
        self.model.read().clone()
    }

    /// Metadata of the current model
    pub fn metadata(&self) -> Option<ModelMetadata> {
        self.model.read().as_ref().map(|m| m.metadata().clone())
    }

    /// Publish a new model
    pub fn install(&self, model: TrainedModel) -> Arc<TrainedModel> {
        let model = Arc::new(model);
        *self.model.write() = Some(Arc::clone(&model));
        model
    }

    /// Path the model was last loaded from
    pub fn source(&self) -> Option<PathBuf> {
        self.source.read().clone()
    }

    /// Re-read `path` and publish it. On failure the current model stays.
    pub fn reload(&self, path: &Path) -> Result<Arc<TrainedModel>, ModelStoreError> {
        match load_model(path) {
            Ok(model) => {
                let model = self.install(model);
                *self.source.write() = Some(path.to_path_buf());
                log::info!(
                    "Reloaded model {} from {}",
                    model.metadata().model_id,
                    path.display()
                );
                Ok(model)
            }
            Err(e) => {
                log::warn!(
                    "Model reload from {} failed, keeping current model: {}",
                    path.display(),
                    e
                );
                Err(e)
            }
        }
    }

    /// Drop the current model
    pub fn unload(&self) {
        *self.model.write() = None;
    }

    /// Score one feature vector with the current model.
    pub fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult, ScoringError> {
        let model = self.snapshot().ok_or(ScoringError::NotTrained)?;
        self.predict_on(&model, vector)
    }

    /// Predict against a snapshot already taken by the caller
    pub(crate) fn predict_on(
        &self,
        model: &TrainedModel,
        vector: &FeatureVector,
    ) -> Result<PredictionResult, ScoringError> {
        let started = Instant::now();
        let result = model
            .predict(vector)
            .map_err(|e| ScoringError::Unexpected(e.to_string()))?;
        self.record(started);

        if !result.phishing_probability.is_finite() {
            return Err(ScoringError::Unexpected("model produced a non-finite probability".into()));
        }
        Ok(result)
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f64 / count as f64) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_loaded: self.is_trained(),
            model_id: self.metadata().map(|m| m.model_id.to_string()),
            model_source: self.source().map(|p| p.display().to_string()),
            avg_latency_ms: avg,
            inference_count: count,
        }
    }

    fn record(&self, started: Instant) {
        let elapsed = started.elapsed().as_micros() as u64;
        self.latency_sum_us.fetch_add(elapsed, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::UrlFeatureExtractor;
    use crate::logic::model::bundle::fixtures::{fixture_model, PHISHING_URLS};
    use crate::logic::model::storage::save_model;
    use tempfile::tempdir;

    #[test]
    fn test_prediction_result_normalized() {
        let result = PredictionResult::new(0.3, false);
        assert!((result.phishing_probability + result.legitimate_probability - 1.0).abs() < 1e-6);
        assert_eq!(PredictionResult::new(1.7, true).phishing_probability, 1.0);
        assert_eq!(PredictionResult::new(0.123456, false).phishing_percent(), 12.35);
    }

    #[test]
    fn test_untrained_predict_fails() {
        let classifier = Classifier::untrained();
        assert!(!classifier.is_trained());
        let err = classifier.predict(&FeatureVector::new()).unwrap_err();
        assert!(matches!(err, ScoringError::NotTrained));
    }

    #[test]
    fn test_predict_updates_status() {
        let classifier = Classifier::with_model(fixture_model());
        let vector = UrlFeatureExtractor::default().extract(PHISHING_URLS[0]).vector;

        let result = classifier.predict(&vector).unwrap();
        assert!((0.0..=1.0).contains(&result.phishing_probability));

        let status = classifier.status();
        assert!(status.model_loaded);
        assert_eq!(status.inference_count, 1);
        assert!(status.model_id.is_some());
    }

    #[test]
    fn test_predict_on_snapshot_survives_unload() {
        let classifier = Classifier::with_model(fixture_model());
        let snapshot = classifier.snapshot().unwrap();
        classifier.unload();

        let vector = UrlFeatureExtractor::default().extract(PHISHING_URLS[0]).vector;
        let result = classifier.predict_on(&snapshot, &vector).unwrap();
        assert_eq!(result, snapshot.predict(&vector).unwrap());
        assert_eq!(classifier.status().inference_count, 1);
        assert!(!classifier.is_trained());
    }

    #[test]
    fn test_layout_mismatch_is_unexpected() {
        let classifier = Classifier::with_model(fixture_model());
        let mut vector = FeatureVector::new();
        vector.version = vector.version.wrapping_add(1);
        assert!(matches!(
            classifier.predict(&vector),
            Err(ScoringError::Unexpected(_))
        ));
    }

    #[test]
    fn test_load_or_untrained_missing_file() {
        let dir = tempdir().unwrap();
        let classifier = Classifier::load_or_untrained(&dir.path().join("absent.json"));
        assert!(!classifier.is_trained());
    }

    #[test]
    fn test_load_or_untrained_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"{ not a model").unwrap();

        let classifier = Classifier::load_or_untrained(&path);
        assert!(!classifier.is_trained());
    }

    #[test]
    fn test_reload_swaps_model() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        let first = fixture_model();
        let second = fixture_model();
        save_model(&second, &path).unwrap();

        let classifier = Classifier::with_model(first.clone());
        let held = classifier.snapshot().unwrap();

        classifier.reload(&path).unwrap();
        let current = classifier.snapshot().unwrap();

        assert_eq!(current.metadata().model_id, second.metadata().model_id);
        // an earlier snapshot is unaffected by the swap
        assert_eq!(held.metadata().model_id, first.metadata().model_id);
    }

    #[test]
    fn test_failed_reload_keeps_current_model() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"garbage").unwrap();

        let model = fixture_model();
        let id = model.metadata().model_id;
        let classifier = Classifier::with_model(model);

        assert!(classifier.reload(&path).is_err());
        assert_eq!(classifier.metadata().unwrap().model_id, id);
    }

    #[test]
    fn test_unload() {
        let classifier = Classifier::with_model(fixture_model());
        classifier.unload();
        assert!(!classifier.is_trained());
    }
}
