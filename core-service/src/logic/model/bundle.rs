//! Trained Model Bundle
//!
//! Normalizer + forest + metadata, treated as one unit everywhere: it is
//! fit together, persisted together and swapped into the classifier
//! together. A bundle is immutable once built.

use chrono::{DateTime, Utc};
use ndarray::{ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::forest::{BinaryClassifier, ForestParams, RandomForest};
use super::inference::PredictionResult;
use super::normalizer::Normalizer;
use crate::logic::features::{
    layout_hash, FeatureVector, LayoutInfo, LayoutMismatchError, FEATURE_COUNT, FEATURE_VERSION,
};

/// Algorithm tag recorded in metadata
pub const ALGORITHM: &str = "random_forest";

// ============================================================================
// ERRORS
// ============================================================================

/// Why a model could not be fit
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("no training samples")]
    Empty,
    #[error("{rows} feature rows but {labels} labels")]
    ShapeMismatch { rows: usize, labels: usize },
    #[error("feature matrix has {actual} columns, expected {expected}")]
    WrongWidth { expected: usize, actual: usize },
    #[error("training data contains only one class")]
    SingleClass,
    #[error("invalid forest parameters: {0}")]
    InvalidParams(String),
}

// ============================================================================
// METADATA
// ============================================================================

/// Descriptive data carried with every trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: Uuid,
    pub algorithm: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_names: Vec<String>,
    pub training_samples: usize,
    pub phishing_samples: usize,
    /// Accuracy on the held-out split, when one was evaluated
    pub test_accuracy: Option<f64>,
    pub trained_at: DateTime<Utc>,
}

impl ModelMetadata {
    fn current_layout(training_samples: usize, phishing_samples: usize) -> Self {
        let layout = LayoutInfo::current();
        Self {
            model_id: Uuid::new_v4(),
            algorithm: ALGORITHM.to_string(),
            feature_version: layout.version,
            layout_hash: layout.hash,
            feature_names: layout.feature_names,
            training_samples,
            phishing_samples,
            test_accuracy: None,
            trained_at: Utc::now(),
        }
    }
}

// ============================================================================
// TRAINED MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    metadata: ModelMetadata,
    normalizer: Normalizer,
    forest: RandomForest,
}

impl TrainedModel {
    /// Fit normalizer and forest on raw feature rows.
    ///
    /// `x` must have one column per layout slot; `y[i]` is true for phishing.
    pub fn fit(x: ArrayView2<f64>, y: &[bool], params: &ForestParams) -> Result<Self, FitError> {
        if x.ncols() != FEATURE_COUNT {
            return Err(FitError::WrongWidth {
                expected: FEATURE_COUNT,
                actual: x.ncols(),
            });
        }

        let normalizer = Normalizer::fit(x)?;
        let scaled = normalizer.transform_matrix(x);
        let forest = RandomForest::fit(scaled.view(), y, params)?;

        let phishing = y.iter().filter(|&&l| l).count();
        Ok(Self {
            metadata: ModelMetadata::current_layout(x.nrows(), phishing),
            normalizer,
            forest,
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub(crate) fn set_test_accuracy(&mut self, accuracy: f64) {
        self.metadata.test_accuracy = Some(accuracy);
    }

    /// Score one feature vector. The vector must match the model's layout.
    pub fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult, LayoutMismatchError> {
        if vector.version != self.metadata.feature_version || vector.layout_hash != self.metadata.layout_hash {
            return Err(LayoutMismatchError {
                expected_version: self.metadata.feature_version,
                expected_hash: self.metadata.layout_hash,
                actual_version: vector.version,
                actual_hash: vector.layout_hash,
            });
        }
        Ok(self.predict_row(vector.as_slice()))
    }

    pub(crate) fn predict_row(&self, row: &[f64]) -> PredictionResult {
        let scaled = self.normalizer.transform(row);
        let probability = self.forest.phishing_probability(&scaled);
        PredictionResult::new(probability, self.forest.predict_label(&scaled))
    }

    /// Fraction of rows whose native label matches `y`
    pub fn accuracy(&self, x: ArrayView2<f64>, y: &[bool]) -> f64 {
        if x.nrows() == 0 || x.nrows() != y.len() {
            return 0.0;
        }
        let correct = x
            .axis_iter(Axis(0))
            .zip(y.iter())
            .filter(|(row, label)| self.predict_row(&row.to_vec()).is_phishing == **label)
            .count();
        correct as f64 / y.len() as f64
    }

    /// Structural consistency check, run on every load
    pub fn validate(&self) -> Result<(), String> {
        if self.metadata.feature_version != FEATURE_VERSION || self.metadata.layout_hash != layout_hash() {
            return Err(format!(
                "metadata layout v{} ({:08x}) differs from current v{} ({:08x})",
                self.metadata.feature_version,
                self.metadata.layout_hash,
                FEATURE_VERSION,
                layout_hash()
            ));
        }
        if self.metadata.feature_names.len() != FEATURE_COUNT {
            return Err(format!(
                "metadata lists {} features, expected {}",
                self.metadata.feature_names.len(),
                FEATURE_COUNT
            ));
        }
        if let Some(acc) = self.metadata.test_accuracy {
            if !(0.0..=1.0).contains(&acc) {
                return Err(format!("test accuracy {} out of range", acc));
            }
        }
        self.normalizer.validate(FEATURE_COUNT)?;
        self.forest.validate(FEATURE_COUNT)?;
        Ok(())
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================
