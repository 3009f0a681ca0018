//! Feature Normalizer
//!
//! Per-feature affine transform `(x - mean) / scale`, fit on the training
//! matrix. Only ever used through `TrainedModel`, which pairs it with the
//! forest it was fit alongside.

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::bundle::FitError;

/// Scales below this are treated as constant columns
const MIN_SCALE: f64 = 10.0 * f64::EPSILON;

/// Fitted standardization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl Normalizer {
    /// Fit mean and population standard deviation per column.
    pub fn fit(x: ArrayView2<f64>) -> Result<Self, FitError> {
        if x.nrows() == 0 {
            return Err(FitError::Empty);
        }

        let mean = x.mean_axis(Axis(0)).ok_or(FitError::Empty)?;
        let std = x.std_axis(Axis(0), 0.0);

        let scale = std
            .iter()
            .map(|&s| if s.is_finite() && s > MIN_SCALE { s } else { 1.0 })
            .collect();

        Ok(Self { mean: mean.to_vec(), scale })
    }

    /// Number of features this normalizer expects
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    /// Transform one row. Extra values past `width()` are ignored.
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(&v, (&m, &s))| (v - m) / s)
            .collect()
    }

    /// Transform every row of a matrix
    pub fn transform_matrix(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let mut out = x.to_owned();
        for mut row in out.rows_mut() {
            for ((v, &m), &s) in row.iter_mut().zip(&self.mean).zip(&self.scale) {
                *v = (*v - m) / s;
            }
        }
        out
    }

    /// Structural check after deserialization
    pub(crate) fn validate(&self, expected_width: usize) -> Result<(), String> {
        if self.mean.len() != expected_width || self.scale.len() != expected_width {
            return Err(format!(
                "normalizer has {} means / {} scales, expected {}",
                self.mean.len(),
                self.scale.len(),
                expected_width
            ));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err("normalizer mean is not finite".to_string());
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err("normalizer scale must be finite and positive".to_string());
        }
        Ok(())
    }
}
