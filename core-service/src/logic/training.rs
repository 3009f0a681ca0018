//! Training Job - Dataset → fitted, evaluated, persisted model
//!
//! Offline only. Reads the labeled CSV, subsamples, extracts features,
//! fits on a stratified training split and evaluates on the held-out rest.

use std::path::PathBuf;
use std::time::Instant;

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::dataset::{self, DatasetError, LabeledUrl};
use super::features::{UrlFeatureExtractor, FEATURE_COUNT};
use super::model::{save_model, FitError, ForestParams, ModelStoreError, TrainedModel};
use crate::constants;

/// Rows between progress log lines during feature extraction
const PROGRESS_EVERY: usize = 5_000;

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
    /// Rows kept from an oversized dataset
    pub sample_size: usize,
    /// Fraction of each class held out for evaluation
    pub test_fraction: f64,
    /// Seed for subsampling and splitting
    pub seed: u64,
    pub forest: ForestParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(constants::DEFAULT_DATASET_PATH),
            model_path: PathBuf::from(constants::DEFAULT_MODEL_PATH),
            sample_size: constants::DEFAULT_SAMPLE_SIZE,
            test_fraction: constants::DEFAULT_TEST_FRACTION,
            seed: constants::DEFAULT_SEED,
            forest: ForestParams::default(),
        }
    }
}

impl TrainingConfig {
    /// Defaults with paths and sample size taken from the environment
    pub fn from_env() -> Self {
        Self {
            dataset_path: PathBuf::from(constants::get_dataset_path()),
            model_path: PathBuf::from(constants::get_model_path()),
            sample_size: constants::get_sample_size(),
            ..Default::default()
        }
    }
}

// ============================================================================
// ERRORS & REPORT
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("no row produced a usable feature vector")]
    NoUsableRows,
    #[error("model fit failed: {0}")]
    Fit(#[from] FitError),
    #[error("could not save model: {0}")]
    Store(#[from] ModelStoreError),
}

/// Test-set outcome counts, phishing as the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positive += 1,
            (true, false) => self.false_positive += 1,
            (false, false) => self.true_negative += 1,
            (false, true) => self.false_negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub model_id: String,
    pub model_path: Option<PathBuf>,
    /// Data rows in the CSV
    pub rows_read: usize,
    /// Malformed CSV rows
    pub rows_skipped: usize,
    /// Rows kept after subsampling
    pub rows_sampled: usize,
    /// Rows rejected by `extract_checked`
    pub invalid_urls: usize,
    /// Feature computations that fell back to 0
    pub degraded_features: usize,
    pub phishing_samples: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub train_accuracy: f64,
    pub test_accuracy: Option<f64>,
    pub confusion: ConfusionMatrix,
    pub elapsed_secs: f64,
}

// ============================================================================
// TRAINING
// ============================================================================

/// Run the full job: read, sample, fit, evaluate, save.
pub fn train(config: &TrainingConfig) -> Result<TrainingReport, TrainingError> {
    let started = Instant::now();
    log::info!("Reading dataset {}", config.dataset_path.display());

    let loaded = dataset::read_dataset(&config.dataset_path)?;
    for (kind, count) in &loaded.class_counts {
        log::info!("  {}: {}", kind, count);
    }

    let sampled = dataset::subsample(loaded.records, config.sample_size, config.seed);
    log::info!("Training on {} of {} rows", sampled.len(), loaded.rows_read);

    let (model, mut report) = train_on_records(&sampled, config)?;
    save_model(&model, &config.model_path)?;

    report.rows_read = loaded.rows_read;
    report.rows_skipped = loaded.skipped;
    report.model_path = Some(config.model_path.clone());
    report.elapsed_secs = started.elapsed().as_secs_f64();
    Ok(report)
}

/// Fit and evaluate on in-memory records without touching disk.
pub fn train_on_records(
    records: &[LabeledUrl],
    config: &TrainingConfig,
) -> Result<(TrainedModel, TrainingReport), TrainingError> {
    let started = Instant::now();
    let features = extract_matrix(records);
    if features.labels.is_empty() {
        return Err(TrainingError::NoUsableRows);
    }

    let split = dataset::stratified_split(&features.labels, config.test_fraction, config.seed);
    let (x_train, y_train) = select(&features, &split.train);
    let (x_test, y_test) = select(&features, &split.test);
    log::info!(
        "Split: {} train / {} test ({} phishing overall)",
        y_train.len(),
        y_test.len(),
        features.labels.iter().filter(|&&l| l).count()
    );

    let mut model = TrainedModel::fit(x_train.view(), &y_train, &config.forest)?;
    let train_accuracy = model.accuracy(x_train.view(), &y_train);

    let confusion = evaluate(&model, x_test.view(), &y_test);
    let test_accuracy = if y_test.is_empty() {
        None
    } else {
        Some(confusion.accuracy())
    };
    if let Some(acc) = test_accuracy {
        model.set_test_accuracy(acc);
        log::info!(
            "Test accuracy {:.2}% (precision {:.3}, recall {:.3})",
            acc * 100.0,
            confusion.precision(),
            confusion.recall()
        );
    }

    let report = TrainingReport {
        model_id: model.metadata().model_id.to_string(),
        model_path: None,
        rows_read: records.len(),
        rows_skipped: 0,
        rows_sampled: records.len(),
        invalid_urls: features.invalid,
        degraded_features: features.degraded,
        phishing_samples: model.metadata().phishing_samples,
        train_size: y_train.len(),
        test_size: y_test.len(),
        train_accuracy,
        test_accuracy,
        confusion,
        elapsed_secs: started.elapsed().as_secs_f64(),
    };
    Ok((model, report))
}

struct FeatureMatrix {
    rows: Vec<[f64; FEATURE_COUNT]>,
    labels: Vec<bool>,
    invalid: usize,
    degraded: usize,
}

fn extract_matrix(records: &[LabeledUrl]) -> FeatureMatrix {
    let extractor = UrlFeatureExtractor::default();
    let mut matrix = FeatureMatrix {
        rows: Vec::with_capacity(records.len()),
        labels: Vec::with_capacity(records.len()),
        invalid: 0,
        degraded: 0,
    };

    for (i, record) in records.iter().enumerate() {
        if i > 0 && i % PROGRESS_EVERY == 0 {
            log::info!("Extracted features for {}/{} urls", i, records.len());
        }
        match extractor.extract_checked(&record.url) {
            Ok(extraction) => {
                matrix.degraded += extraction.degraded.len();
                matrix.rows.push(*extraction.vector.as_array());
                matrix.labels.push(record.is_phishing());
            }
            Err(e) => {
                log::debug!("Skipping row {}: {}", i, e);
                matrix.invalid += 1;
            }
        }
    }

    if matrix.invalid > 0 || matrix.degraded > 0 {
        log::warn!(
            "{} urls rejected, {} feature values degraded to 0",
            matrix.invalid,
            matrix.degraded
        );
    }
    matrix
}

fn select(features: &FeatureMatrix, indices: &[usize]) -> (Array2<f64>, Vec<bool>) {
    let mut x = Array2::zeros((indices.len(), FEATURE_COUNT));
    let mut y = Vec::with_capacity(indices.len());
    for (row, &i) in indices.iter().enumerate() {
        for (col, value) in features.rows[i].iter().enumerate() {
            x[[row, col]] = *value;
        }
        y.push(features.labels[i]);
    }
    (x, y)
}

fn evaluate(model: &TrainedModel, x: ArrayView2<f64>, y: &[bool]) -> ConfusionMatrix {
    let mut confusion = ConfusionMatrix::default();
    for (row, &actual) in x.axis_iter(Axis(0)).zip(y) {
        let predicted = model.predict_row(&row.to_vec()).is_phishing;
        confusion.record(predicted, actual);
    }
    confusion
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::load_model;
    use std::fmt::Write as _;
    use tempfile::tempdir;

    const BRANDS: &[&str] = &["paypal", "apple", "amazon", "microsoft", "ebay", "google"];
    const TLDS: &[&str] = &["tk", "ml", "ga", "cf", "gq", "xyz", "top"];
    const SITES: &[&str] = &["wikipedia.org", "github.com", "rust-lang.org", "bbc.co.uk", "mozilla.org"];

    fn synthetic_records(n: usize) -> Vec<LabeledUrl> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    let brand = BRANDS[i % BRANDS.len()];
                    let tld = TLDS[i % TLDS.len()];
                    LabeledUrl::new(
                        format!("http://{}-secure-login-{}.verify.{}/account/update?id={}", brand, i, tld, i),
                        "phishing",
                    )
                } else {
                    let site = SITES[i % SITES.len()];
                    LabeledUrl::new(format!("https://www.{}/docs/page{}", site, i), "benign")
                }
            })
            .collect()
    }

    fn small_config() -> TrainingConfig {
        TrainingConfig {
            forest: ForestParams {
                n_trees: 20,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_train_on_records_separates_classes() {
        let records = synthetic_records(120);
        let (model, report) = train_on_records(&records, &small_config()).unwrap();

        assert_eq!(report.train_size + report.test_size, 120);
        assert_eq!(report.test_size, 24);
        assert!(report.train_accuracy >= 0.95);
        assert!(report.test_accuracy.unwrap() >= 0.9);
        assert_eq!(model.metadata().test_accuracy, report.test_accuracy);
        assert_eq!(report.confusion.total(), report.test_size);

        let extractor = UrlFeatureExtractor::default();
        let bad = model
            .predict(&extractor.extract("http://paypal-secure-login.tk/verify?account=1").vector)
            .unwrap();
        let good = model
            .predict(&extractor.extract("https://www.wikipedia.org/wiki/Main_Page").vector)
            .unwrap();
        assert!(bad.phishing_probability > 0.5);
        assert!(good.phishing_probability < 0.5);
    }

    #[test]
    fn test_blank_urls_are_counted() {
        let mut records = synthetic_records(40);
        records.push(LabeledUrl::new("   ", "phishing"));
        let (_, report) = train_on_records(&records, &small_config()).unwrap();
        assert_eq!(report.invalid_urls, 1);
        assert_eq!(report.train_size + report.test_size, 40);
    }

    #[test]
    fn test_single_class_fails() {
        let records: Vec<LabeledUrl> = (0..10)
            .map(|i| LabeledUrl::new(format!("https://site{}.com", i), "benign"))
            .collect();
        assert!(matches!(
            train_on_records(&records, &small_config()),
            Err(TrainingError::Fit(FitError::SingleClass))
        ));
    }

    #[test]
    fn test_no_usable_rows() {
        let records = vec![LabeledUrl::new(" ", "benign")];
        assert!(matches!(
            train_on_records(&records, &small_config()),
            Err(TrainingError::NoUsableRows)
        ));
    }

    #[test]
    fn test_train_end_to_end_from_csv() {
        let dir = tempdir().unwrap();
        let dataset_path = dir.path().join("dataset.csv");
        let model_path = dir.path().join("model.json");

        let mut csv = String::from("url,type\n");
        for record in synthetic_records(80) {
            writeln!(csv, "{},{}", record.url, record.kind).unwrap();
        }
        csv.push_str("broken,row,with,too,many,fields\n");
        std::fs::write(&dataset_path, csv).unwrap();

        let config = TrainingConfig {
            dataset_path,
            model_path: model_path.clone(),
            sample_size: 60,
            ..small_config()
        };
        let report = train(&config).unwrap();

        assert_eq!(report.rows_read, 81);
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(report.rows_sampled, 60);
        assert_eq!(report.train_size + report.test_size, 60);

        let loaded = load_model(&model_path).unwrap();
        assert_eq!(loaded.metadata().model_id.to_string(), report.model_id);
    }

    #[test]
    fn test_missing_dataset() {
        let dir = tempdir().unwrap();
        let config = TrainingConfig {
            dataset_path: dir.path().join("absent.csv"),
            model_path: dir.path().join("model.json"),
            ..small_config()
        };
        assert!(matches!(train(&config), Err(TrainingError::Dataset(_))));
        assert!(!dir.path().join("model.json").exists());
    }

    #[test]
    fn test_confusion_matrix_metrics() {
        let mut m = ConfusionMatrix::default();
        m.record(true, true);
        m.record(true, false);
        m.record(false, false);
        m.record(false, true);
        assert_eq!(m.total(), 4);
        assert_eq!(m.accuracy(), 0.5);
        assert_eq!(m.precision(), 0.5);
        assert_eq!(m.recall(), 0.5);
        assert_eq!(ConfusionMatrix::default().precision(), 0.0);
    }
}
