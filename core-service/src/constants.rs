//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every default can be overridden through the environment.

/// Default location of the persisted model bundle
pub const DEFAULT_MODEL_PATH: &str = "phishguard_model.json";

/// Default labeled dataset (CSV with `url,type` columns)
pub const DEFAULT_DATASET_PATH: &str = "dataset.csv";

/// Default number of rows sampled from an oversized dataset
pub const DEFAULT_SAMPLE_SIZE: usize = 50_000;

/// Seed used for sampling, splitting and forest construction
pub const DEFAULT_SEED: u64 = 42;

/// Fraction of samples held out for evaluation
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "PhishGuard";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("PHISHGUARD_MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get dataset path from environment or use default
pub fn get_dataset_path() -> String {
    std::env::var("PHISHGUARD_DATASET")
        .unwrap_or_else(|_| DEFAULT_DATASET_PATH.to_string())
}

/// Get training sample size from environment or use default
pub fn get_sample_size() -> usize {
    std::env::var("PHISHGUARD_SAMPLE_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SAMPLE_SIZE)
}
