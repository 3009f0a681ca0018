//! PhishGuard Trainer - Offline model production
//!
//! `phishguard-train [SAMPLE_SIZE]` reads the labeled dataset, fits the
//! forest and writes the model file the API server loads.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use phishguard_core::constants;
use phishguard_core::logic::model::ForestParams;
use phishguard_core::logic::training::{self, TrainingConfig};

#[derive(Debug, Parser)]
#[command(name = "phishguard-train", version, about = "Train the PhishGuard URL classifier")]
struct Args {
    /// Rows sampled from the dataset (0 uses every row)
    #[arg(env = "PHISHGUARD_SAMPLE_SIZE", default_value_t = constants::DEFAULT_SAMPLE_SIZE)]
    sample_size: usize,

    /// Labeled CSV with `url` and `type` columns
    #[arg(long, env = "PHISHGUARD_DATASET", default_value = constants::DEFAULT_DATASET_PATH)]
    dataset: PathBuf,

    /// Where to write the trained model
    #[arg(long, env = "PHISHGUARD_MODEL_PATH", default_value = constants::DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 150)]
    trees: usize,

    /// Seed for sampling, splitting and tree construction
    #[arg(long, default_value_t = constants::DEFAULT_SEED)]
    seed: u64,
}

impl Args {
    fn into_config(self) -> TrainingConfig {
        TrainingConfig {
            dataset_path: self.dataset,
            model_path: self.model,
            sample_size: self.sample_size,
            seed: self.seed,
            forest: ForestParams {
                n_trees: self.trees,
                ..ForestParams::with_seed(self.seed)
            },
            ..TrainingConfig::default()
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!(
        "{} v{} training on up to {} samples",
        constants::APP_NAME,
        constants::APP_VERSION,
        args.sample_size
    );

    let config = args.into_config();
    match training::train(&config) {
        Ok(report) => {
            log::info!("Training complete in {:.1}s", report.elapsed_secs);
            if let Some(acc) = report.test_accuracy {
                log::info!("Test accuracy: {:.2}%", acc * 100.0);
            }
            log::info!(
                "Model {} saved to {}; the API can now serve predictions",
                report.model_id,
                config.model_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Training failed: {}", e);
            ExitCode::from(1)
        }
    }
}
