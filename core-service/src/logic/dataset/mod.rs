//! Dataset Module - Labeled URL ingestion for training
//!
//! Reads the `url,type` CSV used to fit the model, subsamples it with a
//! fixed seed and splits it into stratified train/test sets.

pub mod record;
pub mod reader;
pub mod split;

#[cfg(test)]
mod tests;

pub use reader::{read_dataset, read_dataset_from, DatasetError, LoadedDataset};
pub use record::{LabeledUrl, PHISHING_TYPE};
pub use split::{stratified_split, subsample, Split};
