//! Logic Module - Business Logic & Engines
//!
//! - `features/` - URL parsing and the fixed feature schema
//! - `model/` - normalizer, forest, classifier, persistence, risk tiers
//! - `pipeline` - extract → predict → derive
//! - `dataset/` + `training` - offline model production

pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod dataset;
pub mod training;
