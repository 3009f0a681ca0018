//! Features Module - Feature Extraction Engine
//!
//! Turns a raw URL into the fixed 18-slot vector the model consumes.
//! `layout.rs` owns the schema; everything else indexes through it.

pub mod layout;
pub mod vector;
pub mod url;
pub mod extractor;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{
    Feature, LayoutInfo, LayoutMismatchError, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION,
    layout_hash, validate_layout,
};
pub use vector::FeatureVector;
pub use extractor::{Extraction, ExtractionDegraded, UrlFeatureExtractor};
