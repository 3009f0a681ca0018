//! Model Storage - Checksummed on-disk envelope
//!
//! The bundle JSON is base64-encoded into `data` and covered by a SHA-256
//! checksum. The envelope also repeats the feature layout so a model fit
//! against another schema is rejected before its payload is decoded.

use std::fs;
use std::io::Write;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::bundle::TrainedModel;
use crate::logic::features::{validate_layout, LayoutMismatchError, FEATURE_COUNT};

/// Identifies a model file
pub const MODEL_MAGIC: &str = "phishguard-model";

/// Current envelope format
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ModelStoreError {
    #[error("model file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("model file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not a model file (magic {0:?})")]
    BadMagic(String),
    #[error("unsupported model format version {0}")]
    UnsupportedFormat(u32),
    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),
    #[error("model checksum mismatch (expected {expected}, computed {actual})")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("model payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("invalid model: {0}")]
    Invalid(String),
}

/// On-disk file structure
#[derive(Debug, Serialize, Deserialize)]
struct ModelEnvelope {
    magic: String,
    format_version: u32,
    feature_version: u8,
    layout_hash: u32,
    feature_count: usize,
    /// SHA-256 hex of `data`
    checksum: String,
    /// Base64 of the bundle JSON
    data: String,
}

fn checksum(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

// ============================================================================
// ENCODE / DECODE
// ============================================================================

/// Serialize a model into envelope bytes
pub fn encode_model(model: &TrainedModel) -> Result<Vec<u8>, ModelStoreError> {
    let payload = serde_json::to_vec(model)?;
    let data = BASE64.encode(payload);
    let meta = model.metadata();

    let envelope = ModelEnvelope {
        magic: MODEL_MAGIC.to_string(),
        format_version: MODEL_FORMAT_VERSION,
        feature_version: meta.feature_version,
        layout_hash: meta.layout_hash,
        feature_count: meta.feature_names.len(),
        checksum: checksum(&data),
        data,
    };
    Ok(serde_json::to_vec_pretty(&envelope)?)
}

/// Parse and fully validate envelope bytes
pub fn decode_model(bytes: &[u8]) -> Result<TrainedModel, ModelStoreError> {
    let envelope: ModelEnvelope = serde_json::from_slice(bytes)?;

    if envelope.magic != MODEL_MAGIC {
        return Err(ModelStoreError::BadMagic(envelope.magic));
    }
    if envelope.format_version != MODEL_FORMAT_VERSION {
        return Err(ModelStoreError::UnsupportedFormat(envelope.format_version));
    }
    validate_layout(envelope.feature_version, envelope.layout_hash)?;
    if envelope.feature_count != FEATURE_COUNT {
        return Err(ModelStoreError::Invalid(format!(
            "envelope declares {} features, expected {}",
            envelope.feature_count, FEATURE_COUNT
        )));
    }

    let actual = checksum(&envelope.data);
    if actual != envelope.checksum {
        return Err(ModelStoreError::ChecksumMismatch {
            expected: envelope.checksum,
            actual,
        });
    }

    let payload = BASE64.decode(envelope.data.as_bytes())?;
    let model: TrainedModel = serde_json::from_slice(&payload)?;

    let meta = model.metadata();
    if meta.feature_version != envelope.feature_version || meta.layout_hash != envelope.layout_hash {
        return Err(ModelStoreError::Invalid(
            "payload metadata disagrees with envelope".to_string(),
        ));
    }
    model.validate().map_err(ModelStoreError::Invalid)?;

    Ok(model)
}

// ============================================================================
// FILE I/O
// ============================================================================

/// Write a model atomically: temp file in the same directory, then rename.
pub fn save_model(model: &TrainedModel, path: &Path) -> Result<(), ModelStoreError> {
    let bytes = encode_model(model)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ModelStoreError::Io(e.error))?;

    log::info!(
        "Saved model {} to {} ({} bytes)",
        model.metadata().model_id,
        path.display(),
        bytes.len()
    );
    Ok(())
}

/// Read and validate a model file
pub fn load_model(path: &Path) -> Result<TrainedModel, ModelStoreError> {
    let bytes = fs::read(path)?;
    let model = decode_model(&bytes)?;
    log::debug!(
        "Decoded model {} ({} trees)",
        model.metadata().model_id,
        model.forest().trees().len()
    );
    Ok(model)
}
