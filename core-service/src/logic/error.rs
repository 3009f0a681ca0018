//! Scoring Errors
//!
//! Every failure the pipeline can report. Feature-level problems never reach
//! this type (see `features::ExtractionDegraded`); model-state problems do.

use super::model::ModelStoreError;

/// Classified pipeline failure
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// No model has been published yet (operational state, not a bug)
    #[error("model not trained; run phishguard-train first")]
    NotTrained,

    /// Caller supplied an empty or missing URL
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Persisted model could not be used
    #[error("model artifact unusable: {0}")]
    PersistenceCorrupt(#[from] ModelStoreError),

    /// Anything else that went wrong while scoring
    #[error("scoring failed: {0}")]
    Unexpected(String),
}

impl ScoringError {
    /// Short machine-readable kind, used in logs and HTTP bodies
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::NotTrained => "not_trained",
            ScoringError::InvalidInput(_) => "invalid_input",
            ScoringError::PersistenceCorrupt(_) => "persistence_corrupt",
            ScoringError::Unexpected(_) => "unexpected_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinct() {
        let kinds = [
            ScoringError::NotTrained.kind(),
            ScoringError::InvalidInput("x".into()).kind(),
            ScoringError::PersistenceCorrupt(ModelStoreError::BadMagic("x".into())).kind(),
            ScoringError::Unexpected("x".into()).kind(),
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_not_trained_message_mentions_training() {
        let msg = ScoringError::NotTrained.to_string();
        assert!(msg.contains("phishguard-train"));
    }
}
