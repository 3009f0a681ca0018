//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use phishguard_core::{ModelStoreError, ScoringError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// No model published yet
    NotTrained,

    /// Missing or unusable request input
    BadRequest(String),

    /// Model file could not be loaded
    ModelUnavailable(String),

    // Generic errors
    InternalError(String),
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::NotTrained => "not_trained",
            AppError::BadRequest(_) => "invalid_input",
            AppError::ModelUnavailable(_) => "persistence_corrupt",
            AppError::InternalError(_) => "unexpected_failure",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, error_message) = match &self {
            AppError::NotTrained => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Model not trained yet. Run phishguard-train first.".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Model unavailable: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Model could not be loaded: {}", msg))
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Something went wrong: {}", msg))
            }
        };

        let body = Json(json!({
            "error": error_message,
            "kind": kind,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ScoringError> for AppError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::NotTrained => AppError::NotTrained,
            ScoringError::InvalidInput(msg) => AppError::BadRequest(msg),
            ScoringError::PersistenceCorrupt(e) => AppError::ModelUnavailable(e.to_string()),
            ScoringError::Unexpected(msg) => AppError::InternalError(msg),
        }
    }
}

impl From<ModelStoreError> for AppError {
    fn from(err: ModelStoreError) -> Self {
        AppError::ModelUnavailable(err.to_string())
    }
}
