//! Model management handler

use axum::{extract::State, Json};
use serde::Serialize;

use phishguard_core::ModelMetadata;

use crate::{AppError, AppResult, AppState};

#[derive(Serialize)]
pub struct ReloadResponse {
    reloaded: bool,
    model_path: String,
    model: ModelMetadata,
}

/// `POST /api/model/reload`: re-read the model file and publish it.
/// The currently served model stays in place if loading fails.
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<ReloadResponse>> {
    let path = state.config.model_path.clone();
    let classifier = state.pipeline.classifier().clone();

    let model = tokio::task::spawn_blocking({
        let path = path.clone();
        move || classifier.reload(&path)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("reload task failed: {}", e)))??;

    tracing::info!("Model {} published from {}", model.metadata().model_id, path.display());

    Ok(Json(ReloadResponse {
        reloaded: true,
        model_path: path.display().to_string(),
        model: model.metadata().clone(),
    }))
}
