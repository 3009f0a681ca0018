//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use phishguard_core::logic::model::EngineStatus;
use phishguard_core::ModelMetadata;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_trained: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<ModelMetadata>,
    engine: EngineStatus,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let health = state.pipeline.health();
    Json(HealthResponse {
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        model_trained: health.model_trained,
        model: health.model,
        engine: health.engine,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
