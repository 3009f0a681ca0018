//! Service index

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct Endpoints {
    check: &'static str,
    health: &'static str,
    reload: &'static str,
}

#[derive(Serialize)]
pub struct StatusResponse {
    status: &'static str,
    message: &'static str,
    version: &'static str,
    endpoints: Endpoints,
}

pub async fn index(State(state): State<AppState>) -> Json<StatusResponse> {
    let trained = state.pipeline.classifier().is_trained();
    Json(StatusResponse {
        status: if trained { "ready" } else { "needs training" },
        message: if trained {
            "PhishGuard API is running"
        } else {
            "PhishGuard API is running, but no model is loaded. Run phishguard-train first."
        },
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            check: "POST /api/check",
            health: "GET /health",
            reload: "POST /api/model/reload",
        },
    })
}
