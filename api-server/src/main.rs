//! PhishGuard API Server
//!
//! HTTP front end for the URL phishing classifier.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     PHISHGUARD API                       │
//! ├──────────────────────────────────────────────────────────┤
//! │   GET /   GET /health   POST /api/check   POST /reload   │
//! │                 (Axum, CORS, trace, gzip)                │
//! │                           │                              │
//! │                           ▼                              │
//! │   ScoringPipeline ──► Classifier (Arc<TrainedModel>)     │
//! │                           ▲                              │
//! │                           │ load / reload                │
//! │                    phishguard_model.json                 │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod handlers;
mod error;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishguard_core::{Classifier, ScoringPipeline};

pub use error::{AppError, AppResult};

const DEFAULT_LOG_FILTER: &str = "phishguard_api=debug,phishguard_core=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("PhishGuard API starting ({})", config.environment);
    tracing::info!("Model file: {}", config.model_path.display());

    let classifier = Arc::new(Classifier::load_or_untrained(&config.model_path));
    if !classifier.is_trained() {
        tracing::warn!("No model loaded; /api/check will answer 503 until one is trained and reloaded");
    }

    let state = AppState {
        pipeline: Arc::new(ScoringPipeline::new(classifier)),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = config.socket_addr();
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ScoringPipeline>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::status::index))
        .route("/health", get(handlers::health::check))
        .route("/api/check", post(handlers::check::check_url))
        .route("/api/model/reload", post(handlers::model::reload))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
