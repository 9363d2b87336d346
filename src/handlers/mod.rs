pub mod health;
pub mod predict;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::inference::InferenceEngine;

pub struct AppState {
    /// `None` when the model failed to load; the service still answers health checks.
    pub engine: Option<Arc<dyn InferenceEngine>>,
    pub config: Config,
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::health))
        .route("/health", get(health::health))
        .route("/predict", post(predict::predict))
        .route("/test", post(predict::test_upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
