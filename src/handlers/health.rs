/// Health endpoint: / and /health

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::handlers::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub model_type: String,
    pub model_path: String,
    pub input_size: u32,
    pub classes: BTreeMap<usize, String>,
    pub message: &'static str,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let model_type = state
        .engine
        .as_ref()
        .map(|engine| engine.describe())
        .unwrap_or_else(|| "none".to_string());

    Json(HealthResponse {
        status: "running",
        model_loaded: state.engine.is_some(),
        model_type,
        model_path: state.config.model_path.clone(),
        input_size: state.config.pipeline.target_size,
        classes: state.config.pipeline.class_names.clone(),
        message: "X-Ray Bone Fracture Detection Service",
    })
}
