/// X-ray fracture detection service.
///
/// - Single process, tokio multi-thread runtime
/// - CPU-bound decode/letterbox/inference on the blocking pool
/// - ONNX Runtime engine when built with the `onnx` feature

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use xray_detect::config::Config;
use xray_detect::error::AppError;
use xray_detect::handlers::{self, AppState};
use xray_detect::inference::InferenceEngine;

fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("xray_detect=info,tower_http=debug")),
        )
        .init();

    eprintln!("[STARTUP] X-ray detection service starting...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .enable_all()
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build runtime: {e}")))?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), AppError> {
    let config = Config::from_env();
    info!("Model path: {}", config.model_path);
    info!("Port: {}", config.port);
    info!(
        "Input size: {0}x{0}, confidence threshold: {1}, IoU threshold: {2}",
        config.pipeline.target_size,
        config.pipeline.confidence_threshold,
        config.pipeline.iou_threshold
    );

    let engine = load_engine(&config.model_path);
    if engine.is_none() {
        warn!("No model loaded, /predict will answer 503");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = handlers::router(Arc::new(AppState { engine, config }));

    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    eprintln!("[STARTUP] Server ready! Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    eprintln!("[SHUTDOWN] Server stopped");
    Ok(())
}

#[cfg(feature = "onnx")]
fn load_engine(model_path: &str) -> Option<Arc<dyn InferenceEngine>> {
    if !std::path::Path::new(model_path).exists() {
        tracing::error!("Model file not found: {model_path}");
        return None;
    }
    match xray_detect::inference::OnnxEngine::load(model_path) {
        Ok(engine) => {
            info!("ONNX model loaded successfully");
            Some(Arc::new(engine))
        }
        Err(e) => {
            tracing::error!("Error loading model: {e}");
            None
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn load_engine(model_path: &str) -> Option<Arc<dyn InferenceEngine>> {
    warn!("Built without the `onnx` feature, ignoring model at {model_path}");
    None
}
