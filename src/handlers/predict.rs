/// Prediction endpoints: /predict and /test

use crate::annotate::{annotate, to_data_uri};
use crate::error::AppError;
use crate::handlers::AppState;
use crate::pipeline::analyze;
use crate::report::DiagnosisReport;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

struct Upload {
    filename: Option<String>,
    bytes: Vec<u8>,
}

/// Pulls the `file` field out of a multipart form.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<Upload>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;
            return Ok(Some(Upload {
                filename,
                bytes: data.to_vec(),
            }));
        }
    }
    Ok(None)
}

/// POST /predict - Fracture detection on one uploaded X-ray
pub async fn predict(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<DiagnosisReport>, AppError> {
    let engine = state.engine.clone().ok_or(AppError::ModelUnavailable)?;

    let upload = read_file_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    if upload.filename.as_deref() == Some("") {
        return Err(AppError::BadRequest("Empty filename".to_string()));
    }

    let filename = upload.filename.unwrap_or_default();
    info!("Processing: {filename} ({} bytes)", upload.bytes.len());

    // Decode, resize, inference and drawing are all CPU-bound
    let pipeline = state.config.pipeline.clone();
    let report = tokio::task::spawn_blocking(move || -> Result<DiagnosisReport, AppError> {
        let start = Instant::now();
        let analysis = analyze(&upload.bytes, engine.as_ref(), &pipeline)?;

        let annotated = annotate(&analysis.image.to_rgb_image(), &analysis.detections);
        let annotated_image = to_data_uri(&annotated)
            .map_err(|e| AppError::Internal(format!("Failed to encode annotated image: {e}")))?;

        Ok(DiagnosisReport::from_detections(
            &analysis.detections,
            &pipeline,
            annotated_image,
            start.elapsed().as_secs_f64() * 1000.0,
        ))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Prediction task failed: {e}")))??;

    info!(
        "Detection completed: {} objects found, max confidence {:.2}%",
        report.total_detections, report.confidence
    );

    Ok(Json(report))
}

/// POST /test - Echo upload metadata
pub async fn test_upload(mut multipart: Multipart) -> Result<Json<UploadEcho>, AppError> {
    let upload = read_file_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest("No file".to_string()))?;

    Ok(Json(UploadEcho {
        message: "File received",
        filename: upload.filename.unwrap_or_default(),
        size: format!("{} bytes", upload.bytes.len()),
    }))
}

#[derive(Serialize)]
pub struct UploadEcho {
    pub message: &'static str,
    pub filename: String,
    pub size: String,
}
