/// Prediction response assembly: verdict, aggregate confidence, formatted boxes.

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::postprocess::Detection;

pub const VERDICT_POSITIVE: &str = "Fracture detected";
pub const VERDICT_NEGATIVE: &str = "Normal bone";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxCorners {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedDetection {
    pub class: String,
    pub class_id: usize,
    /// Percentage rounded to 2 decimals.
    pub confidence: f32,
    pub bbox: BoxCorners,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisReport {
    pub result: String,
    pub confidence: f32,
    pub details: String,
    pub total_detections: usize,
    pub detections: Vec<FormattedDetection>,
    pub annotated_image: String,
    pub inference_time_ms: f64,
}

impl DiagnosisReport {
    pub fn from_detections(
        detections: &[Detection],
        config: &PipelineConfig,
        annotated_image: String,
        inference_time_ms: f64,
    ) -> Self {
        let max_confidence = detections
            .iter()
            .map(|d| d.confidence)
            .fold(0.0f32, f32::max);

        let (result, details) = if detections.is_empty() {
            (
                VERDICT_NEGATIVE.to_string(),
                "No signs of fracture detected".to_string(),
            )
        } else {
            (
                VERDICT_POSITIVE.to_string(),
                format!("Detected {} abnormal region(s)", detections.len()),
            )
        };

        Self {
            result,
            confidence: round2(max_confidence),
            details,
            total_detections: detections.len(),
            detections: detections
                .iter()
                .map(|d| FormattedDetection {
                    class: config.class_name(d.class_id),
                    class_id: d.class_id,
                    confidence: round2(d.confidence),
                    bbox: BoxCorners {
                        x1: d.bbox.x1,
                        y1: d.bbox.y1,
                        x2: d.bbox.x2,
                        y2: d.bbox.y2,
                    },
                })
                .collect(),
            annotated_image,
            inference_time_ms,
        }
    }
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}
