/// Error types for the detection service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::inference::InferenceError;
use crate::preprocess::decode::ImageDecodeError;
use crate::preprocess::letterbox::LetterboxError;

#[derive(Debug)]
pub enum AppError {
    ImageDecode(String),
    Inference(String),
    ModelUnavailable,
    BadRequest(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::ImageDecode(msg) => write!(f, "Image decode error: {msg}"),
            AppError::Inference(msg) => write!(f, "Prediction error: {msg}"),
            AppError::ModelUnavailable => write!(f, "Model not loaded"),
            AppError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ImageDecode(_) => StatusCode::BAD_REQUEST,
            AppError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(format!("IO error: {err}"))
    }
}

impl From<ImageDecodeError> for AppError {
    fn from(err: ImageDecodeError) -> Self {
        AppError::ImageDecode(err.to_string())
    }
}

impl From<LetterboxError> for AppError {
    fn from(err: LetterboxError) -> Self {
        AppError::Internal(format!("Letterbox failed: {err}"))
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::Inference(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        tracing::error!(status = status.as_u16(), "{message}");

        let body = json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
