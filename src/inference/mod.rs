//! Inference engine seam.
//!
//! The service only needs something that turns a (1, 3, S, S) float tensor into
//! one raw detection tensor. Engines are shared across request handlers, so
//! implementations serialize access to their runtime internally.

use ndarray::{ArrayD, ArrayView4};
use thiserror::Error;

#[cfg(feature = "onnx")]
mod onnx;

#[cfg(feature = "onnx")]
pub use onnx::OnnxEngine;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference backend error: {0}")]
    Backend(String),

    #[error("unexpected model output: {0}")]
    Output(String),

    #[error("inference session lock poisoned")]
    LockPoisoned,
}

pub trait InferenceEngine: Send + Sync {
    /// Runs one forward pass and returns the first model output.
    fn infer(&self, input: ArrayView4<'_, f32>) -> Result<ArrayD<f32>, InferenceError>;

    /// Short label for health reporting.
    fn describe(&self) -> String {
        "YOLO ONNX Object Detection".to_string()
    }
}
