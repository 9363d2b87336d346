//! X-ray fracture detection service.
//!
//! Letterbox preprocessing, a pluggable inference engine, and the detection
//! post-processing (inverse letterbox, confidence filtering, greedy NMS) that
//! turns raw model rows into boxes on the uploaded image.

pub mod annotate;
pub mod config;
pub mod error;
pub mod handlers;
pub mod inference;
pub mod pipeline;
pub mod postprocess;
pub mod preprocess;
pub mod report;

pub use config::{Config, PipelineConfig};
pub use error::AppError;
pub use inference::{InferenceEngine, InferenceError};
pub use pipeline::{analyze, Analysis};
pub use postprocess::{BBox, Detection};
pub use preprocess::{DecodedImage, LetterboxTransform};
