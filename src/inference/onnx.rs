/// ONNX Runtime engine.

use std::sync::Mutex;

use ndarray::{ArrayD, ArrayView4, IxDyn};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use tracing::{debug, info};

use super::{InferenceEngine, InferenceError};

impl From<ort::Error> for InferenceError {
    fn from(err: ort::Error) -> Self {
        InferenceError::Backend(err.to_string())
    }
}

pub struct OnnxEngine {
    // Session::run needs exclusive access
    session: Mutex<Session>,
}

impl OnnxEngine {
    pub fn load(model_path: &str) -> Result<Self, InferenceError> {
        info!("Loading ONNX model from {model_path}");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(num_cpus::get())?
            .commit_from_file(model_path)?;

        if let Some(input) = session.inputs.first() {
            info!("Model input: {}", input.name);
        }
        if let Some(output) = session.outputs.first() {
            info!("Model output: {}", output.name);
        }

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl InferenceEngine for OnnxEngine {
    fn infer(&self, input: ArrayView4<'_, f32>) -> Result<ArrayD<f32>, InferenceError> {
        let shape = input.shape().to_vec();
        let data: Vec<f32> = input.iter().copied().collect();
        let tensor = Tensor::from_array((shape.as_slice(), data))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::LockPoisoned)?;
        let outputs = session.run(ort::inputs![tensor])?;

        let (out_shape, out_data) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = out_shape.iter().map(|&d| d.max(0) as usize).collect();
        debug!(?dims, "raw model output");

        ArrayD::from_shape_vec(IxDyn(&dims), out_data.to_vec())
            .map_err(|e| InferenceError::Output(format!("shape {dims:?}: {e}")))
    }
}
