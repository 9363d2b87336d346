pub mod bbox;
pub mod coords;
pub mod detection;
pub mod nms;

pub use bbox::BBox;
pub use coords::{to_canvas, to_original, CoordinateScale};
pub use detection::{decode, Detection};
pub use nms::suppress;

use ndarray::ArrayViewD;

use crate::config::PipelineConfig;
use crate::preprocess::LetterboxTransform;

/// Raw engine output to final detections: decode, threshold, map back, suppress.
pub fn postprocess(
    raw: ArrayViewD<'_, f32>,
    transform: &LetterboxTransform,
    config: &PipelineConfig,
) -> Vec<Detection> {
    let candidates = decode(
        raw,
        transform,
        config.confidence_threshold,
        config.num_classes(),
    );
    let before = candidates.len();
    let kept = suppress(candidates, config.iou_threshold);

    tracing::debug!(before, after = kept.len(), "non-maximum suppression");
    kept
}
