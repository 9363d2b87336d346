/// Single-image detection pipeline.
///
/// bytes -> decode -> letterbox -> engine -> decode rows -> NMS.
/// Everything here is owned by the call; nothing is cached between requests.

use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::AppError;
use crate::inference::InferenceEngine;
use crate::postprocess::{postprocess, Detection};
use crate::preprocess::{decode_image, letterbox, DecodedImage, LetterboxTransform};

pub struct Analysis {
    pub image: DecodedImage,
    pub transform: LetterboxTransform,
    /// Kept detections, most confident first.
    pub detections: Vec<Detection>,
}

pub fn analyze(
    image_bytes: &[u8],
    engine: &dyn InferenceEngine,
    config: &PipelineConfig,
) -> Result<Analysis, AppError> {
    let image = decode_image(image_bytes)?;
    debug!(width = image.width, height = image.height, "decoded upload");

    let letterboxed = letterbox(&image, config.target_size, config.pad_color)?;
    let input = letterboxed.to_input_tensor();

    let raw = engine.infer(input.view())?;
    debug!(shape = ?raw.shape(), "engine output");

    let detections = postprocess(raw.view(), &letterboxed.transform, config);

    Ok(Analysis {
        image,
        transform: letterboxed.transform,
        detections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::InferenceError;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use ndarray::{ArrayD, ArrayView4, IxDyn};
    use std::io::Cursor;
    use std::sync::Mutex;

    struct FixedEngine {
        output: ArrayD<f32>,
        seen_shape: Mutex<Option<Vec<usize>>>,
    }

    impl InferenceEngine for FixedEngine {
        fn infer(&self, input: ArrayView4<'_, f32>) -> Result<ArrayD<f32>, InferenceError> {
            *self.seen_shape.lock().unwrap() = Some(input.shape().to_vec());
            Ok(self.output.clone())
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_end_to_end_with_fixed_output() {
        // (1, 5, 2): two overlapping normalized boxes around the canvas center
        let output = ArrayD::from_shape_vec(
            IxDyn(&[1, 5, 2]),
            vec![
                0.5, 0.51, // xc
                0.5, 0.5, // yc
                0.2, 0.2, // w
                0.2, 0.2, // h
                0.8, 0.9, // score
            ],
        )
        .unwrap();
        let engine = FixedEngine {
            output,
            seen_shape: Mutex::new(None),
        };

        let analysis = analyze(&png(200, 100), &engine, &PipelineConfig::default()).unwrap();

        assert_eq!(
            engine.seen_shape.lock().unwrap().clone(),
            Some(vec![1, 3, 640, 640])
        );
        assert_eq!(analysis.transform.pad_top, 160);
        assert_eq!(analysis.detections.len(), 1);
        assert!((analysis.detections[0].confidence - 90.0).abs() < 1e-4);

        let (cx, cy) = analysis.detections[0].bbox.center();
        assert!((cx - 102.0).abs() < 0.5);
        assert!((cy - 50.0).abs() < 0.5);
    }

    #[test]
    fn test_bad_image_is_decode_error() {
        let engine = FixedEngine {
            output: ArrayD::zeros(IxDyn(&[1, 5, 0])),
            seen_shape: Mutex::new(None),
        };
        let err = analyze(b"not an image", &engine, &PipelineConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, AppError::ImageDecode(_)));
        assert!(engine.seen_shape.lock().unwrap().is_none());
    }
}
