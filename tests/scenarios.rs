use ndarray::{arr2, Array3};
use xray_detect::config::PipelineConfig;
use xray_detect::postprocess::{decode, postprocess, suppress};
use xray_detect::preprocess::LetterboxTransform;
use xray_detect::report::{DiagnosisReport, VERDICT_NEGATIVE};

#[test]
fn two_equal_confidence_overlapping_rows_keep_the_first() {
    // 90x50 boxes shifted by 10px along x: IoU = 80 / 100
    let raw = arr2(&[
        [100.0, 100.0, 90.0, 50.0, 0.9],
        [110.0, 100.0, 90.0, 50.0, 0.9],
    ]);
    let transform = LetterboxTransform::new(640, 640, 640);

    let candidates = decode(raw.view().into_dyn(), &transform, 0.15, 1);
    assert_eq!(candidates.len(), 2);
    assert!((candidates[0].bbox.iou(&candidates[1].bbox) - 0.8).abs() < 1e-5);

    let kept = suppress(candidates, 0.45);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].bbox.center(), (100.0, 100.0));
}

#[test]
fn normalized_coordinates_land_on_image_center() {
    let raw = Array3::from_shape_vec((1, 1, 5), vec![0.5, 0.5, 0.25, 0.25, 0.6]).unwrap();
    let transform = LetterboxTransform::new(800, 800, 640);

    let dets = decode(raw.view().into_dyn(), &transform, 0.15, 1);
    assert_eq!(dets.len(), 1);

    let (cx, cy) = dets[0].bbox.center();
    assert!((cx - 400.0).abs() < 1.0);
    assert!((cy - 400.0).abs() < 1.0);
    assert!((dets[0].bbox.width() - 200.0).abs() < 1.0);
}

#[test]
fn normalized_coordinates_on_portrait_image() {
    // 500x1000 -> 320x640 with 160 columns of padding on the left
    let raw = Array3::from_shape_vec((1, 5, 1), vec![0.5, 0.25, 0.1, 0.1, 0.6]).unwrap();
    let transform = LetterboxTransform::new(500, 1000, 640);
    assert_eq!(transform.pad_left, 160);

    let dets = decode(raw.view().into_dyn(), &transform, 0.15, 1);
    let (cx, cy) = dets[0].bbox.center();
    assert!((cx - 250.0).abs() < 1e-2);
    assert!((cy - 250.0).abs() < 1e-2);
}

#[test]
fn empty_tensor_reports_no_detections() {
    let raw = Array3::<f32>::zeros((1, 5, 0));
    let transform = LetterboxTransform::new(1024, 768, 640);
    let config = PipelineConfig::default();

    let dets = postprocess(raw.view().into_dyn(), &transform, &config);
    assert!(dets.is_empty());

    let report = DiagnosisReport::from_detections(&dets, &config, String::new(), 0.0);
    assert_eq!(report.result, VERDICT_NEGATIVE);
    assert_eq!(report.confidence, 0.0);
    assert_eq!(report.total_detections, 0);
}

#[test]
fn postprocess_applies_configured_thresholds() {
    let raw = arr2(&[
        [100.0, 100.0, 40.0, 40.0, 0.95],
        [104.0, 100.0, 40.0, 40.0, 0.85],
        [400.0, 400.0, 40.0, 40.0, 0.50],
        [500.0, 500.0, 40.0, 40.0, 0.10],
    ]);
    let transform = LetterboxTransform::new(640, 640, 640);

    let kept = postprocess(raw.view().into_dyn(), &transform, &PipelineConfig::default());
    let confidences: Vec<f32> = kept.iter().map(|d| d.confidence.round()).collect();
    assert_eq!(confidences, vec![95.0, 50.0]);

    let strict = PipelineConfig {
        confidence_threshold: 0.9,
        ..PipelineConfig::default()
    };
    assert_eq!(postprocess(raw.view().into_dyn(), &transform, &strict).len(), 1);
}
