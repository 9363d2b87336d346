//! Greedy, class-agnostic non-maximum suppression.

use super::detection::Detection;

/// Keeps the most confident detection of every overlapping cluster.
///
/// Records are stably sorted by descending confidence, so equal confidences keep
/// their incoming order. A candidate is dropped when its IoU with an already kept
/// record is `>= iou_threshold`, whatever its class. The result is ordered by
/// descending confidence.
pub fn suppress(mut records: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    records.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut suppressed = vec![false; records.len()];

    for i in 0..records.len() {
        if suppressed[i] {
            continue;
        }
        for j in (i + 1)..records.len() {
            if !suppressed[j] && records[i].bbox.iou(&records[j].bbox) >= iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    records
        .into_iter()
        .zip(suppressed)
        .filter_map(|(record, dropped)| (!dropped).then_some(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postprocess::bbox::BBox;

    fn det(class_id: usize, confidence: f32, bbox: [f32; 4]) -> Detection {
        Detection {
            class_id,
            confidence,
            bbox: BBox::new(bbox[0], bbox[1], bbox[2], bbox[3]),
        }
    }

    #[test]
    fn test_empty() {
        assert!(suppress(Vec::new(), 0.45).is_empty());
    }

    #[test]
    fn test_keeps_highest_of_cluster() {
        let dets = vec![
            det(0, 60.0, [0.0, 0.0, 10.0, 10.0]),
            det(0, 90.0, [1.0, 1.0, 11.0, 11.0]),
            det(0, 80.0, [100.0, 100.0, 110.0, 110.0]),
        ];
        let kept = suppress(dets, 0.45);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].confidence, 90.0);
        assert_eq!(kept[1].confidence, 80.0);
    }

    #[test]
    fn test_ties_keep_first_in_order() {
        // Two 10x10 boxes shifted by 1px: IoU = 90 / 110 ~ 0.82
        let dets = vec![
            det(0, 90.0, [0.0, 0.0, 10.0, 10.0]),
            det(0, 90.0, [0.0, 1.0, 10.0, 11.0]),
        ];
        let kept = suppress(dets, 0.45);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].bbox, BBox::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_class_agnostic() {
        let dets = vec![
            det(0, 90.0, [0.0, 0.0, 10.0, 10.0]),
            det(1, 85.0, [0.0, 0.0, 10.0, 10.0]),
        ];
        let kept = suppress(dets, 0.45);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].class_id, 0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // IoU exactly 0.5: 10x10 boxes offset by a third of the width
        let a = det(0, 90.0, [0.0, 0.0, 30.0, 10.0]);
        let b = det(0, 80.0, [10.0, 0.0, 40.0, 10.0]);
        assert!((a.bbox.iou(&b.bbox) - 0.5).abs() < 1e-6);
        assert_eq!(suppress(vec![a.clone(), b.clone()], 0.5).len(), 1);
        assert_eq!(suppress(vec![a, b], 0.51).len(), 2);
    }

    #[test]
    fn test_suppressed_record_does_not_suppress() {
        // b overlaps a and c, a and c do not overlap: b is dropped by a, c survives
        let dets = vec![
            det(0, 90.0, [0.0, 0.0, 10.0, 10.0]),
            det(0, 80.0, [3.0, 0.0, 13.0, 10.0]),
            det(0, 70.0, [8.0, 0.0, 18.0, 10.0]),
        ];
        let kept = suppress(dets, 0.45);
        let confidences: Vec<f32> = kept.iter().map(|d| d.confidence).collect();
        assert_eq!(confidences, vec![90.0, 70.0]);
    }

    #[test]
    fn test_idempotent() {
        let dets = vec![
            det(0, 50.0, [0.0, 0.0, 10.0, 10.0]),
            det(0, 70.0, [2.0, 2.0, 12.0, 12.0]),
            det(0, 70.0, [40.0, 40.0, 60.0, 60.0]),
            det(0, 30.0, [45.0, 45.0, 65.0, 65.0]),
        ];
        let once = suppress(dets, 0.3);
        let twice = suppress(once.clone(), 0.3);
        assert_eq!(once, twice);
    }
}
