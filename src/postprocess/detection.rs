/// Raw detection tensor decoding.
///
/// The engine hands back one tensor per call, either (1, 4+C, N) or (1, N, 4+C).
/// Each row is `[xc, yc, w, h, score_0, .., score_{C-1}]` in canvas space.
/// Decoding picks the best class per row, filters by confidence, and maps the
/// box back onto the original image.

use ndarray::{ArrayView2, ArrayViewD, Axis, Ix2};
use serde::Serialize;
use tracing::{debug, warn};

use super::bbox::BBox;
use super::coords::{to_original, CoordinateScale};
use crate::preprocess::LetterboxTransform;

/// One detection in original image pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub class_id: usize,
    /// Percentage, [0, 100].
    pub confidence: f32,
    pub bbox: BBox,
}

/// Number of leading box values in every row.
pub const BOX_FIELDS: usize = 4;

/// Views the raw engine output as N rows of features.
///
/// Rank 3 drops the batch axis. The features axis is the one whose length equals
/// `4 + num_classes`; when both axes match, the channel-first (4+C, N) layout
/// is assumed. When neither matches, the shorter axis is taken as features.
/// Returns `None` for ranks other than 2 or 3 and for an empty batch.
pub fn as_rows<'a>(raw: ArrayViewD<'a, f32>, num_features: usize) -> Option<ArrayView2<'a, f32>> {
    let matrix = match raw.ndim() {
        3 => {
            if raw.len_of(Axis(0)) == 0 {
                return None;
            }
            raw.index_axis_move(Axis(0), 0)
        }
        2 => raw,
        ndim => {
            warn!(ndim, shape = ?raw.shape(), "unsupported detection tensor rank");
            return None;
        }
    };
    let matrix = matrix.into_dimensionality::<Ix2>().ok()?;

    let (a, b) = matrix.dim();
    let transpose = match (a == num_features, b == num_features) {
        (true, _) => true,
        (false, true) => false,
        (false, false) => a < b,
    };

    Some(if transpose {
        matrix.reversed_axes()
    } else {
        matrix
    })
}

/// Decodes and filters one engine output. Suppression is not applied here.
pub fn decode(
    raw: ArrayViewD<'_, f32>,
    transform: &LetterboxTransform,
    conf_threshold: f32,
    num_classes: usize,
) -> Vec<Detection> {
    let num_features = BOX_FIELDS + num_classes;

    let Some(rows) = as_rows(raw, num_features) else {
        return Vec::new();
    };

    debug!(rows = rows.nrows(), cols = rows.ncols(), num_features, "decoding detections");

    if rows.nrows() == 0 {
        return Vec::new();
    }
    if num_classes == 0 || rows.ncols() < num_features {
        warn!(
            cols = rows.ncols(),
            expected = num_features,
            "detection rows too short, skipping all"
        );
        return Vec::new();
    }

    let scale = CoordinateScale::detect(
        rows.rows()
            .into_iter()
            .flat_map(|row| row.into_iter().take(BOX_FIELDS).copied().collect::<Vec<_>>()),
    );
    debug!(?scale, "coordinate scale");

    let mut detections = Vec::new();

    for row in rows.rows() {
        let scores = row.slice(ndarray::s![BOX_FIELDS..num_features]);

        // First maximum wins on ties
        let mut class_id = 0usize;
        let mut class_conf = f32::NEG_INFINITY;
        for (c, &score) in scores.iter().enumerate() {
            if score > class_conf {
                class_conf = score;
                class_id = c;
            }
        }

        if !class_conf.is_finite() || class_conf < conf_threshold {
            continue;
        }

        if !row.iter().take(BOX_FIELDS).all(|v| v.is_finite()) {
            continue;
        }

        let ts = transform.target_size;
        let canvas_box = BBox::from_cxcywh(
            scale.to_canvas_pixels(row[0], ts),
            scale.to_canvas_pixels(row[1], ts),
            scale.to_canvas_pixels(row[2], ts),
            scale.to_canvas_pixels(row[3], ts),
        );
        let bbox = to_original(&canvas_box, transform);
        if !bbox.is_finite() {
            continue;
        }

        detections.push(Detection {
            class_id,
            confidence: (class_conf * 100.0).clamp(0.0, 100.0),
            bbox,
        });
    }

    debug!(candidates = detections.len(), "detections above threshold");
    detections
}
