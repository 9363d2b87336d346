/// Canvas <-> original image coordinate mapping (inverse letterbox).
///
/// Models disagree on whether boxes come out as fractions of the canvas or as
/// canvas pixels. That is decided once per inference call and carried as a
/// [`CoordinateScale`] so every row of the call is mapped the same way.

use super::bbox::BBox;
use crate::preprocess::LetterboxTransform;

/// Values at or below `1.0 + NORMALIZED_EPSILON` are treated as fractions.
pub const NORMALIZED_EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinateScale {
    /// Fractions of the canvas side, [0, 1].
    Normalized,
    /// Canvas pixels, [0, target_size].
    CanvasPixels,
}

impl CoordinateScale {
    /// Decides the scale from every finite box coordinate (xc, yc, w, h) of one call.
    ///
    /// An empty input counts as normalized, which is harmless since there is
    /// nothing to map.
    pub fn detect<I>(coords: I) -> Self
    where
        I: IntoIterator<Item = f32>,
    {
        let max_coord = coords
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(f32::NEG_INFINITY, f32::max);

        if max_coord > 1.0 + NORMALIZED_EPSILON {
            CoordinateScale::CanvasPixels
        } else {
            CoordinateScale::Normalized
        }
    }

    /// Brings one raw value into canvas pixels.
    #[inline]
    pub fn to_canvas_pixels(self, value: f32, target_size: u32) -> f32 {
        match self {
            CoordinateScale::Normalized => value * target_size as f32,
            CoordinateScale::CanvasPixels => value,
        }
    }
}

/// Maps a canvas-pixel box onto the original image, clamped to its bounds.
///
/// Boxes lying entirely in the padding collapse onto an edge; they are not dropped here.
pub fn to_original(canvas_box: &BBox, transform: &LetterboxTransform) -> BBox {
    let scale = transform.scale;
    let pad_left = transform.pad_left as f64;
    let pad_top = transform.pad_top as f64;
    let max_x = transform.original_width as f64;
    let max_y = transform.original_height as f64;

    let x = |v: f32| ((v as f64 - pad_left) / scale).clamp(0.0, max_x) as f32;
    let y = |v: f32| ((v as f64 - pad_top) / scale).clamp(0.0, max_y) as f32;

    BBox::new(x(canvas_box.x1), y(canvas_box.y1), x(canvas_box.x2), y(canvas_box.y2))
}

/// Forward mapping: original image box into canvas pixels. No clamping.
pub fn to_canvas(original_box: &BBox, transform: &LetterboxTransform) -> BBox {
    let scale = transform.scale;
    let pad_left = transform.pad_left as f64;
    let pad_top = transform.pad_top as f64;

    let x = |v: f32| (v as f64 * scale + pad_left) as f32;
    let y = |v: f32| (v as f64 * scale + pad_top) as f32;

    BBox::new(
        x(original_box.x1),
        y(original_box.y1),
        x(original_box.x2),
        y(original_box.y2),
    )
}
