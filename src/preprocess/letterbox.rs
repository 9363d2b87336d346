/// Letterbox preprocessing.
///
/// 1. scale = target / max(h, w), so the longer side lands exactly on `target`
/// 2. shorter side = round(side * scale), at least one pixel
/// 3. Resize with bilinear interpolation
/// 4. pad_total // 2 on the leading side, the remainder on the trailing side
/// 5. Constant pad color (114 by default)
/// 6. Normalize /255.0, HWC -> CHW for the engine

use fast_image_resize as fr;
use ndarray::Array4;
use thiserror::Error;
use tracing::debug;

use super::decode::DecodedImage;

#[derive(Debug, Error)]
pub enum LetterboxError {
    #[error("target size must be positive")]
    ZeroTarget,

    #[error("resize failed: {0}")]
    Resize(String),
}

/// Everything needed to map canvas coordinates back onto the source image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LetterboxTransform {
    pub scale: f64,
    pub pad_left: u32,
    pub pad_top: u32,
    pub original_width: u32,
    pub original_height: u32,
    pub target_size: u32,
}

impl LetterboxTransform {
    /// Computes the transform for an image of the given size without touching pixels.
    ///
    /// A zero `target_size` yields an empty transform (scale 0, no content);
    /// `letterbox` rejects it before getting here.
    pub fn new(original_width: u32, original_height: u32, target_size: u32) -> Self {
        let scale = if target_size == 0 {
            0.0
        } else {
            target_size as f64 / original_width.max(original_height) as f64
        };
        let (new_w, new_h) = resized_dims(original_width, original_height, scale, target_size);

        Self {
            scale,
            pad_left: (target_size - new_w) / 2,
            pad_top: (target_size - new_h) / 2,
            original_width,
            original_height,
            target_size,
        }
    }

    /// Size of the image content inside the canvas, before padding.
    pub fn resized_size(&self) -> (u32, u32) {
        resized_dims(
            self.original_width,
            self.original_height,
            self.scale,
            self.target_size,
        )
    }

    /// Padding as (left, top, right, bottom).
    pub fn padding(&self) -> (u32, u32, u32, u32) {
        let (new_w, new_h) = self.resized_size();
        let right = self.target_size - new_w - self.pad_left;
        let bottom = self.target_size - new_h - self.pad_top;
        (self.pad_left, self.pad_top, right, bottom)
    }
}

fn resized_dims(width: u32, height: u32, scale: f64, target_size: u32) -> (u32, u32) {
    if target_size == 0 {
        return (0, 0);
    }
    let side = |s: u32| ((s as f64 * scale).round() as u32).clamp(1, target_size);
    (side(width), side(height))
}

/// A padded square canvas and the transform that produced it.
pub struct Letterboxed {
    pub canvas: DecodedImage,
    pub transform: LetterboxTransform,
}

impl Letterboxed {
    /// Engine input: shape [1, 3, target, target], FP32, normalized [0,1].
    pub fn to_input_tensor(&self) -> Array4<f32> {
        let ts = self.transform.target_size as usize;
        let data = &self.canvas.data;

        Array4::from_shape_fn((1, 3, ts, ts), |(_, c, y, x)| {
            data[(y * ts + x) * 3 + c] as f32 / 255.0
        })
    }
}

pub fn letterbox(
    img: &DecodedImage,
    target_size: u32,
    pad_color: [u8; 3],
) -> Result<Letterboxed, LetterboxError> {
    if target_size == 0 {
        return Err(LetterboxError::ZeroTarget);
    }

    let transform = LetterboxTransform::new(img.width, img.height, target_size);
    let (new_w, new_h) = transform.resized_size();

    let resized = if (new_w, new_h) != (img.width, img.height) {
        resize_bilinear(&img.data, img.width, img.height, new_w, new_h)?
    } else {
        img.data.clone()
    };

    let ts = target_size as usize;
    let mut padded: Vec<u8> = pad_color
        .iter()
        .copied()
        .cycle()
        .take(ts * ts * 3)
        .collect();

    // Copy resized image into place
    let row_bytes = new_w as usize * 3;
    for y in 0..new_h as usize {
        let src_offset = y * row_bytes;
        let dst_offset = ((y + transform.pad_top as usize) * ts + transform.pad_left as usize) * 3;
        padded[dst_offset..dst_offset + row_bytes]
            .copy_from_slice(&resized[src_offset..src_offset + row_bytes]);
    }

    debug!(
        orig_w = img.width,
        orig_h = img.height,
        new_w,
        new_h,
        scale = transform.scale,
        pad_left = transform.pad_left,
        pad_top = transform.pad_top,
        "letterboxed image"
    );

    Ok(Letterboxed {
        canvas: DecodedImage {
            width: target_size,
            height: target_size,
            data: padded,
        },
        transform,
    })
}

/// Bilinear resize for RGB images using fast_image_resize.
fn resize_bilinear(
    src: &[u8],
    src_w: u32,
    src_h: u32,
    dst_w: u32,
    dst_h: u32,
) -> Result<Vec<u8>, LetterboxError> {
    let src_image = fr::images::Image::from_vec_u8(src_w, src_h, src.to_vec(), fr::PixelType::U8x3)
        .map_err(|e| LetterboxError::Resize(format!("source buffer: {e}")))?;

    let mut dst_image = fr::images::Image::new(dst_w, dst_h, fr::PixelType::U8x3);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(
            &src_image,
            &mut dst_image,
            &fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Interpolation(
                fr::FilterType::Bilinear,
            )),
        )
        .map_err(|e| LetterboxError::Resize(e.to_string()))?;

    Ok(dst_image.into_vec())
}
