/// Image decoding into a packed RGB buffer.
///
/// Grayscale sources are replicated across the three channels and alpha is
/// dropped, so everything downstream only ever sees 3-channel pixels.

use image::{DynamicImage, RgbImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageDecodeError {
    #[error("empty image payload")]
    Empty,

    #[error("unreadable image: {0}")]
    Unreadable(#[from] image::ImageError),

    #[error("image has zero size ({width}x{height})")]
    ZeroSize { width: u32, height: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// RGB pixel data, row-major, 3 bytes per pixel
    pub data: Vec<u8>,
}

impl DecodedImage {
    /// Wraps an already decoded image, normalizing its channel layout to RGB.
    pub fn from_dynamic(img: DynamicImage) -> Result<Self, ImageDecodeError> {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageDecodeError::ZeroSize { width, height });
        }
        Ok(Self {
            width,
            height,
            data: rgb.into_raw(),
        })
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }
}

/// Decode image bytes into RGB pixel data.
pub fn decode_image(data: &[u8]) -> Result<DecodedImage, ImageDecodeError> {
    if data.is_empty() {
        return Err(ImageDecodeError::Empty);
    }
    let img = image::load_from_memory(data)?;
    DecodedImage::from_dynamic(img)
}
