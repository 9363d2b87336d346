pub mod decode;
pub mod letterbox;

pub use decode::{decode_image, DecodedImage, ImageDecodeError};
pub use letterbox::{letterbox, LetterboxError, LetterboxTransform, Letterboxed};
