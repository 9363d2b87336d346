/// Box overlay for the annotated response image.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::postprocess::Detection;

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_THICKNESS: i32 = 3;

/// Draws every detection as a red outline on a copy of `image`.
pub fn annotate(image: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut out = image.clone();
    let (w, h) = (out.width() as i32, out.height() as i32);

    for det in detections {
        let x_min = (det.bbox.x1.floor() as i32).clamp(0, w - 1);
        let y_min = (det.bbox.y1.floor() as i32).clamp(0, h - 1);
        let x_max = (det.bbox.x2.ceil() as i32).clamp(0, w - 1);
        let y_max = (det.bbox.y2.ceil() as i32).clamp(0, h - 1);

        for t in 0..BOX_THICKNESS {
            let (x0, y0, x1, y1) = (x_min + t, y_min + t, x_max - t, y_max - t);
            if x0 >= x1 || y0 >= y1 {
                break;
            }
            let rect = Rect::at(x0, y0).of_size((x1 - x0 + 1) as u32, (y1 - y0 + 1) as u32);
            draw_hollow_rect_mut(&mut out, rect, BOX_COLOR);
        }
    }

    out
}

/// JPEG-encodes the image as a `data:` URI.
pub fn to_data_uri(image: &RgbImage) -> Result<String, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Jpeg)?;
    Ok(format!(
        "data:image/jpeg;base64,{}",
        STANDARD.encode(buf.into_inner())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postprocess::BBox;

    fn det(bbox: [f32; 4]) -> Detection {
        Detection {
            class_id: 0,
            confidence: 90.0,
            bbox: BBox::new(bbox[0], bbox[1], bbox[2], bbox[3]),
        }
    }

    #[test]
    fn test_draws_outline_only() {
        let img = RgbImage::from_pixel(50, 50, Rgb([0, 0, 0]));
        let out = annotate(&img, &[det([10.0, 10.0, 40.0, 40.0])]);

        assert_eq!(*out.get_pixel(10, 25), BOX_COLOR);
        assert_eq!(*out.get_pixel(12, 25), BOX_COLOR);
        assert_eq!(*out.get_pixel(40, 25), BOX_COLOR);
        assert_eq!(*out.get_pixel(25, 25), Rgb([0, 0, 0]));
        // source untouched
        assert_eq!(*img.get_pixel(10, 25), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_degenerate_box_is_skipped() {
        let img = RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]));
        let out = annotate(&img, &[det([5.0, 0.0, 5.0, 0.0])]);
        assert_eq!(out, img);
    }

    #[test]
    fn test_data_uri_prefix() {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let uri = to_data_uri(&img).unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,/9j/"));
    }
}
