//! Image encoding: `DynamicImage` → base64 JPEG wrapped in `ImagePart`.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;

use super::{ImagePart, JPEG_MIME_TYPE};

/// Encodes a rendered page as a base64 JPEG.
///
/// The JPEG encoder has no alpha channel, so the page is flattened to RGB first.
pub fn encode_jpeg(img: &DynamicImage) -> Result<ImagePart, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)?;

    Ok(ImagePart {
        mime_type: JPEG_MIME_TYPE.to_string(),
        data: STANDARD.encode(&buf),
    })
}
