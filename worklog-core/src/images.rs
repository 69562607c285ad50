//! Shrinking attachments before they are stored or uploaded.

use crate::error::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

/// Images wider than this are scaled down to it.
pub const MAX_WIDTH: u32 = 1280;
/// JPEG quality of compressed attachments.
pub const JPEG_QUALITY: u8 = 80;

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Decodes a PNG, JPEG or WebP image, scales it down to [`MAX_WIDTH`]
/// keeping the aspect ratio, and re-encodes it as a JPEG `data:` URI.
pub fn compress_image(bytes: &[u8]) -> Result<String> {
    let original = image::load_from_memory(bytes)?;
    let (width, height) = original.dimensions();
    let resized = if width > MAX_WIDTH {
        let scaled_height = (u64::from(height) * u64::from(MAX_WIDTH) / u64::from(width)).max(1);
        original.resize_exact(MAX_WIDTH, scaled_height as u32, FilterType::Triangle)
    } else {
        original
    };

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut jpeg = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY))?;
    debug!(
        from = bytes.len(),
        to = jpeg.len(),
        width = rgb.width(),
        height = rgb.height(),
        "compressed image"
    );

    Ok(format!("{DATA_URI_PREFIX}{}", STANDARD.encode(&jpeg)))
}

/// The JPEG bytes of a URI produced by [`compress_image`].
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let payload = uri.strip_prefix(DATA_URI_PREFIX)?;
    STANDARD.decode(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkLogError;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 128]));
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn decoded_size(uri: &str) -> (u32, u32) {
        let bytes = decode_data_uri(uri).expect("jpeg data uri");
        image::load_from_memory(&bytes).unwrap().dimensions()
    }

    #[test]
    fn wide_images_are_scaled_to_max_width() {
        let uri = compress_image(&png(2560, 1000)).unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!(decoded_size(&uri), (1280, 500));
    }

    #[test]
    fn small_images_keep_their_size() {
        let uri = compress_image(&png(300, 200)).unwrap();
        assert_eq!(decoded_size(&uri), (300, 200));
    }

    #[test]
    fn garbage_is_an_image_error() {
        let err = compress_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, WorkLogError::Image(_)));
    }
}
