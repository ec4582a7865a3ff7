use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use thiserror::Error;
use tracing::debug;

pub const MAX_DIMENSION: u32 = 1024;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Invalid image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub mime_type: String,
    pub data_base64: String,
}

/// Decodes an upload, shrinks it to fit within 1024x1024 and re-encodes it as base64.
pub fn prepare_image(bytes: &[u8]) -> Result<PreparedImage, ImageError> {
    let format = image::guess_format(bytes).ok();
    let img = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;

    let (w, h) = img.dimensions();
    let img = if w > MAX_DIMENSION || h > MAX_DIMENSION {
        debug!(width = w, height = h, "downscaling uploaded image");
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };

    let (format, bytes) = match format.filter(|f| f.writing_enabled()) {
        Some(f) if f != ImageFormat::Jpeg => match encode(&img, f) {
            Ok(bytes) => (f, bytes),
            Err(err) => {
                debug!(error = %err, ?f, "re-encoding in original format failed, using JPEG");
                (ImageFormat::Jpeg, encode(&img, ImageFormat::Jpeg)?)
            }
        },
        _ => (ImageFormat::Jpeg, encode(&img, ImageFormat::Jpeg)?),
    };

    Ok(PreparedImage {
        mime_type: format.to_mime_type().to_string(),
        data_base64: B64.encode(bytes),
    })
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ImageError> {
    let mut buf: Vec<u8> = Vec::new();
    let result = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut Cursor::new(&mut buf), format)
    } else {
        img.write_to(&mut Cursor::new(&mut buf), format)
    };
    result.map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{RgbImage, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(width, height));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        buf
    }

    fn decode(prepared: &PreparedImage) -> DynamicImage {
        let raw = B64.decode(&prepared.data_base64).unwrap();
        image::load_from_memory(&raw).unwrap()
    }

    #[test]
    fn wide_image_is_downscaled_preserving_aspect() {
        let prepared = prepare_image(&png_bytes(2048, 1024)).unwrap();
        assert_eq!(prepared.mime_type, "image/png");
        let (w, h) = decode(&prepared).dimensions();
        assert_eq!((w, h), (1024, 512));
    }

    #[test]
    fn tall_image_fits_within_bounds() {
        let prepared = prepare_image(&png_bytes(300, 3000)).unwrap();
        let (w, h) = decode(&prepared).dimensions();
        assert!(w.max(h) <= MAX_DIMENSION);
        assert_eq!(h, 1024);
        assert!((w as i64 - 102).abs() <= 1);
    }

    #[test]
    fn small_image_keeps_dimensions() {
        let prepared = prepare_image(&png_bytes(64, 32)).unwrap();
        assert_eq!(decode(&prepared).dimensions(), (64, 32));
    }

    #[test]
    fn jpeg_stays_jpeg() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(40, 20));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg).unwrap();

        let prepared = prepare_image(&buf).unwrap();
        assert_eq!(prepared.mime_type, "image/jpeg");
        assert_eq!(decode(&prepared).dimensions(), (40, 20));
    }

    #[test]
    fn bmp_is_decoded_and_kept() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(2, 1));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Bmp).unwrap();

        let prepared = prepare_image(&buf).unwrap();
        assert_eq!(prepared.mime_type, "image/bmp");
        assert_eq!(decode(&prepared).dimensions(), (2, 1));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = prepare_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
        assert!(err.to_string().starts_with("Invalid image:"));
    }
}
