//! JPEG color-inversion transform.

use std::io::Cursor;

use bytes::Bytes;
use contracts::{FrameTransform, RelayError};
use image::codecs::jpeg::JpegEncoder;

/// Decodes a JPEG payload, inverts its colors, re-encodes at the
/// configured quality.
pub struct InvertTransform {
    quality: u8,
}

impl InvertTransform {
    /// Create an invert transform with the given JPEG quality (1-100)
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }
}

impl FrameTransform for InvertTransform {
    fn name(&self) -> &str {
        "invert"
    }

    async fn apply(&mut self, payload: Bytes) -> Result<Bytes, RelayError> {
        let mut img = image::load_from_memory(&payload)
            .map_err(|e| RelayError::transform_failed("invert", format!("decode: {e}")))?;

        img.invert();

        let mut out = Vec::with_capacity(payload.len());
        let mut cursor = Cursor::new(&mut out);
        let encoder = JpegEncoder::new_with_quality(&mut cursor, self.quality);
        img.write_with_encoder(encoder)
            .map_err(|e| RelayError::transform_failed("invert", format!("encode: {e}")))?;

        Ok(Bytes::from(out))
    }
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, RgbImage};

    use super::*;

    fn black_jpeg(width: u32, height: u32) -> Bytes {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buf = Vec::new();
        img.write_with_encoder(JpegEncoder::new_with_quality(
            &mut Cursor::new(&mut buf),
            90,
        ))
        .unwrap();
        Bytes::from(buf)
    }

    #[tokio::test]
    async fn test_invert_black_becomes_white() {
        let mut transform = InvertTransform::new(90);
        let out = transform.apply(black_jpeg(8, 8)).await.unwrap();

        let decoded = image::load_from_memory(&out).unwrap().to_rgb8();
        // JPEG is lossy; near-white is close enough
        let pixel = decoded.get_pixel(4, 4);
        assert!(pixel[0] > 200 && pixel[1] > 200 && pixel[2] > 200);
    }

    #[tokio::test]
    async fn test_invert_rejects_garbage() {
        let mut transform = InvertTransform::new(50);
        let result = transform.apply(Bytes::from_static(b"not a jpeg")).await;
        assert!(matches!(
            result,
            Err(RelayError::TransformFailed { .. })
        ));
    }
}
