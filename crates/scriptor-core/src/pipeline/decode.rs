//! Image decoding with format detection and timeout support.
//!
//! Pages are decoded fully before upload so that a corrupt scan aborts the
//! run locally instead of surfacing as an opaque API error.

use image::{GenericImageView, ImageFormat};
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::llm::ImageInput;

/// Image decoder with a configurable timeout.
pub struct ImageDecoder {
    decode_timeout_ms: u64,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// Original file bytes (uploaded as-is)
    pub bytes: Vec<u8>,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl DecodedImage {
    /// Encode for an inference request.
    pub fn to_input(&self) -> ImageInput {
        ImageInput::from_bytes(&self.bytes, &format_to_string(self.format))
    }
}

impl ImageDecoder {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            decode_timeout_ms: limits.decode_timeout_ms,
        }
    }

    /// Read and decode the image at `path`.
    pub async fn decode(&self, path: &Path) -> Result<DecodedImage, PipelineError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read file: {}", e),
            })?;
        self.decode_from_bytes(bytes, path).await
    }

    /// Decode an in-memory buffer on the blocking pool, bounded by the decode timeout.
    pub async fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        path: &Path,
    ) -> Result<DecodedImage, PipelineError> {
        let path_owned = path.to_path_buf();
        let timeout_duration = Duration::from_millis(self.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(bytes, &path_owned)).await
        })
        .await;

        match decode_result {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    fn decode_bytes_sync(bytes: Vec<u8>, path: &Path) -> Result<DecodedImage, PipelineError> {
        let reader = image::ImageReader::new(std::io::Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(path).map_err(|_| PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            })?,
        };
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            bytes,
            format,
            width,
            height,
        })
    }
}

/// Convert an ImageFormat to the identifier `ImageInput` expects.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::new_rgb8(16, 8)
            .write_to(&mut std::io::Cursor::new(&mut buf), format)
            .unwrap();
        buf
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::Tiff), "unknown");
    }

    #[test]
    fn test_decode_jpeg_keeps_original_bytes() {
        let bytes = encoded(ImageFormat::Jpeg);
        let decoded =
            ImageDecoder::decode_bytes_sync(bytes.clone(), Path::new("page.jpg")).unwrap();
        assert_eq!(decoded.format, ImageFormat::Jpeg);
        assert_eq!((decoded.width, decoded.height), (16, 8));
        assert_eq!(decoded.bytes, bytes);
        assert_eq!(decoded.to_input().media_type, "image/jpeg");
    }

    #[test]
    fn test_format_detected_by_content() {
        // PNG data under a .jpg name is still sent as PNG
        let bytes = encoded(ImageFormat::Png);
        let decoded = ImageDecoder::decode_bytes_sync(bytes, Path::new("misnamed.jpg")).unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!(decoded.to_input().media_type, "image/png");
    }

    #[test]
    fn test_truncated_jpeg_fails() {
        let mut bytes = encoded(ImageFormat::Jpeg);
        bytes.truncate(20);
        let result = ImageDecoder::decode_bytes_sync(bytes, Path::new("broken.jpg"));
        assert!(matches!(result, Err(PipelineError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_decode_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.jpg");
        std::fs::write(&path, encoded(ImageFormat::Jpeg)).unwrap();

        let decoder = ImageDecoder::new(&LimitsConfig::default());
        let decoded = decoder.decode(&path).await.unwrap();
        assert_eq!(decoded.width, 16);
    }
}
