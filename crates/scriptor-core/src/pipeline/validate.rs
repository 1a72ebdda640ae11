//! Input validation before an image is decoded and uploaded.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Validates files before processing.
pub struct Validator {
    max_file_size_mb: u64,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            max_file_size_mb: limits.max_file_size_mb,
        }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks:
    /// - File exists and is readable
    /// - File size is within the upload limit
    /// - File has valid image magic bytes
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        let max_bytes = self.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.max_file_size_mb,
            });
        }

        self.check_magic_bytes(path)
    }

    /// Check file magic bytes to verify it's an image format providers accept.
    fn check_magic_bytes(&self, path: &Path) -> Result<(), PipelineError> {
        let mut file = std::fs::File::open(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {}", e),
        })?;

        let mut header = [0u8; 12];
        let bytes_read = file.read(&mut header).unwrap_or(0);

        if !Self::is_valid_image_header(&header, bytes_read) {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }

    /// JPEG, PNG, GIF and WebP: the formats every supported provider accepts inline.
    fn is_valid_image_header(header: &[u8; 12], bytes_read: usize) -> bool {
        if bytes_read < 4 {
            return false;
        }

        // JPEG: FF D8 FF
        if header[..3] == [0xFF, 0xD8, 0xFF] {
            return true;
        }

        // PNG: 89 50 4E 47
        if header[..4] == [0x89, b'P', b'N', b'G'] {
            return true;
        }

        // GIF: GIF8
        if &header[..4] == b"GIF8" {
            return true;
        }

        // WebP: RIFF....WEBP
        bytes_read >= 12 && &header[..4] == b"RIFF" && &header[8..12] == b"WEBP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes_jpeg() {
        let header = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(Validator::is_valid_image_header(&header, 12));
    }

    #[test]
    fn test_magic_bytes_png() {
        let header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert!(Validator::is_valid_image_header(&header, 12));
    }

    #[test]
    fn test_magic_bytes_webp() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'E', b'B', b'P'];
        assert!(Validator::is_valid_image_header(&header, 12));
    }

    #[test]
    fn test_magic_bytes_riff_without_webp_rejected() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'A', b'V', b'E'];
        assert!(!Validator::is_valid_image_header(&header, 12));
    }

    #[test]
    fn test_magic_bytes_tiff_rejected() {
        let header = [b'I', b'I', 0x2A, 0x00, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(!Validator::is_valid_image_header(&header, 12));
    }

    #[test]
    fn test_short_file_rejected() {
        let header = [0xFF, 0xD8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(!Validator::is_valid_image_header(&header, 2));
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let validator = Validator::new(&LimitsConfig::default());
        let err = validator.validate(&dir.path().join("gone.jpg")).unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_validate_rejects_text_named_jpg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.jpg");
        std::fs::write(&path, b"not an image at all").unwrap();
        let validator = Validator::new(&LimitsConfig::default());
        assert!(matches!(
            validator.validate(&path),
            Err(PipelineError::Decode { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.jpg");
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.resize(1024 * 1024 + 1, 0);
        std::fs::write(&path, &bytes).unwrap();

        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let err = Validator::new(&limits).validate(&path).unwrap_err();
        assert!(matches!(err, PipelineError::FileTooLarge { max_mb: 1, .. }));
    }
}
