use std::path::Path;

use onereel_core::{IngestionConfig, MediaKind, ModelError};

/// Common validation errors for picked media
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Empty file")]
    EmptyFile,
}

/// Media file validator
///
/// Cheap checks that run before any decoding or ffmpeg invocation.
#[derive(Debug, Clone)]
pub struct MediaValidator {
    max_file_size: u64,
    image_extensions: Vec<String>,
    video_extensions: Vec<String>,
}

impl MediaValidator {
    pub fn new(
        max_file_size: u64,
        image_extensions: Vec<String>,
        video_extensions: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            image_extensions,
            video_extensions,
        }
    }

    pub fn from_config(config: &IngestionConfig) -> Self {
        Self::new(
            config.max_file_size_bytes as u64,
            config.image_extensions.clone(),
            config.video_extensions.clone(),
        )
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Classify a path as image or video from its extension
    pub fn detect_kind(&self, path: &Path) -> Result<MediaKind, ModelError> {
        MediaKind::from_path(path, &self.image_extensions, &self.video_extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> MediaValidator {
        MediaValidator::new(
            1024,
            vec!["jpg".to_string(), "png".to_string()],
            vec!["mp4".to_string()],
        )
    }

    #[test]
    fn test_validate_file_size() {
        let v = validator();
        assert!(v.validate_file_size(1).is_ok());
        assert!(v.validate_file_size(1024).is_ok());
        assert!(matches!(
            v.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
        assert!(matches!(
            v.validate_file_size(1025),
            Err(ValidationError::FileTooLarge { size: 1025, max: 1024 })
        ));
    }

    #[test]
    fn test_detect_kind() {
        let v = validator();
        assert_eq!(v.detect_kind(Path::new("x.PNG")).unwrap(), MediaKind::Image);
        assert_eq!(v.detect_kind(Path::new("x.mp4")).unwrap(), MediaKind::Video);
        assert!(v.detect_kind(Path::new("x.mov")).is_err());
    }

    #[test]
    fn test_from_config_uses_defaults() {
        let v = MediaValidator::from_config(&IngestionConfig::default());
        assert_eq!(v.detect_kind(Path::new("clip.webm")).unwrap(), MediaKind::Video);
        assert_eq!(v.detect_kind(Path::new("shot.webp")).unwrap(), MediaKind::Image);
    }
}
