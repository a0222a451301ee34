use std::path::PathBuf;

use onereel_core::{processing_failure_message, ErrorMetadata, LogLevel, MediaKind, ModelError};

use crate::validator::ValidationError;

/// Errors raised while turning a picked file into stills.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Unsupported(#[from] ModelError),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode still: {0}")]
    Encode(String),

    #[error("FFmpeg not found at '{0}'")]
    FfmpegNotFound(String),

    #[error("FFmpeg execution failed: {0}")]
    FfmpegFailed(String),

    #[error("No frame could be extracted: {0}")]
    EmptyFrame(String),

    #[error("Frame at {timestamp_ms}ms failed: {source}")]
    Frame {
        timestamp_ms: u64,
        #[source]
        source: Box<IngestError>,
    },

    #[error("Background task failed: {0}")]
    Task(String),
}

impl IngestError {
    /// Attach the sampling point a frame-level failure happened at.
    pub fn at_timestamp(self, timestamp_ms: u64) -> Self {
        IngestError::Frame {
            timestamp_ms,
            source: Box::new(self),
        }
    }

    /// Kind of media the error most likely concerns, for the alert text.
    fn concerns_video(&self) -> bool {
        matches!(
            self,
            IngestError::FfmpegNotFound(_)
                | IngestError::FfmpegFailed(_)
                | IngestError::EmptyFrame(_)
                | IngestError::Frame { .. }
        )
    }
}

impl ErrorMetadata for IngestError {
    fn error_code(&self) -> &'static str {
        match self {
            IngestError::Read { .. } => "MEDIA_READ_FAILED",
            IngestError::Validation(_) => "INVALID_MEDIA",
            IngestError::Unsupported(_) => "UNSUPPORTED_MEDIA",
            IngestError::Decode(_) => "IMAGE_DECODE_FAILED",
            IngestError::Encode(_) => "IMAGE_ENCODE_FAILED",
            IngestError::FfmpegNotFound(_) => "FFMPEG_NOT_FOUND",
            IngestError::FfmpegFailed(_) | IngestError::EmptyFrame(_) | IngestError::Frame { .. } => {
                "FRAME_EXTRACTION_FAILED"
            }
            IngestError::Task(_) => "INTERNAL_ERROR",
        }
    }

    fn alert_title(&self) -> &'static str {
        match self {
            IngestError::Unsupported(_) => "Unsupported media",
            _ => "Error",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, IngestError::Read { .. } | IngestError::Task(_))
    }

    fn client_message(&self) -> String {
        match self {
            IngestError::Validation(err) => err.to_string(),
            IngestError::Unsupported(err) => err.client_message(),
            IngestError::FfmpegNotFound(_) => {
                "Video support requires ffmpeg; install it or set FFMPEG_PATH.".to_string()
            }
            err if err.concerns_video() => processing_failure_message(MediaKind::Video),
            _ => processing_failure_message(MediaKind::Image),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            IngestError::Validation(_) | IngestError::Unsupported(_) => LogLevel::Warn,
            IngestError::Decode(_) => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}
