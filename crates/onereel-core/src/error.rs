//! Error types module
//!
//! Every OneReel error type implements [`ErrorMetadata`] so the UI boundary can
//! decide how to log it and what alert to show without matching on concrete
//! variants. Crate-specific errors (ingestion, description service, pipeline)
//! live next to the code that raises them; this module only holds the
//! metadata contract and the errors raised by the domain models themselves.

use crate::models::MediaKind;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like a refused permission
    Debug,
    /// Warning level - for user-correctable issues like unsupported files
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "PERMISSION_DENIED")
    fn error_code(&self) -> &'static str;

    /// Short title for the alert shown to the user
    fn alert_title(&self) -> &'static str;

    /// Whether picking the same media again may succeed
    fn is_recoverable(&self) -> bool;

    /// User-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Alert text for media that could not be turned into a description.
pub fn processing_failure_message(kind: MediaKind) -> String {
    match kind {
        MediaKind::Video => "Failed to process video frames.".to_string(),
        MediaKind::Image => "Failed to process image.".to_string(),
    }
}

/// Errors raised while building or addressing domain models.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Preview does not match media kind {kind}")]
    InvalidPreview { kind: MediaKind },

    #[error("Slot {index} is out of range (gallery has {slots} slots)")]
    SlotOutOfRange { index: usize, slots: usize },

    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),
}

impl ErrorMetadata for ModelError {
    fn error_code(&self) -> &'static str {
        match self {
            ModelError::InvalidPreview { .. } => "INVALID_PREVIEW",
            ModelError::SlotOutOfRange { .. } => "SLOT_OUT_OF_RANGE",
            ModelError::UnsupportedMedia(_) => "UNSUPPORTED_MEDIA",
        }
    }

    fn alert_title(&self) -> &'static str {
        match self {
            ModelError::UnsupportedMedia(_) => "Unsupported media",
            _ => "Error",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn client_message(&self) -> String {
        match self {
            ModelError::InvalidPreview { .. } => "Failed to build gallery entry.".to_string(),
            ModelError::SlotOutOfRange { index, slots } => {
                format!("Slot {} does not exist; choose 0-{}.", index, slots - 1)
            }
            ModelError::UnsupportedMedia(ref what) => {
                format!("Please pick an image or a video ({}).", what)
            }
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            ModelError::InvalidPreview { .. } => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}
