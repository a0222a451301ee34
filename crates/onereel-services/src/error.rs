use onereel_core::{processing_failure_message, ErrorMetadata, LogLevel, MediaKind, ModelError};
use onereel_plugins::DescriptionError;
use onereel_processing::IngestError;

/// Errors surfaced by the pick → ingest → describe → store pipeline.
///
/// An empty reply from the description service is not an error; it resolves
/// to the service's fallback text before it ever reaches this type.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Media library permission was denied")]
    PermissionDenied,

    #[error(transparent)]
    Ingestion(#[from] IngestError),

    #[error("Description failed: {source}")]
    Description {
        /// Kind of media being described, once the pipeline knows it.
        kind: Option<MediaKind>,
        #[source]
        source: DescriptionError,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Slot {index} is out of range (gallery has {slots} slots)")]
    SlotOutOfRange { index: usize, slots: usize },
}

impl PipelineError {
    /// Attach the media kind to a description failure.
    pub fn with_kind(self, kind: MediaKind) -> Self {
        match self {
            PipelineError::Description { source, .. } => PipelineError::Description {
                kind: Some(kind),
                source,
            },
            other => other,
        }
    }
}

impl From<DescriptionError> for PipelineError {
    fn from(source: DescriptionError) -> Self {
        PipelineError::Description { kind: None, source }
    }
}

impl From<ModelError> for PipelineError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::SlotOutOfRange { index, slots } => {
                PipelineError::SlotOutOfRange { index, slots }
            }
            ModelError::UnsupportedMedia(_) => PipelineError::Ingestion(IngestError::from(err)),
            ModelError::InvalidPreview { .. } => PipelineError::InvalidInput(err.to_string()),
        }
    }
}

impl ErrorMetadata for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            PipelineError::PermissionDenied => "PERMISSION_DENIED",
            PipelineError::Ingestion(err) => err.error_code(),
            PipelineError::Description { source, .. } => source.error_code(),
            PipelineError::InvalidInput(_) => "INVALID_INPUT",
            PipelineError::SlotOutOfRange { .. } => "SLOT_OUT_OF_RANGE",
        }
    }

    fn alert_title(&self) -> &'static str {
        match self {
            PipelineError::PermissionDenied => "Permission required",
            PipelineError::Ingestion(err) => err.alert_title(),
            _ => "Error",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            PipelineError::PermissionDenied => true,
            PipelineError::Ingestion(err) => err.is_recoverable(),
            PipelineError::Description { source, .. } => source.is_recoverable(),
            PipelineError::InvalidInput(_) | PipelineError::SlotOutOfRange { .. } => false,
        }
    }

    fn client_message(&self) -> String {
        match self {
            PipelineError::PermissionDenied => "Please grant photo library access.".to_string(),
            PipelineError::Ingestion(err) => err.client_message(),
            PipelineError::Description {
                source: source @ DescriptionError::Configuration { .. },
                ..
            } => source.client_message(),
            PipelineError::Description {
                kind: Some(kind), ..
            } => processing_failure_message(*kind),
            PipelineError::Description { source, .. } => source.client_message(),
            PipelineError::InvalidInput(msg) => msg.clone(),
            PipelineError::SlotOutOfRange { index, slots } => {
                ModelError::SlotOutOfRange {
                    index: *index,
                    slots: *slots,
                }
                .client_message()
            }
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            PipelineError::PermissionDenied => LogLevel::Debug,
            PipelineError::Ingestion(err) => err.log_level(),
            PipelineError::Description { source, .. } => source.log_level(),
            PipelineError::InvalidInput(_) | PipelineError::SlotOutOfRange { .. } => LogLevel::Warn,
        }
    }
}
