//! Description service abstraction

use async_trait::async_trait;
use std::fmt::Debug;

use onereel_core::models::DescriptionRequest;
use onereel_core::{ErrorMetadata, LogLevel};

/// Failures talking to a description service.
///
/// A reply that parses but carries no text is not an error; providers return
/// [`fallback_text`] for it.
#[derive(Debug, thiserror::Error)]
pub enum DescriptionError {
    #[error("{service} request failed: {message}")]
    Transport { service: String, message: String },

    #[error("{service} API request failed: {status} - {body}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {service} response: {message}")]
    MalformedResponse { service: String, message: String },

    #[error("{service} is not configured: {message}")]
    Configuration { service: String, message: String },
}

impl ErrorMetadata for DescriptionError {
    fn error_code(&self) -> &'static str {
        match self {
            DescriptionError::Transport { .. } => "DESCRIPTION_SERVICE_UNREACHABLE",
            DescriptionError::Status { .. } => "DESCRIPTION_SERVICE_ERROR",
            DescriptionError::MalformedResponse { .. } => "DESCRIPTION_SERVICE_BAD_RESPONSE",
            DescriptionError::Configuration { .. } => "DESCRIPTION_SERVICE_NOT_CONFIGURED",
        }
    }

    fn alert_title(&self) -> &'static str {
        "Error"
    }

    fn is_recoverable(&self) -> bool {
        match self {
            DescriptionError::Transport { .. } | DescriptionError::MalformedResponse { .. } => true,
            DescriptionError::Status { status, .. } => *status == 429 || *status >= 500,
            DescriptionError::Configuration { .. } => false,
        }
    }

    fn client_message(&self) -> String {
        match self {
            DescriptionError::Configuration { service, .. } => {
                format!("{} is not configured. Check the API key.", service)
            }
            DescriptionError::Status { status, .. } if *status == 401 || *status == 403 => {
                "The description service rejected the API key.".to_string()
            }
            _ => "Failed to describe media. Try again.".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            DescriptionError::Configuration { .. } => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// Text returned when a service answers without any usable description.
pub fn fallback_text(service: &str) -> String {
    format!("No response from {}.", service)
}

/// External vision-to-text collaborator.
#[async_trait]
pub trait DescriptionService: Send + Sync + Debug {
    /// Human-readable service name, used in logs and the fallback text.
    fn name(&self) -> &str;

    /// Describe one still. Empty or missing text resolves to [`fallback_text`].
    async fn describe_one(&self, request: DescriptionRequest) -> Result<String, DescriptionError>;
}
