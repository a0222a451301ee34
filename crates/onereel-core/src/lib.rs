//! OneReel Core Library
//!
//! This crate provides the domain models, error metadata, constants and
//! configuration shared by every OneReel component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{
    Config, DescriptionServiceConfig, GatherPolicy, IngestionConfig, PipelineConfig,
};
pub use error::{processing_failure_message, ErrorMetadata, LogLevel, ModelError};
pub use models::{FrameSample, MediaItem, MediaKind, MediaRef, PreviewRef};
