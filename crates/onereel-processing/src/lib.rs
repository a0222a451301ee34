//! Media ingestion and normalization
//!
//! Turns a picked image or video into JPEG stills ready for description:
//! - `validator`: size and extension checks before any decoding
//! - `encode`: JPEG re-encoding of stills
//! - `video`: frame extraction (ffmpeg)
//! - `ingest`: the per-kind ingestion flow

pub mod encode;
pub mod error;
pub mod ingest;
pub mod validator;
pub mod video;

pub use encode::StillEncoder;
pub use error::IngestError;
pub use ingest::{IngestedMedia, MediaIngestor};
pub use validator::{MediaValidator, ValidationError};
pub use video::{FFmpegService, FrameExtractor};
