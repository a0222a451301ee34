use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::error::IngestError;

/// Source of still frames from a video file.
///
/// Implementations must return a non-empty encoded image for every call or
/// fail; sampling past the end of the video is theirs to resolve.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Extract the frame shown at `timestamp_ms`.
    async fn extract_frame(&self, video: &Path, timestamp_ms: u64) -> Result<Bytes, IngestError>;
}
