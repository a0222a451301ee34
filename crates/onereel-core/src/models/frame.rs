use bytes::Bytes;

/// A still taken from a media item, ready to be described.
///
/// Exists only while a pick is being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSample {
    pub timestamp_ms: u64,
    pub image_bytes: Bytes,
}

impl FrameSample {
    pub fn new(timestamp_ms: u64, image_bytes: impl Into<Bytes>) -> Self {
        Self {
            timestamp_ms,
            image_bytes: image_bytes.into(),
        }
    }
}

/// One unit of work for the description service.
#[derive(Debug, Clone)]
pub struct DescriptionRequest {
    pub image_bytes: Bytes,
    pub prompt: String,
}
