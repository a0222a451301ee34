//! JPEG re-encoding of stills

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;

use crate::error::IngestError;

/// Re-encodes any decodable image into a lossy JPEG.
///
/// Alpha is dropped; JPEG has no alpha channel.
#[derive(Debug, Clone, Copy)]
pub struct StillEncoder {
    quality: u8,
}

impl StillEncoder {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Decode `data` and encode it as JPEG. CPU-bound; see [`Self::encode_jpeg_blocking`].
    pub fn encode_jpeg(&self, data: &[u8]) -> Result<Bytes, IngestError> {
        let img = image::load_from_memory(data).map_err(|e| IngestError::Decode(e.to_string()))?;
        let rgb = img.to_rgb8();

        let mut buffer = Vec::with_capacity(data.len() / 2);
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
            encoder
                .encode_image(&rgb)
                .map_err(|e| IngestError::Encode(e.to_string()))?;
        }

        Ok(Bytes::from(buffer))
    }

    /// Same as [`Self::encode_jpeg`], run on the blocking pool.
    pub async fn encode_jpeg_blocking(&self, data: Bytes) -> Result<Bytes, IngestError> {
        let encoder = *self;
        tokio::task::spawn_blocking(move || encoder.encode_jpeg(&data))
            .await
            .map_err(|e| IngestError::Task(e.to_string()))?
    }
}
