//! Per-kind ingestion: picked file → JPEG stills (+ preview).

use bytes::Bytes;
use futures::future::try_join_all;
use std::path::Path;
use std::sync::Arc;

use onereel_core::constants::PREVIEW_TIMESTAMP_MS;
use onereel_core::{FrameSample, IngestionConfig, MediaKind, MediaRef, PreviewRef};

use crate::encode::StillEncoder;
use crate::error::IngestError;
use crate::validator::MediaValidator;
use crate::video::{FFmpegService, FrameExtractor};

/// Stills produced from one picked media item, in ascending timestamp order.
#[derive(Debug, Clone)]
pub struct IngestedMedia {
    pub preview_ref: PreviewRef,
    pub frames: Vec<FrameSample>,
}

impl IngestedMedia {
    pub fn buffers(&self) -> Vec<Bytes> {
        self.frames.iter().map(|f| f.image_bytes.clone()).collect()
    }

    pub fn timestamps(&self) -> Vec<u64> {
        self.frames.iter().map(|f| f.timestamp_ms).collect()
    }
}

/// Turns `(MediaRef, MediaKind)` into stills suitable for description.
///
/// Images yield one re-encoded still that previews as the source itself.
/// Videos yield one still per configured timestamp plus a 0 ms thumbnail.
/// Any failure fails the whole ingestion; nothing is cached.
#[derive(Clone)]
pub struct MediaIngestor {
    extractor: Arc<dyn FrameExtractor>,
    encoder: StillEncoder,
    validator: MediaValidator,
    frame_timestamps_ms: Vec<u64>,
}

impl MediaIngestor {
    pub fn new(config: &IngestionConfig, extractor: Arc<dyn FrameExtractor>) -> Self {
        Self {
            extractor,
            encoder: StillEncoder::new(config.jpeg_quality),
            validator: MediaValidator::from_config(config),
            frame_timestamps_ms: config.frame_timestamps_ms.clone(),
        }
    }

    /// Build an ingestor that extracts video frames with ffmpeg.
    pub fn from_config(config: &IngestionConfig) -> Result<Self, IngestError> {
        let ffmpeg = FFmpegService::new(config.ffmpeg_path.clone())?;
        Ok(Self::new(config, Arc::new(ffmpeg)))
    }

    pub fn validator(&self) -> &MediaValidator {
        &self.validator
    }

    pub fn frame_timestamps_ms(&self) -> &[u64] {
        &self.frame_timestamps_ms
    }

    pub async fn ingest(
        &self,
        media_ref: &MediaRef,
        kind: MediaKind,
    ) -> Result<IngestedMedia, IngestError> {
        tracing::debug!(source = %media_ref, kind = %kind, "Ingesting media");

        match kind {
            MediaKind::Image => self.ingest_image(media_ref).await,
            MediaKind::Video => self.ingest_video(media_ref).await,
        }
    }

    async fn ingest_image(&self, media_ref: &MediaRef) -> Result<IngestedMedia, IngestError> {
        let path = media_ref.path();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        self.validator.validate_file_size(metadata.len())?;

        let data = tokio::fs::read(path)
            .await
            .map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        // The file may have grown between the stat and the read.
        self.validator.validate_file_size(data.len() as u64)?;

        let still = self.encoder.encode_jpeg_blocking(Bytes::from(data)).await?;

        tracing::debug!(source = %media_ref, still_size = still.len(), "Image re-encoded");

        Ok(IngestedMedia {
            preview_ref: PreviewRef::Source(media_ref.clone()),
            frames: vec![FrameSample::new(0, still)],
        })
    }

    async fn ingest_video(&self, media_ref: &MediaRef) -> Result<IngestedMedia, IngestError> {
        let path = media_ref.path();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        self.validator.validate_file_size(metadata.len())?;

        let frames = try_join_all(
            self.frame_timestamps_ms
                .iter()
                .map(|&timestamp_ms| self.sample_frame(path, timestamp_ms)),
        );
        let preview = async {
            self.extractor
                .extract_frame(path, PREVIEW_TIMESTAMP_MS)
                .await
                .map_err(|e| e.at_timestamp(PREVIEW_TIMESTAMP_MS))
        };

        let (frames, preview) = tokio::try_join!(frames, preview)?;

        if preview.is_empty() {
            return Err(
                IngestError::EmptyFrame("preview still is empty".to_string())
                    .at_timestamp(PREVIEW_TIMESTAMP_MS),
            );
        }

        tracing::debug!(
            source = %media_ref,
            frame_count = frames.len(),
            preview_size = preview.len(),
            "Video frames sampled"
        );

        Ok(IngestedMedia {
            preview_ref: PreviewRef::Thumbnail(preview),
            frames,
        })
    }

    async fn sample_frame(&self, path: &Path, timestamp_ms: u64) -> Result<FrameSample, IngestError> {
        let raw = self
            .extractor
            .extract_frame(path, timestamp_ms)
            .await
            .map_err(|e| e.at_timestamp(timestamp_ms))?;
        let still = self
            .encoder
            .encode_jpeg_blocking(raw)
            .await
            .map_err(|e| e.at_timestamp(timestamp_ms))?;

        Ok(FrameSample::new(timestamp_ms, still))
    }
}
