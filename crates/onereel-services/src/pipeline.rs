//! Pick → ingest → describe → store, for one gallery slot at a time.

use async_trait::async_trait;
use std::sync::Arc;

use onereel_core::constants::GALLERY_SLOTS;
use onereel_core::{Config, MediaItem, MediaKind, MediaRef, PipelineConfig};
use onereel_plugins::GeminiVisionClient;
use onereel_processing::MediaIngestor;

use crate::aggregator::DescriptionAggregator;
use crate::error::PipelineError;
use crate::gallery::{CommitOutcome, GalleryStore};

/// Media chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedMedia {
    pub media_ref: MediaRef,
    pub kind: MediaKind,
}

/// Where picks come from (photo library, file path, ...).
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Ask for access to the library. `false` stops the pick.
    async fn request_permission(&self) -> bool;

    /// Let the user choose one item; `None` when they cancel.
    async fn pick(&self) -> Option<PickedMedia>;
}

#[derive(Debug, Clone)]
pub enum PickOutcome {
    Stored(Arc<MediaItem>),
    /// The user backed out of the picker; the slot was not touched.
    Cancelled,
    /// A newer pick, set or clear on the slot won; this result was dropped.
    Superseded,
}

#[derive(Clone)]
pub struct MediaPipeline {
    ingestor: MediaIngestor,
    aggregator: DescriptionAggregator,
    gallery: GalleryStore,
    config: PipelineConfig,
}

impl MediaPipeline {
    pub fn new(
        ingestor: MediaIngestor,
        aggregator: DescriptionAggregator,
        gallery: GalleryStore,
        config: PipelineConfig,
    ) -> Self {
        Self {
            ingestor,
            aggregator,
            gallery,
            config,
        }
    }

    /// Wire up ffmpeg ingestion and the Gemini client from `config`, with an
    /// empty gallery.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let ingestor = MediaIngestor::from_config(&config.ingestion)?;
        let service = GeminiVisionClient::new(&config.description)?;
        let aggregator =
            DescriptionAggregator::new(Arc::new(service), config.pipeline.gather_policy);

        tracing::info!(
            model = %config.description.model,
            frame_count = config.ingestion.frame_timestamps_ms.len(),
            gather_policy = ?config.pipeline.gather_policy,
            "Media pipeline initialized"
        );

        Ok(Self::new(
            ingestor,
            aggregator,
            GalleryStore::new(),
            config.pipeline.clone(),
        ))
    }

    pub fn gallery(&self) -> &GalleryStore {
        &self.gallery
    }

    pub fn ingestor(&self) -> &MediaIngestor {
        &self.ingestor
    }

    pub fn prompt_for(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Image => &self.config.image_prompt,
            MediaKind::Video => &self.config.video_frame_prompt,
        }
    }

    /// Run a full pick for slot `index`: permission, picker, then
    /// [`Self::process_into_slot`].
    pub async fn pick_into_slot(
        &self,
        index: usize,
        source: &dyn MediaSource,
    ) -> Result<PickOutcome, PipelineError> {
        if index >= GALLERY_SLOTS {
            return Err(PipelineError::SlotOutOfRange {
                index,
                slots: GALLERY_SLOTS,
            });
        }

        if !source.request_permission().await {
            tracing::debug!(slot = index, "Media library permission denied");
            return Err(PipelineError::PermissionDenied);
        }

        let Some(picked) = source.pick().await else {
            tracing::debug!(slot = index, "Pick cancelled");
            return Ok(PickOutcome::Cancelled);
        };

        self.process_into_slot(index, picked.media_ref, picked.kind)
            .await
    }

    /// Ingest, describe and store `media_ref` into slot `index`.
    ///
    /// The slot is only written on success, and only if no newer write to it
    /// started meanwhile. On error the slot keeps its previous entry.
    pub async fn process_into_slot(
        &self,
        index: usize,
        media_ref: MediaRef,
        kind: MediaKind,
    ) -> Result<PickOutcome, PipelineError> {
        let lease = self.gallery.reserve(index).await?;

        tracing::info!(
            slot = index,
            kind = %kind,
            source = %media_ref,
            generation = lease.generation(),
            "Processing picked media"
        );

        let item = self.describe_media(media_ref, kind).await?;

        match self.gallery.commit(lease, item).await {
            CommitOutcome::Stored(item) => {
                tracing::info!(
                    slot = index,
                    item_id = %item.id(),
                    kind = %item.kind(),
                    description_length = item.description().len(),
                    "Gallery slot updated"
                );
                Ok(PickOutcome::Stored(item))
            }
            CommitOutcome::Superseded => {
                tracing::info!(slot = index, "Pick superseded by a newer one, result dropped");
                Ok(PickOutcome::Superseded)
            }
        }
    }

    /// Ingest and describe without touching the gallery.
    pub async fn describe_media(
        &self,
        media_ref: MediaRef,
        kind: MediaKind,
    ) -> Result<MediaItem, PipelineError> {
        let ingested = self.ingestor.ingest(&media_ref, kind).await?;

        let description = self
            .aggregator
            .describe(&ingested.buffers(), self.prompt_for(kind))
            .await
            .map_err(|err| err.with_kind(kind))?;

        Ok(MediaItem::new(
            media_ref,
            ingested.preview_ref,
            description,
            kind,
        )?)
    }
}
