//! OneReel Services Layer
//!
//! Orchestration on top of ingestion and the description service:
//! concurrent description of stills, the six-slot gallery, search over it,
//! and the pick → ingest → describe → store pipeline that ties them together.

pub mod aggregator;
pub mod error;
pub mod filter;
pub mod gallery;
pub mod pipeline;
pub mod scatter_gather;

pub use aggregator::DescriptionAggregator;
pub use error::PipelineError;
pub use filter::{filter_gallery, matches, SearchQuery};
pub use gallery::{CommitOutcome, GallerySnapshot, GalleryStore, SlotLease};
pub use pipeline::{MediaPipeline, MediaSource, PickOutcome, PickedMedia};
pub use scatter_gather::{scatter_gather, GatherError};

pub use onereel_plugins::{DescriptionError, DescriptionService};
pub use onereel_processing::{IngestError, MediaIngestor};
