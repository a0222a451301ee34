//! Domain models

pub mod frame;
pub mod media;

pub use frame::{DescriptionRequest, FrameSample};
pub use media::{MediaItem, MediaKind, MediaRef, PreviewRef};
