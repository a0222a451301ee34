use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ModelError;

/// Media kind enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// Classify a file by its extension against the allowed image and video
    /// extension lists (lowercase, without the dot).
    pub fn from_path(
        path: &Path,
        image_extensions: &[String],
        video_extensions: &[String],
    ) -> Result<Self, ModelError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| {
                ModelError::UnsupportedMedia(format!("'{}' has no extension", path.display()))
            })?;

        if image_extensions.contains(&extension) {
            Ok(MediaKind::Image)
        } else if video_extensions.contains(&extension) {
            Ok(MediaKind::Video)
        } else {
            Err(ModelError::UnsupportedMedia(format!(
                "extension '{}'",
                extension
            )))
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            other => Err(ModelError::UnsupportedMedia(format!("kind '{}'", other))),
        }
    }
}

/// Opaque handle to the original media file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef(PathBuf);

impl MediaRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for MediaRef {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

/// Displayable still for a gallery entry.
///
/// Images preview as themselves; videos carry a still generated at 0 ms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewRef {
    Source(MediaRef),
    Thumbnail(Bytes),
}

impl PreviewRef {
    pub fn is_thumbnail(&self) -> bool {
        matches!(self, PreviewRef::Thumbnail(_))
    }
}

/// A described piece of media held in a gallery slot.
///
/// Immutable once built; slots are replaced wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    id: Uuid,
    source_ref: MediaRef,
    preview_ref: PreviewRef,
    description: String,
    kind: MediaKind,
    described_at: DateTime<Utc>,
}

impl MediaItem {
    /// Build an item, rejecting previews that don't fit the kind: an image
    /// must preview as its own source, a video as a non-empty thumbnail.
    pub fn new(
        source_ref: MediaRef,
        preview_ref: PreviewRef,
        description: String,
        kind: MediaKind,
    ) -> Result<Self, ModelError> {
        let consistent = match (&kind, &preview_ref) {
            (MediaKind::Image, PreviewRef::Source(preview)) => preview == &source_ref,
            (MediaKind::Video, PreviewRef::Thumbnail(still)) => !still.is_empty(),
            _ => false,
        };
        if !consistent {
            return Err(ModelError::InvalidPreview { kind });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            source_ref,
            preview_ref,
            description,
            kind,
            described_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source_ref(&self) -> &MediaRef {
        &self.source_ref
    }

    pub fn preview_ref(&self) -> &PreviewRef {
        &self.preview_ref
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn described_at(&self) -> DateTime<Utc> {
        self.described_at
    }
}
