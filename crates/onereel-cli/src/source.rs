//! Media source backed by a path on the local filesystem.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use onereel_core::{MediaKind, MediaRef, ModelError};
use onereel_processing::MediaValidator;
use onereel_services::{MediaSource, PickedMedia};

/// "Picks" a file the user named on the command line.
///
/// Permission is granted when the file can be opened for reading. The kind
/// comes from the extension unless given explicitly.
#[derive(Debug, Clone)]
pub struct FileMediaSource {
    path: PathBuf,
    kind: MediaKind,
}

impl FileMediaSource {
    pub fn new(
        path: impl Into<PathBuf>,
        validator: &MediaValidator,
        kind: Option<MediaKind>,
    ) -> Result<Self, ModelError> {
        let path = path.into();
        let kind = match kind {
            Some(kind) => kind,
            None => validator.detect_kind(&path)?,
        };
        Ok(Self { path, kind })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}

#[async_trait]
impl MediaSource for FileMediaSource {
    async fn request_permission(&self) -> bool {
        match tokio::fs::File::open(&self.path).await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = %err, "File is not readable");
                false
            }
        }
    }

    async fn pick(&self) -> Option<PickedMedia> {
        Some(PickedMedia {
            media_ref: MediaRef::new(self.path.clone()),
            kind: self.kind,
        })
    }
}
