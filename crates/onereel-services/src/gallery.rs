//! Six-slot gallery with whole-slot replacement and one writer per slot.
//!
//! Pipelines write through a [`SlotLease`]: `reserve` hands out the newest
//! generation for a slot and `commit` only lands if that generation is still
//! current. A later pick, `set` or `clear` on the same slot supersedes every
//! older lease.

use std::sync::Arc;
use tokio::sync::RwLock;

use onereel_core::constants::GALLERY_SLOTS;
use onereel_core::{MediaItem, ModelError};

/// Right to write one slot, valid until a newer write to that slot starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLease {
    index: usize,
    generation: u64,
}

impl SlotLease {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub enum CommitOutcome {
    Stored(Arc<MediaItem>),
    /// A newer write to the slot started after this lease was taken.
    Superseded,
}

/// Point-in-time copy of all slots.
#[derive(Debug, Clone, Default)]
pub struct GallerySnapshot {
    slots: [Option<Arc<MediaItem>>; GALLERY_SLOTS],
}

impl GallerySnapshot {
    pub fn get(&self, index: usize) -> Option<&Arc<MediaItem>> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    /// Filled slots as `(index, item)`, in slot order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &Arc<MediaItem>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|item| (index, item)))
    }

    pub fn slots(&self) -> &[Option<Arc<MediaItem>>; GALLERY_SLOTS] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

#[derive(Debug, Default)]
struct GalleryState {
    slots: [Option<Arc<MediaItem>>; GALLERY_SLOTS],
    generations: [u64; GALLERY_SLOTS],
}

/// Shared gallery handle. Clones refer to the same slots.
#[derive(Debug, Clone, Default)]
pub struct GalleryStore {
    state: Arc<RwLock<GalleryState>>,
}

fn check_index(index: usize) -> Result<(), ModelError> {
    if index >= GALLERY_SLOTS {
        return Err(ModelError::SlotOutOfRange {
            index,
            slots: GALLERY_SLOTS,
        });
    }
    Ok(())
}

impl GalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, index: usize) -> Result<Option<Arc<MediaItem>>, ModelError> {
        check_index(index)?;
        let state = self.state.read().await;
        Ok(state.slots[index].clone())
    }

    /// Replace a slot outright, superseding any pipeline still writing it.
    pub async fn set(&self, index: usize, item: Arc<MediaItem>) -> Result<(), ModelError> {
        check_index(index)?;
        let mut state = self.state.write().await;
        state.generations[index] += 1;
        state.slots[index] = Some(item);
        Ok(())
    }

    /// Empty a slot, superseding any pipeline still writing it.
    pub async fn clear(&self, index: usize) -> Result<(), ModelError> {
        check_index(index)?;
        let mut state = self.state.write().await;
        state.generations[index] += 1;
        state.slots[index] = None;
        Ok(())
    }

    pub async fn snapshot(&self) -> GallerySnapshot {
        let state = self.state.read().await;
        GallerySnapshot {
            slots: state.slots.clone(),
        }
    }

    /// Start a write to `index`. Any earlier lease on the slot becomes stale.
    pub async fn reserve(&self, index: usize) -> Result<SlotLease, ModelError> {
        check_index(index)?;
        let mut state = self.state.write().await;
        state.generations[index] += 1;
        Ok(SlotLease {
            index,
            generation: state.generations[index],
        })
    }

    /// Store `item` if `lease` is still the newest writer for its slot.
    pub async fn commit(&self, lease: SlotLease, item: MediaItem) -> CommitOutcome {
        let mut state = self.state.write().await;
        if state.generations[lease.index] != lease.generation {
            tracing::debug!(
                slot = lease.index,
                lease_generation = lease.generation,
                current_generation = state.generations[lease.index],
                "Discarding result from superseded pick"
            );
            return CommitOutcome::Superseded;
        }

        let item = Arc::new(item);
        state.slots[lease.index] = Some(item.clone());
        CommitOutcome::Stored(item)
    }
}
