use image::RgbaImage;
use std::collections::VecDeque;

use crate::error::{EditorError, Result};
use crate::{log_info, log_warn};

/// Default number of snapshots kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

// ============================================================================
// EDIT HISTORY - bounded linear undo over full-image snapshots
// ============================================================================

/// Linear, bounded undo history.
///
/// The last snapshot is always the image currently shown in the editor; the
/// stack never drops below one entry once an image has been loaded. There is
/// no redo: undo throws the top snapshot away.
#[derive(Clone, Debug)]
pub struct EditHistory {
    snapshots: VecDeque<RgbaImage>,
    capacity: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl EditHistory {
    /// A history that keeps at most `capacity` snapshots (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a copy of `image`, dropping the oldest snapshot past capacity.
    pub fn record(&mut self, image: &RgbaImage) {
        self.snapshots.push_back(image.clone());
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        log_info!(
            "History: recorded {}x{} snapshot ({} / {}, {} KB held)",
            image.width(),
            image.height(),
            self.snapshots.len(),
            self.capacity,
            self.memory_size() / 1024
        );
    }

    /// Drop the top snapshot and return the one beneath it, which becomes
    /// the current image.
    pub fn undo(&mut self) -> Result<&RgbaImage> {
        if self.snapshots.len() < 2 {
            log_warn!("History: nothing to undo ({} snapshot(s))", self.snapshots.len());
            return Err(EditorError::NothingToUndo);
        }
        self.snapshots.pop_back();
        self.snapshots.back().ok_or(EditorError::NothingToUndo)
    }

    /// Forget everything and start over from `image` as the sole entry.
    pub fn reset(&mut self, image: &RgbaImage) {
        self.snapshots.clear();
        self.record(image);
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn current(&self) -> Option<&RgbaImage> {
        self.snapshots.back()
    }

    pub fn can_undo(&self) -> bool {
        self.snapshots.len() >= 2
    }

    /// Number of undo steps currently available.
    pub fn undo_depth(&self) -> usize {
        self.snapshots.len().saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes of pixel data held across all snapshots.
    pub fn memory_size(&self) -> usize {
        self.snapshots.iter().map(|s| s.as_raw().len()).sum()
    }
}
