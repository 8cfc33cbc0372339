//! Linear undo history of image snapshots.

use std::sync::Arc;

use crate::decode::PixelBuffer;

/// Last-in-first-out stack of pre-edit snapshots.
///
/// Snapshots are shared, immutable buffers, so pushing the image that is
/// about to be replaced costs one reference count. Depth is unbounded.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    snapshots: Vec<Arc<PixelBuffer>>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot. Buffers without pixels are ignored.
    ///
    /// Returns whether the snapshot was recorded.
    pub fn push(&mut self, snapshot: Arc<PixelBuffer>) -> bool {
        if snapshot.is_empty() {
            return false;
        }
        self.snapshots.push(snapshot);
        true
    }

    /// Remove and return the most recent snapshot, or `None` when empty.
    pub fn pop(&mut self) -> Option<Arc<PixelBuffer>> {
        self.snapshots.pop()
    }

    pub fn peek(&self) -> Option<&Arc<PixelBuffer>> {
        self.snapshots.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
