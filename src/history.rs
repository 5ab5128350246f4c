use std::collections::VecDeque;

use crate::error::EditorResult;
use crate::raster::{RasterBuffer, Snapshot};

/// Default number of snapshots kept before the oldest are evicted.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded snapshot history of the pixel grid.
///
/// `entries[cursor]` always mirrors the live buffer. Undo and redo move the
/// cursor and copy the snapshot back; a new snapshot drops everything after
/// the cursor before being pushed.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    entries: VecDeque<Snapshot>,
    cursor: usize,
    capacity: usize,
}

impl HistoryManager {
    /// Creates a history seeded with the buffer's current state.
    pub fn new(buffer: &RasterBuffer) -> Self {
        Self::with_capacity(buffer, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(buffer: &RasterBuffer, capacity: usize) -> Self {
        let mut history = Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            cursor: 0,
            capacity: capacity.max(1),
        };
        history.entries.push_back(buffer.snapshot());
        history
    }

    /// Records the buffer as the newest state.
    pub fn snapshot(&mut self, buffer: &RasterBuffer) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(buffer.snapshot());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
        log::debug!("History snapshot {}/{}", self.cursor + 1, self.entries.len());
    }

    /// Steps back one snapshot. Returns `false` when already at the oldest.
    pub fn undo(&mut self, buffer: &mut RasterBuffer) -> EditorResult<bool> {
        if !self.can_undo() {
            return Ok(false);
        }
        buffer.restore(&self.entries[self.cursor - 1])?;
        self.cursor -= 1;
        Ok(true)
    }

    /// Steps forward again after an undo.
    pub fn redo(&mut self, buffer: &mut RasterBuffer) -> EditorResult<bool> {
        if !self.can_redo() {
            return Ok(false);
        }
        buffer.restore(&self.entries[self.cursor + 1])?;
        self.cursor += 1;
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Drops all entries and reseeds with the buffer's current state.
    pub fn reset(&mut self, buffer: &RasterBuffer) {
        self.entries.clear();
        self.entries.push_back(buffer.snapshot());
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of undo steps available
    pub fn undo_depth(&self) -> usize {
        self.cursor
    }

    pub fn redo_depth(&self) -> usize {
        self.entries.len() - self.cursor - 1
    }
}
