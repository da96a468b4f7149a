//! # Undo/Redo History
//!
//! Snapshot-based history for the document tree.
//!
//! ## Design
//!
//! - Every mutating operation records a structural snapshot of the tree
//!   taken before the mutation
//! - Undo restores the snapshot and pushes the pre-undo state onto redo
//! - Redo mirrors undo
//! - New mutations clear the redo stack
//! - Batches group several mutations into one undo step
//!
//! The id generator lives outside the snapshot, so ids handed out after an
//! undo never collide with ids that existed before it.

use crate::tree::{DocumentTree, TreeSnapshot};
use std::collections::VecDeque;
use tracing::debug;

/// One undo step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Tree state before the step
    pub snapshot: TreeSnapshot,

    /// Optional description of this step
    pub description: Option<String>,
}

impl HistoryEntry {
    pub fn new(snapshot: TreeSnapshot) -> Self {
        Self {
            snapshot,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug)]
pub struct History {
    /// Oldest first; the oldest entry is dropped when the bound is hit
    undo_stack: VecDeque<HistoryEntry>,

    /// Most recent last
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<Batch>,
}

#[derive(Debug, Default)]
struct Batch {
    entry: Option<HistoryEntry>,
    description: Option<String>,
}

impl History {
    /// History with the default bound (50)
    pub fn new() -> Self {
        Self::with_max_levels(50)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record the current tree state as the undo point of the mutation about
    /// to happen
    pub fn snapshot_before_mutation(&mut self, tree: &DocumentTree, description: impl Into<String>) {
        self.record(tree.snapshot(), description);
    }

    /// Record a snapshot taken earlier. Callers that may fail take the
    /// snapshot first and only record it once the mutation succeeded.
    pub fn record(&mut self, snapshot: TreeSnapshot, description: impl Into<String>) {
        let entry = HistoryEntry::new(snapshot).with_description(description);

        if let Some(batch) = &mut self.current_batch {
            // The first snapshot of a batch is the state before the whole batch
            if batch.entry.is_none() {
                batch.entry = Some(entry);
                self.redo_stack.clear();
            }
            return;
        }
        self.push_entry(entry);
    }

    /// Start a batch of mutations (undone/redone together)
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(Batch::default());
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    /// End the current batch and push it as one step
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if let Some(mut entry) = batch.entry {
                if batch.description.is_some() {
                    entry.description = batch.description;
                }
                self.push_entry(entry);
            }
        }
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push_back(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }

        // New action invalidates the future
        self.redo_stack.clear();
    }

    /// Restore the most recent snapshot. Returns false when there is nothing
    /// to undo. An open batch is closed first.
    pub fn undo(&mut self, tree: &mut DocumentTree) -> bool {
        self.end_batch();
        let Some(entry) = self.undo_stack.pop_back() else {
            return false;
        };
        debug!(description = ?entry.description, "Undo");

        let current = HistoryEntry {
            snapshot: tree.snapshot(),
            description: entry.description.clone(),
        };
        tree.restore(entry.snapshot);

        self.redo_stack.push(current);
        if self.max_levels > 0 && self.redo_stack.len() > self.max_levels {
            self.redo_stack.remove(0);
        }
        true
    }

    /// Re-apply the most recently undone step
    pub fn redo(&mut self, tree: &mut DocumentTree) -> bool {
        self.end_batch();
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        debug!(description = ?entry.description, "Redo");

        let current = HistoryEntry {
            snapshot: tree.snapshot(),
            description: entry.description.clone(),
        };
        tree.restore(entry.snapshot);

        // Not push_entry: that would clear the rest of the redo stack
        self.undo_stack.push_back(current);
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Description of the next undo step
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .back()
            .and_then(|entry| entry.description.as_deref())
    }

    /// Description of the next redo step
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
