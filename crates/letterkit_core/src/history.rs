//! Bounded linear undo/redo history of letter snapshots.
//!
//! ## Invariants
//!
//! - `cursor` is `None` only when the buffer is empty, otherwise it indexes
//!   a stored snapshot
//! - after any `push`, the cursor points at the newest snapshot
//! - `push` after an undo discards the redo branch
//! - the length never exceeds the capacity; the oldest snapshots go first

use crate::config::HistoryConfig;
use crate::snapshot::{LetterSnapshot, SnapshotSource};
use std::collections::VecDeque;
use tracing::trace;

/// Linear undo/redo log over [`LetterSnapshot`]s.
///
/// Every `push` is a caller-decided checkpoint; there is no coalescing of
/// rapid edits.
///
/// # Example
///
/// ```rust
/// use letterkit_core::{HistoryBuffer, Language, LetterSnapshot};
///
/// let mut history = HistoryBuffer::new();
/// history.push(LetterSnapshot::new("first", Language::English));
/// history.push(LetterSnapshot::new("second", Language::English));
///
/// assert_eq!(history.undo().map(|s| s.content.as_str()), Some("first"));
/// assert!(history.undo().is_none());
/// assert_eq!(history.redo().map(|s| s.content.as_str()), Some("second"));
/// ```
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<LetterSnapshot>,
    cursor: Option<usize>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Creates an empty buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// Creates an empty buffer from a configuration.
    pub fn with_config(config: HistoryConfig) -> Self {
        let capacity = config.capacity.max(1);
        // The deque grows on demand; a huge bound must not allocate up front.
        Self {
            entries: VecDeque::new(),
            cursor: None,
            capacity,
        }
    }

    /// Creates an empty buffer holding at most `capacity` snapshots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(HistoryConfig::new(capacity))
    }

    /// Records a new checkpoint.
    ///
    /// Snapshots after the cursor are discarded, `snapshot` is appended and
    /// the oldest entries are evicted until the buffer fits its capacity.
    pub fn push(&mut self, snapshot: LetterSnapshot) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        if keep < self.entries.len() {
            trace!(
                discarded = self.entries.len() - keep,
                "dropping redo branch"
            );
            self.entries.truncate(keep);
        }

        self.entries.push_back(snapshot);

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            trace!(capacity = self.capacity, "evicted oldest snapshot");
        }

        self.cursor = Some(self.entries.len() - 1);
    }

    /// Captures a snapshot from `source` and pushes it.
    ///
    /// Returns false without touching the buffer if the captured snapshot is
    /// identical to the current one.
    pub fn checkpoint<S: SnapshotSource + ?Sized>(&mut self, source: &S) -> bool {
        let snapshot = source.snapshot();
        if self.current() == Some(&snapshot) {
            return false;
        }
        self.push(snapshot);
        true
    }

    /// Steps back one snapshot.
    ///
    /// Returns `None` (and leaves the cursor alone) at the oldest entry or
    /// when empty.
    pub fn undo(&mut self) -> Option<&LetterSnapshot> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                self.entries.get(c - 1)
            }
            _ => None,
        }
    }

    /// Steps forward one snapshot.
    ///
    /// Returns `None` (and leaves the cursor alone) at the newest entry or
    /// when empty.
    pub fn redo(&mut self) -> Option<&LetterSnapshot> {
        match self.cursor {
            Some(c) if c + 1 < self.entries.len() => {
                self.cursor = Some(c + 1);
                self.entries.get(c + 1)
            }
            _ => None,
        }
    }

    /// Clears all snapshots.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    /// Returns true if [`undo`](Self::undo) would move the cursor.
    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    /// Returns true if [`redo`](Self::redo) would move the cursor.
    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.entries.len())
    }

    /// Returns the snapshot at the cursor.
    pub fn current(&self) -> Option<&LetterSnapshot> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// Returns the cursor index, or `None` when empty.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no snapshots are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of stored snapshots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates over stored snapshots, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LetterSnapshot> {
        self.entries.iter()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
