//! Configuration for the history buffer and the edit-sync engine.

use std::time::Duration;

/// Default settle window after the last keystroke.
pub const DEFAULT_SETTLE_WINDOW: Duration = Duration::from_millis(1000);

/// Default number of snapshots retained by the history buffer.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Configuration for an [`EditSyncEngine`](crate::EditSyncEngine).
#[derive(Debug, Clone)]
pub struct EditSyncConfig {
    /// Quiet period after the last input before external updates may apply.
    pub settle_window: Duration,
}

impl EditSyncConfig {
    /// Creates a configuration with the default settle window.
    pub fn new() -> Self {
        Self {
            settle_window: DEFAULT_SETTLE_WINDOW,
        }
    }

    /// Sets the settle window.
    pub fn with_settle_window(mut self, window: Duration) -> Self {
        self.settle_window = window;
        self
    }
}

impl Default for EditSyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a [`HistoryBuffer`](crate::HistoryBuffer).
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of snapshots retained. Never less than 1.
    pub capacity: usize,
}

impl HistoryConfig {
    /// Creates a configuration with the given capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }

    /// Sets the capacity (clamped to at least 1).
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
