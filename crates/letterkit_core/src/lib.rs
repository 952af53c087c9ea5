//! # LetterKit Core
//!
//! Editing core for LetterKit's bilingual (Arabic/English) letter composer.
//!
//! This crate provides:
//! - Letter snapshots (immutable point-in-time letter state)
//! - A bounded linear undo/redo history of snapshots
//! - The edit-sync state machine (idle → editing → idle, idle → syncing → idle)
//! - An editable-surface abstraction with an in-memory implementation
//! - Saved-letter persistence
//!
//! ## Architecture
//!
//! ```text
//! user types ─▶ EditSyncEngine ─(committed text)─▶ caller ─▶ HistoryBuffer::push
//!                    ▲                                           │
//!                    └──── apply_external_update ◀── undo/redo ──┘
//! ```
//!
//! Both structures are owned by a single editing session and are not
//! shared between threads.
//!
//! ## Key Invariants
//!
//! - An external update never interrupts an in-flight user edit
//! - Programmatic replacement preserves the caret's character offset
//! - History length never exceeds its capacity; pushes after an undo drop
//!   the redo branch

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod config;
mod edit_sync;
mod error;
mod history;
mod snapshot;
mod store;
mod surface;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EditSyncConfig, HistoryConfig, DEFAULT_HISTORY_CAPACITY, DEFAULT_SETTLE_WINDOW};
pub use edit_sync::{plain_text, ChangeCallback, EditMode, EditSyncEngine};
pub use error::{CoreError, CoreResult, SurfaceError};
pub use history::HistoryBuffer;
pub use snapshot::{Language, LetterSnapshot, SnapshotSource, TextDirection};
pub use store::{LetterStore, SavedLetter, STORE_VERSION};
pub use surface::{byte_index, char_len, EditableSurface, MemorySurface};
