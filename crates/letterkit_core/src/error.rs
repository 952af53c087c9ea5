//! Error types for LetterKit core.

use std::io;
use thiserror::Error;
use uuid::Uuid;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in LetterKit core operations.
///
/// Only the saved-letter store is fallible. The history buffer and the
/// edit-sync engine never return errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error while reading or writing the store file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store file is not valid JSON or has the wrong shape.
    #[error("invalid store file: {0}")]
    Json(#[from] serde_json::Error),

    /// The store file was written by an incompatible version.
    #[error("unsupported store version: found {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version recorded in the file.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },

    /// No saved letter exists with the given id.
    #[error("letter not found: {id}")]
    LetterNotFound {
        /// The id that was looked up.
        id: Uuid,
    },
}

/// Errors reported by an [`EditableSurface`](crate::EditableSurface).
///
/// These never escape the edit-sync engine; it logs them and degrades
/// caret fidelity instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The caret could not be measured (e.g. focus is outside the surface).
    #[error("caret position unavailable")]
    CaretUnavailable,

    /// The requested caret offset is past the end of the text.
    #[error("caret offset {offset} out of range (len {len})")]
    OffsetOutOfRange {
        /// Requested offset.
        offset: usize,
        /// Text length in characters.
        len: usize,
    },

    /// The underlying widget rejected the operation.
    #[error("surface rejected operation: {0}")]
    Rejected(String),
}
