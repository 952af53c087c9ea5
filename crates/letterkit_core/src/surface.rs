//! Editable text surface abstraction.
//!
//! The edit-sync engine is agnostic to the UI toolkit. Anything that can
//! report and replace its text and caret (a browser `contentEditable`
//! bridge, a terminal field, a native widget, a test double) implements
//! [`EditableSurface`].
//!
//! All offsets count Unicode scalar values (`char`s) from the start of the
//! text, never bytes and never node references: the engine replaces the
//! whole text and re-derives positions from counts alone.

use crate::error::SurfaceError;

/// A user-editable text surface.
///
/// # Implementors
///
/// - [`MemorySurface`] - in-memory surface for tests and headless hosts
pub trait EditableSurface {
    /// Returns the full displayed text.
    fn text(&self) -> String;

    /// Replaces the displayed text.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget rejects the update.
    fn set_text(&mut self, text: &str) -> Result<(), SurfaceError>;

    /// Measures the caret as a character offset from the start of the text.
    ///
    /// # Errors
    ///
    /// Returns an error if the caret cannot be measured, for example when
    /// focus or selection lies outside the surface.
    fn caret_offset(&self) -> Result<usize, SurfaceError>;

    /// Places the caret at a character offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is out of range or the widget refuses.
    fn set_caret_offset(&mut self, offset: usize) -> Result<(), SurfaceError>;

    /// Inserts plain text at the caret and moves the caret past it.
    ///
    /// The default implementation is built from the other four methods; if
    /// the caret cannot be measured the text is appended at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting text cannot be written.
    fn insert_at_caret(&mut self, inserted: &str) -> Result<(), SurfaceError> {
        let current = self.text();
        let len = char_len(&current);
        let at = self.caret_offset().unwrap_or(len).min(len);

        let split = byte_index(&current, at);
        let mut next = String::with_capacity(current.len() + inserted.len());
        next.push_str(&current[..split]);
        next.push_str(inserted);
        next.push_str(&current[split..]);

        self.set_text(&next)?;
        self.set_caret_offset(at + char_len(inserted))
    }
}

/// Returns the length of `text` in characters.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Converts a character offset into a byte index, clamped to the end.
pub fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(index, _)| index)
}

/// An in-memory surface.
///
/// Supports fault injection so hosts and tests can exercise the engine's
/// fallback paths.
///
/// # Example
///
/// ```rust
/// use letterkit_core::{EditableSurface, MemorySurface};
///
/// let mut surface = MemorySurface::with_text("Hello");
/// surface.set_caret_offset(5).unwrap();
/// surface.insert_at_caret(" world").unwrap();
/// assert_eq!(surface.text(), "Hello world");
/// assert_eq!(surface.caret_offset().unwrap(), 11);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    text: String,
    caret: usize,
    fail_caret_reads: bool,
    fail_caret_writes: bool,
    writes: usize,
}

impl MemorySurface {
    /// Creates an empty surface with the caret at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a surface holding `text` with the caret at 0.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Simulates the user typing `typed` at the caret.
    ///
    /// Does not count as a programmatic write.
    pub fn type_text(&mut self, typed: &str) {
        let at = self.caret.min(char_len(&self.text));
        let split = byte_index(&self.text, at);
        self.text.insert_str(split, typed);
        self.caret = at + char_len(typed);
    }

    /// Simulates the user moving the caret.
    pub fn move_caret(&mut self, offset: usize) {
        self.caret = offset.min(char_len(&self.text));
    }

    /// Makes subsequent caret measurements fail.
    pub fn fail_caret_reads(&mut self, fail: bool) {
        self.fail_caret_reads = fail;
    }

    /// Makes subsequent caret placements fail.
    pub fn fail_caret_writes(&mut self, fail: bool) {
        self.fail_caret_writes = fail;
    }

    /// Returns the caret regardless of injected faults.
    pub fn raw_caret(&self) -> usize {
        self.caret
    }

    /// Number of programmatic `set_text` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl EditableSurface for MemorySurface {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.text = text.to_owned();
        self.caret = self.caret.min(char_len(&self.text));
        self.writes += 1;
        Ok(())
    }

    fn caret_offset(&self) -> Result<usize, SurfaceError> {
        if self.fail_caret_reads {
            return Err(SurfaceError::CaretUnavailable);
        }
        Ok(self.caret)
    }

    fn set_caret_offset(&mut self, offset: usize) -> Result<(), SurfaceError> {
        if self.fail_caret_writes {
            return Err(SurfaceError::Rejected("caret placement disabled".into()));
        }
        let len = char_len(&self.text);
        if offset > len {
            return Err(SurfaceError::OffsetOutOfRange { offset, len });
        }
        self.caret = offset;
        Ok(())
    }
}
