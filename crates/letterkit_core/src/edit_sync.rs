//! Edit synchronization state machine.
//!
//! Two writers touch an editable surface: the person typing, and
//! programmatic replacement (a generation result, undo/redo, loading a
//! saved letter). [`EditSyncEngine`] keeps them from stomping on each
//! other:
//!
//! ```text
//!            on_user_input / on_paste
//!   Idle ─────────────────────────────────▶ Editing
//!    ▲  ▲                                      │
//!    │  └──────── settle window elapsed ───────┘   (pending update applied)
//!    │
//!    └── Syncing ◀── apply_external_update (while Idle)
//! ```
//!
//! External updates that arrive while `Editing` are parked; only the most
//! recent one is kept and it is applied once the settle window passes with
//! no further input. User input always takes precedence: it switches to
//! `Editing` from any mode.
//!
//! The engine is single-threaded and event-driven. The host calls
//! [`EditSyncEngine::poll`] from a timer (see
//! [`EditSyncEngine::next_deadline`]); every public operation also checks
//! the settle window first.

use crate::clock::{Clock, SystemClock};
use crate::config::EditSyncConfig;
use crate::surface::{char_len, EditableSurface};
use std::fmt;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Current mode of an [`EditSyncEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// External updates may overwrite the surface.
    Idle,
    /// A user edit is in flight; external updates are deferred.
    Editing,
    /// An external update is being applied.
    Syncing,
}

/// Callback receiving the full committed text after user-driven changes.
pub type ChangeCallback = Box<dyn FnMut(&str)>;

/// Reconciles an editable surface with an externally supplied text value.
///
/// None of the public operations return errors. Surface failures are
/// logged and degrade caret placement to the end of the text.
///
/// # Example
///
/// ```rust
/// use letterkit_core::{EditSyncEngine, EditableSurface, MemorySurface};
///
/// let mut engine = EditSyncEngine::new(MemorySurface::new(), |_text: &str| {});
/// engine.initialize("");
/// engine.apply_external_update("Hello world");
///
/// assert_eq!(engine.surface().text(), "Hello world");
/// assert_eq!(engine.surface().caret_offset().unwrap(), 0);
/// ```
pub struct EditSyncEngine<S: EditableSurface, C: Clock = SystemClock> {
    config: EditSyncConfig,
    surface: S,
    clock: C,
    mode: EditMode,
    initialized: bool,
    committed: String,
    pending: Option<String>,
    last_input: Option<Instant>,
    on_change: ChangeCallback,
}

impl<S: EditableSurface> EditSyncEngine<S, SystemClock> {
    /// Creates an engine with the default configuration and system clock.
    pub fn new(surface: S, on_change: impl FnMut(&str) + 'static) -> Self {
        Self::with_config(EditSyncConfig::default(), surface, SystemClock, on_change)
    }
}

impl<S: EditableSurface, C: Clock> EditSyncEngine<S, C> {
    /// Creates an engine with an explicit configuration and clock.
    pub fn with_config(
        config: EditSyncConfig,
        surface: S,
        clock: C,
        on_change: impl FnMut(&str) + 'static,
    ) -> Self {
        Self {
            config,
            surface,
            clock,
            mode: EditMode::Idle,
            initialized: false,
            committed: String::new(),
            pending: None,
            last_input: None,
            on_change: Box::new(on_change),
        }
    }

    /// One-time setup: shows `initial_text` and enters `Idle`.
    ///
    /// Later calls are ignored.
    pub fn initialize(&mut self, initial_text: &str) {
        if self.initialized {
            trace!("initialize called again; ignoring");
            return;
        }
        self.initialized = true;

        if let Err(e) = self.surface.set_text(initial_text) {
            warn!(error = %e, "could not set initial surface text");
        }
        self.committed = initial_text.to_owned();
        self.pending = None;
        self.last_input = None;
        self.mode = EditMode::Idle;
    }

    /// Applies a change to the source of truth that did not come from typing.
    ///
    /// - no-op if `new_text` equals the committed or the displayed text
    /// - deferred while the user is editing (last deferred value wins)
    /// - otherwise replaces the text and restores the caret to the same
    ///   character offset, clamped to the new length
    pub fn apply_external_update(&mut self, new_text: &str) {
        self.settle();

        if self.mode == EditMode::Syncing {
            trace!("external update while syncing; ignoring");
            return;
        }

        if new_text == self.committed || new_text == self.surface.text() {
            self.pending = None;
            return;
        }

        if self.mode == EditMode::Editing {
            debug!(
                len = new_text.len(),
                "user is editing; deferring external update"
            );
            self.pending = Some(new_text.to_owned());
            return;
        }

        self.sync_surface(new_text);
    }

    /// Handles a keystroke or composition event from the surface.
    ///
    /// Enters `Editing` before anything else, commits the surface's text,
    /// forwards it to the change callback and restarts the settle window.
    pub fn on_user_input(&mut self) {
        self.begin_edit();
        self.commit_from_surface();
    }

    /// Handles a paste, inserting `raw_text` as plain text at the caret.
    ///
    /// Formatting is discarded, line endings become `\n` and control
    /// characters other than tab and newline are dropped. The resulting
    /// full text is forwarded immediately.
    pub fn on_paste(&mut self, raw_text: &str) {
        self.begin_edit();

        let plain = plain_text(raw_text);
        if !plain.is_empty() {
            if let Err(e) = self.surface.insert_at_caret(&plain) {
                warn!(error = %e, "paste insertion failed");
                self.place_caret_at_end();
            }
        }

        self.commit_from_surface();
    }

    /// Settles the engine if the settle window has passed.
    ///
    /// Returns true if a deferred external update was applied. Hosts call
    /// this from a timer scheduled for [`next_deadline`](Self::next_deadline).
    pub fn poll(&mut self) -> bool {
        self.settle()
    }

    /// When the current edit settles, if one is in flight.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.mode {
            EditMode::Editing => self.last_input.map(|at| at + self.config.settle_window),
            _ => None,
        }
    }

    /// Current mode, accounting for an elapsed settle window.
    pub fn mode(&self) -> EditMode {
        if self.mode == EditMode::Editing && self.window_elapsed() {
            EditMode::Idle
        } else {
            self.mode
        }
    }

    /// The last committed text.
    pub fn committed_text(&self) -> &str {
        &self.committed
    }

    /// The deferred external update, if any.
    pub fn pending_update(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Returns true once [`initialize`](Self::initialize) has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The engine configuration.
    pub fn config(&self) -> &EditSyncConfig {
        &self.config
    }

    /// The wrapped surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the wrapped surface, for the host to forward
    /// native edits before calling [`on_user_input`](Self::on_user_input).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn begin_edit(&mut self) {
        if self.mode == EditMode::Syncing {
            debug!("input during sync; input takes precedence");
        }
        self.mode = EditMode::Editing;
        self.last_input = Some(self.clock.now());
    }

    fn commit_from_surface(&mut self) {
        self.committed = self.surface.text();
        (self.on_change)(&self.committed);
    }

    fn window_elapsed(&self) -> bool {
        match self.last_input {
            Some(at) => self.clock.now().saturating_duration_since(at) >= self.config.settle_window,
            None => true,
        }
    }

    fn settle(&mut self) -> bool {
        if self.mode != EditMode::Editing || !self.window_elapsed() {
            return false;
        }

        trace!("edit settled");
        self.mode = EditMode::Idle;
        self.last_input = None;

        match self.pending.take() {
            Some(text) if text != self.committed && text != self.surface.text() => {
                debug!(len = text.len(), "applying deferred external update");
                self.sync_surface(&text);
                true
            }
            _ => false,
        }
    }

    fn sync_surface(&mut self, new_text: &str) {
        self.mode = EditMode::Syncing;

        let prior = match self.surface.caret_offset() {
            Ok(offset) => Some(offset),
            Err(e) => {
                trace!(error = %e, "caret measurement failed");
                None
            }
        };

        if let Err(e) = self.surface.set_text(new_text) {
            warn!(error = %e, "surface rejected external update");
            self.mode = EditMode::Idle;
            return;
        }
        self.committed = new_text.to_owned();

        let len = char_len(new_text);
        match prior {
            Some(offset) => {
                if let Err(e) = self.surface.set_caret_offset(offset.min(len)) {
                    trace!(error = %e, "caret restore failed; moving to end");
                    self.place_caret_at_end();
                }
            }
            None => self.place_caret_at_end(),
        }

        self.mode = EditMode::Idle;
    }

    fn place_caret_at_end(&mut self) {
        let len = char_len(&self.surface.text());
        if let Err(e) = self.surface.set_caret_offset(len) {
            warn!(error = %e, "could not place caret at end of text");
        }
    }
}

impl<S: EditableSurface + fmt::Debug, C: Clock> fmt::Debug for EditSyncEngine<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSyncEngine")
            .field("config", &self.config)
            .field("surface", &self.surface)
            .field("mode", &self.mode)
            .field("initialized", &self.initialized)
            .field("committed", &self.committed)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

/// Reduces clipboard text to what a plain-text surface should receive.
pub fn plain_text(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .filter(|c| *c == '\n' || *c == '\t' || !c.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::SurfaceError;
    use crate::surface::MemorySurface;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    type Engine = EditSyncEngine<MemorySurface, ManualClock>;

    fn engine_with(text: &str) -> (Engine, ManualClock, Rc<RefCell<Vec<String>>>) {
        let clock = ManualClock::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut engine = EditSyncEngine::with_config(
            EditSyncConfig::default(),
            MemorySurface::new(),
            clock.clone(),
            move |text: &str| sink.borrow_mut().push(text.to_owned()),
        );
        engine.initialize(text);
        (engine, clock, seen)
    }

    #[test]
    fn initialize_is_one_shot() {
        let (mut engine, _, _) = engine_with("first");
        assert!(engine.is_initialized());
        assert_eq!(engine.mode(), EditMode::Idle);

        engine.initialize("second");
        assert_eq!(engine.surface().text(), "first");
        assert_eq!(engine.committed_text(), "first");
    }

    #[test]
    fn idle_update_replaces_text_and_keeps_caret() {
        let (mut engine, _, seen) = engine_with("Dear team, thanks");
        engine.surface_mut().move_caret(4);

        engine.apply_external_update("Dear all, thank you");
        assert_eq!(engine.surface().text(), "Dear all, thank you");
        assert_eq!(engine.surface().raw_caret(), 4);
        assert_eq!(engine.committed_text(), "Dear all, thank you");
        assert_eq!(engine.mode(), EditMode::Idle);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn caret_is_clamped_to_new_length() {
        let (mut engine, _, _) = engine_with("a much longer draft");
        engine.surface_mut().move_caret(15);

        engine.apply_external_update("short");
        assert_eq!(engine.surface().raw_caret(), 5);
    }

    #[test]
    fn redundant_updates_do_not_touch_surface() {
        let (mut engine, _, _) = engine_with("same");
        let writes = engine.surface().write_count();

        engine.apply_external_update("same");
        assert_eq!(engine.surface().write_count(), writes);

        engine.surface_mut().type_text("typed ");
        engine.apply_external_update("typed same");
        assert_eq!(engine.surface().write_count(), writes);
    }

    #[test]
    fn input_switches_to_editing_and_forwards_text() {
        let (mut engine, _, seen) = engine_with("");
        engine.surface_mut().type_text("H");
        engine.on_user_input();

        assert_eq!(engine.mode(), EditMode::Editing);
        assert_eq!(engine.committed_text(), "H");
        assert_eq!(seen.borrow().as_slice(), ["H".to_owned()]);
    }

    #[test]
    fn update_while_editing_is_deferred_until_settled() {
        let (mut engine, clock, _) = engine_with("");
        engine.surface_mut().type_text("draft");
        engine.on_user_input();

        engine.apply_external_update("generated");
        assert_eq!(engine.surface().text(), "draft");
        assert_eq!(engine.pending_update(), Some("generated"));

        clock.advance(Duration::from_millis(999));
        assert!(!engine.poll());
        assert_eq!(engine.mode(), EditMode::Editing);
        assert_eq!(engine.surface().text(), "draft");

        clock.advance(Duration::from_millis(1));
        assert_eq!(engine.mode(), EditMode::Idle);
        assert!(engine.poll());
        assert_eq!(engine.surface().text(), "generated");
        assert_eq!(engine.pending_update(), None);
    }

    #[test]
    fn last_deferred_update_wins() {
        let (mut engine, clock, _) = engine_with("");
        engine.surface_mut().type_text("x");
        engine.on_user_input();

        engine.apply_external_update("one");
        engine.apply_external_update("two");
        engine.apply_external_update("three");

        clock.advance(Duration::from_secs(1));
        engine.poll();
        assert_eq!(engine.surface().text(), "three");
    }

    #[test]
    fn further_input_restarts_settle_window() {
        let (mut engine, clock, _) = engine_with("");
        engine.surface_mut().type_text("a");
        engine.on_user_input();
        engine.apply_external_update("external");

        clock.advance(Duration::from_millis(800));
        engine.surface_mut().type_text("b");
        engine.on_user_input();

        clock.advance(Duration::from_millis(800));
        assert!(!engine.poll());
        assert_eq!(engine.surface().text(), "ab");

        clock.advance(Duration::from_millis(200));
        assert!(engine.poll());
        assert_eq!(engine.surface().text(), "external");
    }

    #[test]
    fn next_deadline_tracks_last_input() {
        let (mut engine, clock, _) = engine_with("");
        assert_eq!(engine.next_deadline(), None);

        engine.on_user_input();
        let deadline = engine.next_deadline().unwrap();
        assert_eq!(deadline, clock.now() + Duration::from_millis(1000));
    }

    #[test]
    fn deferred_update_matching_typed_text_is_dropped() {
        let (mut engine, clock, _) = engine_with("");
        engine.surface_mut().type_text("done");
        engine.on_user_input();
        engine.apply_external_update("other");
        engine.apply_external_update("done");
        assert_eq!(engine.pending_update(), None);

        clock.advance(Duration::from_secs(2));
        assert!(!engine.poll());
        assert_eq!(engine.surface().text(), "done");
    }

    #[test]
    fn paste_inserts_plain_text_at_caret() {
        let (mut engine, _, seen) = engine_with("Dear ,");
        engine.surface_mut().move_caret(5);

        engine.on_paste("Ms.\r\nLayla\u{0}");
        assert_eq!(engine.surface().text(), "Dear Ms.\nLayla,");
        assert_eq!(engine.surface().raw_caret(), 14);
        assert_eq!(engine.mode(), EditMode::Editing);
        assert_eq!(seen.borrow().last().map(String::as_str), Some("Dear Ms.\nLayla,"));
    }

    #[test]
    fn caret_measure_failure_falls_back_to_end() {
        let (mut engine, _, _) = engine_with("abc");
        engine.surface_mut().move_caret(1);
        engine.surface_mut().fail_caret_reads(true);

        engine.apply_external_update("abcdef");
        assert_eq!(engine.surface().text(), "abcdef");
        assert_eq!(engine.surface().raw_caret(), 6);
        assert_eq!(engine.mode(), EditMode::Idle);
    }

    #[test]
    fn caret_restore_failure_never_panics() {
        let (mut engine, _, _) = engine_with("abc");
        engine.surface_mut().fail_caret_writes(true);

        engine.apply_external_update("xyz!");
        assert_eq!(engine.surface().text(), "xyz!");
        assert_eq!(engine.committed_text(), "xyz!");
        assert_eq!(engine.mode(), EditMode::Idle);
    }

    #[test]
    fn rejected_write_leaves_committed_text() {
        struct ReadOnly;
        impl EditableSurface for ReadOnly {
            fn text(&self) -> String {
                "fixed".into()
            }
            fn set_text(&mut self, _: &str) -> Result<(), SurfaceError> {
                Err(SurfaceError::Rejected("read-only".into()))
            }
            fn caret_offset(&self) -> Result<usize, SurfaceError> {
                Ok(0)
            }
            fn set_caret_offset(&mut self, _: usize) -> Result<(), SurfaceError> {
                Ok(())
            }
        }

        let mut engine = EditSyncEngine::new(ReadOnly, |_: &str| {});
        engine.apply_external_update("new");
        assert_eq!(engine.committed_text(), "");
        assert_eq!(engine.mode(), EditMode::Idle);
    }

    #[test]
    fn plain_text_normalizes() {
        assert_eq!(plain_text("a\r\nb\rc"), "a\nb\nc");
        assert_eq!(plain_text("tab\there\u{7}"), "tab\there");
        assert_eq!(plain_text("عربي"), "عربي");
    }
}
