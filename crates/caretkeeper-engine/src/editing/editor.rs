//! # Editor Session
//!
//! [`Editor`] wires the caret store, navigation, manual insertion,
//! composition correction, click normalization and history to one
//! [`EditingSurface`]. The host forwards its signals to the matching
//! method and obeys the returned [`Disposition`].
//!
//! ## Sequencing
//!
//! Every handler runs to completion before the next signal. Work that must
//! wait until the tree has settled is queued and runs on [`Editor::tick`].
//! Content notifications are queued as [`EditorEvent`]s; the host drains
//! them, re-applies the content, then calls [`Editor::caret_settled`] (or
//! uses [`Editor::set_content`], which does both).

use std::collections::VecDeque;

use crate::dom::Tree;
use crate::events::{InputEvent, KeyEvent};
use crate::options::{EditorOptions, Limits};
use crate::surface::EditingSurface;

use super::caret::CaretStore;
use super::composition::correct_composition;
use super::error::EditError;
use super::history::{ActionKind, History, HistoryEntry, is_undo_request};
use super::insertion::{perform_insertion, plan_insertion};
use super::navigation::{ArrowDirection, NavigationState};
use super::selection::{BoundaryPoint, CursorSpan};
use super::snap::{snap_after_break, snap_out_of_format_end};

/// Whether the host should still run its native action for a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Default,
    Prevented,
}

/// Notifications for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// The user changed the content; carries the serialized content.
    ContentChanged(String),
    /// An undo was applied; carries the entry that was restored.
    Undone(HistoryEntry),
}

impl EditorEvent {
    /// The content the host should now hold.
    pub fn content(&self) -> &str {
        match self {
            EditorEvent::ContentChanged(html) => html,
            EditorEvent::Undone(entry) => &entry.html,
        }
    }
}

type SnapRule = fn(&Tree, &CursorSpan, &Limits) -> Result<BoundaryPoint, EditError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    NotifyContentChanged,
    SnapAfterBreak,
}

pub struct Editor<S: EditingSurface> {
    surface: S,
    options: EditorOptions,
    caret: CaretStore,
    history: History,
    navigation: NavigationState,
    composing: bool,
    seq: u64,
    deferred: VecDeque<Deferred>,
    events: Vec<EditorEvent>,
}

impl<S: EditingSurface> Editor<S> {
    pub fn new(surface: S, options: EditorOptions) -> Self {
        Self {
            caret: CaretStore::new(options.root_marker_attribute.clone(), options.limits),
            history: History::new(options.caret_jump_threshold),
            navigation: NavigationState::default(),
            composing: false,
            seq: 0,
            deferred: VecDeque::new(),
            events: Vec::new(),
            surface,
            options,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn caret_store(&self) -> &CaretStore {
        &self.caret
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    /// Number of key-downs seen so far.
    pub fn key_sequence(&self) -> u64 {
        self.seq
    }

    pub fn has_pending_tasks(&self) -> bool {
        !self.deferred.is_empty()
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    fn save_range(&mut self) {
        if let Err(err) = self.caret.save_range(&self.surface) {
            log::debug!("caret not saved: {err}");
        }
    }

    fn notify_content_changed(&mut self) {
        self.save_range();
        self.history.char_landed(self.caret.snapshot());
        let html = self.surface.serialized_content();
        self.events.push(EditorEvent::ContentChanged(html));
    }

    fn set_caret(&mut self, span: CursorSpan) {
        self.surface.set_selection(Some(span));
    }

    pub fn key_down(&mut self, event: &KeyEvent) -> Disposition {
        self.seq += 1;

        if is_undo_request(event) {
            self.request_undo();
            return Disposition::Prevented;
        }

        let html = self.surface.serialized_content();
        let live = self.caret.capture(&self.surface).ok();
        if let Some(action) =
            self.history
                .observe_key(event, &html, self.caret.snapshot(), live.as_ref())
        {
            log::debug!("history: recorded {action:?} ({} entries)", self.history.len());
        }

        match event.key.as_str() {
            "ArrowLeft" if !self.composing => self.navigate(ArrowDirection::Left),
            "ArrowRight" if !self.composing => self.navigate(ArrowDirection::Right),
            "Enter" if event.shift => {
                self.deferred.push_back(Deferred::SnapAfterBreak);
                Disposition::Default
            }
            _ => Disposition::Default,
        }
    }

    fn navigate(&mut self, pressed: ArrowDirection) -> Disposition {
        let direction = pressed.logical(self.surface.direction());
        let result = self
            .surface
            .current_selection()
            .ok_or(EditError::NoActiveSelection)
            .and_then(|span| {
                self.navigation.plan(
                    self.surface.tree(),
                    span.end,
                    direction,
                    self.seq,
                    &self.options.limits,
                )
            });
        match result {
            Ok(planned) => {
                self.set_caret(CursorSpan::collapsed(planned.target));
                self.save_range();
                Disposition::Prevented
            }
            Err(err) => {
                log::debug!("arrow {direction:?} left to host: {err}");
                Disposition::Default
            }
        }
    }

    /// `beforeinput`: single chars at boundaries are inserted here.
    pub fn before_input(&mut self, event: &InputEvent) -> Disposition {
        if event.is_composing || self.composing {
            return Disposition::Default;
        }
        let result = self
            .surface
            .current_selection()
            .ok_or(EditError::NoActiveSelection)
            .and_then(|span| {
                plan_insertion(
                    self.surface.tree(),
                    &span,
                    &event.data,
                    &self.options.root_marker_attribute,
                    &self.options.limits,
                )
            })
            .and_then(|insertion| perform_insertion(&mut self.surface, &mut self.caret, &insertion));
        match result {
            Ok(span) => {
                log::debug!("inserted {:?} manually, caret at {:?}", event.data, span.end);
                self.deferred.push_back(Deferred::NotifyContentChanged);
                Disposition::Prevented
            }
            Err(err) => {
                log::debug!("insertion of {:?} left to host: {err}", event.data);
                Disposition::Default
            }
        }
    }

    /// `input`: the host changed the content natively.
    pub fn input(&mut self) {
        if self.composing {
            return;
        }
        self.notify_content_changed();
    }

    pub fn composition_start(&mut self) {
        self.composing = true;
        self.save_range();
    }

    /// Ends a composition session, moving the composed `data` back to where
    /// the session started if the host put it elsewhere.
    pub fn composition_end(&mut self, data: &str) {
        if let Err(err) = correct_composition(&mut self.surface, &self.caret, data) {
            log::debug!("composition left in place: {err}");
        }
        self.composing = false;
        self.notify_content_changed();
    }

    /// A pointer click placed the caret.
    pub fn click(&mut self) {
        self.snap(snap_after_break);
        self.snap(snap_out_of_format_end);
        self.save_range();
    }

    fn snap(&mut self, rule: SnapRule) {
        let Some(span) = self.surface.current_selection() else {
            return;
        };
        match rule(self.surface.tree(), &span, &self.options.limits) {
            Ok(point) => self.set_caret(CursorSpan::collapsed(point)),
            Err(err) => log::debug!("caret not snapped: {err}"),
        }
    }

    /// A paste is about to happen; the next restore collapses to its start.
    pub fn paste(&mut self) {
        self.caret.mark_paste();
    }

    /// Runs the work queued until the tree settled.
    pub fn tick(&mut self) {
        while let Some(task) = self.deferred.pop_front() {
            match task {
                Deferred::NotifyContentChanged => self.notify_content_changed(),
                Deferred::SnapAfterBreak => {
                    self.snap(snap_after_break);
                    self.save_range();
                }
            }
        }
    }

    /// Restores the caret after the host rebuilt the tree.
    pub fn caret_settled(&mut self) -> Option<CursorSpan> {
        match self.caret.restore_caret_position(&mut self.surface) {
            Ok(span) => Some(span),
            Err(err) => {
                log::debug!("caret not restored: {err}");
                None
            }
        }
    }

    /// Re-applies `markup` to the surface and restores the caret onto the
    /// rebuilt tree.
    pub fn set_content(&mut self, markup: &str) -> Result<Option<CursorSpan>, EditError> {
        self.surface.apply_serialized_content(markup)?;
        Ok(self.caret_settled())
    }

    /// Pops the latest history entry and applies its content and caret.
    pub fn request_undo(&mut self) -> Option<HistoryEntry> {
        let entry = self.history.undo()?;
        if let Err(err) = self.surface.apply_serialized_content(&entry.html) {
            log::warn!("undo entry could not be applied: {err}");
            return None;
        }
        if let Some(caret) = entry.caret_position.clone() {
            self.caret.set_snapshot(Some(caret));
            self.caret_settled();
        }
        log::debug!("undid {:?}, {} entries left", entry.action, self.history.len());
        self.events.push(EditorEvent::Undone(entry.clone()));
        Some(entry)
    }

    /// Records the current state as if `action` were about to happen.
    pub fn checkpoint(&mut self, action: ActionKind) -> bool {
        let html = self.surface.serialized_content();
        self.history.record(action, &html, self.caret.snapshot())
    }
}
