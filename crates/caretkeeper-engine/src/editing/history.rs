//! # Undo History
//!
//! A stack of pre-edit states recorded from key-downs. Consecutive edits
//! of the same kind coalesce into one entry, so a run of typed characters
//! is undone in one step. A caret jump between typed characters starts a
//! new group. There is no redo; undone entries are dropped, and the redo
//! chord (Ctrl/Cmd+Shift+Z) is left to the host.

use serde::{Deserialize, Serialize};

use crate::events::KeyEvent;

use super::caret::CaretSnapshot;

/// Coarse classification of a key-driven edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Backspace,
    Paste,
    Enter,
    Delete,
    /// A letter or digit key.
    Char,
    /// A typed character after the caret was moved by the user.
    CaretPosChangedByUser,
}

/// Classifies a key-down. `None` means the key is not recorded.
pub fn classify_key(event: &KeyEvent) -> Option<ActionKind> {
    if event.is_chorded() {
        return (event.code == "KeyV").then_some(ActionKind::Paste);
    }
    match event.key.as_str() {
        "Backspace" => return Some(ActionKind::Backspace),
        "Paste" => return Some(ActionKind::Paste),
        "Enter" => return Some(ActionKind::Enter),
        "Delete" => return Some(ActionKind::Delete),
        _ => {}
    }
    let code = event.code.as_str();
    let is_char = ["Key", "Digit", "Numpad"]
        .iter()
        .any(|prefix| code.len() > prefix.len() && code.starts_with(prefix));
    is_char.then_some(ActionKind::Char)
}

/// The undo key or Ctrl/Cmd+Z. With Shift held the chord means redo.
pub fn is_undo_request(event: &KeyEvent) -> bool {
    event.key == "Undo" || (event.is_chorded() && !event.shift && event.code == "KeyZ")
}

/// A state to return to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub caret_position: Option<CaretSnapshot>,
    pub html: String,
    pub action: ActionKind,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    last_char_caret: Option<CaretSnapshot>,
    awaiting_landing: bool,
    jump_threshold: usize,
}

impl History {
    pub fn new(jump_threshold: usize) -> Self {
        Self {
            entries: Vec::new(),
            last_char_caret: None,
            awaiting_landing: false,
            jump_threshold,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// A typed char counts as a caret jump when the live caret left the
    /// container the previous typed char landed in, or moved within it by
    /// more than the threshold.
    fn caret_jumped(&self, live: Option<&CaretSnapshot>) -> bool {
        match (&self.last_char_caret, live) {
            (Some(prev), Some(now)) => {
                prev.end_container != now.end_container
                    || prev.end_offset.abs_diff(now.end_offset) > self.jump_threshold
            }
            _ => false,
        }
    }

    /// Observes a key-down before the host applies it.
    ///
    /// `html` and `saved` are the content and caret snapshot to return to;
    /// `live` is the caret at this key-down, used for the jump test.
    /// Returns the action recorded, if a new entry was pushed.
    ///
    /// Until [`History::char_landed`] reports where a typed char ended up,
    /// the next jump test measures from the caret at its key-down.
    pub fn observe_key(
        &mut self,
        event: &KeyEvent,
        html: &str,
        saved: Option<&CaretSnapshot>,
        live: Option<&CaretSnapshot>,
    ) -> Option<ActionKind> {
        let mut action = classify_key(event)?;
        if action == ActionKind::Char {
            if self.caret_jumped(live) {
                action = ActionKind::CaretPosChangedByUser;
            }
            self.last_char_caret = live.cloned();
            self.awaiting_landing = true;
        }
        self.record(action, html, saved)
            .then_some(action)
    }

    /// Pushes an entry unless it coalesces into the last one.
    pub fn record(&mut self, action: ActionKind, html: &str, caret: Option<&CaretSnapshot>) -> bool {
        if let Some(last) = self.entries.last() {
            let continues_group = last.action == action
                || (last.action == ActionKind::CaretPosChangedByUser
                    && action == ActionKind::Char);
            if continues_group || last.html == html {
                log::debug!("history: {action:?} coalesced into {:?}", last.action);
                return false;
            }
        }
        self.entries.push(HistoryEntry {
            caret_position: caret.cloned(),
            html: html.to_string(),
            action,
        });
        true
    }

    /// Reports the caret once the last typed char has been applied and the
    /// content settled. Later reports are ignored until the next char.
    pub fn char_landed(&mut self, landed: Option<&CaretSnapshot>) {
        if std::mem::take(&mut self.awaiting_landing) {
            self.last_char_caret = landed.cloned();
        }
    }

    /// Pops the most recent entry. An empty stack yields `None`.
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        let entry = self.entries.pop();
        if entry.is_some() {
            self.last_char_caret = None;
            self.awaiting_landing = false;
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::NodePath;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn caret(path: &[usize], offset: usize) -> CaretSnapshot {
        CaretSnapshot {
            start_offset: offset,
            end_offset: offset,
            start_container: NodePath::new(path.to_vec()),
            end_container: NodePath::new(path.to_vec()),
        }
    }

    #[rstest]
    #[case(KeyEvent::named("Backspace"), Some(ActionKind::Backspace))]
    #[case(KeyEvent::named("Delete"), Some(ActionKind::Delete))]
    #[case(KeyEvent::named("Enter"), Some(ActionKind::Enter))]
    #[case(KeyEvent::named("Enter").with_shift(), Some(ActionKind::Enter))]
    #[case(KeyEvent::named("Paste"), Some(ActionKind::Paste))]
    #[case(KeyEvent::new("v", "KeyV").with_ctrl(), Some(ActionKind::Paste))]
    #[case(KeyEvent::new("v", "KeyV").with_meta(), Some(ActionKind::Paste))]
    #[case(KeyEvent::for_char('a'), Some(ActionKind::Char))]
    #[case(KeyEvent::for_char('7'), Some(ActionKind::Char))]
    #[case(KeyEvent::new("3", "Numpad3"), Some(ActionKind::Char))]
    #[case(KeyEvent::new("z", "KeyZ").with_ctrl(), None)]
    #[case(KeyEvent::new("b", "KeyB").with_ctrl(), None)]
    #[case(KeyEvent::named("Shift"), None)]
    #[case(KeyEvent::named("ArrowLeft"), None)]
    #[case(KeyEvent::new("Undo", "Undo"), None)]
    fn classifies_keys(#[case] event: KeyEvent, #[case] expected: Option<ActionKind>) {
        assert_eq!(classify_key(&event), expected);
    }

    #[test]
    fn undo_requests() {
        assert!(is_undo_request(&KeyEvent::new("z", "KeyZ").with_ctrl()));
        assert!(is_undo_request(&KeyEvent::named("Undo")));
        assert!(!is_undo_request(&KeyEvent::for_char('z')));
        assert!(is_undo_request(&KeyEvent::new("z", "KeyZ").with_meta()));
    }

    #[rstest]
    #[case::ctrl(KeyEvent::new("Z", "KeyZ").with_ctrl().with_shift())]
    #[case::meta(KeyEvent::new("Z", "KeyZ").with_meta().with_shift())]
    fn redo_chord_is_not_undo(#[case] event: KeyEvent) {
        assert!(!is_undo_request(&event));
        assert_eq!(classify_key(&event), None);
    }

    #[test]
    fn consecutive_chars_coalesce() {
        let mut history = History::new(2);
        let keys = [('a', ""), ('b', "a"), ('c', "ab")];
        for (i, (c, html)) in keys.into_iter().enumerate() {
            let live = caret(&[0], i);
            history.observe_key(&KeyEvent::for_char(c), html, Some(&live), Some(&live));
        }
        assert_eq!(history.len(), 1);
        assert_eq!(history.last().unwrap().action, ActionKind::Char);
        assert_eq!(history.last().unwrap().html, "");

        let recorded =
            history.observe_key(&KeyEvent::named("Backspace"), "abc", None, Some(&caret(&[0], 3)));
        assert_eq!(recorded, Some(ActionKind::Backspace));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn caret_jump_starts_a_new_group() {
        let mut history = History::new(2);
        history.observe_key(&KeyEvent::for_char('a'), "", None, Some(&caret(&[0], 0)));
        let jumped = history.observe_key(
            &KeyEvent::for_char('b'),
            "a",
            None,
            Some(&caret(&[0], 9)),
        );
        assert_eq!(jumped, Some(ActionKind::CaretPosChangedByUser));

        // The char after the jump continues the new group.
        let next = history.observe_key(&KeyEvent::for_char('c'), "ab", None, Some(&caret(&[0], 10)));
        assert_eq!(next, None);
        assert_eq!(history.len(), 2);

        let moved_container =
            history.observe_key(&KeyEvent::named("Enter"), "abc", None, Some(&caret(&[1], 0)));
        assert_eq!(moved_container, Some(ActionKind::Enter));
        let other_container =
            history.observe_key(&KeyEvent::for_char('d'), "abc<br>", None, Some(&caret(&[1], 0)));
        assert_eq!(other_container, Some(ActionKind::CaretPosChangedByUser));
    }

    #[test]
    fn jump_is_measured_from_where_the_char_landed() {
        let mut history = History::new(2);
        // The first char creates a text node and the caret lands inside it.
        let first = caret(&[0], 0);
        history.observe_key(&KeyEvent::for_char('a'), "<p></p>", None, Some(&first));
        history.char_landed(Some(&caret(&[0, 0], 1)));

        let live = caret(&[0, 0], 1);
        let next = history.observe_key(&KeyEvent::for_char('b'), "<p>a</p>", None, Some(&live));
        assert_eq!(next, None);
        history.char_landed(Some(&caret(&[0, 0], 2)));
        assert_eq!(history.len(), 1);

        // Only the first report after a char counts.
        history.char_landed(Some(&caret(&[3], 0)));
        let live = caret(&[0, 0], 2);
        let after = history.observe_key(&KeyEvent::for_char('c'), "<p>ab</p>", None, Some(&live));
        assert_eq!(after, None);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn unchanged_content_is_not_recorded() {
        let mut history = History::new(2);
        assert!(history.record(ActionKind::Enter, "x", None));
        assert!(!history.record(ActionKind::Backspace, "x", None));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn undo_pops_most_recent_then_runs_dry() {
        let mut history = History::new(2);
        history.record(ActionKind::Char, "", None);
        history.record(ActionKind::Backspace, "abc", Some(&caret(&[0], 3)));

        let popped = history.undo().unwrap();
        assert_eq!(popped.action, ActionKind::Backspace);
        assert_eq!(popped.caret_position, Some(caret(&[0], 3)));
        assert_eq!(history.len(), 1);

        assert_eq!(history.undo().unwrap().html, "");
        assert_eq!(history.undo(), None);
        assert!(history.is_empty());
    }
}
