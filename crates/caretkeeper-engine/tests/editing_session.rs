//! Whole editing sessions played through a host that re-renders from the
//! emitted content after every change.

use caretkeeper_engine::editing::{ActionKind, BoundaryPoint, EditorEvent};
use caretkeeper_engine::playback::Playback;
use caretkeeper_engine::{EditingSurface, EditorOptions, KeyEvent};
use pretty_assertions::assert_eq;

fn session(markup: &str) -> Playback {
    Playback::from_markup(markup, EditorOptions::default()).unwrap()
}

fn caret_of(p: &Playback) -> BoundaryPoint {
    p.surface().current_selection().unwrap().end
}

fn history_actions(p: &Playback) -> Vec<ActionKind> {
    p.editor()
        .history()
        .entries()
        .iter()
        .map(|entry| entry.action)
        .collect()
}

#[test]
fn char_between_formats_gets_its_own_text_node() {
    let mut p = session("<p><b>x</b><i>y</i></p>");
    p.click(&[0], 1).unwrap();

    let events = p.type_text("z");

    assert_eq!(
        events,
        vec![EditorEvent::ContentChanged(
            "<p><b>x</b>z<i>y</i></p>".to_string()
        )]
    );
    assert_eq!(p.content(), "<p><b>x</b>z<i>y</i></p>");
    let created = p.surface().node_at(&[0, 1]).unwrap();
    assert_eq!(caret_of(&p), BoundaryPoint::new(created, 1));
}

#[test]
fn typing_keeps_going_in_the_new_node() {
    let mut p = session("<p><b>x</b><i>y</i></p>");
    p.click(&[0], 1).unwrap();

    p.type_text("zw");

    assert_eq!(p.content(), "<p><b>x</b>zw<i>y</i></p>");
    let created = p.surface().node_at(&[0, 1]).unwrap();
    assert_eq!(caret_of(&p), BoundaryPoint::new(created, 2));
}

#[test]
fn space_between_formats_survives_as_nbsp() {
    let mut p = session("<p><b>x</b><i>y</i></p>");
    p.click(&[0], 1).unwrap();

    p.type_text(" ");

    assert_eq!(p.content(), "<p><b>x</b>&nbsp;<i>y</i></p>");
}

#[test]
fn typed_run_is_one_history_entry_until_backspace() {
    let mut p = session("<p>x</p>");
    p.click(&[0, 0], 1).unwrap();

    p.type_text("abc");
    assert_eq!(p.content(), "<p>xabc</p>");
    assert_eq!(history_actions(&p), vec![ActionKind::Char]);

    p.press(&KeyEvent::named("Backspace"));
    assert_eq!(p.content(), "<p>xab</p>");
    assert_eq!(
        history_actions(&p),
        vec![ActionKind::Char, ActionKind::Backspace]
    );
}

#[test]
fn typed_run_that_creates_a_node_is_one_entry() {
    let mut p = session("<p><b>x</b><i>y</i></p>");
    p.click(&[0], 1).unwrap();

    p.type_text("abc");

    assert_eq!(p.content(), "<p><b>x</b>abc<i>y</i></p>");
    assert_eq!(history_actions(&p), vec![ActionKind::Char]);
}

#[test]
fn typing_into_an_empty_document_is_one_entry() {
    let mut p = session("");
    p.click(&[], 0).unwrap();

    p.type_text("abc");

    assert_eq!(p.content(), "abc");
    assert_eq!(history_actions(&p), vec![ActionKind::Char]);
    let text = p.surface().node_at(&[0]).unwrap();
    assert_eq!(caret_of(&p), BoundaryPoint::new(text, 3));
}

#[test]
fn typing_after_a_break_is_one_entry() {
    let mut p = session("a<br><b>b</b>");
    p.click(&[], 2).unwrap();

    p.type_text("zw");

    assert_eq!(p.content(), "a<br>zw<b>b</b>");
    assert_eq!(history_actions(&p), vec![ActionKind::Char]);
}

#[test]
fn typing_before_a_trailing_break_extends_the_text() {
    let mut p = session("<p>a<br></p>");
    p.click(&[0], 1).unwrap();

    p.type_text("zw");

    assert_eq!(p.content(), "<p>azw</p>");
    let text = p.surface().node_at(&[0, 0]).unwrap();
    assert_eq!(caret_of(&p), BoundaryPoint::new(text, 3));
    assert_eq!(history_actions(&p), vec![ActionKind::Char]);
}

#[test]
fn space_before_a_trailing_break_is_inserted_once() {
    let mut p = session("<p>a<br></p>");
    p.click(&[0], 1).unwrap();

    let events = p.type_text(" ");

    assert_eq!(
        events,
        vec![EditorEvent::ContentChanged("<p>a&nbsp;</p>".to_string())]
    );
    assert_eq!(p.content(), "<p>a&nbsp;</p>");

    p.type_text("b");
    assert_eq!(p.content(), "<p>a&nbsp;b</p>");
}

#[test]
fn redo_chord_does_not_undo() {
    let mut p = session("<p>x</p>");
    p.click(&[0, 0], 1).unwrap();
    p.type_text("a");

    p.press(&KeyEvent::new("Z", "KeyZ").with_ctrl().with_shift());

    assert_eq!(p.content(), "<p>xa</p>");
    assert_eq!(history_actions(&p), vec![ActionKind::Char]);
}

#[test]
fn distant_click_starts_a_new_group() {
    let mut p = session("<p>hello world</p>");
    p.click(&[0, 0], 0).unwrap();
    p.type_text("a");

    p.click(&[0, 0], 10).unwrap();
    p.type_text("bc");

    assert_eq!(
        history_actions(&p),
        vec![ActionKind::Char, ActionKind::CaretPosChangedByUser]
    );
}

#[test]
fn undo_walks_back_through_entries() {
    let mut p = session("<p>x</p>");
    p.click(&[0, 0], 1).unwrap();
    p.type_text("abc");
    p.press(&KeyEvent::named("Backspace"));

    let events = p.undo();
    assert!(matches!(
        events.as_slice(),
        [EditorEvent::Undone(entry)] if entry.action == ActionKind::Backspace
    ));
    assert_eq!(p.content(), "<p>xabc</p>");

    p.undo();
    assert_eq!(p.content(), "<p>x</p>");
    let text = p.surface().node_at(&[0, 0]).unwrap();
    assert_eq!(caret_of(&p), BoundaryPoint::new(text, 1));

    assert!(p.editor().history().is_empty());
    assert!(p.undo().is_empty());
    assert_eq!(p.editor_mut().request_undo(), None);
}

#[test]
fn undo_shortcut_is_never_left_to_the_host() {
    let mut p = session("<p>x</p>");
    let undo = KeyEvent::new("z", "KeyZ").with_ctrl();
    assert_eq!(
        p.editor_mut().key_down(&undo),
        caretkeeper_engine::Disposition::Prevented
    );
    assert_eq!(p.content(), "<p>x</p>");
}
