use anyhow::Result;
use caretkeeper_engine::dom::{NodeData, is_void_tag};
use caretkeeper_engine::editing::BoundaryPoint;
use caretkeeper_engine::playback::Playback;
use caretkeeper_engine::{EditingSurface, KeyEvent, NodeId, Tree};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use std::io::Stdout;

const CARET_MARK: char = '│';

/// What a terminal key press means to the playground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Press(KeyEvent),
    Undo,
    Quit,
}

pub fn action_for(key: &event::KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let action = match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('q') if ctrl => Action::Quit,
        KeyCode::Char('z') if ctrl => Action::Undo,
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(c) => Action::Press(KeyEvent::for_char(c)),
        KeyCode::Left => Action::Press(KeyEvent::named("ArrowLeft")),
        KeyCode::Right => Action::Press(KeyEvent::named("ArrowRight")),
        KeyCode::Backspace => Action::Press(KeyEvent::named("Backspace")),
        KeyCode::Enter if shift => Action::Press(KeyEvent::named("Enter").with_shift()),
        KeyCode::Enter => Action::Press(KeyEvent::named("Enter")),
        _ => return None,
    };
    Some(action)
}

/// Serializes the children of `node` with the caret drawn in place.
pub fn render_with_caret(tree: &Tree, node: NodeId, caret: Option<BoundaryPoint>) -> String {
    let mut out = String::new();
    write_children(tree, node, caret, &mut out);
    out
}

fn write_children(tree: &Tree, node: NodeId, caret: Option<BoundaryPoint>, out: &mut String) {
    let children = tree.children(node);
    for (index, &child) in children.iter().enumerate() {
        if caret == Some(BoundaryPoint::new(node, index)) {
            out.push(CARET_MARK);
        }
        write_node(tree, child, caret, out);
    }
    if caret == Some(BoundaryPoint::new(node, children.len())) {
        out.push(CARET_MARK);
    }
}

fn write_node(tree: &Tree, node: NodeId, caret: Option<BoundaryPoint>, out: &mut String) {
    match tree.data(node) {
        Some(NodeData::Text(text)) => match caret {
            Some(point) if point.node == node => {
                let mut chars = text.chars();
                out.extend(chars.by_ref().take(point.offset));
                out.push(CARET_MARK);
                out.extend(chars);
            }
            _ => out.push_str(text),
        },
        Some(NodeData::Element(element)) => {
            out.push('<');
            out.push_str(&element.tag);
            out.push('>');
            if is_void_tag(&element.tag) {
                return;
            }
            write_children(tree, node, caret, out);
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
        None => {}
    }
}

pub struct App {
    playback: Playback,
    log: Vec<String>,
}

impl App {
    pub fn new(mut playback: Playback) -> Self {
        if playback.surface().current_selection().is_none() {
            let end = playback.surface().tree().children(playback.surface().root()).len();
            if let Err(err) = playback.click(&[], end) {
                log::warn!("could not place initial caret: {err}");
            }
        }
        Self {
            playback,
            log: Vec::new(),
        }
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// Applies one action; false once the user asked to quit.
    pub fn apply(&mut self, action: Action) -> bool {
        let events = match action {
            Action::Quit => return false,
            Action::Undo => self.playback.undo(),
            Action::Press(key) => self.playback.press(&key),
        };
        for event in events {
            self.log.push(format!("{event:?}"));
        }
        true
    }

    pub fn caret_view(&self) -> String {
        let surface = self.playback.surface();
        let caret = surface.current_selection().map(|span| span.end);
        render_with_caret(surface.tree(), surface.root(), caret)
    }

    fn snapshot_line(&self) -> String {
        match self.playback.editor().caret_store().snapshot() {
            Some(snapshot) => format!("saved caret: {snapshot}"),
            None => "saved caret: none".to_string(),
        }
    }
}

pub fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && let Some(action) = action_for(&key)
            && !app.apply(action)
        {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    let content = Paragraph::new(app.caret_view())
        .block(Block::default().borders(Borders::ALL).title("Content"))
        .wrap(Wrap { trim: false });
    f.render_widget(content, chunks[0]);

    let editor = app.playback().editor();
    let status = Paragraph::new(vec![
        Line::from(app.snapshot_line()),
        Line::from(format!("history entries: {}", editor.history().len())),
    ])
    .block(Block::default().borders(Borders::ALL).title("Caret"));
    f.render_widget(status, chunks[1]);

    let events: Vec<ListItem> = app
        .log
        .iter()
        .rev()
        .map(|line| ListItem::new(Line::from(Span::raw(line.clone()))))
        .collect();
    let events = List::new(events)
        .block(Block::default().borders(Borders::ALL).title("Events"))
        .style(Style::default().fg(Color::Gray));
    f.render_widget(events, chunks[2]);

    let help = Line::from(vec![
        Span::raw("Esc/Ctrl+Q: Quit | "),
        Span::raw("←/→: Move | "),
        Span::raw("Shift+Enter: Break | "),
        Span::raw("Ctrl+Z: Undo"),
    ]);
    f.render_widget(Paragraph::new(help), chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use caretkeeper_engine::EditorOptions;
    use crossterm::event::KeyEvent as TermKey;
    use pretty_assertions::assert_eq;

    fn app(markup: &str) -> App {
        App::new(Playback::from_markup(markup, EditorOptions::default()).unwrap())
    }

    #[test]
    fn maps_terminal_keys() {
        let key = |code, modifiers| action_for(&TermKey::new(code, modifiers));
        assert_eq!(key(KeyCode::Esc, KeyModifiers::NONE), Some(Action::Quit));
        assert_eq!(
            key(KeyCode::Char('q'), KeyModifiers::CONTROL),
            Some(Action::Quit)
        );
        assert_eq!(
            key(KeyCode::Char('z'), KeyModifiers::CONTROL),
            Some(Action::Undo)
        );
        assert_eq!(key(KeyCode::Char('x'), KeyModifiers::CONTROL), None);
        assert_eq!(
            key(KeyCode::Char('A'), KeyModifiers::SHIFT),
            Some(Action::Press(KeyEvent::for_char('A')))
        );
        assert_eq!(
            key(KeyCode::Enter, KeyModifiers::SHIFT),
            Some(Action::Press(KeyEvent::named("Enter").with_shift()))
        );
        assert_eq!(key(KeyCode::Tab, KeyModifiers::NONE), None);
    }

    #[test]
    fn caret_is_drawn_inside_text_and_between_nodes() {
        let mut a = app("<p>ab<b>c</b></p>");
        assert_eq!(a.caret_view(), "<p>ab<b>c</b></p>│");

        a.playback.click(&[0, 0], 1).unwrap();
        assert_eq!(a.caret_view(), "<p>a│b<b>c</b></p>");

        a.playback.click(&[0], 1).unwrap();
        assert_eq!(a.caret_view(), "<p>ab│<b>c</b></p>");
    }

    #[test]
    fn typing_and_undo_through_the_app() {
        let mut a = app("<p>ab</p>");
        a.playback.click(&[0, 0], 2).unwrap();

        assert!(a.apply(Action::Press(KeyEvent::for_char('c'))));
        assert_eq!(a.caret_view(), "<p>abc│</p>");
        assert_eq!(a.snapshot_line(), "saved caret: 0/0@3");

        assert!(a.apply(Action::Undo));
        assert_eq!(a.playback().content(), "<p>ab</p>");
        assert!(!a.apply(Action::Quit));
    }
}
