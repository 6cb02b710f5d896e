//! # Playback Host
//!
//! [`Playback`] plays the part of a browser hosting a controlled editable
//! root: it dispatches each user action as the signals a browser would
//! send, runs the native action when the engine does not prevent it, and
//! re-renders by re-applying the emitted content and restoring the caret.
//! The terminal playground and the integration tests drive the engine
//! through it.

use crate::dom::markup::MarkupError;
use crate::editing::{BoundaryPoint, Disposition, EditError, Editor, EditorEvent};
use crate::events::{InputEvent, KeyEvent};
use crate::options::EditorOptions;
use crate::surface::{EditingSurface, MemorySurface};

pub struct Playback {
    editor: Editor<MemorySurface>,
    rerender: bool,
}

impl Playback {
    pub fn new(editor: Editor<MemorySurface>) -> Self {
        Self {
            editor,
            rerender: true,
        }
    }

    pub fn from_markup(markup: &str, options: EditorOptions) -> Result<Self, MarkupError> {
        let surface = MemorySurface::from_markup(&options.root_marker_attribute, markup)?;
        Ok(Self::new(Editor::new(surface, options)))
    }

    /// Whether emitted content is re-applied (the default). Without it the
    /// live tree is never rebuilt.
    pub fn with_rerender(mut self, rerender: bool) -> Self {
        self.rerender = rerender;
        self
    }

    pub fn editor(&self) -> &Editor<MemorySurface> {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor<MemorySurface> {
        &mut self.editor
    }

    pub fn surface(&self) -> &MemorySurface {
        self.editor.surface()
    }

    pub fn content(&self) -> String {
        self.editor.surface().serialized_content()
    }

    /// Places the caret by child indexes from the root.
    pub fn place_caret(&mut self, path: &[usize], offset: usize) -> Result<(), EditError> {
        let surface = self.editor.surface_mut();
        let node = surface.node_at(path).ok_or(EditError::StalePath)?;
        if !BoundaryPoint::new(node, offset).is_valid(surface.tree()) {
            return Err(EditError::StalePath);
        }
        surface.place_caret(node, offset);
        Ok(())
    }

    /// A key press: key-down, then whatever the browser would do for the
    /// key if the engine let it, then the deferred work and a re-render.
    pub fn press(&mut self, event: &KeyEvent) -> Vec<EditorEvent> {
        if self.editor.key_down(event) == Disposition::Default {
            self.native_key_action(event);
        }
        self.editor.tick();
        self.settle()
    }

    fn native_key_action(&mut self, event: &KeyEvent) {
        let mut chars = event.key.chars();
        let printable = matches!((chars.next(), chars.next()), (Some(c), None) if !c.is_control());
        if printable && !event.is_chorded() {
            let input = InputEvent::text(event.key.as_str());
            if self.editor.before_input(&input) == Disposition::Default
                && self.editor.surface_mut().native_insert_text(&event.key)
            {
                self.editor.input();
            }
            return;
        }
        let changed = match event.key.as_str() {
            "Backspace" => self.editor.surface_mut().native_delete_backward(),
            "Enter" => self.editor.surface_mut().native_insert_break(),
            "ArrowRight" => {
                self.editor.surface_mut().native_move_caret(true);
                false
            }
            "ArrowLeft" => {
                self.editor.surface_mut().native_move_caret(false);
                false
            }
            _ => false,
        };
        if changed {
            self.editor.input();
        }
    }

    pub fn type_text(&mut self, text: &str) -> Vec<EditorEvent> {
        text.chars()
            .flat_map(|c| self.press(&KeyEvent::for_char(c)))
            .collect()
    }

    /// An IME session that commits `text` at the caret.
    pub fn compose(&mut self, text: &str) -> Vec<EditorEvent> {
        self.editor.composition_start();
        let input = InputEvent::composing(text);
        if self.editor.before_input(&input) == Disposition::Default {
            self.editor.surface_mut().native_insert_text(text);
        }
        self.editor.input();
        self.editor.composition_end(text);
        self.settle()
    }

    /// Ctrl+V with `text` on the clipboard.
    pub fn paste(&mut self, text: &str) -> Vec<EditorEvent> {
        let shortcut = KeyEvent::new("v", "KeyV").with_ctrl();
        if self.editor.key_down(&shortcut) == Disposition::Default {
            self.editor.paste();
            if self.editor.surface_mut().native_insert_text(text) {
                self.editor.input();
            }
        }
        self.settle()
    }

    pub fn click(&mut self, path: &[usize], offset: usize) -> Result<(), EditError> {
        self.place_caret(path, offset)?;
        self.editor.click();
        Ok(())
    }

    pub fn undo(&mut self) -> Vec<EditorEvent> {
        self.press(&KeyEvent::new("z", "KeyZ").with_ctrl())
    }

    pub fn tick(&mut self) -> Vec<EditorEvent> {
        self.editor.tick();
        self.settle()
    }

    /// Drains the editor's events and re-renders from the latest content.
    pub fn settle(&mut self) -> Vec<EditorEvent> {
        let events = self.editor.drain_events();
        if self.rerender
            && let Some(EditorEvent::ContentChanged(html)) = events.last()
            && let Err(err) = self.editor.set_content(html)
        {
            log::warn!("re-render failed: {err}");
        }
        events
    }
}
