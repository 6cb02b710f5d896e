//! # Editing Surface
//!
//! The rendering/editing surface is owned by the host: it holds the live
//! tree and the native selection, serializes content and rebuilds itself
//! from serialized content. The engine only talks to it through
//! [`EditingSurface`], which keeps the core free of ambient global state.
//!
//! [`MemorySurface`] is a complete in-memory surface used by the terminal
//! playground and by tests. Its `native_*` methods play the part of the
//! host's default editing behaviour for input the engine chose not to
//! handle itself.

use crate::dom::markup::{MarkupError, parse_into, serialize_children};
use crate::dom::{Element, NodeId, Tree, byte_index};
use crate::editing::{BoundaryPoint, CursorSpan};

/// Inline text direction of the editable root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Accessors and mutators the engine needs from the host surface.
pub trait EditingSurface {
    fn tree(&self) -> &Tree;

    fn tree_mut(&mut self) -> &mut Tree;

    /// The native selection, if the surface has one.
    fn current_selection(&self) -> Option<CursorSpan>;

    /// Replaces the native selection (`None` clears it).
    fn set_selection(&mut self, span: Option<CursorSpan>);

    /// The editable root's serialized children.
    fn serialized_content(&self) -> String {
        serialize_children(self.tree(), self.tree().root())
    }

    /// Rebuilds the editable root's children from serialized content.
    fn apply_serialized_content(&mut self, markup: &str) -> Result<(), MarkupError>;

    fn direction(&self) -> TextDirection {
        TextDirection::Ltr
    }
}

/// In-memory editing surface backed by a [`Tree`].
#[derive(Debug, Clone)]
pub struct MemorySurface {
    tree: Tree,
    selection: Option<CursorSpan>,
    direction: TextDirection,
}

impl MemorySurface {
    /// An empty surface whose root carries `root_marker="true"`.
    pub fn new(root_marker: &str) -> Self {
        Self {
            tree: Tree::with_root_marker(root_marker),
            selection: None,
            direction: TextDirection::Ltr,
        }
    }

    pub fn from_markup(root_marker: &str, markup: &str) -> Result<Self, MarkupError> {
        let mut surface = Self::new(root_marker);
        parse_into(&mut surface.tree, markup)?;
        Ok(surface)
    }

    pub fn with_direction(mut self, direction: TextDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Collapses the selection at `(node, offset)`.
    pub fn place_caret(&mut self, node: NodeId, offset: usize) {
        self.selection = Some(CursorSpan::collapsed(BoundaryPoint::new(node, offset)));
    }

    /// Follows child indexes down from the root.
    pub fn node_at(&self, indexes: &[usize]) -> Option<NodeId> {
        indexes
            .iter()
            .try_fold(self.tree.root(), |node, &i| self.tree.child(node, i))
    }

    /// Default host behaviour for typed text: insert at the caret and move
    /// the caret past it. A non-collapsed selection inside one text node is
    /// replaced. Returns false when nothing could be inserted.
    pub fn native_insert_text(&mut self, text: &str) -> bool {
        let Some(span) = self.selection else {
            return false;
        };
        let mut at = span.start;
        if !span.is_collapsed() {
            if span.start.node != span.end.node || !self.tree.is_text(span.start.node) {
                return false;
            }
            let Some(existing) = self.tree.text(at.node) else {
                return false;
            };
            let (from, to) = (
                span.start.offset.min(span.end.offset),
                span.start.offset.max(span.end.offset),
            );
            let mut remaining = existing.to_string();
            remaining.replace_range(byte_index(existing, from)..byte_index(existing, to), "");
            if self.tree.set_text(at.node, remaining).is_err() {
                return false;
            }
            at.offset = from;
        }

        let inserted = text.chars().count();
        let caret = if let Some(existing) = self.tree.text(at.node) {
            let mut updated = existing.to_string();
            updated.insert_str(byte_index(existing, at.offset), text);
            if self.tree.set_text(at.node, updated).is_err() {
                return false;
            }
            BoundaryPoint::new(at.node, at.offset + inserted)
        } else {
            let before = at
                .offset
                .checked_sub(1)
                .and_then(|i| self.tree.child(at.node, i))
                .filter(|&node| self.tree.is_text(node));
            let after = self
                .tree
                .child(at.node, at.offset)
                .filter(|&node| self.tree.is_text(node));
            match (before, after) {
                (Some(node), _) => {
                    let mut updated = self.tree.text(node).unwrap_or_default().to_string();
                    let offset = updated.chars().count();
                    updated.push_str(text);
                    if self.tree.set_text(node, updated).is_err() {
                        return false;
                    }
                    BoundaryPoint::new(node, offset + inserted)
                }
                (None, Some(node)) => {
                    let updated = format!("{text}{}", self.tree.text(node).unwrap_or_default());
                    if self.tree.set_text(node, updated).is_err() {
                        return false;
                    }
                    BoundaryPoint::new(node, inserted)
                }
                (None, None) => {
                    let node = self.tree.create_text(text);
                    if self.tree.insert_child(at.node, at.offset, node).is_err() {
                        return false;
                    }
                    BoundaryPoint::new(node, inserted)
                }
            }
        };
        self.selection = Some(CursorSpan::collapsed(caret));
        true
    }

    /// Default host behaviour for Backspace with a collapsed caret: remove
    /// the char (or void element) before the caret within its container.
    pub fn native_delete_backward(&mut self) -> bool {
        let Some(span) = self.selection.filter(CursorSpan::is_collapsed) else {
            return false;
        };
        let at = span.end;
        if let Some(existing) = self.tree.text(at.node) {
            if at.offset == 0 {
                return false;
            }
            let mut updated = existing.to_string();
            updated.replace_range(
                byte_index(existing, at.offset - 1)..byte_index(existing, at.offset),
                "",
            );
            if self.tree.set_text(at.node, updated).is_err() {
                return false;
            }
            self.place_caret(at.node, at.offset - 1);
            return true;
        }

        let Some(before) = at
            .offset
            .checked_sub(1)
            .and_then(|i| self.tree.child(at.node, i))
        else {
            return false;
        };
        if let Some(existing) = self.tree.text(before) {
            let len = existing.chars().count();
            if len == 0 {
                return false;
            }
            let trimmed: String = existing.chars().take(len - 1).collect();
            if self.tree.set_text(before, trimmed).is_err() {
                return false;
            }
            self.place_caret(before, len - 1);
        } else {
            if self.tree.remove(before).is_err() {
                return false;
            }
            self.place_caret(at.node, at.offset - 1);
        }
        true
    }

    /// Default host behaviour for Enter: a `<br>` at the caret, splitting
    /// the text node when the caret is inside one.
    pub fn native_insert_break(&mut self) -> bool {
        let Some(span) = self.selection.filter(CursorSpan::is_collapsed) else {
            return false;
        };
        let at = span.end;
        let (parent, index) = if let Some(existing) = self.tree.text(at.node) {
            let Some(before) = BoundaryPoint::before(&self.tree, at.node) else {
                return false;
            };
            let len = existing.chars().count();
            if at.offset == 0 {
                (before.node, before.offset)
            } else if at.offset == len {
                (before.node, before.offset + 1)
            } else {
                let split = byte_index(existing, at.offset);
                let (head, tail) = (existing[..split].to_string(), existing[split..].to_string());
                let tail_node = self.tree.create_text(tail);
                if self.tree.set_text(at.node, head).is_err()
                    || self
                        .tree
                        .insert_child(before.node, before.offset + 1, tail_node)
                        .is_err()
                {
                    return false;
                }
                (before.node, before.offset + 1)
            }
        } else {
            (at.node, at.offset)
        };

        let br = self.tree.create_element(Element::new("br"));
        if self.tree.insert_child(parent, index, br).is_err() {
            return false;
        }
        self.place_caret(parent, index + 1);
        true
    }

    /// Default host behaviour for Left/Right: one position along the tree.
    pub fn native_move_caret(&mut self, forward: bool) -> bool {
        let Some(span) = self.selection else {
            return false;
        };
        let at = if forward { span.end } else { span.start };
        let tree = &self.tree;
        let target = if tree.is_text(at.node) {
            let len = tree.text_len(at.node);
            match (forward, at.offset) {
                (true, o) if o < len => Some(BoundaryPoint::new(at.node, o + 1)),
                (false, o) if o > 0 => Some(BoundaryPoint::new(at.node, o - 1)),
                (true, _) => BoundaryPoint::after(tree, at.node),
                (false, _) => BoundaryPoint::before(tree, at.node),
            }
        } else if forward {
            match tree.child(at.node, at.offset) {
                Some(child) if tree.is_text(child) => {
                    Some(BoundaryPoint::new(child, tree.text_len(child).min(1)))
                }
                Some(child) if tree.is_line_break(child) => BoundaryPoint::after(tree, child),
                Some(child) => Some(BoundaryPoint::new(child, 0)),
                None if at.node == tree.root() => None,
                None => BoundaryPoint::after(tree, at.node),
            }
        } else {
            match at.offset.checked_sub(1).and_then(|i| tree.child(at.node, i)) {
                Some(child) if tree.is_text(child) => Some(BoundaryPoint::new(
                    child,
                    tree.text_len(child).saturating_sub(1),
                )),
                Some(child) if tree.is_line_break(child) => BoundaryPoint::before(tree, child),
                Some(child) => Some(BoundaryPoint::end_of(tree, child)),
                None if at.node == tree.root() => None,
                None => BoundaryPoint::before(tree, at.node),
            }
        };
        match target {
            Some(point) => {
                self.place_caret(point.node, point.offset);
                true
            }
            None => false,
        }
    }
}

impl EditingSurface for MemorySurface {
    fn tree(&self) -> &Tree {
        &self.tree
    }

    fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    fn current_selection(&self) -> Option<CursorSpan> {
        self.selection
    }

    fn set_selection(&mut self, span: Option<CursorSpan>) {
        self.selection = span;
    }

    fn apply_serialized_content(&mut self, markup: &str) -> Result<(), MarkupError> {
        parse_into(&mut self.tree, markup)?;
        // The old containers are gone; like a browser, fall back to the
        // start of the root until someone restores the caret.
        if self.selection.is_some() {
            self.place_caret(self.tree.root(), 0);
        }
        Ok(())
    }

    fn direction(&self) -> TextDirection {
        self.direction
    }
}
