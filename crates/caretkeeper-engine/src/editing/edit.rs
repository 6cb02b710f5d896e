//! # Tree Edits
//!
//! Handlers never touch the tree while they are still working out what to
//! do. They first produce an [`EditPlan`]: a list of [`TreeEdit`]s plus the
//! [`CaretTarget`] the caret should land on. Applying the plan is a
//! separate step, so the planning logic can be checked against a tree
//! without mutating it.

use std::ops::Range;

use crate::dom::{NodeId, Tree, byte_index};
use crate::surface::EditingSurface;

use super::error::EditError;
use super::selection::{BoundaryPoint, CursorSpan};

/// A single mutation of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEdit {
    /// Put `text` in front of a text node's payload.
    PrependText { node: NodeId, text: String },
    /// Put `text` after a text node's payload.
    AppendText { node: NodeId, text: String },
    /// Create a text node and insert it as child `index` of `parent`.
    InsertText {
        parent: NodeId,
        index: usize,
        text: String,
    },
    /// Remove `node` from `parent` and append a new text node to `parent`.
    ReplaceWithText {
        parent: NodeId,
        node: NodeId,
        text: String,
    },
    /// Detach `node` from the tree.
    RemoveNode { node: NodeId },
    /// Delete a char range from a text node.
    RemoveTextRange { node: NodeId, range: Range<usize> },
}

/// Where the caret goes once the edits are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretTarget {
    /// A position in a node that already exists.
    At(BoundaryPoint),
    /// An offset inside the text node the plan creates.
    InCreatedText(usize),
}

/// Edits in application order plus the caret that follows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPlan {
    pub edits: Vec<TreeEdit>,
    pub caret: CaretTarget,
}

impl EditPlan {
    pub fn single(edit: TreeEdit, caret: CaretTarget) -> Self {
        Self {
            edits: vec![edit],
            caret,
        }
    }
}

/// What applying an edit produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppliedEdit {
    pub created: Option<NodeId>,
}

impl CaretTarget {
    /// Turns the target into a collapsed span.
    pub fn resolve(&self, applied: &AppliedEdit) -> Result<CursorSpan, EditError> {
        let point = match *self {
            CaretTarget::At(point) => point,
            CaretTarget::InCreatedText(offset) => {
                let node = applied
                    .created
                    .ok_or(EditError::NotApplicable("plan created no text node"))?;
                BoundaryPoint::new(node, offset)
            }
        };
        Ok(CursorSpan::collapsed(point))
    }
}

fn existing_text(tree: &Tree, node: NodeId) -> Result<&str, EditError> {
    tree.text(node)
        .ok_or(EditError::NotApplicable("edit target is not a text node"))
}

/// Performs one edit.
pub fn apply_edit(tree: &mut Tree, edit: &TreeEdit) -> Result<AppliedEdit, EditError> {
    match edit {
        TreeEdit::PrependText { node, text } => {
            let updated = format!("{text}{}", existing_text(tree, *node)?);
            tree.set_text(*node, updated)?;
            Ok(AppliedEdit::default())
        }
        TreeEdit::AppendText { node, text } => {
            let updated = format!("{}{text}", existing_text(tree, *node)?);
            tree.set_text(*node, updated)?;
            Ok(AppliedEdit::default())
        }
        TreeEdit::InsertText {
            parent,
            index,
            text,
        } => {
            let created = tree.create_text(text.as_str());
            tree.insert_child(*parent, *index, created)?;
            Ok(AppliedEdit {
                created: Some(created),
            })
        }
        TreeEdit::ReplaceWithText { parent, node, text } => {
            if tree.parent(*node) != Some(*parent) {
                return Err(EditError::StalePath);
            }
            tree.remove(*node)?;
            let created = tree.create_text(text.as_str());
            tree.append_child(*parent, created)?;
            Ok(AppliedEdit {
                created: Some(created),
            })
        }
        TreeEdit::RemoveNode { node } => {
            tree.remove(*node)?;
            Ok(AppliedEdit::default())
        }
        TreeEdit::RemoveTextRange { node, range } => {
            let existing = existing_text(tree, *node)?;
            let len = existing.chars().count();
            if range.start > range.end || range.end > len {
                return Err(EditError::NotApplicable("text range out of bounds"));
            }
            let mut updated = existing.to_string();
            updated.replace_range(
                byte_index(existing, range.start)..byte_index(existing, range.end),
                "",
            );
            tree.set_text(*node, updated)?;
            Ok(AppliedEdit::default())
        }
    }
}

/// Applies every edit of `plan` in order, then collapses the surface's
/// selection onto the plan's caret.
pub fn apply_plan<S: EditingSurface + ?Sized>(
    surface: &mut S,
    plan: &EditPlan,
) -> Result<CursorSpan, EditError> {
    let mut applied = AppliedEdit::default();
    for edit in &plan.edits {
        let result = apply_edit(surface.tree_mut(), edit)?;
        if result.created.is_some() {
            applied = result;
        }
    }
    let span = plan.caret.resolve(&applied)?;
    surface.set_selection(Some(span));
    Ok(span)
}
