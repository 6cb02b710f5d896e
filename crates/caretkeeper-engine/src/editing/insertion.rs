//! # Manual Insertion
//!
//! A single typed character at the edge of a text run, next to a line
//! break, or between two formatting wrappers is often put in the wrong
//! container by the host. At those positions the character is inserted
//! here instead and the native insertion is suppressed.
//!
//! [`plan_insertion`] is pure: it inspects the tree and returns an
//! [`EditPlan`]. [`perform_insertion`] applies it, snapshots the caret and
//! swaps the whitespace sentinel for a non-breaking space.
//!
//! ## Whitespace
//!
//! A plain space at the edge of a text node collapses when the content is
//! serialized and re-applied. Whitespace is therefore inserted as
//! [`WHITESPACE_SENTINEL`], which serializes to a recognisable escaped form
//! that is rewritten to `&nbsp;` before the content is re-applied. Caret
//! offsets are computed as if the sentinel were one character, which is
//! what it becomes.

use crate::dom::{NodeId, Tree, is_void_tag};
use crate::options::Limits;
use crate::surface::EditingSurface;
use crate::traversal::{Step, bounded_walk};

use super::caret::CaretStore;
use super::edit::{CaretTarget, EditPlan, TreeEdit, apply_plan};
use super::error::EditError;
use super::selection::{BoundaryPoint, CursorSpan};

/// Stand-in text for a typed whitespace character.
pub const WHITESPACE_SENTINEL: &str = "white_space_&nbsp;";

/// [`WHITESPACE_SENTINEL`] as it appears in serialized content.
const SERIALIZED_SENTINEL: &str = "white_space_&amp;nbsp;";

/// Rewrites serialized sentinels to non-breaking space entities.
pub fn untag_whitespace(serialized: &str) -> String {
    serialized.replace(SERIALIZED_SENTINEL, "&nbsp;")
}

/// A planned insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub plan: EditPlan,
    /// The inserted text is the whitespace sentinel.
    pub whitespace: bool,
}

fn single_char(data: &str) -> Option<char> {
    let mut chars = data.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Decides whether (and how) to insert `data` at the collapsed `span`.
///
/// Declines with [`EditError::NotApplicable`] for multi-char data, ranged
/// selections and carets in the middle of a text run.
pub fn plan_insertion(
    tree: &Tree,
    span: &CursorSpan,
    data: &str,
    root_marker: &str,
    limits: &Limits,
) -> Result<Insertion, EditError> {
    let typed = single_char(data).ok_or(EditError::NotApplicable("not a single character"))?;
    if !span.is_collapsed() {
        return Err(EditError::NotApplicable("selection is not collapsed"));
    }
    let caret = span.end;
    if !caret.is_valid(tree) {
        return Err(EditError::StalePath);
    }

    let whitespace = typed.is_whitespace();
    let unit = if whitespace {
        WHITESPACE_SENTINEL.to_string()
    } else {
        typed.to_string()
    };

    let plan = if tree.is_text(caret.node) {
        plan_in_text(tree, caret, unit)?
    } else {
        plan_between_nodes(tree, caret, unit, root_marker, limits)?
    };
    Ok(Insertion { plan, whitespace })
}

fn plan_in_text(tree: &Tree, caret: BoundaryPoint, unit: String) -> Result<EditPlan, EditError> {
    let len = tree.text_len(caret.node);
    let node = caret.node;
    if caret.offset == 0 {
        Ok(EditPlan::single(
            TreeEdit::PrependText { node, text: unit },
            CaretTarget::At(BoundaryPoint::new(node, 1)),
        ))
    } else if caret.offset == len {
        Ok(EditPlan::single(
            TreeEdit::AppendText { node, text: unit },
            CaretTarget::At(BoundaryPoint::new(node, len + 1)),
        ))
    } else {
        Err(EditError::NotApplicable("caret inside a text run"))
    }
}

fn plan_between_nodes(
    tree: &Tree,
    caret: BoundaryPoint,
    unit: String,
    root_marker: &str,
    limits: &Limits,
) -> Result<EditPlan, EditError> {
    let parent = caret.node;
    let index = caret.offset;
    let prev = index.checked_sub(1).and_then(|i| tree.child(parent, i));
    let current = tree.child(parent, index);
    let next = tree.child(parent, index + 1);
    let insert_here = |text: String| {
        EditPlan::single(
            TreeEdit::InsertText {
                parent,
                index,
                text,
            },
            CaretTarget::InCreatedText(1),
        )
    };

    let Some(current) = current else {
        if !tree.has_marker(parent, root_marker) {
            return Err(EditError::NotApplicable("end of a non-root element"));
        }
        // Extend a trailing text node rather than leave two adjacent ones,
        // which would merge on the next rebuild and strand the caret path.
        if let Some(prev) = prev.filter(|&p| tree.is_text(p)) {
            let len = tree.text_len(prev);
            return Ok(EditPlan::single(
                TreeEdit::AppendText {
                    node: prev,
                    text: unit,
                },
                CaretTarget::At(BoundaryPoint::new(prev, len + 1)),
            ));
        }
        return Ok(insert_here(unit));
    };

    // Text right after a break takes the char through the prepend below.
    let after_break = prev.is_some_and(|p| tree.is_line_break(p)) && !tree.is_text(current);
    let between_formats =
        prev.is_some_and(|p| tree.is_inline_format(p)) && tree.is_inline_format(current);
    if after_break || between_formats {
        return Ok(insert_here(unit));
    }

    if tree.is_line_break(current) && next.is_none() {
        if let Some(prev) = prev.filter(|&p| tree.is_text(p)) {
            let len = tree.text_len(prev);
            return Ok(EditPlan {
                edits: vec![
                    TreeEdit::RemoveNode { node: current },
                    TreeEdit::AppendText {
                        node: prev,
                        text: unit,
                    },
                ],
                caret: CaretTarget::At(BoundaryPoint::new(prev, len + 1)),
            });
        }
        return Ok(EditPlan::single(
            TreeEdit::ReplaceWithText {
                parent,
                node: current,
                text: unit,
            },
            CaretTarget::InCreatedText(1),
        ));
    }

    // The first leaf of `current` is the first content after the caret, so
    // prepending to it keeps the typed char in order.
    let leaf = first_leaf(tree, current, limits)?;
    if tree.is_text(leaf) {
        return Ok(EditPlan::single(
            TreeEdit::PrependText {
                node: leaf,
                text: unit,
            },
            CaretTarget::At(BoundaryPoint::new(leaf, 1)),
        ));
    }
    let holds_text = !tree.tag(leaf).is_some_and(is_void_tag);
    let (parent, index) = if holds_text {
        (leaf, 0)
    } else {
        let before = BoundaryPoint::before(tree, leaf).ok_or(EditError::StalePath)?;
        (before.node, before.offset)
    };
    Ok(EditPlan::single(
        TreeEdit::InsertText {
            parent,
            index,
            text: unit,
        },
        CaretTarget::InCreatedText(1),
    ))
}

fn first_leaf(tree: &Tree, node: NodeId, limits: &Limits) -> Result<NodeId, EditError> {
    bounded_walk(node, limits.max_ancestor_hops, |n| match tree.first_child(n) {
        Some(child) => Step::Continue(child),
        None => Step::Found,
    })
    .into_edit_result()
}

/// Applies a planned insertion, snapshots the caret and, for whitespace,
/// re-applies the content with the sentinel rewritten and restores the
/// caret onto the rebuilt tree.
///
/// Only a failure to apply the plan is an error. Once the tree has changed
/// the char is in, so later failures are logged and the caret is left
/// wherever the surface has it.
pub fn perform_insertion<S: EditingSurface + ?Sized>(
    surface: &mut S,
    store: &mut CaretStore,
    insertion: &Insertion,
) -> Result<CursorSpan, EditError> {
    let span = apply_plan(surface, &insertion.plan)?;
    if let Err(err) = store.save_range(surface) {
        log::debug!("caret after insertion not saved: {err}");
    }
    if !insertion.whitespace {
        return Ok(span);
    }

    let content = untag_whitespace(&surface.serialized_content());
    let restored = surface
        .apply_serialized_content(&content)
        .map_err(EditError::from)
        .and_then(|()| store.restore_caret_position(surface));
    match restored {
        Ok(span) => Ok(span),
        Err(err) => {
            log::debug!("caret not restored after whitespace insertion: {err}");
            Ok(surface.current_selection().unwrap_or(span))
        }
    }
}
