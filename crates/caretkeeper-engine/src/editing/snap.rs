//! Click normalization: a caret placed by the pointer at the very edge of a
//! formatting wrapper is moved out of it, so that typing next does not
//! extend the wrapper.

use crate::dom::{NodeId, Tree, governing_format};
use crate::options::Limits;

use super::error::EditError;
use super::selection::{BoundaryPoint, CursorSpan};

/// The collapsed caret's text node and its formatting parent.
fn formatted_caret(
    tree: &Tree,
    span: &CursorSpan,
    limits: &Limits,
) -> Result<(BoundaryPoint, NodeId), EditError> {
    if !span.is_collapsed() {
        return Err(EditError::NotApplicable("selection is not collapsed"));
    }
    let caret = span.end;
    if !tree.is_text(caret.node) || !caret.is_valid(tree) {
        return Err(EditError::NotApplicable("caret is not in text"));
    }
    if governing_format(tree, caret.node, limits.max_ancestor_hops).is_none() {
        return Err(EditError::NotApplicable("caret is not inside formatting"));
    }
    let wrapper = tree.parent(caret.node).ok_or(EditError::StalePath)?;
    Ok((caret, wrapper))
}

/// At offset 0 of a wrapper that directly follows a `<br>`, the caret
/// belongs just after the break instead.
pub fn snap_after_break(
    tree: &Tree,
    span: &CursorSpan,
    limits: &Limits,
) -> Result<BoundaryPoint, EditError> {
    let (caret, wrapper) = formatted_caret(tree, span, limits)?;
    if caret.offset != 0 {
        return Err(EditError::NotApplicable("caret is not at offset 0"));
    }
    tree.previous_sibling(wrapper)
        .filter(|&prev| tree.is_line_break(prev))
        .and_then(|br| BoundaryPoint::after(tree, br))
        .ok_or(EditError::NotApplicable("wrapper does not follow a break"))
}

/// At the end of a wrapper's text, the caret moves to the start of the
/// wrapper's next sibling, or just past the wrapper when it is last.
pub fn snap_out_of_format_end(
    tree: &Tree,
    span: &CursorSpan,
    limits: &Limits,
) -> Result<BoundaryPoint, EditError> {
    let (caret, wrapper) = formatted_caret(tree, span, limits)?;
    if caret.offset != tree.text_len(caret.node) {
        return Err(EditError::NotApplicable("caret is not at the end of the text"));
    }
    match tree.next_sibling(wrapper) {
        Some(next) => Ok(BoundaryPoint::new(next, 0)),
        None => BoundaryPoint::after(tree, wrapper).ok_or(EditError::StalePath),
    }
}
