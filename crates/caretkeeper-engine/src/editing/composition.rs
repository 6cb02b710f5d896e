//! # Composition Correction
//!
//! While an IME session is running the host may put the provisional text
//! into a different container from the one the caret was in when the
//! session started. When the session ends, the composed text is cut from
//! wherever it landed and re-inserted at the caret snapshotted at
//! composition start.

use crate::dom::Tree;
use crate::options::Limits;
use crate::surface::EditingSurface;

use super::caret::{CaretSnapshot, CaretStore};
use super::edit::{CaretTarget, EditPlan, TreeEdit, apply_plan};
use super::error::EditError;
use super::path::resolve_path;
use super::selection::{BoundaryPoint, CursorSpan};

/// Works out how to move `data` from the live caret's container back to
/// the container recorded in `snapshot`.
///
/// Only a collapsed snapshot identifies a single anchor; anything else is
/// [`EditError::AmbiguousComposition`]. When the text already sits in the
/// recorded container there is nothing to do.
pub fn plan_composition_correction(
    tree: &Tree,
    snapshot: &CaretSnapshot,
    live: &CursorSpan,
    data: &str,
    limits: &Limits,
) -> Result<EditPlan, EditError> {
    if !snapshot.is_collapsed() {
        return Err(EditError::AmbiguousComposition);
    }
    let original = resolve_path(
        tree,
        tree.root(),
        &snapshot.end_container,
        limits.max_descent_steps,
    )
    .into_edit_result()?;
    let original_offset = snapshot.end_offset;
    if original_offset > tree.max_offset(original) {
        return Err(EditError::StalePath);
    }

    let landed = live.end;
    if landed.node == original {
        return Err(EditError::NotApplicable("composed text is already in place"));
    }
    if landed.offset == 0 {
        return Err(EditError::NotApplicable("nothing composed before the caret"));
    }
    let landed_text = tree
        .text(landed.node)
        .ok_or(EditError::NotApplicable("composed text did not land in text"))?;
    if landed.offset > landed_text.chars().count() {
        return Err(EditError::StalePath);
    }

    let from = landed.offset.saturating_sub(data.chars().count());
    let moved: String = landed_text
        .chars()
        .skip(from)
        .take(landed.offset - from)
        .collect();
    let moved_len = moved.chars().count();
    let cut = TreeEdit::RemoveTextRange {
        node: landed.node,
        range: from..landed.offset,
    };

    let (paste, caret) = if tree.is_element(original) {
        (
            TreeEdit::InsertText {
                parent: original,
                index: original_offset,
                text: moved,
            },
            CaretTarget::InCreatedText(moved_len),
        )
    } else {
        let len = tree.text_len(original);
        if original_offset == len {
            (
                TreeEdit::AppendText {
                    node: original,
                    text: moved,
                },
                CaretTarget::At(BoundaryPoint::new(original, len + moved_len)),
            )
        } else {
            (
                TreeEdit::PrependText {
                    node: original,
                    text: moved,
                },
                CaretTarget::At(BoundaryPoint::new(original, moved_len)),
            )
        }
    };

    Ok(EditPlan {
        edits: vec![cut, paste],
        caret,
    })
}

/// Re-homes composed `data` on the surface using the store's snapshot.
pub fn correct_composition<S: EditingSurface + ?Sized>(
    surface: &mut S,
    store: &CaretStore,
    data: &str,
) -> Result<CursorSpan, EditError> {
    let snapshot = store
        .snapshot()
        .ok_or(EditError::NotApplicable("no snapshot from composition start"))?;
    let live = surface
        .current_selection()
        .ok_or(EditError::NoActiveSelection)?;
    let plan = plan_composition_correction(surface.tree(), snapshot, &live, data, store.limits())?;
    log::debug!("moving composed text {data:?} back to {snapshot}");
    apply_plan(surface, &plan)
}
