//! # Caret Save/Restore
//!
//! The live selection refers to nodes by identity, and identity does not
//! survive a rebuild from serialized content. [`CaretStore`] therefore keeps
//! a [`CaretSnapshot`]: both ends of the selection expressed as root-relative
//! [`NodePath`]s plus offsets. After the surface rebuilds its tree, the
//! snapshot is resolved against the new tree and the selection is put back.
//!
//! ## Protocol
//!
//! 1. `save_range` after every content-mutating signal (input, composition,
//!    navigation). A failed save keeps the previous snapshot; a snapshot is
//!    never half-updated.
//! 2. The host serializes and re-applies content.
//! 3. `restore_caret_position` once the rebuild has settled. If the paths
//!    no longer resolve the restore is skipped and the host's default caret
//!    placement stands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dom::{NodeId, Tree};
use crate::options::Limits;
use crate::surface::EditingSurface;

use super::error::EditError;
use super::path::{NodePath, compute_path, resolve_path};
use super::selection::{BoundaryPoint, CursorSpan};

/// Path-based encoding of a selection, valid across tree rebuilds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaretSnapshot {
    pub start_offset: usize,
    pub end_offset: usize,
    pub start_container: NodePath,
    pub end_container: NodePath,
}

impl CaretSnapshot {
    /// Encodes `span`. Fails if either end has no path to the marked root.
    pub fn capture(
        tree: &Tree,
        span: &CursorSpan,
        root_marker: &str,
        limits: &Limits,
    ) -> Result<Self, EditError> {
        let start_container =
            compute_path(tree, span.start.node, root_marker, limits.max_ancestor_hops)
                .into_edit_result()?;
        let end_container =
            compute_path(tree, span.end.node, root_marker, limits.max_ancestor_hops)
                .into_edit_result()?;
        Ok(Self {
            start_offset: span.start.offset,
            end_offset: span.end.offset,
            start_container,
            end_container,
        })
    }

    pub fn is_collapsed(&self) -> bool {
        self.start_container == self.end_container && self.start_offset == self.end_offset
    }
}

impl fmt::Display for CaretSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_collapsed() {
            write!(f, "{}@{}", self.end_container, self.end_offset)
        } else {
            write!(
                f,
                "{}@{}..{}@{}",
                self.start_container, self.start_offset, self.end_container, self.end_offset
            )
        }
    }
}

/// Containers a snapshot resolves to in the current tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchedContainers {
    pub start: Option<NodeId>,
    pub end: Option<NodeId>,
}

/// Owns the current caret snapshot and the pending-paste flag.
#[derive(Debug, Clone)]
pub struct CaretStore {
    snapshot: Option<CaretSnapshot>,
    paste_pending: bool,
    root_marker: String,
    limits: Limits,
}

impl CaretStore {
    pub fn new(root_marker: impl Into<String>, limits: Limits) -> Self {
        Self {
            snapshot: None,
            paste_pending: false,
            root_marker: root_marker.into(),
            limits,
        }
    }

    pub fn snapshot(&self) -> Option<&CaretSnapshot> {
        self.snapshot.as_ref()
    }

    /// Replaces the snapshot wholesale (used when reapplying undo state).
    pub fn set_snapshot(&mut self, snapshot: Option<CaretSnapshot>) {
        self.snapshot = snapshot;
    }

    pub fn root_marker(&self) -> &str {
        &self.root_marker
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Encodes the surface's live selection without storing it.
    pub fn capture<S: EditingSurface + ?Sized>(
        &self,
        surface: &S,
    ) -> Result<CaretSnapshot, EditError> {
        let span = surface
            .current_selection()
            .ok_or(EditError::NoActiveSelection)?;
        CaretSnapshot::capture(surface.tree(), &span, &self.root_marker, &self.limits)
    }

    /// Snapshots the live selection. On failure the previous snapshot stays.
    pub fn save_range<S: EditingSurface + ?Sized>(&mut self, surface: &S) -> Result<(), EditError> {
        let snapshot = self.capture(surface)?;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    /// Resolves the stored paths against the tree as it is now.
    pub fn matched_containers(&self, tree: &Tree) -> MatchedContainers {
        let Some(snapshot) = &self.snapshot else {
            return MatchedContainers::default();
        };
        let resolve = |path: &NodePath| {
            resolve_path(tree, tree.root(), path, self.limits.max_descent_steps).found()
        };
        MatchedContainers {
            start: resolve(&snapshot.start_container),
            end: resolve(&snapshot.end_container),
        }
    }

    /// Puts the stored caret back onto the surface.
    ///
    /// A pending paste collapses the result to its start (the pasted
    /// content's end cannot be known from a pre-paste snapshot) and is
    /// consumed.
    pub fn restore_caret_position<S: EditingSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<CursorSpan, EditError> {
        let snapshot = self
            .snapshot
            .as_ref()
            .ok_or(EditError::NotApplicable("no caret snapshot"))?;
        let matched = self.matched_containers(surface.tree());
        let (Some(start), Some(end)) = (matched.start, matched.end) else {
            return Err(EditError::StalePath);
        };

        let start = BoundaryPoint::new(start, snapshot.start_offset);
        let mut end = BoundaryPoint::new(end, snapshot.end_offset);
        if !start.is_valid(surface.tree()) || !end.is_valid(surface.tree()) {
            return Err(EditError::StalePath);
        }

        if self.paste_pending {
            end = start;
            self.paste_pending = false;
        }

        let span = CursorSpan::new(start, end);
        surface.set_selection(Some(span));
        Ok(span)
    }

    pub fn mark_paste(&mut self) {
        self.paste_pending = true;
    }

    pub fn paste_pending(&self) -> bool {
        self.paste_pending
    }
}
