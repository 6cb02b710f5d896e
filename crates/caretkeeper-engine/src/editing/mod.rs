/*!
 * # Editing Core
 *
 * Keeps the caret where the user expects it while the editable tree is
 * torn down and rebuilt from serialized content, and corrects the host's
 * default editing behaviour at inline formatting boundaries.
 *
 * ## Architecture Overview
 *
 * ### 1. Paths instead of node identity
 * - A caret is persisted as a **`CaretSnapshot`**: two root-relative
 *   **`NodePath`**s plus offsets
 * - Paths are recomputed on every save and resolved against whatever tree
 *   exists at restore time
 * - A path that no longer resolves is stale and the restore is skipped
 *
 * ### 2. Plan, then apply
 * - Insertion and composition correction first produce an **`EditPlan`**
 *   (a list of `TreeEdit`s plus a `CaretTarget`) without touching the tree
 * - `apply_plan` performs the edits and places the caret as a second step
 *
 * ### 3. Bounded walks
 * - Every climb and descent goes through `traversal::bounded_walk`, which
 *   reports found / not found / exceeded rather than a sentinel depth
 *
 * ### 4. One session object
 * - **`Editor`** owns the caret store, history and navigation state and
 *   exposes one method per host signal
 *
 * ## Module Structure
 *
 * - **`path`**: `NodePath`, `compute_path`, `resolve_path`
 * - **`caret`**: `CaretSnapshot` and the save/restore `CaretStore`
 * - **`navigation`**: arrow-key rules at formatting boundaries and breaks
 * - **`edit`**: `TreeEdit` descriptions and their application
 * - **`insertion`**: manual single-character insertion
 * - **`composition`**: IME text re-homing
 * - **`snap`**: caret normalization after clicks
 * - **`history`**: coalescing undo stack
 * - **`editor`**: the `Editor` session
 *
 * ## Usage Pattern
 *
 * ```rust
 * use caretkeeper_engine::editing::*;
 * use caretkeeper_engine::{EditorOptions, KeyEvent, MemorySurface};
 *
 * let surface = MemorySurface::from_markup("contenteditable", "<p>a<b>bold</b>c</p>").unwrap();
 * let mut editor = Editor::new(surface, EditorOptions::default());
 *
 * // Caret at the end of "a"
 * let a = editor.surface().node_at(&[0, 0]).unwrap();
 * editor.surface_mut().place_caret(a, 1);
 *
 * // Right arrow steps into the bold run instead of skipping past it
 * assert_eq!(editor.key_down(&KeyEvent::named("ArrowRight")), Disposition::Prevented);
 * ```
 */

pub mod caret;
pub mod composition;
pub mod edit;
pub mod editor;
pub mod error;
pub mod history;
pub mod insertion;
pub mod navigation;
pub mod path;
pub mod selection;
pub mod snap;

pub use caret::{CaretSnapshot, CaretStore, MatchedContainers};
pub use edit::{AppliedEdit, CaretTarget, EditPlan, TreeEdit, apply_edit, apply_plan};
pub use editor::{Disposition, Editor, EditorEvent};
pub use error::EditError;
pub use history::{ActionKind, History, HistoryEntry, classify_key, is_undo_request};
pub use insertion::{Insertion, WHITESPACE_SENTINEL, plan_insertion, untag_whitespace};
pub use navigation::{ArrowDirection, NavMove, NavRule, NavigationState, plan_navigation};
pub use path::{NodePath, compute_path, resolve_path};
pub use selection::{BoundaryPoint, CursorSpan};
