/// Attribute that marks the editable root (`<div contenteditable="true">`).
pub const DEFAULT_ROOT_MARKER: &str = "contenteditable";

/// Ancestor hops allowed before a climb is treated as a malformed tree.
pub const MAX_ANCESTOR_HOPS: usize = 1000;

/// Descent steps allowed before a dig is treated as a malformed tree.
pub const MAX_DESCENT_STEPS: usize = 10_000;

/// Offset delta (in characters, same container) above which a caret move
/// between two typed characters counts as a user reposition.
pub const CARET_JUMP_THRESHOLD: usize = 2;

/// Safety caps shared by every tree walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_ancestor_hops: usize,
    pub max_descent_steps: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_ancestor_hops: MAX_ANCESTOR_HOPS,
            max_descent_steps: MAX_DESCENT_STEPS,
        }
    }
}

/// Tunables for an [`Editor`](crate::editing::Editor) session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    /// Attribute whose value `"true"` marks the editable root.
    pub root_marker_attribute: String,
    pub limits: Limits,
    pub caret_jump_threshold: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            root_marker_attribute: DEFAULT_ROOT_MARKER.to_string(),
            limits: Limits::default(),
            caret_jump_threshold: CARET_JUMP_THRESHOLD,
        }
    }
}
