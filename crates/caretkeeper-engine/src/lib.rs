pub mod dom;
pub mod editing;
pub mod events;
pub mod options;
pub mod playback;
pub mod surface;
pub mod traversal;

// Re-export key types for easier usage
pub use dom::{NodeId, Tree};
pub use editing::{CaretSnapshot, Disposition, EditError, Editor, EditorEvent, NodePath};
pub use events::{InputEvent, KeyEvent};
pub use options::{EditorOptions, Limits};
pub use surface::{EditingSurface, MemorySurface, TextDirection};
