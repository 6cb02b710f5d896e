use crate::dom::TreeError;
use crate::dom::markup::MarkupError;
use crate::traversal::Traversal;

/// Why an editing operation declined to act.
///
/// None of these reach the user. Handlers log them and leave the tree and
/// caret as they were, accepting the host's default behaviour.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditError {
    #[error("Recorded path no longer resolves against the current tree")]
    StalePath,
    #[error("Tree walk exceeded its safety cap")]
    MalformedTree,
    #[error("Composition did not start from a collapsed caret")]
    AmbiguousComposition,
    #[error("No active selection")]
    NoActiveSelection,
    #[error("Operation does not apply here: {0}")]
    NotApplicable(&'static str),
    #[error("Tree rejected edit: {0}")]
    Tree(#[from] TreeError),
    #[error("Surface rejected content: {0}")]
    Markup(#[from] MarkupError),
}

impl<T> Traversal<T> {
    /// Not found means stale, running past the cap means malformed.
    pub fn into_edit_result(self) -> Result<T, EditError> {
        match self {
            Traversal::Found(value) => Ok(value),
            Traversal::NotFound => Err(EditError::StalePath),
            Traversal::ExceededBound => Err(EditError::MalformedTree),
        }
    }
}
