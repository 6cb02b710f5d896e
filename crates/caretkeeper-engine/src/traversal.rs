//! # Bounded Traversal
//!
//! Every walk over the document tree (ancestor climbs, first/last-child
//! digs, path descents) goes through [`bounded_walk`]. A walk either finds
//! what its step function is looking for, runs out of nodes, or hits the
//! step cap. The cap is a corruption guard, not an expected tree size.

/// Outcome of a bounded walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal<T> {
    /// The step function accepted this node.
    Found(T),
    /// The walk ran out of nodes before anything was accepted.
    NotFound,
    /// The walk was still going when the step cap was reached.
    ExceededBound,
}

/// What a step function decides for the node it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<T> {
    /// Accept the current node.
    Found,
    /// Move on to the given node.
    Continue(T),
    /// Nowhere left to go.
    Exhausted,
}

impl<T> Traversal<T> {
    /// Returns the accepted node, discarding why a walk failed.
    pub fn found(self) -> Option<T> {
        match self {
            Traversal::Found(value) => Some(value),
            Traversal::NotFound | Traversal::ExceededBound => None,
        }
    }

    pub fn is_exceeded(&self) -> bool {
        matches!(self, Traversal::ExceededBound)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Traversal<U> {
        match self {
            Traversal::Found(value) => Traversal::Found(f(value)),
            Traversal::NotFound => Traversal::NotFound,
            Traversal::ExceededBound => Traversal::ExceededBound,
        }
    }
}

/// Walks from `start`, asking `step` about each visited node.
///
/// At most `max_steps` moves (`Step::Continue`) are taken; a walk that wants
/// to move again after that returns [`Traversal::ExceededBound`].
pub fn bounded_walk<T: Copy>(
    start: T,
    max_steps: usize,
    mut step: impl FnMut(T) -> Step<T>,
) -> Traversal<T> {
    let mut current = start;
    let mut taken = 0;

    loop {
        match step(current) {
            Step::Found => return Traversal::Found(current),
            Step::Exhausted => return Traversal::NotFound,
            Step::Continue(next) => {
                if taken == max_steps {
                    log::warn!("bounded walk gave up after {max_steps} steps");
                    return Traversal::ExceededBound;
                }
                taken += 1;
                current = next;
            }
        }
    }
}
