//! # Boundary Navigation
//!
//! Left/right arrow handling at the edges of inline formatting wrappers and
//! line breaks, where the host's native caret movement either gets stuck or
//! skips a position.
//!
//! The caret's surroundings are described by three nodes. For a caret in a
//! text node we climb from the text node until a node has a sibling on the
//! side we are moving towards (or its parent is the editable root); that
//! node is `current` and its siblings are `prev` and `next`. For a caret in
//! an element at child index `o`, `current` is child `o` and `prev`/`next`
//! are children `o - 1` and `o + 1`.
//!
//! Rules are tried in order and at most one fires per key press:
//!
//! 1. Right, just before a `<br>`, break flag not set: step past the break
//!    and set the flag.
//! 2. Right, break flag set, `prev` exists: move to the start of `current`.
//! 3. Unless `prev`, `current` or `next` sit under a formatting wrapper and
//!    the caret is at an extreme of its container, leave it to the host.
//! 4. Right at the end of a text container with a `next`: into the first
//!    text of `next`, or just after `current` when both are elements.
//! 5. Right in an element container: into the first text of `current`.
//! 6. Left at the start of `current` with a `prev`: to the end of the last
//!    text of `prev`, with special cases for single-char steps and breaks.
//!
//! The break flag lives for exactly one key event: it is armed with the
//! event's sequence number and only the next event sees it.

use crate::dom::{NodeId, Tree, governing_format, is_void_tag};
use crate::options::Limits;
use crate::surface::TextDirection;
use crate::traversal::{Step, bounded_walk};

use super::error::EditError;
use super::selection::BoundaryPoint;

/// Arrow key direction as pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    Left,
    Right,
}

impl ArrowDirection {
    /// The logical direction once text direction is taken into account.
    pub fn logical(self, direction: TextDirection) -> Self {
        match (self, direction) {
            (dir, TextDirection::Ltr) => dir,
            (ArrowDirection::Left, TextDirection::Rtl) => ArrowDirection::Right,
            (ArrowDirection::Right, TextDirection::Rtl) => ArrowDirection::Left,
        }
    }
}

/// Which rule produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavRule {
    PastBreak,
    AfterBreak,
    IntoNext,
    IntoCurrent,
    IntoPrevious,
}

/// A caret move decided by [`plan_navigation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavMove {
    pub target: BoundaryPoint,
    pub rule: NavRule,
    pub arms_break_flag: bool,
}

impl NavMove {
    fn to(target: BoundaryPoint, rule: NavRule) -> Self {
        Self {
            target,
            rule,
            arms_break_flag: false,
        }
    }

    fn arming(mut self) -> Self {
        self.arms_break_flag = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Surroundings {
    prev: Option<NodeId>,
    current: Option<NodeId>,
    next: Option<NodeId>,
}

fn surroundings(
    tree: &Tree,
    caret: BoundaryPoint,
    dir: ArrowDirection,
    limits: &Limits,
) -> Result<Surroundings, EditError> {
    if tree.is_element(caret.node) {
        let prev = caret
            .offset
            .checked_sub(1)
            .and_then(|i| tree.child(caret.node, i));
        return Ok(Surroundings {
            prev,
            current: tree.child(caret.node, caret.offset),
            next: tree.child(caret.node, caret.offset + 1),
        });
    }

    let root = tree.root();
    let current = bounded_walk(caret.node, limits.max_ancestor_hops, |node| {
        let sibling = match dir {
            ArrowDirection::Left => tree.previous_sibling(node),
            ArrowDirection::Right => tree.next_sibling(node),
        };
        if sibling.is_some() {
            return Step::Found;
        }
        match tree.parent(node) {
            Some(parent) if parent != root => Step::Continue(parent),
            _ => Step::Found,
        }
    })
    .into_edit_result()?;

    Ok(Surroundings {
        prev: tree.previous_sibling(current),
        current: Some(current),
        next: tree.next_sibling(current),
    })
}

/// Follows first (or last) children down to a leaf.
fn dig(tree: &Tree, node: NodeId, first: bool, limits: &Limits) -> Option<NodeId> {
    bounded_walk(node, limits.max_descent_steps, |n| {
        let child = if first {
            tree.first_child(n)
        } else {
            tree.last_child(n)
        };
        match child {
            Some(child) => Step::Continue(child),
            None => Step::Found,
        }
    })
    .found()
}

/// Offset 0 of the first text-bearing leaf under `node`. Void leaves such
/// as `<br>` cannot hold a caret.
fn start_of(tree: &Tree, node: NodeId, limits: &Limits) -> Option<BoundaryPoint> {
    let leaf = dig(tree, node, true, limits)?;
    let is_void = tree.tag(leaf).is_some_and(is_void_tag);
    (!is_void).then(|| BoundaryPoint::new(leaf, 0))
}

fn governed(tree: &Tree, node: Option<NodeId>, limits: &Limits) -> bool {
    node.is_some_and(|n| governing_format(tree, n, limits.max_ancestor_hops).is_some())
}

fn is_break(tree: &Tree, node: Option<NodeId>) -> bool {
    node.is_some_and(|n| tree.is_line_break(n))
}

/// Decides where an arrow press should take the caret.
///
/// `direction` must already be logical (see [`ArrowDirection::logical`]).
/// `after_break` is whether the previous key event stepped over a break.
/// Returns [`EditError::NotApplicable`] when the host should move the caret
/// itself.
pub fn plan_navigation(
    tree: &Tree,
    caret: BoundaryPoint,
    direction: ArrowDirection,
    after_break: bool,
    limits: &Limits,
) -> Result<NavMove, EditError> {
    if !caret.is_valid(tree) {
        return Err(EditError::StalePath);
    }
    let in_text = tree.is_text(caret.node);
    let text_len = tree.text_len(caret.node);
    let at_text_end = in_text && caret.offset == text_len;
    let ctx = surroundings(tree, caret, direction, limits)?;

    if direction == ArrowDirection::Right {
        let break_ahead = if in_text {
            at_text_end && is_break(tree, ctx.next)
        } else {
            is_break(tree, ctx.current)
        };
        if break_ahead && !after_break {
            let br = if in_text { ctx.next } else { ctx.current };
            if let Some(target) = br.and_then(|br| BoundaryPoint::after(tree, br)) {
                return Ok(NavMove::to(target, NavRule::PastBreak).arming());
            }
        }
        if after_break
            && ctx.prev.is_some()
            && let Some(target) = ctx.current.and_then(|c| start_of(tree, c, limits))
        {
            return Ok(NavMove::to(target, NavRule::AfterBreak));
        }
    }

    let at_extreme = !in_text || caret.offset == 0 || caret.offset == text_len;
    let near_format = governed(tree, ctx.current, limits)
        || governed(tree, ctx.next, limits)
        || governed(tree, ctx.prev, limits);
    if !(near_format && at_extreme) {
        return Err(EditError::NotApplicable("not at a formatting boundary"));
    }

    match direction {
        ArrowDirection::Right if in_text => {
            let (Some(current), Some(next)) = (ctx.current, ctx.next) else {
                return Err(EditError::NotApplicable("nothing to the right"));
            };
            if !at_text_end {
                return Err(EditError::NotApplicable("not at the end of the text"));
            }
            let target = if tree.is_element(current) && tree.is_element(next) {
                BoundaryPoint::after(tree, current)
            } else {
                start_of(tree, next, limits)
            };
            target
                .map(|t| NavMove::to(t, NavRule::IntoNext))
                .ok_or(EditError::NotApplicable("no caret position in next node"))
        }
        ArrowDirection::Right => ctx
            .current
            .and_then(|current| start_of(tree, current, limits))
            .map(|t| NavMove::to(t, NavRule::IntoCurrent))
            .ok_or(EditError::NotApplicable("no caret position in current node")),
        ArrowDirection::Left => {
            if in_text && caret.offset > 1 {
                return Err(EditError::NotApplicable("not at the start of the text"));
            }
            plan_left(tree, caret, &ctx, after_break, limits)
        }
    }
}

fn plan_left(
    tree: &Tree,
    caret: BoundaryPoint,
    ctx: &Surroundings,
    after_break: bool,
    limits: &Limits,
) -> Result<NavMove, EditError> {
    let prev = ctx
        .prev
        .ok_or(EditError::NotApplicable("nothing to the left"))?;

    if tree.is_text(caret.node) && caret.offset == 1 {
        return Ok(NavMove::to(
            BoundaryPoint::new(caret.node, 0),
            NavRule::IntoPrevious,
        ));
    }

    if tree.is_line_break(prev) {
        let target = if after_break {
            BoundaryPoint::before(tree, prev)
        } else {
            BoundaryPoint::after(tree, prev)
        };
        let target = target.ok_or(EditError::NotApplicable("break is detached"))?;
        let planned = NavMove::to(target, NavRule::IntoPrevious);
        return Ok(if after_break {
            planned
        } else {
            planned.arming()
        });
    }

    let prev_container =
        dig(tree, prev, false, limits).ok_or(EditError::MalformedTree)?;
    let target = if tree.is_text(prev_container) {
        Some(BoundaryPoint::end_of(tree, prev_container))
    } else if tree.is_line_break(prev_container) {
        BoundaryPoint::after(tree, prev_container)
    } else {
        ctx.current.and_then(|current| BoundaryPoint::before(tree, current))
    };
    match target {
        Some(target) if target != caret => Ok(NavMove::to(target, NavRule::IntoPrevious)),
        _ => Err(EditError::NotApplicable("already before the previous node")),
    }
}

/// Per-session navigation state: the short-lived break flag.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    break_armed_at: Option<u64>,
}

impl NavigationState {
    /// Whether the event numbered `seq` sees the break flag. Only the event
    /// directly after the one that armed it does.
    pub fn after_break(&self, seq: u64) -> bool {
        self.break_armed_at
            .is_some_and(|armed| armed.checked_add(1) == Some(seq))
    }

    /// Plans an arrow press for key event `seq`. The flag is consumed
    /// whether or not a rule fires, and re-armed if the chosen move asks.
    pub fn plan(
        &mut self,
        tree: &Tree,
        caret: BoundaryPoint,
        direction: ArrowDirection,
        seq: u64,
        limits: &Limits,
    ) -> Result<NavMove, EditError> {
        let after_break = self.after_break(seq);
        self.break_armed_at = None;
        let planned = plan_navigation(tree, caret, direction, after_break, limits)?;
        if planned.arms_break_flag {
            self.break_armed_at = Some(seq);
        }
        log::debug!("arrow {direction:?} -> {:?} via {:?}", planned.target, planned.rule);
        Ok(planned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{EditingSurface, MemorySurface};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn surface(markup: &str) -> MemorySurface {
        MemorySurface::from_markup("contenteditable", markup).unwrap()
    }

    fn point(s: &MemorySurface, path: &[usize], offset: usize) -> BoundaryPoint {
        BoundaryPoint::new(s.node_at(path).unwrap(), offset)
    }

    fn plan(
        s: &MemorySurface,
        caret: BoundaryPoint,
        dir: ArrowDirection,
        after_break: bool,
    ) -> Result<NavMove, EditError> {
        plan_navigation(s.tree(), caret, dir, after_break, &Limits::default())
    }

    #[rstest]
    // end of plain text into the bold run
    #[case("<p>a<b>bold</b>c</p>", &[0, 0], 1, ArrowDirection::Right, &[0, 1, 0], 0)]
    // and back again
    #[case("<p>a<b>bold</b>c</p>", &[0, 1, 0], 0, ArrowDirection::Left, &[0, 0], 1)]
    // end of the bold run into the trailing text
    #[case("<p>a<b>bold</b>c</p>", &[0, 1, 0], 4, ArrowDirection::Right, &[0, 2], 0)]
    // start of trailing text back into the bold run
    #[case("<p>a<b>bold</b>c</p>", &[0, 2], 0, ArrowDirection::Left, &[0, 1, 0], 4)]
    // element container: into the first text of the child at the offset
    #[case("<p>a<b>bold</b>c</p>", &[0], 1, ArrowDirection::Right, &[0, 1, 0], 0)]
    // single-char step at offset 1
    #[case("<p>a<b>x</b></p>", &[0, 1, 0], 1, ArrowDirection::Left, &[0, 1, 0], 0)]
    // nested wrappers: dig to the innermost text
    #[case("<p>a<b><i>deep</i></b></p>", &[0, 0], 1, ArrowDirection::Right, &[0, 1, 0, 0], 0)]
    fn crosses_formatting_boundary(
        #[case] markup: &str,
        #[case] from: &[usize],
        #[case] offset: usize,
        #[case] dir: ArrowDirection,
        #[case] to: &[usize],
        #[case] to_offset: usize,
    ) {
        let s = surface(markup);
        let planned = plan(&s, point(&s, from, offset), dir, false).unwrap();
        assert_eq!(planned.target, point(&s, to, to_offset));
        assert!(!planned.arms_break_flag);
    }

    #[test]
    fn end_of_wrapper_before_another_wrapper_lands_between_them() {
        let s = surface("<p><b>x</b><i>y</i></p>");
        let planned = plan(&s, point(&s, &[0, 0, 0], 1), ArrowDirection::Right, false).unwrap();
        assert_eq!(planned.target, point(&s, &[0], 1));
    }

    #[rstest]
    #[case("<p>plain text</p>", &[0, 0], 10, ArrowDirection::Right)]
    #[case("<p>plain text</p>", &[0, 0], 0, ArrowDirection::Left)]
    #[case("<p>a<b>bold</b>c</p>", &[0, 1, 0], 2, ArrowDirection::Right)]
    #[case("<p>ab<b>bold</b></p>", &[0, 0], 1, ArrowDirection::Right)]
    #[case("<p>a<b>bold</b></p>", &[0, 0], 0, ArrowDirection::Left)]
    fn defers_to_host(
        #[case] markup: &str,
        #[case] from: &[usize],
        #[case] offset: usize,
        #[case] dir: ArrowDirection,
    ) {
        let s = surface(markup);
        assert!(matches!(
            plan(&s, point(&s, from, offset), dir, false),
            Err(EditError::NotApplicable(_))
        ));
    }

    #[test]
    fn steps_past_break_then_into_following_text() {
        let s = surface("<p><b>x</b><br>y</p>");
        let mut nav = NavigationState::default();
        let limits = Limits::default();

        let first = nav
            .plan(s.tree(), point(&s, &[0, 0, 0], 1), ArrowDirection::Right, 1, &limits)
            .unwrap();
        assert_eq!(first.rule, NavRule::PastBreak);
        assert_eq!(first.target, point(&s, &[0], 2));
        assert!(nav.after_break(2));

        let second = nav
            .plan(s.tree(), first.target, ArrowDirection::Right, 2, &limits)
            .unwrap();
        assert_eq!(second.rule, NavRule::AfterBreak);
        assert_eq!(second.target, point(&s, &[0, 2], 0));
        assert!(!nav.after_break(3));
    }

    #[test]
    fn break_flag_expires_after_one_event() {
        let s = surface("<p><b>x</b><br>y</p>");
        let mut nav = NavigationState::default();
        let limits = Limits::default();
        nav.plan(s.tree(), point(&s, &[0, 0, 0], 1), ArrowDirection::Right, 1, &limits)
            .unwrap();
        assert!(nav.after_break(2));
        assert!(!nav.after_break(3));
    }

    #[test]
    fn left_over_break_takes_two_presses() {
        let s = surface("<p>a<br><b>bold</b></p>");
        let mut nav = NavigationState::default();
        let limits = Limits::default();

        let first = nav
            .plan(s.tree(), point(&s, &[0, 2, 0], 0), ArrowDirection::Left, 1, &limits)
            .unwrap();
        assert_eq!(first.target, point(&s, &[0], 2));
        assert!(first.arms_break_flag);

        let second = nav
            .plan(s.tree(), first.target, ArrowDirection::Left, 2, &limits)
            .unwrap();
        assert_eq!(second.target, point(&s, &[0], 1));
        assert!(!second.arms_break_flag);
    }

    #[test]
    fn rtl_swaps_arrow_direction() {
        assert_eq!(
            ArrowDirection::Left.logical(TextDirection::Rtl),
            ArrowDirection::Right
        );
        assert_eq!(
            ArrowDirection::Left.logical(TextDirection::Ltr),
            ArrowDirection::Left
        );
    }

    #[test]
    fn stale_caret_is_rejected() {
        let s = surface("<p>ab</p>");
        assert_eq!(
            plan(&s, point(&s, &[0, 0], 9), ArrowDirection::Right, false),
            Err(EditError::StalePath)
        );
    }
}
