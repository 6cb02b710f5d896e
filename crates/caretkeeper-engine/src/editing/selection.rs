use crate::dom::{NodeId, Tree};

/// A position inside the live tree: a char offset into a text node or a
/// child index into an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    /// The position in `node`'s parent just before it.
    pub fn before(tree: &Tree, node: NodeId) -> Option<Self> {
        Some(Self::new(tree.parent(node)?, tree.index_in_parent(node)?))
    }

    /// The position in `node`'s parent just after it.
    pub fn after(tree: &Tree, node: NodeId) -> Option<Self> {
        Some(Self::new(tree.parent(node)?, tree.index_in_parent(node)? + 1))
    }

    /// The end of `node`: its text length or child count.
    pub fn end_of(tree: &Tree, node: NodeId) -> Self {
        Self::new(node, tree.max_offset(node))
    }

    /// True when the node exists and the offset does not overshoot it.
    pub fn is_valid(&self, tree: &Tree) -> bool {
        tree.exists(self.node) && self.offset <= tree.max_offset(self.node)
    }
}

/// The live selection: the editing surface's native range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorSpan {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl CursorSpan {
    pub fn new(start: BoundaryPoint, end: BoundaryPoint) -> Self {
        Self { start, end }
    }

    pub fn collapsed(at: BoundaryPoint) -> Self {
        Self { start: at, end: at }
    }

    /// Same container and same offset at both ends.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::markup::parse_into;

    #[test]
    fn before_and_after_use_parent_indexes() {
        let mut tree = Tree::with_root_marker("contenteditable");
        let nodes = parse_into(&mut tree, "a<br>b").unwrap();
        let br = nodes[1];
        assert_eq!(
            BoundaryPoint::before(&tree, br),
            Some(BoundaryPoint::new(tree.root(), 1))
        );
        assert_eq!(
            BoundaryPoint::after(&tree, br),
            Some(BoundaryPoint::new(tree.root(), 2))
        );
        assert_eq!(BoundaryPoint::before(&tree, tree.root()), None);
    }

    #[test]
    fn validity_checks_offset_bounds() {
        let mut tree = Tree::with_root_marker("contenteditable");
        let nodes = parse_into(&mut tree, "abc").unwrap();
        assert!(BoundaryPoint::new(nodes[0], 3).is_valid(&tree));
        assert!(!BoundaryPoint::new(nodes[0], 4).is_valid(&tree));
        assert_eq!(BoundaryPoint::end_of(&tree, nodes[0]).offset, 3);
    }

    #[test]
    fn collapsed_span() {
        let tree = Tree::with_root_marker("contenteditable");
        let point = BoundaryPoint::new(tree.root(), 0);
        assert!(CursorSpan::collapsed(point).is_collapsed());
        assert!(!CursorSpan::new(point, BoundaryPoint::new(tree.root(), 1)).is_collapsed());
    }
}
