//! # Path Addressing
//!
//! A [`NodePath`] locates a node by the child indexes taken from the editable
//! root downwards. Unlike a [`NodeId`], a path survives the tree being torn
//! down and rebuilt from serialized content: as long as the new tree has the
//! same shape, the same path leads to the equivalent node.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dom::{NodeId, Tree};
use crate::traversal::{Step, Traversal, bounded_walk};

/// Root-relative child-index path. `indexes[0]` is the step taken directly
/// below the root; the root itself has the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath {
    indexes: Vec<usize>,
}

impl NodePath {
    pub fn new(indexes: Vec<usize>) -> Self {
        Self { indexes }
    }

    pub fn root() -> Self {
        Self::default()
    }

    /// Number of steps below the root.
    pub fn depth(&self) -> usize {
        self.indexes.len()
    }

    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.indexes.is_empty() {
            return f.write_str("/");
        }
        let joined: Vec<String> = self.indexes.iter().map(usize::to_string).collect();
        f.write_str(&joined.join("/"))
    }
}

impl FromStr for NodePath {
    type Err = std::num::ParseIntError;

    /// Parses `0/1/2`; `/` or an empty string is the root.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let indexes = trimmed
            .split('/')
            .map(|part| part.trim().parse())
            .collect::<Result<Vec<usize>, _>>()?;
        Ok(Self { indexes })
    }
}

/// Computes the path from the nearest ancestor marked `root_marker="true"`
/// down to `node`.
///
/// Unknown nodes, detached nodes and nodes with no marked ancestor are
/// [`Traversal::NotFound`]; climbs longer than `max_hops` are
/// [`Traversal::ExceededBound`].
pub fn compute_path(
    tree: &Tree,
    node: NodeId,
    root_marker: &str,
    max_hops: usize,
) -> Traversal<NodePath> {
    if !tree.exists(node) {
        return Traversal::NotFound;
    }

    let mut indexes = Vec::new();
    let walk = bounded_walk(node, max_hops, |current| {
        if tree.has_marker(current, root_marker) {
            return Step::Found;
        }
        match (tree.parent(current), tree.index_in_parent(current)) {
            (Some(parent), Some(index)) => {
                indexes.push(index);
                Step::Continue(parent)
            }
            _ => Step::Exhausted,
        }
    });

    walk.map(|_| {
        indexes.reverse();
        NodePath { indexes }
    })
}

/// Follows `path` down from `root`. A path that no longer fits the tree is
/// [`Traversal::NotFound`] (stale).
pub fn resolve_path(
    tree: &Tree,
    root: NodeId,
    path: &NodePath,
    max_steps: usize,
) -> Traversal<NodeId> {
    if path.depth() > max_steps {
        log::warn!(
            "path of depth {} exceeds the descent cap of {max_steps}",
            path.depth()
        );
        return Traversal::ExceededBound;
    }

    let mut depth = 0;
    bounded_walk(root, max_steps, |node| {
        let Some(&index) = path.indexes.get(depth) else {
            return Step::Found;
        };
        match tree.child(node, index) {
            Some(child) => {
                depth += 1;
                Step::Continue(child)
            }
            None => Step::Exhausted,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::markup::parse_into;
    use crate::options::{MAX_ANCESTOR_HOPS, MAX_DESCENT_STEPS};

    const MARKER: &str = "contenteditable";

    fn tree(markup: &str) -> Tree {
        let mut tree = Tree::with_root_marker(MARKER);
        parse_into(&mut tree, markup).unwrap();
        tree
    }

    fn all_nodes(tree: &Tree) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![tree.root()];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(tree.children(node).iter().rev());
        }
        out
    }

    #[test]
    fn every_node_round_trips() {
        let tree = tree(
            "<p>We hope&nbsp;<br><b><i>React</i><i> Controlled</i>&nbsp;<del>x</del></b>, end</p><p>2</p>",
        );
        for node in all_nodes(&tree) {
            let path = compute_path(&tree, node, MARKER, MAX_ANCESTOR_HOPS)
                .found()
                .expect("reachable node has a path");
            let resolved = resolve_path(&tree, tree.root(), &path, MAX_DESCENT_STEPS).found();
            assert_eq!(resolved, Some(node), "path {path} did not round-trip");
        }
    }

    #[test]
    fn root_has_empty_path() {
        let tree = tree("<p>x</p>");
        let path = compute_path(&tree, tree.root(), MARKER, MAX_ANCESTOR_HOPS);
        assert_eq!(path, Traversal::Found(NodePath::root()));
    }

    #[test]
    fn indexes_are_root_first() {
        let tree = tree("<p>a<b>bold</b></p>");
        let p = tree.child(tree.root(), 0).unwrap();
        let b = tree.child(p, 1).unwrap();
        let bold = tree.child(b, 0).unwrap();
        let path = compute_path(&tree, bold, MARKER, MAX_ANCESTOR_HOPS).found().unwrap();
        assert_eq!(path.indexes(), &[0, 1, 0]);
        assert_eq!(path.depth(), 3);
    }

    #[test]
    fn path_survives_rebuild_of_same_shape() {
        let mut tree = tree("<p>a<b>bold</b></p>");
        let bold = tree.child(tree.child(tree.child(tree.root(), 0).unwrap(), 1).unwrap(), 0).unwrap();
        let path = compute_path(&tree, bold, MARKER, MAX_ANCESTOR_HOPS).found().unwrap();

        parse_into(&mut tree, "<p>a<b>bold</b></p>").unwrap();
        let rebuilt = resolve_path(&tree, tree.root(), &path, MAX_DESCENT_STEPS)
            .found()
            .unwrap();
        assert_ne!(rebuilt, bold);
        assert_eq!(tree.text(rebuilt), Some("bold"));
    }

    #[test]
    fn stale_path_is_not_found() {
        let mut tree = tree("<p>a<b>bold</b></p>");
        let path = NodePath::new(vec![0, 1, 0]);
        parse_into(&mut tree, "<p>a</p>").unwrap();
        assert_eq!(
            resolve_path(&tree, tree.root(), &path, MAX_DESCENT_STEPS),
            Traversal::NotFound
        );
    }

    #[test]
    fn detached_and_unmarked_nodes_have_no_path() {
        let mut tree = tree("<p>a</p>");
        let p = tree.child(tree.root(), 0).unwrap();
        tree.remove(p).unwrap();
        let a = tree.child(p, 0).unwrap();
        assert_eq!(
            compute_path(&tree, a, MARKER, MAX_ANCESTOR_HOPS),
            Traversal::NotFound
        );
        assert_eq!(
            compute_path(&tree, a, "other-marker", MAX_ANCESTOR_HOPS),
            Traversal::NotFound
        );
    }

    #[test]
    fn caps_are_enforced() {
        let tree = tree("<p><b><i>deep</i></b></p>");
        let deep = resolve_path(&tree, tree.root(), &NodePath::new(vec![0, 0, 0, 0]), 10)
            .found()
            .unwrap();
        assert_eq!(compute_path(&tree, deep, MARKER, 3), Traversal::ExceededBound);
        assert!(compute_path(&tree, deep, MARKER, 4).found().is_some());
        assert_eq!(
            resolve_path(&tree, tree.root(), &NodePath::new(vec![0, 0, 0, 0]), 3),
            Traversal::ExceededBound
        );
    }

    #[test]
    fn display_and_parse() {
        let path = NodePath::new(vec![0, 12, 3]);
        assert_eq!(path.to_string(), "0/12/3");
        assert_eq!("0/12/3".parse::<NodePath>().unwrap(), path);
        assert_eq!("/".parse::<NodePath>().unwrap(), NodePath::root());
        assert_eq!(NodePath::root().to_string(), "/");
        assert!("0/x".parse::<NodePath>().is_err());
    }
}
