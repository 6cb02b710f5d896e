use crate::traversal::{Step, Traversal, bounded_walk};

use super::{NodeId, Tree};

/// Inline formatting wrappers (and anchors) that a caret can sit just
/// inside or just outside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineFormat {
    Emphasis,
    Bold,
    Strong,
    Italic,
    Underline,
    Mark,
    Small,
    Deleted,
    Inserted,
    Subscript,
    Teletype,
    Big,
    Anchor,
}

impl InlineFormat {
    pub const ALL: [InlineFormat; 13] = [
        InlineFormat::Emphasis,
        InlineFormat::Bold,
        InlineFormat::Strong,
        InlineFormat::Italic,
        InlineFormat::Underline,
        InlineFormat::Mark,
        InlineFormat::Small,
        InlineFormat::Deleted,
        InlineFormat::Inserted,
        InlineFormat::Subscript,
        InlineFormat::Teletype,
        InlineFormat::Big,
        InlineFormat::Anchor,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.tag().eq_ignore_ascii_case(tag))
    }

    pub fn tag(self) -> &'static str {
        match self {
            InlineFormat::Emphasis => "em",
            InlineFormat::Bold => "b",
            InlineFormat::Strong => "strong",
            InlineFormat::Italic => "i",
            InlineFormat::Underline => "u",
            InlineFormat::Mark => "mark",
            InlineFormat::Small => "small",
            InlineFormat::Deleted => "del",
            InlineFormat::Inserted => "ins",
            InlineFormat::Subscript => "sub",
            InlineFormat::Teletype => "tt",
            InlineFormat::Big => "big",
            InlineFormat::Anchor => "a",
        }
    }
}

/// Elements that never have children or a closing tag.
pub fn is_void_tag(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img" | "input" | "wbr")
}

impl Tree {
    /// True for elements drawn from [`InlineFormat`].
    pub fn is_inline_format(&self, id: NodeId) -> bool {
        self.tag(id).and_then(InlineFormat::from_tag).is_some()
    }
}

/// The outermost element of the run of formatting wrappers governing `node`.
///
/// The run starts at `node` itself when it is a formatting element, otherwise
/// at its parent, and climbs while the next parent is also a formatting
/// element. The tree root never takes part.
pub fn governing_format(tree: &Tree, node: NodeId, max_hops: usize) -> Option<NodeId> {
    let is_format = |id: NodeId| id != tree.root() && tree.is_inline_format(id);

    let start = if is_format(node) {
        node
    } else {
        tree.parent(node).filter(|&parent| is_format(parent))?
    };

    let walk = bounded_walk(start, max_hops, |current| match tree.parent(current) {
        Some(parent) if is_format(parent) => Step::Continue(parent),
        _ => Step::Found,
    });
    match walk {
        Traversal::Found(outermost) => Some(outermost),
        Traversal::NotFound | Traversal::ExceededBound => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::markup::parse_into;
    use rstest::rstest;

    #[rstest]
    #[case("b", Some(InlineFormat::Bold))]
    #[case("STRONG", Some(InlineFormat::Strong))]
    #[case("a", Some(InlineFormat::Anchor))]
    #[case("tt", Some(InlineFormat::Teletype))]
    #[case("span", None)]
    #[case("br", None)]
    fn recognises_format_tags(#[case] tag: &str, #[case] expected: Option<InlineFormat>) {
        assert_eq!(InlineFormat::from_tag(tag), expected);
    }

    #[test]
    fn governing_format_climbs_nested_run() {
        let mut tree = Tree::with_root_marker("contenteditable");
        parse_into(&mut tree, "<p>x<b><i>deep</i></b></p>").unwrap();
        let p = tree.child(tree.root(), 0).unwrap();
        let b = tree.child(p, 1).unwrap();
        let i = tree.child(b, 0).unwrap();
        let deep = tree.child(i, 0).unwrap();
        let x = tree.child(p, 0).unwrap();

        assert_eq!(governing_format(&tree, deep, 1000), Some(b));
        assert_eq!(governing_format(&tree, i, 1000), Some(b));
        assert_eq!(governing_format(&tree, b, 1000), Some(b));
        assert_eq!(governing_format(&tree, x, 1000), None);
        assert_eq!(governing_format(&tree, p, 1000), None);
    }

    #[test]
    fn format_directly_under_root_still_governs() {
        let mut tree = Tree::with_root_marker("contenteditable");
        parse_into(&mut tree, "<b>bold</b>").unwrap();
        let b = tree.child(tree.root(), 0).unwrap();
        let text = tree.child(b, 0).unwrap();
        assert_eq!(governing_format(&tree, text, 1000), Some(b));
    }

    #[test]
    fn governing_format_gives_up_past_the_cap() {
        let mut tree = Tree::with_root_marker("contenteditable");
        parse_into(&mut tree, "<b><i><u>t</u></i></b>").unwrap();
        let b = tree.child(tree.root(), 0).unwrap();
        let i = tree.child(b, 0).unwrap();
        let u = tree.child(i, 0).unwrap();
        let t = tree.child(u, 0).unwrap();
        assert_eq!(governing_format(&tree, t, 1), None);
        assert_eq!(governing_format(&tree, t, 2), Some(b));
    }
}
