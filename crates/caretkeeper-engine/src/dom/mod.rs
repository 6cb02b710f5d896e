//! # Document Tree
//!
//! A small arena-backed mixed-content tree standing in for the live tree of
//! an editing surface. Nodes are addressed by copyable [`NodeId`] handles.
//!
//! ## Node lifetime
//!
//! Nodes are never freed. Removing a node detaches it (it loses its parent)
//! but its slot stays in the arena, so an old handle keeps resolving to the
//! old, now unreachable, node. This mirrors a real DOM where a reference to
//! a removed node stays valid but points outside the document. Code that
//! needs "is this still in the document?" asks [`Tree::contains`].
//!
//! ## Offsets
//!
//! Text offsets count Unicode scalar values (`char`s), not bytes. Element
//! offsets are child indexes. [`Tree::max_offset`] gives the upper bound for
//! either kind.

pub mod markup;
pub mod tags;

pub use tags::{InlineFormat, governing_format, is_void_tag};

/// Handle to a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An element's tag and attributes. Names are stored lower-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Text(String),
    Element(Element),
}

/// A detached description of a subtree, produced by the markup parser and
/// materialised with [`Tree::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSpec {
    Text(String),
    Element {
        element: Element,
        children: Vec<NodeSpec>,
    },
}

// Dropped level by level from a worklist; the derived drop would recurse
// once per nesting level.
impl Drop for NodeSpec {
    fn drop(&mut self) {
        let NodeSpec::Element { children, .. } = self else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(mut spec) = pending.pop() {
            if let NodeSpec::Element { children, .. } = &mut spec {
                pending.append(children);
            }
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),
    #[error("Node {0:?} is not a text node")]
    NotText(NodeId),
    #[error("Inserting {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena tree with a single root element.
#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Slot>,
    root: NodeId,
}

impl Tree {
    /// Creates a tree whose root is the given element.
    pub fn new(root: Element) -> Self {
        Self {
            slots: vec![Slot {
                data: NodeData::Element(root),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    /// Creates a `<div marker="true">` root, the usual editable root.
    pub fn with_root_marker(marker: &str) -> Self {
        Self::new(Element::new("div").with_attribute(marker, "true"))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.0)
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut Slot, TreeError> {
        self.slots.get_mut(id.0).ok_or(TreeError::UnknownNode(id))
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.slot(id).map(|slot| &slot.data)
    }

    pub fn exists(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), Some(NodeData::Text(_)))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.data(id), Some(NodeData::Element(_)))
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id)? {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag.as_str())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attribute(name)
    }

    /// True when `id` is an element whose `marker` attribute is `"true"`.
    pub fn has_marker(&self, id: NodeId, marker: &str) -> bool {
        self.attribute(id, marker) == Some("true")
    }

    pub fn is_line_break(&self, id: NodeId) -> bool {
        self.tag(id) == Some("br")
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    /// Text length in chars; zero for elements and unknown nodes.
    pub fn text_len(&self, id: NodeId) -> usize {
        self.text(id).map_or(0, |text| text.chars().count())
    }

    /// Largest valid boundary offset inside `id`.
    pub fn max_offset(&self, id: NodeId) -> usize {
        match self.data(id) {
            Some(NodeData::Text(text)) => text.chars().count(),
            Some(NodeData::Element(_)) => self.children(id).len(),
            None => 0,
        }
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    // Walks with an explicit stack; every node is visited once, so depth
    // costs heap rather than call stack.
    fn collect_text(&self, id: NodeId, out: &mut String) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            match self.data(id) {
                Some(NodeData::Text(text)) => out.push_str(text),
                Some(NodeData::Element(_)) => pending.extend(self.children(id).iter().rev()),
                None => {}
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map_or(&[], |slot| slot.children.as_slice())
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index.checked_sub(1).and_then(|i| self.child(parent, i))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.child(parent, index + 1)
    }

    /// True when `node` is `ancestor` or lies below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        // Parent links cannot cycle (insert_child refuses), so this ends.
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Allocates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    /// Allocates a detached, childless element.
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.alloc(NodeData::Element(element))
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Materialises a [`NodeSpec`] as a detached subtree.
    ///
    /// Iterative like `collect_text`: nesting depth in parsed input is
    /// unbounded, so it must not turn into recursion depth.
    pub fn build(&mut self, spec: &NodeSpec) -> NodeId {
        let top = self.alloc_spec(spec);
        let mut pending = vec![(spec, top)];
        while let Some((spec, id)) = pending.pop() {
            let NodeSpec::Element { children, .. } = spec else {
                continue;
            };
            for child in children {
                let child_id = self.alloc_spec(child);
                self.slots[child_id.0].parent = Some(id);
                self.slots[id.0].children.push(child_id);
                pending.push((child, child_id));
            }
        }
        top
    }

    fn alloc_spec(&mut self, spec: &NodeSpec) -> NodeId {
        match spec {
            NodeSpec::Text(text) => self.create_text(text.clone()),
            NodeSpec::Element { element, .. } => self.create_element(element.clone()),
        }
    }

    /// Inserts `child` at `index` among `parent`'s children, detaching it
    /// from any previous parent first. The index is clamped to the end.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), TreeError> {
        if !self.is_element(parent) {
            return Err(if self.exists(parent) {
                TreeError::NotAnElement(parent)
            } else {
                TreeError::UnknownNode(parent)
            });
        }
        if !self.exists(child) {
            return Err(TreeError::UnknownNode(child));
        }
        if self.contains(child, parent) {
            return Err(TreeError::WouldCycle { parent, child });
        }

        // Detaching from the same parent shifts later indexes down by one.
        let mut index = index;
        if self.parent(child) == Some(parent)
            && let Some(old) = self.index_in_parent(child)
            && old < index
        {
            index -= 1;
        }
        self.detach(child);

        let slot = self.slot_mut(parent)?;
        let index = index.min(slot.children.len());
        slot.children.insert(index, child);
        self.slot_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let end = self.children(parent).len();
        self.insert_child(parent, end, child)
    }

    /// Detaches `node` from its parent. Detaching a root or already detached
    /// node is a no-op.
    pub fn remove(&mut self, node: NodeId) -> Result<(), TreeError> {
        if !self.exists(node) {
            return Err(TreeError::UnknownNode(node));
        }
        self.detach(node);
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.slots[node.0].parent.take() {
            self.slots[parent.0].children.retain(|&child| child != node);
        }
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) -> Result<(), TreeError> {
        match &mut self.slot_mut(node)?.data {
            NodeData::Text(existing) => {
                *existing = text.into();
                Ok(())
            }
            NodeData::Element(_) => Err(TreeError::NotText(node)),
        }
    }

    /// Detaches every child of `parent` and appends `children` in order.
    pub fn replace_children(
        &mut self,
        parent: NodeId,
        children: Vec<NodeId>,
    ) -> Result<(), TreeError> {
        let old: Vec<NodeId> = self.children(parent).to_vec();
        for child in old {
            self.detach(child);
        }
        for child in children {
            self.append_child(parent, child)?;
        }
        Ok(())
    }
}

/// Byte index of the `char_offset`-th char in `text`, clamped to the end.
pub fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(index, _)| index)
}
