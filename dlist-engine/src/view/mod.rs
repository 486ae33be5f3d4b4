//! The nested view
//!
//!     An arena tree standing in for the rendered document. Lists render as `dl` containers
//!     holding `dt`/`dd` item elements; an item's nested lists are `dl` children placed after its
//!     inline content. Decorative UI elements may sit anywhere and have no model length.
//!
//!     Nodes are never freed while something may still point at them: a detached node keeps its
//!     subtree so converters can move parts of a removed item elsewhere before discarding it.

pub mod writer;

use std::collections::BTreeMap;

pub use writer::ViewWriter;

pub const ROOT_NAME: &str = "$root";
pub const CONTAINER_TAG: &str = "dl";
pub const TERM_TAG: &str = "dt";
pub const VALUE_TAG: &str = "dd";
pub const TYPE_ATTRIBUTE: &str = "data-list-type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNodeKind {
    Element {
        name: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
    /// Decorative element owned by the editing UI
    Ui { name: String },
}

#[derive(Debug, Clone)]
struct ViewNode {
    kind: ViewNodeKind,
    parent: Option<ViewId>,
    children: Vec<ViewId>,
}

/// A position between two children of `parent`, or a character offset when `parent` is a text
/// node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewPosition {
    pub parent: ViewId,
    pub offset: usize,
}

impl ViewPosition {
    pub fn new(parent: ViewId, offset: usize) -> Self {
        ViewPosition { parent, offset }
    }
}

/// Owned structural copy of a subtree, for comparisons and dumps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTree {
    pub kind: ViewNodeKind,
    pub children: Vec<ViewTree>,
}

#[derive(Debug, Clone)]
pub struct ViewDocument {
    nodes: Vec<Option<ViewNode>>,
    root: ViewId,
}

impl Default for ViewDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewDocument {
    pub fn new() -> Self {
        let root = ViewNode {
            kind: ViewNodeKind::Element {
                name: ROOT_NAME.to_string(),
                attributes: BTreeMap::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        ViewDocument {
            nodes: vec![Some(root)],
            root: ViewId(0),
        }
    }

    pub fn root(&self) -> ViewId {
        self.root
    }

    pub fn create_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> ViewId {
        let attributes = attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.alloc(ViewNodeKind::Element {
            name: name.to_string(),
            attributes,
        })
    }

    pub fn create_text(&mut self, text: &str) -> ViewId {
        self.alloc(ViewNodeKind::Text(text.to_string()))
    }

    pub fn create_ui(&mut self, name: &str) -> ViewId {
        self.alloc(ViewNodeKind::Ui {
            name: name.to_string(),
        })
    }

    fn alloc(&mut self, kind: ViewNodeKind) -> ViewId {
        self.nodes.push(Some(ViewNode {
            kind,
            parent: None,
            children: Vec::new(),
        }));
        ViewId(self.nodes.len() - 1)
    }

    fn node(&self, id: ViewId) -> Option<&ViewNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: ViewId) -> Option<&mut ViewNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn exists(&self, id: ViewId) -> bool {
        self.node(id).is_some()
    }

    pub fn kind(&self, id: ViewId) -> Option<&ViewNodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    /// Element name, for elements only.
    pub fn name(&self, id: ViewId) -> Option<&str> {
        match self.kind(id)? {
            ViewNodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attribute(&self, id: ViewId, key: &str) -> Option<&str> {
        match self.kind(id)? {
            ViewNodeKind::Element { attributes, .. } => attributes.get(key).map(String::as_str),
            _ => None,
        }
    }

    pub fn attributes(&self, id: ViewId) -> Option<&BTreeMap<String, String>> {
        match self.kind(id)? {
            ViewNodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    pub fn text(&self, id: ViewId) -> Option<&str> {
        match self.kind(id)? {
            ViewNodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_container(&self, id: ViewId) -> bool {
        self.name(id) == Some(CONTAINER_TAG)
    }

    pub fn is_item(&self, id: ViewId) -> bool {
        matches!(self.name(id), Some(TERM_TAG) | Some(VALUE_TAG))
    }

    pub fn is_ui(&self, id: ViewId) -> bool {
        matches!(self.kind(id), Some(ViewNodeKind::Ui { .. }))
    }

    pub fn is_text(&self, id: ViewId) -> bool {
        matches!(self.kind(id), Some(ViewNodeKind::Text(_)))
    }

    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: ViewId) -> &[ViewId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn child(&self, id: ViewId, index: usize) -> Option<ViewId> {
        self.children(id).get(index).copied()
    }

    pub fn child_count(&self, id: ViewId) -> usize {
        self.children(id).len()
    }

    pub fn index_in_parent(&self, id: ViewId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn previous_sibling(&self, id: ViewId) -> Option<ViewId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index.checked_sub(1).and_then(|i| self.child(parent, i))
    }

    pub fn next_sibling(&self, id: ViewId) -> Option<ViewId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.child(parent, index + 1)
    }

    /// Ancestors from the root down to the direct parent.
    pub fn ancestors(&self, id: ViewId) -> Vec<ViewId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            result.push(p);
            current = self.parent(p);
        }
        result.reverse();
        result
    }

    pub fn is_attached(&self, id: ViewId) -> bool {
        id == self.root || self.ancestors(id).first() == Some(&self.root)
    }

    /// Node right after a position, when the position is between children.
    pub fn node_after(&self, position: ViewPosition) -> Option<ViewId> {
        if self.is_text(position.parent) {
            return None;
        }
        self.child(position.parent, position.offset)
    }

    pub fn node_before(&self, position: ViewPosition) -> Option<ViewId> {
        if self.is_text(position.parent) {
            return None;
        }
        position
            .offset
            .checked_sub(1)
            .and_then(|i| self.child(position.parent, i))
    }

    /// Next node in document order (pre-order), entering children first.
    pub fn next_in_order(&self, id: ViewId) -> Option<ViewId> {
        if let Some(&first) = self.children(id).first() {
            return Some(first);
        }
        let mut current = id;
        loop {
            if let Some(next) = self.next_sibling(current) {
                return Some(next);
            }
            current = self.parent(current)?;
        }
    }

    /// Pre-order list of the descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: ViewId) -> Vec<ViewId> {
        let mut result = Vec::new();
        let mut stack: Vec<ViewId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Text content of a subtree, UI elements excluded.
    pub fn text_content(&self, id: ViewId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.text(d))
            .collect()
    }

    pub fn tree(&self, id: ViewId) -> Option<ViewTree> {
        let node = self.node(id)?;
        Some(ViewTree {
            kind: node.kind.clone(),
            children: node.children.iter().filter_map(|&c| self.tree(c)).collect(),
        })
    }

    pub(crate) fn set_name(&mut self, id: ViewId, new_name: &str) {
        if let Some(ViewNodeKind::Element { name, .. }) = self.node_mut(id).map(|n| &mut n.kind) {
            *name = new_name.to_string();
        }
    }

    pub(crate) fn set_attribute(&mut self, id: ViewId, key: &str, value: &str) {
        if let Some(ViewNodeKind::Element { attributes, .. }) =
            self.node_mut(id).map(|n| &mut n.kind)
        {
            attributes.insert(key.to_string(), value.to_string());
        }
    }

    pub(crate) fn remove_attribute(&mut self, id: ViewId, key: &str) {
        if let Some(ViewNodeKind::Element { attributes, .. }) =
            self.node_mut(id).map(|n| &mut n.kind)
        {
            attributes.remove(key);
        }
    }

    pub(crate) fn set_text(&mut self, id: ViewId, value: &str) {
        if let Some(ViewNodeKind::Text(text)) = self.node_mut(id).map(|n| &mut n.kind) {
            *text = value.to_string();
        }
    }

    /// Attaches a detached node. `index` is clamped to the child count.
    pub(crate) fn insert_child(&mut self, parent: ViewId, index: usize, child: ViewId) {
        self.detach(child);
        let Some(node) = self.node_mut(parent) else {
            return;
        };
        let index = index.min(node.children.len());
        node.children.insert(index, child);
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Removes a node from its parent, keeping its subtree.
    pub(crate) fn detach(&mut self, id: ViewId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    /// Frees a detached subtree.
    pub(crate) fn discard(&mut self, id: ViewId) {
        if id == self.root {
            return;
        }
        self.detach(id);
        for node in self.descendants(id) {
            self.nodes[node.0] = None;
        }
        self.nodes[id.0] = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ViewDocument, ViewId, ViewId, ViewId) {
        let mut view = ViewDocument::new();
        let dl = view.create_element(CONTAINER_TAG, &[(TYPE_ATTRIBUTE, "term")]);
        let dt = view.create_element(TERM_TAG, &[]);
        let text = view.create_text("a");
        view.insert_child(view.root(), 0, dl);
        view.insert_child(dl, 0, dt);
        view.insert_child(dt, 0, text);
        (view, dl, dt, text)
    }

    #[test]
    fn test_ancestors_are_root_first() {
        let (view, dl, dt, text) = sample();
        assert_eq!(view.ancestors(text), vec![view.root(), dl, dt]);
        assert!(view.is_attached(text));
    }

    #[test]
    fn test_next_in_order_walks_preorder() {
        let (mut view, dl, dt, text) = sample();
        let p = view.create_element("p", &[]);
        view.insert_child(view.root(), 1, p);
        assert_eq!(view.next_in_order(view.root()), Some(dl));
        assert_eq!(view.next_in_order(dl), Some(dt));
        assert_eq!(view.next_in_order(dt), Some(text));
        assert_eq!(view.next_in_order(text), Some(p));
        assert_eq!(view.next_in_order(p), None);
    }

    #[test]
    fn test_detach_keeps_subtree() {
        let (mut view, dl, dt, text) = sample();
        view.detach(dl);
        assert!(!view.is_attached(dt));
        assert_eq!(view.children(dt), &[text]);
        view.discard(dl);
        assert!(!view.exists(text));
    }

    #[test]
    fn test_item_and_container_predicates() {
        let (view, dl, dt, text) = sample();
        assert!(view.is_container(dl));
        assert!(view.is_item(dt));
        assert!(!view.is_item(text));
        assert_eq!(view.text_content(dl), "a");
        assert_eq!(view.attribute(dl, TYPE_ATTRIBUTE), Some("term"));
    }
}
