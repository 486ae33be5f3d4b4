//! Structural primitives over the view tree
//!
//! Every primitive returns the position that stays meaningful after the rewrite; callers must
//! use the returned position instead of one computed before the call.

use tracing::trace;

use super::{ViewDocument, ViewId, ViewPosition, TYPE_ATTRIBUTE};

pub struct ViewWriter<'a> {
    view: &'a mut ViewDocument,
}

impl<'a> ViewWriter<'a> {
    pub fn new(view: &'a mut ViewDocument) -> Self {
        ViewWriter { view }
    }

    pub fn view(&self) -> &ViewDocument {
        self.view
    }

    pub fn position_before(&self, id: ViewId) -> Option<ViewPosition> {
        let parent = self.view.parent(id)?;
        let index = self.view.index_in_parent(id)?;
        Some(ViewPosition::new(parent, index))
    }

    pub fn position_after(&self, id: ViewId) -> Option<ViewPosition> {
        self.position_before(id).map(|p| ViewPosition::new(p.parent, p.offset + 1))
    }

    pub fn position_at_end(&self, id: ViewId) -> ViewPosition {
        ViewPosition::new(id, self.view.child_count(id))
    }

    /// Inserts a detached node; returns the position right after it.
    pub fn insert(&mut self, position: ViewPosition, node: ViewId) -> ViewPosition {
        let offset = position.offset.min(self.view.child_count(position.parent));
        self.view.insert_child(position.parent, offset, node);
        ViewPosition::new(position.parent, offset + 1)
    }

    /// Detaches a node, keeping its subtree alive.
    pub fn remove(&mut self, id: ViewId) {
        self.view.detach(id);
    }

    /// Moves a node to `position`; returns the position right after it.
    pub fn move_node(&mut self, id: ViewId, position: ViewPosition) -> ViewPosition {
        let mut offset = position.offset;
        if self.view.parent(id) == Some(position.parent) {
            if let Some(index) = self.view.index_in_parent(id) {
                if index < offset {
                    offset -= 1;
                }
            }
        }
        self.view.detach(id);
        self.insert(ViewPosition::new(position.parent, offset), id)
    }

    /// Splits the container at `position` in two.
    ///
    /// Returns a position between the halves in the container's parent. Breaking at either edge
    /// of the container only returns the position before or after it.
    pub fn break_container(&mut self, position: ViewPosition) -> ViewPosition {
        let container = position.parent;
        let Some(outer) = self.position_before(container) else {
            return position;
        };
        let count = self.view.child_count(container);
        if position.offset == 0 {
            return outer;
        }
        if position.offset >= count {
            return ViewPosition::new(outer.parent, outer.offset + 1);
        }

        let (name, attributes) = match self.view.kind(container) {
            Some(super::ViewNodeKind::Element { name, attributes }) => {
                (name.clone(), attributes.clone())
            }
            _ => return position,
        };
        let attributes: Vec<(&str, &str)> = attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let clone = self.view.create_element(&name, &attributes);
        let moved: Vec<ViewId> = self.view.children(container)[position.offset..].to_vec();
        for (i, child) in moved.into_iter().enumerate() {
            self.view.insert_child(clone, i, child);
        }
        self.view.insert_child(outer.parent, outer.offset + 1, clone);
        trace!(target: "dlist::view", ?container, offset = position.offset, "break container");
        ViewPosition::new(outer.parent, outer.offset + 1)
    }

    /// Merges the element before `position` with the element after it. The left element
    /// survives and receives the right one's children. Returns the position at the seam.
    pub fn merge_containers(&mut self, position: ViewPosition) -> Option<ViewPosition> {
        let left = self.view.node_before(position)?;
        let right = self.view.node_after(position)?;
        let seam = self.view.child_count(left);
        let moved: Vec<ViewId> = self.view.children(right).to_vec();
        for (i, child) in moved.into_iter().enumerate() {
            self.view.insert_child(left, seam + i, child);
        }
        self.view.discard(right);
        trace!(target: "dlist::view", ?left, "merge containers");
        Some(ViewPosition::new(left, seam))
    }

    pub fn rename(&mut self, id: ViewId, name: &str) {
        self.view.set_name(id, name);
    }

    pub fn set_attribute(&mut self, id: ViewId, key: &str, value: &str) {
        self.view.set_attribute(id, key, value);
    }

    pub fn remove_attribute(&mut self, id: ViewId, key: &str) {
        self.view.remove_attribute(id, key);
    }

    /// Replaces the inline text of an element, keeping any nested containers after it.
    pub fn set_inline_text(&mut self, id: ViewId, text: &str) {
        let existing = self
            .view
            .children(id)
            .iter()
            .copied()
            .find(|&c| self.view.is_text(c));
        match (existing, text.is_empty()) {
            (Some(node), true) => self.view.discard(node),
            (Some(node), false) => self.view.set_text(node, text),
            (None, true) => {}
            (None, false) => {
                let node = self.view.create_text(text);
                self.view.insert_child(id, 0, node);
            }
        }
    }

    /// Skips UI elements directly after `position`.
    pub fn position_after_ui_elements(&self, position: ViewPosition) -> ViewPosition {
        let mut offset = position.offset;
        while self
            .view
            .child(position.parent, offset)
            .is_some_and(|c| self.view.is_ui(c))
        {
            offset += 1;
        }
        ViewPosition::new(position.parent, offset)
    }

    /// Merges two adjacent list containers when they are compatible.
    ///
    /// Containers are compatible when both are `dl` elements with the same type attribute.
    /// Returns the seam position inside the surviving (left) container.
    pub fn merge_view_lists(
        &mut self,
        first: Option<ViewId>,
        second: Option<ViewId>,
    ) -> Option<ViewPosition> {
        let (first, second) = (first?, second?);
        if first == second
            || !self.view.is_container(first)
            || !self.view.is_container(second)
            || self.view.attribute(first, TYPE_ATTRIBUTE) != self.view.attribute(second, TYPE_ATTRIBUTE)
            || self.view.next_sibling(first) != Some(second)
        {
            return None;
        }
        let between = self.position_after(first)?;
        self.merge_containers(between)
    }

    pub fn discard(&mut self, id: ViewId) {
        self.view.discard(id);
    }
}
