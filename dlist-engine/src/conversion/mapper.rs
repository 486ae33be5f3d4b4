//! Position mapping between the flat model and the nested view
//!
//!     The generic mapping assumes one view element per model element, laid out in the same
//!     order. Lists break that assumption: a root offset right after an item may correspond to a
//!     point deep inside nested containers, and a point inside a container has no model parent
//!     of its own. [ListPositionMapper] resolves those cases; everything else goes through the
//!     generic mapping.
//!
//!     Overrides are consulted in registration order and the first one that returns `Some`
//!     claims the event.

use std::collections::HashMap;

use tracing::trace;

use crate::error::EngineError;
use crate::model::{ModelDocument, ModelParent, ModelPosition, NodeKey};
use crate::view::{ViewDocument, ViewId, ViewNodeKind, ViewPosition, TERM_TAG, VALUE_TAG};

/// Computes the model length of a bound view element.
pub type LengthCallback = fn(&Mapper, &ViewDocument, ViewId) -> usize;

/// Read-only state handed to overrides.
pub struct MappingContext<'a> {
    pub model: &'a ModelDocument,
    pub view: &'a ViewDocument,
    pub mapper: &'a Mapper,
}

pub trait PositionOverride {
    fn to_view(&self, ctx: &MappingContext<'_>, position: &ModelPosition) -> Option<ViewPosition>;

    fn to_model(&self, ctx: &MappingContext<'_>, position: &ViewPosition)
        -> Option<ModelPosition>;
}

pub struct Mapper {
    model_to_view: HashMap<NodeKey, ViewId>,
    view_to_model: HashMap<ViewId, NodeKey>,
    length_callbacks: HashMap<String, LengthCallback>,
    overrides: Vec<Box<dyn PositionOverride>>,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper {
    /// A mapper without overrides or length callbacks.
    pub fn new() -> Self {
        Mapper {
            model_to_view: HashMap::new(),
            view_to_model: HashMap::new(),
            length_callbacks: HashMap::new(),
            overrides: Vec::new(),
        }
    }

    /// A mapper set up for description lists.
    pub fn with_list_support() -> Self {
        let mut mapper = Mapper::new();
        mapper.register_model_length(TERM_TAG, item_model_length);
        mapper.register_model_length(VALUE_TAG, item_model_length);
        mapper.add_override(Box::new(ListPositionMapper));
        mapper
    }

    pub fn add_override(&mut self, position_override: Box<dyn PositionOverride>) {
        self.overrides.push(position_override);
    }

    pub fn register_model_length(&mut self, tag: &str, callback: LengthCallback) {
        self.length_callbacks.insert(tag.to_string(), callback);
    }

    pub fn bind(&mut self, key: NodeKey, view: ViewId) {
        if let Some(old) = self.model_to_view.insert(key, view) {
            self.view_to_model.remove(&old);
        }
        self.view_to_model.insert(view, key);
    }

    pub fn unbind_view(&mut self, view: ViewId) {
        if let Some(key) = self.view_to_model.remove(&view) {
            if self.model_to_view.get(&key) == Some(&view) {
                self.model_to_view.remove(&key);
            }
        }
    }

    /// Unbinds `root` and every bound element below it.
    pub fn unbind_subtree(&mut self, view: &ViewDocument, root: ViewId) {
        self.unbind_view(root);
        for node in view.descendants(root) {
            self.unbind_view(node);
        }
    }

    pub fn clear(&mut self) {
        self.model_to_view.clear();
        self.view_to_model.clear();
    }

    pub fn view_element(&self, key: NodeKey) -> Option<ViewId> {
        self.model_to_view.get(&key).copied()
    }

    pub fn model_element(&self, view: ViewId) -> Option<NodeKey> {
        self.view_to_model.get(&view).copied()
    }

    /// Number of model offsets a view node spans at the root.
    pub fn model_length(&self, view: &ViewDocument, id: ViewId) -> usize {
        match view.kind(id) {
            None | Some(ViewNodeKind::Text(_)) | Some(ViewNodeKind::Ui { .. }) => 0,
            Some(ViewNodeKind::Element { name, .. }) => {
                if self.model_element(id).is_some() {
                    match self.length_callbacks.get(name) {
                        Some(callback) => callback(self, view, id),
                        None => 1,
                    }
                } else {
                    view.children(id)
                        .iter()
                        .map(|&c| self.model_length(view, c))
                        .sum()
                }
            }
        }
    }

    pub fn to_view_position(
        &self,
        model: &ModelDocument,
        view: &ViewDocument,
        position: &ModelPosition,
    ) -> Result<ViewPosition, EngineError> {
        let ctx = MappingContext {
            model,
            view,
            mapper: self,
        };
        for position_override in &self.overrides {
            if let Some(mapped) = position_override.to_view(&ctx, position) {
                trace!(target: "dlist::mapper", ?position, ?mapped, "model→view override");
                return Ok(mapped);
            }
        }
        self.generic_to_view(model, view, position)
    }

    pub fn to_model_position(
        &self,
        model: &ModelDocument,
        view: &ViewDocument,
        position: &ViewPosition,
    ) -> Result<ModelPosition, EngineError> {
        let ctx = MappingContext {
            model,
            view,
            mapper: self,
        };
        for position_override in &self.overrides {
            if let Some(mapped) = position_override.to_model(&ctx, position) {
                trace!(target: "dlist::mapper", ?position, ?mapped, "view→model override");
                return Ok(mapped);
            }
        }
        self.generic_to_model(view, position)
    }

    fn generic_to_view(
        &self,
        model: &ModelDocument,
        view: &ViewDocument,
        position: &ModelPosition,
    ) -> Result<ViewPosition, EngineError> {
        match position.parent {
            ModelParent::Root => {
                let root = view.root();
                let mut reached = 0;
                for (index, &child) in view.children(root).iter().enumerate() {
                    if reached == position.offset {
                        return Ok(ViewPosition::new(root, index));
                    }
                    reached += self.model_length(view, child);
                }
                if reached == position.offset {
                    return Ok(ViewPosition::new(root, view.child_count(root)));
                }
                Err(EngineError::Unmappable(format!(
                    "root offset {} exceeds mapped length {reached}",
                    position.offset
                )))
            }
            ModelParent::Element(key) => {
                let element = self
                    .view_element(key)
                    .filter(|_| model.element(key).is_some())
                    .ok_or(EngineError::UnknownNode(key))?;
                Ok(text_position(view, element, position.offset))
            }
        }
    }

    fn generic_to_model(
        &self,
        view: &ViewDocument,
        position: &ViewPosition,
    ) -> Result<ModelPosition, EngineError> {
        let parent = position.parent;
        if view.is_text(parent) {
            let element = view
                .parent(parent)
                .ok_or_else(|| EngineError::Unmappable("detached text node".to_string()))?;
            let key = self.model_element(element).ok_or_else(|| {
                EngineError::Unmappable("text outside a mapped element".to_string())
            })?;
            let before: usize = view
                .children(element)
                .iter()
                .take_while(|&&c| c != parent)
                .filter_map(|&c| view.text(c))
                .map(|t| t.chars().count())
                .sum();
            return Ok(ModelPosition::inside(key, before + position.offset));
        }
        if parent == view.root() {
            let offset = view.children(parent)[..position.offset.min(view.child_count(parent))]
                .iter()
                .map(|&c| self.model_length(view, c))
                .sum();
            return Ok(ModelPosition::root(offset));
        }
        match self.model_element(parent) {
            Some(key) => {
                let offset = view.children(parent)[..position.offset.min(view.child_count(parent))]
                    .iter()
                    .filter_map(|&c| view.text(c))
                    .map(|t| t.chars().count())
                    .sum();
                Ok(ModelPosition::inside(key, offset))
            }
            None => Err(EngineError::Unmappable(format!(
                "view position inside unmapped element {:?}",
                view.name(parent)
            ))),
        }
    }
}

/// Maps a character offset inside a block to the view.
///
/// Offsets strictly inside a text node map into that node. Offsets on a text boundary map
/// between children of the element, right after the inline content, so that nested containers
/// can be inserted there.
fn text_position(view: &ViewDocument, element: ViewId, offset: usize) -> ViewPosition {
    let mut remaining = offset;
    let mut index = 0;
    for &child in view.children(element) {
        if view.is_container(child) {
            break;
        }
        if let Some(text) = view.text(child) {
            let len = text.chars().count();
            if remaining < len && remaining > 0 {
                return ViewPosition::new(child, remaining);
            }
            if remaining == 0 {
                return ViewPosition::new(element, index);
            }
            remaining -= len;
        }
        index += 1;
    }
    ViewPosition::new(element, index)
}

/// Model length of an item element: itself plus every item in its nested containers.
pub fn item_model_length(mapper: &Mapper, view: &ViewDocument, item: ViewId) -> usize {
    1 + view
        .children(item)
        .iter()
        .filter(|&&c| view.is_container(c))
        .map(|&c| mapper.model_length(view, c))
        .sum::<usize>()
}

/// Position mapping rules for nested description lists.
pub struct ListPositionMapper;

impl PositionOverride for ListPositionMapper {
    /// A root offset right after a list item lands before the next item element in document
    /// order, or right after the topmost container enclosing the item when that ends first.
    fn to_view(&self, ctx: &MappingContext<'_>, position: &ModelPosition) -> Option<ViewPosition> {
        if position.parent != ModelParent::Root {
            return None;
        }
        let before = ctx.model.list_item_at(position.offset.checked_sub(1)?)?;
        let view_item = ctx.mapper.view_element(before.key())?;
        let view = ctx.view;
        let topmost = view
            .ancestors(view_item)
            .into_iter()
            .find(|&a| view.is_container(a))?;

        let mut current = view.next_in_order(view_item);
        while let Some(node) = current {
            if !view.ancestors(node).contains(&topmost) {
                break;
            }
            if view.is_item(node) {
                let parent = view.parent(node)?;
                return Some(ViewPosition::new(parent, view.index_in_parent(node)?));
            }
            current = view.next_in_order(node);
        }
        let parent = view.parent(topmost)?;
        Some(ViewPosition::new(parent, view.index_in_parent(topmost)? + 1))
    }

    fn to_model(
        &self,
        ctx: &MappingContext<'_>,
        position: &ViewPosition,
    ) -> Option<ModelPosition> {
        let view = ctx.view;
        let parent = position.parent;

        if view.is_container(parent) {
            if let Some(after) = view.node_after(*position) {
                let key = ctx.mapper.model_element(after)?;
                return ctx.model.index_of(key).map(ModelPosition::root);
            }
            let before = view.node_before(*position)?;
            let key = ctx.mapper.model_element(before)?;
            let index = ctx.model.index_of(key)?;
            return Some(ModelPosition::root(
                index + ctx.mapper.model_length(view, before),
            ));
        }

        if view.is_item(parent) {
            let mut list = view.node_before(*position).filter(|&n| view.is_container(n))?;
            let key = ctx.mapper.model_element(parent)?;
            let index = ctx.model.index_of(key)?;
            let mut length = 1;
            loop {
                length += ctx.mapper.model_length(view, list);
                match view.previous_sibling(list) {
                    Some(previous) if view.is_container(previous) => list = previous,
                    _ => break,
                }
            }
            return Some(ModelPosition::root(index + length));
        }

        None
    }
}
