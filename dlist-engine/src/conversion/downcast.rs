//! Model → view conversion
//!
//!     Two entry points share one view shape:
//!
//!     - [render_model] builds the complete view from scratch through the list forest rebuild in
//!       `common`. The data pipeline and the consistency checks use it.
//!     - [Downcaster::convert] applies a batch's change log to an existing view with local
//!       surgery, so that unrelated parts of the view (and their UI decorations) survive edits.
//!
//! Surgery
//!
//!     Every list item lives in a container together with its same-level siblings of the same
//!     type. Handlers first isolate the item they touch by breaking its container right before
//!     and right after it, operate on the single-item container that results, and finally merge
//!     compatible neighbours back together. Merging is what keeps the incremental result equal to
//!     a fresh render: two adjacent `dl` containers with the same type attribute are always one
//!     container in a rendered view.
//!
//!     Entries are applied in log order against the final model. Entry positions refer to the
//!     state right after the previous entries, so everything before an entry's position is
//!     already in sync when it is handled.
//!
//! Resync
//!
//!     A batch with several entries can leave surgery looking at items whose own entries have
//!     not been handled yet. After the last entry every list run is compared against the forest
//!     the model implies, and a run that drifted is replaced by a fresh render of that run. The
//!     comparison is linear in the number of blocks, like the diff that produced the entries.
//!     A non-list block found out of place, or a surgery step that fails, falls back to a full
//!     render.

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use super::mapper::Mapper;
use crate::common::{build_forest, FlatItem, ListGroup, ListNode};
use crate::error::EngineError;
use crate::model::{
    AttributeKey, AttributeValue, Change, ElementName, ListAttributes, ListType, ModelDocument,
    ModelElement, ModelPosition, NodeKey,
};
use crate::view::{ViewDocument, ViewId, ViewPosition, ViewWriter, CONTAINER_TAG, TYPE_ATTRIBUTE};

/// Renders the whole model into `view`, replacing its content and the mapper's bindings.
pub fn render_model(model: &ModelDocument, view: &mut ViewDocument, mapper: &mut Mapper) {
    let root = view.root();
    for child in view.children(root).to_vec() {
        view.discard(child);
    }
    mapper.clear();

    let elements = model.elements();
    let mut index = 0;
    while index < elements.len() {
        if elements[index].list_entry().is_none() {
            let node = create_block_element(view, &elements[index]);
            mapper.bind(elements[index].key(), node);
            let end = view.child_count(root);
            view.insert_child(root, end, node);
            index += 1;
            continue;
        }

        let start = index;
        index = run_end(elements, start);
        for group in list_forest(&elements[start..index]) {
            let container = render_group(view, mapper, group);
            let end = view.child_count(root);
            view.insert_child(root, end, container);
        }
    }
}

/// End of the run of list items starting at `start`.
fn run_end(elements: &[ModelElement], start: usize) -> usize {
    elements[start..]
        .iter()
        .position(|e| e.list_entry().is_none())
        .map_or(elements.len(), |n| start + n)
}

fn list_forest(run: &[ModelElement]) -> Vec<ListGroup<&ModelElement>> {
    build_forest(run.iter().filter_map(|element| {
        let entry = element.list_entry()?;
        Some(FlatItem {
            list_type: entry.list_type,
            indent: entry.indent,
            payload: element,
        })
    }))
}

fn render_group(view: &mut ViewDocument, mapper: &mut Mapper, group: ListGroup<&ModelElement>) -> ViewId {
    let container = view.create_element(CONTAINER_TAG, &[(TYPE_ATTRIBUTE, group.list_type.as_str())]);
    for (index, node) in group.items.into_iter().enumerate() {
        let item = view.create_element(group.list_type.item_tag(), &[]);
        ViewWriter::new(view).set_inline_text(item, &node.payload.text);
        mapper.bind(node.payload.key(), item);
        for child in node.children {
            let nested = render_group(view, mapper, child);
            let end = view.child_count(item);
            view.insert_child(item, end, nested);
        }
        view.insert_child(container, index, item);
    }
    container
}

/// Tag used for a non-list block.
pub fn block_tag(name: ElementName) -> String {
    match name {
        ElementName::Heading(level) => format!("h{}", level.clamp(1, 6)),
        ElementName::Object => "figure".to_string(),
        ElementName::Paragraph | ElementName::ListItem => "p".to_string(),
    }
}

fn create_block_element(view: &mut ViewDocument, element: &ModelElement) -> ViewId {
    let node = view.create_element(&block_tag(element.name), &[]);
    ViewWriter::new(view).set_inline_text(node, &element.text);
    node
}

/// Applies change logs to an existing view.
pub struct Downcaster<'a> {
    model: &'a ModelDocument,
    view: &'a mut ViewDocument,
    mapper: &'a mut Mapper,
}

impl<'a> Downcaster<'a> {
    pub fn new(model: &'a ModelDocument, view: &'a mut ViewDocument, mapper: &'a mut Mapper) -> Self {
        Downcaster {
            model,
            view,
            mapper,
        }
    }

    /// Applies `changes` and leaves the view equal to a fresh render of the model.
    pub fn convert(&mut self, changes: &[Change]) -> Result<(), EngineError> {
        debug!(target: "dlist::downcast", entries = changes.len(), "converting change log");
        for change in changes {
            trace!(target: "dlist::downcast", ?change, "entry");
            if let Err(error) = self.apply(change) {
                warn!(target: "dlist::downcast", %error, "surgery failed, rendering from scratch");
                render_model(self.model, self.view, self.mapper);
                return Ok(());
            }
        }
        self.resync();
        Ok(())
    }

    fn apply(&mut self, change: &Change) -> Result<(), EngineError> {
        match change {
            Change::Insert { key, .. } => self.on_insert(*key),
            Change::Remove {
                position,
                key,
                name,
                attributes,
            } => self.on_remove(*position, *key, *name, attributes),
            Change::Attribute {
                position,
                key,
                attribute,
                old,
                ..
            } => self.on_attribute(*position, *key, *attribute, old.as_ref()),
            Change::Content { key, .. } => {
                self.on_content(*key);
                Ok(())
            }
        }
    }

    /// Walks the root in model order and re-renders whatever no longer matches.
    fn resync(&mut self) {
        let model = self.model;
        let elements = model.elements();
        let root = self.view.root();
        let mut cursor = 0;
        let mut index = 0;

        while index < elements.len() {
            cursor = skip_ui(self.view, root, cursor);
            let element = &elements[index];
            if element.list_entry().is_none() {
                let bound = self
                    .view
                    .child(root, cursor)
                    .and_then(|node| self.mapper.model_element(node));
                if bound != Some(element.key()) {
                    return self.render_all("block out of place");
                }
                cursor += 1;
                index += 1;
                continue;
            }

            let start = index;
            index = run_end(elements, start);
            let run = &elements[start..index];
            let groups = list_forest(run);
            let count = groups.len();
            if !self.run_in_place(cursor, &groups) && !self.replace_run(run, cursor, groups) {
                return self.render_all("list run out of place");
            }
            for _ in 0..count {
                cursor = skip_ui(self.view, root, cursor) + 1;
            }
        }

        if skip_ui(self.view, root, cursor) < self.view.child_count(root) {
            self.render_all("stray nodes after the last block");
        }
    }

    fn render_all(&mut self, reason: &str) {
        warn!(target: "dlist::downcast", reason, "rendering from scratch");
        render_model(self.model, self.view, self.mapper);
    }

    /// Whether the root children from `cursor` on render `groups`.
    fn run_in_place(&self, cursor: usize, groups: &[ListGroup<&ModelElement>]) -> bool {
        let root = self.view.root();
        let mut cursor = cursor;
        for group in groups {
            cursor = skip_ui(self.view, root, cursor);
            match self.view.child(root, cursor) {
                Some(node) if group_matches(self.view, self.mapper, node, group) => cursor += 1,
                _ => return false,
            }
        }
        true
    }

    /// Replaces the containers holding `run` with a fresh render at `cursor`.
    ///
    /// Refuses when those containers hold items of other runs or sit before `cursor`.
    fn replace_run(
        &mut self,
        run: &[ModelElement],
        cursor: usize,
        groups: Vec<ListGroup<&ModelElement>>,
    ) -> bool {
        let root = self.view.root();
        let keys: HashSet<NodeKey> = run.iter().map(|e| e.key()).collect();

        let mut tops: Vec<ViewId> = Vec::new();
        for element in run {
            let Some(node) = self.mapper.view_element(element.key()) else {
                continue;
            };
            let ancestors = self.view.ancestors(node);
            if ancestors.first() != Some(&root) {
                continue;
            }
            let top = ancestors.get(1).copied().unwrap_or(node);
            if !tops.contains(&top) {
                tops.push(top);
            }
        }

        let foreign = tops.iter().any(|&top| {
            !self.view.is_container(top)
                || self.view.index_in_parent(top).is_some_and(|i| i < cursor)
                || self.view.descendants(top).into_iter().any(|node| {
                    self.mapper
                        .model_element(node)
                        .is_some_and(|key| !keys.contains(&key))
                })
        });
        if foreign {
            return false;
        }

        for top in tops {
            self.mapper.unbind_subtree(self.view, top);
            self.view.discard(top);
        }
        let mut offset = skip_ui(self.view, root, cursor);
        for group in groups {
            let container = render_group(self.view, self.mapper, group);
            self.view.insert_child(root, offset, container);
            offset += 1;
        }
        debug!(target: "dlist::downcast", items = run.len(), "re-rendered list run");
        true
    }

    fn to_view(&self, position: &ModelPosition) -> Result<ViewPosition, EngineError> {
        self.mapper.to_view_position(self.model, self.view, position)
    }

    fn view_item(&self, key: NodeKey) -> Result<ViewId, EngineError> {
        self.mapper.view_element(key).ok_or(EngineError::UnknownNode(key))
    }

    fn on_insert(&mut self, key: NodeKey) -> Result<(), EngineError> {
        let model = self.model;
        let index = model.index_of(key).ok_or(EngineError::UnknownNode(key))?;
        let element = &model.elements()[index];

        match element.list_entry() {
            Some(entry) => {
                let container = self
                    .view
                    .create_element(CONTAINER_TAG, &[(TYPE_ATTRIBUTE, entry.list_type.as_str())]);
                let item = self.view.create_element(entry.list_type.item_tag(), &[]);
                let mut writer = ViewWriter::new(self.view);
                writer.set_inline_text(item, &element.text);
                writer.insert(ViewPosition::new(container, 0), item);
                self.mapper.bind(key, item);
                self.inject_view_list(index, item)
            }
            None => {
                self.split_lists_at(index)?;
                let position = self.to_view(&ModelPosition::root(index))?;
                let node = create_block_element(self.view, element);
                let mut writer = ViewWriter::new(self.view);
                let position = writer.position_after_ui_elements(position);
                writer.insert(position, node);
                self.mapper.bind(key, node);
                Ok(())
            }
        }
    }

    fn on_remove(
        &mut self,
        position: usize,
        key: NodeKey,
        name: ElementName,
        attributes: &ListAttributes,
    ) -> Result<(), EngineError> {
        let Some(view_node) = self.mapper.view_element(key) else {
            return Ok(());
        };

        if name.is_list_item() && self.view.is_item(view_node) {
            let (container, remove_start) = self.detach_item(view_node)?;
            let old_indent = attributes.list_indent.unwrap_or(0);
            self.hoist_nested_lists(old_indent + 1, position, remove_start, view_node)?;
            self.mapper.unbind_subtree(self.view, container);
            self.view.discard(container);
            return Ok(());
        }

        self.mapper.unbind_subtree(self.view, view_node);
        self.view.discard(view_node);
        let mapped = self.to_view(&ModelPosition::root(position))?;
        let mut writer = ViewWriter::new(self.view);
        let (before, after) = (writer.view().node_before(mapped), writer.view().node_after(mapped));
        writer.merge_view_lists(before, after);
        Ok(())
    }

    fn on_attribute(
        &mut self,
        position: usize,
        key: NodeKey,
        attribute: AttributeKey,
        old: Option<&AttributeValue>,
    ) -> Result<(), EngineError> {
        let model = self.model;
        let Some(element) = model.element(key).filter(|e| e.list_entry().is_some()) else {
            return Ok(());
        };
        let Some(view_item) = self.mapper.view_element(key).filter(|&v| self.view.is_item(v)) else {
            return Ok(());
        };

        match attribute {
            AttributeKey::ListType => self.change_type(element, view_item),
            AttributeKey::ListIndent => {
                let old_indent = match old {
                    Some(AttributeValue::Indent(i)) => *i,
                    _ => 0,
                };
                self.change_indent(position, old_indent, view_item)
            }
            AttributeKey::ListItemId => Ok(()),
        }
    }

    fn on_content(&mut self, key: NodeKey) {
        let (Some(element), Some(node)) = (self.model.element(key), self.mapper.view_element(key))
        else {
            return;
        };
        let text = element.text.clone();
        ViewWriter::new(self.view).set_inline_text(node, &text);
    }

    /// Retags the item's container and the item element, then re-merges around it.
    fn change_type(&mut self, element: &ModelElement, view_item: ViewId) -> Result<(), EngineError> {
        let Some(entry) = element.list_entry() else {
            return Ok(());
        };
        let mut writer = ViewWriter::new(self.view);
        isolate(&mut writer, view_item);
        let Some(container) = writer.view().parent(view_item) else {
            return Ok(());
        };
        writer.set_attribute(container, TYPE_ATTRIBUTE, entry.list_type.as_str());
        writer.rename(view_item, entry.list_type.item_tag());
        merge_around(&mut writer, container);
        debug!(target: "dlist::downcast", key = %element.key(), list_type = %entry.list_type, "retagged item");
        Ok(())
    }

    /// Takes the item out like a removal, then puts it back like an insertion.
    fn change_indent(
        &mut self,
        position: usize,
        old_indent: usize,
        view_item: ViewId,
    ) -> Result<(), EngineError> {
        let (_, remove_start) = self.detach_item(view_item)?;
        self.hoist_nested_lists(old_indent + 1, position, remove_start, view_item)?;
        self.inject_view_list(position, view_item)
    }

    /// Isolates an item in its own container and detaches that container from the view.
    ///
    /// Returns the detached container and the position it was removed from.
    fn detach_item(&mut self, view_item: ViewId) -> Result<(ViewId, ViewPosition), EngineError> {
        let mut writer = ViewWriter::new(self.view);
        isolate(&mut writer, view_item);
        let container = writer
            .view()
            .parent(view_item)
            .ok_or_else(|| EngineError::Unmappable("list item without container".to_string()))?;
        let remove_start = writer
            .position_before(container)
            .ok_or_else(|| EngineError::Unmappable("detached list container".to_string()))?;
        let previous = writer.view().previous_sibling(container);

        writer.remove(container);
        if let Some(previous) = previous {
            let next = writer.view().next_sibling(previous);
            writer.merge_view_lists(Some(previous), next);
        }
        let limit = writer.view().child_count(remove_start.parent);
        Ok((
            container,
            ViewPosition::new(remove_start.parent, remove_start.offset.min(limit)),
        ))
    }

    /// Moves the nested containers of a removed (or re-indented) item to where their items now
    /// belong.
    ///
    /// The destination depends on the closest preceding item with an indent of at most
    /// `next_indent`: after its container when it is a sibling of the moved items, at the end of
    /// its content when it is their new parent, and the removal point when there is none.
    fn hoist_nested_lists(
        &mut self,
        next_indent: usize,
        model_position: usize,
        remove_start: ViewPosition,
        removed_item: ViewId,
    ) -> Result<(), EngineError> {
        let model = self.model;
        let anchor = sibling_list_item(model, model_position.checked_sub(1), next_indent, true, true);

        let mut insert_position = match anchor {
            None => remove_start,
            Some(index) => {
                let element = &model.elements()[index];
                let view_anchor = self.view_item(element.key())?;
                if element.indent() == next_indent {
                    let container = self
                        .view
                        .parent(view_anchor)
                        .ok_or(EngineError::UnknownNode(element.key()))?;
                    ViewWriter::new(self.view)
                        .position_after(container)
                        .ok_or(EngineError::UnknownNode(element.key()))?
                } else {
                    let end = ModelPosition::inside(element.key(), element.text_len());
                    self.to_view(&end)?
                }
            }
        };

        let mut writer = ViewWriter::new(self.view);
        insert_position = writer.position_after_ui_elements(insert_position);
        let nested: Vec<ViewId> = writer
            .view()
            .children(removed_item)
            .iter()
            .copied()
            .filter(|&c| writer.view().is_container(c))
            .collect();
        for container in nested {
            trace!(target: "dlist::downcast", ?container, ?insert_position, "hoisting nested list");
            writer.move_node(container, insert_position);
            let survivor = merge_around(&mut writer, container);
            match writer.position_after(survivor) {
                Some(after) => insert_position = after,
                None => break,
            }
        }
        Ok(())
    }

    /// Places a single-item container holding `view_item` at the right spot and adopts the
    /// deeper items that now belong under it.
    fn inject_view_list(&mut self, index: usize, view_item: ViewId) -> Result<(), EngineError> {
        let model = self.model;
        let Some(element) = model.get(index) else {
            return Ok(());
        };
        let indent = element.indent();
        let container = self
            .view
            .parent(view_item)
            .ok_or(EngineError::UnknownNode(element.key()))?;
        let previous = index
            .checked_sub(1)
            .and_then(|i| model.list_item_at(i));
        let reference = sibling_list_item(model, index.checked_sub(1), indent, true, true)
            .map(|i| &model.elements()[i])
            .filter(|r| r.indent() == indent);

        let insert_position = if let Some(reference) = reference {
            let view_reference = self.view_item(reference.key())?;
            let mut writer = ViewWriter::new(self.view);
            let after = writer
                .position_after(view_reference)
                .ok_or(EngineError::UnknownNode(reference.key()))?;
            writer.break_container(after)
        } else if let Some(previous) = previous {
            let view_previous = self.view_item(previous.key())?;
            let writer = ViewWriter::new(self.view);
            match first_nested_container(writer.view(), view_previous) {
                Some(nested) => writer
                    .position_before(nested)
                    .ok_or(EngineError::UnknownNode(previous.key()))?,
                None => writer.position_at_end(view_previous),
            }
        } else {
            self.to_view(&ModelPosition::root(index))?
        };

        let mut writer = ViewWriter::new(self.view);
        let insert_position = writer.position_after_ui_elements(insert_position);
        writer.insert(insert_position, container);

        if let Some(previous) = previous {
            // Deeper items that followed the previous item now follow this one.
            let view_previous = self.view_item(previous.key())?;
            let mut writer = ViewWriter::new(self.view);
            while let Some(found) = next_item_between(writer.view(), view_previous, container) {
                let Some(before) = writer.position_before(found) else {
                    break;
                };
                writer.break_container(before);
                let Some(sub_list) = writer.view().parent(found) else {
                    break;
                };
                let target = writer.position_at_end(view_item);
                writer.move_node(sub_list, target);
                let previous_sibling = writer.view().previous_sibling(sub_list);
                writer.merge_view_lists(previous_sibling, Some(sub_list));
            }
        }
        self.adopt_next_list(container, view_item, indent);

        let mut writer = ViewWriter::new(self.view);
        merge_around(&mut writer, container);
        debug!(target: "dlist::downcast", key = %element.key(), indent, "injected list item");
        Ok(())
    }

    /// Moves the leading items of the container after `container` that are deeper than
    /// `indent` to the end of `view_item`.
    ///
    /// That container is the previous item's nested list when the item was placed inside its
    /// previous item, and the next top-level list otherwise.
    fn adopt_next_list(&mut self, container: ViewId, view_item: ViewId, indent: usize) {
        let model = self.model;
        let mut writer = ViewWriter::new(self.view);
        let Some(next_list) = writer
            .view()
            .next_sibling(container)
            .filter(|&n| writer.view().is_container(n))
        else {
            return;
        };

        let mut last_deeper = None;
        for &child in writer.view().children(next_list) {
            if writer.view().is_ui(child) {
                continue;
            }
            let deeper = self
                .mapper
                .model_element(child)
                .and_then(|key| model.element(key))
                .is_some_and(|e| e.is_list_item() && e.indent() > indent);
            if !deeper {
                break;
            }
            last_deeper = Some(child);
        }
        let Some(after) = last_deeper.and_then(|last| writer.position_after(last)) else {
            return;
        };

        writer.break_container(after);
        let target = writer.position_at_end(view_item);
        writer.move_node(next_list, target);
        let previous_sibling = writer.view().previous_sibling(next_list);
        writer.merge_view_lists(previous_sibling, Some(next_list));
        trace!(target: "dlist::downcast", ?next_list, "adopted deeper items");
    }

    /// Splits every list level around a root offset where a non-list block is about to go.
    ///
    /// The parts of the enclosing items that come after the split point are evacuated and put
    /// back after the outermost list, so the block ends up at the root between two lists.
    fn split_lists_at(&mut self, index: usize) -> Result<(), EngineError> {
        let mut position = self.to_view(&ModelPosition::root(index))?;
        let mut writer = ViewWriter::new(self.view);
        let mut evacuated: Vec<Vec<ViewId>> = Vec::new();

        while writer.view().is_container(position.parent) {
            position = writer.break_container(position);
            let parent = position.parent;
            if !writer.view().is_item(parent) {
                break;
            }
            let tail: Vec<ViewId> = writer.view().children(parent)[position.offset..].to_vec();
            for &node in &tail {
                writer.remove(node);
            }
            if !tail.is_empty() {
                evacuated.push(tail);
            }
            match writer.position_after(parent) {
                Some(after) => position = after,
                None => break,
            }
        }

        if evacuated.is_empty() {
            return Ok(());
        }
        trace!(target: "dlist::downcast", levels = evacuated.len(), "split lists for block");
        for (i, group) in evacuated.into_iter().enumerate() {
            let previous = writer.view().node_before(position);
            for node in group {
                position = writer.insert(position, node);
            }
            if i > 0 {
                if let Some(previous) = previous {
                    let next = writer.view().next_sibling(previous);
                    if let Some(seam) = writer.merge_view_lists(Some(previous), next) {
                        if seam.parent == previous {
                            position.offset -= 1;
                        }
                    }
                }
            }
        }
        let (before, after) = (writer.view().node_before(position), writer.view().node_after(position));
        writer.merge_view_lists(before, after);
        Ok(())
    }
}

/// Breaks the item's container right before and right after the item.
fn isolate(writer: &mut ViewWriter<'_>, view_item: ViewId) {
    if let Some(before) = writer.position_before(view_item) {
        writer.break_container(before);
    }
    if let Some(after) = writer.position_after(view_item) {
        writer.break_container(after);
    }
}

/// Merges a container with its next and then its previous sibling. Returns the container that
/// holds its items afterwards.
fn merge_around(writer: &mut ViewWriter<'_>, container: ViewId) -> ViewId {
    let next = writer.view().next_sibling(container);
    writer.merge_view_lists(Some(container), next);
    let previous = writer.view().previous_sibling(container);
    match writer.merge_view_lists(previous, Some(container)) {
        Some(seam) => seam.parent,
        None => container,
    }
}

fn skip_ui(view: &ViewDocument, parent: ViewId, offset: usize) -> usize {
    let mut offset = offset;
    while view.child(parent, offset).is_some_and(|c| view.is_ui(c)) {
        offset += 1;
    }
    offset
}

fn content_children(view: &ViewDocument, id: ViewId) -> Vec<ViewId> {
    view.children(id).iter().copied().filter(|&c| !view.is_ui(c)).collect()
}

/// Whether `container` is exactly the render of `group`, bindings included.
fn group_matches(
    view: &ViewDocument,
    mapper: &Mapper,
    container: ViewId,
    group: &ListGroup<&ModelElement>,
) -> bool {
    if !view.is_container(container)
        || view.attribute(container, TYPE_ATTRIBUTE) != Some(group.list_type.as_str())
    {
        return false;
    }
    let items = content_children(view, container);
    items.len() == group.items.len()
        && items
            .iter()
            .zip(&group.items)
            .all(|(&item, node)| item_matches(view, mapper, item, group.list_type, node))
}

fn item_matches(
    view: &ViewDocument,
    mapper: &Mapper,
    item: ViewId,
    list_type: ListType,
    node: &ListNode<&ModelElement>,
) -> bool {
    if view.name(item) != Some(list_type.item_tag()) || mapper.model_element(item) != Some(node.payload.key()) {
        return false;
    }
    let mut children = content_children(view, item).into_iter().peekable();
    let text = children
        .next_if(|&c| view.is_text(c))
        .and_then(|c| view.text(c))
        .unwrap_or("");
    if text != node.payload.text {
        return false;
    }
    let nested: Vec<ViewId> = children.collect();
    nested.len() == node.children.len()
        && nested
            .iter()
            .zip(&node.children)
            .all(|(&child, group)| group_matches(view, mapper, child, group))
}

fn first_nested_container(view: &ViewDocument, item: ViewId) -> Option<ViewId> {
    view.children(item).iter().copied().find(|&c| view.is_container(c))
}

/// First item element after the start of `from`, in document order, before `stop` is reached.
fn next_item_between(view: &ViewDocument, from: ViewId, stop: ViewId) -> Option<ViewId> {
    let mut current = view.next_in_order(from);
    while let Some(node) = current {
        if node == stop {
            return None;
        }
        if view.is_item(node) {
            return Some(node);
        }
        current = view.next_in_order(node);
    }
    None
}

/// Walks back from `start` through contiguous list items and returns the first one with the
/// same indent (when `same`) or a smaller indent (when `smaller`).
pub(crate) fn sibling_list_item(
    model: &ModelDocument,
    start: Option<usize>,
    indent: usize,
    same: bool,
    smaller: bool,
) -> Option<usize> {
    let mut index = start?;
    loop {
        let element = model.list_item_at(index)?;
        let item_indent = element.indent();
        if (same && item_indent == indent) || (smaller && item_indent < indent) {
            return Some(index);
        }
        index = index.checked_sub(1)?;
    }
}
