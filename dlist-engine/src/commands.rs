//! Editing commands over the flat model
//!
//!     Commands only express intent on the model. They may leave lists malformed (an indent jump,
//!     a stale attribute on a paragraph, a duplicated id); the post-fixer settles the model
//!     before anything reaches the view.
//!
//!     - [ListCommand]: toggles one list type on the selected blocks
//!     - [IndentCommand]: indents or outdents the selected items together with their sub-items
//!     - [split_item], [merge_backward], [merge_forward]: the structural edits behind Enter,
//!       Backspace and Delete inside items
//!     - [insert_content]: pastes blocks, rebasing pasted items onto the list they land in

use tracing::debug;

use crate::model::{
    AttributeValue, Block, ElementName, ListType, ModelDocument, ModelParent, ModelPosition,
    ModelWriter, NodeKey, Schema, Selection,
};

/// Observable state of a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandState {
    pub value: bool,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Forces a toggle command on (`Some(true)`) or off (`Some(false)`).
    pub force_value: Option<bool>,
}

pub trait Command {
    fn name(&self) -> &'static str;

    fn refresh(&self, model: &ModelDocument, selection: &Selection, schema: &dyn Schema)
        -> CommandState;

    fn execute(
        &self,
        writer: &mut ModelWriter<'_>,
        selection: &Selection,
        schema: &dyn Schema,
        options: &CommandOptions,
    );
}

fn can_become_list_item(schema: &dyn Schema, name: ElementName) -> bool {
    schema.can_have_child_at(ModelParent::Root, ElementName::ListItem) && !schema.is_object(name)
}

fn eligible_blocks(model: &ModelDocument, selection: &Selection, schema: &dyn Schema) -> Vec<NodeKey> {
    selection
        .selected_blocks(model)
        .into_iter()
        .filter(|&key| {
            model
                .element(key)
                .is_some_and(|e| can_become_list_item(schema, e.name))
        })
        .collect()
}

/// Toggles one list type on the selected blocks.
#[derive(Debug, Clone, Copy)]
pub struct ListCommand {
    pub list_type: ListType,
}

impl ListCommand {
    pub fn new(list_type: ListType) -> Self {
        ListCommand { list_type }
    }

    fn value(&self, model: &ModelDocument, selection: &Selection, schema: &dyn Schema) -> bool {
        let blocks = eligible_blocks(model, selection, schema);
        !blocks.is_empty()
            && blocks.iter().all(|&key| {
                model
                    .element(key)
                    .and_then(|e| e.list_entry())
                    .is_some_and(|entry| entry.list_type == self.list_type)
            })
    }
}

impl Command for ListCommand {
    fn name(&self) -> &'static str {
        self.list_type.command_name()
    }

    fn refresh(&self, model: &ModelDocument, selection: &Selection, schema: &dyn Schema) -> CommandState {
        let value = self.value(model, selection, schema);
        let is_enabled = value
            || selection
                .selected_blocks(model)
                .first()
                .and_then(|&key| model.element(key))
                .is_some_and(|e| can_become_list_item(schema, e.name));
        CommandState { value, is_enabled }
    }

    fn execute(
        &self,
        writer: &mut ModelWriter<'_>,
        selection: &Selection,
        schema: &dyn Schema,
        options: &CommandOptions,
    ) {
        let model = writer.document();
        let turn_off = match options.force_value {
            Some(force) => !force,
            None => self.value(model, selection, schema),
        };
        let blocks: Vec<(NodeKey, bool, Option<ListType>)> = eligible_blocks(model, selection, schema)
            .into_iter()
            .filter_map(|key| model.element(key))
            .map(|e| (e.key(), e.is_list_item(), e.list_type()))
            .collect();
        debug!(target: "dlist::command", command = self.name(), turn_off, blocks = blocks.len(), "execute");

        for (key, is_item, list_type) in blocks.into_iter().rev() {
            if turn_off {
                if is_item {
                    // stale list attributes are stripped by the post-fixer
                    writer.rename(key, ElementName::Paragraph);
                }
            } else if !is_item {
                let id = writer.fresh_item_id();
                writer.set_list_attributes(key, self.list_type, 0);
                writer.set_attribute(key, AttributeValue::Id(id));
            } else if list_type != Some(self.list_type) {
                writer.set_attribute(key, AttributeValue::Type(self.list_type));
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentDirection {
    Forward,
    Backward,
}

/// Indents or outdents the selected items and everything nested under the last of them.
#[derive(Debug, Clone, Copy)]
pub struct IndentCommand {
    pub direction: IndentDirection,
}

impl IndentCommand {
    pub fn new(direction: IndentDirection) -> Self {
        IndentCommand { direction }
    }

    fn is_enabled(&self, model: &ModelDocument, selection: &Selection) -> bool {
        let Some(first) = selection
            .selected_blocks(model)
            .first()
            .and_then(|&key| model.index_of(key))
        else {
            return false;
        };
        let Some(item) = model.list_item_at(first) else {
            return false;
        };
        if self.direction == IndentDirection::Backward {
            return true;
        }

        // Indenting needs a preceding sibling in the same list to nest under.
        let indent = item.indent();
        let mut index = first;
        while let Some(previous) = index.checked_sub(1).and_then(|i| model.list_item_at(i)) {
            if previous.indent() < indent {
                break;
            }
            if previous.indent() == indent {
                return previous.list_type() == item.list_type();
            }
            index -= 1;
        }
        false
    }
}

impl Command for IndentCommand {
    fn name(&self) -> &'static str {
        match self.direction {
            IndentDirection::Forward => "indentList",
            IndentDirection::Backward => "outdentList",
        }
    }

    fn refresh(&self, model: &ModelDocument, selection: &Selection, _schema: &dyn Schema) -> CommandState {
        CommandState {
            value: false,
            is_enabled: self.is_enabled(model, selection),
        }
    }

    fn execute(
        &self,
        writer: &mut ModelWriter<'_>,
        selection: &Selection,
        _schema: &dyn Schema,
        _options: &CommandOptions,
    ) {
        let model = writer.document();
        let mut items: Vec<(NodeKey, usize)> = selection
            .selected_blocks(model)
            .into_iter()
            .filter_map(|key| model.element(key))
            .filter(|e| e.is_list_item())
            .map(|e| (e.key(), e.indent()))
            .collect();
        let Some(&(last, last_indent)) = items.last() else {
            return;
        };

        // sub-items of the last selected item move with it
        if let Some(last_index) = model.index_of(last) {
            items.extend(
                model.elements()[last_index + 1..]
                    .iter()
                    .take_while(|e| e.is_list_item() && e.indent() > last_indent)
                    .map(|e| (e.key(), e.indent())),
            );
        }
        if self.direction == IndentDirection::Backward {
            items.reverse();
        }
        debug!(target: "dlist::command", command = self.name(), items = items.len(), "execute");

        for (key, indent) in items {
            match self.direction {
                IndentDirection::Forward => {
                    writer.set_attribute(key, AttributeValue::Indent(indent + 1));
                }
                IndentDirection::Backward if indent == 0 => {
                    writer.rename(key, ElementName::Paragraph);
                }
                IndentDirection::Backward => {
                    writer.set_attribute(key, AttributeValue::Indent(indent - 1));
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// The text after the caret moves into a new item after this one.
    After,
    /// An empty item is inserted before this one.
    Before,
}

/// Splits the list item at `position`. Returns where the caret goes.
pub fn split_item(
    writer: &mut ModelWriter<'_>,
    position: &ModelPosition,
    mode: SplitMode,
) -> Option<ModelPosition> {
    let ModelParent::Element(key) = position.parent else {
        return None;
    };
    let element = writer.document().element(key).filter(|e| e.is_list_item())?;
    let index = writer.document().index_of(key)?;
    match mode {
        SplitMode::After => {
            let new_key = writer.split(key, position.offset)?;
            let id = writer.fresh_item_id();
            writer.set_attribute(new_key, AttributeValue::Id(id));
            Some(ModelPosition::inside(new_key, 0))
        }
        SplitMode::Before => {
            let mut attributes = element.attributes.clone();
            attributes.list_item_id = None;
            let mut block = Block {
                name: ElementName::ListItem,
                attributes,
                text: String::new(),
            };
            block.attributes.list_item_id = Some(writer.fresh_item_id());
            writer.insert(index, block);
            Some(ModelPosition::inside(key, 0))
        }
    }
}

/// Joins the item keyed `key` into the block before it. Returns where the caret goes.
pub fn merge_backward(writer: &mut ModelWriter<'_>, key: NodeKey) -> Option<ModelPosition> {
    let doc = writer.document();
    let index = doc.index_of(key)?;
    let previous = doc.get(index.checked_sub(1)?)?;
    let (previous_key, caret) = (previous.key(), previous.text_len());
    writer
        .merge(previous_key, key)
        .then(|| ModelPosition::inside(previous_key, caret))
}

/// Joins the block after the item keyed `key` into it. Returns where the caret goes.
pub fn merge_forward(writer: &mut ModelWriter<'_>, key: NodeKey) -> Option<ModelPosition> {
    let doc = writer.document();
    let index = doc.index_of(key)?;
    let caret = doc.get(index)?.text_len();
    let next_key = doc.get(index + 1)?.key();
    writer
        .merge(key, next_key)
        .then(|| ModelPosition::inside(key, caret))
}

/// Shifts the leading list items of pasted content onto the list item they are pasted into.
///
/// The reference item is the item containing the position, or the item right before a root
/// position. Pasted content that does not start with a list item is left alone.
pub fn fix_pasted_indents(model: &ModelDocument, position: &ModelPosition, blocks: &mut [Block]) {
    if !blocks.first().is_some_and(|b| b.name.is_list_item()) {
        return;
    }
    let reference = match position.parent {
        ModelParent::Element(key) => model.element(key).filter(|e| e.is_list_item()),
        ModelParent::Root => position
            .offset
            .checked_sub(1)
            .and_then(|i| model.list_item_at(i)),
    };
    let Some(shift) = reference.map(|r| r.indent()).filter(|&i| i > 0) else {
        return;
    };
    for block in blocks.iter_mut().take_while(|b| b.name.is_list_item()) {
        let indent = block.attributes.list_indent.unwrap_or(0);
        block.attributes.list_indent = Some(indent + shift);
    }
}

/// Inserts pasted blocks at `position`. Returns where the caret goes.
///
/// Inside a block, the first pasted block's text joins the text before the caret and the text
/// after the caret joins the last pasted block.
pub fn insert_content(
    writer: &mut ModelWriter<'_>,
    position: &ModelPosition,
    mut blocks: Vec<Block>,
) -> ModelPosition {
    fix_pasted_indents(writer.document(), position, &mut blocks);
    if blocks.is_empty() {
        return *position;
    }

    match position.parent {
        ModelParent::Root => {
            let mut index = position.offset.min(writer.document().len());
            let mut caret = *position;
            for block in blocks {
                let len = block.text.chars().count();
                let key = writer.insert(index, block);
                caret = ModelPosition::inside(key, len);
                index += 1;
            }
            caret
        }
        ModelParent::Element(key) => {
            let Some(element) = writer.document().element(key) else {
                return *position;
            };
            let mut head = element.text.clone();
            let split = crate::model::writer::byte_offset(&head, position.offset);
            let tail = head.split_off(split);
            let Some(index) = writer.document().index_of(key) else {
                return *position;
            };

            let mut blocks = blocks.into_iter();
            let first = blocks.next().map(|b| b.text).unwrap_or_default();
            let rest: Vec<Block> = blocks.collect();
            let caret_in_head = head.chars().count() + first.chars().count();
            head.push_str(&first);

            if rest.is_empty() {
                head.push_str(&tail);
                writer.set_text(key, head);
                return ModelPosition::inside(key, caret_in_head);
            }

            writer.set_text(key, head);
            let mut caret = ModelPosition::inside(key, caret_in_head);
            let count = rest.len();
            for (i, mut block) in rest.into_iter().enumerate() {
                let len = block.text.chars().count();
                if i + 1 == count {
                    block.text.push_str(&tail);
                }
                let inserted = writer.insert(index + 1 + i, block);
                caret = ModelPosition::inside(inserted, len);
            }
            caret
        }
    }
}
