//! Model normalization after every change batch
//!
//!     Commands, paste and upcast are allowed to leave lists in any state. Before a batch is
//!     converted to the view, the post-fixer brings every list run touched by the batch back to
//!     a well-formed shape:
//!
//!     - the first item of a run has indent 0 and no item is more than one level deeper than its
//!       predecessor
//!     - below the top level, consecutive items of one level under one parent share a type
//!     - non-list blocks carry no list attributes
//!     - every item has an id, and ids are only shared by fragments of one logical item
//!
//! Discovery
//!
//!     Only the runs a batch touched are inspected. Every relevant change entry contributes a
//!     position; the run around it is located by walking back to its head. Items visited on
//!     the way are remembered, so a batch touching one long run many times walks it once.
//!
//! Fixed Point
//!
//!     A pass may itself create work for another pass (an indent fix can change which type a
//!     level establishes). [run_to_fixed_point] re-diffs and re-fixes until a pass changes
//!     nothing, and gives up with [EngineError::PostFixerDiverged] after a bounded number of
//!     passes.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::EngineError;
use crate::model::{
    diff, AttributeKey, AttributeValue, Change, ItemId, ListType, ModelDocument, ModelWriter,
    NodeKey, Snapshot,
};

#[derive(Debug, Clone, Copy)]
pub struct PostFixer {
    default_type: ListType,
}

impl Default for PostFixer {
    fn default() -> Self {
        PostFixer::new(ListType::Value)
    }
}

impl PostFixer {
    /// `default_type` is given to list items that lack a type.
    pub fn new(default_type: ListType) -> Self {
        PostFixer { default_type }
    }

    /// Runs one pass over the runs touched by `changes`. Returns whether anything changed.
    pub fn fix(&self, writer: &mut ModelWriter<'_>, changes: &[Change]) -> bool {
        let mut applied = false;
        let mut heads = ListHeads::default();

        for change in changes {
            match change {
                Change::Insert {
                    position,
                    key,
                    name,
                } => {
                    if name.is_list_item() {
                        heads.add(writer.document(), *position);
                    } else {
                        applied |= strip_list_attributes(writer, *key);
                        heads.add(writer.document(), position + 1);
                    }
                }
                // joining two runs keeps both valid, but both still need a look
                Change::Remove { position, .. } => heads.add(writer.document(), *position),
                Change::Attribute {
                    position,
                    attribute: AttributeKey::ListIndent | AttributeKey::ListType,
                    ..
                } => heads.add(writer.document(), *position),
                Change::Attribute { .. } | Change::Content { .. } => {}
            }
        }

        applied |= self.complete_list_items(writer);
        for head in heads.into_heads() {
            applied |= fix_list_indents(writer, head);
            applied |= fix_list_types(writer, head);
        }
        applied |= fix_item_ids(writer);
        applied
    }

    /// Gives list items without a type or indent the defaults.
    fn complete_list_items(&self, writer: &mut ModelWriter<'_>) -> bool {
        let incomplete: Vec<(NodeKey, bool, bool)> = writer
            .document()
            .elements()
            .iter()
            .filter(|e| e.is_list_item())
            .filter(|e| e.attributes.list_type.is_none() || e.attributes.list_indent.is_none())
            .map(|e| {
                (
                    e.key(),
                    e.attributes.list_type.is_none(),
                    e.attributes.list_indent.is_none(),
                )
            })
            .collect();
        for &(key, missing_type, missing_indent) in &incomplete {
            if missing_type {
                writer.set_attribute(key, AttributeValue::Type(self.default_type));
            }
            if missing_indent {
                writer.set_attribute(key, AttributeValue::Indent(0));
            }
        }
        !incomplete.is_empty()
    }
}

/// Repeats diff → fix until a pass applies nothing.
///
/// At most `max_iterations` passes may apply corrections; the pass that finds nothing left to
/// fix is not counted. Returns the number of correcting passes.
pub fn run_to_fixed_point(
    fixer: &PostFixer,
    doc: &mut ModelDocument,
    snapshot: &Snapshot,
    max_iterations: usize,
) -> Result<usize, EngineError> {
    let mut passes = 0;
    loop {
        let changes = diff(snapshot, doc);
        let mut writer = ModelWriter::new(doc);
        if !fixer.fix(&mut writer, &changes) {
            debug!(target: "dlist::postfix", passes, "model settled");
            return Ok(passes);
        }
        if passes == max_iterations {
            warn!(target: "dlist::postfix", passes, "post-fixer did not settle");
            return Err(EngineError::PostFixerDiverged { iterations: passes });
        }
        passes += 1;
    }
}

/// Memoized list-head lookup.
#[derive(Default)]
struct ListHeads {
    item_to_head: HashMap<NodeKey, NodeKey>,
    heads: Vec<NodeKey>,
}

impl ListHeads {
    fn add(&mut self, doc: &ModelDocument, position: usize) {
        let before = position.checked_sub(1).and_then(|i| doc.list_item_at(i));
        let Some(before) = before else {
            if let Some(after) = doc.list_item_at(position) {
                self.record(after.key(), after.key());
            }
            return;
        };

        if self.item_to_head.contains_key(&before.key()) {
            return;
        }
        let mut head_index = position - 1;
        while let Some(previous) = head_index.checked_sub(1).and_then(|i| doc.list_item_at(i)) {
            if self.item_to_head.contains_key(&previous.key()) {
                return;
            }
            head_index -= 1;
        }
        if let Some(head) = doc.get(head_index) {
            self.record(before.key(), head.key());
        }
    }

    fn record(&mut self, item: NodeKey, head: NodeKey) {
        self.item_to_head.insert(item, head);
        if !self.heads.contains(&head) {
            self.heads.push(head);
        }
    }

    fn into_heads(self) -> Vec<NodeKey> {
        self.heads
    }
}

fn strip_list_attributes(writer: &mut ModelWriter<'_>, key: NodeKey) -> bool {
    let Some(element) = writer.document().element(key) else {
        return false;
    };
    if element.attributes.is_empty() {
        return false;
    }
    for attribute in AttributeKey::ALL {
        writer.remove_attribute(key, attribute);
    }
    debug!(target: "dlist::postfix", %key, "stripped list attributes from non-list block");
    true
}

/// Keys of the run starting at `head`, with their indents.
fn run_from(doc: &ModelDocument, head: NodeKey) -> Vec<(NodeKey, usize, Option<ListType>)> {
    let Some(start) = doc.index_of(head) else {
        return Vec::new();
    };
    doc.elements()[start..]
        .iter()
        .take_while(|e| e.is_list_item())
        .map(|e| (e.key(), e.indent(), e.list_type()))
        .collect()
}

/// Clamps indent jumps, preserving the relative shape of the clamped items.
fn fix_list_indents(writer: &mut ModelWriter<'_>, head: NodeKey) -> bool {
    let mut applied = false;
    let mut max_indent = 0;
    let mut fix_by: Option<usize> = None;

    for (key, indent, _) in run_from(writer.document(), head) {
        if indent > max_indent {
            let new_indent = match fix_by {
                None => {
                    fix_by = Some(indent - max_indent);
                    max_indent
                }
                Some(by) => {
                    let by = by.min(indent);
                    fix_by = Some(by);
                    indent - by
                }
            };
            debug!(target: "dlist::postfix", %key, indent, new_indent, "fixed indent");
            writer.set_attribute(key, AttributeValue::Indent(new_indent));
            applied = true;
        } else {
            fix_by = None;
            max_indent = indent + 1;
        }
    }
    applied
}

/// Makes every item of a nested level take the type the level's first item established.
///
/// Top-level items are left alone: a top-level run may alternate terms and values.
fn fix_list_types(writer: &mut ModelWriter<'_>, head: NodeKey) -> bool {
    let mut applied = false;
    let mut stack: Vec<Option<ListType>> = Vec::new();
    let mut previous_indent: Option<usize> = None;

    for (key, indent, list_type) in run_from(writer.document(), head) {
        if previous_indent.is_some_and(|p| p > indent) {
            stack.truncate(indent + 1);
        }
        if indent != 0 {
            if stack.len() <= indent {
                stack.resize(indent + 1, None);
            }
            match stack[indent] {
                Some(established) if list_type != Some(established) => {
                    debug!(target: "dlist::postfix", %key, %established, "fixed type");
                    writer.set_attribute(key, AttributeValue::Type(established));
                    applied = true;
                }
                Some(_) => {}
                None => stack[indent] = list_type,
            }
        }
        previous_indent = Some(indent);
    }
    applied
}

/// Assigns missing ids and separates ids shared by unrelated items.
///
/// A repeated id is kept only when it directly follows its previous occurrence at the same
/// indent, which is what splitting one item produces.
fn fix_item_ids(writer: &mut ModelWriter<'_>) -> bool {
    let mut seen: HashSet<ItemId> = HashSet::new();
    let mut needs_id: Vec<NodeKey> = Vec::new();
    let mut previous: Option<(ItemId, usize)> = None;

    for element in writer.document().elements() {
        if !element.is_list_item() {
            previous = None;
            continue;
        }
        let indent = element.indent();
        match element.item_id() {
            None => needs_id.push(element.key()),
            Some(id) => {
                let continues = previous
                    .as_ref()
                    .is_some_and(|(p, i)| p == id && *i == indent);
                if seen.contains(id) && !continues {
                    needs_id.push(element.key());
                    previous = None;
                    continue;
                }
                seen.insert(id.clone());
                previous = Some((id.clone(), indent));
                continue;
            }
        }
        previous = None;
    }

    for &key in &needs_id {
        let id = writer.fresh_item_id();
        debug!(target: "dlist::postfix", %key, %id, "assigned item id");
        writer.set_attribute(key, AttributeValue::Id(id));
    }
    !needs_id.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, ElementName, ListAttributes};

    fn fixed(blocks: Vec<Block>) -> Vec<(usize, ListType)> {
        let mut doc = ModelDocument::new();
        let snapshot = doc.snapshot();
        let mut writer = ModelWriter::new(&mut doc);
        for (i, block) in blocks.into_iter().enumerate() {
            writer.insert(i, block);
        }
        run_to_fixed_point(&PostFixer::default(), &mut doc, &snapshot, 16).unwrap();
        doc.elements()
            .iter()
            .filter_map(|e| e.list_entry())
            .map(|entry| (entry.indent, entry.list_type))
            .collect()
    }

    fn list(indent: usize) -> Block {
        Block::list_item(ListType::List, indent, "")
    }

    fn typed(list_type: ListType, indent: usize) -> Block {
        Block::list_item(list_type, indent, "")
    }

    #[test]
    fn test_first_item_is_clamped_to_zero() {
        let indents: Vec<_> = fixed(vec![list(2), list(3)]).into_iter().map(|(i, _)| i).collect();
        assert_eq!(indents, vec![0, 1]);
    }

    #[test]
    fn test_clamping_preserves_shape() {
        let indents: Vec<_> = fixed(vec![list(0), list(3), list(4), list(3), list(1)])
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(indents, vec![0, 1, 2, 1, 1]);
    }

    #[test]
    fn test_valid_run_is_untouched() {
        let indents: Vec<_> = fixed(vec![list(0), list(1), list(2), list(0)])
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(indents, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_nested_levels_share_the_first_type() {
        use ListType::{List, Term, Value};
        let result = fixed(vec![
            typed(Term, 0),
            typed(Value, 1),
            typed(Term, 1),
            typed(List, 2),
            typed(Term, 1),
            typed(Value, 0),
            typed(Term, 1),
        ]);
        assert_eq!(
            result,
            vec![
                (0, Term),
                (1, Value),
                (1, Value),
                (2, List),
                (1, Value),
                (0, Value),
                (1, Term),
            ]
        );
    }

    #[test]
    fn test_top_level_may_mix_types() {
        use ListType::{Term, Value};
        let result = fixed(vec![typed(Term, 0), typed(Value, 0), typed(Term, 0)]);
        assert_eq!(result, vec![(0, Term), (0, Value), (0, Term)]);
    }

    #[test]
    fn test_foreign_attributes_are_stripped_from_inserted_blocks() {
        let mut doc = ModelDocument::new();
        let snapshot = doc.snapshot();
        ModelWriter::new(&mut doc).insert(
            0,
            Block {
                name: ElementName::Paragraph,
                attributes: ListAttributes::new(ListType::Term, 3, None),
                text: "p".into(),
            },
        );
        run_to_fixed_point(&PostFixer::default(), &mut doc, &snapshot, 16).unwrap();
        assert!(doc.elements()[0].attributes.is_empty());
    }

    #[test]
    fn test_paragraph_between_items_rebases_following_run() {
        let mut doc = ModelDocument::from_blocks(vec![list(0), list(1), list(1)]);
        let snapshot = doc.snapshot();
        ModelWriter::new(&mut doc).insert(2, Block::paragraph("p"));
        run_to_fixed_point(&PostFixer::default(), &mut doc, &snapshot, 16).unwrap();
        let indents: Vec<_> = doc.elements().iter().map(|e| e.attributes.list_indent).collect();
        assert_eq!(indents, vec![Some(0), Some(1), None, Some(0)]);
    }

    #[test]
    fn test_item_ids_are_repaired() {
        let id = ItemId::new("same");
        let mut doc = ModelDocument::new();
        let snapshot = doc.snapshot();
        let mut writer = ModelWriter::new(&mut doc);
        writer.insert(0, list(0).with_id(id.clone()));
        writer.insert(1, list(0).with_id(id.clone()));
        writer.insert(2, Block::paragraph("p"));
        writer.insert(3, list(0).with_id(id.clone()));
        writer.insert(4, list(0));
        run_to_fixed_point(&PostFixer::default(), &mut doc, &snapshot, 16).unwrap();

        let ids: Vec<_> = doc.elements().iter().map(|e| e.item_id().cloned()).collect();
        assert_eq!(ids[0], Some(id.clone()));
        assert_eq!(ids[1], Some(id.clone()));
        assert!(ids[3].is_some() && ids[3] != Some(id.clone()));
        assert!(ids[4].is_some() && ids[4] != ids[3]);
    }

    #[test]
    fn test_items_without_attributes_get_defaults() {
        let mut doc = ModelDocument::new();
        let snapshot = doc.snapshot();
        ModelWriter::new(&mut doc).insert(
            0,
            Block {
                name: ElementName::ListItem,
                attributes: ListAttributes::default(),
                text: String::new(),
            },
        );
        run_to_fixed_point(&PostFixer::new(ListType::Term), &mut doc, &snapshot, 16).unwrap();
        let element = &doc.elements()[0];
        assert_eq!(element.list_type(), Some(ListType::Term));
        assert_eq!(element.attributes.list_indent, Some(0));
    }

    #[test]
    fn test_single_repair_fits_a_bound_of_one() {
        let mut doc = ModelDocument::new();
        let snapshot = doc.snapshot();
        ModelWriter::new(&mut doc).insert(0, list(3));
        assert_eq!(run_to_fixed_point(&PostFixer::default(), &mut doc, &snapshot, 1), Ok(1));
        assert_eq!(doc.elements()[0].indent(), 0);
    }

    #[test]
    fn test_bound_of_zero_rejects_any_repair() {
        let mut doc = ModelDocument::new();
        let snapshot = doc.snapshot();
        ModelWriter::new(&mut doc).insert(0, list(3));
        assert_eq!(
            run_to_fixed_point(&PostFixer::default(), &mut doc, &snapshot, 0),
            Err(EngineError::PostFixerDiverged { iterations: 0 })
        );
    }

    #[test]
    fn test_settled_model_needs_no_pass() {
        let mut doc = ModelDocument::new();
        let snapshot = doc.snapshot();
        assert_eq!(
            run_to_fixed_point(&PostFixer::default(), &mut doc, &snapshot, 1),
            Ok(0)
        );
    }
}
