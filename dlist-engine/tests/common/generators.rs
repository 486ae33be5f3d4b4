//! Proptest strategies for documents and model edits.

use dlist_engine::model::{AttributeValue, Block, ElementName, ListType, ModelWriter};
use proptest::prelude::*;

pub fn list_type() -> impl Strategy<Value = ListType> {
    prop_oneof![Just(ListType::List), Just(ListType::Term), Just(ListType::Value)]
}

pub fn block() -> impl Strategy<Value = Block> {
    prop_oneof![
        1 => "[a-z]{0,5}".prop_map(|t: String| Block::paragraph(t)),
        1 => (1u8..=3, "[a-z]{1,5}").prop_map(|(level, t)| Block::heading(level, t)),
        6 => (list_type(), 0usize..4, "[a-z]{0,5}")
            .prop_map(|(list_type, indent, t)| Block::list_item(list_type, indent, t)),
    ]
}

#[derive(Debug, Clone)]
pub enum Edit {
    Insert(usize, Block),
    Remove(usize),
    Indent(usize, usize),
    Retype(usize, ListType),
    ToParagraph(usize),
    Text(usize, String),
    Split(usize, usize),
    Merge(usize),
}

pub fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => (any::<usize>(), block()).prop_map(|(i, b)| Edit::Insert(i, b)),
        2 => any::<usize>().prop_map(Edit::Remove),
        2 => (any::<usize>(), 0usize..4).prop_map(|(i, n)| Edit::Indent(i, n)),
        1 => (any::<usize>(), list_type()).prop_map(|(i, t)| Edit::Retype(i, t)),
        1 => any::<usize>().prop_map(Edit::ToParagraph),
        1 => (any::<usize>(), "[a-z]{0,4}").prop_map(|(i, t)| Edit::Text(i, t)),
        1 => (any::<usize>(), 0usize..4).prop_map(|(i, o)| Edit::Split(i, o)),
        1 => any::<usize>().prop_map(Edit::Merge),
    ]
}

pub fn apply(writer: &mut ModelWriter<'_>, edit: &Edit) {
    let len = writer.document().len();
    if len == 0 {
        if let Edit::Insert(_, block) = edit {
            writer.insert(0, block.clone());
        }
        return;
    }
    let key = |i: usize| writer.document().elements()[i % len].key();
    match edit {
        Edit::Insert(i, block) => {
            writer.insert(i % (len + 1), block.clone());
        }
        Edit::Remove(i) => {
            let key = key(*i);
            writer.remove(key);
        }
        Edit::Indent(i, indent) => {
            let key = key(*i);
            writer.set_attribute(key, AttributeValue::Indent(*indent));
        }
        Edit::Retype(i, list_type) => {
            let key = key(*i);
            writer.set_attribute(key, AttributeValue::Type(*list_type));
        }
        Edit::ToParagraph(i) => {
            let key = key(*i);
            writer.rename(key, ElementName::Paragraph);
        }
        Edit::Text(i, text) => {
            let key = key(*i);
            writer.set_text(key, text.clone());
        }
        Edit::Split(i, offset) => {
            let key = key(*i);
            writer.split(key, *offset);
        }
        Edit::Merge(i) => {
            if len > 1 {
                let index = i % (len - 1);
                let (into, from) = (key(index), key(index + 1));
                writer.merge(into, from);
            }
        }
    }
}
