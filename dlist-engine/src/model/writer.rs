//! The only way to mutate a [ModelDocument]
//!
//! Operations address elements by [NodeKey]; an operation on a key that is no longer attached
//! is a no-op that reports `false`/`None` so commands can stay infallible.

use tracing::trace;

use super::{
    AttributeKey, AttributeValue, Block, ElementName, ItemId, ListType, ModelDocument,
    ModelElement, NodeKey,
};

pub struct ModelWriter<'a> {
    doc: &'a mut ModelDocument,
}

impl<'a> ModelWriter<'a> {
    pub fn new(doc: &'a mut ModelDocument) -> Self {
        ModelWriter { doc }
    }

    pub fn document(&self) -> &ModelDocument {
        self.doc
    }

    pub fn insert(&mut self, index: usize, block: Block) -> NodeKey {
        let key = self.doc.insert_block(index, block);
        trace!(target: "dlist::model", %key, index, "insert");
        key
    }

    pub fn remove(&mut self, key: NodeKey) -> Option<Block> {
        let index = self.doc.index_of(key)?;
        trace!(target: "dlist::model", %key, index, "remove");
        self.doc.remove_at(index).map(|e| e.to_block())
    }

    pub fn rename(&mut self, key: NodeKey, name: ElementName) -> bool {
        self.with_element(key, |e| e.name = name)
    }

    pub fn set_attribute(&mut self, key: NodeKey, value: AttributeValue) -> bool {
        self.with_element(key, |e| e.attributes.set(value))
    }

    pub fn remove_attribute(&mut self, key: NodeKey, attribute: AttributeKey) -> bool {
        self.with_element(key, |e| e.attributes.remove(attribute))
    }

    /// Turns an element into a list item of the given type and indent.
    pub fn set_list_attributes(&mut self, key: NodeKey, list_type: ListType, indent: usize) -> bool {
        self.with_element(key, |e| {
            e.name = ElementName::ListItem;
            e.attributes.list_type = Some(list_type);
            e.attributes.list_indent = Some(indent);
        })
    }

    pub fn set_text(&mut self, key: NodeKey, text: impl Into<String>) -> bool {
        let text = text.into();
        self.with_element(key, |e| e.text = text)
    }

    /// Splits a block at a character offset. The tail moves into a new block of the same
    /// kind, carrying the same attributes, inserted right after. Returns the new block's key.
    pub fn split(&mut self, key: NodeKey, offset: usize) -> Option<NodeKey> {
        let index = self.doc.index_of(key)?;
        let element = self.doc.element_mut(key)?;
        let byte = byte_offset(&element.text, offset);
        let tail = element.text.split_off(byte);
        let block = Block {
            name: element.name,
            attributes: element.attributes.clone(),
            text: tail,
        };
        Some(self.insert(index + 1, block))
    }

    /// Appends the text of `from` to `into` and removes `from`.
    pub fn merge(&mut self, into: NodeKey, from: NodeKey) -> bool {
        let Some(text) = self.doc.element(from).map(|e| e.text.clone()) else {
            return false;
        };
        if !self.with_element(into, |e| e.text.push_str(&text)) {
            return false;
        }
        self.remove(from).is_some()
    }

    pub fn fresh_item_id(&mut self) -> ItemId {
        self.doc.fresh_item_id()
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        while self.doc.remove_at(0).is_some() {}
    }

    fn with_element(&mut self, key: NodeKey, f: impl FnOnce(&mut ModelElement)) -> bool {
        match self.doc.element_mut(key) {
            Some(element) => {
                f(element);
                true
            }
            None => false,
        }
    }
}

pub(crate) fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_attributes_and_moves_tail() {
        let mut doc = ModelDocument::from_blocks(vec![
            Block::list_item(ListType::Term, 1, "héllo").with_id(ItemId::new("a")),
        ]);
        let key = doc.elements()[0].key();
        let new_key = ModelWriter::new(&mut doc).split(key, 2).unwrap();

        assert_eq!(doc.elements()[0].text, "hé");
        let tail = doc.element(new_key).unwrap();
        assert_eq!(tail.text, "llo");
        assert_eq!(tail.attributes, doc.elements()[0].attributes);
    }

    #[test]
    fn test_merge_joins_text() {
        let mut doc = ModelDocument::from_blocks(vec![Block::paragraph("ab"), Block::paragraph("cd")]);
        let (a, b) = (doc.elements()[0].key(), doc.elements()[1].key());
        assert!(ModelWriter::new(&mut doc).merge(a, b));
        assert_eq!(doc.blocks(), vec![Block::paragraph("abcd")]);
    }

    #[test]
    fn test_operations_on_detached_keys_are_noops() {
        let mut doc = ModelDocument::from_blocks(vec![Block::paragraph("a")]);
        let key = doc.elements()[0].key();
        let mut writer = ModelWriter::new(&mut doc);
        writer.remove(key);
        assert!(!writer.rename(key, ElementName::ListItem));
        assert!(writer.split(key, 0).is_none());
        assert!(writer.document().is_empty());
    }
}
