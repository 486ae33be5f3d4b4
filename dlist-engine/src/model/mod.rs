//! The flat model
//!
//!     The model never nests lists. Every list item is a root-level `ListItem` block that carries
//!     three attributes: its type, its indent and an item id. Hierarchy is implied by the indent
//!     sequence of a contiguous run of items, the way an outline is implied by its margins.
//!
//!     Blocks are addressed by a [NodeKey] that survives every edit except removal. Positions are
//!     either root offsets (between blocks) or character offsets inside one block.
//!
//!     All writes go through [writer::ModelWriter]; the change log of a batch is recomputed by
//!     [differ::diff] from a [differ::Snapshot] taken when the batch started.

pub mod differ;
pub mod schema;
pub mod writer;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use differ::{diff, Change, Snapshot};
pub use schema::{DefaultSchema, Schema};
pub use writer::ModelWriter;

/// Stable identity of a model element for as long as it is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(u64);

impl NodeKey {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Semantic role of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    #[serde(alias = "dl")]
    List,
    #[serde(alias = "dt")]
    Term,
    #[serde(alias = "dd")]
    Value,
}

impl ListType {
    pub const ALL: [ListType; 3] = [ListType::List, ListType::Term, ListType::Value];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::List => "list",
            ListType::Term => "term",
            ListType::Value => "value",
        }
    }

    /// Tag of the view element that renders an item of this type.
    pub fn item_tag(&self) -> &'static str {
        match self {
            ListType::Term => crate::view::TERM_TAG,
            ListType::List | ListType::Value => crate::view::VALUE_TAG,
        }
    }

    /// Name of the command that toggles this type.
    pub fn command_name(&self) -> &'static str {
        match self {
            ListType::List => "descriptionList",
            ListType::Term => "descriptionTerm",
            ListType::Value => "descriptionValue",
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" | "dl" => Ok(ListType::List),
            "term" | "dt" => Ok(ListType::Term),
            "value" | "dd" => Ok(ListType::Value),
            other => Err(format!("unknown list type '{other}'")),
        }
    }
}

/// Opaque identifier of a logical list item.
///
/// Fragments of one item that were split apart by another block share an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a root-level block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementName {
    Paragraph,
    Heading(u8),
    ListItem,
    /// An atomic block (image, table, rule). Never eligible for list conversion.
    Object,
}

impl ElementName {
    pub fn is_list_item(&self) -> bool {
        matches!(self, ElementName::ListItem)
    }
}

/// The three list attributes. Any of them may be missing on a malformed element; the
/// post-fixer fills or strips them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAttributes {
    #[serde(default, rename = "listType", skip_serializing_if = "Option::is_none")]
    pub list_type: Option<ListType>,
    #[serde(default, rename = "listIndent", skip_serializing_if = "Option::is_none")]
    pub list_indent: Option<usize>,
    #[serde(default, rename = "listItemId", skip_serializing_if = "Option::is_none")]
    pub list_item_id: Option<ItemId>,
}

impl ListAttributes {
    pub fn new(list_type: ListType, indent: usize, id: Option<ItemId>) -> Self {
        ListAttributes {
            list_type: Some(list_type),
            list_indent: Some(indent),
            list_item_id: id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list_type.is_none() && self.list_indent.is_none() && self.list_item_id.is_none()
    }

    pub fn get(&self, key: AttributeKey) -> Option<AttributeValue> {
        match key {
            AttributeKey::ListType => self.list_type.map(AttributeValue::Type),
            AttributeKey::ListIndent => self.list_indent.map(AttributeValue::Indent),
            AttributeKey::ListItemId => self.list_item_id.clone().map(AttributeValue::Id),
        }
    }

    pub fn set(&mut self, value: AttributeValue) {
        match value {
            AttributeValue::Type(t) => self.list_type = Some(t),
            AttributeValue::Indent(i) => self.list_indent = Some(i),
            AttributeValue::Id(id) => self.list_item_id = Some(id),
        }
    }

    pub fn remove(&mut self, key: AttributeKey) {
        match key {
            AttributeKey::ListType => self.list_type = None,
            AttributeKey::ListIndent => self.list_indent = None,
            AttributeKey::ListItemId => self.list_item_id = None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKey {
    ListIndent,
    ListType,
    ListItemId,
}

impl AttributeKey {
    /// Order in which the differ reports attribute changes of one element.
    pub const ALL: [AttributeKey; 3] = [
        AttributeKey::ListIndent,
        AttributeKey::ListType,
        AttributeKey::ListItemId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKey::ListIndent => "listIndent",
            AttributeKey::ListType => "listType",
            AttributeKey::ListItemId => "listItemId",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Type(ListType),
    Indent(usize),
    Id(ItemId),
}

/// A detached block: what a document is loaded from and serialized to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub name: ElementName,
    #[serde(default, flatten)]
    pub attributes: ListAttributes,
    #[serde(default)]
    pub text: String,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block {
            name: ElementName::Paragraph,
            attributes: ListAttributes::default(),
            text: text.into(),
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block {
            name: ElementName::Heading(level.clamp(1, 6)),
            attributes: ListAttributes::default(),
            text: text.into(),
        }
    }

    pub fn object(text: impl Into<String>) -> Self {
        Block {
            name: ElementName::Object,
            attributes: ListAttributes::default(),
            text: text.into(),
        }
    }

    pub fn list_item(list_type: ListType, indent: usize, text: impl Into<String>) -> Self {
        Block {
            name: ElementName::ListItem,
            attributes: ListAttributes::new(list_type, indent, None),
            text: text.into(),
        }
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.attributes.list_item_id = Some(id);
        self
    }
}

/// Type and indent of a well-formed list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEntry {
    pub list_type: ListType,
    pub indent: usize,
}

/// An attached block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelElement {
    key: NodeKey,
    pub name: ElementName,
    pub attributes: ListAttributes,
    pub text: String,
}

impl ModelElement {
    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn is_list_item(&self) -> bool {
        self.name.is_list_item()
    }

    /// Indent of a list item, treating a missing attribute as 0.
    pub fn indent(&self) -> usize {
        self.attributes.list_indent.unwrap_or(0)
    }

    pub fn list_type(&self) -> Option<ListType> {
        self.attributes.list_type
    }

    pub fn item_id(&self) -> Option<&ItemId> {
        self.attributes.list_item_id.as_ref()
    }

    /// `Some` only for `ListItem`s that carry both a type and an indent.
    pub fn list_entry(&self) -> Option<ListEntry> {
        if !self.is_list_item() {
            return None;
        }
        Some(ListEntry {
            list_type: self.attributes.list_type?,
            indent: self.attributes.list_indent?,
        })
    }

    /// Length in characters of the inline content.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn to_block(&self) -> Block {
        Block {
            name: self.name,
            attributes: self.attributes.clone(),
            text: self.text.clone(),
        }
    }
}

/// The flat root sequence of blocks.
#[derive(Debug, Clone, Default)]
pub struct ModelDocument {
    elements: Vec<ModelElement>,
    next_key: u64,
    next_item_id: u64,
}

impl ModelDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document directly from blocks, without any normalization.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut doc = ModelDocument::new();
        for block in blocks {
            let index = doc.len();
            doc.insert_block(index, block);
        }
        doc
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[ModelElement] {
        &self.elements
    }

    pub fn get(&self, index: usize) -> Option<&ModelElement> {
        self.elements.get(index)
    }

    pub fn index_of(&self, key: NodeKey) -> Option<usize> {
        self.elements.iter().position(|e| e.key == key)
    }

    pub fn element(&self, key: NodeKey) -> Option<&ModelElement> {
        self.elements.iter().find(|e| e.key == key)
    }

    /// Index of a list item together with its element, if `index` holds one.
    pub fn list_item_at(&self, index: usize) -> Option<&ModelElement> {
        self.get(index).filter(|e| e.is_list_item())
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.elements.iter().map(ModelElement::to_block).collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.elements.clone())
    }

    /// Produces an item id that no element of this document carries.
    pub fn fresh_item_id(&mut self) -> ItemId {
        loop {
            self.next_item_id += 1;
            let candidate = ItemId::new(format!("item-{}", self.next_item_id));
            if !self
                .elements
                .iter()
                .any(|e| e.attributes.list_item_id.as_ref() == Some(&candidate))
            {
                return candidate;
            }
        }
    }

    pub(crate) fn insert_block(&mut self, index: usize, block: Block) -> NodeKey {
        self.next_key += 1;
        let key = NodeKey(self.next_key);
        let index = index.min(self.elements.len());
        self.elements.insert(
            index,
            ModelElement {
                key,
                name: block.name,
                attributes: block.attributes,
                text: block.text,
            },
        );
        key
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Option<ModelElement> {
        (index < self.elements.len()).then(|| self.elements.remove(index))
    }

    pub(crate) fn element_mut(&mut self, key: NodeKey) -> Option<&mut ModelElement> {
        self.elements.iter_mut().find(|e| e.key == key)
    }
}

/// Where a model position lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelParent {
    Root,
    Element(NodeKey),
}

/// A root offset (between blocks) or a character offset inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelPosition {
    pub parent: ModelParent,
    pub offset: usize,
}

impl ModelPosition {
    pub fn root(offset: usize) -> Self {
        ModelPosition {
            parent: ModelParent::Root,
            offset,
        }
    }

    pub fn inside(key: NodeKey, offset: usize) -> Self {
        ModelPosition {
            parent: ModelParent::Element(key),
            offset,
        }
    }

    pub fn before(doc: &ModelDocument, key: NodeKey) -> Option<Self> {
        doc.index_of(key).map(Self::root)
    }

    pub fn after(doc: &ModelDocument, key: NodeKey) -> Option<Self> {
        doc.index_of(key).map(|i| Self::root(i + 1))
    }

    pub fn at_end_of(doc: &ModelDocument, key: NodeKey) -> Option<Self> {
        doc.element(key).map(|e| Self::inside(key, e.text_len()))
    }

    /// Index of the block this position points into or at.
    ///
    /// Root positions resolve to the block after them, or the last block when at the end.
    pub fn block_index(&self, doc: &ModelDocument) -> Option<usize> {
        match self.parent {
            ModelParent::Element(key) => doc.index_of(key),
            ModelParent::Root if doc.is_empty() => None,
            ModelParent::Root => Some(self.offset.min(doc.len() - 1)),
        }
    }
}

/// Anchor/focus pair. A collapsed selection is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: ModelPosition,
    pub focus: ModelPosition,
}

impl Selection {
    pub fn collapsed(position: ModelPosition) -> Self {
        Selection {
            anchor: position,
            focus: position,
        }
    }

    pub fn range(anchor: ModelPosition, focus: ModelPosition) -> Self {
        Selection { anchor, focus }
    }

    /// Selects whole blocks from the one keyed `first` to the one keyed `last`.
    pub fn blocks(doc: &ModelDocument, first: NodeKey, last: NodeKey) -> Self {
        let end = doc.element(last).map_or(0, ModelElement::text_len);
        Selection::range(ModelPosition::inside(first, 0), ModelPosition::inside(last, end))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Keys of every block touched by the selection, in document order.
    pub fn selected_blocks(&self, doc: &ModelDocument) -> Vec<NodeKey> {
        let (Some(a), Some(b)) = (self.anchor.block_index(doc), self.focus.block_index(doc)) else {
            return Vec::new();
        };
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        doc.elements()[start..=end].iter().map(ModelElement::key).collect()
    }

    /// Falls back to a caret at the nearest valid root offset when the selection points at
    /// removed elements.
    pub fn revalidate(&self, doc: &ModelDocument) -> Selection {
        let valid = |p: &ModelPosition| match p.parent {
            ModelParent::Root => p.offset <= doc.len(),
            ModelParent::Element(key) => doc.element(key).is_some_and(|e| p.offset <= e.text_len()),
        };
        if valid(&self.anchor) && valid(&self.focus) {
            return *self;
        }
        let fallback = |p: &ModelPosition| match p.parent {
            ModelParent::Root => ModelPosition::root(p.offset.min(doc.len())),
            ModelParent::Element(key) => match doc.element(key) {
                Some(e) => ModelPosition::inside(key, p.offset.min(e.text_len())),
                None => doc
                    .get(0)
                    .map_or(ModelPosition::root(0), |e| ModelPosition::inside(e.key(), 0)),
            },
        };
        Selection::range(fallback(&self.anchor), fallback(&self.focus))
    }
}
