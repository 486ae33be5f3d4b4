//! View → model conversion
//!
//!     Turns markup that has been parsed into the view tree into flat model blocks. List markup
//!     found in the wild is far looser than what the renderer produces, so each container and
//!     item is cleaned before conversion:
//!
//!     - a container keeps only items and nested containers
//!     - an item keeps only containers after its first nested container
//!
//!     Indent and type come from the shared rules in `common::nested_to_flat`. Inline content is
//!     flattened into the item's text. A block inside an item splits it: the block is emitted
//!     after the part converted so far, and content that follows continues in a new block with
//!     the same list attributes and item id.
//!
//!     The result is not normalized. It goes through the post-fixer like any other insertion.

use tracing::{debug, trace};

use crate::common::{item_indent, item_type};
use crate::model::{Block, ItemId, ListAttributes, ListType};
use crate::view::{ViewDocument, ViewId, ViewNodeKind};

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "del", "dfn", "em", "i", "ins",
    "kbd", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

const OBJECT_TAGS: &[&str] = &[
    "audio", "canvas", "embed", "figure", "hr", "iframe", "img", "object", "table", "video",
];

/// Tags whose content is never document text.
const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "template", "title"];

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Where inline content inside an item currently goes.
#[derive(Clone, Copy)]
enum Target {
    Block(usize),
    /// The last emitted block is not part of the item; more inline content needs a
    /// continuation block.
    Continuation,
}

pub struct Upcaster {
    default_type: ListType,
    blocks: Vec<Block>,
    pending: Option<String>,
}

impl Upcaster {
    /// `default_type` is given to `dd` items whose container declares no type.
    pub fn new(default_type: ListType) -> Self {
        Upcaster {
            default_type,
            blocks: Vec::new(),
            pending: None,
        }
    }

    /// Converts the children of `root`, numbering items `item-1`, `item-2`, …
    pub fn convert(self, view: &mut ViewDocument, root: ViewId) -> Vec<Block> {
        let mut counter = 0;
        self.convert_with_ids(view, root, || {
            counter += 1;
            ItemId::new(format!("item-{counter}"))
        })
    }

    /// Converts the children of `root`, taking item ids from `fresh_id`.
    pub fn convert_with_ids(
        mut self,
        view: &mut ViewDocument,
        root: ViewId,
        mut fresh_id: impl FnMut() -> ItemId,
    ) -> Vec<Block> {
        for child in view.children(root).to_vec() {
            self.convert_node(view, child, &mut fresh_id);
        }
        self.flush();
        for block in &mut self.blocks {
            block.text = normalize_whitespace(&block.text);
        }
        debug!(target: "dlist::upcast", blocks = self.blocks.len(), "upcast complete");
        self.blocks
    }

    fn convert_node(&mut self, view: &mut ViewDocument, node: ViewId, fresh_id: &mut dyn FnMut() -> ItemId) {
        let name = match view.kind(node) {
            Some(ViewNodeKind::Text(text)) => {
                if !text.trim().is_empty() {
                    self.pending.get_or_insert_with(String::new).push_str(text);
                }
                return;
            }
            Some(ViewNodeKind::Element { name, .. }) => name.clone(),
            Some(ViewNodeKind::Ui { .. }) | None => return,
        };

        if view.is_container(node) {
            self.flush();
            self.convert_list(view, node, fresh_id);
        } else if view.is_item(node) {
            self.flush();
            self.convert_item(view, node, fresh_id);
        } else if name == "p" {
            self.flush();
            self.blocks.push(Block::paragraph(view.text_content(node)));
        } else if let Some(level) = heading_level(&name) {
            self.flush();
            self.blocks.push(Block::heading(level, view.text_content(node)));
        } else if OBJECT_TAGS.contains(&name.as_str()) {
            self.flush();
            self.blocks.push(Block::object(view.text_content(node)));
        } else if INLINE_TAGS.contains(&name.as_str()) {
            let text = view.text_content(node);
            self.pending.get_or_insert_with(String::new).push_str(&text);
        } else if name == "br" || SKIPPED_TAGS.contains(&name.as_str()) {
            // no document text
        } else {
            // transparent wrapper
            self.flush();
            for child in view.children(node).to_vec() {
                self.convert_node(view, child, fresh_id);
            }
            self.flush();
        }
    }

    fn convert_list(&mut self, view: &mut ViewDocument, list: ViewId, fresh_id: &mut dyn FnMut() -> ItemId) {
        clean_list(view, list);
        for child in view.children(list).to_vec() {
            if view.is_container(child) {
                self.convert_list(view, child, fresh_id);
            } else {
                self.convert_item(view, child, fresh_id);
            }
        }
    }

    fn convert_item(&mut self, view: &mut ViewDocument, item: ViewId, fresh_id: &mut dyn FnMut() -> ItemId) {
        clean_list_item(view, item);
        let list_type = item_type(view, item, self.default_type);
        let indent = item_indent(view, item);
        let id = fresh_id();
        trace!(target: "dlist::upcast", %list_type, indent, %id, "item");

        let attributes = ListAttributes::new(list_type, indent, Some(id));
        let continuation = |text: String| Block {
            name: crate::model::ElementName::ListItem,
            attributes: attributes.clone(),
            text,
        };
        self.blocks.push(continuation(String::new()));
        let mut target = Target::Block(self.blocks.len() - 1);

        for child in view.children(item).to_vec() {
            let name = view.name(child).map(str::to_string);
            match name.as_deref() {
                _ if view.is_ui(child) => {}
                _ if view.is_container(child) => {
                    self.convert_list(view, child, fresh_id);
                    target = Target::Continuation;
                }
                Some("p") => {
                    let text = view.text_content(child);
                    match target {
                        Target::Block(index) if self.blocks[index].text.trim().is_empty() => {
                            self.blocks[index].text.push_str(&text);
                        }
                        _ => {
                            self.blocks.push(continuation(text));
                            target = Target::Block(self.blocks.len() - 1);
                        }
                    }
                }
                Some(other) if heading_level(other).is_some() || OBJECT_TAGS.contains(&other) => {
                    let text = view.text_content(child);
                    self.blocks.push(match heading_level(other) {
                        Some(level) => Block::heading(level, text),
                        None => Block::object(text),
                    });
                    target = Target::Continuation;
                }
                _ => {
                    let text = view.text_content(child);
                    match target {
                        Target::Block(index) => self.blocks[index].text.push_str(&text),
                        Target::Continuation if text.trim().is_empty() => {}
                        Target::Continuation => {
                            self.blocks.push(continuation(text));
                            target = Target::Block(self.blocks.len() - 1);
                        }
                    }
                }
            }
        }
    }

    fn flush(&mut self) {
        if let Some(text) = self.pending.take() {
            if !text.trim().is_empty() {
                self.blocks.push(Block::paragraph(text));
            }
        }
    }
}

/// Drops container children that are neither items nor containers.
fn clean_list(view: &mut ViewDocument, list: ViewId) {
    for child in view.children(list).to_vec() {
        if !view.is_item(child) && !view.is_container(child) {
            view.discard(child);
        }
    }
}

/// Drops everything but containers after an item's first nested container.
fn clean_list_item(view: &mut ViewDocument, item: ViewId) {
    let mut seen_container = false;
    for child in view.children(item).to_vec() {
        if view.is_container(child) {
            seen_container = true;
        } else if seen_container {
            view.discard(child);
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
