//! HTML parsing (markup → view tree)
//!
//! Pipeline: HTML string → RcDom (html5ever) → ViewDocument. The body's children become the
//! children of the view root; comments, doctypes and processing instructions are dropped.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tracing::trace;

use crate::error::FormatError;
use crate::view::{ViewDocument, ViewId};

/// Parses markup into a fresh view document.
pub fn parse_to_view(source: &str) -> Result<ViewDocument, FormatError> {
    let dom = parse_document(RcDom::default(), Default::default()).one(source);

    let body = find_element(&dom.document, "body")
        .ok_or_else(|| FormatError::ParseError("Document has no body".to_string()))?;

    let mut view = ViewDocument::new();
    let root = view.root();
    for child in body.children.borrow().iter() {
        append_node(&mut view, root, child);
    }
    trace!(target: "dlist::html", nodes = view.descendants(root).len(), "parsed markup");
    Ok(view)
}

fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data {
        if &*name.local == tag {
            return Some(handle.clone());
        }
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

fn append_node(view: &mut ViewDocument, parent: ViewId, handle: &Handle) {
    let node = match &handle.data {
        NodeData::Text { contents } => view.create_text(&contents.borrow()),
        NodeData::Element { name, attrs, .. } => {
            let attributes: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            let borrowed: Vec<(&str, &str)> = attributes
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            let element = view.create_element(&name.local, &borrowed);
            for child in handle.children.borrow().iter() {
                append_node(view, element, child);
            }
            element
        }
        _ => return,
    };
    let end = view.child_count(parent);
    view.insert_child(parent, end, node);
}
