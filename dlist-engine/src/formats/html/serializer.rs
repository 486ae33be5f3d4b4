//! HTML serialization (view tree → markup)
//!
//! Pipeline: ModelDocument → ViewDocument (full render) → RcDom → HTML string.
//! UI elements are editor decorations and never reach the output.

use std::cell::{Cell, RefCell};
use std::default::Default;
use std::rc::Rc;

use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};

use crate::conversion::{render_model, Mapper};
use crate::error::FormatError;
use crate::model::ModelDocument;
use crate::view::{ViewDocument, ViewId, ViewNodeKind, TYPE_ATTRIBUTE};

/// Options for HTML serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Whether `dl` containers carry their `data-list-type` attribute
    pub type_attribute: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        HtmlOptions {
            type_attribute: true,
        }
    }
}

/// Serialize a model by rendering it from scratch
pub fn serialize_model(doc: &ModelDocument, options: &HtmlOptions) -> Result<String, FormatError> {
    let mut view = ViewDocument::new();
    let mut mapper = Mapper::with_list_support();
    render_model(doc, &mut view, &mut mapper);
    serialize_view(&view, options)
}

/// Serialize the children of the view root, one top-level element per line
pub fn serialize_view(view: &ViewDocument, options: &HtmlOptions) -> Result<String, FormatError> {
    let handles: Vec<Handle> = view
        .children(view.root())
        .iter()
        .filter_map(|&child| to_handle(view, child, options))
        .collect();

    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let mut lines = Vec::with_capacity(handles.len());
    for handle in handles {
        let mut output = Vec::new();
        let serializable = SerializableHandle::from(handle);
        serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
            FormatError::SerializationError(format!("HTML serialization failed: {e}"))
        })?;
        lines.push(String::from_utf8(output).map_err(|e| {
            FormatError::SerializationError(format!("UTF-8 conversion failed: {e}"))
        })?);
    }
    Ok(lines.join("\n"))
}

fn to_handle(view: &ViewDocument, id: ViewId, options: &HtmlOptions) -> Option<Handle> {
    match view.kind(id)? {
        ViewNodeKind::Text(text) => Some(create_text(text)),
        ViewNodeKind::Ui { .. } => None,
        ViewNodeKind::Element { name, attributes } => {
            let attrs = attributes
                .iter()
                .filter(|(key, _)| options.type_attribute || key.as_str() != TYPE_ATTRIBUTE)
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .collect();
            let element = create_element(name, attrs);
            for &child in view.children(id) {
                if let Some(handle) = to_handle(view, child, options) {
                    element.children.borrow_mut().push(handle);
                }
            }
            Some(element)
        }
    }
}

/// Create an HTML element with attributes
fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}
