//! HTML format implementation
//!
//! This module implements bidirectional conversion between the flat model and HTML5.
//!
//! # Library Choice
//!
//! We use the `html5ever` + `markup5ever_rcdom` pair for both directions:
//! - `html5ever`: HTML5 parser and serializer from the Servo project
//! - `markup5ever_rcdom`: reference-counted DOM the parser builds and the serializer walks
//!
//! Parsing goes through the browser-grade tree builder, so markup is recovered the same way a
//! browser would recover it before list cleanup even starts.
//!
//! # Element Mapping Table
//!
//! | Model block          | HTML                                       | Import notes                          |
//! |----------------------|--------------------------------------------|---------------------------------------|
//! | Paragraph            | `<p>`                                      | stray inline text also becomes one    |
//! | Heading(n)           | `<hn>`                                     | levels 1-6                            |
//! | Object               | `<figure>`                                 | `img`, `hr`, `table`, … are objects   |
//! | ListItem (term)      | `<dt>` inside `<dl data-list-type="term">` | type from container, else from tag    |
//! | ListItem (value)     | `<dd>` inside `<dl data-list-type="value">`|                                       |
//! | ListItem (list)      | `<dd>` inside `<dl data-list-type="list">` | only recognizable with the attribute  |
//!
//! Nesting is expressed by placing a `dl` inside the `dt`/`dd` of its parent item. Items of
//! one container always share one type; a level that mixes types is split into consecutive
//! containers.
//!
//! # Lossy Conversions
//!
//! - Inline markup (`strong`, `a`, …) is flattened into plain text
//! - Whitespace is normalized
//! - Without the type attribute, `list` items come back as the configured default type

mod parser;
mod serializer;

use std::collections::HashMap;

pub use parser::parse_to_view;
pub use serializer::{serialize_model, serialize_view, HtmlOptions};

use crate::conversion::Upcaster;
use crate::editor::{normalize, EngineSettings};
use crate::error::FormatError;
use crate::format::{bool_option, Format};
use crate::model::ModelDocument;

/// Format implementation for HTML
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlFormat {
    options: HtmlOptions,
    settings: EngineSettings,
}

impl HtmlFormat {
    pub fn new(options: HtmlOptions, settings: EngineSettings) -> Self {
        Self { options, settings }
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML5 with dl/dt/dd description lists"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<ModelDocument, FormatError> {
        let mut view = parse_to_view(source)?;
        let root = view.root();
        let blocks = Upcaster::new(self.settings.default_list_type).convert(&mut view, root);
        Ok(normalize(blocks, &self.settings)?)
    }

    fn serialize(&self, doc: &ModelDocument) -> Result<String, FormatError> {
        serialize_model(doc, &self.options)
    }

    fn serialize_with_options(
        &self,
        doc: &ModelDocument,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let mut html_options = self.options;
        if let Some(type_attribute) = bool_option(options, "type-attribute")? {
            html_options.type_attribute = type_attribute;
        }
        if let Some(unknown) = options.keys().find(|k| k.as_str() != "type-attribute") {
            return Err(FormatError::NotSupported(format!(
                "Format 'html' does not support parameter '{unknown}'"
            )));
        }
        serialize_model(doc, &html_options)
    }
}
