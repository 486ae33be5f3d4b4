//! Treeviz dump of the view tree
//!
//! Treeviz is a visual representation of the rendered view, one node per line, the nesting
//! drawn with box connectors. Text children are folded into their element's label.
//!
//! So the format is :
//! <prefix><connector> <icon> <tag> <label> (label truncated to 30 characters)
//!
//! Example:
//!
//! ⧉ View (2 children)
//! ├─ ¶ p Intro
//! └─ ☰ dl [term]
//!   ├─ ≔ dt Apple
//!   │ └─ ☰ dl [value]
//!   │   └─ • dd A fruit
//!   └─ ≔ dt Pear
//!
//! Icons
//!     View root: ⧉
//!     Container (dl): ☰
//!     Term (dt): ≔
//!     Value (dd): •
//!     Paragraph: ¶
//!     Heading: §
//!     Object: ▣
//!     UI element: ◌
//!     Anything else: ○

use std::collections::HashMap;

use crate::conversion::{render_model, Mapper};
use crate::error::FormatError;
use crate::format::{bool_option, Format};
use crate::model::ModelDocument;
use crate::view::{ViewDocument, ViewId, ViewNodeKind, TYPE_ATTRIBUTE};

const LABEL_WIDTH: usize = 30;

/// Get the icon for a view element
pub fn get_icon(tag: &str) -> &'static str {
    match tag {
        "$root" => "⧉",
        "dl" => "☰",
        "dt" => "≔",
        "dd" => "•",
        "p" => "¶",
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "§",
        "figure" => "▣",
        _ => "○",
    }
}

fn truncate(label: &str) -> String {
    if label.chars().count() <= LABEL_WIDTH {
        return label.to_string();
    }
    let mut short: String = label.chars().take(LABEL_WIDTH - 1).collect();
    short.push('…');
    short
}

fn label(view: &ViewDocument, mapper: &Mapper, id: ViewId, show_keys: bool) -> String {
    let Some(ViewNodeKind::Element { name, attributes }) = view.kind(id) else {
        return String::new();
    };
    let mut parts = vec![name.clone()];
    if let Some(list_type) = attributes.get(TYPE_ATTRIBUTE) {
        parts.push(format!("[{list_type}]"));
    }
    let text: String = view
        .children(id)
        .iter()
        .filter_map(|&c| view.text(c))
        .collect();
    if !text.is_empty() {
        parts.push(truncate(&text));
    }
    if show_keys {
        if let Some(key) = mapper.model_element(id) {
            parts.push(format!("{{{key}}}"));
        }
    }
    parts.join(" ")
}

fn format_node(
    view: &ViewDocument,
    mapper: &Mapper,
    id: ViewId,
    prefix: &str,
    is_last: bool,
    show_keys: bool,
    output: &mut String,
) {
    let connector = if is_last { "└─" } else { "├─" };
    match view.kind(id) {
        Some(ViewNodeKind::Ui { name }) => {
            output.push_str(&format!("{prefix}{connector} ◌ {name}\n"));
            return;
        }
        Some(ViewNodeKind::Element { name, .. }) => {
            let icon = get_icon(name);
            let label = label(view, mapper, id, show_keys);
            output.push_str(&format!("{prefix}{connector} {icon} {label}\n"));
        }
        Some(ViewNodeKind::Text(_)) | None => return,
    }

    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    format_children(view, mapper, id, &child_prefix, show_keys, output);
}

fn format_children(
    view: &ViewDocument,
    mapper: &Mapper,
    id: ViewId,
    prefix: &str,
    show_keys: bool,
    output: &mut String,
) {
    let children: Vec<ViewId> = view
        .children(id)
        .iter()
        .copied()
        .filter(|&c| !view.is_text(c))
        .collect();
    for (i, &child) in children.iter().enumerate() {
        format_node(view, mapper, child, prefix, i + 1 == children.len(), show_keys, output);
    }
}

/// Dumps a view. `mapper` supplies the model keys shown with `show_keys`.
pub fn view_to_treeviz_str(view: &ViewDocument, mapper: &Mapper, show_keys: bool) -> String {
    let root = view.root();
    let mut output = format!(
        "{} View ({} children)\n",
        get_icon("$root"),
        view.child_count(root)
    );
    format_children(view, mapper, root, "", show_keys, &mut output);
    output
}

/// Renders a model and dumps the resulting view
pub fn to_treeviz_str(doc: &ModelDocument, show_keys: bool) -> String {
    let mut view = ViewDocument::new();
    let mut mapper = Mapper::with_list_support();
    render_model(doc, &mut view, &mut mapper);
    view_to_treeviz_str(&view, &mapper, show_keys)
}

/// Format implementation for treeviz format
#[derive(Debug, Clone, Copy, Default)]
pub struct TreevizFormat {
    pub show_keys: bool,
}

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree of the rendered view with Unicode icons"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tree", "treeviz"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, doc: &ModelDocument) -> Result<String, FormatError> {
        Ok(to_treeviz_str(doc, self.show_keys))
    }

    fn serialize_with_options(
        &self,
        doc: &ModelDocument,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let show_keys = bool_option(options, "show-keys")?.unwrap_or(self.show_keys);
        Ok(to_treeviz_str(doc, show_keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, ListType};

    #[test]
    fn test_treeviz_dump() {
        let doc = ModelDocument::from_blocks(vec![
            Block::paragraph("Intro"),
            Block::list_item(ListType::Term, 0, "Apple"),
            Block::list_item(ListType::Value, 1, "A fruit that keeps the doctor away"),
            Block::list_item(ListType::Term, 0, "Pear"),
        ]);
        insta::assert_snapshot!(to_treeviz_str(&doc, false), @r"
        ⧉ View (2 children)
        ├─ ¶ p Intro
        └─ ☰ dl [term]
          ├─ ≔ dt Apple
          │ └─ ☰ dl [value]
          │   └─ • dd A fruit that keeps the doctor…
          └─ ≔ dt Pear
        ");
    }

    #[test]
    fn test_show_keys() {
        let doc = ModelDocument::from_blocks(vec![Block::paragraph("x")]);
        let key = doc.elements()[0].key();
        let dump = to_treeviz_str(&doc, true);
        assert!(dump.contains(&format!("¶ p x {{{key}}}")));
    }
}
