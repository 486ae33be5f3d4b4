//! JSON format for the flat model
//!
//! The document is an array of blocks, list attributes inlined next to the block name:
//!
//! ```json
//! [
//!   { "name": "paragraph", "text": "Intro" },
//!   { "name": "listItem", "listType": "term", "listIndent": 0, "listItemId": "item-1", "text": "Apple" }
//! ]
//! ```
//!
//! Parsing accepts blocks with missing or inconsistent list attributes; the post-fixer settles
//! them like any other load.

use crate::editor::{normalize, EngineSettings};
use crate::error::FormatError;
use crate::format::Format;
use crate::model::{Block, ModelDocument};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat {
    settings: EngineSettings,
}

impl JsonFormat {
    pub fn new(settings: EngineSettings) -> Self {
        JsonFormat { settings }
    }
}

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Flat model blocks as JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<ModelDocument, FormatError> {
        let blocks: Vec<Block> = serde_json::from_str(source)
            .map_err(|e| FormatError::ParseError(format!("Invalid model JSON: {e}")))?;
        Ok(normalize(blocks, &self.settings)?)
    }

    fn serialize(&self, doc: &ModelDocument) -> Result<String, FormatError> {
        serde_json::to_string_pretty(&doc.blocks())
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementName, ItemId, ListType};

    #[test]
    fn test_parse_repairs_attributes() {
        let source = r#"[
            { "name": "paragraph", "listIndent": 3, "text": "p" },
            { "name": "listItem", "listType": "dt", "text": "a" },
            { "name": "listItem", "listType": "value", "listIndent": 5, "text": "b" }
        ]"#;
        let doc = JsonFormat::default().parse(source).unwrap();
        assert!(doc.elements()[0].attributes.is_empty());
        assert_eq!(doc.elements()[1].list_type(), Some(ListType::Term));
        assert_eq!(doc.elements()[1].indent(), 0);
        assert_eq!(doc.elements()[2].indent(), 1);
        assert!(doc.elements()[2].item_id().is_some());
    }

    #[test]
    fn test_serialize() {
        let doc = ModelDocument::from_blocks(vec![
            Block::list_item(ListType::Term, 0, "a").with_id(ItemId::new("x")),
        ]);
        insta::assert_snapshot!(JsonFormat::default().serialize(&doc).unwrap(), @r#"
        [
          {
            "name": "listItem",
            "listType": "term",
            "listIndent": 0,
            "listItemId": "x",
            "text": "a"
          }
        ]
        "#);
    }

    #[test]
    fn test_parse_error() {
        let err = JsonFormat::default().parse("{").unwrap_err();
        assert!(matches!(err, FormatError::ParseError(_)));
        let doc = JsonFormat::default().parse(r#"[{"name": {"heading": 2}, "text": "h"}]"#).unwrap();
        assert_eq!(doc.elements()[0].name, ElementName::Heading(2));
    }
}
