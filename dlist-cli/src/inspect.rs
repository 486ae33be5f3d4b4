//! CLI inspect transforms
//!
//! Each transform loads the input into an editing session and dumps one of its two
//! representations:
//!
//! - `model-json`: the flat model after post-fixing, as JSON blocks
//! - `view-treeviz`: the incrementally maintained view as a tree with Unicode icons
//! - `view-html`: the same view serialized as HTML
//!
//! Loading goes through the same path an editor would take. HTML input is upcast and
//! post-fixed, JSON input is inserted as blocks and post-fixed; both are then rendered into
//! the view.
//!
//! ## Extra Parameters
//!
//! - `show-keys`: with `view-treeviz`, append the model key of every element
//! - `type-attribute`: with `view-html`, whether containers carry `data-list-type`
//!
//! Example: `dlist inspect doc.html view-treeviz --extra-show-keys`

use dlist_engine::formats::html::{serialize_view, HtmlOptions};
use dlist_engine::formats::treeviz::view_to_treeviz_str;
use dlist_engine::{Editor, EngineSettings, Format, JsonFormat};
use std::collections::HashMap;

/// All available inspect transforms
pub const AVAILABLE_TRANSFORMS: &[&str] = &["model-json", "view-treeviz", "view-html"];

/// Format of the file being inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Html,
    Json,
}

impl InputKind {
    pub fn from_format_name(name: &str) -> Option<Self> {
        match name {
            "html" => Some(InputKind::Html),
            "json" => Some(InputKind::Json),
            _ => None,
        }
    }
}

/// Settings an inspect run starts from, before extra parameters are applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct InspectDefaults {
    pub settings: EngineSettings,
    pub html: HtmlOptions,
    pub show_keys: bool,
}

/// Loads `source` into an editor the way an editing session would.
pub fn load(source: &str, kind: InputKind, settings: EngineSettings) -> Result<Editor, String> {
    let mut editor = Editor::new(settings);
    match kind {
        InputKind::Html => editor
            .set_data(source)
            .map_err(|e| format!("Load failed: {e}"))?,
        InputKind::Json => {
            let doc = JsonFormat::new(settings)
                .parse(source)
                .map_err(|e| format!("Load failed: {e}"))?;
            editor
                .set_blocks(doc.blocks())
                .map_err(|e| format!("Load failed: {e}"))?;
        }
    }
    Ok(editor)
}

/// Execute a named transform on a source file with optional extra parameters
pub fn execute_transform(
    source: &str,
    kind: InputKind,
    transform_name: &str,
    defaults: &InspectDefaults,
    extra_params: &HashMap<String, String>,
) -> Result<String, String> {
    let editor = load(source, kind, defaults.settings)?;

    match transform_name {
        "model-json" => {
            let output = JsonFormat::new(defaults.settings)
                .serialize(editor.model())
                .map_err(|e| format!("JSON serialization failed: {e}"))?;
            Ok(format!("{output}\n"))
        }
        "view-treeviz" => {
            let show_keys = bool_param(extra_params, "show-keys")?.unwrap_or(defaults.show_keys);
            Ok(view_to_treeviz_str(editor.view(), editor.mapper(), show_keys))
        }
        "view-html" => {
            let options = HtmlOptions {
                type_attribute: bool_param(extra_params, "type-attribute")?
                    .unwrap_or(defaults.html.type_attribute),
            };
            let output =
                serialize_view(editor.view(), &options).map_err(|e| format!("Serialization failed: {e}"))?;
            Ok(format!("{output}\n"))
        }
        _ => Err(format!(
            "Unknown transform: {transform_name}. Available: {}",
            AVAILABLE_TRANSFORMS.join(", ")
        )),
    }
}

fn bool_param(params: &HashMap<String, String>, key: &str) -> Result<Option<bool>, String> {
    match params.get(key).map(|v| v.to_lowercase()) {
        None => Ok(None),
        Some(v) if matches!(v.as_str(), "true" | "1" | "yes") => Ok(Some(true)),
        Some(v) if matches!(v.as_str(), "false" | "0" | "no") => Ok(Some(false)),
        Some(other) => Err(format!("Invalid boolean value '{other}' for {key}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"<dl data-list-type="term"><dt>Apple<dl data-list-type="value"><dd>A fruit</dd></dl></dt></dl>"#;

    #[test]
    fn test_model_json_lists_flat_blocks() {
        let output = execute_transform(
            SOURCE,
            InputKind::Html,
            "model-json",
            &InspectDefaults::default(),
            &HashMap::new(),
        )
        .unwrap();
        assert!(output.contains("\"listType\": \"term\""));
        assert!(output.contains("\"listIndent\": 1"));
    }

    #[test]
    fn test_view_treeviz_shows_nesting() {
        let output = execute_transform(
            SOURCE,
            InputKind::Html,
            "view-treeviz",
            &InspectDefaults::default(),
            &HashMap::new(),
        )
        .unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert!(lines[0].contains("View"));
        assert!(output.contains("Apple"));
        assert!(output.contains("A fruit"));
        assert!(!output.contains("{#"));
    }

    #[test]
    fn test_show_keys_param_overrides_default() {
        let mut params = HashMap::new();
        params.insert("show-keys".to_string(), "true".to_string());
        let output = execute_transform(
            SOURCE,
            InputKind::Html,
            "view-treeviz",
            &InspectDefaults::default(),
            &params,
        )
        .unwrap();
        assert!(output.contains("{#"));
    }

    #[test]
    fn test_view_html_without_type_attribute() {
        let mut params = HashMap::new();
        params.insert("type-attribute".to_string(), "false".to_string());
        let output = execute_transform(
            SOURCE,
            InputKind::Html,
            "view-html",
            &InspectDefaults::default(),
            &params,
        )
        .unwrap();
        assert_eq!(output, "<dl><dt>Apple<dl><dd>A fruit</dd></dl></dt></dl>\n");
    }

    #[test]
    fn test_json_input_is_post_fixed() {
        let source = r#"[{"name": "listItem", "listType": "list", "listIndent": 3, "text": "a"}]"#;
        let output = execute_transform(
            source,
            InputKind::Json,
            "view-html",
            &InspectDefaults::default(),
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(output, "<dl data-list-type=\"list\"><dd>a</dd></dl>\n");
    }

    #[test]
    fn test_unknown_transform_is_an_error() {
        let result = execute_transform(
            SOURCE,
            InputKind::Html,
            "ast-tag",
            &InspectDefaults::default(),
            &HashMap::new(),
        );
        assert!(result.unwrap_err().contains("Unknown transform"));
    }
}
