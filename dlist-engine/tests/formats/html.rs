//! Markup import and export through the HTML format.

use dlist_engine::format::Format;
use dlist_engine::model::{ElementName, ListType};
use dlist_engine::{EngineSettings, FormatRegistry, HtmlFormat, HtmlOptions, JsonFormat};
use insta::assert_snapshot;

use crate::common::{assert_consistent, html, shape};

fn normalized(markup: &str) -> String {
    let format = HtmlFormat::default();
    let doc = format.parse(markup).unwrap();
    format.serialize(&doc).unwrap()
}

#[test]
fn test_tags_without_type_attribute() {
    let doc = HtmlFormat::default()
        .parse("<dl><dt>Apple</dt><dd>A fruit</dd><dt>Pear</dt><dd>Another</dd></dl>")
        .unwrap();
    let types: Vec<_> = shape(&doc).into_iter().map(|(t, i, _)| (t, i)).collect();
    assert_eq!(
        types,
        vec![
            (Some(ListType::Term), 0),
            (Some(ListType::Value), 0),
            (Some(ListType::Term), 0),
            (Some(ListType::Value), 0),
        ]
    );
}

#[test]
fn test_mixed_tags_render_as_separate_containers() {
    assert_snapshot!(normalized("<dl><dt>Apple</dt><dd>A fruit</dd></dl>"), @r#"
    <dl data-list-type="term"><dt>Apple</dt></dl>
    <dl data-list-type="value"><dd>A fruit</dd></dl>
    "#);
}

#[test]
fn test_nested_lists_inside_items() {
    let markup = r#"
        <dl data-list-type="term">
          <dt>Fruit
            <dl data-list-type="value"><dd>Apple</dd><dd>Pear</dd></dl>
          </dt>
          <dt>Vegetable</dt>
        </dl>"#;
    assert_snapshot!(normalized(markup), @r#"<dl data-list-type="term"><dt>Fruit<dl data-list-type="value"><dd>Apple</dd><dd>Pear</dd></dl></dt><dt>Vegetable</dt></dl>"#);
}

#[test]
fn test_junk_inside_containers_is_dropped() {
    let markup = r#"<dl data-list-type="list"><span>junk</span><dd>a</dd>text<dd>b</dd></dl>"#;
    assert_snapshot!(normalized(markup), @r#"<dl data-list-type="list"><dd>a</dd><dd>b</dd></dl>"#);
}

#[test]
fn test_block_inside_item_splits_it() {
    let markup = r#"<dl data-list-type="value"><dd>before<h2>Title</h2>after</dd></dl>"#;
    let doc = HtmlFormat::default().parse(markup).unwrap();
    let names: Vec<_> = doc.elements().iter().map(|e| e.name).collect();
    assert_eq!(
        names,
        vec![ElementName::ListItem, ElementName::Heading(2), ElementName::ListItem]
    );
    assert_eq!(doc.elements()[2].text, "after");
    assert_ne!(doc.elements()[0].item_id(), doc.elements()[2].item_id());
}

#[test]
fn test_inline_markup_is_flattened() {
    assert_snapshot!(
        normalized("<div><p>Some <strong>bold</strong>   text</p><dl data-list-type=\"list\"><dd><em>x</em> y</dd></dl></div>"),
        @r#"
    <p>Some bold text</p>
    <dl data-list-type="list"><dd>x y</dd></dl>
    "#
    );
}

#[test]
fn test_deeply_nested_markup_keeps_its_levels() {
    let markup = r#"<dl data-list-type="list"><dd>a</dd><dd><dl data-list-type="list"><dd><dl data-list-type="list"><dd>deep</dd></dl></dd></dl></dd></dl>"#;
    let doc = HtmlFormat::default().parse(markup).unwrap();
    let indents: Vec<_> = shape(&doc).into_iter().map(|(_, i, _)| i).collect();
    assert_eq!(indents, vec![0, 0, 1, 2]);
}

#[test]
fn test_json_indent_jumps_are_repaired() {
    let source = r#"[
        {"name": "listItem", "listType": "list", "listIndent": 2, "text": "a"},
        {"name": "listItem", "listType": "list", "listIndent": 5, "text": "b"},
        {"name": "paragraph", "listType": "term", "text": "p"}
    ]"#;
    let doc = JsonFormat::default().parse(source).unwrap();
    assert_eq!(
        shape(&doc),
        vec![
            (Some(ListType::List), 0, "a".to_string()),
            (Some(ListType::List), 1, "b".to_string()),
            (None, 0, "p".to_string()),
        ]
    );
    assert!(doc.elements()[2].attributes.is_empty());
}

#[test]
fn test_default_type_applies_to_untyped_values() {
    let settings = EngineSettings {
        default_list_type: ListType::List,
        ..EngineSettings::default()
    };
    let format = HtmlFormat::new(HtmlOptions::default(), settings);
    let doc = format.parse("<dl><dd>a</dd></dl>").unwrap();
    assert_eq!(doc.elements()[0].list_type(), Some(ListType::List));
}

#[test]
fn test_editor_set_data_and_data() {
    let mut editor = dlist_engine::Editor::default();
    editor
        .set_data("<p>intro</p><dl data-list-type=\"term\"><dt>a</dt><dt>b</dt></dl>")
        .unwrap();
    assert_consistent(&editor);
    assert_snapshot!(html(&editor), @r#"
    <p>intro</p>
    <dl data-list-type="term"><dt>a</dt><dt>b</dt></dl>
    "#);
}

#[test]
fn test_registry_converts_html_to_json() {
    let registry = FormatRegistry::default();
    let doc = registry.parse("<dl><dt>a</dt></dl>", "html").unwrap();
    assert_snapshot!(registry.serialize(&doc, "json").unwrap(), @r#"
    [
      {
        "name": "listItem",
        "listType": "term",
        "listIndent": 0,
        "listItemId": "item-1",
        "text": "a"
      }
    ]
    "#);
}
