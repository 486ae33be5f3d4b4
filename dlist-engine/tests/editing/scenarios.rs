//! End-to-end editing scenarios through the editor facade.

use dlist_engine::model::{Block, ItemId, ListType, ModelPosition, Selection};
use dlist_engine::{CommandOptions, InputAction, InputEvent};
use insta::assert_snapshot;

use crate::common::{assert_consistent, caret, editor, html, item, select_blocks, shape};
use ListType::{List, Term, Value};

/// `[(dl,0), (dl,0), (dl,1), (dl,1), (dl,0)]`
fn outline() -> Vec<Block> {
    vec![
        item(List, 0, "a"),
        item(List, 0, "b"),
        item(List, 1, "c"),
        item(List, 1, "d"),
        item(List, 0, "e"),
    ]
}

#[test]
fn test_flat_sequence_renders_nested_containers() {
    let editor = editor(outline());
    assert_snapshot!(html(&editor), @r#"<dl data-list-type="list"><dd>a</dd><dd>b<dl data-list-type="list"><dd>c</dd><dd>d</dd></dl></dd><dd>e</dd></dl>"#);
}

#[test]
fn test_removing_first_nested_item_keeps_one_container() {
    let mut editor = editor(outline());
    let c = editor.model().elements()[2].key();
    editor.change(|w| w.remove(c)).unwrap();

    assert_consistent(&editor);
    assert_snapshot!(html(&editor), @r#"<dl data-list-type="list"><dd>a</dd><dd>b<dl data-list-type="list"><dd>d</dd></dl></dd><dd>e</dd></dl>"#);
}

#[test]
fn test_paragraph_between_nested_items_splits_the_list() {
    let mut editor = editor(outline());
    editor.change(|w| w.insert(3, Block::paragraph("P"))).unwrap();

    assert_consistent(&editor);
    assert_snapshot!(html(&editor), @r#"
    <dl data-list-type="list"><dd>a</dd><dd>b<dl data-list-type="list"><dd>c</dd></dl></dd></dl>
    <p>P</p>
    <dl data-list-type="list"><dd>d</dd><dd>e</dd></dl>
    "#);
}

#[test]
fn test_paste_into_deep_item_rebases_indents() {
    let mut editor = editor(vec![
        item(List, 0, "a"),
        item(List, 1, "b"),
        item(List, 2, "B"),
    ]);
    editor.set_selection(caret(&editor, 2, 1));
    editor
        .paste(vec![item(List, 0, "X"), item(List, 0, "Y")])
        .unwrap();

    assert_eq!(
        shape(editor.model()),
        vec![
            (Some(List), 0, "a".to_string()),
            (Some(List), 1, "b".to_string()),
            (Some(List), 2, "BX".to_string()),
            (Some(List), 2, "Y".to_string()),
        ]
    );
    assert_consistent(&editor);
}

#[test]
fn test_paste_after_item_at_root_position() {
    let mut editor = editor(vec![item(Term, 0, "a"), item(Term, 1, "b")]);
    editor.set_selection(Selection::collapsed(ModelPosition::root(2)));
    editor
        .paste(vec![item(Term, 0, "x"), item(Term, 1, "y")])
        .unwrap();

    let indents: Vec<_> = shape(editor.model()).into_iter().map(|(_, i, _)| i).collect();
    assert_eq!(indents, vec![0, 1, 1, 2]);
    assert_consistent(&editor);
}

#[test]
fn test_toggle_term_over_paragraph_and_value_item() {
    let mut editor = editor(vec![Block::paragraph("p"), item(Value, 0, "v")]);
    editor.set_selection(select_blocks(&editor, 0, 1));
    assert!(editor
        .execute("descriptionTerm", CommandOptions::default())
        .unwrap());

    assert_eq!(
        shape(editor.model()),
        vec![
            (Some(Term), 0, "p".to_string()),
            (Some(Term), 0, "v".to_string()),
        ]
    );
    assert_consistent(&editor);
    assert_snapshot!(html(&editor), @r#"<dl data-list-type="term"><dt>p</dt><dt>v</dt></dl>"#);
}

#[test]
fn test_toggle_off_returns_paragraphs() {
    let mut editor = editor(vec![item(Term, 0, "a"), item(Term, 0, "b")]);
    editor.set_selection(select_blocks(&editor, 0, 1));
    editor
        .execute("descriptionTerm", CommandOptions::default())
        .unwrap();

    assert!(editor
        .model()
        .elements()
        .iter()
        .all(|e| e.attributes.is_empty() && !e.is_list_item()));
    assert_snapshot!(html(&editor), @r"
    <p>a</p>
    <p>b</p>
    ");
}

#[test]
fn test_retyping_a_nested_item_propagates_to_its_level() {
    let mut editor = editor(vec![
        item(Term, 0, "t"),
        item(Value, 1, "v"),
        item(Value, 1, "w"),
    ]);
    editor.set_selection(caret(&editor, 1, 0));
    editor
        .execute("descriptionTerm", CommandOptions::default())
        .unwrap();

    let types: Vec<_> = shape(editor.model()).into_iter().map(|(t, _, _)| t).collect();
    assert_eq!(types, vec![Some(Term), Some(Term), Some(Term)]);
    assert_consistent(&editor);
}

#[test]
fn test_tab_and_shift_tab() {
    let mut editor = editor(vec![item(List, 0, "a"), item(List, 0, "b"), item(List, 1, "c")]);
    editor.set_selection(caret(&editor, 1, 0));

    assert_eq!(editor.handle_input(InputEvent::Tab).unwrap(), InputAction::Indent);
    let indents: Vec<_> = shape(editor.model()).into_iter().map(|(_, i, _)| i).collect();
    assert_eq!(indents, vec![0, 1, 2]);
    assert_consistent(&editor);

    assert_eq!(editor.handle_input(InputEvent::ShiftTab).unwrap(), InputAction::Outdent);
    let indents: Vec<_> = shape(editor.model()).into_iter().map(|(_, i, _)| i).collect();
    assert_eq!(indents, vec![0, 0, 1]);
    assert_consistent(&editor);
}

#[test]
fn test_tab_on_first_item_is_left_to_the_host() {
    let mut editor = editor(vec![item(List, 0, "a")]);
    editor.set_selection(caret(&editor, 0, 0));
    assert_eq!(editor.handle_input(InputEvent::Tab).unwrap(), InputAction::NoOp);
}

#[test]
fn test_removing_a_parent_keeps_children_nested() {
    let mut editor = editor(vec![
        item(List, 0, "a"),
        item(List, 0, "b"),
        item(List, 1, "c"),
        item(List, 2, "d"),
        item(List, 0, "e"),
    ]);
    let b = editor.model().elements()[1].key();
    editor.change(|w| w.remove(b)).unwrap();

    assert_consistent(&editor);
    assert_snapshot!(html(&editor), @r#"<dl data-list-type="list"><dd>a<dl data-list-type="list"><dd>c<dl data-list-type="list"><dd>d</dd></dl></dd></dl></dd><dd>e</dd></dl>"#);
}

#[test]
fn test_backspace_at_start_of_first_item_outdents() {
    let mut editor = editor(vec![Block::paragraph("p"), item(Value, 0, "v")]);
    editor.set_selection(caret(&editor, 1, 0));
    assert_eq!(editor.handle_input(InputEvent::Backspace).unwrap(), InputAction::Outdent);
    assert_eq!(shape(editor.model())[1], (None, 0, "v".to_string()));
    assert_consistent(&editor);
}

#[test]
fn test_enter_splits_and_keeps_nesting() {
    let mut editor = editor(vec![item(Term, 0, "ab"), item(Value, 1, "x")]);
    editor.set_selection(caret(&editor, 0, 1));
    assert_eq!(editor.handle_input(InputEvent::Enter).unwrap(), InputAction::SplitAfter);

    assert_eq!(
        shape(editor.model()),
        vec![
            (Some(Term), 0, "a".to_string()),
            (Some(Term), 0, "b".to_string()),
            (Some(Value), 1, "x".to_string()),
        ]
    );
    let ids: Vec<_> = editor.model().elements().iter().map(|e| e.item_id().cloned()).collect();
    assert_ne!(ids[0], ids[1]);
    assert_consistent(&editor);
}

#[test]
fn test_delete_at_end_merges_next_item() {
    let mut editor = editor(vec![item(List, 0, "ab"), item(List, 0, "cd")]);
    editor.set_selection(caret(&editor, 0, 2));
    assert_eq!(editor.handle_input(InputEvent::Delete).unwrap(), InputAction::MergeForward);
    assert_eq!(shape(editor.model()), vec![(Some(List), 0, "abcd".to_string())]);
    assert_consistent(&editor);
}

#[test]
fn test_root_positions_round_trip_through_the_view() {
    let mut blocks = outline();
    blocks.push(Block::paragraph("p"));
    blocks.push(item(Term, 0, "t"));
    let editor = editor(blocks);
    for offset in 0..=editor.model().len() {
        let position = ModelPosition::root(offset);
        let view_position = editor.to_view_position(&position).unwrap();
        assert_eq!(editor.to_model_position(&view_position).unwrap(), position);
    }
}

#[test]
fn test_markup_paste_gets_unused_ids() {
    let mut editor = editor(vec![item(List, 0, "a").with_id(ItemId::new("item-1"))]);
    editor.set_selection(Selection::collapsed(ModelPosition::root(1)));
    editor
        .paste_markup("<dl data-list-type=\"list\"><dd>b</dd></dl>")
        .unwrap();

    let ids: Vec<_> = editor
        .model()
        .elements()
        .iter()
        .filter_map(|e| e.item_id().map(|id| id.as_str().to_string()))
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    assert_consistent(&editor);
}
