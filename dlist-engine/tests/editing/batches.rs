//! Change batches carrying several edits, and command sequences.

use dlist_engine::editor::{INDENT_COMMAND, OUTDENT_COMMAND};
use dlist_engine::model::{AttributeValue, Block, ListType};
use dlist_engine::{CommandOptions, Editor, InputEvent};
use insta::assert_snapshot;
use proptest::prelude::*;

use crate::common::generators::{apply, block, edit, list_type};
use crate::common::{assert_consistent, caret, editor, html, item, select_blocks, shape};

#[test]
fn test_outdenting_a_selection_keeps_deeper_followers_nested() {
    let mut editor = editor(vec![
        item(ListType::List, 0, "a"),
        item(ListType::List, 1, "b"),
        item(ListType::List, 2, "c"),
        item(ListType::List, 2, "d"),
    ]);
    let selection = select_blocks(&editor, 0, 2);
    editor.set_selection(selection);
    assert!(editor.execute(OUTDENT_COMMAND, CommandOptions::default()).unwrap());

    assert_eq!(
        shape(editor.model()),
        vec![
            (None, 0, "a".to_string()),
            (Some(ListType::List), 0, "b".to_string()),
            (Some(ListType::List), 1, "c".to_string()),
            (Some(ListType::List), 2, "d".to_string()),
        ]
    );
    assert_consistent(&editor);
    assert_snapshot!(html(&editor), @r#"
    <p>a</p>
    <dl data-list-type="list"><dd>b<dl data-list-type="list"><dd>c<dl data-list-type="list"><dd>d</dd></dl></dd></dl></dd></dl>
    "#);
}

#[test]
fn test_split_then_remove_of_the_head_in_one_batch() {
    let mut editor = editor(vec![
        item(ListType::List, 0, "a"),
        item(ListType::List, 1, "b"),
        item(ListType::List, 2, "c"),
    ]);
    let b = editor.model().elements()[1].key();
    editor
        .change(|w| {
            w.split(b, 0);
            w.remove(b);
        })
        .unwrap();

    assert_eq!(
        shape(editor.model()),
        vec![
            (Some(ListType::List), 0, "a".to_string()),
            (Some(ListType::List), 1, "b".to_string()),
            (Some(ListType::List), 2, "c".to_string()),
        ]
    );
    assert_consistent(&editor);
}

#[test]
fn test_reindent_and_paragraph_inserts_in_one_batch() {
    let mut editor = editor(vec![
        item(ListType::List, 0, "a"),
        item(ListType::Term, 1, "b"),
        item(ListType::Term, 1, "c"),
        item(ListType::Value, 1, "d"),
    ]);
    let d = editor.model().elements()[3].key();
    editor
        .change(|w| {
            w.set_attribute(d, AttributeValue::Indent(2));
            w.insert(1, Block::paragraph("p"));
            w.insert(5, Block::paragraph("q"));
        })
        .unwrap();

    let texts: Vec<String> = shape(editor.model()).into_iter().map(|(_, _, t)| t).collect();
    assert_eq!(texts, ["a", "p", "b", "c", "d", "q"]);
    assert_consistent(&editor);
}

#[derive(Debug, Clone)]
enum Action {
    SelectBlocks(usize, usize),
    Caret(usize, usize),
    Command(&'static str),
    Key(InputEvent),
    Paste(Vec<Block>),
}

fn command() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(INDENT_COMMAND),
        Just(OUTDENT_COMMAND),
        list_type().prop_map(|t| t.command_name()),
    ]
}

fn key() -> impl Strategy<Value = InputEvent> {
    prop_oneof![
        Just(InputEvent::Enter),
        Just(InputEvent::Backspace),
        Just(InputEvent::Delete),
        Just(InputEvent::Tab),
        Just(InputEvent::ShiftTab),
    ]
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        2 => (any::<usize>(), 0usize..4).prop_map(|(first, span)| Action::SelectBlocks(first, span)),
        2 => (any::<usize>(), 0usize..6).prop_map(|(index, offset)| Action::Caret(index, offset)),
        3 => command().prop_map(Action::Command),
        2 => key().prop_map(Action::Key),
        1 => prop::collection::vec(block(), 1..4).prop_map(Action::Paste),
    ]
}

fn perform(editor: &mut Editor, action: &Action) {
    let len = editor.model().len();
    match action {
        Action::SelectBlocks(first, span) if len > 0 => {
            let first = first % len;
            let selection = select_blocks(editor, first, (first + span).min(len - 1));
            editor.set_selection(selection);
        }
        Action::Caret(index, offset) if len > 0 => {
            let index = index % len;
            let offset = (*offset).min(editor.model().elements()[index].text_len());
            let selection = caret(editor, index, offset);
            editor.set_selection(selection);
        }
        Action::Command(name) => {
            editor.execute(name, CommandOptions::default()).unwrap();
        }
        Action::Key(event) => {
            editor.handle_input(*event).unwrap();
        }
        Action::Paste(blocks) => editor.paste(blocks.clone()).unwrap(),
        Action::SelectBlocks(..) | Action::Caret(..) => {}
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_multi_edit_batches_keep_the_view_in_sync(
        blocks in prop::collection::vec(block(), 0..10),
        batches in prop::collection::vec(prop::collection::vec(edit(), 1..6), 1..5),
    ) {
        let mut editor = editor(blocks);
        for batch in &batches {
            editor.change(|w| {
                for edit in batch {
                    apply(w, edit);
                }
            }).unwrap();
            prop_assert!(editor.is_consistent(), "after {:?}:\n{}", batch, html(&editor));
        }
    }

    #[test]
    fn prop_command_sequences_keep_the_view_in_sync(
        blocks in prop::collection::vec(block(), 0..10),
        actions in prop::collection::vec(action(), 1..12),
    ) {
        let mut editor = editor(blocks);
        for action in &actions {
            perform(&mut editor, action);
            prop_assert!(editor.is_consistent(), "after {:?}:\n{}", action, html(&editor));
        }
    }
}
