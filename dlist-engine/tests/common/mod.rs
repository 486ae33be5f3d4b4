//! Builders and assertions shared by the integration tests.

pub mod generators;

use dlist_engine::model::{Block, ListType, ModelDocument, ModelPosition, Selection};
use dlist_engine::Editor;

pub fn item(list_type: ListType, indent: usize, text: &str) -> Block {
    Block::list_item(list_type, indent, text)
}

/// An editor loaded with `blocks`, its view rendered from scratch.
pub fn editor(blocks: Vec<Block>) -> Editor {
    let mut editor = Editor::default();
    editor.set_blocks(blocks).unwrap();
    editor
}

pub fn caret(editor: &Editor, index: usize, offset: usize) -> Selection {
    let key = editor.model().elements()[index].key();
    Selection::collapsed(ModelPosition::inside(key, offset))
}

pub fn select_blocks(editor: &Editor, first: usize, last: usize) -> Selection {
    let doc = editor.model();
    Selection::blocks(doc, doc.elements()[first].key(), doc.elements()[last].key())
}

/// `(type, indent, text)` of every list item, `None` type for other blocks.
pub fn shape(doc: &ModelDocument) -> Vec<(Option<ListType>, usize, String)> {
    doc.elements()
        .iter()
        .map(|e| (e.list_entry().map(|l| l.list_type), e.indent(), e.text.clone()))
        .collect()
}

pub fn html(editor: &Editor) -> String {
    editor.data().unwrap()
}

/// The incremental view must equal a fresh render of the model.
#[track_caller]
pub fn assert_consistent(editor: &Editor) {
    assert!(
        editor.is_consistent(),
        "incremental view diverged from full render:\n{}",
        html(editor)
    );
}
