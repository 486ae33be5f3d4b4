//! Invariants checked over generated documents and edit sequences.

use dlist_engine::conversion::{render_model, Mapper};
use dlist_engine::format::Format;
use dlist_engine::formats::html::serialize_model;
use dlist_engine::model::{Block, ElementName, ListType, ModelDocument};
use dlist_engine::view::{ViewDocument, ViewId, ViewWriter};
use dlist_engine::{normalize, Editor, EngineSettings, HtmlFormat, HtmlOptions};
use proptest::prelude::*;

use crate::common::generators::{apply, block, edit};

fn settled(blocks: Vec<Block>) -> ModelDocument {
    normalize(blocks, &EngineSettings::default()).unwrap()
}

type Shape = Vec<(ElementName, Option<(ListType, usize)>, String)>;

fn shape(doc: &ModelDocument) -> Shape {
    doc.elements()
        .iter()
        .map(|e| {
            (
                e.name,
                e.list_entry().map(|l| (l.list_type, l.indent)),
                e.text.clone(),
            )
        })
        .collect()
}

fn containers(view: &ViewDocument) -> Vec<ViewId> {
    view.descendants(view.root())
        .into_iter()
        .filter(|&n| view.is_container(n))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_html_round_trip_preserves_the_model(blocks in prop::collection::vec(block(), 0..12)) {
        let doc = settled(blocks);
        let html = serialize_model(&doc, &HtmlOptions::default()).unwrap();
        let back = HtmlFormat::default().parse(&html).unwrap();
        prop_assert_eq!(shape(&back), shape(&doc), "markup: {}", html);
    }

    #[test]
    fn prop_indents_never_jump(blocks in prop::collection::vec(block(), 0..16)) {
        let doc = settled(blocks);
        let mut previous: Option<usize> = None;
        for element in doc.elements() {
            match (element.list_entry(), previous) {
                (Some(entry), None) => {
                    prop_assert_eq!(entry.indent, 0);
                    previous = Some(0);
                }
                (Some(entry), Some(before)) => {
                    prop_assert!(entry.indent <= before + 1);
                    previous = Some(entry.indent);
                }
                (None, _) => {
                    prop_assert!(element.attributes.is_empty());
                    previous = None;
                }
            }
        }
    }

    #[test]
    fn prop_same_level_blocks_share_a_type(blocks in prop::collection::vec(block(), 0..16)) {
        let doc = settled(blocks);
        let elements = doc.elements();
        for (index, element) in elements.iter().enumerate() {
            let Some(entry) = element.list_entry() else { continue };
            if entry.indent == 0 {
                continue;
            }
            // nearest earlier item of the same block at this level
            let sibling = elements[..index]
                .iter()
                .rev()
                .map_while(|e| e.list_entry())
                .take_while(|e| e.indent >= entry.indent)
                .find(|e| e.indent == entry.indent);
            if let Some(sibling) = sibling {
                prop_assert_eq!(sibling.list_type, entry.list_type);
            }
        }
    }

    #[test]
    fn prop_rendered_views_have_nothing_left_to_merge(blocks in prop::collection::vec(block(), 0..16)) {
        let doc = settled(blocks);
        let mut view = ViewDocument::new();
        let mut mapper = Mapper::with_list_support();
        render_model(&doc, &mut view, &mut mapper);
        let before = view.tree(view.root());

        for container in containers(&view) {
            if !view.is_attached(container) {
                continue;
            }
            let next = view.next_sibling(container);
            let merged = ViewWriter::new(&mut view).merge_view_lists(Some(container), next);
            prop_assert!(merged.is_none());
        }
        prop_assert_eq!(view.tree(view.root()), before);
    }

    #[test]
    fn prop_incremental_view_equals_full_render(
        blocks in prop::collection::vec(block(), 0..10),
        edits in prop::collection::vec(edit(), 1..8),
    ) {
        let mut editor = Editor::default();
        editor.set_blocks(blocks).unwrap();
        for edit in &edits {
            editor.change(|w| apply(w, edit)).unwrap();
            prop_assert!(editor.is_consistent(), "after {:?}: {}", edit, editor.data().unwrap());
        }
    }

    #[test]
    fn prop_root_positions_round_trip(blocks in prop::collection::vec(block(), 0..12)) {
        let mut editor = Editor::default();
        editor.set_blocks(blocks).unwrap();
        for offset in 0..=editor.model().len() {
            let position = dlist_engine::ModelPosition::root(offset);
            let mapped = editor.to_view_position(&position).unwrap();
            prop_assert_eq!(editor.to_model_position(&mapped).unwrap(), position);
        }
    }
}
