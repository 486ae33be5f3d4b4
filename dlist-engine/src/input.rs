//! Key handling inside list items
//!
//!     Raw key events never touch the model directly. [classify_input] looks at the selection
//!     and decides which structural edit a key stands for; the editor then dispatches it. Keys
//!     outside list items classify as [InputAction::NoOp] and are left to the host.

use serde::{Deserialize, Serialize};

use crate::model::{ModelDocument, ModelParent, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputEvent {
    Enter,
    Backspace,
    Delete,
    Tab,
    ShiftTab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputAction {
    Outdent,
    Indent,
    SplitBefore,
    SplitAfter,
    MergeForward,
    MergeBackward,
    NoOp,
}

/// What the classifier needs to know besides the key.
#[derive(Debug, Clone, Copy)]
pub struct InputContext<'a> {
    pub model: &'a ModelDocument,
    pub selection: &'a Selection,
    pub indent_enabled: bool,
    pub outdent_enabled: bool,
}

pub fn classify_input(event: InputEvent, context: &InputContext<'_>) -> InputAction {
    match event {
        InputEvent::Tab if context.indent_enabled => return InputAction::Indent,
        InputEvent::ShiftTab if context.outdent_enabled => return InputAction::Outdent,
        InputEvent::Tab | InputEvent::ShiftTab => return InputAction::NoOp,
        _ => {}
    }

    // Structural keys only act on a caret inside a list item.
    let selection = context.selection;
    if !selection.is_collapsed() {
        return InputAction::NoOp;
    }
    let ModelParent::Element(key) = selection.focus.parent else {
        return InputAction::NoOp;
    };
    let model = context.model;
    let (Some(item), Some(index)) = (
        model.element(key).filter(|e| e.is_list_item()),
        model.index_of(key),
    ) else {
        return InputAction::NoOp;
    };
    let offset = selection.focus.offset;
    let previous_is_item = index
        .checked_sub(1)
        .and_then(|i| model.list_item_at(i))
        .is_some();
    let next_is_item = model.list_item_at(index + 1).is_some();

    match event {
        InputEvent::Enter if item.text_len() == 0 => InputAction::Outdent,
        InputEvent::Enter if offset == 0 => InputAction::SplitBefore,
        InputEvent::Enter => InputAction::SplitAfter,
        InputEvent::Backspace if offset > 0 => InputAction::NoOp,
        InputEvent::Backspace if previous_is_item => InputAction::MergeBackward,
        InputEvent::Backspace => InputAction::Outdent,
        InputEvent::Delete if offset == item.text_len() && next_is_item => InputAction::MergeForward,
        _ => InputAction::NoOp,
    }
}
