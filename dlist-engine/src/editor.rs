//! The editing session
//!
//!     [Editor] ties the pieces together. Every model edit runs inside [Editor::change]:
//!
//!         snapshot → edit closure → post-fix to a fixed point → diff → downcast
//!
//!     The view is only ever touched by the downcast, and the downcast only ever sees a model
//!     the post-fixer has settled. Command states are refreshed after every batch and every
//!     selection change.
//!
//!     Sessions are single-threaded and synchronous; a batch completes before the next one
//!     starts.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::commands::{
    insert_content, merge_backward, merge_forward, split_item, Command, CommandOptions,
    CommandState, IndentCommand, IndentDirection, ListCommand, SplitMode,
};
use crate::conversion::{render_model, Downcaster, Mapper, Upcaster};
use crate::error::{EngineError, FormatError};
use crate::input::{classify_input, InputAction, InputContext, InputEvent};
use crate::model::{
    diff, Block, DefaultSchema, ListType, ModelDocument, ModelParent, ModelPosition,
    ModelWriter, Schema, Selection,
};
use crate::postfixer::{run_to_fixed_point, PostFixer};
use crate::view::{ViewDocument, ViewPosition};

pub const INDENT_COMMAND: &str = "indentList";
pub const OUTDENT_COMMAND: &str = "outdentList";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Bound on post-fix passes per batch
    pub max_postfix_iterations: usize,
    /// Type given to list items that carry none
    pub default_list_type: ListType,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            max_postfix_iterations: 16,
            default_list_type: ListType::Value,
        }
    }
}

/// Builds a settled model from raw blocks.
pub fn normalize(blocks: Vec<Block>, settings: &EngineSettings) -> Result<ModelDocument, EngineError> {
    let mut doc = ModelDocument::new();
    let snapshot = doc.snapshot();
    {
        let mut writer = ModelWriter::new(&mut doc);
        for (index, block) in blocks.into_iter().enumerate() {
            writer.insert(index, block);
        }
    }
    let fixer = PostFixer::new(settings.default_list_type);
    run_to_fixed_point(&fixer, &mut doc, &snapshot, settings.max_postfix_iterations)?;
    Ok(doc)
}

pub struct Editor {
    model: ModelDocument,
    view: ViewDocument,
    mapper: Mapper,
    schema: Rc<dyn Schema>,
    selection: Selection,
    settings: EngineSettings,
    postfixer: PostFixer,
    commands: BTreeMap<&'static str, Rc<dyn Command>>,
    states: BTreeMap<&'static str, CommandState>,
}

impl Default for Editor {
    fn default() -> Self {
        Editor::new(EngineSettings::default())
    }
}

impl Editor {
    pub fn new(settings: EngineSettings) -> Self {
        let mut editor = Editor {
            model: ModelDocument::new(),
            view: ViewDocument::new(),
            mapper: Mapper::with_list_support(),
            schema: Rc::new(DefaultSchema),
            selection: Selection::collapsed(ModelPosition::root(0)),
            settings,
            postfixer: PostFixer::new(settings.default_list_type),
            commands: BTreeMap::new(),
            states: BTreeMap::new(),
        };
        for list_type in ListType::ALL {
            editor.register_command(Rc::new(ListCommand::new(list_type)));
        }
        editor.register_command(Rc::new(IndentCommand::new(IndentDirection::Forward)));
        editor.register_command(Rc::new(IndentCommand::new(IndentDirection::Backward)));
        editor.refresh_states();
        editor
    }

    /// Replaces the schema used by commands.
    pub fn with_schema(mut self, schema: impl Schema + 'static) -> Self {
        self.schema = Rc::new(schema);
        self.refresh_states();
        self
    }

    pub fn register_command(&mut self, command: Rc<dyn Command>) {
        self.commands.insert(command.name(), command);
        self.refresh_states();
    }

    pub fn model(&self) -> &ModelDocument {
        &self.model
    }

    pub fn view(&self) -> &ViewDocument {
        &self.view
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.revalidate(&self.model);
        self.refresh_states();
    }

    pub fn command_state(&self, name: &str) -> Option<CommandState> {
        self.states.get(name).copied()
    }

    /// Runs one change batch.
    ///
    /// The view is brought in sync even when the post-fixer fails to settle; the failure is
    /// reported afterwards.
    pub fn change<R>(&mut self, edit: impl FnOnce(&mut ModelWriter<'_>) -> R) -> Result<R, EngineError> {
        let snapshot = self.model.snapshot();
        let result = edit(&mut ModelWriter::new(&mut self.model));
        let fixed = run_to_fixed_point(
            &self.postfixer,
            &mut self.model,
            &snapshot,
            self.settings.max_postfix_iterations,
        );

        let changes = diff(&snapshot, &self.model);
        debug!(target: "dlist::editor", entries = changes.len(), "applying batch");
        Downcaster::new(&self.model, &mut self.view, &mut self.mapper).convert(&changes)?;

        self.selection = self.selection.revalidate(&self.model);
        self.refresh_states();
        fixed.map(|_| result)
    }

    /// Replaces the whole document. The view is rendered from scratch.
    pub fn set_blocks(&mut self, blocks: Vec<Block>) -> Result<(), EngineError> {
        let snapshot = self.model.snapshot();
        {
            let mut writer = ModelWriter::new(&mut self.model);
            writer.clear();
            for (index, block) in blocks.into_iter().enumerate() {
                writer.insert(index, block);
            }
        }
        let fixed = run_to_fixed_point(
            &self.postfixer,
            &mut self.model,
            &snapshot,
            self.settings.max_postfix_iterations,
        );
        render_model(&self.model, &mut self.view, &mut self.mapper);
        self.selection = Selection::collapsed(
            self.model
                .get(0)
                .map_or(ModelPosition::root(0), |e| ModelPosition::inside(e.key(), 0)),
        );
        self.refresh_states();
        fixed.map(|_| ())
    }

    /// Loads HTML markup as the document.
    pub fn set_data(&mut self, markup: &str) -> Result<(), FormatError> {
        let mut parsed = crate::formats::html::parse_to_view(markup)?;
        let root = parsed.root();
        let blocks = Upcaster::new(self.settings.default_list_type).convert(&mut parsed, root);
        self.set_blocks(blocks)?;
        Ok(())
    }

    /// The document as HTML markup.
    pub fn data(&self) -> Result<String, FormatError> {
        crate::formats::html::serialize_view(&self.view, &Default::default())
    }

    /// Executes a registered command. Returns `false` when it is unknown or disabled.
    pub fn execute(&mut self, name: &str, options: CommandOptions) -> Result<bool, EngineError> {
        let Some(command) = self.commands.get(name).cloned() else {
            warn!(target: "dlist::editor", command = name, "unknown command");
            return Ok(false);
        };
        let state = command.refresh(&self.model, &self.selection, self.schema.as_ref());
        if !state.is_enabled {
            debug!(target: "dlist::editor", command = name, "command disabled");
            return Ok(false);
        }
        let schema = Rc::clone(&self.schema);
        let selection = self.selection;
        self.change(|writer| command.execute(writer, &selection, schema.as_ref(), &options))?;
        Ok(true)
    }

    /// Classifies a key and applies the resulting structural edit.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<InputAction, EngineError> {
        let enabled = |name: &str| self.states.get(name).is_some_and(|s| s.is_enabled);
        let context = InputContext {
            model: &self.model,
            selection: &self.selection,
            indent_enabled: enabled(INDENT_COMMAND),
            outdent_enabled: enabled(OUTDENT_COMMAND),
        };
        let action = classify_input(event, &context);
        debug!(target: "dlist::editor", ?event, ?action, "input");

        let focus = self.selection.focus;
        let caret = match (action, focus.parent) {
            (InputAction::Indent, _) => {
                self.execute(INDENT_COMMAND, CommandOptions::default())?;
                None
            }
            (InputAction::Outdent, _) => {
                self.execute(OUTDENT_COMMAND, CommandOptions::default())?;
                None
            }
            (InputAction::SplitAfter, _) => self.change(|w| split_item(w, &focus, SplitMode::After))?,
            (InputAction::SplitBefore, _) => self.change(|w| split_item(w, &focus, SplitMode::Before))?,
            (InputAction::MergeBackward, ModelParent::Element(key)) => {
                self.change(|w| merge_backward(w, key))?
            }
            (InputAction::MergeForward, ModelParent::Element(key)) => {
                self.change(|w| merge_forward(w, key))?
            }
            _ => None,
        };
        if let Some(caret) = caret {
            self.set_selection(Selection::collapsed(caret));
        }
        Ok(action)
    }

    /// Pastes blocks at the caret.
    pub fn paste(&mut self, blocks: Vec<Block>) -> Result<(), EngineError> {
        let position = self.selection.focus;
        let caret = self.change(|w| insert_content(w, &position, blocks))?;
        self.set_selection(Selection::collapsed(caret));
        Ok(())
    }

    /// Pastes HTML markup at the caret. Pasted items get ids unused in this document.
    pub fn paste_markup(&mut self, markup: &str) -> Result<(), FormatError> {
        let mut parsed = crate::formats::html::parse_to_view(markup)?;
        let root = parsed.root();
        let model = &mut self.model;
        let blocks = Upcaster::new(self.settings.default_list_type)
            .convert_with_ids(&mut parsed, root, || model.fresh_item_id());
        self.paste(blocks)?;
        Ok(())
    }

    pub fn to_view_position(&self, position: &ModelPosition) -> Result<ViewPosition, EngineError> {
        self.mapper.to_view_position(&self.model, &self.view, position)
    }

    pub fn to_model_position(&self, position: &ViewPosition) -> Result<ModelPosition, EngineError> {
        self.mapper.to_model_position(&self.model, &self.view, position)
    }

    /// Whether the incrementally maintained view equals a fresh render of the model.
    pub fn is_consistent(&self) -> bool {
        let mut fresh = ViewDocument::new();
        let mut mapper = Mapper::with_list_support();
        render_model(&self.model, &mut fresh, &mut mapper);
        fresh.tree(fresh.root()) == self.view.tree(self.view.root())
    }

    fn refresh_states(&mut self) {
        self.states = self
            .commands
            .iter()
            .map(|(&name, command)| {
                (name, command.refresh(&self.model, &self.selection, self.schema.as_ref()))
            })
            .collect();
    }
}
