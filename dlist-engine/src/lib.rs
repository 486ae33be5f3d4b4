//! Description-list reconciliation for structured editors
//!
//!     This crate keeps two representations of a document consistent under incremental edits:
//!
//!         - the model: a flat sequence of root-level blocks. List items carry a type
//!           (`list`, `term`, `value`), an indent and an item id. There is no nesting in the
//!           model; hierarchy is implied by the indent sequence.
//!         - the view: a nested tree of `dl` containers holding `dt` / `dd` items, where a
//!           nested list lives inside the item it belongs to.
//!
//!     The model owns semantic truth. The view is a cache that can always be re-derived from
//!     the model, but is maintained incrementally so that unrelated parts of it survive edits.
//!
//!     TLDR:
//!         - Edits go through the model only (commands, input handling, paste, loading).
//!         - After every batch, the post-fixer repairs the model until it settles, then the
//!           downcast converter patches the view from the batch's change log.
//!         - Markup coming in goes through the upcast converter and then the post-fixer, like
//!           any other insertion.
//!         - The incremental view must always equal a full render of the model. Tests check this
//!           after every edit sequence.
//!
//! Architecture
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── model                   # flat blocks, writer, differ, schema
//!     ├── view                    # arena tree of dl/dt/dd, view writer primitives
//!     ├── common                  # flat ⇄ nested list algorithms shared by both converters
//!     ├── conversion
//!     │   ├── downcast.rs         # model changes → view surgery, full render
//!     │   ├── upcast.rs           # markup tree → flat blocks
//!     │   └── mapper.rs           # model ⇄ view positions
//!     ├── postfixer.rs            # indent / type / id repair, fixed-point driver
//!     ├── commands.rs             # list toggles, indent, split / merge, paste
//!     ├── input.rs                # key → structural action classification
//!     ├── editor.rs               # the editing session tying it together
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     └── formats                 # html, json, treeviz
//!
//! Core Algorithms
//!
//!     The heavy lifting is reconstructing a nested list from a flat run of items and the
//!     reverse. Both live in ./common (flat_to_nested.rs and nested_to_flat.rs) and are shared by
//!     the full render, the upcast converter and the tests, so the incremental surgery of the
//!     downcast converter is always checked against one reference shape.
//!
//!     The post-fixer enforces the model invariants:
//!
//!         - the first item of a run has indent 0 and no item is more than one level deeper than
//!           the item before it
//!         - every item of a same-level block below a parent shares the type established for
//!           that level
//!         - item ids are unique except for contiguous fragments of one split item
//!
//!     Malformed input is never rejected, it is repaired.
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── common/mod.rs           # shared builders and assertions
//!     ├── scenarios.rs            # end-to-end editing scenarios
//!     ├── properties.rs           # proptest invariants
//!     └── html.rs                 # markup import / export
//!
//!     Note that rust does not by default discover tests in subdirectories, so these are
//!     included from lib.rs.

pub mod commands;
pub mod common;
pub mod conversion;
pub mod editor;
pub mod error;
pub mod format;
pub mod formats;
pub mod input;
pub mod model;
pub mod postfixer;
pub mod registry;
pub mod view;

pub use commands::{Command, CommandOptions, CommandState, IndentCommand, IndentDirection, ListCommand, SplitMode};
pub use editor::{normalize, Editor, EngineSettings};
pub use error::{EngineError, FormatError};
pub use format::Format;
pub use formats::{HtmlFormat, HtmlOptions, JsonFormat, TreevizFormat};
pub use input::{classify_input, InputAction, InputContext, InputEvent};
pub use model::{Block, ElementName, ItemId, ListType, ModelDocument, ModelPosition, Selection};
pub use postfixer::PostFixer;
pub use registry::FormatRegistry;
pub use view::{ViewDocument, ViewId, ViewPosition};
