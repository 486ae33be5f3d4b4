//! The two schema questions the list engine asks

use super::{ElementName, ModelParent};

pub trait Schema {
    /// Whether an element called `name` may be placed inside `parent`.
    fn can_have_child_at(&self, parent: ModelParent, name: ElementName) -> bool;

    /// Whether `name` is an atomic block that list conversion must leave alone.
    fn is_object(&self, name: ElementName) -> bool;
}

/// Blocks live at the root only; `Object` is the only atomic block.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSchema;

impl Schema for DefaultSchema {
    fn can_have_child_at(&self, parent: ModelParent, _name: ElementName) -> bool {
        matches!(parent, ModelParent::Root)
    }

    fn is_object(&self, name: ElementName) -> bool {
        matches!(name, ElementName::Object)
    }
}
