//! Recovers the flat attributes of item elements found in nested list markup.
//!
//! # The High-Level Concept
//!
//! Walking a nested structure in pre-order visits items in exactly the order the flat model
//! stores them. The only thing the walk has to recover is each item's indent, which the nested
//! form only encodes as depth.
//!
//! The depth has to be derived from ancestors because markup in the wild nests lists in more
//! ways than the renderer produces.
//!
//! # The Algorithm
//!
//! 1. Walk the item's ancestors up to the root:
//!    - an item ancestor adds one level
//!    - any other ancestor adds one level when its previous sibling is an item (a container
//!      placed right after an item instead of inside it)
//! 2. The type comes from the enclosing container's `data-list-type`, then from the item tag

use crate::model::ListType;
use crate::view::{ViewDocument, ViewId, TERM_TAG, TYPE_ATTRIBUTE};

/// Indent of an item element, derived from its ancestors.
pub fn item_indent(view: &ViewDocument, item: ViewId) -> usize {
    let mut indent = 0;
    let mut current = view.parent(item);
    while let Some(ancestor) = current {
        if ancestor == view.root() {
            break;
        }
        if view.is_item(ancestor) {
            indent += 1;
        } else if view
            .previous_sibling(ancestor)
            .is_some_and(|sibling| view.is_item(sibling))
        {
            indent += 1;
        }
        current = view.parent(ancestor);
    }
    indent
}

/// Type of an item element: its container's type attribute when valid, else its tag.
///
/// `dd` items without a typed container get `default`.
pub fn item_type(view: &ViewDocument, item: ViewId, default: ListType) -> ListType {
    let declared = view
        .parent(item)
        .filter(|&p| view.is_container(p))
        .and_then(|p| view.attribute(p, TYPE_ATTRIBUTE))
        .and_then(|value| value.parse::<ListType>().ok());
    match declared {
        Some(list_type) => list_type,
        None if view.name(item) == Some(TERM_TAG) => ListType::Term,
        None => default,
    }
}
