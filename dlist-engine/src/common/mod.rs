//! Contains the logic shared by both converters for mapping between the flat model and the
//! nested view.

pub mod flat_to_nested;
pub mod nested_to_flat;

pub use flat_to_nested::{build_forest, FlatItem, ListGroup, ListNode};
pub use nested_to_flat::{item_indent, item_type};
