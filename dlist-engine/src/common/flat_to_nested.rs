//! Rebuilds the nested list forest from a flat run of list items.
//!
//! # The High-Level Concept
//!
//! A run of list items is an outline written as margins: every item carries an indent and the
//! hierarchy is whatever those indents imply. Rebuilding the tree uses a stack of "open"
//! levels. The bottom of the stack holds the top-level containers; every level above it holds
//! the containers nested inside the last item of the level below.
//!
//! Consecutive items of one level share a container as long as their types agree. A type change
//! at a level closes the current container and opens a sibling one.
//!
//! # The Algorithm
//!
//! 1. **Initialization:**
//!    - Push an empty top level onto the stack
//!
//! 2. **Choosing the target level for an item:**
//!    - An indent deeper than the current depth opens exactly one new level, and only if the
//!      current level already has an item to nest under. Deeper jumps are clamped.
//!    - A shallower indent closes levels until the stack depth matches it.
//!
//! 3. **Closing a level:**
//!    - Pop its containers and attach them as children of the last item of the level below
//!
//! 4. **Placing the item:**
//!    - Append it to the last container of the target level when the types match, otherwise
//!      start a new container
//!
//! 5. **Completion:**
//!    - Close every level above the bottom one; the bottom level is the forest
//!
//! Runs coming out of the post-fixer never need the clamping, but the rebuild accepts any input
//! so it can also render documents that have not been fixed yet.

use crate::model::ListType;

/// One entry of a flat run: its type, its indent and whatever the caller wants to carry along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatItem<T> {
    pub list_type: ListType,
    pub indent: usize,
    pub payload: T,
}

/// A container: consecutive same-level items of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListGroup<T> {
    pub list_type: ListType,
    pub items: Vec<ListNode<T>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNode<T> {
    pub payload: T,
    pub children: Vec<ListGroup<T>>,
}

pub fn build_forest<T>(items: impl IntoIterator<Item = FlatItem<T>>) -> Vec<ListGroup<T>> {
    let mut stack: Vec<Vec<ListGroup<T>>> = vec![Vec::new()];

    for item in items {
        let depth = stack.len() - 1;
        let can_open = stack[depth].last().is_some();
        let target = if item.indent > depth && can_open {
            depth + 1
        } else {
            item.indent.min(depth)
        };

        while stack.len() - 1 > target {
            close_level(&mut stack);
        }
        if target == stack.len() {
            stack.push(Vec::new());
        }

        let Some(level) = stack.last_mut() else {
            continue;
        };
        let node = ListNode {
            payload: item.payload,
            children: Vec::new(),
        };
        match level.last_mut() {
            Some(group) if group.list_type == item.list_type => group.items.push(node),
            _ => level.push(ListGroup {
                list_type: item.list_type,
                items: vec![node],
            }),
        }
    }

    while stack.len() > 1 {
        close_level(&mut stack);
    }
    stack.pop().unwrap_or_default()
}

fn close_level<T>(stack: &mut Vec<Vec<ListGroup<T>>>) {
    let Some(groups) = stack.pop() else {
        return;
    };
    if let Some(parent) = stack
        .last_mut()
        .and_then(|level| level.last_mut())
        .and_then(|group| group.items.last_mut())
    {
        parent.children.extend(groups);
    }
}
