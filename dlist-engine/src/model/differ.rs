//! Change log computation
//!
//!     A batch does not record its operations. Instead, a [Snapshot] of the root sequence is taken
//!     when the batch starts and [diff] compares it with the current document. This makes the log
//!     independent of how many intermediate writes happened and lets the post-fixer re-read the
//!     complete log after each of its passes.
//!
//! The Algorithm
//!
//!     1. Elements present in both states with the same name are move candidates. The longest
//!        increasing subsequence of their old indices (taken in new order) is kept in place; any
//!        other element is reported as removed from its old place and inserted at its new one.
//!        A renamed element is reported the same way: removal of the old name, insertion of the
//!        new one.
//!     2. Both sequences are walked together. Removals are emitted before insertions at the same
//!        point, so that every entry's position is valid when the entries are applied one after
//!        another, starting from the old state.
//!     3. Kept elements report their attribute changes (indent, then type, then id) and a content
//!        change when their text differs.

use std::collections::{HashMap, HashSet};

use super::{
    AttributeKey, AttributeValue, ElementName, ListAttributes, ModelDocument, ModelElement,
    NodeKey,
};

/// The root sequence as it was when a batch started.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    elements: Vec<ModelElement>,
}

impl Snapshot {
    pub(crate) fn new(elements: Vec<ModelElement>) -> Self {
        Snapshot { elements }
    }

    pub fn elements(&self) -> &[ModelElement] {
        &self.elements
    }
}

/// One entry of the change log. `position` is a root offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Insert {
        position: usize,
        key: NodeKey,
        name: ElementName,
    },
    Remove {
        position: usize,
        key: NodeKey,
        name: ElementName,
        attributes: ListAttributes,
    },
    Attribute {
        position: usize,
        key: NodeKey,
        attribute: AttributeKey,
        old: Option<AttributeValue>,
        new: Option<AttributeValue>,
    },
    Content {
        position: usize,
        key: NodeKey,
    },
}

impl Change {
    pub fn position(&self) -> usize {
        match self {
            Change::Insert { position, .. }
            | Change::Remove { position, .. }
            | Change::Attribute { position, .. }
            | Change::Content { position, .. } => *position,
        }
    }

    pub fn key(&self) -> NodeKey {
        match self {
            Change::Insert { key, .. }
            | Change::Remove { key, .. }
            | Change::Attribute { key, .. }
            | Change::Content { key, .. } => *key,
        }
    }
}

pub fn diff(before: &Snapshot, after: &ModelDocument) -> Vec<Change> {
    let old = before.elements();
    let new = after.elements();

    let old_index: HashMap<NodeKey, usize> =
        old.iter().enumerate().map(|(i, e)| (e.key(), i)).collect();

    // (new index, old index) of every element that could stay in place
    let candidates: Vec<(usize, usize)> = new
        .iter()
        .enumerate()
        .filter_map(|(j, e)| {
            let i = *old_index.get(&e.key())?;
            (old[i].name == e.name).then_some((j, i))
        })
        .collect();
    let kept_pairs = longest_increasing(&candidates);
    let kept_old: HashSet<usize> = kept_pairs.iter().map(|&(_, i)| i).collect();
    let kept_new: HashSet<usize> = kept_pairs.iter().map(|&(j, _)| j).collect();

    let mut changes = Vec::new();
    let (mut i, mut j, mut position) = (0, 0, 0);
    while i < old.len() || j < new.len() {
        if i < old.len() && !kept_old.contains(&i) {
            let removed = &old[i];
            changes.push(Change::Remove {
                position,
                key: removed.key(),
                name: removed.name,
                attributes: removed.attributes.clone(),
            });
            i += 1;
        } else if j < new.len() && !kept_new.contains(&j) {
            let inserted = &new[j];
            changes.push(Change::Insert {
                position,
                key: inserted.key(),
                name: inserted.name,
            });
            j += 1;
            position += 1;
        } else {
            // both point at the same kept element
            let (was, now) = (&old[i], &new[j]);
            for attribute in AttributeKey::ALL {
                let (old_value, new_value) =
                    (was.attributes.get(attribute), now.attributes.get(attribute));
                if old_value != new_value {
                    changes.push(Change::Attribute {
                        position,
                        key: now.key(),
                        attribute,
                        old: old_value,
                        new: new_value,
                    });
                }
            }
            if was.text != now.text {
                changes.push(Change::Content {
                    position,
                    key: now.key(),
                });
            }
            i += 1;
            j += 1;
            position += 1;
        }
    }
    changes
}

/// Longest subsequence of `pairs` (already increasing in `.0`) increasing in `.1`.
fn longest_increasing(pairs: &[(usize, usize)]) -> Vec<(usize, usize)> {
    // tails[k] = index into pairs of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; pairs.len()];
    for (n, &(_, value)) in pairs.iter().enumerate() {
        let slot = tails.partition_point(|&t| pairs[t].1 < value);
        previous[n] = slot.checked_sub(1).map(|s| tails[s]);
        if slot == tails.len() {
            tails.push(n);
        } else {
            tails[slot] = n;
        }
    }
    let mut result = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(n) = cursor {
        result.push(pairs[n]);
        cursor = previous[n];
    }
    result.reverse();
    result
}
