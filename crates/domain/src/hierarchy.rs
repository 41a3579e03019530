//! Parent/child forests built from flat records.
//!
//! Replies, categories and similar records are stored flat, each naming at
//! most one parent. [`build_forest`] turns such a list into trees:
//!
//! - an item whose parent is absent, unknown, itself, or part of a cycle is a root;
//! - roots keep their input order;
//! - siblings are ordered newest first, ties keeping input order.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A record that can be placed in a parent/child hierarchy.
pub trait Hierarchical {
    type Key: Eq + Hash;

    fn key(&self) -> &Self::Key;

    /// Returns the key of the parent, if any.
    fn parent_key(&self) -> Option<&Self::Key>;

    fn created_at(&self) -> DateTime<Utc>;
}

/// One item with its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode<T> {
    pub item: T,
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    /// Counts every node below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    Unseen,
    OnPath,
    Done,
}

/// Arranges `items` into a forest.
pub fn build_forest<T: Hierarchical>(items: Vec<T>) -> Vec<TreeNode<T>> {
    let mut index: HashMap<&T::Key, usize> = HashMap::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        index.entry(item.key()).or_insert(position);
    }

    let mut parents: Vec<Option<usize>> = items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            item.parent_key()
                .and_then(|key| index.get(key).copied())
                .filter(|&parent| parent != position)
        })
        .collect();

    break_cycles(&mut parents);

    let created: Vec<DateTime<Utc>> = items.iter().map(|item| item.created_at()).collect();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    let mut roots = Vec::new();
    for (position, parent) in parents.iter().enumerate() {
        match parent {
            Some(parent) => children[*parent].push(position),
            None => roots.push(position),
        }
    }
    for siblings in &mut children {
        siblings.sort_by(|a, b| created[*b].cmp(&created[*a]));
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    roots
        .into_iter()
        .filter_map(|root| assemble(root, &children, &mut slots))
        .collect()
}

/// Returns the sub-thread under `key`, wherever it sits in the forest.
///
/// Empty when no item has that key.
pub fn children_of<T: Hierarchical>(key: &T::Key, items: Vec<T>) -> Vec<TreeNode<T>> {
    find_children(key, build_forest(items)).unwrap_or_default()
}

/// Detaches every node that sits on a parent cycle.
fn break_cycles(parents: &mut [Option<usize>]) {
    let mut state = vec![Visit::Unseen; parents.len()];
    let mut broken = 0usize;

    for start in 0..parents.len() {
        if state[start] != Visit::Unseen {
            continue;
        }

        let mut path = Vec::new();
        let mut cursor = Some(start);
        while let Some(node) = cursor {
            match state[node] {
                Visit::Done => break,
                Visit::OnPath => {
                    let entry = path.iter().position(|&n| n == node).unwrap_or(0);
                    for &member in &path[entry..] {
                        parents[member] = None;
                        broken += 1;
                    }
                    break;
                }
                Visit::Unseen => {
                    state[node] = Visit::OnPath;
                    path.push(node);
                    cursor = parents[node];
                }
            }
        }

        for node in path {
            state[node] = Visit::Done;
        }
    }

    if broken > 0 {
        tracing::debug!(nodes = broken, "parent cycle detached into roots");
    }
}

fn assemble<T>(
    position: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<T>],
) -> Option<TreeNode<T>> {
    let item = slots[position].take()?;
    let children = children[position]
        .iter()
        .filter_map(|&child| assemble(child, children, slots))
        .collect();
    Some(TreeNode { item, children })
}

fn find_children<T: Hierarchical>(
    key: &T::Key,
    nodes: Vec<TreeNode<T>>,
) -> Option<Vec<TreeNode<T>>> {
    for node in nodes {
        if node.item.key() == key {
            return Some(node.children);
        }
        if let Some(found) = find_children(key, node.children) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Reply {
        id: u32,
        parent: Option<u32>,
        at: DateTime<Utc>,
    }

    impl Hierarchical for Reply {
        type Key = u32;

        fn key(&self) -> &u32 {
            &self.id
        }

        fn parent_key(&self) -> Option<&u32> {
            self.parent.as_ref()
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.at
        }
    }

    fn reply(id: u32, parent: Option<u32>, minute: i64) -> Reply {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        Reply {
            id,
            parent,
            at: base + Duration::minutes(minute),
        }
    }

    fn ids(nodes: &[TreeNode<Reply>]) -> Vec<u32> {
        nodes.iter().map(|n| n.item.id).collect()
    }

    #[test]
    fn roots_keep_input_order() {
        let forest = build_forest(vec![reply(3, None, 5), reply(1, None, 1), reply(2, None, 9)]);
        assert_eq!(ids(&forest), vec![3, 1, 2]);
    }

    #[test]
    fn children_are_newest_first() {
        let forest = build_forest(vec![
            reply(1, None, 0),
            reply(2, Some(1), 1),
            reply(3, Some(1), 3),
            reply(4, Some(1), 2),
        ]);

        assert_eq!(forest.len(), 1);
        assert_eq!(ids(&forest[0].children), vec![3, 4, 2]);
    }

    #[test]
    fn nests_at_any_depth() {
        let forest = build_forest(vec![
            reply(4, Some(3), 3),
            reply(1, None, 0),
            reply(3, Some(2), 2),
            reply(2, Some(1), 1),
        ]);

        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(forest[0].descendant_count(), 3);
        let deepest = &forest[0].children[0].children[0].children;
        assert_eq!(ids(deepest), vec![4]);
    }

    #[test]
    fn unknown_and_self_parents_become_roots() {
        let forest = build_forest(vec![reply(1, Some(99), 0), reply(2, Some(2), 1)]);
        assert_eq!(ids(&forest), vec![1, 2]);
        assert!(forest.iter().all(|n| n.children.is_empty()));
    }

    #[test]
    fn cycle_members_become_roots() {
        let forest = build_forest(vec![
            reply(1, Some(2), 0),
            reply(2, Some(1), 1),
            reply(3, Some(1), 2),
        ]);

        assert_eq!(ids(&forest), vec![1, 2]);
        assert_eq!(ids(&forest[0].children), vec![3]);
    }

    #[test]
    fn every_item_appears_once() {
        let items = vec![
            reply(1, None, 0),
            reply(2, Some(1), 1),
            reply(3, Some(4), 2),
            reply(4, Some(3), 3),
            reply(5, Some(4), 4),
        ];
        let forest = build_forest(items);
        let total: usize = forest.iter().map(|n| 1 + n.descendant_count()).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn children_of_finds_nested_thread() {
        let items = vec![
            reply(1, None, 0),
            reply(2, Some(1), 1),
            reply(3, Some(2), 2),
            reply(4, Some(2), 3),
        ];

        assert_eq!(ids(&children_of(&2, items.clone())), vec![4, 3]);
        assert_eq!(ids(&children_of(&1, items.clone())), vec![2]);
        assert!(children_of(&3, items.clone()).is_empty());
        assert!(children_of(&42, items).is_empty());
    }

    #[test]
    fn empty_input_yields_empty_forest() {
        assert!(build_forest(Vec::<Reply>::new()).is_empty());
    }
}
