//! Line resolution: from a branching record to a flat list of moves.
//!
//! The walk starts at one node and keeps descending. Move nodes are
//! recorded and numbered from 1; comment/setup-only nodes are passed
//! through without consuming a number. At every node with children the
//! [`Selection`] decides which child to follow, falling back to the first
//! child and clamping out-of-range choices to the last one.

use std::collections::BTreeMap;

use crate::tree::{GameTree, NodeId};

/// One move on the resolved line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub node: NodeId,
    /// The node this one hangs from; `None` only when the walk started at
    /// the root and the root itself is a move.
    pub parent: Option<NodeId>,
    /// 1-based.
    pub move_number: usize,
    /// Children of `node`, i.e. the continuations that branch here.
    pub variations: Vec<NodeId>,
}

/// Which child to follow at each branch point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Child of the root that starts the line.
    pub root_variation: usize,
    /// Move number → child index. Missing entries mean "first child".
    pub branches: BTreeMap<usize, usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The child index requested after `move_number` moves.
    pub fn choice(&self, move_number: usize) -> usize {
        self.branches.get(&move_number).copied().unwrap_or(0)
    }

    pub fn choose(&mut self, move_number: usize, index: usize) {
        self.branches.insert(move_number, index);
    }
}

/// Walk from `start`, choosing children by `branches`.
pub fn resolve_line(
    tree: &GameTree,
    start: NodeId,
    branches: &BTreeMap<usize, usize>,
) -> Vec<MoveRecord> {
    let mut records = Vec::new();
    let mut cursor = start;
    let mut parent = tree.parent(start);

    loop {
        let node = &tree[cursor];
        if node.props.mv.is_some() {
            records.push(MoveRecord {
                node: cursor,
                parent,
                move_number: records.len() + 1,
                variations: node.children().to_vec(),
            });
        }

        let children = node.children();
        if children.is_empty() {
            break;
        }
        let wanted = branches.get(&records.len()).copied().unwrap_or(0);
        parent = Some(cursor);
        cursor = children[wanted.min(children.len() - 1)];
    }
    records
}

/// The node the line starts from: the selected root variation, or the root
/// itself when it has no children.
pub fn line_start(tree: &GameTree, selection: &Selection) -> NodeId {
    let root = tree.root();
    let children = tree.children(root);
    if children.is_empty() {
        return root;
    }
    children[selection.root_variation.min(children.len() - 1)]
}

/// Resolve the line picked out by `selection`.
pub fn main_line(tree: &GameTree, selection: &Selection) -> Vec<MoveRecord> {
    resolve_line(tree, line_start(tree, selection), &selection.branches)
}
