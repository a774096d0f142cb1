//! Viewer position state.
//!
//! A [`Session`] is everything an editor needs besides the record itself:
//! which move is shown and which variations are chosen. It holds no derived
//! data; the line, board and overlay are recomputed from the tree on every
//! call.

use crate::board::{Board, Color, board_state};
use crate::constants::GAME_INFO_KEYS;
use crate::markers::{MarkerMap, markers_at};
use crate::path::{MoveRecord, Selection, main_line};
use crate::tree::{GameTree, NodeId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Moves replayed so far; 0 is the initial position.
    pub move_number: usize,
    pub selection: Selection,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently selected line.
    pub fn line(&self, tree: &GameTree) -> Vec<MoveRecord> {
        main_line(tree, &self.selection)
    }

    /// The node shown at the current move: the root at move 0, the move node
    /// otherwise. Falls back to the root if the move number is past the end
    /// of the line.
    pub fn current_node(&self, tree: &GameTree) -> NodeId {
        self.current_record(tree)
            .map(|r| r.node)
            .unwrap_or_else(|| tree.root())
    }

    fn current_record(&self, tree: &GameTree) -> Option<MoveRecord> {
        if self.move_number == 0 {
            return None;
        }
        self.line(tree).into_iter().nth(self.move_number - 1)
    }

    pub fn board(&self, tree: &GameTree) -> Board {
        board_state(tree, &self.line(tree), self.move_number)
    }

    pub fn markers(&self, tree: &GameTree) -> MarkerMap {
        markers_at(tree, self.current_node(tree))
    }

    pub fn comment<'a>(&self, tree: &'a GameTree) -> Option<&'a str> {
        tree.props(self.current_node(tree)).comment.as_deref()
    }

    /// Colour of the next move: the opposite of the last move shown, black
    /// at the start or when the last node has no move.
    pub fn next_color(&self, tree: &GameTree) -> Color {
        self.current_record(tree)
            .and_then(|r| tree.props(r.node).mv.as_ref().map(|mv| mv.color.opponent()))
            .unwrap_or(Color::Black)
    }

    pub fn total_moves(&self, tree: &GameTree) -> usize {
        self.line(tree).len()
    }

    pub fn first(&mut self) {
        self.move_number = 0;
    }

    pub fn prev(&mut self) {
        self.move_number = self.move_number.saturating_sub(1);
    }

    pub fn next(&mut self, tree: &GameTree) {
        if self.move_number < self.total_moves(tree) {
            self.move_number += 1;
        }
    }

    pub fn last(&mut self, tree: &GameTree) {
        self.move_number = self.total_moves(tree);
    }

    /// Jump to move `n`, clamped to the line.
    pub fn goto(&mut self, tree: &GameTree, n: usize) {
        self.move_number = n.min(self.total_moves(tree));
    }

    /// Number of continuations branching at the current position.
    pub fn variation_count(&self, tree: &GameTree) -> usize {
        tree.children(self.current_node(tree)).len()
    }

    /// Index of the continuation currently followed from this position.
    pub fn selected_variation(&self) -> usize {
        if self.move_number == 0 {
            self.selection.root_variation
        } else {
            self.selection.choice(self.move_number)
        }
    }

    /// Follow continuation `index` from the current position.
    ///
    /// At move 0 this picks the root variation and forgets every later
    /// choice. Returns `false` if there is no such continuation.
    pub fn select_variation(&mut self, tree: &GameTree, index: usize) -> bool {
        if index >= self.variation_count(tree) {
            return false;
        }
        if self.move_number == 0 {
            self.selection.root_variation = index;
            self.selection.branches.clear();
        } else {
            self.selection.choose(self.move_number, index);
        }
        true
    }
}

/// Root metadata, read verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameInfo {
    pub entries: Vec<(&'static str, String)>,
}

impl GameInfo {
    pub fn read(tree: &GameTree) -> Self {
        let props = tree.props(tree.root());
        let entries = GAME_INFO_KEYS
            .iter()
            .filter_map(|&key| props.info.get(key).map(|v| (key, v.clone())))
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}
