//! In-memory game record.
//!
//! A [`GameTree`] is an arena of [`Node`]s addressed by [`NodeId`]. Each node
//! owns an ordered list of child ids; there are no parent links. Removing a
//! child removes its whole subtree from the arena, so ids of deleted nodes
//! are never reachable from the root again.
//!
//! Node data lives in [`Properties`], a typed view of the SGF property bag:
//! the keys the editor understands get dedicated fields and every other key
//! is kept verbatim so that a record survives a load/save cycle.

use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use tracing::debug;

use crate::board::Color;
use crate::constants::*;
use crate::markers::MarkerKind;

/// A move property: colour plus the raw point value (empty for a pass).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub color: Color,
    pub point: String,
}

/// The property bag of one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    /// `B` or `W`; a node never carries both.
    pub mv: Option<Move>,
    pub add_black: Vec<String>,
    pub add_white: Vec<String>,
    pub add_empty: Vec<String>,
    pub triangle: Vec<String>,
    pub square: Vec<String>,
    pub circle: Vec<String>,
    pub mark: Vec<String>,
    /// `"<point>:<text>"` entries.
    pub label: Vec<String>,
    pub comment: Option<String>,
    pub size: Option<String>,
    /// Game information keys (see [`GAME_INFO_KEYS`]).
    pub info: BTreeMap<String, String>,
    /// Unrecognized keys, passed through untouched.
    pub other: BTreeMap<String, Vec<String>>,
    /// Values past the first on single-valued keys. They are never read,
    /// only written back out.
    pub overflow: BTreeMap<String, Vec<String>>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a node holding a single move.
    pub fn with_move(color: Color, point: impl Into<String>) -> Self {
        Self {
            mv: Some(Move {
                color,
                point: point.into(),
            }),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Return the value list stored under `key` (empty when absent).
    pub fn get(&self, key: &str) -> Vec<&str> {
        fn all(v: &[String]) -> Vec<&str> {
            v.iter().map(String::as_str).collect()
        }
        let mut values = match key {
            PROP_BLACK | PROP_WHITE => match &self.mv {
                Some(mv) if mv.color.move_key() == key => vec![mv.point.as_str()],
                _ => Vec::new(),
            },
            PROP_ADD_BLACK => all(&self.add_black),
            PROP_ADD_WHITE => all(&self.add_white),
            PROP_ADD_EMPTY => all(&self.add_empty),
            PROP_TRIANGLE => all(&self.triangle),
            PROP_SQUARE => all(&self.square),
            PROP_CIRCLE => all(&self.circle),
            PROP_MARK => all(&self.mark),
            PROP_LABEL => all(&self.label),
            PROP_COMMENT => self.comment.as_deref().into_iter().collect(),
            PROP_SIZE => self.size.as_deref().into_iter().collect(),
            k if GAME_INFO_KEYS.contains(&k) => {
                self.info.get(k).map(String::as_str).into_iter().collect()
            }
            k => self.other.get(k).map(|v| all(v)).unwrap_or_default(),
        };
        if let Some(extra) = self.overflow.get(key) {
            values.extend(extra.iter().map(String::as_str));
        }
        values
    }

    /// First value stored under `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).into_iter().next()
    }

    pub fn contains(&self, key: &str) -> bool {
        !self.get(key).is_empty()
    }

    /// Replace the value list stored under `key`. An empty list removes it.
    ///
    /// Single-valued keys read only their first value; any others are kept
    /// aside for output. Setting one move colour replaces a move of the
    /// other colour.
    pub fn set(&mut self, key: &str, mut values: Vec<String>) {
        let single = is_single_valued(key);
        let extra = if single && values.len() > 1 {
            debug!(key, count = values.len(), "extra values on single-valued property");
            values.split_off(1)
        } else {
            Vec::new()
        };
        let first = values.first().cloned();
        match key {
            PROP_BLACK | PROP_WHITE => {
                let color = if key == PROP_BLACK {
                    Color::Black
                } else {
                    Color::White
                };
                match first {
                    Some(point) => {
                        self.overflow.remove(color.opponent().move_key());
                        self.mv = Some(Move { color, point });
                    }
                    None => {
                        if self.mv.as_ref().is_some_and(|mv| mv.color == color) {
                            self.mv = None;
                        }
                    }
                }
            }
            PROP_ADD_BLACK => self.add_black = values,
            PROP_ADD_WHITE => self.add_white = values,
            PROP_ADD_EMPTY => self.add_empty = values,
            PROP_TRIANGLE => self.triangle = values,
            PROP_SQUARE => self.square = values,
            PROP_CIRCLE => self.circle = values,
            PROP_MARK => self.mark = values,
            PROP_LABEL => self.label = values,
            PROP_COMMENT => self.comment = first,
            PROP_SIZE => self.size = first,
            k if GAME_INFO_KEYS.contains(&k) => match first {
                Some(v) => {
                    self.info.insert(k.to_string(), v);
                }
                None => {
                    self.info.remove(k);
                }
            },
            k => {
                if values.is_empty() {
                    self.other.remove(k);
                } else {
                    self.other.insert(k.to_string(), values);
                }
            }
        }
        if single {
            if extra.is_empty() {
                self.overflow.remove(key);
            } else {
                self.overflow.insert(key.to_string(), extra);
            }
        }
    }

    /// Append values to whatever is already stored under `key`.
    pub fn append(&mut self, key: &str, values: Vec<String>) {
        let mut merged: Vec<String> = self.get(key).into_iter().map(str::to_string).collect();
        merged.extend(values);
        self.set(key, merged);
    }

    pub fn remove(&mut self, key: &str) {
        self.set(key, Vec::new());
    }

    /// All stored properties in output order: passthrough keys, size, game
    /// info, setup, move, comment, then annotations.
    pub fn entries(&self) -> Vec<(String, Vec<&str>)> {
        let mut keys: Vec<String> = self.other.keys().cloned().collect();
        keys.push(PROP_SIZE.to_string());
        keys.extend(GAME_INFO_KEYS.iter().map(|k| k.to_string()));
        for k in [
            PROP_ADD_BLACK,
            PROP_ADD_WHITE,
            PROP_ADD_EMPTY,
            PROP_BLACK,
            PROP_WHITE,
            PROP_COMMENT,
            PROP_TRIANGLE,
            PROP_SQUARE,
            PROP_CIRCLE,
            PROP_MARK,
            PROP_LABEL,
        ] {
            keys.push(k.to_string());
        }
        keys.into_iter()
            .filter_map(|k| {
                let values = self.get(&k);
                (!values.is_empty()).then_some((k, values))
            })
            .collect()
    }

    /// Setup lists in application order: add-black, add-white, add-empty.
    pub fn setup(&self) -> [(&[String], Option<Color>); 3] {
        [
            (self.add_black.as_slice(), Some(Color::Black)),
            (self.add_white.as_slice(), Some(Color::White)),
            (self.add_empty.as_slice(), None),
        ]
    }

    pub fn setup_list_mut(&mut self, color: Color) -> &mut Vec<String> {
        match color {
            Color::Black => &mut self.add_black,
            Color::White => &mut self.add_white,
        }
    }

    pub fn markers(&self, kind: MarkerKind) -> &Vec<String> {
        match kind {
            MarkerKind::Triangle => &self.triangle,
            MarkerKind::Square => &self.square,
            MarkerKind::Circle => &self.circle,
            MarkerKind::Mark => &self.mark,
            MarkerKind::Label => &self.label,
        }
    }

    pub fn markers_mut(&mut self, kind: MarkerKind) -> &mut Vec<String> {
        match kind {
            MarkerKind::Triangle => &mut self.triangle,
            MarkerKind::Square => &mut self.square,
            MarkerKind::Circle => &mut self.circle,
            MarkerKind::Mark => &mut self.mark,
            MarkerKind::Label => &mut self.label,
        }
    }
}

fn is_single_valued(key: &str) -> bool {
    matches!(key, PROP_BLACK | PROP_WHITE | PROP_COMMENT | PROP_SIZE)
        || GAME_INFO_KEYS.contains(&key)
}

/// Stable handle to a node in a [`GameTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A node: its properties and its ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub props: Properties,
    children: Vec<NodeId>,
}

impl Node {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_branch_point(&self) -> bool {
        self.children.len() >= 2
    }
}

/// A game record: one root node plus everything reachable from it.
#[derive(Debug, Clone)]
pub struct GameTree {
    nodes: Vec<Option<Node>>,
    root: NodeId,
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTree {
    /// Create a record whose root has an empty property bag.
    pub fn new() -> Self {
        Self::with_root(Properties::new())
    }

    pub fn with_root(props: Properties) -> Self {
        Self {
            nodes: vec![Some(Node {
                props,
                children: Vec::new(),
            })],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn props(&self, id: NodeId) -> &Properties {
        &self[id].props
    }

    pub fn props_mut(&mut self, id: NodeId) -> &mut Properties {
        &mut self[id].props
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self[id].children()
    }

    /// Append a new child to `parent` and return its id.
    pub fn add_child(&mut self, parent: NodeId, props: Properties) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            props,
            children: Vec::new(),
        }));
        self[parent].children.push(id);
        id
    }

    /// Detach `child` from `parent` and drop its subtree.
    ///
    /// Returns `false` if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(pos) = self[parent].children.iter().position(|&c| c == child) else {
            return false;
        };
        self[parent].children.remove(pos);
        self.drop_subtree(child);
        true
    }

    /// Drop every child of `parent` and their subtrees.
    pub fn clear_children(&mut self, parent: NodeId) {
        let children = std::mem::take(&mut self[parent].children);
        for child in children {
            self.drop_subtree(child);
        }
    }

    fn drop_subtree(&mut self, start: NodeId) {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) {
                stack.extend(node.children);
            }
        }
    }

    /// Find the parent of `id` by scanning the live nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.iter().enumerate().find_map(|(i, slot)| {
            slot.as_ref()
                .filter(|node| node.children.contains(&id))
                .map(|_| NodeId(i))
        })
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.root_node().is_leaf()
    }

    fn root_node(&self) -> &Node {
        &self[self.root]
    }

    /// Board size from the root `SZ` property.
    ///
    /// A missing value gives [`DEFAULT_BOARD_SIZE`]; see [`parse_board_size`]
    /// for the rest.
    pub fn board_size(&self) -> usize {
        self.root_node()
            .props
            .size
            .as_deref()
            .map_or(DEFAULT_BOARD_SIZE, |raw| parse_board_size(raw).0)
    }
}

/// Read an `SZ` value, returning the size and whether it was used as
/// written.
///
/// Values outside `1..=MAX_BOARD_SIZE` are clamped and unreadable ones give
/// [`DEFAULT_BOARD_SIZE`]. For rectangular sizes (`"19:13"`) the first
/// dimension is used.
pub fn parse_board_size(raw: &str) -> (usize, bool) {
    let first = raw.split(':').next().unwrap_or(raw).trim();
    match first.parse::<usize>() {
        Ok(size) if (1..=MAX_BOARD_SIZE).contains(&size) => (size, true),
        Ok(size) => (size.clamp(1, MAX_BOARD_SIZE), false),
        Err(_) => (DEFAULT_BOARD_SIZE, false),
    }
}

impl Index<NodeId> for GameTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {id:?} is not in this tree"),
        }
    }
}

impl IndexMut<NodeId> for GameTree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("node {id:?} is not in this tree"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut tree = GameTree::new();
        let root = tree.root();
        let a = tree.add_child(root, Properties::with_move(Color::Black, "aa"));
        let b = tree.add_child(root, Properties::with_move(Color::Black, "bb"));
        let c = tree.add_child(root, Properties::with_move(Color::Black, "cc"));
        assert_eq!(tree.children(root), &[a, b, c]);
        assert!(tree[root].is_branch_point());
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_remove_child_drops_subtree() {
        let mut tree = GameTree::new();
        let root = tree.root();
        let a = tree.add_child(root, Properties::new());
        let b = tree.add_child(a, Properties::new());
        let c = tree.add_child(b, Properties::new());
        let keep = tree.add_child(root, Properties::new());

        assert!(tree.remove_child(root, a));
        assert_eq!(tree.children(root), &[keep]);
        assert!(tree.get(a).is_none());
        assert!(tree.get(b).is_none());
        assert!(tree.get(c).is_none());
        assert_eq!(tree.len(), 2);

        // Removing again is a no-op
        assert!(!tree.remove_child(root, a));
    }

    #[test]
    fn test_parent_lookup() {
        let mut tree = GameTree::new();
        let root = tree.root();
        let a = tree.add_child(root, Properties::new());
        let b = tree.add_child(a, Properties::new());
        assert_eq!(tree.parent(b), Some(a));
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(root), None);
    }

    #[test]
    fn test_move_colors_are_exclusive() {
        let mut props = Properties::new();
        props.set("B", strings(&["dd"]));
        assert_eq!(props.get("B"), vec!["dd"]);
        props.set("W", strings(&["pp"]));
        assert!(props.get("B").is_empty());
        assert_eq!(props.get("W"), vec!["pp"]);

        // Removing the colour that is not set leaves the move alone
        props.remove("B");
        assert_eq!(props.first("W"), Some("pp"));
        props.remove("W");
        assert!(props.mv.is_none());
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let mut props = Properties::new();
        props.set("FF", strings(&["4"]));
        props.set("XX", strings(&["a", "b"]));
        assert_eq!(props.get("XX"), vec!["a", "b"]);
        assert_eq!(props.other.len(), 2);
        props.remove("XX");
        assert!(!props.contains("XX"));
    }

    #[test]
    fn test_game_info_and_comment_fields() {
        let mut props = Properties::new();
        props.set("PB", strings(&["Honinbo Shusaku"]));
        props.set("C", strings(&["nice move"]));
        assert_eq!(props.info.get("PB").map(String::as_str), Some("Honinbo Shusaku"));
        assert_eq!(props.comment.as_deref(), Some("nice move"));
        assert!(props.other.is_empty());
    }

    #[test]
    fn test_append_merges_lists() {
        let mut props = Properties::new();
        props.append("AB", strings(&["aa"]));
        props.append("AB", strings(&["bb", "cc"]));
        assert_eq!(props.get("AB"), vec!["aa", "bb", "cc"]);
    }

    #[test]
    fn test_entries_lists_only_present_keys() {
        let mut props = Properties::with_move(Color::White, "cd");
        props.set("GM", strings(&["1"]));
        props.set("SZ", strings(&["9"]));
        props.set("TR", strings(&["aa", "bb"]));
        let keys: Vec<String> = props.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["GM", "SZ", "W", "TR"]);
    }

    #[test]
    fn test_board_size() {
        let mut tree = GameTree::new();
        assert_eq!(tree.board_size(), DEFAULT_BOARD_SIZE);

        let root = tree.root();
        tree.props_mut(root).set("SZ", strings(&["9"]));
        assert_eq!(tree.board_size(), 9);

        tree.props_mut(root).set("SZ", strings(&["13:13"]));
        assert_eq!(tree.board_size(), 13);

        tree.props_mut(root).set("SZ", strings(&["40"]));
        assert_eq!(tree.board_size(), MAX_BOARD_SIZE);

        tree.props_mut(root).set("SZ", strings(&["big"]));
        assert_eq!(tree.board_size(), DEFAULT_BOARD_SIZE);
    }

    #[test]
    fn test_parse_board_size_flags_adjusted_values() {
        assert_eq!(parse_board_size("19"), (19, true));
        assert_eq!(parse_board_size(" 9:9 "), (9, true));
        assert_eq!(parse_board_size("0"), (1, false));
        assert_eq!(parse_board_size("40"), (MAX_BOARD_SIZE, false));
        assert_eq!(parse_board_size(""), (DEFAULT_BOARD_SIZE, false));
    }

    #[test]
    fn test_single_valued_keys_keep_extra_values() {
        let mut props = Properties::new();
        props.set("C", strings(&["one", "two"]));
        assert_eq!(props.comment.as_deref(), Some("one"));
        assert_eq!(props.get("C"), vec!["one", "two"]);
        assert_eq!(props.entries(), vec![("C".to_string(), vec!["one", "two"])]);

        props.set("C", strings(&["three"]));
        assert_eq!(props.get("C"), vec!["three"]);
        assert!(props.overflow.is_empty());

        props.set("B", strings(&["aa", "bb"]));
        assert_eq!(props.get("B"), vec!["aa", "bb"]);
        props.set("W", strings(&["cc"]));
        assert!(props.get("B").is_empty());
        assert_eq!(props.get("W"), vec!["cc"]);
        assert!(props.overflow.is_empty());
    }
}
