//! Structural edits on a game record.
//!
//! Every operation acts on the node shown by the [`Session`] and mutates the
//! tree in place. Operations that change what is displayed update the
//! session's move number; nothing else is cached, so the caller simply asks
//! the session for a fresh board afterwards.
//!
//! Points outside the board are ignored. Apart from that, and the duplicate
//! move case of [`add_move`], every edit is total.

use tracing::debug;

use crate::board::{Color, Point, point_str};
use crate::constants::{GAME_INFO_KEYS, PROP_COMMENT};
use crate::markers::MarkerKind;
use crate::session::Session;
use crate::tree::{GameTree, NodeId, Properties};

/// Result of [`add_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddMove {
    /// The move extends a childless node; the session advanced onto it.
    Continued(NodeId),
    /// The move was added as an extra child; the session did not move.
    Variation(NodeId),
    /// A child with the same move already exists; nothing changed.
    AlreadyExists(NodeId),
    /// The point is off the board; nothing changed.
    OutOfBounds,
}

fn encode(tree: &GameTree, point: Point) -> Option<String> {
    let size = tree.board_size();
    if point.0 >= size || point.1 >= size {
        debug!(?point, size, "point outside the board");
        return None;
    }
    point_str(point)
}

/// Play the next move at `point` from the current position.
///
/// The colour alternates from the last move shown (black first).
pub fn add_move(tree: &mut GameTree, session: &mut Session, point: Point) -> AddMove {
    let Some(value) = encode(tree, point) else {
        return AddMove::OutOfBounds;
    };
    let color = session.next_color(tree);
    let current = session.current_node(tree);

    let existing = tree.children(current).iter().copied().find(|&child| {
        tree.props(child)
            .mv
            .as_ref()
            .is_some_and(|mv| mv.color == color && mv.point == value)
    });
    if let Some(child) = existing {
        debug!(point = %value, "move already exists");
        return AddMove::AlreadyExists(child);
    }

    let continues = tree[current].is_leaf();
    let child = tree.add_child(current, Properties::with_move(color, value.clone()));
    if continues {
        session.move_number += 1;
        debug!(point = %value, ?color, move_number = session.move_number, "added move");
        AddMove::Continued(child)
    } else {
        debug!(point = %value, ?color, "created variation");
        AddMove::Variation(child)
    }
}

/// Toggle a setup stone on the current node.
///
/// Returns `true` if the stone is now present. Adding a stone removes an
/// opposite-colour setup entry on the same point; add-empty is untouched.
pub fn toggle_setup_stone(
    tree: &mut GameTree,
    session: &Session,
    point: Point,
    color: Color,
) -> bool {
    let Some(value) = encode(tree, point) else {
        return false;
    };
    let current = session.current_node(tree);
    let props = tree.props_mut(current);

    let list = props.setup_list_mut(color);
    if list.contains(&value) {
        list.retain(|p| *p != value);
        debug!(point = %value, ?color, "removed setup stone");
        return false;
    }
    props.setup_list_mut(color.opponent()).retain(|p| *p != value);
    props.setup_list_mut(color).push(value.clone());
    debug!(point = %value, ?color, "added setup stone");
    true
}

/// Toggle an annotation on the current node.
///
/// `text` is only used for labels. The same kind (and, for labels, the same
/// text) at `point` is removed; anything else at `point` is replaced, so a
/// cell never carries more than one annotation. Returns `true` if the
/// annotation is now present.
pub fn toggle_marker(
    tree: &mut GameTree,
    session: &Session,
    point: Point,
    kind: MarkerKind,
    text: &str,
) -> bool {
    let Some(at) = encode(tree, point) else {
        return false;
    };
    let value = match kind {
        MarkerKind::Label => format!("{at}:{text}"),
        _ => at.clone(),
    };
    let current = session.current_node(tree);
    let props = tree.props_mut(current);

    if props.markers(kind).contains(&value) {
        props.markers_mut(kind).retain(|v| *v != value);
        debug!(point = %at, ?kind, "removed marker");
        return false;
    }

    let label_prefix = format!("{at}:");
    for other in MarkerKind::ALL {
        props.markers_mut(other).retain(|v| match other {
            MarkerKind::Label => !v.starts_with(&label_prefix),
            _ => *v != at,
        });
    }
    props.markers_mut(kind).push(value);
    debug!(point = %at, ?kind, "added marker");
    true
}

/// Delete the current node and everything after it.
///
/// At move 0 the whole record below the root goes and the selection is
/// reset. Otherwise the node is detached from its parent and the session
/// steps back one move.
pub fn delete_subtree(tree: &mut GameTree, session: &mut Session) {
    let k = session.move_number;
    if k == 0 {
        let root = tree.root();
        tree.clear_children(root);
        *session = Session::new();
        debug!("deleted all moves from root");
        return;
    }

    let line = session.line(tree);
    let Some(record) = line.get(k - 1) else {
        debug!(move_number = k, "nothing to delete past the end of the line");
        return;
    };
    match record.parent {
        Some(parent) => {
            tree.remove_child(parent, record.node);
        }
        // The line is the root itself; drop what follows it.
        None => tree.clear_children(record.node),
    }
    session.selection.branches.retain(|&m, _| m < k);
    session.move_number = k - 1;
    debug!(move_number = k, "deleted node");
}

/// Set the comment on the current node; blank text removes it.
pub fn set_comment(tree: &mut GameTree, session: &Session, text: &str) {
    let current = session.current_node(tree);
    set_single(tree.props_mut(current), PROP_COMMENT, text);
}

/// Set a game information field on the root; blank text removes it.
///
/// Returns `false` for keys that are not game information.
pub fn set_game_info(tree: &mut GameTree, key: &str, value: &str) -> bool {
    if !GAME_INFO_KEYS.contains(&key) {
        return false;
    }
    let root = tree.root();
    set_single(tree.props_mut(root), key, value);
    true
}

fn set_single(props: &mut Properties, key: &str, value: &str) {
    if value.trim().is_empty() {
        props.remove(key);
    } else {
        props.set(key, vec![value.to_string()]);
    }
}
