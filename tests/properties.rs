//! Property tests over randomly built records.

use std::collections::BTreeSet;

use proptest::prelude::*;

use sgf_board::board::{Color, Point, point_str};
use sgf_board::edit::{add_move, toggle_marker, toggle_setup_stone};
use sgf_board::markers::MarkerKind;
use sgf_board::session::Session;
use sgf_board::sgf::{load, stringify};
use sgf_board::tree::{GameTree, NodeId, Properties};

fn nine_by_nine() -> GameTree {
    let mut root = Properties::new();
    root.set("SZ", vec!["9".to_string()]);
    GameTree::with_root(root)
}

fn point() -> impl Strategy<Value = Point> {
    (0usize..9, 0usize..9)
}

#[derive(Debug, Clone)]
enum Edit {
    Play(Point),
    Setup(Point, bool),
    Marker(Point, usize),
    Back(usize),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        4 => point().prop_map(Edit::Play),
        1 => (point(), any::<bool>()).prop_map(|(p, black)| Edit::Setup(p, black)),
        1 => (point(), 0usize..5).prop_map(|(p, k)| Edit::Marker(p, k)),
        1 => (0usize..4).prop_map(Edit::Back),
    ]
}

fn build(edits: &[Edit]) -> (GameTree, Session) {
    let mut tree = nine_by_nine();
    let mut session = Session::new();
    for edit in edits {
        match *edit {
            Edit::Play(p) => {
                add_move(&mut tree, &mut session, p);
            }
            Edit::Setup(p, black) => {
                let color = if black { Color::Black } else { Color::White };
                toggle_setup_stone(&mut tree, &session, p, color);
            }
            Edit::Marker(p, k) => {
                let kind = MarkerKind::ALL[k];
                toggle_marker(&mut tree, &session, p, kind, "x");
            }
            Edit::Back(n) => {
                let target = session.move_number.saturating_sub(n);
                session.goto(&tree, target);
            }
        }
    }
    (tree, session)
}

fn assert_same_shape(a: &GameTree, an: NodeId, b: &GameTree, bn: NodeId) {
    assert_eq!(a.props(an), b.props(bn));
    assert_eq!(a.children(an).len(), b.children(bn).len());
    for (&x, &y) in a.children(an).iter().zip(b.children(bn)) {
        assert_same_shape(a, x, b, y);
    }
}

proptest! {
    #[test]
    fn board_is_recomputed_identically(edits in prop::collection::vec(edit(), 0..60)) {
        let (tree, session) = build(&edits);
        prop_assert_eq!(session.board(&tree), session.board(&tree));
        prop_assert_eq!(session.markers(&tree), session.markers(&tree));
    }

    #[test]
    fn stringify_then_load_keeps_every_node(edits in prop::collection::vec(edit(), 0..60)) {
        let (tree, session) = build(&edits);
        let text = stringify(&tree);
        let again = load(&text).unwrap();

        assert_same_shape(&tree, tree.root(), &again, again.root());
        prop_assert_eq!(stringify(&again), text);
        prop_assert_eq!(session.board(&again), session.board(&tree));
    }

    /// Black only on rows 0, 4, 8, ... and white only on rows 2, 6, ...
    /// leaves every odd row empty, so no group can ever lose its last
    /// liberty.
    #[test]
    fn stone_count_without_captures(
        black in prop::collection::btree_set((0usize..19, 0usize..5), 0..40),
        white in prop::collection::btree_set((0usize..19, 0usize..5), 0..40),
        setup in prop::collection::btree_set(0usize..19, 0..10),
    ) {
        let black: Vec<Point> = black.into_iter().map(|(x, band)| (x, band * 4)).collect();
        let white: Vec<Point> = white.into_iter().map(|(x, band)| (x, band * 4 + 2)).collect();
        let pairs = black.len().min(white.len());

        // Setup stones share row 18 with white and never overlap a move.
        let setup: BTreeSet<Point> = setup
            .into_iter()
            .map(|x| (x, 18))
            .filter(|p| !white.contains(p))
            .collect();

        let mut text = String::from("(;SZ[19]");
        if !setup.is_empty() {
            text.push_str("AW");
            for &p in &setup {
                text.push_str(&format!("[{}]", point_str(p).unwrap()));
            }
        }
        for i in 0..pairs {
            text.push_str(&format!(";B[{}]", point_str(black[i]).unwrap()));
            text.push_str(&format!(";W[{}]", point_str(white[i]).unwrap()));
        }
        text.push(')');

        let tree = load(&text).unwrap();
        let mut session = Session::new();
        session.last(&tree);
        prop_assert_eq!(session.move_number, 2 * pairs);
        prop_assert_eq!(session.board(&tree).stone_count(), setup.len() + 2 * pairs);
    }
}
