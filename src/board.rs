//! Board reconstruction.
//!
//! A [`Board`] is a plain 2D grid of optional stones. It is never stored:
//! [`board_state`] rebuilds it from the root setup and the first `k` moves of
//! a resolved line every time it is asked.
//!
//! Replay is deliberately rules-light. A move overwrites its point, then
//! removes any adjacent opposing group left without a liberty. Ko and
//! suicide are not checked; a self-capturing move stays on the board.

use std::fmt;

use crate::constants::{PROP_BLACK, PROP_WHITE};
use crate::path::MoveRecord;
use crate::tree::{GameTree, Properties};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// The move property key for this colour (`B` or `W`).
    pub fn move_key(self) -> &'static str {
        match self {
            Color::Black => PROP_BLACK,
            Color::White => PROP_WHITE,
        }
    }
}

/// `(column, row)`, zero-based.
pub type Point = (usize, usize);

/// Decode a two-letter SGF point (`"dd"` is column 3, row 3).
///
/// Returns `None` for anything that is not two lowercase letters, which
/// covers the empty pass value.
pub fn parse_point(s: &str) -> Option<Point> {
    match s.as_bytes() {
        &[x, y] if x.is_ascii_lowercase() && y.is_ascii_lowercase() => {
            Some(((x - b'a') as usize, (y - b'a') as usize))
        }
        _ => None,
    }
}

/// Encode a point as two SGF letters.
///
/// Returns `None` when a coordinate is past `'z'`.
pub fn point_str((x, y): Point) -> Option<String> {
    if x >= 26 || y >= 26 {
        return None;
    }
    Some(format!("{}{}", (b'a' + x as u8) as char, (b'a' + y as u8) as char))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub size: usize,
    cells: Vec<Option<Color>>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if !self.contains(x, y) {
            return None;
        }
        self.cells[self.idx(x, y)]
    }

    /// Set or clear a cell. Out-of-bounds points are ignored.
    pub fn set(&mut self, x: usize, y: usize, color: Option<Color>) {
        if self.contains(x, y) {
            let i = self.idx(x, y);
            self.cells[i] = color;
        }
    }

    /// Number of occupied cells.
    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = Point> + '_ {
        let s = self.size;
        let mut v = Vec::new();
        if x > 0 {
            v.push((x - 1, y));
        }
        if x + 1 < s {
            v.push((x + 1, y));
        }
        if y > 0 {
            v.push((x, y - 1));
        }
        if y + 1 < s {
            v.push((x, y + 1));
        }
        v.into_iter()
    }

    /// Place a stone and remove the opposing groups it captures.
    pub fn play(&mut self, x: usize, y: usize, color: Color) -> MoveResult {
        if !self.contains(x, y) {
            return MoveResult::skipped();
        }
        self.set(x, y, Some(color));

        let opp = color.opponent();
        let mut to_remove: Vec<Point> = Vec::new();
        for (nx, ny) in self.neighbors(x, y) {
            // A group already queued is reached again through another neighbour.
            if self.get(nx, ny) == Some(opp)
                && !to_remove.contains(&(nx, ny))
                && !self.has_liberty(nx, ny)
            {
                self.collect_group(nx, ny, &mut to_remove);
            }
        }
        for &(rx, ry) in &to_remove {
            self.set(rx, ry, None);
        }

        MoveResult {
            placed: true,
            captures: to_remove.len(),
        }
    }

    /// Apply a node's setup lists: add-black, add-white, then add-empty.
    pub fn apply_setup(&mut self, props: &Properties) {
        for (points, color) in props.setup() {
            for (x, y) in points.iter().filter_map(|p| parse_point(p)) {
                self.set(x, y, color);
            }
        }
    }

    fn collect_group(&self, x: usize, y: usize, out: &mut Vec<Point>) -> usize {
        let Some(color) = self.get(x, y) else {
            return 0;
        };
        let mut stack = vec![(x, y)];
        let mut visited = vec![false; self.size * self.size];
        let mut count = 0;
        while let Some((cx, cy)) = stack.pop() {
            let i = self.idx(cx, cy);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            if self.get(cx, cy) == Some(color) {
                out.push((cx, cy));
                count += 1;
                for (nx, ny) in self.neighbors(cx, cy) {
                    let ni = self.idx(nx, ny);
                    if !visited[ni] && self.get(nx, ny) == Some(color) {
                        stack.push((nx, ny));
                    }
                }
            }
        }
        count
    }

    /// Whether the group at `(x, y)` touches at least one empty cell.
    ///
    /// Stops at the first liberty found.
    fn has_liberty(&self, x: usize, y: usize) -> bool {
        let Some(color) = self.get(x, y) else {
            return false;
        };
        let mut stack = vec![(x, y)];
        let mut visited = vec![false; self.size * self.size];
        while let Some((cx, cy)) = stack.pop() {
            let i = self.idx(cx, cy);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            for (nx, ny) in self.neighbors(cx, cy) {
                let ni = self.idx(nx, ny);
                match self.get(nx, ny) {
                    None => return true,
                    Some(c) if c == color && !visited[ni] => stack.push((nx, ny)),
                    _ => {}
                }
            }
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    /// False when the point was off the board (or a pass).
    pub placed: bool,
    pub captures: usize,
}

impl MoveResult {
    fn skipped() -> Self {
        MoveResult {
            placed: false,
            captures: 0,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                let ch = match self.get(x, y) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Rebuild the position after the first `k` moves of `line`.
///
/// Root setup is applied first, then each move followed by that move node's
/// own setup. `k` past the end of the line replays the whole line.
pub fn board_state(tree: &GameTree, line: &[MoveRecord], k: usize) -> Board {
    let mut board = Board::new(tree.board_size());
    board.apply_setup(tree.props(tree.root()));

    for record in line.iter().take(k) {
        let props = tree.props(record.node);
        if let Some(mv) = &props.mv {
            if let Some((x, y)) = parse_point(&mv.point) {
                board.play(x, y, mv.color);
            }
        }
        board.apply_setup(props);
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(board: &mut Board, moves: &[(&str, Color)]) {
        for &(p, color) in moves {
            let (x, y) = parse_point(p).unwrap();
            board.play(x, y, color);
        }
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("aa"), Some((0, 0)));
        assert_eq!(parse_point("dp"), Some((3, 15)));
        assert_eq!(parse_point("zz"), Some((25, 25)));
        assert_eq!(parse_point(""), None);
        assert_eq!(parse_point("A1"), None);
        assert_eq!(parse_point("abc"), None);
    }

    #[test]
    fn test_point_str() {
        assert_eq!(point_str((3, 15)).as_deref(), Some("dp"));
        assert_eq!(point_str((26, 0)), None);
    }

    #[test]
    fn test_single_stone_capture() {
        let mut board = Board::new(9);
        play_all(
            &mut board,
            &[
                ("bb", Color::Black),
                ("ab", Color::White),
                ("ba", Color::White),
                ("bc", Color::White),
            ],
        );
        assert_eq!(board.get(1, 1), Some(Color::Black));

        let result = board.play(2, 1, Color::White);
        assert_eq!(result.captures, 1);
        assert_eq!(board.get(1, 1), None);
        for (x, y) in [(0, 1), (1, 0), (1, 2), (2, 1)] {
            assert_eq!(board.get(x, y), Some(Color::White));
        }
    }

    #[test]
    fn test_corner_capture() {
        let mut board = Board::new(9);
        play_all(&mut board, &[("aa", Color::White), ("ab", Color::Black)]);
        let result = board.play(1, 0, Color::Black);
        assert_eq!(result.captures, 1);
        assert_eq!(board.get(0, 0), None);
    }

    #[test]
    fn test_group_capture() {
        let mut board = Board::new(9);
        // White pair at dd/de, black around it
        play_all(
            &mut board,
            &[
                ("dd", Color::White),
                ("de", Color::White),
                ("cd", Color::Black),
                ("ce", Color::Black),
                ("ed", Color::Black),
                ("ee", Color::Black),
                ("dc", Color::Black),
            ],
        );
        assert_eq!(board.stone_count(), 7);
        let result = board.play(3, 5, Color::Black);
        assert_eq!(result.captures, 2);
        assert_eq!(board.get(3, 3), None);
        assert_eq!(board.get(3, 4), None);
    }

    #[test]
    fn test_group_with_liberty_survives() {
        let mut board = Board::new(9);
        play_all(
            &mut board,
            &[("dd", Color::White), ("de", Color::White), ("cd", Color::Black)],
        );
        let result = board.play(4, 3, Color::Black);
        assert_eq!(result.captures, 0);
        assert_eq!(board.get(3, 3), Some(Color::White));
    }

    #[test]
    fn test_self_capture_stays_on_board() {
        let mut board = Board::new(9);
        play_all(&mut board, &[("ab", Color::Black), ("ba", Color::Black)]);
        let result = board.play(0, 0, Color::White);
        assert!(result.placed);
        assert_eq!(result.captures, 0);
        assert_eq!(board.get(0, 0), Some(Color::White));
    }

    #[test]
    fn test_out_of_bounds_is_skipped() {
        let mut board = Board::new(9);
        let result = board.play(9, 0, Color::Black);
        assert!(!result.placed);
        board.set(0, 12, Some(Color::White));
        assert_eq!(board.stone_count(), 0);
    }

    #[test]
    fn test_setup_order() {
        let mut props = Properties::new();
        props.add_black = vec!["aa".into(), "bb".into(), "zz".into()];
        props.add_white = vec!["bb".into()];
        props.add_empty = vec!["aa".into()];

        let mut board = Board::new(9);
        board.apply_setup(&props);
        assert_eq!(board.get(0, 0), None);
        assert_eq!(board.get(1, 1), Some(Color::White));
        assert_eq!(board.stone_count(), 1);
    }

    #[test]
    fn test_display() {
        let mut board = Board::new(3);
        board.play(0, 0, Color::Black);
        board.play(2, 1, Color::White);
        assert_eq!(board.to_string(), "X . . \n. . O \n. . . \n");
    }
}
