//! Annotation overlay for a single position.
//!
//! Explicit annotations are placed kind by kind (triangle, square, circle,
//! cross-mark, label), a later kind replacing an earlier one on the same
//! cell. Variation hints come last and only fill cells that are still free.

use std::fmt;

use crate::board::parse_point;
use crate::constants::{PROP_CIRCLE, PROP_LABEL, PROP_MARK, PROP_SQUARE, PROP_TRIANGLE};
use crate::tree::{GameTree, NodeId, Properties};

/// The five annotation properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Triangle,
    Square,
    Circle,
    Mark,
    Label,
}

impl MarkerKind {
    /// Placement order; later kinds win.
    pub const ALL: [MarkerKind; 5] = [
        MarkerKind::Triangle,
        MarkerKind::Square,
        MarkerKind::Circle,
        MarkerKind::Mark,
        MarkerKind::Label,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MarkerKind::Triangle => PROP_TRIANGLE,
            MarkerKind::Square => PROP_SQUARE,
            MarkerKind::Circle => PROP_CIRCLE,
            MarkerKind::Mark => PROP_MARK,
            MarkerKind::Label => PROP_LABEL,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "triangle" | "tr" => Some(MarkerKind::Triangle),
            "square" | "sq" => Some(MarkerKind::Square),
            "circle" | "cr" => Some(MarkerKind::Circle),
            "mark" | "cross" | "ma" => Some(MarkerKind::Mark),
            "label" | "lb" => Some(MarkerKind::Label),
            _ => None,
        }
    }
}

/// What a cell of the overlay shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Triangle,
    Square,
    Circle,
    Mark,
    Label(String),
    /// Auto-generated hint for the first move of a variation.
    Variation(String),
}

/// Split an `LB` value into its point and text.
///
/// The point must be two lowercase letters and the text non-empty.
pub fn parse_label(value: &str) -> Option<((usize, usize), &str)> {
    let (point, text) = value.split_once(':')?;
    if text.is_empty() {
        return None;
    }
    parse_point(point).map(|p| (p, text))
}

/// Letter shown for the variation at `index`: `A`..`Z`, then the 1-based
/// number.
pub fn variation_label(index: usize) -> String {
    if index < 26 {
        ((b'A' + index as u8) as char).to_string()
    } else {
        (index + 1).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMap {
    pub size: usize,
    cells: Vec<Option<Marker>>,
}

impl MarkerMap {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Marker> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.cells[y * self.size + x].as_ref()
    }

    fn slot(&mut self, x: usize, y: usize) -> Option<&mut Option<Marker>> {
        if x >= self.size || y >= self.size {
            return None;
        }
        Some(&mut self.cells[y * self.size + x])
    }

    /// Number of annotated cells.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for MarkerMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                let ch = match self.get(x, y) {
                    Some(Marker::Triangle) => '^',
                    Some(Marker::Square) => '#',
                    Some(Marker::Circle) => 'o',
                    Some(Marker::Mark) => 'x',
                    Some(Marker::Label(text)) | Some(Marker::Variation(text)) => {
                        text.chars().next().unwrap_or('?')
                    }
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Build the overlay for a node and the variations branching from it.
///
/// `variations` are labelled `A`, `B`, ... in the order given, at the point
/// of their move, unless that cell already carries an annotation.
pub fn resolve_markers(props: &Properties, variations: &[&Properties], size: usize) -> MarkerMap {
    let mut map = MarkerMap::new(size);

    for kind in MarkerKind::ALL {
        for value in props.markers(kind) {
            let placed = match kind {
                MarkerKind::Label => {
                    parse_label(value).map(|(p, text)| (p, Marker::Label(text.to_string())))
                }
                _ => parse_point(value).map(|p| {
                    let marker = match kind {
                        MarkerKind::Triangle => Marker::Triangle,
                        MarkerKind::Square => Marker::Square,
                        MarkerKind::Circle => Marker::Circle,
                        _ => Marker::Mark,
                    };
                    (p, marker)
                }),
            };
            if let Some(((x, y), marker)) = placed {
                if let Some(slot) = map.slot(x, y) {
                    *slot = Some(marker);
                }
            }
        }
    }

    for (index, variation) in variations.iter().enumerate() {
        let Some((x, y)) = variation.mv.as_ref().and_then(|mv| parse_point(&mv.point)) else {
            continue;
        };
        if let Some(slot) = map.slot(x, y) {
            if slot.is_none() {
                *slot = Some(Marker::Variation(variation_label(index)));
            }
        }
    }

    map
}

/// Overlay for `node` in `tree`; its children are shown as variations when
/// there are at least two of them.
pub fn markers_at(tree: &GameTree, node: NodeId) -> MarkerMap {
    let children = tree.children(node);
    let variations: Vec<&Properties> = if children.len() > 1 {
        children.iter().map(|&c| tree.props(c)).collect()
    } else {
        Vec::new()
    };
    resolve_markers(tree.props(node), &variations, tree.board_size())
}
