//! SGF text reader and writer.
//!
//! Grammar (FF[4]):
//!
//! ```text
//! Collection = GameTree { GameTree }
//! GameTree   = "(" Sequence { GameTree } ")"
//! Sequence   = Node { Node }
//! Node       = ";" { Property }
//! Property   = PropIdent PropValue { PropValue }
//! PropValue  = "[" text "]"
//! ```
//!
//! Whitespace between tokens is ignored, as is anything before the first
//! `(`. Inside a value `\` escapes the next character and an escaped line
//! break is dropped. Lowercase letters in identifiers (FF[3] long names such
//! as `AddBlack`) are skipped.

use tracing::warn;

use crate::constants::{PROP_BLACK, PROP_WHITE};
use crate::error::{Result, SgfError};
use crate::tree::{GameTree, NodeId, Properties, parse_board_size};

/// Parse every game tree in `text`.
///
/// Input without any `(` yields an empty list.
pub fn parse(text: &str) -> Result<Vec<GameTree>> {
    let mut parser = Parser::new(text);
    let mut trees = Vec::new();
    while parser.skip_to_tree() {
        trees.push(parser.game_tree()?);
    }
    Ok(trees)
}

/// Parse `text` and return its first game tree.
pub fn load(text: &str) -> Result<GameTree> {
    parse(text)?.into_iter().next().ok_or(SgfError::NoGameTree)
}

/// Serialize a record back to SGF.
pub fn stringify(tree: &GameTree) -> String {
    let mut out = String::new();
    write_tree(&mut out, tree, tree.root());
    out
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            src: text.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> SgfError {
        SgfError::Parse {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Advance to the next `(`; false at end of input.
    fn skip_to_tree(&mut self) -> bool {
        while let Some(b) = self.peek() {
            if b == b'(' {
                return true;
            }
            self.pos += 1;
        }
        false
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        self.skip_whitespace();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", byte as char)))
        }
    }

    fn game_tree(&mut self) -> Result<GameTree> {
        let mut tree = GameTree::new();
        let root = tree.root();
        self.expect(b'(')?;
        self.skip_whitespace();
        if self.peek() != Some(b';') {
            return Err(self.error("game tree must start with a node"));
        }
        self.pos += 1;
        *tree.props_mut(root) = self.properties()?;
        if let Some(raw) = tree.props(root).size.as_deref() {
            let (size, exact) = parse_board_size(raw);
            if !exact {
                warn!(value = raw, size, "unsupported board size");
            }
        }
        self.sequence_and_variations(&mut tree, root)?;
        Ok(tree)
    }

    /// Parse the remaining nodes and variations of a game tree whose root
    /// is `root`, up to and including its closing `)`.
    fn sequence_and_variations(&mut self, tree: &mut GameTree, root: NodeId) -> Result<()> {
        // One entry per open variation: the node it hangs from.
        let mut open: Vec<NodeId> = Vec::new();
        let mut last = root;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b';') => {
                    self.pos += 1;
                    let props = self.properties()?;
                    last = tree.add_child(last, props);
                }
                Some(b'(') => {
                    self.pos += 1;
                    self.expect(b';')?;
                    let props = self.properties()?;
                    open.push(last);
                    last = tree.add_child(last, props);
                }
                Some(b')') => {
                    self.pos += 1;
                    match open.pop() {
                        Some(parent) => last = parent,
                        None => return Ok(()),
                    }
                }
                Some(_) => return Err(self.error("unexpected character")),
                None => return Err(self.error("unterminated game tree")),
            }
        }
    }

    fn properties(&mut self) -> Result<Properties> {
        let mut props = Properties::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b) if b.is_ascii_alphabetic() => {
                    let key = self.identifier()?;
                    let values = self.values()?;
                    if matches!(key.as_str(), PROP_BLACK | PROP_WHITE) && props.mv.is_some() {
                        warn!(key = %key, offset = self.pos, "node has two moves, keeping the last");
                        props.set(&key, values);
                    } else {
                        props.append(&key, values);
                    }
                }
                _ => return Ok(props),
            }
        }
    }

    fn identifier(&mut self) -> Result<String> {
        let start = self.pos;
        let mut key = String::new();
        while let Some(b) = self.peek().filter(u8::is_ascii_alphabetic) {
            if b.is_ascii_uppercase() {
                key.push(b as char);
            }
            self.pos += 1;
        }
        if key.is_empty() {
            return Err(SgfError::Parse {
                offset: start,
                message: "property identifier has no uppercase letter".into(),
            });
        }
        Ok(key)
    }

    fn values(&mut self) -> Result<Vec<String>> {
        let mut values = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'[') {
                break;
            }
            self.pos += 1;
            values.push(self.value()?);
        }
        if values.is_empty() {
            return Err(self.error("property without value"));
        }
        Ok(values)
    }

    fn value(&mut self) -> Result<String> {
        let start = self.pos;
        let mut buf = Vec::new();
        loop {
            let Some(b) = self.peek() else {
                return Err(SgfError::Parse {
                    offset: start,
                    message: "unterminated property value".into(),
                });
            };
            self.pos += 1;
            match b {
                b']' => break,
                b'\\' => match self.peek() {
                    Some(b'\n') => {
                        self.pos += 1;
                        if self.peek() == Some(b'\r') {
                            self.pos += 1;
                        }
                    }
                    Some(b'\r') => {
                        self.pos += 1;
                        if self.peek() == Some(b'\n') {
                            self.pos += 1;
                        }
                    }
                    Some(next) => {
                        buf.push(next);
                        self.pos += 1;
                    }
                    None => {}
                },
                other => buf.push(other),
            }
        }
        String::from_utf8(buf).map_err(|_| SgfError::Parse {
            offset: start,
            message: "property value is not valid UTF-8".into(),
        })
    }
}

enum Step {
    Open(NodeId),
    Close,
}

fn write_tree(out: &mut String, tree: &GameTree, start: NodeId) {
    let mut steps = vec![Step::Open(start)];
    while let Some(step) = steps.pop() {
        let Step::Open(first) = step else {
            out.push(')');
            continue;
        };
        out.push('(');
        let mut cursor = first;
        loop {
            write_node(out, tree.props(cursor));
            match tree.children(cursor) {
                [] => {
                    out.push(')');
                    break;
                }
                [only] => cursor = *only,
                many => {
                    steps.push(Step::Close);
                    steps.extend(many.iter().rev().map(|&child| Step::Open(child)));
                    break;
                }
            }
        }
    }
}

fn write_node(out: &mut String, props: &Properties) {
    out.push(';');
    for (key, values) in props.entries() {
        out.push_str(&key);
        for value in values {
            out.push('[');
            for ch in value.chars() {
                if ch == ']' || ch == '\\' {
                    out.push('\\');
                }
                out.push(ch);
            }
            out.push(']');
        }
    }
}
