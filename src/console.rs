//! Line-oriented editing console.
//!
//! The console drives a [`Session`] over a [`GameTree`] with one text
//! command per line, answering in the style of the Go Text Protocol: a
//! success response starts with `=`, a failure with `?`, optionally followed
//! by the numeric id the command was sent with, and every response ends
//! with a blank line.
//!
//! ## Commands
//!
//! - `first`, `prev`, `next`, `last`, `goto <n>` - navigate the line
//! - `variation <A|index>` - follow another continuation from here
//! - `play <point>` - add the next move (alternating colours)
//! - `black <point>`, `white <point>` - toggle a setup stone
//! - `triangle|square|circle|mark <point>` - toggle an annotation
//! - `label <point> <text>` - toggle a label
//! - `delete` - delete the current node and what follows
//! - `comment [text]` - set or clear the comment here
//! - `info [KEY [value]]` - list, read or set game information
//! - `save [path]` - write the record to `path`, by default the file it
//!   was loaded from
//! - `status`, `board`, `markers`, `sgf` - show state
//! - `list_commands`, `known_command <cmd>`, `name`, `version`, `quit`
//!
//! Points are SGF letter pairs, e.g. `dd`.
//!
//! ## Example
//!
//! ```
//! use sgf_board::console::Console;
//!
//! let mut console = Console::new();
//! let mut out = Vec::new();
//! console.run("play dd\nplay pp\nstatus\n".as_bytes(), &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("move 2/2"));
//! ```

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use crate::board::{Color, Point, parse_point};
use crate::constants::GAME_INFO_KEYS;
use crate::edit::{
    AddMove, add_move, delete_subtree, set_comment, set_game_info, toggle_marker,
    toggle_setup_stone,
};
use crate::markers::{MarkerKind, variation_label};
use crate::session::{GameInfo, Session};
use crate::sgf::stringify;
use crate::tree::GameTree;

/// The list of known console commands.
const KNOWN_COMMANDS: &[&str] = &[
    "black",
    "board",
    "circle",
    "comment",
    "delete",
    "first",
    "goto",
    "info",
    "known_command",
    "label",
    "last",
    "list_commands",
    "mark",
    "markers",
    "name",
    "next",
    "play",
    "prev",
    "quit",
    "save",
    "sgf",
    "square",
    "status",
    "triangle",
    "variation",
    "version",
    "white",
];

/// Console state: the record being edited and the viewer position.
pub struct Console {
    pub tree: GameTree,
    pub session: Session,
    /// Where `save` writes when given no path.
    pub path: Option<PathBuf>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Start from an empty record.
    pub fn new() -> Self {
        Self::with_tree(GameTree::new())
    }

    pub fn with_tree(tree: GameTree) -> Self {
        Self {
            tree,
            session: Session::new(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let mut parts = command_line.splitn(2, char::is_whitespace);
            let Some(command) = parts.next().map(str::to_lowercase) else {
                continue;
            };
            if command.is_empty() {
                continue;
            }
            let rest = parts.next().unwrap_or("").trim();

            let (success, message) = self.execute(&command, rest);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    fn point_arg(arg: Option<&str>) -> Result<Point, String> {
        let arg = arg.ok_or_else(|| "missing point".to_string())?;
        parse_point(arg).ok_or_else(|| format!("invalid point: {arg}"))
    }

    /// Execute a command and return (success, response).
    ///
    /// `rest` is everything after the command word, so free text such as a
    /// comment keeps its spacing.
    pub fn execute(&mut self, command: &str, rest: &str) -> (bool, String) {
        debug!(command, args = rest, "console command");
        let mut args = rest.split_whitespace();
        let tree = &mut self.tree;
        let session = &mut self.session;

        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.next() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    (true, known.to_string())
                }
                None => (false, "missing argument".to_string()),
            },

            "quit" => (true, String::new()),

            "first" => {
                session.first();
                (true, String::new())
            }

            "prev" => {
                session.prev();
                (true, String::new())
            }

            "next" => {
                session.next(tree);
                (true, String::new())
            }

            "last" => {
                session.last(tree);
                (true, String::new())
            }

            "goto" => match args.next().map(str::parse::<usize>) {
                Some(Ok(n)) => {
                    session.goto(tree, n);
                    (true, session.move_number.to_string())
                }
                Some(Err(_)) => (false, "invalid move number".to_string()),
                None => (false, "missing argument".to_string()),
            },

            "variation" => {
                let Some(arg) = args.next() else {
                    return (false, "missing argument".to_string());
                };
                let index = match arg.parse::<usize>() {
                    Ok(i) => Some(i),
                    Err(_) => match arg.as_bytes() {
                        &[c] if c.is_ascii_alphabetic() => {
                            Some((c.to_ascii_uppercase() - b'A') as usize)
                        }
                        _ => None,
                    },
                };
                let Some(i) = index else {
                    return (false, format!("invalid variation: {arg}"));
                };
                if session.select_variation(tree, i) {
                    (true, variation_label(i))
                } else {
                    (false, "no such variation".to_string())
                }
            }

            "play" => match Self::point_arg(args.next()) {
                Ok(point) => match add_move(tree, session, point) {
                    AddMove::Continued(_) => (true, session.move_number.to_string()),
                    AddMove::Variation(_) => (true, "variation".to_string()),
                    AddMove::AlreadyExists(_) => (false, "move already exists".to_string()),
                    AddMove::OutOfBounds => (false, "point outside the board".to_string()),
                },
                Err(e) => (false, e),
            },

            "black" | "white" => {
                let color = if command == "black" {
                    Color::Black
                } else {
                    Color::White
                };
                match Self::point_arg(args.next()) {
                    Ok(point) => {
                        let on = toggle_setup_stone(tree, session, point, color);
                        (true, if on { "on" } else { "off" }.to_string())
                    }
                    Err(e) => (false, e),
                }
            }

            "triangle" | "square" | "circle" | "mark" | "label" => {
                let Some(kind) = MarkerKind::from_name(command) else {
                    return (false, format!("unknown marker: {command}"));
                };
                let point = match Self::point_arg(args.next()) {
                    Ok(p) => p,
                    Err(e) => return (false, e),
                };
                let text = after_first_word(rest);
                if kind == MarkerKind::Label && text.is_empty() {
                    return (false, "missing label text".to_string());
                }
                let on = toggle_marker(tree, session, point, kind, &text);
                (true, if on { "on" } else { "off" }.to_string())
            }

            "delete" => {
                delete_subtree(tree, session);
                (true, session.move_number.to_string())
            }

            "comment" => {
                set_comment(tree, session, rest);
                (true, String::new())
            }

            "info" => match args.next() {
                None => {
                    let info = GameInfo::read(tree);
                    let lines: Vec<String> = info
                        .entries
                        .iter()
                        .map(|(k, v)| format!("{k} {v}"))
                        .collect();
                    (true, lines.join("\n"))
                }
                Some(key) => {
                    let key = key.to_uppercase();
                    if !GAME_INFO_KEYS.contains(&key.as_str()) {
                        return (false, format!("unknown game info key: {key}"));
                    }
                    let value = after_first_word(rest);
                    if value.is_empty() {
                        let current = GameInfo::read(tree).get(&key).unwrap_or("").to_string();
                        return (true, current);
                    }
                    set_game_info(tree, &key, value);
                    (true, String::new())
                }
            },

            "status" => {
                let mut status = format!(
                    "move {}/{}",
                    session.move_number,
                    session.total_moves(tree)
                );
                let variations = session.variation_count(tree);
                if variations > 1 {
                    status.push_str(&format!(
                        ", variation {} of {variations}",
                        variation_label(session.selected_variation().min(variations - 1))
                    ));
                }
                if let Some(comment) = session.comment(tree) {
                    status.push('\n');
                    status.push_str(comment);
                }
                (true, status)
            }

            "board" => (true, format!("\n{}", session.board(tree))),

            "markers" => (true, format!("\n{}", session.markers(tree))),

            "sgf" => (true, stringify(tree)),

            "save" => {
                let Some(path) = args.next().map(PathBuf::from).or_else(|| self.path.clone())
                else {
                    return (false, "no file to save to".to_string());
                };
                match save_record(tree, &path) {
                    Ok(()) => {
                        let shown = path.display().to_string();
                        self.path = Some(path);
                        (true, shown)
                    }
                    Err(e) => (false, format!("{e:#}")),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

/// Everything after the first word of `rest`, outer whitespace trimmed.
fn after_first_word(rest: &str) -> &str {
    rest[rest.find(char::is_whitespace).unwrap_or(rest.len())..].trim()
}

fn save_record(tree: &GameTree, path: &Path) -> anyhow::Result<()> {
    fs::write(path, stringify(tree))
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), nodes = tree.len(), "saved record");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgf::load;
    use tempfile::TempDir;

    fn run(console: &mut Console, input: &str) -> String {
        let mut out = Vec::new();
        console.run(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = Console::parse_id("123 status");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "status");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = Console::parse_id("status");
        assert_eq!(id, None);
        assert_eq!(cmd, "status");
    }

    #[test]
    fn test_known_command() {
        let mut console = Console::new();

        let (success, response) = console.execute("known_command", "play");
        assert!(success);
        assert_eq!(response, "true");

        let (success, response) = console.execute("known_command", "genmove");
        assert!(success);
        assert_eq!(response, "false");
    }

    #[test]
    fn test_play_and_navigate() {
        let mut console = Console::new();
        assert_eq!(console.execute("play", "dd"), (true, "1".to_string()));
        assert_eq!(console.execute("play", "pp"), (true, "2".to_string()));
        console.execute("first", "");
        assert_eq!(
            console.execute("play", "dd"),
            (false, "move already exists".to_string())
        );
        assert_eq!(console.execute("play", "dp"), (true, "variation".to_string()));
        assert_eq!(console.execute("variation", "B"), (true, "B".to_string()));
        console.execute("next", "");
        let (_, status) = console.execute("status", "");
        assert_eq!(status, "move 1/1");
    }

    #[test]
    fn test_bad_arguments() {
        let mut console = Console::new();
        assert!(!console.execute("play", "").0);
        assert!(!console.execute("play", "Z9").0);
        assert!(!console.execute("goto", "x").0);
        assert!(!console.execute("label", "dd").0);
        assert!(!console.execute("variation", "C").0);
        assert!(!console.execute("frobnicate", "").0);
    }

    #[test]
    fn test_comment_keeps_spacing() {
        let mut console = Console::new();
        console.execute("comment", "black  to play");
        let (_, status) = console.execute("status", "");
        assert_eq!(status, "move 0/0\nblack  to play");
        console.execute("comment", "");
        let (_, status) = console.execute("status", "");
        assert_eq!(status, "move 0/0");
    }

    #[test]
    fn test_label_keeps_spacing() {
        let mut console = Console::new();
        assert_eq!(console.execute("label", "ee  a  b "), (true, "on".to_string()));
        assert_eq!(console.execute("sgf", ""), (true, "(;LB[ee:a  b])".to_string()));
        assert_eq!(console.execute("label", "ee a  b"), (true, "off".to_string()));
    }

    #[test]
    fn test_save_writes_back_to_loaded_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game.sgf");
        fs::write(&path, "(;SZ[9];B[cc])").unwrap();

        let tree = load(&fs::read_to_string(&path).unwrap()).unwrap();
        let mut console = Console::with_tree(tree).with_path(&path);
        console.execute("last", "");
        console.execute("play", "gg");
        console.execute("comment", "good shape");

        let (success, response) = console.execute("save", "");
        assert!(success);
        assert_eq!(response, path.display().to_string());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "(;SZ[9];B[cc];W[gg]C[good shape])"
        );
    }

    #[test]
    fn test_save_to_new_path() {
        let dir = TempDir::new().unwrap();
        let copy = dir.path().join("copy.sgf");

        let mut console = Console::new();
        assert_eq!(
            console.execute("save", ""),
            (false, "no file to save to".to_string())
        );

        console.execute("play", "dd");
        assert!(console.execute("save", copy.to_str().unwrap()).0);
        assert_eq!(fs::read_to_string(&copy).unwrap(), "(;B[dd])");

        // Later saves go to the same file
        console.execute("play", "pp");
        assert!(console.execute("save", "").0);
        assert_eq!(fs::read_to_string(&copy).unwrap(), "(;B[dd];W[pp])");

        let missing = dir.path().join("no-such-dir").join("x.sgf");
        let (success, response) = console.execute("save", missing.to_str().unwrap());
        assert!(!success);
        assert!(response.starts_with("failed to write"));
    }

    #[test]
    fn test_info() {
        let mut console = Console::new();
        assert!(console.execute("info", "pb Cho Chikun").0);
        assert_eq!(console.execute("info", "PB"), (true, "Cho Chikun".to_string()));
        assert_eq!(console.execute("info", ""), (true, "PB Cho Chikun".to_string()));
        assert!(!console.execute("info", "XX 1").0);
    }

    #[test]
    fn test_run_loop() {
        let mut console = Console::new();
        let out = run(&mut console, "# setup\n1 black dd\n\nlabel ee go\n2 sgf\nquit\nplay aa\n");
        assert_eq!(out, "=1 on\n\n= on\n\n=2 (;AB[dd]LB[ee:go])\n\n= \n\n");
        assert!(console.tree.is_empty());
    }
}
