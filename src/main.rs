//! sgf-board: view and edit SGF game records from the terminal.
//!
//! ## Usage
//!
//! - `sgf-board show game.sgf --move 40` - Print the position at move 40
//! - `sgf-board info game.sgf` - Print the game information
//! - `sgf-board edit [game.sgf]` - Start the editing console on stdin; `save`
//!   writes the record back
//! - `sgf-board demo` - Build and replay a random record
//!
//! Logging goes to stderr; `-v` raises the level and `RUST_LOG` overrides it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use sgf_board::board::Point;
use sgf_board::console::Console;
use sgf_board::edit::add_move;
use sgf_board::markers::variation_label;
use sgf_board::session::{GameInfo, Session};
use sgf_board::sgf;
use sgf_board::tree::{GameTree, Properties};

/// sgf-board: view and edit Go game records
#[derive(Parser)]
#[command(name = "sgf-board")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the board, annotations and comment at one position
    Show {
        file: PathBuf,
        /// Move number to show (default: end of the line)
        #[arg(short = 'm', long = "move")]
        at: Option<usize>,
        /// Root variation to start from
        #[arg(long, default_value_t = 0)]
        root: usize,
        /// Branch choice as MOVE:INDEX, repeatable
        #[arg(short, long, value_parser = parse_branch)]
        branch: Vec<(usize, usize)>,
    },
    /// Print the game information fields
    Info { file: PathBuf },
    /// Edit a record with text commands read from stdin
    Edit { file: Option<PathBuf> },
    /// Build a random record and replay it
    Demo {
        #[arg(long, default_value_t = 9)]
        size: usize,
        #[arg(long, default_value_t = 30)]
        moves: usize,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_branch(s: &str) -> Result<(usize, usize), String> {
    let (m, i) = s
        .split_once(':')
        .ok_or_else(|| format!("expected MOVE:INDEX, got {s}"))?;
    let m = m.parse().map_err(|_| format!("invalid move number: {m}"))?;
    let i = i.parse().map_err(|_| format!("invalid index: {i}"))?;
    Ok((m, i))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sgf_board={}", level.as_str().to_lowercase())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_record(path: &Path) -> Result<GameTree> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let tree = sgf::load(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    info!(path = %path.display(), nodes = tree.len(), size = tree.board_size(), "loaded record");
    Ok(tree)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Show {
            file,
            at,
            root,
            branch,
        }) => {
            let tree = read_record(&file)?;
            let mut session = Session::new();
            session.selection.root_variation = root;
            session.selection.branches.extend(branch);
            match at {
                Some(n) => session.goto(&tree, n),
                None => session.last(&tree),
            }
            show(&tree, &session);
        }
        Some(Commands::Info { file }) => {
            let tree = read_record(&file)?;
            for (key, value) in GameInfo::read(&tree).entries {
                println!("{key}: {value}");
            }
        }
        Some(Commands::Edit { file }) => {
            let mut console = match file {
                Some(path) => Console::with_tree(read_record(&path)?).with_path(path),
                None => Console::new(),
            };
            let stdin = io::stdin();
            console.run(stdin.lock(), io::stdout())?;
        }
        Some(Commands::Demo { size, moves, seed }) => run_demo(size, moves, seed),
        None => run_demo(9, 30, None),
    }
    Ok(())
}

fn show(tree: &GameTree, session: &Session) {
    println!("Move {} / {}", session.move_number, session.total_moves(tree));
    let variations = session.variation_count(tree);
    if variations > 1 {
        let labels: Vec<String> = (0..variations).map(variation_label).collect();
        println!("Variations: {}", labels.join(" "));
    }
    println!("{}", session.board(tree));
    let markers = session.markers(tree);
    if !markers.is_empty() {
        println!("{markers}");
    }
    if let Some(comment) = session.comment(tree) {
        println!("{comment}");
    }
}

/// Play `moves` random moves on empty points of a fresh record.
fn run_demo(size: usize, moves: usize, seed: Option<u64>) {
    println!("sgf-board: random record demo\n");

    let mut rng = match seed {
        Some(s) => fastrand::Rng::with_seed(s),
        None => fastrand::Rng::new(),
    };
    let size = size.clamp(1, 19);
    let mut root = Properties::new();
    root.set("SZ", vec![size.to_string()]);
    root.set("GN", vec!["Random demo".to_string()]);
    let mut tree = GameTree::with_root(root);
    let mut session = Session::new();

    for _ in 0..moves {
        let board = session.board(&tree);
        let empty: Vec<Point> = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .filter(|&(x, y)| board.get(x, y).is_none())
            .collect();
        if empty.is_empty() {
            break;
        }
        let point = empty[rng.usize(..empty.len())];
        add_move(&mut tree, &mut session, point);
    }

    if let Some(last) = session.line(&tree).last() {
        let point = tree.props(last.node).mv.as_ref().map(|mv| mv.point.as_str());
        info!(moves = last.move_number, last = point.unwrap_or(""), "demo record built");
    }

    show(&tree, &session);
    println!("{}", sgf::stringify(&tree));
}
