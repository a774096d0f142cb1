//! sgf-board: an editable Go game record and its board reconstruction.
//!
//! A record is a tree of SGF nodes. A viewer picks one line through it,
//! replays that line to get the stones on the board, overlays the
//! annotations of the current node, and edits the tree in place. Nothing
//! derived is cached: every view is recomputed from the tree on demand.
//!
//! ## Modules
//!
//! - [`constants`] - Board limits and SGF property keys
//! - [`tree`] - Game record arena and typed property bag
//! - [`path`] - Resolving a line through the variations
//! - [`board`] - Board reconstruction with captures
//! - [`markers`] - Annotation overlay and variation hints
//! - [`session`] - Viewer position and navigation
//! - [`edit`] - Tree editing operations
//! - [`sgf`] - SGF reader and writer
//! - [`console`] - Text command loop for editing a record
//!
//! ## Example
//!
//! ```
//! use sgf_board::board::Color;
//! use sgf_board::edit::add_move;
//! use sgf_board::session::Session;
//! use sgf_board::sgf;
//!
//! let mut tree = sgf::load("(;SZ[9];B[bb];W[ab];B[ee];W[ba];B[ff];W[bc];B[gg])").unwrap();
//! let mut session = Session::new();
//! session.last(&tree);
//!
//! // White closes the last liberty of the black stone at bb
//! add_move(&mut tree, &mut session, (2, 1));
//! let board = session.board(&tree);
//! assert_eq!(board.get(1, 1), None);
//! assert_eq!(board.get(2, 1), Some(Color::White));
//! ```

pub mod board;
pub mod console;
pub mod constants;
pub mod edit;
pub mod error;
pub mod markers;
pub mod path;
pub mod session;
pub mod sgf;
pub mod tree;

pub use error::{Result, SgfError};
