//! Board limits and SGF property identifiers.
//!
//! Property keys are the short uppercase codes used by the SGF format.
//! The record model keeps dedicated fields for the keys listed here and
//! passes every other key through untouched.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size used when the root carries no `SZ` property.
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Largest board addressable with two lowercase coordinate letters.
pub const MAX_BOARD_SIZE: usize = 26;

// =============================================================================
// Moves and Setup
// =============================================================================

/// Black move.
pub const PROP_BLACK: &str = "B";

/// White move.
pub const PROP_WHITE: &str = "W";

/// Setup: add black stones.
pub const PROP_ADD_BLACK: &str = "AB";

/// Setup: add white stones.
pub const PROP_ADD_WHITE: &str = "AW";

/// Setup: clear points.
pub const PROP_ADD_EMPTY: &str = "AE";

// =============================================================================
// Annotations
// =============================================================================

pub const PROP_TRIANGLE: &str = "TR";
pub const PROP_SQUARE: &str = "SQ";
pub const PROP_CIRCLE: &str = "CR";
pub const PROP_MARK: &str = "MA";

/// Label, encoded as `"<point>:<text>"`.
pub const PROP_LABEL: &str = "LB";

/// Node comment.
pub const PROP_COMMENT: &str = "C";

/// Board size, read once from the root.
pub const PROP_SIZE: &str = "SZ";

// =============================================================================
// Game Information
// =============================================================================

/// Root metadata keys, in the order an editor presents them.
///
/// Values are stored and returned verbatim; nothing here is interpreted.
pub const GAME_INFO_KEYS: [&str; 13] = [
    "PB", // black player
    "BR", // black rank
    "PW", // white player
    "WR", // white rank
    "GN", // game name
    "EV", // event
    "RO", // round
    "DT", // date
    "PC", // place
    "KM", // komi
    "HA", // handicap
    "RE", // result
    "RU", // rules
];
