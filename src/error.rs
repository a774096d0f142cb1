use thiserror::Error;

/// Errors surfaced while reading a game record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SgfError {
    /// The record text is malformed.
    #[error("parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },
    /// The text parsed, but contained no game tree.
    #[error("no game tree found in SGF")]
    NoGameTree,
}

pub type Result<T> = std::result::Result<T, SgfError>;
