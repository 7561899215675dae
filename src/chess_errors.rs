//! Errors raised by the rules engine.
//!
//! `ChessError` covers every recoverable failure of parsing positions and
//! moves. Illegal-but-well-formed moves are not errors at this layer: the
//! legality filter simply does not list them, and the table server reports
//! them as `TableError::IllegalMove`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// FEN string was structurally wrong; payload names the broken field.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// Square text outside `a1..=h8`.
    #[error("invalid square '{0}'")]
    InvalidSquare(String),

    /// Coordinate move text that does not match `<from><to>[promotion]`.
    #[error("invalid move text '{0}'")]
    InvalidMoveText(String),

    /// Promotion letter other than `q`, `r`, `b`, `n`.
    #[error("invalid promotion piece '{0}'")]
    InvalidPromotion(char),

    /// Position that violates a board invariant (for example a missing king).
    #[error("invalid position: {0}")]
    InvalidPosition(String),
}
