//! Canonical chess-rule constants.
//!
//! Static rule literals: the standard start position and the fixed squares the
//! castling logic moves kings and rooks between.

use crate::game_state::chess_types::{Color, Square};

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Plies without a pawn move or capture after which the game is drawn.
pub const HALFMOVE_DRAW_LIMIT: u16 = 100;

/// Fixed squares involved in one castling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingPath {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
    /// Squares that must be empty between king and rook.
    pub must_be_empty: &'static [Square],
    /// Squares the king stands on, crosses or lands on; none may be attacked.
    pub king_walk: &'static [Square],
}

const WHITE_KING_SIDE: CastlingPath = CastlingPath {
    king_from: 4,
    king_to: 6,
    rook_from: 7,
    rook_to: 5,
    must_be_empty: &[5, 6],
    king_walk: &[4, 5, 6],
};

const WHITE_QUEEN_SIDE: CastlingPath = CastlingPath {
    king_from: 4,
    king_to: 2,
    rook_from: 0,
    rook_to: 3,
    must_be_empty: &[1, 2, 3],
    king_walk: &[4, 3, 2],
};

const BLACK_KING_SIDE: CastlingPath = CastlingPath {
    king_from: 60,
    king_to: 62,
    rook_from: 63,
    rook_to: 61,
    must_be_empty: &[61, 62],
    king_walk: &[60, 61, 62],
};

const BLACK_QUEEN_SIDE: CastlingPath = CastlingPath {
    king_from: 60,
    king_to: 58,
    rook_from: 56,
    rook_to: 59,
    must_be_empty: &[57, 58, 59],
    king_walk: &[60, 59, 58],
};

#[inline]
pub const fn king_side_path(color: Color) -> &'static CastlingPath {
    match color {
        Color::White => &WHITE_KING_SIDE,
        Color::Black => &BLACK_KING_SIDE,
    }
}

#[inline]
pub const fn queen_side_path(color: Color) -> &'static CastlingPath {
    match color {
        Color::White => &WHITE_QUEEN_SIDE,
        Color::Black => &BLACK_QUEEN_SIDE,
    }
}

/// Looks up the castling path a king move from `from` to `to` would take.
pub fn castling_path_for(color: Color, from: Square, to: Square) -> Option<&'static CastlingPath> {
    [king_side_path(color), queen_side_path(color)]
        .into_iter()
        .find(|path| path.king_from == from && path.king_to == to)
}
