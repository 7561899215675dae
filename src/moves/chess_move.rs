//! Move value type.
//!
//! A `ChessMove` names the squares and the special-move flags; it is only
//! meaningful against the position it was generated for.

use std::fmt;

use crate::game_state::chess_types::{PieceKind, Square};
use crate::utils::algebraic::square_to_algebraic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    pub is_castle: bool,
    pub is_en_passant: bool,
}

impl ChessMove {
    #[inline]
    pub const fn quiet(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
            is_castle: false,
            is_en_passant: false,
        }
    }

    #[inline]
    pub const fn promotion(from: Square, to: Square, kind: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(kind),
            is_castle: false,
            is_en_passant: false,
        }
    }

    #[inline]
    pub const fn castle(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
            is_castle: true,
            is_en_passant: false,
        }
    }

    #[inline]
    pub const fn en_passant(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
            is_castle: false,
            is_en_passant: true,
        }
    }

    /// Coordinate notation, e.g. `e2e4` or `e7e8q`.
    pub fn to_uci(&self) -> String {
        let mut out = square_to_algebraic(self.from);
        out.push_str(&square_to_algebraic(self.to));
        if let Some(kind) = self.promotion {
            out.push(kind.letter());
        }
        out
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}
