//! Game status evaluation after each applied move.

use std::fmt;

use crate::game_state::chess_rules::HALFMOVE_DRAW_LIMIT;
use crate::game_state::chess_types::{Color, Position};
use crate::move_generation::legal_move_checks::is_in_check;
use crate::move_generation::legal_move_generator::legal_moves;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Ongoing,
    Check,
    Checkmate { winner: Color },
    Stalemate,
    DrawByHalfmove,
    /// Set by the table clock, never by [`evaluate_status`].
    LostOnTime { winner: Color },
}

impl GameStatus {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Ongoing | GameStatus::Check)
    }

    pub const fn winner(self) -> Option<Color> {
        match self {
            GameStatus::Checkmate { winner } | GameStatus::LostOnTime { winner } => Some(winner),
            _ => None,
        }
    }

    /// Wire name, snake_case.
    pub const fn name(self) -> &'static str {
        match self {
            GameStatus::Ongoing => "ongoing",
            GameStatus::Check => "check",
            GameStatus::Checkmate { .. } => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::DrawByHalfmove => "draw_by_halfmove",
            GameStatus::LostOnTime { .. } => "lost_on_time",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner() {
            Some(winner) => write!(f, "{} ({winner} wins)", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// Mate and stalemate take precedence over the halfmove draw.
pub fn evaluate_status(position: &Position) -> GameStatus {
    let mover = position.side_to_move;
    let in_check = is_in_check(position, mover);
    let has_moves = !legal_moves(position).is_empty();

    match (has_moves, in_check) {
        (false, true) => GameStatus::Checkmate {
            winner: mover.opposite(),
        },
        (false, false) => GameStatus::Stalemate,
        _ if position.halfmove_clock >= HALFMOVE_DRAW_LIMIT => GameStatus::DrawByHalfmove,
        (true, true) => GameStatus::Check,
        (true, false) => GameStatus::Ongoing,
    }
}
