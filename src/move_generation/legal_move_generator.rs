//! Full legal move generation pipeline.
//!
//! Collects pseudo-legal moves for the side to move, applies each one to a
//! private scratch copy, and keeps only those that leave the mover's king
//! unattacked. The scratch copy is restored from the undo log after every
//! candidate, so one clone serves the whole filter.

use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_apply::{make_move, unmake_move};
use crate::move_generation::legal_move_checks::is_in_check;
use crate::move_generation::pseudo_legal::{pseudo_legal_moves, pseudo_legal_moves_for_side};
use crate::moves::chess_move::ChessMove;

/// Source of legal moves; the server, the random mover and perft are generic
/// over it.
pub trait MoveGenerator: Send + Sync {
    fn legal_moves(&self, position: &Position) -> Vec<ChessMove>;
}

pub struct LegalMoveGenerator;

impl MoveGenerator for LegalMoveGenerator {
    fn legal_moves(&self, position: &Position) -> Vec<ChessMove> {
        legal_moves(position)
    }
}

/// Every legal move of the side to move. `position` is never mutated.
pub fn legal_moves(position: &Position) -> Vec<ChessMove> {
    retain_king_safe(position, pseudo_legal_moves_for_side(position))
}

/// Legal moves of the piece on `from`; empty for an empty or enemy square.
pub fn legal_moves_from(position: &Position, from: Square) -> Vec<ChessMove> {
    retain_king_safe(position, pseudo_legal_moves(position, from))
}

pub fn is_legal_move(position: &Position, mv: ChessMove) -> bool {
    legal_moves_from(position, mv.from).contains(&mv)
}

fn retain_king_safe(position: &Position, mut candidates: Vec<ChessMove>) -> Vec<ChessMove> {
    let mover = position.side_to_move;
    let mut scratch = position.clone();
    candidates.retain(|&mv| leaves_king_safe(&mut scratch, mv, mover));
    candidates
}

fn leaves_king_safe(scratch: &mut Position, mv: ChessMove, mover: Color) -> bool {
    let Ok(undo) = make_move(scratch, mv) else {
        return false;
    };
    let safe = !is_in_check(scratch, mover);
    unmake_move(scratch, &undo);
    safe
}
