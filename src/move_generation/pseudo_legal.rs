//! Pseudo-legal move generation entry points.
//!
//! Moves obey piece movement rules but may leave the mover's own king
//! attacked; `legal_move_generator` filters those out.

use crate::game_state::chess_types::*;
use crate::moves::chess_move::ChessMove;
use crate::moves::king_moves::generate_king_moves;
use crate::moves::pawn_moves::generate_pawn_moves;
use crate::moves::piece_moves::generate_piece_moves;

/// Every pseudo-legal move of the piece on `from`.
///
/// Empty when `from` is empty or holds a piece of the side not to move, since
/// en-passant and castling are only defined for the side to move.
pub fn pseudo_legal_moves(position: &Position, from: Square) -> Vec<ChessMove> {
    let mut out = Vec::with_capacity(28);
    push_pseudo_legal_moves(position, from, &mut out);
    out
}

/// Pseudo-legal moves of every piece of the side to move.
pub fn pseudo_legal_moves_for_side(position: &Position) -> Vec<ChessMove> {
    let mut out = Vec::with_capacity(64);
    for (from, _) in position.squares_of(position.side_to_move) {
        push_pseudo_legal_moves(position, from, &mut out);
    }
    out
}

fn push_pseudo_legal_moves(position: &Position, from: Square, out: &mut Vec<ChessMove>) {
    let Some(piece) = position.piece_at(from) else {
        return;
    };
    if piece.color != position.side_to_move {
        return;
    }

    match piece.kind {
        PieceKind::Pawn => generate_pawn_moves(position, from, out),
        PieceKind::King => generate_king_moves(position, from, out),
        kind => generate_piece_moves(position, from, kind, out),
    }
}

#[cfg(test)]
mod tests {
    use super::{pseudo_legal_moves, pseudo_legal_moves_for_side};
    use crate::game_state::chess_types::Position;

    #[test]
    fn start_position_has_twenty_pseudo_legal_moves() {
        let position = Position::new_game();
        assert_eq!(pseudo_legal_moves_for_side(&position).len(), 20);
        assert_eq!(pseudo_legal_moves(&position, 6).len(), 2);
    }

    #[test]
    fn pieces_of_the_side_not_to_move_have_no_moves() {
        let position = Position::new_game();
        assert!(pseudo_legal_moves(&position, 52).is_empty());
        assert!(pseudo_legal_moves(&position, 28).is_empty());
    }

    #[test]
    fn pinned_piece_still_has_pseudo_legal_moves() {
        // Knight on e2 is pinned by the rook on e8.
        let position = Position::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").expect("FEN");
        assert_eq!(pseudo_legal_moves(&position, 12).len(), 6);
    }
}
