//! Pseudo-legal knight, bishop, rook and queen moves.

use crate::game_state::chess_types::*;
use crate::moves::attack_tables::{
    bishop_attacks, knight_attacks, queen_attacks, rook_attacks, squares_in,
};
use crate::moves::chess_move::ChessMove;

pub fn generate_piece_moves(
    position: &Position,
    from: Square,
    kind: PieceKind,
    out: &mut Vec<ChessMove>,
) {
    let side = position.side_to_move;
    let occupancy = position.occupancy_all();
    let attacks = match kind {
        PieceKind::Knight => knight_attacks(from),
        PieceKind::Bishop => bishop_attacks(from, occupancy),
        PieceKind::Rook => rook_attacks(from, occupancy),
        PieceKind::Queen => queen_attacks(from, occupancy),
        PieceKind::Pawn | PieceKind::King => return,
    };

    let blocked = position.occupancy(side) | position.bitboard(side.opposite(), PieceKind::King);
    out.extend(squares_in(attacks & !blocked).map(|to| ChessMove::quiet(from, to)));
}
