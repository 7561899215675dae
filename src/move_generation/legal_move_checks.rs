//! Attack and check detection.

use crate::game_state::chess_types::*;
use crate::moves::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};

#[inline]
pub fn king_square(position: &Position, color: Color) -> Option<Square> {
    position.king_square(color)
}

/// True iff `color`'s king is attacked by the opponent.
#[inline]
pub fn is_in_check(position: &Position, color: Color) -> bool {
    let Some(king_sq) = king_square(position, color) else {
        return false;
    };
    is_square_attacked(position, king_sq, color.opposite())
}

/// True iff any piece of `attacker_color` attacks `square`.
///
/// Works backwards from the target: a knight on `square` would reach exactly
/// the squares a knight must stand on to attack it, and likewise for every
/// other piece type. Pawns are looked up with the defender's pawn direction.
pub fn is_square_attacked(position: &Position, square: Square, attacker_color: Color) -> bool {
    let occupancy = position.occupancy_all();
    let theirs = |kind| position.bitboard(attacker_color, kind);

    if pawn_attacks(attacker_color.opposite(), square) & theirs(PieceKind::Pawn) != 0 {
        return true;
    }

    if knight_attacks(square) & theirs(PieceKind::Knight) != 0 {
        return true;
    }

    if king_attacks(square) & theirs(PieceKind::King) != 0 {
        return true;
    }

    let diagonal = theirs(PieceKind::Bishop) | theirs(PieceKind::Queen);
    if bishop_attacks(square, occupancy) & diagonal != 0 {
        return true;
    }

    let straight = theirs(PieceKind::Rook) | theirs(PieceKind::Queen);
    rook_attacks(square, occupancy) & straight != 0
}
