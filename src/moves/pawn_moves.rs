//! Pseudo-legal pawn moves: pushes, captures, en passant and promotions.

use crate::game_state::chess_types::*;
use crate::moves::attack_tables::{pawn_attacks, squares_in};
use crate::moves::chess_move::ChessMove;

pub fn generate_pawn_moves(position: &Position, from: Square, out: &mut Vec<ChessMove>) {
    let side = position.side_to_move;
    let enemy = side.opposite();
    let forward = if side == Color::White { 1 } else { -1 };
    let occupancy = position.occupancy_all();

    if let Some(one_step) = offset_square(from, 0, forward) {
        if occupancy & (1u64 << one_step) == 0 {
            push_with_promotions(out, from, one_step, side);

            if square_rank(from) == side.pawn_start_rank() {
                if let Some(two_step) = offset_square(from, 0, 2 * forward) {
                    if occupancy & (1u64 << two_step) == 0 {
                        out.push(ChessMove::quiet(from, two_step));
                    }
                }
            }
        }
    }

    // Kings are never capture targets.
    let targets = position.occupancy(enemy) & !position.bitboard(enemy, PieceKind::King);
    for to in squares_in(pawn_attacks(side, from)) {
        if targets & (1u64 << to) != 0 {
            push_with_promotions(out, from, to, side);
        } else if position.en_passant_target == Some(to) && is_en_passant_victim(position, to) {
            out.push(ChessMove::en_passant(from, to));
        }
    }
}

/// Pushes one move, or one per promotion kind when `to` is on the last rank.
fn push_with_promotions(out: &mut Vec<ChessMove>, from: Square, to: Square, side: Color) {
    if square_rank(to) == side.promotion_rank() {
        out.extend(
            PieceKind::PROMOTIONS
                .iter()
                .map(|&kind| ChessMove::promotion(from, to, kind)),
        );
    } else {
        out.push(ChessMove::quiet(from, to));
    }
}

/// The en-passant target must be empty with an enemy pawn right behind it.
fn is_en_passant_victim(position: &Position, target: Square) -> bool {
    let side = position.side_to_move;
    let Some(victim_sq) = en_passant_capture_square(target, side) else {
        return false;
    };
    position.is_empty_square(target)
        && position.piece_at(victim_sq) == Some(Piece::new(side.opposite(), PieceKind::Pawn))
}

/// Square of the pawn removed by an en-passant capture onto `target` by `mover`.
#[inline]
pub fn en_passant_capture_square(target: Square, mover: Color) -> Option<Square> {
    let back = if mover == Color::White { -1 } else { 1 };
    offset_square(target, 0, back)
}

#[cfg(test)]
mod tests {
    use super::generate_pawn_moves;
    use crate::game_state::chess_types::{PieceKind, Position};
    use crate::moves::chess_move::ChessMove;
    use crate::utils::algebraic::algebraic_to_square;

    fn moves_from(fen: &str, from: &str) -> Vec<ChessMove> {
        let position = Position::from_fen(fen).expect("FEN should parse");
        let mut out = Vec::new();
        generate_pawn_moves(&position, algebraic_to_square(from).expect("square"), &mut out);
        out
    }

    #[test]
    fn start_rank_pawn_has_single_and_double_push() {
        let moves = moves_from("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", "e2");
        let uci: Vec<String> = moves.iter().map(ChessMove::to_uci).collect();
        assert_eq!(uci, vec!["e2e3", "e2e4"]);
    }

    #[test]
    fn double_push_needs_both_squares_empty() {
        let moves = moves_from("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1", "e2");
        assert_eq!(moves.len(), 1);
        let blocked = moves_from("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1", "e2");
        assert!(blocked.is_empty());
    }

    #[test]
    fn promotion_emits_all_four_kinds_and_never_a_bare_move() {
        let moves = moves_from("3r2k1/4P3/8/8/8/8/8/4K3 w - - 0 1", "e7");
        assert_eq!(moves.len(), 8);
        assert!(moves.iter().all(|mv| mv.promotion.is_some()));
        let kinds: Vec<PieceKind> = moves.iter().take(4).filter_map(|mv| mv.promotion).collect();
        assert_eq!(kinds, PieceKind::PROMOTIONS.to_vec());
    }

    #[test]
    fn pawn_never_captures_a_king() {
        let moves = moves_from("8/8/8/8/8/3k4/4P3/4K3 w - - 0 1", "e2");
        assert!(moves.iter().all(|mv| mv.to_uci() != "e2d3"));
    }

    #[test]
    fn en_passant_is_flagged() {
        let moves = moves_from("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", "e5");
        let ep: Vec<&ChessMove> = moves.iter().filter(|mv| mv.is_en_passant).collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].to_uci(), "e5d6");
    }
}
