//! Pseudo-legal king steps and castling.

use crate::game_state::chess_rules::{king_side_path, queen_side_path, CastlingPath};
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::moves::attack_tables::{king_attacks, squares_in};
use crate::moves::chess_move::ChessMove;

pub fn generate_king_moves(position: &Position, from: Square, out: &mut Vec<ChessMove>) {
    let side = position.side_to_move;
    let enemy = side.opposite();
    let blocked = position.occupancy(side) | position.bitboard(enemy, PieceKind::King);

    out.extend(squares_in(king_attacks(from) & !blocked).map(|to| ChessMove::quiet(from, to)));

    generate_castling_moves(position, from, out);
}

fn generate_castling_moves(position: &Position, king_from: Square, out: &mut Vec<ChessMove>) {
    let side = position.side_to_move;
    let rights = position.castling_rights;

    if rights.king_side(side) && castling_path_is_clear(position, king_side_path(side), king_from) {
        let path = king_side_path(side);
        out.push(ChessMove::castle(path.king_from, path.king_to));
    }
    if rights.queen_side(side) && castling_path_is_clear(position, queen_side_path(side), king_from)
    {
        let path = queen_side_path(side);
        out.push(ChessMove::castle(path.king_from, path.king_to));
    }
}

/// King and rook on their home squares, nothing in between, and no square the
/// king stands on or walks across is attacked (so castling out of check fails).
fn castling_path_is_clear(position: &Position, path: &CastlingPath, king_from: Square) -> bool {
    let side = position.side_to_move;
    if king_from != path.king_from
        || position.piece_at(path.rook_from) != Some(Piece::new(side, PieceKind::Rook))
    {
        return false;
    }

    if !path.must_be_empty.iter().all(|&sq| position.is_empty_square(sq)) {
        return false;
    }

    !path
        .king_walk
        .iter()
        .any(|&sq| is_square_attacked(position, sq, side.opposite()))
}

#[cfg(test)]
mod tests {
    use super::generate_king_moves;
    use crate::game_state::chess_types::Position;
    use crate::moves::chess_move::ChessMove;

    fn castles(fen: &str) -> Vec<String> {
        let position = Position::from_fen(fen).expect("FEN should parse");
        let from = position
            .king_square(position.side_to_move)
            .expect("side to move has a king");
        let mut out = Vec::new();
        generate_king_moves(&position, from, &mut out);
        out.iter()
            .filter(|mv| mv.is_castle)
            .map(ChessMove::to_uci)
            .collect()
    }

    #[test]
    fn both_wings_available_on_open_back_rank() {
        assert_eq!(castles("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1"), vec!["e1g1", "e1c1"]);
        assert_eq!(castles("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1"), vec!["e8g8", "e8c8"]);
    }

    #[test]
    fn castling_requires_rights_and_empty_squares() {
        assert!(castles("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1").is_empty());
        assert_eq!(castles("r3k2r/8/8/8/8/8/8/RN2K2R w KQ - 0 1"), vec!["e1g1"]);
    }

    #[test]
    fn cannot_castle_through_or_out_of_check() {
        // Rook on f8 attacks f1.
        assert_eq!(castles("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1"), vec!["e1c1"]);
        // Rook on e8 gives check.
        assert!(castles("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").is_empty());
        // b1 may be attacked on the queen side; only c1 and d1 matter.
        assert_eq!(castles("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1"), vec!["e1c1"]);
    }

    #[test]
    fn king_never_steps_onto_the_enemy_king() {
        let position = Position::from_fen("8/8/8/8/8/8/3k4/4K3 w - - 0 1").expect("FEN");
        let mut out = Vec::new();
        generate_king_moves(&position, 4, &mut out);
        assert!(out.iter().all(|mv| mv.to != 11));
    }
}
