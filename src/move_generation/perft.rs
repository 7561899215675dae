//! Perft node counting for validating the move generator.

use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_apply::{make_move, unmake_move};
use crate::move_generation::legal_move_checks::is_in_check;
use crate::move_generation::legal_move_generator::{LegalMoveGenerator, MoveGenerator};
use crate::moves::chess_move::ChessMove;

/// Leaf statistics; every field except `nodes` counts leaf moves with that property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
    }
}

pub fn perft<G: MoveGenerator>(generator: &G, position: &Position, depth: u8) -> PerftCounts {
    if depth == 0 {
        return PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
    }
    let mut scratch = position.clone();
    let mut total = PerftCounts::default();
    perft_recurse(generator, &mut scratch, depth, &mut total);
    total
}

pub fn perft_legal(position: &Position, depth: u8) -> PerftCounts {
    perft(&LegalMoveGenerator, position, depth)
}

/// Per-root-move node counts, in generation order.
pub fn perft_divide<G: MoveGenerator>(
    generator: &G,
    position: &Position,
    depth: u8,
) -> Vec<(ChessMove, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    let mut scratch = position.clone();
    let mut out = Vec::new();
    for mv in generator.legal_moves(position) {
        let Ok(undo) = make_move(&mut scratch, mv) else {
            continue;
        };
        out.push((mv, perft(generator, &scratch, depth - 1).nodes));
        unmake_move(&mut scratch, &undo);
    }
    out
}

fn perft_recurse<G: MoveGenerator>(
    generator: &G,
    position: &mut Position,
    depth: u8,
    counts: &mut PerftCounts,
) {
    for mv in generator.legal_moves(position) {
        let Ok(undo) = make_move(position, mv) else {
            continue;
        };
        if depth == 1 {
            counts.merge(leaf_counts(position, mv, undo.captured.is_some()));
        } else {
            perft_recurse(generator, position, depth - 1, counts);
        }
        unmake_move(position, &undo);
    }
}

fn leaf_counts(after: &Position, mv: ChessMove, captured: bool) -> PerftCounts {
    PerftCounts {
        nodes: 1,
        captures: captured as u64,
        en_passant: mv.is_en_passant as u64,
        castles: mv.is_castle as u64,
        promotions: mv.promotion.is_some() as u64,
        checks: is_in_check(after, after.side_to_move) as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::{perft, perft_divide, perft_legal, PerftCounts};
    use crate::game_state::chess_types::Position;
    use crate::move_generation::legal_move_generator::LegalMoveGenerator;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

    fn nodes(fen: &str, depth: u8) -> u64 {
        let position = Position::from_fen(fen).expect("FEN should parse");
        perft_legal(&position, depth).nodes
    }

    #[test]
    fn perft_depth_zero_counts_single_node() {
        let counts = perft(&LegalMoveGenerator, &Position::new_game(), 0);
        assert_eq!(
            counts,
            PerftCounts {
                nodes: 1,
                ..PerftCounts::default()
            }
        );
    }

    #[test]
    fn start_position_reference_counts() {
        let position = Position::new_game();
        assert_eq!(perft_legal(&position, 1).nodes, 20);
        assert_eq!(perft_legal(&position, 2).nodes, 400);
        let depth3 = perft_legal(&position, 3);
        assert_eq!(depth3.nodes, 8902);
        assert_eq!(depth3.captures, 34);
        assert_eq!(depth3.checks, 12);
    }

    #[test]
    fn kiwipete_reference_counts() {
        let position = Position::from_fen(KIWIPETE).expect("FEN should parse");
        let depth1 = perft_legal(&position, 1);
        assert_eq!(depth1.nodes, 48);
        assert_eq!(depth1.captures, 8);
        assert_eq!(depth1.castles, 2);

        let depth2 = perft_legal(&position, 2);
        assert_eq!(depth2.nodes, 2039);
        assert_eq!(depth2.captures, 351);
        assert_eq!(depth2.en_passant, 1);
        assert_eq!(depth2.castles, 91);
        assert_eq!(depth2.checks, 3);
    }

    #[test]
    fn position_3_reference_counts() {
        assert_eq!(nodes(POSITION_3, 1), 14);
        assert_eq!(nodes(POSITION_3, 2), 191);
        let position = Position::from_fen(POSITION_3).expect("FEN should parse");
        let depth3 = perft_legal(&position, 3);
        assert_eq!(depth3.nodes, 2812);
        assert_eq!(depth3.captures, 209);
        assert_eq!(depth3.en_passant, 2);
        assert_eq!(depth3.checks, 267);
    }

    #[test]
    fn divide_sums_to_perft() {
        let position = Position::from_fen(KIWIPETE).expect("FEN should parse");
        let divided = perft_divide(&LegalMoveGenerator, &position, 2);
        assert_eq!(divided.len(), 48);
        assert_eq!(divided.iter().map(|(_, n)| n).sum::<u64>(), 2039);
    }
}
