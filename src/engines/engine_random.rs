//! Uniform random move selection.
//!
//! The only "engine" the table server ships: it picks uniformly among the legal
//! moves and is used by the `random_player` bot and by tests that need
//! arbitrary but legal games.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::game_state::chess_types::Position;
use crate::move_generation::legal_move_generator::{LegalMoveGenerator, MoveGenerator};
use crate::moves::chess_move::ChessMove;

pub struct RandomMover<G: MoveGenerator = LegalMoveGenerator> {
    move_generator: G,
    rng: StdRng,
}

impl RandomMover {
    pub fn new() -> Self {
        Self::with_generator(LegalMoveGenerator, StdRng::from_rng(&mut rand::rng()))
    }

    /// Deterministic sequence of choices for reproducible games.
    pub fn seeded(seed: u64) -> Self {
        Self::with_generator(LegalMoveGenerator, StdRng::seed_from_u64(seed))
    }
}

impl Default for RandomMover {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: MoveGenerator> RandomMover<G> {
    pub fn with_generator(move_generator: G, rng: StdRng) -> Self {
        Self {
            move_generator,
            rng,
        }
    }

    /// `None` when the side to move has no legal move.
    pub fn choose_move(&mut self, position: &Position) -> Option<ChessMove> {
        let legal_moves = self.move_generator.legal_moves(position);
        legal_moves.as_slice().choose(&mut self.rng).copied()
    }
}
