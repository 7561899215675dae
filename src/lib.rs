//! Crate root module declarations for the Plum Tables chess server.
//!
//! The rules engine (game state, move generation, legality and status) is
//! shared by the table server, the client library, the random mover and the
//! perft tooling, so every consumer imports the same module paths.

pub mod chess_errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_status;
    pub mod position;
    pub mod undo_state;
}

pub mod moves {
    pub mod attack_tables;
    pub mod chess_move;
    pub mod king_moves;
    pub mod pawn_moves;
    pub mod piece_moves;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod perft;
    pub mod pseudo_legal;
}

pub mod engines {
    pub mod engine_random;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod render_game_state;
}

pub mod server {
    pub mod clock;
    pub mod config;
    pub mod error;
    pub mod framing;
    pub mod listener;
    pub mod protocol;
    pub mod registry;
    pub mod session;
    pub mod table;
}

pub mod client {
    pub mod table_client;
}
