use crate::game_state::chess_types::*;
use crate::moves::chess_move::ChessMove;

/// Single undo record for `make_move` / `unmake_move`.
///
/// Holds only what a move can destroy; everything else is recomputed from the
/// move itself when reverting.
#[derive(Debug, Clone)]
pub struct UndoState {
    pub mv: ChessMove,
    pub moved_piece: Piece,
    /// Captured piece and the square it stood on (differs from `mv.to` for en passant).
    pub captured: Option<(Square, Piece)>,

    pub prev_castling_rights: CastlingRights,
    pub prev_en_passant_target: Option<Square>,
    pub prev_halfmove_clock: u16,
    pub prev_fullmove_number: u16,
}
