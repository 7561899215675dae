//! Authoritative board snapshot.
//!
//! `Position` is the central model of the rules engine: an 8×8 mailbox of
//! pieces plus the side to move, castling rights, en-passant target and the
//! move clocks. Per-piece and occupancy bitboards are kept in step with the
//! mailbox by `set_piece`/`remove_piece` and feed the attack tables in
//! `crate::moves`.

use std::fmt;

use crate::chess_errors::ChessError;
use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::chess_types::*;
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;
use crate::utils::render_game_state::render_board;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    squares: [Option<Piece>; 64],
    pieces: [[u64; 6]; 2],
    occupancy_by_color: [u64; 2],

    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_target: Option<Square>,

    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

impl Default for Position {
    fn default() -> Self {
        Self::new_game()
    }
}

impl Position {
    /// Board with no pieces, white to move, no rights.
    pub fn new_empty() -> Self {
        Self {
            squares: [None; 64],
            pieces: [[0; 6]; 2],
            occupancy_by_color: [0; 2],
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn new_game() -> Self {
        parse_fen(STARTING_POSITION_FEN).expect("starting FEN should always parse")
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        parse_fen(fen)
    }

    #[inline]
    pub fn get_fen(&self) -> String {
        generate_fen(self)
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square as usize]
    }

    /// Puts `piece` on `square`, returning whatever stood there.
    #[inline]
    pub fn set_piece(&mut self, square: Square, piece: Piece) -> Option<Piece> {
        let previous = self.squares[square as usize].replace(piece);
        if let Some(old) = previous {
            self.toggle_bit(old, square);
        }
        self.toggle_bit(piece, square);
        previous
    }

    #[inline]
    pub fn remove_piece(&mut self, square: Square) -> Option<Piece> {
        let previous = self.squares[square as usize].take();
        if let Some(old) = previous {
            self.toggle_bit(old, square);
        }
        previous
    }

    #[inline]
    fn toggle_bit(&mut self, piece: Piece, square: Square) {
        let bit = 1u64 << square;
        let color = piece.color.index();
        self.pieces[color][piece.kind.index()] ^= bit;
        self.occupancy_by_color[color] ^= bit;
    }

    #[inline]
    pub fn is_empty_square(&self, square: Square) -> bool {
        self.squares[square as usize].is_none()
    }

    /// Occupied squares with their pieces, `a1` first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(sq, piece)| piece.map(|p| (sq as Square, p)))
    }

    /// Squares holding pieces of `color`, `a1` first.
    pub fn squares_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    /// Bitboard of squares occupied by `color`.
    #[inline]
    pub fn occupancy(&self, color: Color) -> u64 {
        self.occupancy_by_color[color.index()]
    }

    /// Bitboard of all occupied squares.
    #[inline]
    pub fn occupancy_all(&self) -> u64 {
        self.occupancy_by_color[0] | self.occupancy_by_color[1]
    }

    /// Bitboard of the `kind` pieces of `color`.
    #[inline]
    pub fn bitboard(&self, color: Color, kind: PieceKind) -> u64 {
        self.pieces[color.index()][kind.index()]
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        let kings = self.bitboard(color, PieceKind::King);
        (kings != 0).then(|| kings.trailing_zeros() as Square)
    }

    /// Number of kings of `color` on the board.
    pub fn king_count(&self, color: Color) -> usize {
        self.bitboard(color, PieceKind::King).count_ones() as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_board(self))
    }
}

#[cfg(test)]
mod tests {
    use super::Position;
    use crate::game_state::chess_types::{CastlingRights, Color, Piece, PieceKind};

    #[test]
    fn new_game_has_thirty_two_pieces_and_both_kings() {
        let position = Position::new_game();
        assert_eq!(position.pieces().count(), 32);
        assert_eq!(position.king_square(Color::White), Some(4));
        assert_eq!(position.king_square(Color::Black), Some(60));
        assert_eq!(position.castling_rights, CastlingRights::ALL);
        assert_eq!(position.occupancy(Color::White), 0xFFFF);
    }

    #[test]
    fn set_piece_replaces_previous_occupant() {
        let mut position = Position::new_empty();
        let rook = Piece::new(Color::White, PieceKind::Rook);
        let knight = Piece::new(Color::Black, PieceKind::Knight);
        assert_eq!(position.set_piece(10, rook), None);
        assert_eq!(position.set_piece(10, knight), Some(rook));
        assert_eq!(position.piece_at(10), Some(knight));
        assert_eq!(position.remove_piece(10), Some(knight));
        assert!(position.is_empty_square(10));
        assert_eq!(position.occupancy_all(), 0);
    }

    #[test]
    fn bitboards_follow_piece_edits() {
        let mut position = Position::new_game();
        assert_eq!(position.bitboard(Color::White, PieceKind::Pawn), 0xFF00);
        assert_eq!(position.bitboard(Color::Black, PieceKind::Rook), (1 << 56) | (1 << 63));
        assert_eq!(position.occupancy_all(), 0xFFFF_0000_0000_FFFF);

        // Knight captures the queen in place: both boards and occupancy update.
        let knight = Piece::new(Color::White, PieceKind::Knight);
        position.remove_piece(1);
        position.set_piece(59, knight);
        assert_eq!(position.bitboard(Color::Black, PieceKind::Queen), 0);
        assert_eq!(position.bitboard(Color::White, PieceKind::Knight), (1 << 6) | (1 << 59));
        assert_eq!(position.occupancy(Color::Black) & (1 << 59), 0);
        assert_ne!(position.occupancy(Color::White) & (1 << 59), 0);
        assert_eq!(position.occupancy_all().count_ones(), 31);
    }
}
