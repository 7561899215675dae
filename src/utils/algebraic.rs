//! Square conversions for coordinate notation.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and internal
//! square indices reused by the FEN and move-text components.

use crate::chess_errors::ChessError;
use crate::game_state::chess_types::{make_square, square_file, square_rank, Square};

/// Convert a coordinate (for example: "e4") to a square index.
#[inline]
pub fn algebraic_to_square(square: &str) -> Result<Square, ChessError> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(ChessError::InvalidSquare(square.to_owned()));
    }

    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(ChessError::InvalidSquare(square.to_owned()));
    }

    Ok(make_square(file - b'a', rank - b'1'))
}

/// Convert a square index (`0..=63`) to a coordinate (for example: "e4").
#[inline]
pub fn square_to_algebraic(square: Square) -> String {
    debug_assert!(square < 64, "square index out of bounds: {square}");
    let file_char = char::from(b'a' + square_file(square));
    let rank_char = char::from(b'1' + square_rank(square));
    format!("{file_char}{rank_char}")
}

#[cfg(test)]
mod tests {
    use super::{algebraic_to_square, square_to_algebraic};

    #[test]
    fn round_trip_square_conversions() {
        assert_eq!(algebraic_to_square("a1").expect("a1 should parse"), 0);
        assert_eq!(algebraic_to_square("h8").expect("h8 should parse"), 63);
        assert_eq!(algebraic_to_square("E4").expect("E4 should parse"), 28);
        assert_eq!(square_to_algebraic(0), "a1");
        assert_eq!(square_to_algebraic(63), "h8");
    }

    #[test]
    fn rejects_off_board_coordinates() {
        assert!(algebraic_to_square("i1").is_err());
        assert!(algebraic_to_square("a9").is_err());
        assert!(algebraic_to_square("a").is_err());
        assert!(algebraic_to_square("a10").is_err());
    }
}
