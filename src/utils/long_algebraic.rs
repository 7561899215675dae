//! Coordinate ("long algebraic") move text: `<from><to>[promotion]`.
//!
//! Decoding is done against a position so the castle and en-passant flags can
//! be inferred from the pieces involved. The decoded move is only a candidate;
//! callers check it against the legal move list.

use crate::chess_errors::ChessError;
use crate::game_state::chess_types::*;
use crate::moves::chess_move::ChessMove;
use crate::utils::algebraic::algebraic_to_square;

pub fn decode_move(text: &str, position: &Position) -> Result<ChessMove, ChessError> {
    let text = text.trim();
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(ChessError::InvalidMoveText(text.to_owned()));
    }

    let from = algebraic_to_square(&text[0..2])?;
    let to = algebraic_to_square(&text[2..4])?;
    if from == to {
        return Err(ChessError::InvalidMoveText(text.to_owned()));
    }

    let promotion = match text[4..].chars().next() {
        Some(ch) => Some(char_to_promotion(ch)?),
        None => None,
    };

    let Some(piece) = position.piece_at(from) else {
        return Ok(ChessMove {
            promotion,
            ..ChessMove::quiet(from, to)
        });
    };

    let file_change = square_file(from).abs_diff(square_file(to));
    let is_castle = piece.kind == PieceKind::King && file_change == 2;
    let is_en_passant = piece.kind == PieceKind::Pawn
        && file_change == 1
        && position.en_passant_target == Some(to)
        && position.is_empty_square(to);

    Ok(ChessMove {
        from,
        to,
        promotion,
        is_castle,
        is_en_passant,
    })
}

fn char_to_promotion(ch: char) -> Result<PieceKind, ChessError> {
    PieceKind::from_letter(ch)
        .filter(|kind| PieceKind::PROMOTIONS.contains(kind))
        .ok_or(ChessError::InvalidPromotion(ch))
}
