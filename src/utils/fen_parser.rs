//! FEN-to-Position parser.
//!
//! Builds a fully-populated `Position` from a Forsyth-Edwards Notation string,
//! including placement, rights, en-passant target and clocks.

use crate::chess_errors::ChessError;
use crate::game_state::chess_types::*;
use crate::utils::algebraic::algebraic_to_square;

pub fn parse_fen(fen: &str) -> Result<Position, ChessError> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or_else(|| invalid("missing board layout"))?;
    let side_part = parts.next().ok_or_else(|| invalid("missing side to move"))?;
    let castling_part = parts.next().ok_or_else(|| invalid("missing castling rights"))?;
    let en_passant_part = parts.next().ok_or_else(|| invalid("missing en-passant square"))?;
    let halfmove_part = parts.next().ok_or_else(|| invalid("missing halfmove clock"))?;
    let fullmove_part = parts.next().ok_or_else(|| invalid("missing fullmove number"))?;

    if parts.next().is_some() {
        return Err(invalid("extra trailing fields"));
    }

    let mut position = Position::new_empty();

    parse_board(board_part, &mut position)?;
    position.side_to_move = parse_side_to_move(side_part)?;
    position.castling_rights = parse_castling_rights(castling_part)?;
    position.en_passant_target = parse_en_passant_square(en_passant_part, position.side_to_move)?;
    position.halfmove_clock = halfmove_part
        .parse::<u16>()
        .map_err(|_| invalid(&format!("halfmove clock '{halfmove_part}'")))?;
    position.fullmove_number = fullmove_part
        .parse::<u16>()
        .map_err(|_| invalid(&format!("fullmove number '{fullmove_part}'")))?;

    for color in Color::BOTH {
        let kings = position.king_count(color);
        if kings != 1 {
            return Err(ChessError::InvalidPosition(format!(
                "{color} has {kings} kings, expected exactly one"
            )));
        }
    }

    Ok(position)
}

fn invalid(reason: &str) -> ChessError {
    ChessError::InvalidFen(reason.to_owned())
}

fn parse_board(board_part: &str, position: &mut Position) -> Result<(), ChessError> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid("board layout must contain 8 ranks"));
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx as u8;
        let mut file = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(invalid(&format!("empty-square count '{ch}'")));
                }
                file += empty_count as u8;
                if file > 8 {
                    return Err(invalid("rank has more than 8 files"));
                }
                continue;
            }

            let piece = Piece::from_fen_char(ch)
                .ok_or_else(|| invalid(&format!("piece character '{ch}'")))?;

            if file >= 8 {
                return Err(invalid("rank has more than 8 files"));
            }

            position.set_piece(make_square(file, board_rank), piece);
            file += 1;
        }

        if file != 8 {
            return Err(invalid("rank does not sum to 8 files"));
        }
    }

    Ok(())
}

fn parse_side_to_move(side_part: &str) -> Result<Color, ChessError> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(invalid(&format!("side to move '{side_part}'"))),
    }
}

fn parse_castling_rights(castling_part: &str) -> Result<CastlingRights, ChessError> {
    if castling_part == "-" {
        return Ok(CastlingRights::NONE);
    }

    let mut rights = CastlingRights::NONE;
    for ch in castling_part.chars() {
        match ch {
            'K' => rights.white_king_side = true,
            'Q' => rights.white_queen_side = true,
            'k' => rights.black_king_side = true,
            'q' => rights.black_queen_side = true,
            _ => return Err(invalid(&format!("castling rights character '{ch}'"))),
        }
    }

    Ok(rights)
}

fn parse_en_passant_square(
    en_passant_part: &str,
    side_to_move: Color,
) -> Result<Option<Square>, ChessError> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    let square = algebraic_to_square(en_passant_part)?;
    // The target sits behind a pawn of the side that just moved.
    let expected_rank = match side_to_move {
        Color::White => 5,
        Color::Black => 2,
    };
    if square_rank(square) != expected_rank {
        return Err(invalid(&format!("en-passant square '{en_passant_part}'")));
    }

    Ok(Some(square))
}
