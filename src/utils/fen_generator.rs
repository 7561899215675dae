use crate::game_state::chess_types::*;
use crate::utils::algebraic::square_to_algebraic;

pub fn generate_fen(position: &Position) -> String {
    let board = generate_board_field(position);
    let side_to_move = match position.side_to_move {
        Color::White => "w",
        Color::Black => "b",
    };
    let castling = generate_castling_field(position.castling_rights);
    let en_passant = position
        .en_passant_target
        .map(square_to_algebraic)
        .unwrap_or_else(|| "-".to_owned());

    format!(
        "{} {} {} {} {} {}",
        board,
        side_to_move,
        castling,
        en_passant,
        position.halfmove_clock,
        position.fullmove_number
    )
}

fn generate_board_field(position: &Position) -> String {
    let mut out = String::new();

    for rank in (0..8u8).rev() {
        let mut empty_count = 0u8;

        for file in 0..8u8 {
            match position.piece_at(make_square(file, rank)) {
                Some(piece) => {
                    if empty_count > 0 {
                        out.push(char::from(b'0' + empty_count));
                        empty_count = 0;
                    }
                    out.push(piece.fen_char());
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }

        if rank > 0 {
            out.push('/');
        }
    }

    out
}

fn generate_castling_field(rights: CastlingRights) -> String {
    if rights.is_empty() {
        return "-".to_owned();
    }

    let mut out = String::with_capacity(4);
    if rights.white_king_side {
        out.push('K');
    }
    if rights.white_queen_side {
        out.push('Q');
    }
    if rights.black_king_side {
        out.push('k');
    }
    if rights.black_queen_side {
        out.push('q');
    }
    out
}
