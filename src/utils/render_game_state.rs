//! Plain-text board renderer for logs and terminal clients.

use crate::game_state::chess_types::*;

/// Render the board from white's side (rank 8 on top).
pub fn render_board(position: &Position) -> String {
    render_board_from(position, Color::White)
}

/// Render the board as seen by `perspective`; black's view is flipped so its
/// own pieces sit at the bottom.
pub fn render_board_from(position: &Position, perspective: Color) -> String {
    let files: Vec<u8> = match perspective {
        Color::White => (0..8).collect(),
        Color::Black => (0..8).rev().collect(),
    };
    let ranks: Vec<u8> = match perspective {
        Color::White => (0..8).rev().collect(),
        Color::Black => (0..8).collect(),
    };

    let header: String = files
        .iter()
        .map(|file| format!(" {}", char::from(b'a' + file)))
        .collect();

    let mut out = String::new();
    out.push(' ');
    out.push_str(&header);
    out.push('\n');

    for &rank in &ranks {
        let label = char::from(b'1' + rank);
        out.push(label);
        for &file in &files {
            out.push(' ');
            out.push(
                position
                    .piece_at(make_square(file, rank))
                    .map(Piece::fen_char)
                    .unwrap_or('.'),
            );
        }
        out.push(' ');
        out.push(label);
        out.push('\n');
    }

    out.push(' ');
    out.push_str(&header);
    out
}

#[cfg(test)]
mod tests {
    use super::{render_board, render_board_from};
    use crate::game_state::chess_types::{Color, Position};

    #[test]
    fn white_view_puts_black_pieces_on_top() {
        let text = render_board(&Position::new_game());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[1], "8 r n b q k b n r 8");
        assert_eq!(lines[8], "1 R N B Q K B N R 1");
    }

    #[test]
    fn black_view_is_flipped() {
        let text = render_board_from(&Position::new_game(), Color::Black);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "  h g f e d c b a");
        assert_eq!(lines[1], "1 R N B K Q B N R 1");
    }
}
