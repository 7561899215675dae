//! Make/unmake move application.
//!
//! `make_move` mutates a position in place and returns the `UndoState` needed
//! to restore it exactly with `unmake_move`. The legality filter uses this
//! pair as its tentative-apply/revert cycle; `apply_move` is the persistent
//! variant used when a move is committed.

use crate::chess_errors::ChessError;
use crate::game_state::chess_rules::castling_path_for;
use crate::game_state::chess_types::*;
use crate::moves::chess_move::ChessMove;
use crate::moves::pawn_moves::en_passant_capture_square;
use crate::utils::algebraic::square_to_algebraic;

/// Returns a new position with `mv` applied; `position` is left untouched.
pub fn apply_move(position: &Position, mv: ChessMove) -> Result<Position, ChessError> {
    let mut next = position.clone();
    make_move(&mut next, mv)?;
    Ok(next)
}

pub fn make_move(position: &mut Position, mv: ChessMove) -> Result<UndoState, ChessError> {
    let mover = position.side_to_move;
    let moved_piece = match position.piece_at(mv.from) {
        Some(piece) if piece.color == mover => piece,
        _ => {
            return Err(ChessError::InvalidPosition(format!(
                "no {mover} piece on {}",
                square_to_algebraic(mv.from)
            )))
        }
    };

    let undo = UndoState {
        mv,
        moved_piece,
        captured: None,
        prev_castling_rights: position.castling_rights,
        prev_en_passant_target: position.en_passant_target,
        prev_halfmove_clock: position.halfmove_clock,
        prev_fullmove_number: position.fullmove_number,
    };

    position.remove_piece(mv.from);

    // En passant removes a pawn that is not on the destination square.
    let capture_square = if mv.is_en_passant {
        en_passant_capture_square(mv.to, mover)
    } else {
        Some(mv.to)
    };
    let captured = capture_square
        .and_then(|sq| position.remove_piece(sq).map(|piece| (sq, piece)));

    let placed = mv
        .promotion
        .map(|kind| Piece::new(mover, kind))
        .unwrap_or(moved_piece);
    position.set_piece(mv.to, placed);

    if mv.is_castle && moved_piece.kind == PieceKind::King {
        if let Some(path) = castling_path_for(mover, mv.from, mv.to) {
            if let Some(rook) = position.remove_piece(path.rook_from) {
                position.set_piece(path.rook_to, rook);
            }
        }
    }

    if moved_piece.kind == PieceKind::King {
        position.castling_rights.clear_side(mover);
    }
    position.castling_rights.clear_rook_corner(mv.from);
    // Capturing a rook on its home corner also removes that right.
    position.castling_rights.clear_rook_corner(mv.to);

    position.en_passant_target =
        if moved_piece.kind == PieceKind::Pawn && mv.from.abs_diff(mv.to) == 16 {
            Some((mv.from + mv.to) / 2)
        } else {
            None
        };

    if moved_piece.kind == PieceKind::Pawn || captured.is_some() {
        position.halfmove_clock = 0;
    } else {
        position.halfmove_clock = position.halfmove_clock.saturating_add(1);
    }
    if mover == Color::Black {
        position.fullmove_number = position.fullmove_number.saturating_add(1);
    }

    position.side_to_move = mover.opposite();

    Ok(UndoState { captured, ..undo })
}

/// Reverts the move recorded in `undo`, which must be the last one made.
pub fn unmake_move(position: &mut Position, undo: &UndoState) {
    let mv = undo.mv;
    let mover = undo.moved_piece.color;

    if mv.is_castle && undo.moved_piece.kind == PieceKind::King {
        if let Some(path) = castling_path_for(mover, mv.from, mv.to) {
            if let Some(rook) = position.remove_piece(path.rook_to) {
                position.set_piece(path.rook_from, rook);
            }
        }
    }

    position.remove_piece(mv.to);
    position.set_piece(mv.from, undo.moved_piece);
    if let Some((square, piece)) = undo.captured {
        position.set_piece(square, piece);
    }

    position.side_to_move = mover;
    position.castling_rights = undo.prev_castling_rights;
    position.en_passant_target = undo.prev_en_passant_target;
    position.halfmove_clock = undo.prev_halfmove_clock;
    position.fullmove_number = undo.prev_fullmove_number;
}
