//! Attack bitboards per piece type.
//!
//! Knight, king and pawn attacks come from `const` tables built at compile
//! time; sliders trace rays against an occupancy bitboard and include the
//! first blocker. Move generation and check detection both read these.

use crate::game_state::chess_types::{Color, Square};

pub const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

pub const ROOK_DIRECTIONS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
pub const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

pub const KNIGHT_ATTACKS: [u64; 64] = generate_offset_table(&KNIGHT_OFFSETS);
pub const KING_ATTACKS: [u64; 64] = generate_offset_table(&KING_OFFSETS);
pub const WHITE_PAWN_ATTACKS: [u64; 64] = generate_offset_table(&[(-1, 1), (1, 1)]);
pub const BLACK_PAWN_ATTACKS: [u64; 64] = generate_offset_table(&[(-1, -1), (1, -1)]);

#[inline]
pub const fn knight_attacks(square: Square) -> u64 {
    KNIGHT_ATTACKS[square as usize]
}

#[inline]
pub const fn king_attacks(square: Square) -> u64 {
    KING_ATTACKS[square as usize]
}

/// Squares a pawn of `color` on `square` attacks (diagonally forward only).
#[inline]
pub const fn pawn_attacks(color: Color, square: Square) -> u64 {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[square as usize],
        Color::Black => BLACK_PAWN_ATTACKS[square as usize],
    }
}

#[inline]
pub fn rook_attacks(square: Square, occupancy: u64) -> u64 {
    slider_attacks(square, occupancy, &ROOK_DIRECTIONS)
}

#[inline]
pub fn bishop_attacks(square: Square, occupancy: u64) -> u64 {
    slider_attacks(square, occupancy, &BISHOP_DIRECTIONS)
}

#[inline]
pub fn queen_attacks(square: Square, occupancy: u64) -> u64 {
    rook_attacks(square, occupancy) | bishop_attacks(square, occupancy)
}

fn slider_attacks(square: Square, occupancy: u64, directions: &[(i32, i32)]) -> u64 {
    directions
        .iter()
        .fold(0u64, |acc, &(file_step, rank_step)| {
            acc | trace_ray(square as i32, file_step, rank_step, occupancy)
        })
}

fn trace_ray(square: i32, file_step: i32, rank_step: i32, occupancy: u64) -> u64 {
    let mut file = (square % 8) + file_step;
    let mut rank = (square / 8) + rank_step;
    let mut attacks = 0u64;

    while (0..8).contains(&file) && (0..8).contains(&rank) {
        let bit = 1u64 << (rank * 8 + file);
        attacks |= bit;

        if (occupancy & bit) != 0 {
            break;
        }

        file += file_step;
        rank += rank_step;
    }

    attacks
}

const fn generate_offset_table(offsets: &[(i32, i32)]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut attacks = 0u64;
        let mut i = 0usize;

        while i < offsets.len() {
            let target_file = file + offsets[i].0;
            let target_rank = rank + offsets[i].1;
            if target_file >= 0 && target_file < 8 && target_rank >= 0 && target_rank < 8 {
                attacks |= 1u64 << (target_rank * 8 + target_file);
            }
            i += 1;
        }

        table[sq] = attacks;
        sq += 1;
    }

    table
}

/// Iterates the set squares of a bitboard, lowest first.
#[inline]
pub fn squares_in(mut bitboard: u64) -> impl Iterator<Item = Square> {
    std::iter::from_fn(move || {
        if bitboard == 0 {
            return None;
        }
        let sq = bitboard.trailing_zeros() as Square;
        bitboard &= bitboard - 1;
        Some(sq)
    })
}
