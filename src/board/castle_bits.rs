// src/board/castle_bits.rs

/// Underlying bit type for castling rights.
pub type CastleBits = u8;

pub const CASTLE_WK: CastleBits = 0b0001;
pub const CASTLE_WQ: CastleBits = 0b0010;
pub const CASTLE_BK: CastleBits = 0b0100;
pub const CASTLE_BQ: CastleBits = 0b1000;

/// Castling direction relative to the king.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleSide {
    /// Short castling, O-O.
    King,
    /// Long castling, O-O-O.
    Queen,
}

use super::Color;

/// Rights bit guarding the given castling.
#[inline(always)]
pub const fn castle_right(color: Color, side: CastleSide) -> CastleBits {
    match (color, side) {
        (Color::White, CastleSide::King) => CASTLE_WK,
        (Color::White, CastleSide::Queen) => CASTLE_WQ,
        (Color::Black, CastleSide::King) => CASTLE_BK,
        (Color::Black, CastleSide::Queen) => CASTLE_BQ,
    }
}

/// Squares between king and rook that must be empty.
#[inline(always)]
pub const fn castle_between(color: Color, side: CastleSide) -> u64 {
    match (color, side) {
        (Color::White, CastleSide::King) => 0x0000_0000_0000_0060, // f1, g1
        (Color::White, CastleSide::Queen) => 0x0000_0000_0000_000E, // b1, c1, d1
        (Color::Black, CastleSide::King) => 0x6000_0000_0000_0000, // f8, g8
        (Color::Black, CastleSide::Queen) => 0x0E00_0000_0000_0000, // b8, c8, d8
    }
}

/// Squares the king stands on or passes through; none may be attacked.
#[inline(always)]
pub const fn castle_king_path(color: Color, side: CastleSide) -> u64 {
    match (color, side) {
        (Color::White, CastleSide::King) => 0x0000_0000_0000_0070, // e1, f1, g1
        (Color::White, CastleSide::Queen) => 0x0000_0000_0000_001C, // c1, d1, e1
        (Color::Black, CastleSide::King) => 0x7000_0000_0000_0000, // e8, f8, g8
        (Color::Black, CastleSide::Queen) => 0x1C00_0000_0000_0000, // c8, d8, e8
    }
}

/// Home corner of the castling rook.
#[inline(always)]
pub const fn castle_rook_home(color: Color, side: CastleSide) -> u8 {
    match (color, side) {
        (Color::White, CastleSide::King) => 7,   // h1
        (Color::White, CastleSide::Queen) => 0,  // a1
        (Color::Black, CastleSide::King) => 63,  // h8
        (Color::Black, CastleSide::Queen) => 56, // a8
    }
}

/// Destination square of the king.
#[inline(always)]
pub const fn castle_king_to(color: Color, side: CastleSide) -> u8 {
    match (color, side) {
        (Color::White, CastleSide::King) => 6,   // g1
        (Color::White, CastleSide::Queen) => 2,  // c1
        (Color::Black, CastleSide::King) => 62,  // g8
        (Color::Black, CastleSide::Queen) => 58, // c8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn castle_bits_single_and_disjoint() {
        assert_eq!(CASTLE_WK.count_ones(), 1);
        assert_eq!(CASTLE_WQ.count_ones(), 1);
        assert_eq!(CASTLE_BK.count_ones(), 1);
        assert_eq!(CASTLE_BQ.count_ones(), 1);

        let all = CASTLE_WK | CASTLE_WQ | CASTLE_BK | CASTLE_BQ;
        assert_eq!(all.count_ones(), 4);
    }

    #[test]
    fn king_path_contains_between_squares() {
        for color in [Color::White, Color::Black] {
            for side in [CastleSide::King, CastleSide::Queen] {
                let between = castle_between(color, side);
                let path = castle_king_path(color, side);
                // Kingside: between == path minus the king's start square.
                // Queenside: b-file square is occupancy-only.
                assert_eq!(path.count_ones(), 3);
                assert!(between & path != 0);
            }
        }
    }

    #[test]
    fn rook_homes_are_corners() {
        assert_eq!(castle_rook_home(Color::White, CastleSide::King), 7);
        assert_eq!(castle_rook_home(Color::White, CastleSide::Queen), 0);
        assert_eq!(castle_rook_home(Color::Black, CastleSide::King), 63);
        assert_eq!(castle_rook_home(Color::Black, CastleSide::Queen), 56);
    }
}
