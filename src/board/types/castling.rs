//! Castling rights type.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Color;
use super::square::Square;

const CASTLE_WHITE_K: u8 = 1 << 0;
const CASTLE_WHITE_Q: u8 = 1 << 1;
const CASTLE_BLACK_K: u8 = 1 << 2;
const CASTLE_BLACK_Q: u8 = 1 << 3;

/// All castling rights combined
const ALL_CASTLING_RIGHTS: u8 =
    CASTLE_WHITE_K | CASTLE_WHITE_Q | CASTLE_BLACK_K | CASTLE_BLACK_Q;

/// Rights that survive a move touching each square.
///
/// A move from or to a king or rook home square clears the matching rights, which covers
/// the king moving, a rook moving and a rook being captured in one lookup.
const fn rights_kept_table() -> [u8; 64] {
    let mut table = [ALL_CASTLING_RIGHTS; 64];
    table[Square::E1.index()] = ALL_CASTLING_RIGHTS & !(CASTLE_WHITE_K | CASTLE_WHITE_Q);
    table[Square::H1.index()] = ALL_CASTLING_RIGHTS & !CASTLE_WHITE_K;
    table[Square::A1.index()] = ALL_CASTLING_RIGHTS & !CASTLE_WHITE_Q;
    table[Square::E8.index()] = ALL_CASTLING_RIGHTS & !(CASTLE_BLACK_K | CASTLE_BLACK_Q);
    table[Square::H8.index()] = ALL_CASTLING_RIGHTS & !CASTLE_BLACK_K;
    table[Square::A8.index()] = ALL_CASTLING_RIGHTS & !CASTLE_BLACK_Q;
    table
}

static RIGHTS_KEPT: [u8; 64] = rights_kept_table();

/// Castling rights represented as a bitmask
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastlingRights(u8);

impl CastlingRights {
    /// No castling rights
    #[must_use]
    pub const fn none() -> Self {
        CastlingRights(0)
    }

    /// All castling rights (both sides can castle kingside and queenside)
    #[must_use]
    pub const fn all() -> Self {
        CastlingRights(ALL_CASTLING_RIGHTS)
    }

    /// Check if a specific castling right is set
    #[inline]
    #[must_use]
    pub const fn has(self, color: Color, kingside: bool) -> bool {
        self.0 & Self::bit_for(color, kingside) != 0
    }

    /// Set a specific castling right
    #[inline]
    pub fn set(&mut self, color: Color, kingside: bool) {
        self.0 |= Self::bit_for(color, kingside);
    }

    /// Remove a specific castling right
    #[inline]
    pub fn remove(&mut self, color: Color, kingside: bool) {
        self.0 &= !Self::bit_for(color, kingside);
    }

    /// Rights remaining after a move between `from` and `to`
    #[inline]
    #[must_use]
    pub(crate) fn after_move(self, from: Square, to: Square) -> Self {
        CastlingRights(self.0 & RIGHTS_KEPT[from.index()] & RIGHTS_KEPT[to.index()])
    }

    /// Get the raw bitmask value (for Zobrist hashing)
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Create from raw bitmask value
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        CastlingRights(value & ALL_CASTLING_RIGHTS)
    }

    #[inline]
    const fn bit_for(color: Color, kingside: bool) -> u8 {
        match (color, kingside) {
            (Color::White, true) => CASTLE_WHITE_K,
            (Color::White, false) => CASTLE_WHITE_Q,
            (Color::Black, true) => CASTLE_BLACK_K,
            (Color::Black, false) => CASTLE_BLACK_Q,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_king_move_clears_both_rights() {
        let rights = CastlingRights::all().after_move(Square::E1, Square::F1);
        assert!(!rights.has(Color::White, true));
        assert!(!rights.has(Color::White, false));
        assert!(rights.has(Color::Black, true));
        assert!(rights.has(Color::Black, false));
    }

    #[test]
    fn test_rook_capture_clears_victim_right() {
        let rights = CastlingRights::all().after_move(Square::B1, Square::H8);
        assert!(!rights.has(Color::Black, true));
        assert!(rights.has(Color::Black, false));
        assert!(rights.has(Color::White, true));
    }
}
