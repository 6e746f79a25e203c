//! Move types and move list.

use std::fmt;
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::square::Square;
use crate::error::{EngineError, Result};

/// How a move is applied to the board.
///
/// The tag alone decides which auxiliary state changes on application: capture
/// removal, rook relocation, en passant target, promotion.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MoveType {
    Normal,
    Attack,
    EnPassant,
    DoublePawnAdvance,
    Promotion,
    PromotionAttack,
    KingSideCastle,
    QueenSideCastle,
}

impl MoveType {
    pub const ALL: [MoveType; 8] = [
        MoveType::Normal,
        MoveType::Attack,
        MoveType::EnPassant,
        MoveType::DoublePawnAdvance,
        MoveType::Promotion,
        MoveType::PromotionAttack,
        MoveType::KingSideCastle,
        MoveType::QueenSideCastle,
    ];

    #[inline]
    const fn code(self) -> u32 {
        match self {
            MoveType::Normal => 0,
            MoveType::Attack => 1,
            MoveType::EnPassant => 2,
            MoveType::DoublePawnAdvance => 3,
            MoveType::Promotion => 4,
            MoveType::PromotionAttack => 5,
            MoveType::KingSideCastle => 6,
            MoveType::QueenSideCastle => 7,
        }
    }

    #[inline]
    const fn from_code(code: u32) -> MoveType {
        match code & 0x7 {
            0 => MoveType::Normal,
            1 => MoveType::Attack,
            2 => MoveType::EnPassant,
            3 => MoveType::DoublePawnAdvance,
            4 => MoveType::Promotion,
            5 => MoveType::PromotionAttack,
            6 => MoveType::KingSideCastle,
            _ => MoveType::QueenSideCastle,
        }
    }

    /// Removes an enemy piece (en passant included)
    #[inline]
    #[must_use]
    pub const fn is_capture(self) -> bool {
        matches!(
            self,
            MoveType::Attack | MoveType::EnPassant | MoveType::PromotionAttack
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_promotion(self) -> bool {
        matches!(self, MoveType::Promotion | MoveType::PromotionAttack)
    }

    #[inline]
    #[must_use]
    pub const fn is_castle(self) -> bool {
        matches!(self, MoveType::KingSideCastle | MoveType::QueenSideCastle)
    }
}

const FROM_MASK: u32 = 0x3F;
const TO_SHIFT: u32 = 6;
const PROMO_SHIFT: u32 = 12;
const TYPE_SHIFT: u32 = 15;
const RAW_MASK: u32 = (1 << 18) - 1;

const fn promotion_code(piece: Piece) -> u32 {
    match piece {
        Piece::Knight => 1,
        Piece::Bishop => 2,
        Piece::Rook => 3,
        Piece::Queen => 4,
        Piece::Pawn | Piece::King => 0,
    }
}

/// Compact move representation packed into 18 bits of a `u32`.
///
/// Encoding:
/// - bits 0-5:   from square (0-63)
/// - bits 6-11:  to square (0-63)
/// - bits 12-14: promotion piece (0 none, 1 knight, 2 bishop, 3 rook, 4 queen)
/// - bits 15-17: move type
///
/// The all-zero value is the null move; a1-a1 is never a real move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "u32", into = "u32")
)]
pub struct Move(u32);

impl Move {
    /// Create a null/empty move (used for initialization)
    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Move(0)
    }

    /// Create a validated move.
    ///
    /// The promotion piece must be present exactly for promotion move types and must
    /// be a knight, bishop, rook or queen.
    pub fn new(from: Square, to: Square, move_type: MoveType, promotion: Option<Piece>) -> Result<Self> {
        match (move_type.is_promotion(), promotion) {
            (true, Some(piece)) if piece.is_promotion_target() => {
                Ok(Move::encode(from, to, move_type, promotion_code(piece)))
            }
            (true, piece) => Err(EngineError::InvalidPieceType { piece }),
            (false, None) => Ok(Move::encode(from, to, move_type, 0)),
            (false, Some(piece)) => Err(EngineError::InvalidPieceType { piece: Some(piece) }),
        }
    }

    /// Create a non-promotion move; used by the generator where the tag is known valid
    #[inline]
    #[must_use]
    pub(crate) const fn simple(from: Square, to: Square, move_type: MoveType) -> Self {
        Move::encode(from, to, move_type, 0)
    }

    /// Create a promotion; `piece` comes from `PROMOTION_PIECES`
    #[inline]
    #[must_use]
    pub(crate) const fn promotion_move(from: Square, to: Square, capture: bool, piece: Piece) -> Self {
        let move_type = if capture {
            MoveType::PromotionAttack
        } else {
            MoveType::Promotion
        };
        Move::encode(from, to, move_type, promotion_code(piece))
    }

    #[inline]
    const fn encode(from: Square, to: Square, move_type: MoveType, promo: u32) -> Self {
        Move(
            from.as_u8() as u32
                | ((to.as_u8() as u32) << TO_SHIFT)
                | (promo << PROMO_SHIFT)
                | (move_type.code() << TYPE_SHIFT),
        )
    }

    /// Get the source square
    #[inline]
    #[must_use]
    pub const fn from(self) -> Square {
        Square::from_index_unchecked((self.0 & FROM_MASK) as u8)
    }

    /// Get the destination square
    #[inline]
    #[must_use]
    pub const fn to(self) -> Square {
        Square::from_index_unchecked(((self.0 >> TO_SHIFT) & FROM_MASK) as u8)
    }

    #[inline]
    #[must_use]
    pub const fn move_type(self) -> MoveType {
        MoveType::from_code(self.0 >> TYPE_SHIFT)
    }

    /// Get the promotion piece, if this is a promotion move
    #[inline]
    #[must_use]
    pub const fn promotion(self) -> Option<Piece> {
        match (self.0 >> PROMO_SHIFT) & 0x7 {
            1 => Some(Piece::Knight),
            2 => Some(Piece::Bishop),
            3 => Some(Piece::Rook),
            4 => Some(Piece::Queen),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_capture(self) -> bool {
        self.move_type().is_capture()
    }

    #[inline]
    #[must_use]
    pub const fn is_promotion(self) -> bool {
        self.move_type().is_promotion()
    }

    #[inline]
    #[must_use]
    pub const fn is_castling(self) -> bool {
        self.move_type().is_castle()
    }

    #[inline]
    #[must_use]
    pub const fn is_en_passant(self) -> bool {
        matches!(self.move_type(), MoveType::EnPassant)
    }

    /// Returns true if this move is tactical (capture or promotion)
    #[inline]
    #[must_use]
    pub const fn is_tactical(self) -> bool {
        self.is_capture() || self.is_promotion()
    }

    /// Get the raw value (for hashing/storage)
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Decode a raw value, rejecting bits outside the encoding and promotion codes that
    /// do not match the move type.
    pub fn from_u32(value: u32) -> Result<Self> {
        if value & !RAW_MASK != 0 {
            return Err(EngineError::invalid_position(format!(
                "raw move {value:#x} has bits outside the encoding"
            )));
        }
        let mv = Move(value);
        if value == 0 {
            return Ok(mv);
        }
        let promo_bits = (value >> PROMO_SHIFT) & 0x7;
        match (mv.move_type().is_promotion(), promo_bits) {
            (true, 1..=4) | (false, 0) => Ok(mv),
            _ => Err(EngineError::InvalidPieceType {
                piece: mv.promotion(),
            }),
        }
    }

    /// Decode a value produced by [`Move::as_u32`] without validation (TT storage path)
    #[inline]
    #[must_use]
    pub(crate) const fn from_u32_unchecked(value: u32) -> Self {
        Move(value & RAW_MASK)
    }
}

impl TryFrom<u32> for Move {
    type Error = EngineError;

    fn try_from(value: u32) -> Result<Self> {
        Move::from_u32(value)
    }
}

impl From<Move> for u32 {
    fn from(mv: Move) -> u32 {
        mv.as_u32()
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "Move(null)");
        }
        write!(f, "Move({}{} {:?}", self.from(), self.to(), self.move_type())?;
        if let Some(promo) = self.promotion() {
            write!(f, "={}", promo.to_char().to_ascii_uppercase())?;
        }
        write!(f, ")")
    }
}

/// Long algebraic notation (`e2e4`, `e7e8q`)
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "0000");
        }
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(promo) = self.promotion() {
            write!(f, "{}", promo.to_char())?;
        }
        Ok(())
    }
}

pub(crate) const MAX_MOVES: usize = 256;
pub(crate) const EMPTY_MOVE: Move = Move::null();

/// List of moves with fixed-size backing array.
#[derive(Clone, Debug)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    #[must_use]
    pub fn new() -> Self {
        MoveList {
            moves: [EMPTY_MOVE; MAX_MOVES],
            len: 0,
        }
    }

    pub(crate) fn push(&mut self, mv: Move) {
        self.moves[self.len] = mv;
        self.len += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }

    #[must_use]
    pub fn first(&self) -> Option<Move> {
        self.as_slice().first().copied()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl Default for MoveList {
    fn default() -> Self {
        MoveList::new()
    }
}

impl Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, idx: usize) -> &Self::Output {
        assert!(
            idx < self.len,
            "MoveList index {} out of bounds (len {})",
            idx,
            self.len
        );
        &self.moves[idx]
    }
}

/// A scored move for move ordering.
#[derive(Clone, Copy, Debug)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

/// Fixed-size list of scored moves to avoid heap allocation.
#[derive(Clone, Debug)]
pub struct ScoredMoveList {
    moves: [ScoredMove; MAX_MOVES],
    len: usize,
}

impl ScoredMoveList {
    #[must_use]
    pub fn new() -> Self {
        ScoredMoveList {
            moves: [ScoredMove {
                mv: EMPTY_MOVE,
                score: 0,
            }; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move, score: i32) {
        self.moves[self.len] = ScoredMove { mv, score };
        self.len += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Partial sort: find the best move from index `start` onwards and swap it to position `start`.
    ///
    /// Incremental selection sort avoids sorting moves an early cutoff never reaches.
    /// Ties keep generation order, so ordering is deterministic.
    #[inline]
    pub fn pick_best(&mut self, start: usize) -> Option<ScoredMove> {
        if start >= self.len {
            return None;
        }

        let mut best_idx = start;
        let mut best_score = self.moves[start].score;
        for i in (start + 1)..self.len {
            if self.moves[i].score > best_score {
                best_score = self.moves[i].score;
                best_idx = i;
            }
        }

        if best_idx != start {
            // Rotate rather than swap so equal-scored moves keep their relative order
            self.moves[start..=best_idx].rotate_right(1);
        }

        Some(self.moves[start])
    }
}

impl Default for ScoredMoveList {
    fn default() -> Self {
        ScoredMoveList::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_layout() {
        let mv = Move::new(Square::E1, Square::G1, MoveType::KingSideCastle, None).unwrap();
        assert_eq!(mv.as_u32() & 0x3F, 4);
        assert_eq!((mv.as_u32() >> 6) & 0x3F, 6);
        assert_eq!(mv.as_u32() >> 15, 6);
        assert_eq!(mv.from(), Square::E1);
        assert_eq!(mv.to(), Square::G1);
        assert!(mv.is_castling());
        assert_eq!(mv.promotion(), None);
    }

    #[test]
    fn test_promotion_requires_valid_piece() {
        let from = Square::parse("a7").unwrap();
        let to = Square::A8;
        let err = Move::new(from, to, MoveType::Promotion, Some(Piece::King)).unwrap_err();
        assert_eq!(err.code(), "invalid_piece_type");
        let err = Move::new(from, to, MoveType::Promotion, None).unwrap_err();
        assert_eq!(err.code(), "invalid_piece_type");
        let err = Move::new(from, to, MoveType::Normal, Some(Piece::Queen)).unwrap_err();
        assert_eq!(err.code(), "invalid_piece_type");

        let mv = Move::new(from, to, MoveType::PromotionAttack, Some(Piece::Knight)).unwrap();
        assert_eq!(mv.promotion(), Some(Piece::Knight));
        assert!(mv.is_capture());
        assert_eq!(mv.to_string(), "a7a8n");
    }

    #[test]
    fn test_from_u32_rejects_bad_promotion_bits() {
        // Promotion type with promotion code 6
        let raw = (4 << 15) | (6 << 12) | (56 << 6) | 48;
        assert_eq!(Move::from_u32(raw).unwrap_err().code(), "invalid_piece_type");
        // Normal move carrying a promotion code
        let raw = (4 << 12) | (28 << 6) | 12;
        assert_eq!(Move::from_u32(raw).unwrap_err().code(), "invalid_piece_type");
        assert_eq!(Move::from_u32(1 << 20).unwrap_err().code(), "invalid_position");

        let mv = Move::new(Square::E1, Square::E8, MoveType::Attack, None).unwrap();
        assert_eq!(Move::from_u32(mv.as_u32()).unwrap(), mv);
    }

    #[test]
    fn test_pick_best_is_stable_for_ties() {
        let a = Move::simple(Square::A1, Square::B1, MoveType::Normal);
        let b = Move::simple(Square::A1, Square::C1, MoveType::Normal);
        let c = Move::simple(Square::A1, Square::D1, MoveType::Attack);
        let mut list = ScoredMoveList::new();
        list.push(a, 0);
        list.push(b, 0);
        list.push(c, 10);
        assert_eq!(list.pick_best(0).map(|s| s.mv), Some(c));
        assert_eq!(list.pick_best(1).map(|s| s.mv), Some(a));
        assert_eq!(list.pick_best(2).map(|s| s.mv), Some(b));
        assert!(list.pick_best(3).is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates_encoding() {
        let mv = Move::new(Square::A8, Square::B8, MoveType::Normal, None).unwrap();
        let json = serde_json::to_string(&mv).unwrap();
        assert_eq!(json, mv.as_u32().to_string());
        assert_eq!(serde_json::from_str::<Move>(&json).unwrap(), mv);

        // A promotion code on a non-promotion move
        let bad_promo = mv.as_u32() | (1 << PROMO_SHIFT);
        assert!(serde_json::from_str::<Move>(&bad_promo.to_string()).is_err());
        // A promotion move without a piece
        let bare = Move::new(Square::A8, Square::A8, MoveType::Promotion, Some(Piece::Queen))
            .unwrap()
            .as_u32()
            & !(0x7 << PROMO_SHIFT);
        assert!(serde_json::from_str::<Move>(&bare.to_string()).is_err());
        // Bits outside the encoding
        assert!(serde_json::from_str::<Move>(&(1u32 << 20).to_string()).is_err());
    }
}
