//! Fluent builder for constructing validated positions.
//!
//! Allows creating positions piece by piece rather than parsing FEN strings.
//!
//! # Example
//! ```
//! use chess_search::board::{Color, Piece, PositionBuilder, Square};
//!
//! let position = PositionBuilder::new()
//!     .piece(Square::E1, Color::White, Piece::King)
//!     .piece(Square::E8, Color::Black, Piece::King)
//!     .piece(Square::A8, Color::White, Piece::Rook)
//!     .side_to_move(Color::Black)
//!     .build()
//!     .unwrap();
//! assert_eq!(position.side_to_move(), Color::Black);
//! ```

use crate::error::{EngineError, Result};

use super::{CastlingRights, Color, Piece, Position, Square};

/// A fluent builder for constructing `Position` values.
#[derive(Clone, Debug)]
pub struct PositionBuilder {
    pieces: Vec<(Square, Color, Piece)>,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for PositionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionBuilder {
    /// Create a builder for an empty board.
    #[must_use]
    pub fn new() -> Self {
        PositionBuilder {
            pieces: Vec::new(),
            side_to_move: Color::White,
            castling: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Create a builder starting from the standard initial position.
    #[must_use]
    pub fn starting_position() -> Self {
        let start = Position::new();
        let mut builder = Self::new();
        for color in Color::BOTH {
            for piece in Piece::ALL {
                for sq in start.pieces(color, piece).iter() {
                    builder.pieces.push((sq, color, piece));
                }
            }
        }
        builder.castling = CastlingRights::all();
        builder
    }

    /// Place a piece, replacing whatever stood on `square`.
    #[must_use]
    pub fn piece(mut self, square: Square, color: Color, piece: Piece) -> Self {
        self.pieces.retain(|(sq, _, _)| *sq != square);
        self.pieces.push((square, color, piece));
        self
    }

    #[must_use]
    pub fn clear(mut self, square: Square) -> Self {
        self.pieces.retain(|(sq, _, _)| *sq != square);
        self
    }

    #[must_use]
    pub const fn side_to_move(mut self, color: Color) -> Self {
        self.side_to_move = color;
        self
    }

    #[must_use]
    pub const fn castling(mut self, rights: CastlingRights) -> Self {
        self.castling = rights;
        self
    }

    /// Enable one castling right.
    #[must_use]
    pub fn castle(mut self, color: Color, kingside: bool) -> Self {
        self.castling.set(color, kingside);
        self
    }

    #[must_use]
    pub const fn en_passant(mut self, target: Square) -> Self {
        self.en_passant = Some(target);
        self
    }

    /// Set the halfmove clock (for the fifty-move rule).
    #[must_use]
    pub const fn halfmove_clock(mut self, clock: u32) -> Self {
        self.halfmove_clock = clock;
        self
    }

    #[must_use]
    pub const fn fullmove_number(mut self, number: u32) -> Self {
        self.fullmove_number = number;
        self
    }

    /// Build the position, rejecting boards the search cannot work on.
    ///
    /// Each side needs exactly one king, no pawn may stand on the first or last rank,
    /// every castling right needs its king and rook at home, and an en passant target
    /// must sit behind an enemy pawn that could just have advanced two squares.
    pub fn build(self) -> Result<Position> {
        let mut position = Position::empty();
        for (square, color, piece) in self.pieces {
            position.set_piece(square, color, piece);
        }
        position.side_to_move = self.side_to_move;
        position.castling = self.castling;
        position.en_passant = self.en_passant;
        position.halfmove_clock = self.halfmove_clock;
        position.fullmove_number = self.fullmove_number.max(1);

        validate(&position)?;
        position.hash = position.compute_hash();
        Ok(position)
    }
}

fn validate(position: &Position) -> Result<()> {
    for color in Color::BOTH {
        let kings = position.pieces(color, Piece::King).popcount();
        if kings != 1 {
            return Err(EngineError::invalid_position(format!(
                "{color} has {kings} kings"
            )));
        }
        let pawns = position.pieces(color, Piece::Pawn);
        if pawns.iter().any(|sq| sq.rank() == 0 || sq.rank() == 7) {
            return Err(EngineError::invalid_position(format!(
                "{color} pawn on a back rank"
            )));
        }
        for (kingside, rook_file) in [(true, 7), (false, 0)] {
            if !position.castling.has(color, kingside) {
                continue;
            }
            let rank = color.back_rank();
            if position.piece_at(Square::at(rank, 4)) != Some((color, Piece::King))
                || position.piece_at(Square::at(rank, rook_file)) != Some((color, Piece::Rook))
            {
                return Err(EngineError::invalid_position(format!(
                    "{color} castling right without king and rook at home"
                )));
            }
        }
    }

    if let Some(ep) = position.en_passant {
        let mover = position.side_to_move;
        let (ep_rank, pawn_rank) = match mover {
            Color::White => (5, 4),
            Color::Black => (2, 3),
        };
        let pawn_sq = Square::at(pawn_rank, ep.file());
        if ep.rank() != ep_rank
            || position.piece_at(pawn_sq) != Some((mover.opponent(), Piece::Pawn))
            || position.piece_at(ep).is_some()
        {
            return Err(EngineError::invalid_position(format!(
                "en passant target {ep} without a pawn that just advanced two"
            )));
        }
    }

    if position.is_in_check(position.side_to_move.opponent())? {
        return Err(EngineError::invalid_position(
            "the side not to move is in check",
        ));
    }
    Ok(())
}
