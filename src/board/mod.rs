//! Chess position representation and game rules.
//!
//! Uses bitboards for move generation and make/unmake for in-place search.
//! Supports full chess rules including castling, en passant, and promotions.
//!
//! # Example
//! ```
//! use chess_search::board::Position;
//!
//! let mut position = Position::new();
//! let moves = position.generate_legal_moves().unwrap();
//! assert_eq!(moves.len(), 20);
//! ```

mod attack_tables;
mod builder;
mod fen;
mod make_unmake;
mod movegen;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use builder::PositionBuilder;
pub use make_unmake::ScopedMove;
pub use state::{Position, UndoInfo};
pub use types::{
    Bitboard, BitboardIter, CastlingRights, Color, Move, MoveList, MoveType, Piece, ScoredMove,
    ScoredMoveList, Square,
};

pub(crate) use types::{EMPTY_MOVE, PROMOTION_PIECES};
