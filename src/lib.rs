//! Bitboard chess search core.
//!
//! A [`board::Position`] is searched by a [`search::SearchEngine`] with iterative
//! deepening and alpha-beta pruning. Leaf scores come from an [`evaluation::Evaluator`],
//! and results are cached in a shared [`tt::TranspositionTable`].

pub mod board;
pub mod error;
pub mod evaluation;
pub mod search;
pub mod tt;
mod zobrist;

pub use board::{Color, Move, MoveType, Piece, Position, PositionBuilder, Square};
pub use error::{EngineError, Result};
pub use evaluation::{Evaluator, MaterialEvaluator};
pub use search::{EngineConfig, SearchEngine, SearchLimits, SearchResult};
pub use tt::TranspositionTable;
