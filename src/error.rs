//! Error type shared by the position, move generator, evaluator and search.
//!
//! Every variant maps to a stable string code (see [`EngineError::code`]) so callers
//! can report failures without matching on message text.

use std::fmt;

use crate::board::{Color, Move, Piece, Square};

/// Error type for every fallible engine operation
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// An internal invariant was violated (e.g. the side to move has no king)
    IllegalState { reason: String },
    /// The move is not in the legal move set of the current position
    InvalidMove { mv: Move },
    /// The board is structurally inconsistent with the requested operation
    InvalidPosition { reason: String },
    /// Upstream FEN text could not be parsed
    InvalidFenString { fen: String, reason: String },
    /// A promotion piece outside knight, bishop, rook, queen
    InvalidPieceType { piece: Option<Piece> },
    /// A king query was made for a side without a king
    KingNotFound { color: Color },
    /// The evaluator's backing model could not be initialised
    FailedToLoadModel { reason: String },
    /// A single evaluator call failed
    FailedInference { reason: String },
}

impl EngineError {
    /// Stable, machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            EngineError::IllegalState { .. } => "illegal_state",
            EngineError::InvalidMove { .. } => "invalid_move",
            EngineError::InvalidPosition { .. } => "invalid_position",
            EngineError::InvalidFenString { .. } => "invalid_fen_string",
            EngineError::InvalidPieceType { .. } => "invalid_piece_type",
            EngineError::KingNotFound { .. } => "king_not_found",
            EngineError::FailedToLoadModel { .. } => "failed_to_load_model",
            EngineError::FailedInference { .. } => "failed_inference",
        }
    }

    pub(crate) fn invalid_position(reason: impl Into<String>) -> Self {
        EngineError::InvalidPosition {
            reason: reason.into(),
        }
    }

    pub(crate) fn empty_square(sq: Square) -> Self {
        EngineError::invalid_position(format!("no piece of the side to move on {sq}"))
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::IllegalState { reason } => write!(f, "illegal state: {reason}"),
            EngineError::InvalidMove { mv } => write!(f, "move {mv} is not legal here"),
            EngineError::InvalidPosition { reason } => write!(f, "invalid position: {reason}"),
            EngineError::InvalidFenString { fen, reason } => {
                write!(f, "invalid FEN '{fen}': {reason}")
            }
            EngineError::InvalidPieceType { piece: Some(piece) } => {
                write!(f, "{piece:?} is not a valid promotion piece")
            }
            EngineError::InvalidPieceType { piece: None } => {
                write!(f, "missing or undecodable promotion piece")
            }
            EngineError::KingNotFound { color } => write!(f, "no {color} king on the board"),
            EngineError::FailedToLoadModel { reason } => {
                write!(f, "failed to load evaluation model: {reason}")
            }
            EngineError::FailedInference { reason } => {
                write!(f, "model inference failed: {reason}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, EngineError>;
