//! Position evaluation.
//!
//! The search consumes evaluation through the [`Evaluator`] trait only. Scores are
//! from the side to move's perspective: positive favours the player about to move.
//!
//! Two implementations ship with the crate:
//! - [`MaterialEvaluator`], a deterministic material count used as the reference
//! - [`ModelEvaluator`], which encodes the position and hands it to an external
//!   [`InferenceSession`]

mod material;
mod model;

pub use material::MaterialEvaluator;
pub use model::{InferenceSession, LinearModel, ModelEvaluator, LINEAR_MODEL_WEIGHTS};

use crate::board::{Color, Piece, Position};
use crate::error::Result;

/// Number of board input values: 8 ranks x 8 files x 12 piece planes
pub const BOARD_INPUT_SIZE: usize = 8 * 8 * 12;

/// Number of extra input features
pub const EXTRA_FEATURES: usize = 13;

/// Scores a position for the side to move.
///
/// Implementations must be deterministic for a given position if the search is to be
/// reproducible. A failed evaluation is reported as `FailedInference`; the search aborts
/// rather than substituting a score.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, position: &Position) -> Result<f32>;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, position: &Position) -> Result<f32> {
        (**self).evaluate(position)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&self, position: &Position) -> Result<f32> {
        (**self).evaluate(position)
    }
}

/// Model inputs for one position
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedPosition {
    /// `[rank][file][plane]` flattened row-major; plane is the piece index, plus 6 for black
    pub board: Vec<f32>,
    /// Side to move (1 for white), four castling flags (WK, WQ, BK, BQ), one-hot en passant
    /// file, and a trailing reserved zero
    pub extra: [f32; EXTRA_FEATURES],
}

/// Encode a position into the tensors a model session consumes.
#[must_use]
pub fn encode_position(position: &Position) -> EncodedPosition {
    let mut board = vec![0.0f32; BOARD_INPUT_SIZE];
    for color in Color::BOTH {
        let color_offset = if color == Color::Black { 6 } else { 0 };
        for piece in Piece::ALL {
            let plane = piece.index() + color_offset;
            for sq in position.pieces(color, piece).iter() {
                board[sq.index() * 12 + plane] = 1.0;
            }
        }
    }

    let mut extra = [0.0f32; EXTRA_FEATURES];
    if position.side_to_move() == Color::White {
        extra[0] = 1.0;
    }
    let rights = position.castling_rights();
    for (slot, (color, kingside)) in [
        (Color::White, true),
        (Color::White, false),
        (Color::Black, true),
        (Color::Black, false),
    ]
    .into_iter()
    .enumerate()
    {
        if rights.has(color, kingside) {
            extra[1 + slot] = 1.0;
        }
    }
    if let Some(ep) = position.en_passant() {
        extra[5 + ep.file() as usize] = 1.0;
    }

    EncodedPosition { board, extra }
}
