use crate::board::{Piece, Position};
use crate::error::Result;

use super::Evaluator;

/// Material balance in pawns for the side to move.
///
/// Deterministic and infallible; it stands in for a learned model in tests,
/// benchmarks and the command line tool.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialEvaluator;

impl MaterialEvaluator {
    const PIECES: [Piece; 5] = [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];
}

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, position: &Position) -> Result<f32> {
        let us = position.side_to_move();
        let them = us.opponent();
        let balance: i32 = Self::PIECES
            .iter()
            .map(|&piece| {
                let diff = position.pieces(us, piece).popcount() as i32
                    - position.pieces(them, piece).popcount() as i32;
                diff * piece.value()
            })
            .sum();
        Ok(balance as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_is_side_relative() {
        assert_eq!(MaterialEvaluator.evaluate(&Position::new()).unwrap(), 0.0);

        // White is up a rook
        let white = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert_eq!(MaterialEvaluator.evaluate(&white).unwrap(), 5.0);
        let black = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 0 1").unwrap();
        assert_eq!(MaterialEvaluator.evaluate(&black).unwrap(), -5.0);
    }
}
