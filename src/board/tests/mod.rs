//! Position and move generation tests.
//!
//! Tests are organized into separate files by category:
//! - `perft.rs` - Move generation node counts
//! - `make_unmake.rs` - Apply/undo correctness and the scoped move guard
//! - `edge_cases.rs` - Special positions and error paths
//! - `proptest.rs` - Property-based tests over random playouts

mod proptest;

use crate::board::{Move, Piece, Position, Square};

/// Find the legal move from `from` to `to`, panicking when it is absent.
pub(super) fn find_move(position: &mut Position, from: &str, to: &str, promotion: Option<Piece>) -> Move {
    let from = Square::parse(from).expect("valid square");
    let to = Square::parse(to).expect("valid square");
    position
        .generate_legal_moves()
        .expect("position has a king")
        .iter()
        .copied()
        .find(|m| m.from() == from && m.to() == to && m.promotion() == promotion)
        .unwrap_or_else(|| panic!("expected move {from}{to} not found"))
}
