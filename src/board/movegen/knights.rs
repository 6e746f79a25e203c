use super::super::attack_tables::KNIGHT_ATTACKS;
use super::super::{MoveList, Position, Square};
use super::push_targets;

impl Position {
    pub(crate) fn generate_knight_moves(&self, from: Square, targets: u64, enemy: u64, moves: &mut MoveList) {
        push_targets(from, KNIGHT_ATTACKS[from.index()] & targets, enemy, moves);
    }
}
