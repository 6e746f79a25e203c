use super::super::attack_tables::{bishop_attacks, queen_attacks, rook_attacks};
use super::super::{MoveList, Piece, Position, Square};
use super::push_targets;

impl Position {
    /// Bishop, rook or queen moves from `from`
    pub(crate) fn generate_slider_moves(
        &self,
        from: Square,
        slider: Piece,
        targets: u64,
        enemy: u64,
        moves: &mut MoveList,
    ) {
        let occupancy = self.all_occupied.0;
        let attacks = match slider {
            Piece::Bishop => bishop_attacks(from.index(), occupancy),
            Piece::Rook => rook_attacks(from.index(), occupancy),
            Piece::Queen => queen_attacks(from.index(), occupancy),
            Piece::Pawn | Piece::Knight | Piece::King => 0,
        };
        push_targets(from, attacks & targets, enemy, moves);
    }
}
