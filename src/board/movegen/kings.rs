use super::super::attack_tables::KING_ATTACKS;
use super::super::{Color, Move, MoveList, MoveType, Piece, Position, Square};
use super::push_targets;

impl Position {
    /// King steps plus castles whose right is held and whose path is clear.
    ///
    /// Attacked-square conditions are checked by the legal filter.
    pub(crate) fn generate_king_moves(
        &self,
        from: Square,
        color: Color,
        targets: u64,
        enemy: u64,
        moves: &mut MoveList,
    ) {
        push_targets(from, KING_ATTACKS[from.index()] & targets, enemy, moves);

        let back_rank = color.back_rank();
        if from != Square::at(back_rank, 4) {
            return;
        }
        let empty = |file: u8| !self.all_occupied.contains(Square::at(back_rank, file));
        let rook_on = |file: u8| self.piece_at(Square::at(back_rank, file)) == Some((color, Piece::Rook));

        if self.castling.has(color, true) && empty(5) && empty(6) && rook_on(7) {
            moves.push(Move::simple(from, Square::at(back_rank, 6), MoveType::KingSideCastle));
        }
        if self.castling.has(color, false) && empty(1) && empty(2) && empty(3) && rook_on(0) {
            moves.push(Move::simple(from, Square::at(back_rank, 2), MoveType::QueenSideCastle));
        }
    }
}
