use super::super::attack_tables::PAWN_ATTACKS;
use super::super::{Bitboard, Color, Move, MoveList, MoveType, Piece, Position, Square, PROMOTION_PIECES};

impl Position {
    pub(crate) fn generate_pawn_moves(&self, from: Square, color: Color, moves: &mut MoveList) {
        let forward_rank = match color {
            Color::White => from.rank() + 1,
            Color::Black => from.rank().wrapping_sub(1),
        };
        // A pawn on its last rank cannot exist in a valid position
        if forward_rank > 7 {
            return;
        }
        let promotes = forward_rank == color.pawn_promotion_rank();

        let forward = Square::at(forward_rank, from.file());
        if !self.all_occupied.contains(forward) {
            if promotes {
                for piece in PROMOTION_PIECES {
                    moves.push(Move::promotion_move(from, forward, false, piece));
                }
            } else {
                moves.push(Move::simple(from, forward, MoveType::Normal));
                if from.rank() == color.pawn_start_rank() {
                    let double_rank = match color {
                        Color::White => forward_rank + 1,
                        Color::Black => forward_rank - 1,
                    };
                    let double = Square::at(double_rank, from.file());
                    if !self.all_occupied.contains(double) {
                        moves.push(Move::simple(from, double, MoveType::DoublePawnAdvance));
                    }
                }
            }
        }

        let them = color.opponent();
        let capturable = self.occupied[them.index()].0 & !self.pieces[them.index()][Piece::King.index()].0;
        let attacks = PAWN_ATTACKS[color.index()][from.index()];
        for to in Bitboard(attacks & capturable).iter() {
            if promotes {
                for piece in PROMOTION_PIECES {
                    moves.push(Move::promotion_move(from, to, true, piece));
                }
            } else {
                moves.push(Move::simple(from, to, MoveType::Attack));
            }
        }

        // Only the side to move may capture en passant, and only a pawn that just advanced two
        if let Some(ep) = self.en_passant.filter(|_| color == self.side_to_move) {
            let victim = Square::at(from.rank(), ep.file());
            if attacks & ep.bit() != 0 && self.pieces[them.index()][Piece::Pawn.index()].contains(victim) {
                moves.push(Move::simple(from, ep, MoveType::EnPassant));
            }
        }
    }
}
