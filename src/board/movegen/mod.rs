mod kings;
mod knights;
mod pawns;
mod sliders;

use crate::error::{EngineError, Result};

use super::attack_tables::{bishop_attacks, rook_attacks, KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};
use super::{Bitboard, Color, Move, MoveList, MoveType, Piece, Position, Square};

impl Position {
    /// Moves for `color` that obey piece movement but may leave its own king in check.
    ///
    /// Squares holding the enemy king are never targeted.
    #[must_use]
    pub fn generate_pseudo_legal_moves(&self, color: Color) -> MoveList {
        let mut moves = MoveList::new();
        let c_idx = color.index();
        let targets = self.target_mask(color);
        let enemy = self.occupied[color.opponent().index()].0;

        for from in self.pieces[c_idx][Piece::Pawn.index()].iter() {
            self.generate_pawn_moves(from, color, &mut moves);
        }
        for from in self.pieces[c_idx][Piece::Knight.index()].iter() {
            self.generate_knight_moves(from, targets, enemy, &mut moves);
        }
        for piece in [Piece::Bishop, Piece::Rook, Piece::Queen] {
            for from in self.pieces[c_idx][piece.index()].iter() {
                self.generate_slider_moves(from, piece, targets, enemy, &mut moves);
            }
        }
        for from in self.pieces[c_idx][Piece::King.index()].iter() {
            self.generate_king_moves(from, color, targets, enemy, &mut moves);
        }
        moves
    }

    /// Legal moves for the side to move.
    ///
    /// Each pseudo-legal move is applied, tested for self-check and undone. Castles are
    /// also rejected when the king starts on, passes or lands on an attacked square.
    pub fn generate_legal_moves(&mut self) -> Result<MoveList> {
        let color = self.side_to_move;
        if self.find_king(color).is_none() {
            return Err(EngineError::IllegalState {
                reason: format!("{color} to move has no king"),
            });
        }
        let opponent = color.opponent();
        let pseudo_moves = self.generate_pseudo_legal_moves(color);
        let mut legal_moves = MoveList::new();

        for &mv in pseudo_moves.iter() {
            if mv.is_castling() {
                let from = mv.from();
                let mid = Square::at(from.rank(), (from.file() + mv.to().file()) / 2);
                if self.is_square_attacked(from, opponent)
                    || self.is_square_attacked(mid, opponent)
                    || self.is_square_attacked(mv.to(), opponent)
                {
                    continue;
                }
            }

            let undo = self.apply_move(&mv)?;
            let in_check = self.is_in_check(color);
            self.undo_move(undo);
            if !in_check? {
                legal_moves.push(mv);
            }
        }
        Ok(legal_moves)
    }

    /// True if any piece of `attacker` attacks `square`
    #[must_use]
    pub fn is_square_attacked(&self, square: Square, attacker: Color) -> bool {
        let target = square.index();
        let c_idx = attacker.index();
        let pieces = &self.pieces[c_idx];

        // A pawn of `attacker` hits `square` iff a pawn of the other colour on `square` would hit it back
        if pieces[Piece::Pawn.index()].0 & PAWN_ATTACKS[attacker.opponent().index()][target] != 0 {
            return true;
        }
        if pieces[Piece::Knight.index()].0 & KNIGHT_ATTACKS[target] != 0 {
            return true;
        }
        if pieces[Piece::King.index()].0 & KING_ATTACKS[target] != 0 {
            return true;
        }

        let queens = pieces[Piece::Queen.index()].0;
        let rook_like = pieces[Piece::Rook.index()].0 | queens;
        let bishop_like = pieces[Piece::Bishop.index()].0 | queens;
        let occupancy = self.all_occupied.0;

        rook_attacks(target, occupancy) & rook_like != 0
            || bishop_attacks(target, occupancy) & bishop_like != 0
    }

    /// Whether `color`'s king is attacked; `KingNotFound` when it has no king.
    pub fn is_in_check(&self, color: Color) -> Result<bool> {
        let king = self
            .find_king(color)
            .ok_or(EngineError::KingNotFound { color })?;
        Ok(self.is_square_attacked(king, color.opponent()))
    }

    pub fn is_checkmate(&mut self) -> Result<bool> {
        Ok(self.is_in_check(self.side_to_move)? && self.generate_legal_moves()?.is_empty())
    }

    pub fn is_stalemate(&mut self) -> Result<bool> {
        Ok(!self.is_in_check(self.side_to_move)? && self.generate_legal_moves()?.is_empty())
    }

    /// Count leaf nodes of the legal move tree to `depth`
    pub fn perft(&mut self, depth: usize) -> Result<u64> {
        if depth == 0 {
            return Ok(1);
        }

        let moves = self.generate_legal_moves()?;
        if depth == 1 {
            return Ok(moves.len() as u64);
        }

        let mut nodes = 0;
        for mv in moves.iter() {
            let mut child = self.scoped(mv)?;
            nodes += child.perft(depth - 1)?;
        }
        Ok(nodes)
    }

    /// Squares a non-pawn piece of `color` may move to: anything but its own men and the enemy king
    #[inline]
    fn target_mask(&self, color: Color) -> u64 {
        let enemy_king = self.pieces[color.opponent().index()][Piece::King.index()].0;
        !self.occupied[color.index()].0 & !enemy_king
    }
}

/// Push one move per set bit of `targets`, tagging captures of `enemy` pieces
#[inline]
fn push_targets(from: Square, targets: u64, enemy: u64, moves: &mut MoveList) {
    for to in Bitboard(targets).iter() {
        let move_type = if enemy & to.bit() != 0 {
            MoveType::Attack
        } else {
            MoveType::Normal
        };
        moves.push(Move::simple(from, to, move_type));
    }
}
