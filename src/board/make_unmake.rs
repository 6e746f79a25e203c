use std::ops::{Deref, DerefMut};

use crate::error::{EngineError, Result};
use crate::zobrist::ZOBRIST;

use super::{Color, Move, MoveType, Piece, Position, Square, UndoInfo};

/// King and rook squares for a castle of `color` on one side
struct CastleSquares {
    king_from: Square,
    king_to: Square,
    rook_from: Square,
    rook_to: Square,
}

#[inline]
fn castle_squares(color: Color, kingside: bool) -> CastleSquares {
    let rank = color.back_rank();
    let (king_to, rook_from, rook_to) = if kingside { (6, 7, 5) } else { (2, 0, 3) };
    CastleSquares {
        king_from: Square::at(rank, 4),
        king_to: Square::at(rank, king_to),
        rook_from: Square::at(rank, rook_from),
        rook_to: Square::at(rank, rook_to),
    }
}

/// Square of the pawn removed by an en passant capture landing on `to`
#[inline]
fn en_passant_victim(color: Color, to: Square) -> Square {
    match color {
        Color::White => Square::at(to.rank().wrapping_sub(1) & 7, to.file()),
        Color::Black => Square::at((to.rank() + 1) & 7, to.file()),
    }
}

impl Position {
    /// Checks that `mv` is structurally applicable and returns the moving and captured pieces.
    ///
    /// Runs before any mutation so a rejected move leaves the position untouched.
    fn validate_move(&self, mv: &Move) -> Result<(Piece, Option<Piece>)> {
        let color = self.side_to_move;
        let from = mv.from();
        let to = mv.to();
        let moving = match self.piece_at(from) {
            Some((c, piece)) if c == color => piece,
            _ => return Err(EngineError::empty_square(from)),
        };
        let target = self.piece_at(to);

        let captured = match mv.move_type() {
            MoveType::Normal | MoveType::DoublePawnAdvance | MoveType::Promotion => {
                if target.is_some() {
                    return Err(EngineError::invalid_position(format!(
                        "quiet move {mv} lands on occupied square {to}"
                    )));
                }
                None
            }
            MoveType::Attack | MoveType::PromotionAttack => match target {
                Some((c, piece)) if c != color && piece != Piece::King => Some(piece),
                Some((_, Piece::King)) => {
                    return Err(EngineError::invalid_position(format!(
                        "capture {mv} targets a king"
                    )))
                }
                Some(_) => {
                    return Err(EngineError::invalid_position(format!(
                        "capture {mv} targets a friendly piece"
                    )))
                }
                None => {
                    return Err(EngineError::invalid_position(format!(
                        "capture {mv} targets empty square {to}"
                    )))
                }
            },
            MoveType::EnPassant => {
                let victim = en_passant_victim(color, to);
                if moving != Piece::Pawn
                    || self.en_passant != Some(to)
                    || self.piece_at(victim) != Some((color.opponent(), Piece::Pawn))
                {
                    return Err(EngineError::invalid_position(format!(
                        "en passant {mv} does not match the current target"
                    )));
                }
                Some(Piece::Pawn)
            }
            MoveType::KingSideCastle | MoveType::QueenSideCastle => {
                let kingside = mv.move_type() == MoveType::KingSideCastle;
                let squares = castle_squares(color, kingside);
                if moving != Piece::King
                    || from != squares.king_from
                    || to != squares.king_to
                    || self.piece_at(squares.rook_from) != Some((color, Piece::Rook))
                    || target.is_some()
                    || self.piece_at(squares.rook_to).is_some()
                {
                    return Err(EngineError::invalid_position(format!(
                        "castle {mv} without king and rook in place"
                    )));
                }
                None
            }
        };

        if matches!(
            mv.move_type(),
            MoveType::DoublePawnAdvance | MoveType::Promotion | MoveType::PromotionAttack
        ) && moving != Piece::Pawn
        {
            return Err(EngineError::invalid_position(format!(
                "{mv} requires a pawn on {from}"
            )));
        }
        if mv.is_promotion() {
            match mv.promotion() {
                Some(piece) if piece.is_promotion_target() => {}
                piece => return Err(EngineError::InvalidPieceType { piece }),
            }
        }

        Ok((moving, captured))
    }

    /// Apply `mv` in place, updating bitboards, rights, clocks and the hash incrementally.
    ///
    /// Legality against check is not verified here; see [`Position::play_legal`].
    pub fn apply_move(&mut self, mv: &Move) -> Result<UndoInfo> {
        let (moving, captured) = self.validate_move(mv)?;
        let color = self.side_to_move;
        let them = color.opponent();
        let from = mv.from();
        let to = mv.to();

        let undo = UndoInfo {
            mv: *mv,
            moved_piece: moving,
            captured,
            previous_en_passant: self.en_passant,
            previous_castling: self.castling,
            previous_hash: self.hash,
            previous_halfmove_clock: self.halfmove_clock,
            previous_fullmove_number: self.fullmove_number,
        };

        let mut hash = self.hash ^ ZOBRIST.black_to_move_key;
        if let Some(ep) = self.en_passant.take() {
            hash ^= ZOBRIST.en_passant(ep);
        }

        match mv.move_type() {
            MoveType::Normal | MoveType::DoublePawnAdvance => {
                self.move_piece(color, moving, from, to, &mut hash);
                if mv.move_type() == MoveType::DoublePawnAdvance {
                    let ep = Square::at((from.rank() + to.rank()) / 2, from.file());
                    self.en_passant = Some(ep);
                    hash ^= ZOBRIST.en_passant(ep);
                }
            }
            MoveType::Attack => {
                if let Some(victim) = captured {
                    self.toggle_piece(to, them, victim, &mut hash);
                }
                self.move_piece(color, moving, from, to, &mut hash);
            }
            MoveType::EnPassant => {
                self.toggle_piece(en_passant_victim(color, to), them, Piece::Pawn, &mut hash);
                self.move_piece(color, moving, from, to, &mut hash);
            }
            MoveType::Promotion | MoveType::PromotionAttack => {
                if let Some(victim) = captured {
                    self.toggle_piece(to, them, victim, &mut hash);
                }
                let promoted = mv.promotion().unwrap_or(Piece::Queen);
                self.toggle_piece(from, color, Piece::Pawn, &mut hash);
                self.toggle_piece(to, color, promoted, &mut hash);
            }
            MoveType::KingSideCastle | MoveType::QueenSideCastle => {
                let squares = castle_squares(color, mv.move_type() == MoveType::KingSideCastle);
                self.move_piece(color, Piece::King, squares.king_from, squares.king_to, &mut hash);
                self.move_piece(color, Piece::Rook, squares.rook_from, squares.rook_to, &mut hash);
            }
        }

        let new_castling = self.castling.after_move(from, to);
        if new_castling != self.castling {
            hash ^= ZOBRIST.castling(self.castling) ^ ZOBRIST.castling(new_castling);
            self.castling = new_castling;
        }

        if moving == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if color == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = them;
        self.hash = hash;

        debug_assert_eq!(self.hash, self.compute_hash());
        Ok(undo)
    }

    /// Restore the exact position `undo` was produced from.
    pub fn undo_move(&mut self, undo: UndoInfo) {
        let color = self.side_to_move.opponent();
        let them = self.side_to_move;
        let mv = undo.mv;
        let from = mv.from();
        let to = mv.to();
        // hash is restored wholesale below
        let mut scratch = 0u64;

        match mv.move_type() {
            MoveType::Normal | MoveType::DoublePawnAdvance => {
                self.move_piece(color, undo.moved_piece, to, from, &mut scratch);
            }
            MoveType::Attack => {
                self.move_piece(color, undo.moved_piece, to, from, &mut scratch);
                if let Some(victim) = undo.captured {
                    self.set_piece(to, them, victim);
                }
            }
            MoveType::EnPassant => {
                self.move_piece(color, Piece::Pawn, to, from, &mut scratch);
                self.set_piece(en_passant_victim(color, to), them, Piece::Pawn);
            }
            MoveType::Promotion | MoveType::PromotionAttack => {
                let promoted = mv.promotion().unwrap_or(Piece::Queen);
                self.remove_piece(to, color, promoted);
                self.set_piece(from, color, Piece::Pawn);
                if let Some(victim) = undo.captured {
                    self.set_piece(to, them, victim);
                }
            }
            MoveType::KingSideCastle | MoveType::QueenSideCastle => {
                let squares = castle_squares(color, mv.move_type() == MoveType::KingSideCastle);
                self.move_piece(color, Piece::King, squares.king_to, squares.king_from, &mut scratch);
                self.move_piece(color, Piece::Rook, squares.rook_to, squares.rook_from, &mut scratch);
            }
        }

        self.side_to_move = color;
        self.en_passant = undo.previous_en_passant;
        self.castling = undo.previous_castling;
        self.hash = undo.previous_hash;
        self.halfmove_clock = undo.previous_halfmove_clock;
        self.fullmove_number = undo.previous_fullmove_number;
    }

    /// Apply `mv` only if it is in the current legal move set.
    pub fn play_legal(&mut self, mv: &Move) -> Result<UndoInfo> {
        if !self.generate_legal_moves()?.contains(*mv) {
            return Err(EngineError::InvalidMove { mv: *mv });
        }
        self.apply_move(mv)
    }

    /// Apply `mv` and return a guard that undoes it when dropped.
    pub fn scoped(&mut self, mv: &Move) -> Result<ScopedMove<'_>> {
        let undo = self.apply_move(mv)?;
        Ok(ScopedMove {
            position: self,
            undo: Some(undo),
        })
    }

    /// Like [`Position::scoped`], but rejects moves outside the legal move set.
    pub fn scoped_legal(&mut self, mv: &Move) -> Result<ScopedMove<'_>> {
        let undo = self.play_legal(mv)?;
        Ok(ScopedMove {
            position: self,
            undo: Some(undo),
        })
    }

    #[inline]
    fn toggle_piece(&mut self, sq: Square, color: Color, piece: Piece, hash: &mut u64) {
        if self.pieces[color.index()][piece.index()].contains(sq) {
            self.remove_piece(sq, color, piece);
        } else {
            self.set_piece(sq, color, piece);
        }
        *hash ^= ZOBRIST.piece(color, piece, sq);
    }

    #[inline]
    fn move_piece(&mut self, color: Color, piece: Piece, from: Square, to: Square, hash: &mut u64) {
        self.remove_piece(from, color, piece);
        self.set_piece(to, color, piece);
        *hash ^= ZOBRIST.piece(color, piece, from) ^ ZOBRIST.piece(color, piece, to);
    }
}

/// An applied move that is undone when the guard goes out of scope.
///
/// Dereferences to the position so the search can recurse through it; every exit path
/// (normal return, cutoff, `?` propagation) restores the parent position.
pub struct ScopedMove<'a> {
    position: &'a mut Position,
    undo: Option<UndoInfo>,
}

impl ScopedMove<'_> {
    /// The move held by this guard
    #[must_use]
    pub fn mv(&self) -> Move {
        self.undo.as_ref().map_or(Move::null(), UndoInfo::mv)
    }
}

impl Deref for ScopedMove<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}

impl DerefMut for ScopedMove<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.position
    }
}

impl Drop for ScopedMove<'_> {
    fn drop(&mut self) {
        if let Some(undo) = self.undo.take() {
            self.position.undo_move(undo);
        }
    }
}
