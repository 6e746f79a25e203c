use crate::zobrist::ZOBRIST;

use super::{Bitboard, CastlingRights, Color, Move, Piece, Square};

/// Everything `undo_move` needs to restore the position a move was applied to.
///
/// Returned by [`Position::apply_move`]; consumed by [`Position::undo_move`].
#[derive(Clone, Debug)]
#[must_use = "dropping undo info leaves the move applied with no way back"]
pub struct UndoInfo {
    pub(crate) mv: Move,
    pub(crate) moved_piece: Piece,
    pub(crate) captured: Option<Piece>,
    pub(crate) previous_en_passant: Option<Square>,
    pub(crate) previous_castling: CastlingRights,
    pub(crate) previous_hash: u64,
    pub(crate) previous_halfmove_clock: u32,
    pub(crate) previous_fullmove_number: u32,
}

impl UndoInfo {
    /// The move this token undoes
    #[must_use]
    pub fn mv(&self) -> Move {
        self.mv
    }

    /// Piece removed by the move, if any
    #[must_use]
    pub fn captured(&self) -> Option<Piece> {
        self.captured
    }
}

/// A chess position: bitboards plus the state that decides which moves are legal.
///
/// The Zobrist `hash` is maintained incrementally and always equals
/// [`Position::compute_hash`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) occupied: [Bitboard; 2],
    pub(crate) all_occupied: Bitboard,
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) hash: u64,
}

impl Position {
    /// Standard starting position
    #[must_use]
    pub fn new() -> Self {
        let mut position = Position::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in (0u8..).zip(back_rank) {
            position.set_piece(Square::at(0, file), Color::White, piece);
            position.set_piece(Square::at(7, file), Color::Black, piece);
            position.set_piece(Square::at(1, file), Color::White, Piece::Pawn);
            position.set_piece(Square::at(6, file), Color::Black, Piece::Pawn);
        }
        position.castling = CastlingRights::all();
        position.hash = position.compute_hash();
        position
    }

    pub(crate) fn empty() -> Self {
        Position {
            pieces: [[Bitboard::EMPTY; 6]; 2],
            occupied: [Bitboard::EMPTY; 2],
            all_occupied: Bitboard::EMPTY,
            side_to_move: Color::White,
            castling: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        }
    }

    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[must_use]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Bitboard of one piece type for one colour
    #[must_use]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    #[must_use]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupied[color.index()]
    }

    #[must_use]
    pub fn all_occupied(&self) -> Bitboard {
        self.all_occupied
    }

    /// Draw by the fifty-move rule (100 half-moves without capture or pawn move)
    #[must_use]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        if !self.all_occupied.contains(sq) {
            return None;
        }
        let color = if self.occupied[Color::White.index()].contains(sq) {
            Color::White
        } else {
            Color::Black
        };
        self.pieces[color.index()]
            .iter()
            .position(|bb| bb.contains(sq))
            .map(|idx| (color, Piece::from_index(idx)))
    }

    /// Place a piece on the bitboards; the hash is left to the caller.
    pub(crate) fn set_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let c_idx = color.index();
        self.pieces[c_idx][piece.index()].set(sq);
        self.occupied[c_idx].set(sq);
        self.all_occupied.set(sq);
    }

    pub(crate) fn remove_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let c_idx = color.index();
        self.pieces[c_idx][piece.index()].clear(sq);
        self.occupied[c_idx].clear(sq);
        self.all_occupied.clear(sq);
    }

    /// Square of `color`'s king, if it has one
    #[must_use]
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces[color.index()][Piece::King.index()].lsb()
    }

    /// Zobrist hash recomputed from scratch
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        let mut hash = 0u64;
        for color in Color::BOTH {
            for piece in Piece::ALL {
                for sq in self.pieces(color, piece).iter() {
                    hash ^= ZOBRIST.piece(color, piece, sq);
                }
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.black_to_move_key;
        }
        hash ^= ZOBRIST.castling(self.castling);
        if let Some(ep) = self.en_passant {
            hash ^= ZOBRIST.en_passant(ep);
        }
        hash
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}
