//! Move ordering heuristics for the search.

use crate::board::{Move, MoveType, Piece, Position, EMPTY_MOVE};

use super::constants::{
    HISTORY_MAX, KILLER1_SCORE, KILLER2_SCORE, MAX_DEPTH, TACTICAL_SCORE, TT_MOVE_SCORE,
};

const VICTIM_WEIGHT: i32 = 128;

/// Quiet moves that caused a beta cutoff, two per ply.
pub(crate) struct KillerTable {
    slots: [[Move; 2]; MAX_DEPTH + 1],
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KillerTable {
    #[must_use]
    pub fn new() -> Self {
        KillerTable {
            slots: [[EMPTY_MOVE; 2]; MAX_DEPTH + 1],
        }
    }

    #[must_use]
    pub fn primary(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(EMPTY_MOVE, |row| row[0])
    }

    #[must_use]
    pub fn secondary(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(EMPTY_MOVE, |row| row[1])
    }

    pub fn update(&mut self, ply: usize, mv: Move) {
        let Some(row) = self.slots.get_mut(ply) else {
            return;
        };
        if row[0] != mv {
            row[1] = row[0];
            row[0] = mv;
        }
    }
}

/// Butterfly history indexed by from/to square.
pub(crate) struct HistoryTable {
    entries: [i32; 4096],
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryTable {
    #[must_use]
    pub fn new() -> Self {
        HistoryTable { entries: [0; 4096] }
    }

    fn index(mv: Move) -> usize {
        mv.from().index() * 64 + mv.to().index()
    }

    #[must_use]
    pub fn score(&self, mv: Move) -> i32 {
        self.entries[Self::index(mv)]
    }

    /// Reward a quiet move that caused a beta cutoff at `depth` remaining plies
    pub fn update(&mut self, mv: Move, depth: usize) {
        let bonus = i32::try_from(depth * depth).unwrap_or(i32::MAX);
        let entry = &mut self.entries[Self::index(mv)];
        *entry = entry.saturating_add(bonus);
    }
}

/// Most-valuable-victim, least-valuable-attacker score for tactical moves.
///
/// Promotions count the promoted piece as an extra victim.
pub(crate) fn mvv_lva(position: &Position, mv: Move) -> i32 {
    let attacker = position.piece_at(mv.from()).map_or(Piece::Pawn, |(_, piece)| piece);
    let victim = match mv.move_type() {
        MoveType::EnPassant => Piece::Pawn.value(),
        MoveType::Attack | MoveType::PromotionAttack => {
            position.piece_at(mv.to()).map_or(0, |(_, piece)| piece.value())
        }
        MoveType::Normal
        | MoveType::DoublePawnAdvance
        | MoveType::Promotion
        | MoveType::KingSideCastle
        | MoveType::QueenSideCastle => 0,
    };
    let promoted = mv.promotion().map_or(0, Piece::value);
    (victim + promoted) * VICTIM_WEIGHT - attacker.value()
}

/// Ordering score for `mv` at `ply`; higher is searched first.
pub(crate) fn score_move(
    position: &Position,
    mv: Move,
    tt_move: Option<Move>,
    ply: usize,
    killers: &KillerTable,
    history: &HistoryTable,
) -> i32 {
    if tt_move == Some(mv) {
        TT_MOVE_SCORE
    } else if mv.is_tactical() {
        TACTICAL_SCORE + mvv_lva(position, mv)
    } else if killers.primary(ply) == mv {
        KILLER1_SCORE
    } else if killers.secondary(ply) == mv {
        KILLER2_SCORE
    } else {
        history.score(mv).min(HISTORY_MAX)
    }
}
