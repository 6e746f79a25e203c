//! Principal variation storage and search results.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::{Move, EMPTY_MOVE};

use super::constants::{is_mate_score, MAX_DEPTH};

/// Triangular PV storage: row `p` holds the best line found from ply `p`.
pub type PvTable = [[Move; MAX_DEPTH]; MAX_DEPTH];

pub(crate) fn empty_pv_table() -> Box<PvTable> {
    Box::new([[EMPTY_MOVE; MAX_DEPTH]; MAX_DEPTH])
}

/// Working PV rows for one traversal.
pub(crate) struct PrincipalVariation {
    table: Box<PvTable>,
    length: [usize; MAX_DEPTH + 1],
}

impl PrincipalVariation {
    pub fn new() -> Self {
        PrincipalVariation {
            table: empty_pv_table(),
            length: [0; MAX_DEPTH + 1],
        }
    }

    #[inline]
    pub fn clear(&mut self, ply: usize) {
        if let Some(len) = self.length.get_mut(ply) {
            *len = 0;
        }
    }

    /// Single-move line, used when a cached exact score ends the node
    pub fn set_single(&mut self, ply: usize, mv: Move) {
        if ply < MAX_DEPTH {
            self.table[ply][0] = mv;
            self.length[ply] = 1;
        }
    }

    /// `row[ply] = [mv] ++ row[ply + 1]`, truncated at `MAX_DEPTH`
    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_DEPTH {
            return;
        }
        let child_len = if ply + 1 < MAX_DEPTH {
            self.length[ply + 1].min(MAX_DEPTH - 1)
        } else {
            0
        };
        let (head, tail) = self.table.split_at_mut(ply + 1);
        let row = &mut head[ply];
        row[0] = mv;
        if child_len > 0 {
            row[1..=child_len].copy_from_slice(&tail[0][..child_len]);
        }
        self.length[ply] = 1 + child_len;
    }

    #[must_use]
    pub fn root_len(&self) -> usize {
        self.length[0]
    }

    /// Snapshot with only row 0 populated
    pub fn root_table(&self) -> Box<PvTable> {
        let mut table = empty_pv_table();
        let len = self.length[0];
        table[0][..len].copy_from_slice(&self.table[0][..len]);
        table
    }
}

/// Counters collected over one search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchStats {
    pub nodes: u64,
    /// Evaluator calls
    pub evaluations: u64,
    pub tt_hits: u64,
    /// Nodes ended by a cached score or bound
    pub tt_cutoffs: u64,
    pub beta_cutoffs: u64,
    /// Root re-searches after an aspiration failure
    pub researches: u64,
    /// Full-window re-searches after a zero-window search beat alpha
    pub pvs_researches: u64,
    /// Reduced searches run to find a first move at PV nodes
    pub iid_searches: u64,
    pub elapsed: Duration,
}

/// Outcome of the deepest completed iteration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchResult {
    /// `None` when the root has no legal moves
    pub best_move: Option<Move>,
    /// Score in pawns from the root side to move's perspective
    pub score: f32,
    pub depth: usize,
    pub pv_table: Box<PvTable>,
    pub pv_length: usize,
    pub stats: SearchStats,
}

impl SearchResult {
    /// The principal variation, starting with the best move
    #[must_use]
    pub fn pv(&self) -> &[Move] {
        &self.pv_table[0][..self.pv_length]
    }

    #[must_use]
    pub fn is_mate(&self) -> bool {
        is_mate_score(self.score)
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.best_move {
            Some(mv) => write!(f, "bestmove {mv}")?,
            None => write!(f, "bestmove (none)")?,
        }
        write!(f, " score {:.2} depth {} pv", self.score, self.depth)?;
        for mv in self.pv() {
            write!(f, " {mv}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MoveType, Square};

    fn mv(from: Square, to: Square) -> Move {
        Move::simple(from, to, MoveType::Normal)
    }

    #[test]
    fn test_update_prepends_child_line() {
        let mut pv = PrincipalVariation::new();
        let a = mv(Square::E1, Square::G1);
        let b = mv(Square::G1, Square::E1);
        let c = mv(Square::E1, Square::C1);

        pv.update(2, c);
        pv.update(1, b);
        pv.update(0, a);
        assert_eq!(pv.root_len(), 3);
        let table = pv.root_table();
        assert_eq!(&table[0][..3], &[a, b, c]);
        assert!(table[1].iter().all(|m| m.is_null()));
    }

    #[test]
    fn test_cleared_child_gives_single_move() {
        let mut pv = PrincipalVariation::new();
        let a = mv(Square::E1, Square::G1);
        pv.update(1, a);
        pv.clear(1);
        pv.update(0, a);
        assert_eq!(pv.root_len(), 1);
    }

    #[test]
    fn test_length_is_capped() {
        let mut pv = PrincipalVariation::new();
        let a = mv(Square::E1, Square::G1);
        for ply in (0..MAX_DEPTH).rev() {
            pv.update(ply, a);
        }
        assert_eq!(pv.root_len(), MAX_DEPTH);
        // Out of range plies are ignored
        pv.update(MAX_DEPTH, a);
        pv.set_single(MAX_DEPTH, a);
    }
}
