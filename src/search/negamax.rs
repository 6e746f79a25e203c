//! Negamax alpha-beta over one mutable position.

use crate::board::{Move, Position, ScoredMove, ScoredMoveList};
use crate::error::{EngineError, Result};
use crate::evaluation::Evaluator;
use crate::tt::{NodeType, TTEntry, TranspositionTable};

use super::constants::{
    DRAW_SCORE, IID_MIN_DEPTH, IID_REDUCTION, INFINITY_SCORE, MATE_SCORE, MAX_EVAL_SCORE, NULL_WINDOW,
};
use super::move_order::{score_move, HistoryTable, KillerTable};
use super::pv::{PrincipalVariation, SearchStats};

/// Score of a node with no legal moves: mated (biased so faster mates score higher
/// for the winner) or stalemate.
pub(crate) fn terminal_score(position: &Position, depth: usize) -> Result<f32> {
    if position.is_in_check(position.side_to_move())? {
        Ok(-(MATE_SCORE + depth as f32))
    } else {
        Ok(DRAW_SCORE)
    }
}

/// Per-search state threaded through the recursion.
///
/// Killers, history and the PV are fresh for every search; the transposition table
/// is the only state that outlives it.
pub(crate) struct SearchContext<'a, E: Evaluator> {
    evaluator: &'a E,
    tt: &'a TranspositionTable,
    killers: KillerTable,
    history: HistoryTable,
    pub(crate) pv: PrincipalVariation,
    pub(crate) stats: SearchStats,
}

impl<'a, E: Evaluator> SearchContext<'a, E> {
    pub fn new(evaluator: &'a E, tt: &'a TranspositionTable) -> Self {
        SearchContext {
            evaluator,
            tt,
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            pv: PrincipalVariation::new(),
            stats: SearchStats::default(),
        }
    }

    /// Search `position` to `depth` remaining plies inside `(alpha, beta)`.
    ///
    /// The position is restored on every return, including errors.
    pub fn negamax(
        &mut self,
        position: &mut Position,
        depth: usize,
        ply: usize,
        mut alpha: f32,
        mut beta: f32,
    ) -> Result<f32> {
        self.stats.nodes += 1;
        self.pv.clear(ply);
        // Zero-window children are never on the principal variation
        let pv_node = beta - alpha > 2.0 * NULL_WINDOW;

        if ply > 0 && position.is_fifty_move_draw() {
            // Mate on the move that reaches the limit still counts as mate
            if position.generate_legal_moves()?.is_empty() {
                return terminal_score(position, depth);
            }
            return Ok(DRAW_SCORE);
        }

        let hash = position.hash();
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(hash) {
            self.stats.tt_hits += 1;
            tt_move = entry.best_move;
            // Never cut at the root: the caller needs a move and a line
            if ply > 0 && usize::from(entry.depth) >= depth {
                match entry.node_type {
                    NodeType::Exact => {
                        match entry.best_move {
                            Some(mv) if depth > 0 => self.pv.set_single(ply, mv),
                            _ => {}
                        }
                        self.stats.tt_cutoffs += 1;
                        return Ok(entry.evaluation);
                    }
                    NodeType::LowerBound => alpha = alpha.max(entry.evaluation),
                    NodeType::UpperBound => beta = beta.min(entry.evaluation),
                }
                if alpha >= beta {
                    self.stats.tt_cutoffs += 1;
                    return Ok(entry.evaluation);
                }
            }
        }

        let moves = position.generate_legal_moves()?;
        if moves.is_empty() {
            return terminal_score(position, depth);
        }

        if depth == 0 {
            let score = self.evaluate(position)?;
            self.tt.store(TTEntry {
                key: hash,
                depth: 0,
                evaluation: score,
                best_move: None,
                node_type: NodeType::Exact,
            });
            return Ok(score);
        }

        if pv_node && tt_move.is_none() && depth >= IID_MIN_DEPTH {
            tt_move = self.internal_iterative_deepening(position, depth, ply)?;
        }

        // Window actually searched, after any cached bounds narrowed it
        let (window_alpha, window_beta) = (alpha, beta);

        let mut ordered = ScoredMoveList::new();
        for &mv in moves.iter() {
            let score = score_move(position, mv, tt_move, ply, &self.killers, &self.history);
            ordered.push(mv, score);
        }

        let mut best_score = f32::NEG_INFINITY;
        let mut best_move: Option<Move> = None;
        let mut index = 0;
        while let Some(ScoredMove { mv, .. }) = ordered.pick_best(index) {
            let score = {
                let mut child = position.scoped(&mv)?;
                if index == 0 {
                    -self.negamax(&mut child, depth - 1, ply + 1, -beta, -alpha)?
                } else {
                    // Prove the move is no better than alpha, re-search only if it is
                    let null_beta = (alpha + NULL_WINDOW).min(beta);
                    let scout = -self.negamax(&mut child, depth - 1, ply + 1, -null_beta, -alpha)?;
                    if scout > alpha && scout < beta && null_beta < beta {
                        self.stats.pvs_researches += 1;
                        -self.negamax(&mut child, depth - 1, ply + 1, -beta, -alpha)?
                    } else {
                        scout
                    }
                }
            };
            index += 1;

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
                if score > alpha {
                    alpha = score;
                    self.pv.update(ply, mv);
                }
            }

            if alpha >= beta {
                self.stats.beta_cutoffs += 1;
                if !mv.is_tactical() {
                    self.killers.update(ply, mv);
                    self.history.update(mv, depth);
                }
                break;
            }
        }

        let node_type = if best_score <= window_alpha {
            NodeType::UpperBound
        } else if best_score >= window_beta {
            NodeType::LowerBound
        } else {
            NodeType::Exact
        };
        self.tt.store(TTEntry {
            key: hash,
            depth: u8::try_from(depth).unwrap_or(u8::MAX),
            evaluation: best_score,
            // A fail-low node has no trustworthy best move
            best_move: if node_type == NodeType::UpperBound {
                tt_move
            } else {
                best_move
            },
            node_type,
        });

        Ok(best_score)
    }

    /// Horizon evaluation. Non-finite output is an inference failure; finite output is
    /// clamped below the mate band so it can never pass for a forced mate.
    fn evaluate(&mut self, position: &Position) -> Result<f32> {
        self.stats.evaluations += 1;
        let score = self.evaluator.evaluate(position)?;
        if !score.is_finite() {
            return Err(EngineError::FailedInference {
                reason: format!("evaluator returned non-finite score {score}"),
            });
        }
        Ok(score.clamp(-MAX_EVAL_SCORE, MAX_EVAL_SCORE))
    }

    /// Reduced-depth full-window search to find a move to try first when the table
    /// has none for this node.
    fn internal_iterative_deepening(
        &mut self,
        position: &mut Position,
        depth: usize,
        ply: usize,
    ) -> Result<Option<Move>> {
        self.stats.iid_searches += 1;
        self.negamax(
            position,
            depth - IID_REDUCTION,
            ply,
            -INFINITY_SCORE,
            INFINITY_SCORE,
        )?;
        // The reduced search wrote its own line into this ply's row
        self.pv.clear(ply);
        Ok(self.tt.probe(position.hash()).and_then(|entry| entry.best_move))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::MaterialEvaluator;

    #[test]
    fn test_finds_free_queen() {
        let mut position = Position::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let before = position.clone();
        let tt = TranspositionTable::new(1 << 12);
        let mut ctx = SearchContext::new(&MaterialEvaluator, &tt);

        let score = ctx
            .negamax(&mut position, 2, 0, -INFINITY_SCORE, INFINITY_SCORE)
            .unwrap();
        // Pawn takes queen; only the pawn is left on the board
        assert_eq!(score, 1.0);
        assert_eq!(ctx.pv.root_len(), 2);
        assert_eq!(ctx.pv.root_table()[0][0].to_string(), "e4d5");
        assert_eq!(position, before);
    }

    #[test]
    fn test_terminal_scores() {
        let mut mated = Position::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        assert_eq!(terminal_score(&mated, 3).unwrap(), -(MATE_SCORE + 3.0));

        let tt = TranspositionTable::new(16);
        let mut ctx = SearchContext::new(&MaterialEvaluator, &tt);
        let score = ctx
            .negamax(&mut mated, 2, 0, -INFINITY_SCORE, INFINITY_SCORE)
            .unwrap();
        assert_eq!(score, -(MATE_SCORE + 2.0));
        assert_eq!(ctx.pv.root_len(), 0);

        let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(terminal_score(&stalemate, 4).unwrap(), DRAW_SCORE);
    }

    #[test]
    fn test_fifty_move_rule_scores_draw_below_root() {
        // White is a queen up but every line is already past the fifty-move limit
        let mut position = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 100 80").unwrap();
        let tt = TranspositionTable::new(1 << 10);
        let mut ctx = SearchContext::new(&MaterialEvaluator, &tt);
        let score = ctx
            .negamax(&mut position, 2, 0, -INFINITY_SCORE, INFINITY_SCORE)
            .unwrap();
        assert_eq!(score, DRAW_SCORE);
    }

    #[test]
    fn test_cutoff_nodes_store_bounds() {
        let mut position = Position::new();
        let tt = TranspositionTable::new(1 << 14);
        let mut ctx = SearchContext::new(&MaterialEvaluator, &tt);
        // A window the true score (0) lies above forces a fail high at the root
        let score = ctx.negamax(&mut position, 2, 0, -2.0, -1.0).unwrap();
        assert!(score >= -1.0);
        let entry = tt.probe(position.hash()).unwrap();
        assert_eq!(entry.node_type, NodeType::LowerBound);
        assert_eq!(entry.depth, 2);
    }

    #[test]
    fn test_mate_on_fifty_move_limit_is_still_mate() {
        // Qe8 is mate and brings the halfmove clock to 100
        let mut position = Position::from_fen("6k1/5ppp/8/8/8/8/8/4Q2K w - - 99 80").unwrap();
        let tt = TranspositionTable::new(1 << 10);
        let mut ctx = SearchContext::new(&MaterialEvaluator, &tt);
        let score = ctx
            .negamax(&mut position, 1, 0, -INFINITY_SCORE, INFINITY_SCORE)
            .unwrap();
        assert_eq!(score, MATE_SCORE);
        assert_eq!(ctx.pv.root_table()[0][0].to_string(), "e1e8");
    }

    const HANGING_ROOK: &str = "4k3/8/8/3r4/8/8/3Q4/4K3 w - - 0 1";

    /// Depth-2 root search of the hanging rook position against `tt`
    fn search_hanging_rook(tt: &TranspositionTable) -> (f32, Move) {
        let mut position = Position::from_fen(HANGING_ROOK).unwrap();
        let mut ctx = SearchContext::new(&MaterialEvaluator, tt);
        let score = ctx
            .negamax(&mut position, 2, 0, -INFINITY_SCORE, INFINITY_SCORE)
            .unwrap();
        (score, ctx.pv.root_table()[0][0])
    }

    /// Hash of the position after the queen takes the rook
    fn capture_child_hash() -> u64 {
        let mut position = Position::from_fen(HANGING_ROOK).unwrap();
        let capture = position.parse_move("d2d5").unwrap();
        let _undo = position.apply_move(&capture).unwrap();
        position.hash()
    }

    #[test]
    fn test_shallow_entry_is_ignored() {
        let (cold_score, cold_move) = search_hanging_rook(&TranspositionTable::new(1 << 12));
        assert_eq!(cold_score, 9.0);
        assert_eq!(cold_move.to_string(), "d2d5");

        // Exact but searched to depth 0; the child needs depth 1
        let tt = TranspositionTable::new(1 << 12);
        tt.store(TTEntry {
            key: capture_child_hash(),
            depth: 0,
            evaluation: 50.0,
            best_move: None,
            node_type: NodeType::Exact,
        });
        assert_eq!(search_hanging_rook(&tt), (cold_score, cold_move));
    }

    #[test]
    fn test_bound_entry_only_narrows_the_window() {
        let (cold_score, cold_move) = search_hanging_rook(&TranspositionTable::new(1 << 12));

        // A deep, loose lower bound for black (true score is -9)
        let tt = TranspositionTable::new(1 << 12);
        tt.store(TTEntry {
            key: capture_child_hash(),
            depth: 10,
            evaluation: -20.0,
            best_move: None,
            node_type: NodeType::LowerBound,
        });
        let (score, mv) = search_hanging_rook(&tt);
        assert_ne!(score, 20.0);
        assert_eq!((score, mv), (cold_score, cold_move));
    }

    #[test]
    fn test_upper_bound_below_window_prunes() {
        let mut position = Position::from_fen(HANGING_ROOK).unwrap();
        let tt = TranspositionTable::new(1 << 12);
        tt.store(TTEntry {
            key: position.hash(),
            depth: 5,
            evaluation: -3.0,
            best_move: None,
            node_type: NodeType::UpperBound,
        });
        let mut ctx = SearchContext::new(&MaterialEvaluator, &tt);
        // Below the root the bound closes the window (-1, 1) without searching
        let score = ctx.negamax(&mut position, 3, 1, -1.0, 1.0).unwrap();
        assert_eq!(score, -3.0);
        assert_eq!(ctx.stats.tt_cutoffs, 1);
        assert_eq!(ctx.stats.nodes, 1);
    }

    #[test]
    fn test_zero_window_search_matches_full_window_score() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let mut position = Position::from_fen(fen).unwrap();
        let tt = TranspositionTable::new(1 << 14);
        let mut ctx = SearchContext::new(&MaterialEvaluator, &tt);
        let score = ctx
            .negamax(&mut position, 3, 0, -INFINITY_SCORE, INFINITY_SCORE)
            .unwrap();

        // Fail-soft: a zero window just under the score fails high, just above fails low
        let tt_low = TranspositionTable::new(1 << 14);
        let mut low = SearchContext::new(&MaterialEvaluator, &tt_low);
        assert!(low.negamax(&mut position, 3, 0, score - NULL_WINDOW, score).unwrap() >= score);
        let tt_high = TranspositionTable::new(1 << 14);
        let mut high = SearchContext::new(&MaterialEvaluator, &tt_high);
        assert!(high.negamax(&mut position, 3, 0, score, score + NULL_WINDOW).unwrap() <= score);
        assert_eq!(position, Position::from_fen(fen).unwrap());
    }

    #[test]
    fn test_internal_iterative_deepening_at_deep_pv_nodes() {
        let mut position = Position::from_fen(HANGING_ROOK).unwrap();
        let tt = TranspositionTable::new(1 << 14);
        let mut ctx = SearchContext::new(&MaterialEvaluator, &tt);
        let score = ctx
            .negamax(&mut position, 4, 0, -INFINITY_SCORE, INFINITY_SCORE)
            .unwrap();
        assert!(ctx.stats.iid_searches >= 1);
        assert_eq!(score, 9.0);
        assert_eq!(ctx.pv.root_table()[0][0].to_string(), "d2d5");
        assert!(ctx.pv.root_len() >= 1);
    }

    #[test]
    fn test_evaluator_output_is_validated() {
        struct Fixed(f32);
        impl Evaluator for Fixed {
            fn evaluate(&self, _position: &Position) -> Result<f32> {
                Ok(self.0)
            }
        }

        let (nan, huge) = (Fixed(f32::NAN), Fixed(25_000.0));
        let mut position = Position::new();
        let tt = TranspositionTable::new(1 << 10);
        let mut ctx = SearchContext::new(&nan, &tt);
        let err = ctx
            .negamax(&mut position, 1, 0, -INFINITY_SCORE, INFINITY_SCORE)
            .unwrap_err();
        assert_eq!(err.code(), "failed_inference");
        assert_eq!(position, Position::new());

        let tt = TranspositionTable::new(1 << 10);
        let mut ctx = SearchContext::new(&huge, &tt);
        let score = ctx
            .negamax(&mut position, 1, 0, -INFINITY_SCORE, INFINITY_SCORE)
            .unwrap();
        assert_eq!(score, -MAX_EVAL_SCORE);
        assert_eq!(ctx.pv.root_len(), 1);
    }
}
