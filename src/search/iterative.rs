use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use crate::board::{Move, Position, UndoInfo};
use crate::error::{EngineError, Result};
use crate::evaluation::Evaluator;
use crate::tt::TranspositionTable;

use super::config::{EngineConfig, SearchLimits};
use super::constants::{is_mate_score, ASPIRATION_MAX, INFINITY_SCORE};
use super::negamax::{terminal_score, SearchContext};
use super::pv::{empty_pv_table, SearchResult};

/// Iterative-deepening alpha-beta search over a pluggable evaluator.
///
/// The transposition table lives as long as the engine and may be shared with other
/// engines; killers, history and the PV are rebuilt for every search.
pub struct SearchEngine<E: Evaluator> {
    evaluator: E,
    config: EngineConfig,
    table: Arc<TranspositionTable>,
}

impl<E: Evaluator> SearchEngine<E> {
    /// Build an engine with its own transposition table of `config.tt_entries` slots.
    pub fn new(evaluator: E, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let table = Arc::new(TranspositionTable::new(config.tt_entries));
        Ok(SearchEngine {
            evaluator,
            config,
            table,
        })
    }

    /// Build an engine that reads and writes an existing table.
    ///
    /// `config.tt_entries` is ignored in favour of the table's capacity.
    pub fn with_table(
        evaluator: E,
        config: EngineConfig,
        table: Arc<TranspositionTable>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(SearchEngine {
            evaluator,
            config,
            table,
        })
    }

    #[must_use]
    pub fn table(&self) -> &Arc<TranspositionTable> {
        &self.table
    }

    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Search to `max_depth` plies, clamped to `1..=config.max_depth`.
    pub fn search(&self, position: &mut Position, max_depth: usize) -> Result<SearchResult> {
        self.search_with_limits(position, SearchLimits::depth(max_depth))
    }

    /// Search with a depth bound and an optional deadline.
    ///
    /// On error the search is abandoned and the position is left as it was given.
    pub fn search_with_limits(
        &self,
        position: &mut Position,
        limits: SearchLimits,
    ) -> Result<SearchResult> {
        let outcome = self.iterative_deepening(position, limits);
        if let Err(err) = &outcome {
            warn!("search aborted ({}): {err}", err.code());
        }
        outcome
    }

    /// Play `line` from `position` (every move must be legal), search the resulting
    /// position, then take the line back.
    pub fn search_line(
        &self,
        position: &mut Position,
        line: &[Move],
        max_depth: usize,
    ) -> Result<SearchResult> {
        let mut applied: Vec<UndoInfo> = Vec::with_capacity(line.len());
        let outcome = self.play_and_search(position, line, max_depth, &mut applied);
        for undo in applied.into_iter().rev() {
            position.undo_move(undo);
        }
        outcome
    }

    fn play_and_search(
        &self,
        position: &mut Position,
        line: &[Move],
        max_depth: usize,
        applied: &mut Vec<UndoInfo>,
    ) -> Result<SearchResult> {
        for mv in line {
            applied.push(position.play_legal(mv)?);
        }
        self.search(position, max_depth)
    }

    fn iterative_deepening(
        &self,
        position: &mut Position,
        limits: SearchLimits,
    ) -> Result<SearchResult> {
        let start = Instant::now();
        let max_depth = limits.max_depth.clamp(1, self.config.max_depth);

        if position.generate_legal_moves()?.is_empty() {
            let score = terminal_score(position, 1)?;
            info!("no legal moves at root, score {score:.2}");
            let mut result = SearchResult {
                best_move: None,
                score,
                depth: 1,
                pv_table: empty_pv_table(),
                pv_length: 0,
                stats: Default::default(),
            };
            result.stats.nodes = 1;
            result.stats.elapsed = start.elapsed();
            return Ok(result);
        }

        let mut ctx = SearchContext::new(&self.evaluator, &self.table);
        let mut result: Option<SearchResult> = None;

        for depth in 1..=max_depth {
            let previous = result.as_ref().map(|r| r.score);
            let score = self.aspiration_search(&mut ctx, position, depth, previous)?;

            let pv_length = ctx.pv.root_len();
            let pv_table = ctx.pv.root_table();
            let best_move = (pv_length > 0).then(|| pv_table[0][0]);
            let mut stats = ctx.stats;
            stats.elapsed = start.elapsed();

            let iteration = SearchResult {
                best_move,
                score,
                depth,
                pv_table,
                pv_length,
                stats,
            };
            info!(
                "depth {} score {:.2} nodes {} evals {} time {}ms pv {}",
                depth,
                score,
                stats.nodes,
                stats.evaluations,
                stats.elapsed.as_millis(),
                format_pv(iteration.pv())
            );
            result = Some(iteration);

            if is_mate_score(score) {
                debug!("mate score found at depth {depth}, stopping");
                break;
            }
            if depth < max_depth && limits.deadline_passed() {
                debug!("deadline reached after depth {depth}");
                break;
            }
        }

        // The loop runs at least once, so a result is always present
        let result = result.ok_or_else(|| EngineError::IllegalState {
            reason: "search completed no iteration".to_string(),
        })?;
        info!(
            "search done: depth {} score {:.2} best {} nodes {} tt hits {} tt cutoffs {} beta cutoffs {} re-searches {} pvs re-searches {} iid {}",
            result.depth,
            result.score,
            result.best_move.map_or_else(|| "(none)".to_string(), |mv| mv.to_string()),
            result.stats.nodes,
            result.stats.tt_hits,
            result.stats.tt_cutoffs,
            result.stats.beta_cutoffs,
            result.stats.researches,
            result.stats.pvs_researches,
            result.stats.iid_searches
        );
        debug!("tt hashfull {} per mille", self.table.hashfull_per_mille());
        Ok(result)
    }

    /// One iteration: a narrow window around the previous score, widened on failure
    /// until the score falls inside it.
    fn aspiration_search(
        &self,
        ctx: &mut SearchContext<'_, E>,
        position: &mut Position,
        depth: usize,
        previous: Option<f32>,
    ) -> Result<f32> {
        let Some(center) = previous.filter(|score| !is_mate_score(*score)) else {
            return ctx.negamax(position, depth, 0, -INFINITY_SCORE, INFINITY_SCORE);
        };

        let mut delta = self.config.aspiration_window;
        let mut alpha = center - delta;
        let mut beta = center + delta;
        loop {
            let score = ctx.negamax(position, depth, 0, alpha, beta)?;
            let full_window = alpha <= -INFINITY_SCORE && beta >= INFINITY_SCORE;
            if full_window || (score > alpha && score < beta) {
                return Ok(score);
            }

            ctx.stats.researches += 1;
            delta *= 2.0;
            if delta > ASPIRATION_MAX || is_mate_score(score) {
                alpha = -INFINITY_SCORE;
                beta = INFINITY_SCORE;
            } else if score <= alpha {
                alpha = center - delta;
            } else {
                beta = center + delta;
            }
            debug!("depth {depth}: score {score:.2} outside window, re-search in ({alpha:.2}, {beta:.2})");
        }
    }
}

fn format_pv(pv: &[Move]) -> String {
    pv.iter().map(Move::to_string).collect::<Vec<_>>().join(" ")
}
