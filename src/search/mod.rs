//! Iterative-deepening negamax search.
//!
//! # Example
//! ```
//! use chess_search::board::Position;
//! use chess_search::evaluation::MaterialEvaluator;
//! use chess_search::search::{EngineConfig, SearchEngine};
//!
//! let config = EngineConfig { tt_entries: 1 << 16, ..EngineConfig::default() };
//! let engine = SearchEngine::new(MaterialEvaluator, config).unwrap();
//! let mut position = Position::new();
//! let result = engine.search(&mut position, 3).unwrap();
//! assert_eq!(result.depth, 3);
//! assert!(result.best_move.is_some());
//! ```

mod config;
pub mod constants;
mod iterative;
mod move_order;
mod negamax;
mod pv;

pub use config::{EngineConfig, SearchLimits};
pub use constants::{
    is_mate_score, ASPIRATION_WINDOW, DEFAULT_TT_ENTRIES, DRAW_SCORE, MATE_SCORE, MAX_DEPTH, MAX_EVAL_SCORE,
};
pub use iterative::SearchEngine;
pub use pv::{PvTable, SearchResult, SearchStats};
