use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

use super::constants::{ASPIRATION_WINDOW, DEFAULT_TT_ENTRIES, MAX_DEPTH};

/// Fixed engine parameters, validated once when a [`super::SearchEngine`] is built.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Upper bound on iteration depth, at most [`MAX_DEPTH`]
    pub max_depth: usize,
    /// Transposition table entries, rounded down to a power of two
    pub tt_entries: usize,
    /// Initial aspiration half-width in pawns
    pub aspiration_window: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: MAX_DEPTH,
            tt_entries: DEFAULT_TT_ENTRIES,
            aspiration_window: ASPIRATION_WINDOW,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 || self.max_depth > MAX_DEPTH {
            return Err(EngineError::IllegalState {
                reason: format!("max_depth must be in 1..={MAX_DEPTH}, got {}", self.max_depth),
            });
        }
        if self.tt_entries == 0 {
            return Err(EngineError::IllegalState {
                reason: "tt_entries must be positive".to_string(),
            });
        }
        if !self.aspiration_window.is_finite() || self.aspiration_window <= 0.0 {
            return Err(EngineError::IllegalState {
                reason: format!(
                    "aspiration_window must be a positive number, got {}",
                    self.aspiration_window
                ),
            });
        }
        Ok(())
    }
}

/// Per-call bounds on a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: usize,
    /// Checked between iterations only; the first iteration always completes
    pub deadline: Option<Instant>,
}

impl SearchLimits {
    #[must_use]
    pub fn depth(max_depth: usize) -> Self {
        SearchLimits {
            max_depth,
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `budget` from now
    #[must_use]
    pub fn with_time_budget(self, budget: Duration) -> Self {
        self.with_deadline(Instant::now() + budget)
    }

    pub(crate) fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}
