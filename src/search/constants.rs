//! Search constants and parameters.

// ============================================================================
// SEARCH LIMITS
// ============================================================================

/// Deepest iteration the engine runs; also the size of the PV table
pub const MAX_DEPTH: usize = 30;

/// Default transposition table size in entries (16 bytes each)
pub const DEFAULT_TT_ENTRIES: usize = 1 << 20;

// ============================================================================
// SCORES (pawn units, side-to-move perspective)
// ============================================================================

/// Base magnitude of a checkmate score; the remaining depth is added on top
pub const MATE_SCORE: f32 = 10_000.0;

/// Stalemate and fifty-move draws
pub const DRAW_SCORE: f32 = 0.0;

/// Bound wider than any reachable score, used for full windows
pub(crate) const INFINITY_SCORE: f32 = 2.0 * MATE_SCORE;

/// Largest magnitude an evaluator score keeps; anything beyond would read as a mate
pub const MAX_EVAL_SCORE: f32 = MATE_SCORE - 1.0;

// ============================================================================
// ASPIRATION WINDOWS
// ============================================================================

/// Half-width of the window around the previous iteration's score
pub const ASPIRATION_WINDOW: f32 = 0.25;

/// Past this half-width the re-search falls back to a full window
pub(crate) const ASPIRATION_MAX: f32 = 16.0;

// ============================================================================
// PRINCIPAL VARIATION SEARCH
// ============================================================================

/// Width of the zero window used to test moves after the first
pub(crate) const NULL_WINDOW: f32 = 0.01;

/// Internal iterative deepening runs at PV nodes with at least this much depth left
pub(crate) const IID_MIN_DEPTH: usize = 4;

/// Depth reduction of the internal iterative deepening search
pub(crate) const IID_REDUCTION: usize = 2;

// ============================================================================
// MOVE ORDERING PRIORITIES
// ============================================================================
// Higher scores are tried earlier: TT > captures/promotions > killers > history

/// Hash move (from transposition table) - highest priority
pub(crate) const TT_MOVE_SCORE: i32 = 1 << 20;

/// Base for captures and promotions, ordered within by MVV-LVA
pub(crate) const TACTICAL_SCORE: i32 = 100_000;

/// First killer move (quiet that caused beta cutoff at same ply)
pub(crate) const KILLER1_SCORE: i32 = 20_000;

/// Second killer move (replaced killer)
pub(crate) const KILLER2_SCORE: i32 = 10_000;

/// History scores are clamped below the killers
pub(crate) const HISTORY_MAX: i32 = KILLER2_SCORE - 1;

/// Returns true for scores that encode a forced mate
#[inline]
#[must_use]
pub fn is_mate_score(score: f32) -> bool {
    score.abs() >= MATE_SCORE
}
