//! Search constants.

// ============================================================================
// SEARCH LIMITS
// ============================================================================

/// Deepest main-search depth accepted by [`super::SearchState::search`].
pub const MAX_DEPTH: u32 = 64;

/// Quiescence plies allowed past the horizon
pub const DEFAULT_MAX_QSEARCH_DEPTH: u32 = 8;

/// Default transposition table size in MB
pub const DEFAULT_TT_MB: usize = 64;

// ============================================================================
// MOVE ORDERING PRIORITIES
// ============================================================================
// Higher scores = tried earlier. Ordered: TT > captures > promotions > killers > checks > quiet

/// Hash move (from transposition table) - highest priority
pub const TT_MOVE_SCORE: i32 = 1 << 20;

/// Base for captures, plus victim value minus attacker value
pub const CAPTURE_BASE: i32 = 10_000;

/// Base for promotions, plus the promoted piece's value
pub const PROMOTION_BASE: i32 = 5_000;

/// First killer move (quiet that caused beta cutoff at same ply)
pub const KILLER1_SCORE: i32 = 4_000;

/// Second killer move (replaced killer)
pub const KILLER2_SCORE: i32 = 3_900;

/// Bonus for a quiet move that gives check
pub const DEFAULT_CHECK_BONUS: i32 = 50;
