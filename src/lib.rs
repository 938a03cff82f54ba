//! maxchess: a depth-bounded alpha-beta chess engine.
//!
//! The rules of chess come from `shakmaty`; this crate adds evaluation,
//! search, a transposition table and three front ends (UCI, interactive
//! terminal play, self-play with PGN export).

pub mod cli;
pub mod error;
pub mod eval;
pub mod position;
pub mod score;
pub mod search;
pub mod selfplay;
pub mod tt;
pub mod uci;
pub mod zobrist;

pub use error::{PlayError, PositionError, SearchError};
pub use eval::{EvalWeights, Evaluator};
pub use position::{GameStatus, MoveGuard, Position};
pub use score::Score;
pub use search::{SearchLimits, SearchOutcome, SearchParams, SearchResult, SearchState};
pub use tt::TranspositionTable;
