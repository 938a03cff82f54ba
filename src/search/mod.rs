//! Depth-bounded alpha-beta search.
//!
//! Features:
//! - Negamax alpha-beta, fail-soft
//! - Quiescence search with stand-pat, check evasions and a depth bound
//! - Move ordering (TT move, MVV-LVA, promotions, killers, quiet checks)
//! - Transposition table with lock verification
//! - Triangular principal variation table

mod constants;
mod move_order;
mod negamax;
mod params;
mod quiescence;

use log::debug;
use shakmaty::{Color, Move};

use crate::error::SearchError;
use crate::eval::Evaluator;
use crate::position::{GameStatus, Position};
use crate::score::{Score, INFINITY, MATE, MAX_PLY};
use crate::tt::{TranspositionTable, TtStats};

pub use constants::{DEFAULT_TT_MB, MAX_DEPTH};
pub use move_order::{KillerTable, Killers, MoveOrderer};
pub use params::SearchParams;

/// Caller-supplied bounds for one search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: u32,
}

impl SearchLimits {
    #[must_use]
    pub fn depth(max_depth: u32) -> Self {
        SearchLimits { max_depth }
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.max_depth == 0 || self.max_depth > MAX_DEPTH {
            return Err(SearchError::InvalidDepth {
                depth: self.max_depth,
                max: MAX_DEPTH,
            });
        }
        Ok(())
    }
}

/// Statistics tracked during search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Main-search nodes
    pub nodes: u64,
    /// Quiescence nodes
    pub qnodes: u64,
    pub tt_hits: u64,
    pub tt_cutoffs: u64,
    pub beta_cutoffs: u64,
}

impl SearchStats {
    #[must_use]
    pub fn total_nodes(&self) -> u64 {
        self.nodes + self.qnodes
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    /// Side-to-move relative score at the root.
    pub score: Score,
    /// Principal variation, starting with `best_move`.
    pub pv: Vec<Move>,
    pub depth: u32,
    pub stats: SearchStats,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    BestMove(SearchResult),
    /// The root has no legal move; `status` is checkmate or stalemate.
    NoMove { status: GameStatus },
}

impl SearchOutcome {
    #[must_use]
    pub fn best_move(&self) -> Option<Move> {
        match self {
            SearchOutcome::BestMove(result) => Some(result.best_move),
            SearchOutcome::NoMove { .. } => None,
        }
    }
}

/// Persistent search state: transposition table, heuristics and tuning.
pub struct SearchState {
    tt: TranspositionTable,
    params: SearchParams,
    evaluator: Evaluator,
    killers: KillerTable,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(DEFAULT_TT_MB)
    }
}

impl SearchState {
    #[must_use]
    pub fn new(tt_mb: usize) -> Self {
        SearchState {
            tt: TranspositionTable::new(tt_mb),
            params: SearchParams::default(),
            evaluator: Evaluator::default(),
            killers: KillerTable::new(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    #[must_use]
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    #[must_use]
    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    #[must_use]
    pub fn tt_stats(&self) -> TtStats {
        self.tt.stats()
    }

    /// Replace the table with an empty one of `tt_mb` megabytes.
    pub fn resize_tt(&mut self, tt_mb: usize) {
        self.tt = TranspositionTable::new(tt_mb);
    }

    /// Forget everything learned (new game).
    pub fn clear(&mut self) {
        self.tt.clear();
        self.killers.reset();
    }

    /// Static evaluation, side-to-move relative.
    #[must_use]
    pub fn evaluate(&self, pos: &Position) -> Score {
        self.evaluator.evaluate(pos)
    }

    /// Search `pos` to `limits.max_depth` plies.
    ///
    /// The position is restored before returning.
    pub fn search(
        &mut self,
        pos: &mut Position,
        limits: &SearchLimits,
    ) -> Result<SearchOutcome, SearchError> {
        limits.validate()?;

        let status = pos.status();
        if matches!(
            status,
            GameStatus::Checkmate { .. } | GameStatus::Stalemate
        ) {
            debug!("no legal move at root: {status:?}");
            return Ok(SearchOutcome::NoMove { status });
        }

        self.tt.new_search();
        self.killers.reset();

        let tt_before = self.tt.stats();
        let mut ctx = SearchContext::new(self);
        let (best_move, score) = ctx.search_root(pos, limits.max_depth);
        let stats = ctx.stats;
        let pv = ctx.pv.line(0).to_vec();

        let Some(best_move) = best_move else {
            // Unreachable with legal moves present; report the root status.
            return Ok(SearchOutcome::NoMove { status });
        };

        let tt_after = self.tt.stats();
        debug!(
            "depth {} score {} nodes {} qnodes {} tt hits {} collisions {} stores {} hashfull {}",
            limits.max_depth,
            score,
            stats.nodes,
            stats.qnodes,
            tt_after.hits - tt_before.hits,
            tt_after.collisions - tt_before.collisions,
            tt_after.stores - tt_before.stores,
            self.tt.hashfull_per_mille(),
        );

        Ok(SearchOutcome::BestMove(SearchResult {
            best_move,
            score,
            pv,
            depth: limits.max_depth,
            stats,
        }))
    }

    /// Quiescence value of `pos` with a full window.
    pub fn quiescence(&mut self, pos: &mut Position) -> Score {
        let mut ctx = SearchContext::new(self);
        ctx.quiesce(pos, -INFINITY, INFINITY, 0, 0)
    }
}

/// Search `pos` and report the result from White's point of view.
///
/// Terminal positions score as mate or draw without searching.
pub fn white_eval(
    state: &mut SearchState,
    pos: &mut Position,
    depth: u32,
) -> Result<Score, SearchError> {
    let outcome = state.search(pos, &SearchLimits::depth(depth))?;
    Ok(match outcome {
        SearchOutcome::BestMove(result) => match pos.turn() {
            Color::White => result.score,
            Color::Black => -result.score,
        },
        SearchOutcome::NoMove {
            status: GameStatus::Checkmate { winner },
        } => match winner {
            Color::White => MATE,
            Color::Black => -MATE,
        },
        SearchOutcome::NoMove { .. } => 0,
    })
}

/// Triangular principal variation table.
struct PvTable {
    lines: Vec<Vec<Move>>,
}

impl PvTable {
    fn new() -> Self {
        PvTable {
            lines: vec![Vec::new(); MAX_PLY + 1],
        }
    }

    fn clear(&mut self, ply: usize) {
        if let Some(line) = self.lines.get_mut(ply) {
            line.clear();
        }
    }

    /// `mv` followed by the child's line becomes the line at `ply`.
    fn update(&mut self, ply: usize, mv: Move) {
        if ply + 1 >= self.lines.len() {
            return;
        }
        let (head, tail) = self.lines.split_at_mut(ply + 1);
        let line = &mut head[ply];
        line.clear();
        line.push(mv);
        line.extend_from_slice(&tail[0]);
    }

    fn line(&self, ply: usize) -> &[Move] {
        self.lines.get(ply).map_or(&[], Vec::as_slice)
    }
}

/// Search context for a single search
struct SearchContext<'a> {
    state: &'a mut SearchState,
    stats: SearchStats,
    pv: PvTable,
}

impl<'a> SearchContext<'a> {
    fn new(state: &'a mut SearchState) -> Self {
        SearchContext {
            state,
            stats: SearchStats::default(),
            pv: PvTable::new(),
        }
    }

    fn evaluate(&self, pos: &Position) -> Score {
        self.state.evaluator.evaluate(pos)
    }

    fn order_moves(&self, pos: &Position, tt_move: Option<Move>, ply: usize) -> Vec<Move> {
        let killers = if self.state.params.use_killers {
            self.state.killers.get(ply)
        } else {
            [None, None]
        };
        MoveOrderer::new(self.state.evaluator.weights(), self.state.params.check_bonus)
            .order_moves(pos, tt_move, killers)
    }

    fn noisy_moves(&self, pos: &Position) -> Vec<Move> {
        MoveOrderer::new(self.state.evaluator.weights(), self.state.params.check_bonus)
            .noisy_moves(pos)
    }
}
