//! Main alpha-beta search.

use log::trace;
use shakmaty::Move;

use super::SearchContext;
use crate::position::{uci_string, DrawKind, Position};
use crate::score::{from_tt, mated_in, to_tt, Score, DRAW, INFINITY, MAX_PLY};
use crate::tt::{Bound, TtEntry};
use crate::zobrist::Signature;

impl SearchContext<'_> {
    /// Search every root move. Returns the best move and its score; the first
    /// move in order wins ties.
    pub(super) fn search_root(&mut self, pos: &mut Position, depth: u32) -> (Option<Move>, Score) {
        self.stats.nodes += 1;
        self.pv.clear(0);

        let sig = pos.signature();
        let tt_move = self.probe_tt(sig).and_then(|entry| entry.best_move);
        let moves = self.order_moves(pos, tt_move, 0);

        let mut alpha = -INFINITY;
        let beta = INFINITY;
        let mut best_score = -INFINITY;
        let mut best_move = None;

        for mv in moves {
            let score = {
                let mut child = pos.make(mv);
                -self.alphabeta(&mut child, depth - 1, -beta, -alpha, 1)
            };
            trace!("root {} score {score}", uci_string(mv));

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
                if score > alpha {
                    alpha = score;
                    self.pv.update(0, mv);
                }
            }
        }

        if best_move.is_some() {
            self.store_tt(sig, depth, best_score, Bound::Exact, best_move, 0);
        }
        (best_move, best_score)
    }

    /// Negamax alpha-beta, fail-soft.
    pub(super) fn alphabeta(
        &mut self,
        pos: &mut Position,
        depth: u32,
        mut alpha: Score,
        beta: Score,
        ply: usize,
    ) -> Score {
        self.pv.clear(ply);
        if depth == 0 {
            return self.quiesce(pos, alpha, beta, ply, 0);
        }
        self.stats.nodes += 1;

        if let Some(kind) = pos.draw_kind() {
            // Mate on the hundredth halfmove still counts as mate
            let mated = kind == DrawKind::FiftyMoves && pos.is_check() && pos.legal_moves().is_empty();
            if !mated {
                return DRAW;
            }
        }
        if ply >= MAX_PLY - 1 {
            return self.evaluate(pos);
        }

        let sig = pos.signature();
        let alpha_orig = alpha;

        let mut tt_move = None;
        if let Some(entry) = self.probe_tt(sig) {
            tt_move = entry.best_move;
            if u32::from(entry.depth) >= depth {
                let score = from_tt(entry.score, ply);
                let usable = match entry.bound {
                    Bound::Exact => true,
                    Bound::LowerBound => score >= beta,
                    Bound::UpperBound => score <= alpha,
                };
                if usable {
                    self.stats.tt_cutoffs += 1;
                    return score;
                }
            }
        }

        let moves = self.order_moves(pos, tt_move, ply);
        if moves.is_empty() {
            return if pos.is_check() { mated_in(ply) } else { DRAW };
        }

        let mut best_score = -INFINITY;
        let mut best_move = None;

        for mv in moves {
            let score = {
                let mut child = pos.make(mv);
                -self.alphabeta(&mut child, depth - 1, -beta, -alpha, ply + 1)
            };

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
                if score > alpha {
                    alpha = score;
                    self.pv.update(ply, mv);
                }
            }

            if score >= beta {
                self.handle_beta_cutoff(mv, ply);
                break;
            }
        }

        let bound = if best_score >= beta {
            Bound::LowerBound
        } else if best_score > alpha_orig {
            Bound::Exact
        } else {
            Bound::UpperBound
        };
        self.store_tt(sig, depth, best_score, bound, best_move, ply);

        best_score
    }

    fn handle_beta_cutoff(&mut self, mv: Move, ply: usize) {
        self.stats.beta_cutoffs += 1;
        if self.state.params.use_killers && !mv.is_capture() && !mv.is_promotion() {
            self.state.killers.update(ply, mv);
        }
    }

    fn probe_tt(&mut self, sig: Signature) -> Option<TtEntry> {
        if !self.state.params.use_tt {
            return None;
        }
        let entry = self.state.tt.probe(sig)?;
        self.stats.tt_hits += 1;
        Some(entry)
    }

    fn store_tt(
        &mut self,
        sig: Signature,
        depth: u32,
        score: Score,
        bound: Bound,
        best_move: Option<Move>,
        ply: usize,
    ) {
        if self.state.params.use_tt {
            self.state
                .tt
                .store(sig, depth, to_tt(score, ply), bound, best_move);
        }
    }
}
