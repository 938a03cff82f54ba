//! Quiescence search at the horizon.

use super::SearchContext;
use crate::position::Position;
use crate::score::{mated_in, Score, DRAW, INFINITY, MAX_PLY};

impl SearchContext<'_> {
    /// Resolve captures and promotions until the position is quiet.
    ///
    /// In check there is no stand-pat and every evasion is searched. Past
    /// `max_qsearch_depth` plies the static evaluation is returned.
    pub(super) fn quiesce(
        &mut self,
        pos: &mut Position,
        mut alpha: Score,
        beta: Score,
        ply: usize,
        qdepth: u32,
    ) -> Score {
        self.stats.qnodes += 1;
        self.pv.clear(ply);

        let in_check = pos.is_check();
        if pos.legal_moves().is_empty() {
            return if in_check { mated_in(ply) } else { DRAW };
        }
        if pos.draw_kind().is_some() {
            return DRAW;
        }
        if qdepth >= self.state.params.max_qsearch_depth || ply >= MAX_PLY - 1 {
            return self.evaluate(pos);
        }

        let mut best_score;
        let moves = if in_check {
            best_score = -INFINITY;
            self.evasions(pos)
        } else {
            let stand_pat = self.evaluate(pos);
            if stand_pat >= beta {
                return stand_pat;
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
            best_score = stand_pat;
            self.noisy_moves(pos)
        };

        for mv in moves {
            let score = {
                let mut child = pos.make(mv);
                -self.quiesce(&mut child, -beta, -alpha, ply + 1, qdepth + 1)
            };

            if score > best_score {
                best_score = score;
                if score > alpha {
                    alpha = score;
                }
            }
            if score >= beta {
                break;
            }
        }

        best_score
    }

    fn evasions(&self, pos: &Position) -> Vec<shakmaty::Move> {
        super::MoveOrderer::new(self.state.evaluator.weights(), self.state.params.check_bonus)
            .order_moves(pos, None, [None, None])
    }
}
