//! Move ordering utilities for search.

use std::cmp::Reverse;

use shakmaty::Move;

use super::constants::{
    CAPTURE_BASE, KILLER1_SCORE, KILLER2_SCORE, PROMOTION_BASE, TT_MOVE_SCORE,
};
use crate::eval::EvalWeights;
use crate::position::Position;
use crate::score::{Score, MAX_PLY};

/// Killer moves for one ply, most recent first.
pub type Killers = [Option<Move>; 2];

pub struct KillerTable {
    slots: Vec<Killers>,
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KillerTable {
    #[must_use]
    pub fn new() -> Self {
        KillerTable {
            slots: vec![[None, None]; MAX_PLY],
        }
    }

    #[must_use]
    pub fn primary(&self, ply: usize) -> Option<Move> {
        self.slots.get(ply).and_then(|row| row[0])
    }

    #[must_use]
    pub fn secondary(&self, ply: usize) -> Option<Move> {
        self.slots.get(ply).and_then(|row| row[1])
    }

    #[must_use]
    pub fn get(&self, ply: usize) -> Killers {
        self.slots.get(ply).copied().unwrap_or([None, None])
    }

    pub fn update(&mut self, ply: usize, mv: Move) {
        let Some(row) = self.slots.get_mut(ply) else {
            return;
        };
        if row[0] != Some(mv) {
            row[1] = row[0];
            row[0] = Some(mv);
        }
    }

    pub fn reset(&mut self) {
        for killers in &mut self.slots {
            *killers = [None, None];
        }
    }
}

/// Scores moves for ordering. Captures use MVV-LVA with the evaluator's
/// piece values.
pub struct MoveOrderer<'a> {
    weights: &'a EvalWeights,
    check_bonus: Score,
}

impl<'a> MoveOrderer<'a> {
    #[must_use]
    pub fn new(weights: &'a EvalWeights, check_bonus: Score) -> Self {
        MoveOrderer {
            weights,
            check_bonus,
        }
    }

    /// Ordering key for captures and promotions, 0 for quiet moves.
    fn noisy_score(&self, mv: Move) -> i32 {
        let mut score = 0;
        // En passant reports a pawn victim
        if let Some(victim) = mv.capture() {
            score += CAPTURE_BASE + self.weights.piece_value(victim)
                - self.weights.piece_value(mv.role());
        }
        if let Some(promo) = mv.promotion() {
            score += PROMOTION_BASE + self.weights.piece_value(promo);
        }
        score
    }

    /// Priority of `mv` in `pos`; higher is searched first.
    #[must_use]
    pub fn score_move(
        &self,
        pos: &Position,
        mv: Move,
        tt_move: Option<Move>,
        killers: Killers,
    ) -> i32 {
        if tt_move == Some(mv) {
            return TT_MOVE_SCORE;
        }
        if mv.is_capture() || mv.is_promotion() {
            return self.noisy_score(mv);
        }
        if killers[0] == Some(mv) {
            return KILLER1_SCORE;
        }
        if killers[1] == Some(mv) {
            return KILLER2_SCORE;
        }
        if self.check_bonus != 0 && pos.gives_check(mv) {
            return self.check_bonus;
        }
        0
    }

    /// All legal moves, best first. Equal priorities keep generation order.
    #[must_use]
    pub fn order_moves(&self, pos: &Position, tt_move: Option<Move>, killers: Killers) -> Vec<Move> {
        let mut scored: Vec<(i32, Move)> = pos
            .legal_moves()
            .into_iter()
            .map(|mv| (self.score_move(pos, mv, tt_move, killers), mv))
            .collect();
        scored.sort_by_key(|&(score, _)| Reverse(score));
        scored.into_iter().map(|(_, mv)| mv).collect()
    }

    /// Captures and promotions only, best first.
    #[must_use]
    pub fn noisy_moves(&self, pos: &Position) -> Vec<Move> {
        let mut scored: Vec<(i32, Move)> = pos
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.is_capture() || mv.is_promotion())
            .map(|mv| (self.noisy_score(mv), mv))
            .collect();
        scored.sort_by_key(|&(score, _)| Reverse(score));
        scored.into_iter().map(|(_, mv)| mv).collect()
    }
}
