//! Static position evaluation.
//!
//! Terms are computed from White's point of view and converted to the side
//! to move at the end:
//! - material and piece-square tables
//! - bishop pair
//! - rook coordination and open/semi-open files
//! - pawn structure (doubled, isolated, passed)
//! - tempo for the side to move
//!
//! The evaluator does not look at game-terminal status. Mate, stalemate and
//! draws are scored by the search before it is called.

pub mod tables;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use shakmaty::{Bitboard, Board, Color, Role};

use crate::position::Position;
use crate::score::{clamp_eval, Score};
use crate::zobrist::role_index;

use tables::{PASSED_PAWN_BONUS_BY_RANK, PST};

/// Tunable evaluation weights, all in centipawns.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvalWeights {
    pub pawn: Score,
    pub knight: Score,
    pub bishop: Score,
    pub rook: Score,
    pub queen: Score,
    pub tempo: Score,
    pub bishop_pair: Score,
    pub rook_same_file: Score,
    pub rook_same_rank: Score,
    pub open_file: Score,
    pub semi_open_file: Score,
    pub doubled_pawn: Score,
    pub isolated_pawn: Score,
    pub passed_pawn: [Score; 8],
}

impl Default for EvalWeights {
    fn default() -> Self {
        EvalWeights {
            pawn: 100,
            knight: 320,
            bishop: 330,
            rook: 500,
            queen: 900,
            tempo: 10,
            bishop_pair: 30,
            rook_same_file: 12,
            rook_same_rank: 12,
            open_file: 20,
            semi_open_file: 10,
            doubled_pawn: 10,
            isolated_pawn: 8,
            passed_pawn: PASSED_PAWN_BONUS_BY_RANK,
        }
    }
}

impl EvalWeights {
    /// Material value of a role. The king has no material value.
    #[must_use]
    pub fn piece_value(&self, role: Role) -> Score {
        match role {
            Role::Pawn => self.pawn,
            Role::Knight => self.knight,
            Role::Bishop => self.bishop,
            Role::Rook => self.rook,
            Role::Queen => self.queen,
            Role::King => 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    weights: EvalWeights,
}

#[inline]
fn file_of(sq: shakmaty::Square) -> usize {
    usize::from(sq) & 7
}

#[inline]
fn rank_of(sq: shakmaty::Square) -> usize {
    usize::from(sq) >> 3
}

#[inline]
fn sign(color: Color) -> Score {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

impl Evaluator {
    #[must_use]
    pub fn new(weights: EvalWeights) -> Self {
        Evaluator { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    /// Score relative to the side to move, tempo included.
    #[must_use]
    pub fn evaluate(&self, pos: &Position) -> Score {
        let white = self.evaluate_white(pos) + self.weights.tempo * sign(pos.turn());
        clamp_eval(white * sign(pos.turn()))
    }

    /// Score from White's point of view without tempo.
    #[must_use]
    pub fn evaluate_white(&self, pos: &Position) -> Score {
        let board = pos.board();
        let mut score = self.material_and_pst(board);

        for color in [Color::White, Color::Black] {
            let side = self.bishop_pair(board, color)
                + self.rooks(board, color)
                + self.pawn_structure(board, color);
            score += sign(color) * side;
        }

        clamp_eval(score)
    }

    fn material_and_pst(&self, board: &Board) -> Score {
        let mut score = 0;
        for sq in board.occupied() {
            let Some(piece) = board.piece_at(sq) else {
                continue;
            };
            let idx = match piece.color {
                Color::White => usize::from(sq),
                Color::Black => usize::from(sq) ^ 56,
            };
            let value = self.weights.piece_value(piece.role) + PST[role_index(piece.role)][idx];
            score += sign(piece.color) * value;
        }
        score
    }

    fn bishop_pair(&self, board: &Board, color: Color) -> Score {
        let bishops = board.by_role(Role::Bishop) & board.by_color(color);
        if bishops.count() >= 2 {
            self.weights.bishop_pair
        } else {
            0
        }
    }

    fn rooks(&self, board: &Board, color: Color) -> Score {
        let rooks = board.by_role(Role::Rook) & board.by_color(color);
        let own_pawns = pawn_files(board.by_role(Role::Pawn) & board.by_color(color));
        let opp_pawns = pawn_files(board.by_role(Role::Pawn) & board.by_color(!color));

        let mut score = 0;
        let mut files = [0u8; 8];
        let mut ranks = [0u8; 8];

        for sq in rooks {
            let file = file_of(sq);
            files[file] += 1;
            ranks[rank_of(sq)] += 1;

            if own_pawns[file] == 0 && opp_pawns[file] == 0 {
                score += self.weights.open_file;
            } else if own_pawns[file] == 0 {
                score += self.weights.semi_open_file;
            }
        }

        if files.iter().any(|&n| n > 1) {
            score += self.weights.rook_same_file;
        }
        if ranks.iter().any(|&n| n > 1) {
            score += self.weights.rook_same_rank;
        }
        score
    }

    /// Doubled, isolated and passed pawns. Returns a bonus (penalties negative).
    fn pawn_structure(&self, board: &Board, color: Color) -> Score {
        let pawns = board.by_role(Role::Pawn) & board.by_color(color);
        let enemy = board.by_role(Role::Pawn) & board.by_color(!color);
        let counts = pawn_files(pawns);

        let mut score = 0;
        for &n in &counts {
            if n > 1 {
                score -= self.weights.doubled_pawn * Score::from(n - 1);
            }
        }

        for sq in pawns {
            let file = file_of(sq);
            let rank = rank_of(sq);

            let left = file > 0 && counts[file - 1] > 0;
            let right = file < 7 && counts[file + 1] > 0;
            if !left && !right {
                score -= self.weights.isolated_pawn;
            }

            let blocked = enemy.into_iter().any(|e| {
                let ef = file_of(e);
                let er = rank_of(e);
                ef.abs_diff(file) <= 1
                    && match color {
                        Color::White => er > rank,
                        Color::Black => er < rank,
                    }
            });
            if !blocked {
                let relative = match color {
                    Color::White => rank,
                    Color::Black => 7 - rank,
                };
                score += self.weights.passed_pawn[relative];
            }
        }
        score
    }
}

fn pawn_files(pawns: Bitboard) -> [u8; 8] {
    let mut counts = [0u8; 8];
    for sq in pawns {
        counts[file_of(sq)] += 1;
    }
    counts
}
