//! Score type and the mate-encoding band.
//!
//! Every score is in centipawns from the point of view of the side to move at
//! the node being scored. Mate scores occupy `MATE_BOUND..=MATE` (and the
//! negated range): `MATE - n` means the side to move mates in `n` plies,
//! `-(MATE - n)` means it is mated in `n` plies. Static evaluations are
//! clamped to `MAX_EVAL`, so any real evaluation orders strictly below any
//! mate distance.

/// Centipawn score, side-to-move relative.
pub type Score = i32;

/// Upper bound used for the initial search window. Never produced by search.
pub const INFINITY: Score = 32_001;

/// Score of delivering mate on the current ply.
pub const MATE: Score = 32_000;

/// Maximum search ply, main search plus quiescence extension.
pub const MAX_PLY: usize = 128;

/// Scores with absolute value at or above this are mate scores.
pub const MATE_BOUND: Score = MATE - MAX_PLY as Score;

/// Largest magnitude a static evaluation may take.
pub const MAX_EVAL: Score = 20_000;

/// Score of a draw.
pub const DRAW: Score = 0;

const _: () = assert!(MAX_EVAL < MATE_BOUND);

/// Score for the side to move when it is checkmated `ply` plies from the root.
#[inline]
#[must_use]
pub const fn mated_in(ply: usize) -> Score {
    -MATE + ply as Score
}

/// Score for the side to move when it mates `ply` plies from the root.
#[inline]
#[must_use]
pub const fn mate_in(ply: usize) -> Score {
    MATE - ply as Score
}

#[inline]
#[must_use]
pub const fn is_mate(score: Score) -> bool {
    score >= MATE_BOUND || score <= -MATE_BOUND
}

/// Distance to mate in full moves, signed: positive when the side to move
/// mates, negative when it is mated. `None` for material scores.
#[must_use]
pub fn mate_distance_moves(score: Score) -> Option<i32> {
    if score >= MATE_BOUND {
        Some((MATE - score + 1) / 2)
    } else if score <= -MATE_BOUND {
        Some(-((MATE + score + 1) / 2))
    } else {
        None
    }
}

/// Clamp a static evaluation into the material band.
#[inline]
#[must_use]
pub fn clamp_eval(score: Score) -> Score {
    score.clamp(-MAX_EVAL, MAX_EVAL)
}

/// Convert a search score at `ply` into a node-relative score for storage.
///
/// Mate scores are stored as distance from the node so that the entry stays
/// valid when the position is reached at another ply.
#[inline]
#[must_use]
pub fn to_tt(score: Score, ply: usize) -> Score {
    if score >= MATE_BOUND {
        score + ply as Score
    } else if score <= -MATE_BOUND {
        score - ply as Score
    } else {
        score
    }
}

/// Inverse of [`to_tt`].
#[inline]
#[must_use]
pub fn from_tt(score: Score, ply: usize) -> Score {
    if score >= MATE_BOUND {
        score - ply as Score
    } else if score <= -MATE_BOUND {
        score + ply as Score
    } else {
        score
    }
}

/// Render a score the way UCI `info` lines expect: `cp 35` or `mate -2`.
#[must_use]
pub fn format_uci(score: Score) -> String {
    match mate_distance_moves(score) {
        Some(moves) => format!("mate {moves}"),
        None => format!("cp {score}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mate_scores_order_by_distance() {
        assert!(mate_in(1) > mate_in(3));
        assert!(mated_in(2) < mated_in(4));
        assert!(mate_in(MAX_PLY - 1) > MAX_EVAL);
        assert!(mated_in(MAX_PLY - 1) < -MAX_EVAL);
    }

    #[test]
    fn mate_band_is_disjoint_from_evaluations() {
        assert!(!is_mate(clamp_eval(i32::MAX / 2)));
        assert!(!is_mate(clamp_eval(i32::MIN / 2)));
        assert!(is_mate(mate_in(7)));
        assert!(is_mate(mated_in(0)));
    }

    #[test]
    fn mate_distance_in_moves() {
        assert_eq!(mate_distance_moves(mate_in(1)), Some(1));
        assert_eq!(mate_distance_moves(mate_in(3)), Some(2));
        assert_eq!(mate_distance_moves(mated_in(2)), Some(-1));
        assert_eq!(mate_distance_moves(250), None);
    }

    #[test]
    fn tt_adjustment_rebases_mate_to_node() {
        // Mate found 5 plies from root at a node 2 plies deep is mate in 3 from the node.
        let stored = to_tt(mate_in(5), 2);
        assert_eq!(stored, mate_in(3));
        // Reached again at ply 4 it is mate in 7 from the root.
        assert_eq!(from_tt(stored, 4), mate_in(7));
        assert_eq!(to_tt(-45, 9), -45);
    }

    #[test]
    fn formatting() {
        assert_eq!(format_uci(35), "cp 35");
        assert_eq!(format_uci(mate_in(1)), "mate 1");
        assert_eq!(format_uci(mated_in(2)), "mate -1");
    }
}
