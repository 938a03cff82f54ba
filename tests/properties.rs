//! Property-based tests using proptest.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use maxchess::position::Position;
use maxchess::score::{INFINITY, MATE};
use maxchess::search::{SearchLimits, SearchOutcome, SearchState};
use maxchess::zobrist::Signature;

/// Play up to `plies` random legal moves from the start position.
fn random_walk(seed: u64, plies: usize) -> Position {
    let mut pos = Position::startpos();
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..plies {
        let moves = pos.legal_moves();
        if moves.is_empty() || pos.draw_kind().is_some() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        pos.play(mv);
    }
    pos
}

/// Apply `depth` random moves through nested guards.
fn nested_make(pos: &mut Position, rng: &mut StdRng, depth: usize) {
    if depth == 0 {
        return;
    }
    let moves = pos.legal_moves();
    if moves.is_empty() {
        return;
    }
    let mv = moves[rng.gen_range(0..moves.len())];
    let mut child = pos.make(mv);
    assert_eq!(child.signature(), Signature::of(child.chess()));
    nested_make(&mut child, rng, depth - 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: make followed by unmake restores the position exactly
    #[test]
    fn prop_make_unmake_restores_state(seed in any::<u64>(), plies in 0..30usize, depth in 1..12usize) {
        let mut pos = random_walk(seed, plies);
        let before = pos.snapshot();
        let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);

        nested_make(&mut pos, &mut rng, depth);

        prop_assert_eq!(pos.snapshot(), before);
        prop_assert_eq!(pos.applied_moves(), 0);
    }

    /// Property: the incremental signature always matches a recomputed one
    #[test]
    fn prop_signature_consistency(seed in any::<u64>(), plies in 1..40usize) {
        let pos = random_walk(seed, plies);
        prop_assert_eq!(pos.signature(), Signature::of(pos.chess()));
    }

    /// Property: search returns a legal move and a bounded score
    #[test]
    fn prop_search_returns_legal_move(seed in any::<u64>(), plies in 0..24usize, depth in 1..3u32) {
        let mut pos = random_walk(seed, plies);
        let mut state = SearchState::new(1);
        match state.search(&mut pos, &SearchLimits::depth(depth)).unwrap() {
            SearchOutcome::BestMove(result) => {
                prop_assert!(pos.is_legal(&result.best_move));
                prop_assert_eq!(result.pv.first().copied(), Some(result.best_move));
                prop_assert!(result.score.abs() <= MATE);
                prop_assert!(result.score.abs() < INFINITY);
            }
            SearchOutcome::NoMove { status } => {
                prop_assert!(pos.legal_moves().is_empty());
                prop_assert!(status.is_terminal());
            }
        }
    }

    /// Property: outside check, quiescence never scores below standing pat
    #[test]
    fn prop_quiescence_bounds_static_eval(seed in any::<u64>(), plies in 0..30usize) {
        let mut pos = random_walk(seed, plies);
        prop_assume!(!pos.is_check());
        prop_assume!(!pos.legal_moves().is_empty());
        prop_assume!(pos.draw_kind().is_none());

        let mut state = SearchState::new(1);
        let stand_pat = state.evaluate(&pos);
        prop_assert!(state.quiescence(&mut pos) >= stand_pat);
    }
}
