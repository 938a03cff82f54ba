//! Zobrist hashing for chess positions.
//!
//! Two independent key sets are generated from fixed seeds. The first yields
//! the table index key, the second a lock used to verify that a table entry
//! really belongs to the probed position.

use once_cell::sync::Lazy;
use rand::prelude::*;
use shakmaty::{CastlingSide, Chess, Color, EnPassantMode, Move, Position, Role, Square};

pub(crate) struct ZobristKeys {
    // piece_keys[role][color][square]
    piece_keys: [[[u64; 64]; 2]; 6],
    black_to_move_key: u64,
    // castling_keys[color][side]: 0=White, 1=Black; 0=Kingside, 1=Queenside
    castling_keys: [[u64; 2]; 2],
    // en_passant_keys[file] (only file matters for EP target)
    en_passant_keys: [u64; 8],
}

impl ZobristKeys {
    fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut piece_keys = [[[0; 64]; 2]; 6];
        let mut castling_keys = [[0; 2]; 2];
        let mut en_passant_keys = [0; 8];

        for role in &mut piece_keys {
            for color in role.iter_mut() {
                for key in color.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let black_to_move_key = rng.gen();

        for color in &mut castling_keys {
            for key in color.iter_mut() {
                *key = rng.gen();
            }
        }

        for key in &mut en_passant_keys {
            *key = rng.gen();
        }

        ZobristKeys {
            piece_keys,
            black_to_move_key,
            castling_keys,
            en_passant_keys,
        }
    }

    #[inline]
    fn piece(&self, role: Role, color: Color, sq: Square) -> u64 {
        self.piece_keys[role_index(role)][color_index(color)][usize::from(sq)]
    }

    /// Castling and en passant part of the hash.
    fn rights(&self, pos: &Chess) -> u64 {
        let mut hash = 0u64;
        let castles = pos.castles();
        for color in [Color::White, Color::Black] {
            for (side_idx, side) in [CastlingSide::KingSide, CastlingSide::QueenSide]
                .into_iter()
                .enumerate()
            {
                if castles.has(color, side) {
                    hash ^= self.castling_keys[color_index(color)][side_idx];
                }
            }
        }

        if let Some(ep) = pos.ep_square(EnPassantMode::Legal) {
            hash ^= self.en_passant_keys[usize::from(ep) & 7];
        }
        hash
    }

    fn hash(&self, pos: &Chess) -> u64 {
        let board = pos.board();
        let mut hash = 0u64;

        for sq in board.occupied() {
            if let Some(piece) = board.piece_at(sq) {
                hash ^= self.piece(piece.role, piece.color, sq);
            }
        }

        if pos.turn() == Color::Black {
            hash ^= self.black_to_move_key;
        }

        hash ^ self.rights(pos)
    }

    /// XOR difference between the hashes of `before` and `after`, where
    /// `after` is `before` with `mv` played.
    fn move_delta(&self, before: &Chess, mv: Move, after: &Chess) -> u64 {
        let us = before.turn();
        let them = !us;
        let mut delta = self.black_to_move_key;

        match mv {
            Move::Normal {
                role,
                from,
                capture,
                to,
                promotion,
            } => {
                delta ^= self.piece(role, us, from);
                delta ^= self.piece(promotion.unwrap_or(role), us, to);
                if let Some(victim) = capture {
                    delta ^= self.piece(victim, them, to);
                }
            }
            Move::EnPassant { from, to } => {
                let taken = Square::from_coords(to.file(), from.rank());
                delta ^= self.piece(Role::Pawn, us, from);
                delta ^= self.piece(Role::Pawn, us, to);
                delta ^= self.piece(Role::Pawn, them, taken);
            }
            Move::Castle { king, rook } => {
                let side = CastlingSide::from_queen_side(usize::from(rook) < usize::from(king));
                delta ^= self.piece(Role::King, us, king);
                delta ^= self.piece(Role::King, us, side.king_to(us));
                delta ^= self.piece(Role::Rook, us, rook);
                delta ^= self.piece(Role::Rook, us, side.rook_to(us));
            }
            Move::Put { role, to } => {
                delta ^= self.piece(role, us, to);
            }
        }

        delta ^ self.rights(before) ^ self.rights(after)
    }
}

static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(|| ZobristKeys::new(1_234_567_890));
static LOCKS: Lazy<ZobristKeys> = Lazy::new(|| ZobristKeys::new(0x9E37_79B9_7F4A_7C15));

/// Position signature: table key plus an independent verification lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub key: u64,
    pub lock: u64,
}

impl Signature {
    /// Hash `pos` from scratch.
    #[must_use]
    pub fn of(pos: &Chess) -> Self {
        Signature {
            key: ZOBRIST.hash(pos),
            lock: LOCKS.hash(pos),
        }
    }

    /// Signature of `after`, derived from this one (the signature of
    /// `before`) and the move that links them.
    #[must_use]
    pub fn after_move(self, before: &Chess, mv: Move, after: &Chess) -> Self {
        Signature {
            key: self.key ^ ZOBRIST.move_delta(before, mv, after),
            lock: self.lock ^ LOCKS.move_delta(before, mv, after),
        }
    }
}

#[inline]
pub(crate) fn role_index(role: Role) -> usize {
    match role {
        Role::Pawn => 0,
        Role::Knight => 1,
        Role::Bishop => 2,
        Role::Rook => 3,
        Role::Queen => 4,
        Role::King => 5,
    }
}

#[inline]
pub(crate) fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::fen::Fen;
    use shakmaty::CastlingMode;

    fn chess(fen: &str) -> Chess {
        let fen: Fen = fen.parse().expect("valid fen");
        fen.into_position(CastlingMode::Standard).expect("legal position")
    }

    #[test]
    fn side_to_move_changes_signature() {
        let white = chess("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        let black = chess("4k3/8/8/8/8/8/8/4K3 b - - 0 1");
        let (w, b) = (Signature::of(&white), Signature::of(&black));
        assert_ne!(w.key, b.key);
        assert_ne!(w.lock, b.lock);
    }

    #[test]
    fn castling_rights_change_signature() {
        let with = chess("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let without = chess("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert_ne!(Signature::of(&with), Signature::of(&without));
    }

    #[test]
    fn key_and_lock_are_independent() {
        let start = Chess::default();
        let sig = Signature::of(&start);
        assert_ne!(sig.key, sig.lock);
    }

    /// Plays `line` from `fen`, checking the updated signature against a
    /// full rehash after every move.
    fn assert_updates_match(fen: &str, line: &[&str]) {
        let mut pos = chess(fen);
        let mut sig = Signature::of(&pos);
        for uci in line {
            let mv = uci
                .parse::<shakmaty::uci::UciMove>()
                .expect("uci")
                .to_move(&pos)
                .expect("legal");
            let before = pos.clone();
            pos.play_unchecked(mv);
            sig = sig.after_move(&before, mv, &pos);
            assert_eq!(sig, Signature::of(&pos), "after {uci} in {fen}");
        }
    }

    #[test]
    fn updated_signature_matches_rehash() {
        // Captures, double pushes with and without a legal en passant reply
        assert_updates_match(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &[
                "e2e4", "d7d5", "e4d5", "d8d5", "b1c3", "d5a5", "d2d4", "c7c5", "d4d5", "e7e5",
                "d5e6",
            ],
        );
        // Both castles, promotion with capture
        assert_updates_match(
            "r3k2r/6P1/8/8/8/8/8/R3K2R w KQkq - 0 1",
            &["e1g1", "e8c8", "g7h8q", "d8d1", "f1d1"],
        );
        // Rook captures remove the victim's castling right
        assert_updates_match(
            "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
            &["a1a8", "e8e7", "h1h8"],
        );
    }

    #[test]
    fn move_counters_do_not_affect_signature() {
        let a = chess("4k3/8/8/8/8/8/8/4K2R w K - 0 1");
        let b = chess("4k3/8/8/8/8/8/8/4K2R w K - 17 40");
        assert_eq!(Signature::of(&a), Signature::of(&b));
    }
}
