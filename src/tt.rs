//! Transposition table for caching search results.
//!
//! Entries are indexed by the Zobrist key of the position and verified with
//! an independent lock hash, so an index collision can never hand back a
//! result computed for a different position. The table is owned by one search
//! and accessed through `&mut`.

use std::mem;

use shakmaty::Move;

use crate::score::Score;
use crate::zobrist::Signature;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,      // Score is the exact value
    LowerBound, // Score is at least this value (failed high - score >= beta)
    UpperBound, // Score is at most this value (failed low - score <= alpha)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TtEntry {
    pub key: u64,
    pub lock: u64,
    pub best_move: Option<Move>,
    /// Node-relative score (mate distances measured from this node).
    pub score: Score,
    pub bound: Bound,
    pub depth: u8,
    pub generation: u8,
}

impl TtEntry {
    fn matches(&self, sig: Signature) -> bool {
        self.key == sig.key && self.lock == sig.lock
    }
}

/// Counters since construction or the last [`TranspositionTable::clear`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TtStats {
    pub hits: u64,
    pub misses: u64,
    /// Probes whose key matched an entry but whose lock did not.
    pub collisions: u64,
    pub stores: u64,
    /// Stores dropped by the replacement policy.
    pub rejections: u64,
}

/// Number of slots per bucket for collision resolution
const BUCKET_SIZE: usize = 4;

#[derive(Clone, Debug, Default)]
struct Bucket {
    slots: [Option<TtEntry>; BUCKET_SIZE],
}

pub struct TranspositionTable {
    buckets: Vec<Bucket>,
    mask: usize,
    generation: u8,
    stats: TtStats,
}

impl TranspositionTable {
    /// Create a new transposition table with the given size in megabytes.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let bucket_size = mem::size_of::<Bucket>();
        let num_buckets = (size_mb.max(1) * 1024 * 1024) / bucket_size;
        Self::with_buckets(num_buckets)
    }

    /// Create a table holding at least `entries` slots.
    #[must_use]
    pub fn with_entries(entries: usize) -> Self {
        Self::with_buckets(entries.div_ceil(BUCKET_SIZE))
    }

    fn with_buckets(requested: usize) -> Self {
        // Power of two for mask indexing
        let num_buckets = requested.max(1).next_power_of_two();
        TranspositionTable {
            buckets: vec![Bucket::default(); num_buckets],
            mask: num_buckets - 1,
            generation: 0,
            stats: TtStats::default(),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len() * BUCKET_SIZE
    }

    #[must_use]
    pub fn generation(&self) -> u8 {
        self.generation
    }

    #[must_use]
    pub fn stats(&self) -> TtStats {
        self.stats
    }

    fn index(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }

    /// Probe the table. Only an entry matching both key and lock is returned.
    pub fn probe(&mut self, sig: Signature) -> Option<TtEntry> {
        let idx = self.index(sig.key);
        let mut key_collision = false;

        for entry in self.buckets[idx].slots.iter().flatten() {
            if entry.matches(sig) {
                self.stats.hits += 1;
                return Some(entry.clone());
            }
            if entry.key == sig.key {
                key_collision = true;
            }
        }

        if key_collision {
            self.stats.collisions += 1;
        }
        self.stats.misses += 1;
        None
    }

    /// Store a search result.
    ///
    /// Replacement order:
    /// 1. the slot already holding this position, if the new result is at
    ///    least as deep or the old one is from a previous search
    /// 2. the first empty slot
    /// 3. the slot with the lowest `depth * 2 - age`, under the same depth or
    ///    age condition as (1)
    ///
    /// Returns `false` when the result was dropped.
    pub fn store(
        &mut self,
        sig: Signature,
        depth: u32,
        score: Score,
        bound: Bound,
        best_move: Option<Move>,
    ) -> bool {
        let depth_u8 = depth.min(u32::from(u8::MAX)) as u8;
        let generation = self.generation;
        let idx = self.index(sig.key);
        let bucket = &mut self.buckets[idx];

        let mut entry = TtEntry {
            key: sig.key,
            lock: sig.lock,
            best_move,
            score,
            bound,
            depth: depth_u8,
            generation,
        };

        // Same position: update in place
        if let Some(slot) = bucket
            .slots
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|e| e.matches(sig)))
        {
            let replace = match slot.as_ref() {
                Some(old) => {
                    if entry.best_move.is_none() {
                        entry.best_move = old.best_move;
                    }
                    depth_u8 >= old.depth || old.generation != generation
                }
                None => true,
            };
            return if replace {
                *slot = Some(entry);
                self.stats.stores += 1;
                true
            } else {
                self.stats.rejections += 1;
                false
            };
        }

        if let Some(slot) = bucket.slots.iter_mut().find(|s| s.is_none()) {
            *slot = Some(entry);
            self.stats.stores += 1;
            return true;
        }

        // Bucket full: find worst slot to replace
        let mut replace_idx = 0;
        let mut worst_priority = i32::MAX;
        for (i, slot) in bucket.slots.iter().enumerate() {
            if let Some(e) = slot {
                let age = generation.wrapping_sub(e.generation);
                let priority = i32::from(e.depth) * 2 - i32::from(age);
                if priority < worst_priority {
                    replace_idx = i;
                    worst_priority = priority;
                }
            }
        }

        let victim = &mut bucket.slots[replace_idx];
        let replace = victim
            .as_ref()
            .map_or(true, |v| depth_u8 >= v.depth || v.generation != generation);
        if replace {
            *victim = Some(entry);
            self.stats.stores += 1;
            true
        } else {
            self.stats.rejections += 1;
            false
        }
    }

    /// Age the table at the start of a new root search.
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Returns hash table fullness in per mille (0-1000).
    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        // Sample first 1000 buckets for efficiency
        let sample_size = self.buckets.len().min(1000);
        let occupied: usize = self
            .buckets
            .iter()
            .take(sample_size)
            .map(|b| b.slots.iter().filter(|s| s.is_some()).count())
            .sum();

        let total_slots = sample_size * BUCKET_SIZE;
        ((occupied as u64 * 1000) / total_slots as u64) as u32
    }

    /// Clear all entries and statistics.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = Bucket::default();
        }
        self.generation = 0;
        self.stats = TtStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn sig(key: u64, lock: u64) -> Signature {
        Signature { key, lock }
    }

    #[test]
    fn test_store_and_probe() {
        let mut tt = TranspositionTable::new(1);
        let s = sig(0x1234_5678_9ABC_DEF0, 42);

        assert!(tt.store(s, 10, 500, Bound::Exact, None));

        let entry = tt.probe(s).expect("should find entry");
        assert_eq!(entry.depth, 10);
        assert_eq!(entry.score, 500);
        assert_eq!(entry.bound, Bound::Exact);
        assert_eq!(tt.stats().hits, 1);
    }

    #[test]
    fn test_no_false_positives() {
        let mut tt = TranspositionTable::new(1);
        tt.store(sig(0x1234_5678_9ABC_DEF0, 1), 10, 500, Bound::Exact, None);

        assert!(tt.probe(sig(0xFEDC_BA98_7654_3210, 1)).is_none());
        assert_eq!(tt.stats().misses, 1);
        assert_eq!(tt.stats().collisions, 0);
    }

    #[test]
    fn test_lock_mismatch_is_a_collision() {
        let mut tt = TranspositionTable::with_entries(16);
        tt.store(sig(7, 100), 4, 33, Bound::LowerBound, None);

        assert!(tt.probe(sig(7, 101)).is_none());
        let stats = tt.stats();
        assert_eq!(stats.collisions, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_same_position_keeps_deeper_result() {
        let mut tt = TranspositionTable::with_entries(16);
        let s = sig(3, 3);
        tt.store(s, 6, 10, Bound::Exact, None);

        // Shallower result in the same search is rejected.
        assert!(!tt.store(s, 2, -50, Bound::UpperBound, None));
        assert_eq!(tt.probe(s).map(|e| e.score), Some(10));

        // From a later search it replaces the stale entry.
        tt.new_search();
        assert!(tt.store(s, 2, -50, Bound::UpperBound, None));
        let e = tt.probe(s).expect("entry");
        assert_eq!((e.depth, e.score), (2, -50));
    }

    #[test]
    fn test_update_keeps_best_move_when_new_has_none() {
        let pos = Position::startpos();
        let mv = pos.legal_moves()[0];
        let mut tt = TranspositionTable::with_entries(16);
        let s = pos.signature();

        tt.store(s, 3, 20, Bound::Exact, Some(mv));
        tt.store(s, 5, 25, Bound::UpperBound, None);

        let e = tt.probe(s).expect("entry");
        assert_eq!(e.depth, 5);
        assert_eq!(e.best_move, Some(mv));
    }

    #[test]
    fn test_full_bucket_replaces_shallowest() {
        // One bucket: every key lands in it.
        let mut tt = TranspositionTable::with_entries(BUCKET_SIZE);
        assert_eq!(tt.capacity(), BUCKET_SIZE);

        for (i, depth) in [5u32, 2, 7, 2].into_iter().enumerate() {
            assert!(tt.store(sig(i as u64 * 8, i as u64), depth, 0, Bound::Exact, None));
        }

        // Too shallow for the weakest victim: dropped.
        assert!(!tt.store(sig(100, 100), 1, 0, Bound::Exact, None));
        assert_eq!(tt.stats().rejections, 1);

        // Deep enough: replaces the first depth-2 slot.
        assert!(tt.store(sig(200, 200), 3, 0, Bound::Exact, None));
        assert!(tt.probe(sig(8, 1)).is_none());
        assert!(tt.probe(sig(24, 3)).is_some());
        assert!(tt.probe(sig(200, 200)).is_some());
    }

    #[test]
    fn test_stale_entries_are_replaced() {
        let mut tt = TranspositionTable::with_entries(BUCKET_SIZE);
        for i in 0..BUCKET_SIZE as u64 {
            tt.store(sig(i, i), 10, 0, Bound::Exact, None);
        }
        tt.new_search();
        assert!(tt.store(sig(99, 99), 1, 0, Bound::Exact, None));
        assert!(tt.probe(sig(99, 99)).is_some());
    }

    #[test]
    fn test_clear_and_hashfull() {
        let mut tt = TranspositionTable::with_entries(8);
        assert_eq!(tt.hashfull_per_mille(), 0);
        for i in 0..4u64 {
            tt.store(sig(i, i), 1, 0, Bound::Exact, None);
        }
        assert_eq!(tt.hashfull_per_mille(), 500);

        tt.clear();
        assert_eq!(tt.hashfull_per_mille(), 0);
        assert_eq!(tt.stats(), TtStats::default());
        assert!(tt.probe(sig(0, 0)).is_none());
    }
}
