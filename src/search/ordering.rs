//! Move-ordering cache shared by alpha-beta workers
//!
//! Each interior node records the children it generated together with the
//! result each one produced (or `None` if a cutoff skipped it). A deeper pass
//! reaching the same position and side to move tries the best-scoring
//! children first. Only the ordering is reused, never the scores themselves.
//!
//! The cache is a fixed number of slots. A position maps to exactly one slot,
//! and a colliding store replaces the occupant only when it searched at
//! least as many plies below the node, so entries near the root survive.

use parking_lot::RwLock;

use crate::board::Move;

use super::alphabeta::SearchReturn;

const SHARDS: usize = 16;

/// Default number of slots across all shards
pub const DEFAULT_CAPACITY: usize = 1 << 14;

/// Children of one node with the result each produced, in the order tried
pub type OrderingEntry = Vec<(Move, Option<SearchReturn>)>;

struct Slot {
    hash: u64,
    maximizing: bool,
    /// Plies searched below the node when the entry was stored
    draft: u32,
    entry: OrderingEntry,
}

/// Bounded, sharded table from position to child ordering.
///
/// Shards keep writer contention low when many workers store at once.
pub struct OrderingCache {
    shards: Vec<RwLock<Vec<Option<Slot>>>>,
    slots_per_shard: usize,
}

impl OrderingCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache holding at most `capacity` positions (rounded up to
    /// a multiple of the shard count).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let slots_per_shard = capacity.div_ceil(SHARDS).max(1);
        Self {
            shards: (0..SHARDS)
                .map(|_| RwLock::new((0..slots_per_shard).map(|_| None).collect()))
                .collect(),
            slots_per_shard,
        }
    }

    /// Maximum number of positions held at once
    pub fn capacity(&self) -> usize {
        SHARDS * self.slots_per_shard
    }

    #[inline]
    fn locate(&self, hash: u64, maximizing: bool) -> (usize, usize) {
        let shard = (hash % SHARDS as u64) as usize;
        let slot = ((hash / SHARDS as u64) as usize).wrapping_add(usize::from(maximizing))
            % self.slots_per_shard;
        (shard, slot)
    }

    /// Record the children of a node searched `draft` plies deep.
    ///
    /// An entry for the same position is always replaced; a different
    /// position in the slot is replaced only if its draft is not deeper.
    pub fn store(&self, hash: u64, maximizing: bool, draft: u32, entry: OrderingEntry) {
        let (shard, slot) = self.locate(hash, maximizing);
        let mut slots = self.shards[shard].write();
        let replace = match &slots[slot] {
            None => true,
            Some(s) => (s.hash == hash && s.maximizing == maximizing) || s.draft <= draft,
        };
        if replace {
            slots[slot] = Some(Slot {
                hash,
                maximizing,
                draft,
                entry,
            });
        }
    }

    fn with_entry<T>(
        &self,
        hash: u64,
        maximizing: bool,
        f: impl FnOnce(&OrderingEntry) -> T,
    ) -> Option<T> {
        let (shard, slot) = self.locate(hash, maximizing);
        let slots = self.shards[shard].read();
        slots[slot]
            .as_ref()
            .filter(|s| s.hash == hash && s.maximizing == maximizing)
            .map(|s| f(&s.entry))
    }

    /// Children ordered best-first for the side to move.
    ///
    /// Evaluated children come first, sorted descending for the maximizing
    /// side and ascending otherwise. Children skipped by a cutoff follow in
    /// the order they were generated.
    pub fn ordered(&self, hash: u64, maximizing: bool) -> Option<Vec<Move>> {
        self.with_entry(hash, maximizing, |entry| {
            let mut tried: Vec<(Move, i64)> = entry
                .iter()
                .filter_map(|(mv, ret)| ret.map(|r| (*mv, r.score)))
                .collect();
            if maximizing {
                tried.sort_by(|a, b| b.1.cmp(&a.1));
            } else {
                tried.sort_by(|a, b| a.1.cmp(&b.1));
            }

            let untried = entry
                .iter()
                .filter(|(_, ret)| ret.is_none())
                .map(|(mv, _)| *mv);
            tried.into_iter().map(|(mv, _)| mv).chain(untried).collect()
        })
    }

    /// Raw entry as stored, in the order the children were tried
    #[cfg(test)]
    pub(crate) fn entry(&self, hash: u64, maximizing: bool) -> Option<OrderingEntry> {
        self.with_entry(hash, maximizing, Clone::clone)
    }

    /// Number of cached positions
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.read().iter().filter(|slot| slot.is_some()).count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for OrderingCache {
    fn default() -> Self {
        Self::new()
    }
}
