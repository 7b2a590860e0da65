//! Cache effectiveness counters.

use core::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by an [`Aggregator`](crate::Aggregator) and every context
/// it creates.
#[derive(Debug, Default)]
pub struct CacheStats {
    context_hits: AtomicU64,
    context_misses: AtomicU64,
    unavailable: AtomicU64,
    item_cache_hits: AtomicU64,
    item_cache_pulls: AtomicU64,
    removals: AtomicU64,
    units_removed: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// `create()` calls answered from the TTL slot.
    pub context_hits: u64,
    /// `create()` calls that ran discovery.
    pub context_misses: u64,
    /// `create()` calls that produced no context.
    pub unavailable: u64,
    /// Queries answered from a context's item cache.
    pub item_cache_hits: u64,
    /// Queries that re-pulled live stacks.
    pub item_cache_pulls: u64,
    /// Removal calls that removed at least one item.
    pub removals: u64,
    /// Total items removed.
    pub units_removed: u64,
}

impl CacheStats {
    pub(crate) fn record_context_hit(&self) {
        self.context_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_context_miss(&self) {
        self.context_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unavailable(&self) {
        self.unavailable.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_item_hit(&self) {
        self.item_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_item_pull(&self) {
        self.item_cache_pulls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_removal(&self, removed: u32) {
        if removed > 0 {
            self.removals.fetch_add(1, Ordering::Relaxed);
            self.units_removed
                .fetch_add(u64::from(removed), Ordering::Relaxed);
        }
    }

    /// Copies the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            context_hits: self.context_hits.load(Ordering::Relaxed),
            context_misses: self.context_misses.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            item_cache_hits: self.item_cache_hits.load(Ordering::Relaxed),
            item_cache_pulls: self.item_cache_pulls.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            units_removed: self.units_removed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_removals_are_not_counted() {
        let stats = CacheStats::default();
        stats.record_removal(0);
        stats.record_removal(5);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.removals, 1);
        assert_eq!(snapshot.units_removed, 5);
    }
}
