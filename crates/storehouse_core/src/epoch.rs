//! Process-wide invalidation generation counter.

use core::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing "world changed" counter.
///
/// External code bumps the epoch whenever something relevant to discovery
/// changed (a provider was placed, destroyed, locked or unlocked). Item caches
/// record the value they were built under and treat any later value as stale.
///
/// Shared through an `Arc` by every aggregator that should observe the same
/// world; tests create isolated instances.
#[derive(Debug, Default)]
pub struct InvalidationEpoch {
    value: AtomicU64,
}

impl InvalidationEpoch {
    /// Creates a counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current generation.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Advances the generation and returns the new value.
    pub fn bump(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Returns `true` if the generation moved on since `recorded`.
    #[must_use]
    pub fn has_advanced_past(&self, recorded: u64) -> bool {
        self.current() > recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn bump_returns_new_generation() {
        let epoch = InvalidationEpoch::new();
        assert_eq!(epoch.current(), 0);
        assert_eq!(epoch.bump(), 1);
        assert_eq!(epoch.bump(), 2);
        assert!(epoch.has_advanced_past(1));
        assert!(!epoch.has_advanced_past(2));
    }

    #[test]
    fn concurrent_bumps_are_not_lost() {
        let epoch = Arc::new(InvalidationEpoch::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let epoch = Arc::clone(&epoch);
                thread::spawn(move || {
                    for _ in 0..250 {
                        epoch.bump();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert_eq!(epoch.current(), 1000);
    }
}
