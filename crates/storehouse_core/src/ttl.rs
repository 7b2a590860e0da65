//! Single-slot "compute once, reuse for a while" cache.
//!
//! [`TtlCache`] stores at most one value together with the instant it was
//! produced. Readers get the stored value while it is younger than the TTL;
//! otherwise the supplied factory runs and its result replaces the slot.
//!
//! The whole check-then-set sequence runs under one mutex, so two callers
//! racing on an expired slot never both run the factory.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use storehouse_core::TtlCache;
//!
//! let cache = TtlCache::new(Duration::from_secs(1));
//!
//! let first = cache.get_or_create(|| Some(42), false);
//! let second = cache.get_or_create(|| Some(7), false);
//!
//! assert_eq!(first, Some(42));
//! assert_eq!(second, Some(42));
//! ```

use core::convert::Infallible;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::time::Clock;

/// A stored value and the instant it was produced.
struct Slot<T> {
    value: T,
    stored_at: Instant,
}

impl<T> Slot<T> {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Time-bounded single-value cache.
///
/// `T` is cloned out of the slot on every hit, so it is normally an `Arc` or
/// another cheap handle.
///
/// The factory runs while the slot lock is held. A factory must therefore
/// never call back into the same cache.
pub struct TtlCache<T> {
    ttl: Duration,
    clock: Clock,
    slot: Mutex<Option<Slot<T>>>,
}

impl<T: Clone> TtlCache<T> {
    /// Creates an empty cache reading time from the system clock.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Clock::default())
    }

    /// Creates an empty cache reading time from `clock`.
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Clock) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(None),
        }
    }

    /// Returns the configured time-to-live.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value, or produces a new one with `factory`.
    ///
    /// The cached value is returned untouched when `force_refresh` is false
    /// and the value is younger than the TTL. Otherwise `factory` runs once:
    /// `Some` is stored with a fresh timestamp, `None` empties the slot so the
    /// next call tries again.
    pub fn get_or_create<F>(&self, factory: F, force_refresh: bool) -> Option<T>
    where
        F: FnOnce() -> Option<T>,
    {
        match self.try_get_or_create(|| Ok::<_, Infallible>(factory()), force_refresh) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`get_or_create`](Self::get_or_create).
    ///
    /// # Errors
    ///
    /// Returns the factory's error unchanged. The slot is left empty, so the
    /// next call runs the factory again.
    pub fn try_get_or_create<F, E>(&self, factory: F, force_refresh: bool) -> Result<Option<T>, E>
    where
        F: FnOnce() -> Result<Option<T>, E>,
    {
        let mut slot = self.slot.lock();

        if !force_refresh {
            let now = self.clock.now();
            if let Some(entry) = slot.as_ref().filter(|entry| entry.is_fresh(now, self.ttl)) {
                return Ok(Some(entry.value.clone()));
            }
        }

        *slot = None;
        let produced = factory()?;

        if let Some(value) = &produced {
            *slot = Some(Slot {
                value: value.clone(),
                stored_at: self.clock.now(),
            });
        }

        Ok(produced)
    }

    /// Returns the cached value if it is still fresh, without producing one.
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        let now = self.clock.now();
        self.slot
            .lock()
            .as_ref()
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Returns how long ago the stored value was produced, fresh or not.
    #[must_use]
    pub fn age(&self) -> Option<Duration> {
        self.slot
            .lock()
            .as_ref()
            .map(|entry| self.clock.elapsed_since(entry.stored_at))
    }

    /// Clears the slot; the next lookup always runs its factory.
    pub fn invalidate(&self) {
        *self.slot.lock() = None;
    }
}

impl<T> core::fmt::Debug for TtlCache<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("populated", &self.slot.lock().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::MockClock;
    use core::sync::atomic::{AtomicUsize, Ordering};

    fn counting_factory(calls: &AtomicUsize, value: u32) -> impl FnOnce() -> Option<u32> + '_ {
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Some(value)
        }
    }

    #[test]
    fn reuses_value_within_ttl() {
        let (mock, clock) = MockClock::shared();
        let cache = TtlCache::with_clock(Duration::from_millis(500), clock);
        let calls = AtomicUsize::new(0);

        assert_eq!(cache.get_or_create(counting_factory(&calls, 1), false), Some(1));
        mock.advance(Duration::from_millis(499));
        assert_eq!(cache.get_or_create(counting_factory(&calls, 2), false), Some(1));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn expires_exactly_at_ttl() {
        let (mock, clock) = MockClock::shared();
        let cache = TtlCache::with_clock(Duration::from_millis(500), clock);
        let calls = AtomicUsize::new(0);

        cache.get_or_create(counting_factory(&calls, 1), false);
        mock.advance(Duration::from_millis(500));

        assert_eq!(cache.get_or_create(counting_factory(&calls, 2), false), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn force_refresh_always_runs_factory() {
        let (_mock, clock) = MockClock::shared();
        let cache = TtlCache::with_clock(Duration::from_secs(60), clock);
        let calls = AtomicUsize::new(0);

        cache.get_or_create(counting_factory(&calls, 1), false);
        let refreshed = cache.get_or_create(counting_factory(&calls, 2), true);

        assert_eq!(refreshed, Some(2));
        assert_eq!(cache.peek(), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn none_from_factory_empties_slot() {
        let (_mock, clock) = MockClock::shared();
        let cache = TtlCache::with_clock(Duration::from_secs(60), clock);
        let calls = AtomicUsize::new(0);

        cache.get_or_create(counting_factory(&calls, 1), false);
        assert_eq!(cache.get_or_create(|| None, true), None);

        assert_eq!(cache.peek(), None);
        assert_eq!(cache.get_or_create(counting_factory(&calls, 3), false), Some(3));
    }

    #[test]
    fn invalidate_forces_next_lookup_to_recompute() {
        let (_mock, clock) = MockClock::shared();
        let cache = TtlCache::with_clock(Duration::from_secs(60), clock);
        let calls = AtomicUsize::new(0);

        cache.get_or_create(counting_factory(&calls, 1), false);
        cache.invalidate();

        assert!(cache.age().is_none());
        assert_eq!(cache.get_or_create(counting_factory(&calls, 2), false), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn factory_error_is_surfaced_and_slot_left_empty() {
        let (_mock, clock) = MockClock::shared();
        let cache: TtlCache<u32> = TtlCache::with_clock(Duration::from_secs(60), clock);

        cache.get_or_create(|| Some(1), false);
        let result: Result<Option<u32>, &str> = cache.try_get_or_create(|| Err("scan failed"), true);

        assert_eq!(result, Err("scan failed"));
        assert_eq!(cache.peek(), None);
        assert_eq!(cache.get_or_create(|| Some(5), false), Some(5));
    }

    #[test]
    fn peek_ignores_expired_values() {
        let (mock, clock) = MockClock::shared();
        let cache = TtlCache::with_clock(Duration::from_millis(100), clock);

        cache.get_or_create(|| Some(9), false);
        mock.advance(Duration::from_millis(150));

        assert_eq!(cache.peek(), None);
        assert_eq!(cache.age(), Some(Duration::from_millis(150)));
    }
}
