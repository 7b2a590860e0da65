//! Time source used by every TTL decision in storehouse.
//!
//! - [`ClockProvider`] - Trait for anything that can report the current [`Instant`]
//! - [`Clock`] - Cheap, cloneable handle around a provider (system clock by default)
//! - [`MockClock`] - Manually advanced provider for deterministic tests
//!   (requires the `test-utils` feature)
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use storehouse_core::Clock;
//!
//! let clock = Clock::default();
//! let start = clock.now();
//! assert!(clock.elapsed_since(start) < Duration::from_secs(5));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// ClockProvider Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for providing current time.
///
/// Implement this for custom time providers (e.g., a frozen clock in tests or
/// the host's simulation clock).
///
/// # Example
///
/// ```
/// use std::time::Instant;
/// use storehouse_core::ClockProvider;
///
/// /// A clock that always returns a fixed instant.
/// struct FixedClock(Instant);
///
/// impl ClockProvider for FixedClock {
///     fn now(&self) -> Instant {
///         self.0
///     }
/// }
/// ```
pub trait ClockProvider: Send + Sync + 'static {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// System clock provider using `std::time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
struct SystemClock;

impl ClockProvider for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

/// Shared time provider handle.
///
/// Uses the system clock by default. Caches, contexts and the aggregator all
/// hold a clone of the same `Clock` so a single [`MockClock`] can drive every
/// TTL in a test.
#[derive(Clone)]
pub struct Clock {
    provider: Arc<dyn ClockProvider>,
}

impl Clock {
    /// Creates a Clock using the system clock.
    #[must_use]
    pub fn system() -> Self {
        Self {
            provider: Arc::new(SystemClock),
        }
    }

    /// Creates a Clock with a custom provider.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn ClockProvider>) -> Self {
        Self { provider }
    }

    /// Returns the current instant.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.provider.now()
    }

    /// Returns the duration elapsed since the given instant.
    ///
    /// Saturates to zero if `earlier` lies in the future of this clock.
    #[must_use]
    pub fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl core::fmt::Debug for Clock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Clock").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MockClock for Testing
// ─────────────────────────────────────────────────────────────────────────────

/// Mock clock for testing with controllable time.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use std::time::{Duration, Instant};
/// use storehouse_core::{Clock, MockClock};
///
/// let mock = Arc::new(MockClock::new(Instant::now()));
/// let clock = Clock::with_provider(mock.clone());
///
/// mock.advance(Duration::from_millis(250));
/// ```
#[cfg(any(test, feature = "test-utils"))]
pub struct MockClock {
    current: parking_lot::RwLock<Instant>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockClock {
    /// Creates a mock clock set to the given instant.
    #[must_use]
    pub fn new(start: Instant) -> Self {
        Self {
            current: parking_lot::RwLock::new(start),
        }
    }

    /// Creates a mock clock and a [`Clock`] handle reading from it.
    #[must_use]
    pub fn shared() -> (Arc<Self>, Clock) {
        let mock = Arc::new(Self::new(Instant::now()));
        let clock = Clock::with_provider(mock.clone());
        (mock, clock)
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        *self.current.write() += duration;
    }

    /// Sets the clock to a specific instant.
    pub fn set(&self, instant: Instant) {
        *self.current.write() = instant;
    }

    /// Returns the current instant.
    #[must_use]
    pub fn current(&self) -> Instant {
        *self.current.read()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl ClockProvider for MockClock {
    fn now(&self) -> Instant {
        self.current()
    }
}
