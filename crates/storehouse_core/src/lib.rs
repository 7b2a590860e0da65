//! Core primitives for storehouse (Layer 1).
//!
//! - [`TtlCache`] - Single-slot cache with time-to-live, forced refresh and invalidation
//! - [`InvalidationEpoch`] - Process-wide "world changed" generation counter
//! - [`Clock`] - Time source, mockable for testing
//! - [`TracingSetup`] - Subscriber configuration for hosts and tools
//!
//! # Feature Flags
//!
//! - `test-utils` - Enables [`MockClock`] for deterministic TTL testing
//!
//! # Architecture
//!
//! - **Layer 1** (`storehouse_core`, `storehouse_items`): primitives (this crate)
//! - **Layer 2** (`storehouse_world`): provider model, discovery and configuration
//! - **Layer 3** (`storehouse_aggregate`): aggregation contexts and removal

mod epoch;
mod time;
mod tracing_setup;
mod ttl;

pub use epoch::InvalidationEpoch;
pub use time::{Clock, ClockProvider};
pub use tracing_setup::{TracingFormat, TracingSetup};
pub use ttl::TtlCache;

#[cfg(any(test, feature = "test-utils"))]
pub use time::MockClock;
