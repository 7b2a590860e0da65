//! Aggregated views over many storage providers (Layer 3).
//!
//! - [`Aggregator`] - creates and caches [`AggregationContext`]s, owns the
//!   invalidation epoch
//! - [`AggregationContext`] - one discovery pass plus a lazily pulled item cache
//! - [`remove_remaining`] - priority-ordered removal across providers
//! - [`CacheStats`] / [`StatsSnapshot`] - cache hit and pull counters
//!
//! Two caches sit on top of each other. The aggregator keeps the latest
//! context for the context TTL, so repeated UI and crafting queries share one
//! discovery pass. Each context keeps its last item pull for the shorter item
//! TTL, keyed by the type filter it was pulled with. Any change a host cares
//! about goes through [`Aggregator::invalidate_cache`], which drops the first
//! cache and makes every context's second cache stale.

mod aggregator;
mod context;
mod removal;
mod stats;

pub use aggregator::{Aggregator, AggregatorBuilder};
pub use context::AggregationContext;
pub use removal::{RemovalRequest, remove_remaining};
pub use stats::{CacheStats, StatsSnapshot};
