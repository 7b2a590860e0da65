//! # Storehouse Internal Library
//!
//! Re-exports the core storehouse crates for convenience.

/// Layer 1: clocks, TTL slot, invalidation epoch, tracing setup.
pub use storehouse_core;

/// Layer 1: resource types, stacks and type filters.
pub use storehouse_items;

/// Layer 2: providers, discovery and configuration.
pub use storehouse_world;

/// Layer 3: aggregation contexts and removal.
pub use storehouse_aggregate;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use storehouse_aggregate::{AggregationContext, Aggregator, AggregatorBuilder, StatsSnapshot};
    pub use storehouse_core::{Clock, InvalidationEpoch, TracingFormat, TracingSetup};
    pub use storehouse_items::{
        ItemCatalog, ResourceTypeId, ResourceUnit, StackSizes, TypeFilter, UnitRef,
    };
    pub use storehouse_world::{
        ConfigError, Position, Provider, ProviderCategory, ProviderId, ReferencePoint,
        StorageConfig, World,
    };
}
