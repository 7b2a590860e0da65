//! Aggregated, cached views over many storage containers.
//!
//! Storehouse answers "how many of X can I reach?" across collectors,
//! workstation outputs, containers and vehicle cargo, and removes items from
//! them in a fixed priority order. See [`storehouse_aggregate::Aggregator`]
//! for the entry point.

pub use storehouse_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use storehouse_internal::prelude::*;
}
