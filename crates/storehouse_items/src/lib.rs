//! Item model for storehouse (Layer 1).
//!
//! - [`ResourceTypeId`] / [`ResourceUnit`] - what a stack is
//! - [`UnitRef`] - live, shared reference into a provider's stock
//! - [`TypeFilter`] - immutable type selection with cache-compatibility rules
//! - [`ItemCatalog`] / [`StackSizes`] - stackability lookups for removal

mod catalog;
mod filter;
mod unit;

pub use catalog::{ItemCatalog, StackSizes};
pub use filter::TypeFilter;
pub use unit::{ResourceTypeId, ResourceUnit, UnitRef};
