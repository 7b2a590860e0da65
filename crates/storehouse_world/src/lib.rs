//! Provider model, discovery and configuration for storehouse (Layer 2).
//!
//! - [`ProviderCategory`] / [`PerCategory`] - the fixed pull priority order
//! - [`Provider`] / [`ProviderHandle`] - capability interface and weak handles
//! - [`World`] / [`discover_providers`] - host world access and eligibility filtering
//! - [`StorageConfig`] - JSON-backed runtime configuration
//! - [`memory`] - in-memory backend for demos and tests

mod category;
mod config;
mod discovery;
pub mod memory;
mod provider;

pub use category::{PerCategory, ProviderCategory};
pub use config::{ConfigError, StorageConfig};
pub use discovery::{DiscoveredProviders, Rejection, World, check_provider, discover_providers};
pub use provider::{Position, Provider, ProviderHandle, ProviderId, ReferencePoint};
