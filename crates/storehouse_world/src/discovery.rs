//! Provider discovery.
//!
//! The host implements [`World`]: resolving who is asking and returning the
//! providers a cheap spatial query finds near them. [`discover_providers`]
//! turns that raw scan into per-category lists of eligible providers.
//!
//! A provider is kept when all of the following hold:
//!
//! 1. its category is enabled in [`StorageConfig`];
//! 2. it lies within range of the reference point (if a range is set);
//! 3. lootable containers are player storage, when so restricted;
//! 4. the provider's own [`Provider::is_eligible`] check passes;
//! 5. it holds at least one non-empty stack.

use std::sync::Arc;
use storehouse_items::UnitRef;

use crate::category::{PerCategory, ProviderCategory};
use crate::config::StorageConfig;
use crate::provider::{Provider, ProviderHandle, ReferencePoint};

/// The host's view of the game world.
pub trait World: Send + Sync + 'static {
    /// Resolves the player (or equivalent) the aggregated view is built for.
    ///
    /// `None` means no aggregation is possible right now.
    fn resolve_reference_point(&self) -> Option<ReferencePoint>;

    /// Returns candidate providers near `reference`.
    ///
    /// `range` is `None` when unlimited. Implementations may return a
    /// superset; discovery re-checks range, category and eligibility.
    fn scan(&self, reference: &ReferencePoint, range: Option<f32>) -> Vec<Arc<dyn Provider>>;
}

/// Why a scanned provider was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Its category is disabled in the configuration.
    CategoryDisabled,
    /// It lies outside the configured range.
    OutOfRange,
    /// A lootable container that is not player storage, while restricted.
    NotPlayerStorage,
    /// Its own eligibility predicate refused the reference point.
    Ineligible,
    /// It holds no non-empty stack.
    Empty,
}

/// Checks a single provider against the discovery rules.
///
/// # Errors
///
/// Returns the first rule the provider fails.
pub fn check_provider(
    provider: &dyn Provider,
    reference: &ReferencePoint,
    config: &StorageConfig,
) -> Result<(), Rejection> {
    let category = provider.category();

    if !config.is_category_enabled(category) {
        return Err(Rejection::CategoryDisabled);
    }

    if let Some(range) = config.effective_range() {
        if provider.position().distance_squared(&reference.position) > range * range {
            return Err(Rejection::OutOfRange);
        }
    }

    if category == ProviderCategory::LootableContainer
        && config.only_player_storage
        && !provider.is_player_storage()
    {
        return Err(Rejection::NotPlayerStorage);
    }

    if !provider.is_eligible(reference) {
        return Err(Rejection::Ineligible);
    }

    if provider.live_units().iter().all(UnitRef::is_cleared) {
        return Err(Rejection::Empty);
    }

    Ok(())
}

/// Eligible providers grouped by category, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct DiscoveredProviders {
    by_category: PerCategory<Vec<ProviderHandle>>,
}

impl DiscoveredProviders {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handle to its category's list.
    pub fn push(&mut self, handle: ProviderHandle) {
        self.by_category.get_mut(handle.category()).push(handle);
    }

    /// Handles discovered for `category`.
    #[must_use]
    pub fn providers(&self, category: ProviderCategory) -> &[ProviderHandle] {
        self.by_category.get(category)
    }

    /// Iterates `(category, handles)` in pull priority order.
    pub fn iter(&self) -> impl Iterator<Item = (ProviderCategory, &[ProviderHandle])> {
        self.by_category
            .iter()
            .map(|(category, handles)| (category, handles.as_slice()))
    }

    /// Total number of handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().map(|(_, handles)| handles.len()).sum()
    }

    /// Returns `true` if nothing was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of handles per category.
    #[must_use]
    pub fn counts(&self) -> PerCategory<usize> {
        PerCategory::from_fn(|category| self.providers(category).len())
    }
}

impl FromIterator<ProviderHandle> for DiscoveredProviders {
    fn from_iter<I: IntoIterator<Item = ProviderHandle>>(iter: I) -> Self {
        let mut discovered = Self::new();
        for handle in iter {
            discovered.push(handle);
        }
        discovered
    }
}

/// Scans the world around `reference` and keeps the eligible providers.
///
/// Scan order is preserved within each category.
pub fn discover_providers(
    world: &dyn World,
    reference: &ReferencePoint,
    config: &StorageConfig,
) -> DiscoveredProviders {
    let candidates = world.scan(reference, config.effective_range());

    let mut discovered = DiscoveredProviders::new();
    for provider in &candidates {
        match check_provider(&**provider, reference, config) {
            Ok(()) => discovered.push(ProviderHandle::new(provider)),
            Err(rejection) => tracing::trace!(
                provider = %provider.id(),
                category = %provider.category(),
                ?rejection,
                "provider skipped"
            ),
        }
    }

    tracing::debug!(
        entity = reference.entity_id,
        scanned = candidates.len(),
        kept = discovered.len(),
        "providers discovered"
    );

    discovered
}
