//! Process-wide entry point.
//!
//! An [`Aggregator`] owns the world binding, the configuration, the shared
//! invalidation epoch and a single [`TtlCache`] slot holding the most recent
//! [`AggregationContext`]. Concurrent `create()` calls on an expired slot are
//! serialized by that slot, so discovery runs once.

use std::sync::Arc;
use storehouse_core::{Clock, InvalidationEpoch, TtlCache};
use storehouse_items::{ItemCatalog, ResourceTypeId, ResourceUnit, StackSizes, TypeFilter, UnitRef};
use storehouse_world::{ConfigError, StorageConfig, World, discover_providers};

use crate::context::{AggregationContext, SharedServices};
use crate::stats::{CacheStats, StatsSnapshot};

/// Builder for [`Aggregator`].
pub struct AggregatorBuilder {
    world: Arc<dyn World>,
    catalog: Arc<dyn ItemCatalog>,
    config: StorageConfig,
    clock: Clock,
    epoch: Arc<InvalidationEpoch>,
}

impl AggregatorBuilder {
    /// Sets the item catalog. Defaults to an empty [`StackSizes`], under
    /// which every type is stackable.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn ItemCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the configuration. Defaults to [`StorageConfig::default`].
    #[must_use]
    pub fn with_config(mut self, config: StorageConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the clock used for every TTL decision.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Shares an existing epoch, e.g. one bumped by host event handlers.
    #[must_use]
    pub fn with_epoch(mut self, epoch: Arc<InvalidationEpoch>) -> Self {
        self.epoch = epoch;
        self
    }

    /// Validates the configuration and builds the aggregator.
    ///
    /// # Errors
    ///
    /// Returns the first configuration invariant that does not hold.
    pub fn build(self) -> Result<Aggregator, ConfigError> {
        self.config.validate()?;

        let contexts = TtlCache::with_clock(self.config.context_ttl(), self.clock.clone());
        tracing::debug!(config = ?self.config, "aggregator built");

        Ok(Aggregator {
            world: self.world,
            config: self.config,
            services: SharedServices {
                clock: self.clock,
                epoch: self.epoch,
                catalog: self.catalog,
                stats: Arc::new(CacheStats::default()),
            },
            contexts,
        })
    }
}

/// Creates and caches aggregation contexts.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use storehouse_aggregate::Aggregator;
/// use storehouse_items::{ResourceTypeId, ResourceUnit};
/// use storehouse_world::memory::{MemoryProvider, MemoryWorld};
/// use storehouse_world::{Position, ProviderCategory, ProviderId, ReferencePoint};
///
/// let world = Arc::new(MemoryWorld::new().with_reference(ReferencePoint::new(1, Position::default())));
/// world.insert(
///     MemoryProvider::new(ProviderId(1), ProviderCategory::LootableContainer, Position::default())
///         .with_units([ResourceUnit::new(ResourceTypeId::new(3), 12)]),
/// );
///
/// let aggregator = Aggregator::builder(world).build().unwrap();
/// let context = aggregator.create("craft", false).unwrap();
///
/// assert_eq!(context.item_count_of(ResourceTypeId::new(3)), 12);
/// assert_eq!(context.remove_remaining(ResourceTypeId::new(3), 5, false, None), 5);
/// ```
pub struct Aggregator {
    world: Arc<dyn World>,
    config: StorageConfig,
    services: SharedServices,
    contexts: TtlCache<Arc<AggregationContext>>,
}

impl Aggregator {
    /// Starts building an aggregator over `world`.
    #[must_use]
    pub fn builder(world: Arc<dyn World>) -> AggregatorBuilder {
        AggregatorBuilder {
            world,
            catalog: Arc::new(StackSizes::new()),
            config: StorageConfig::default(),
            clock: Clock::default(),
            epoch: Arc::new(InvalidationEpoch::new()),
        }
    }

    /// Returns the cached context, or runs discovery for a new one.
    ///
    /// The cached context is reused while it is younger than the context TTL
    /// and `force_refresh` is false. Returns `None` when the world cannot
    /// resolve a reference point; nothing is cached in that case.
    pub fn create(&self, reason: &str, force_refresh: bool) -> Option<Arc<AggregationContext>> {
        let mut discovered = false;
        let context = self.contexts.get_or_create(
            || {
                discovered = true;
                self.discover(reason)
            },
            force_refresh,
        );

        let stats = &self.services.stats;
        match (&context, discovered) {
            (None, _) => stats.record_unavailable(),
            (Some(_), true) => stats.record_context_miss(),
            (Some(_), false) => stats.record_context_hit(),
        }
        context
    }

    /// Drops the cached context and advances the epoch, so existing contexts
    /// re-pull on their next query.
    pub fn invalidate_cache(&self) {
        self.contexts.invalidate();
        let epoch = self.services.epoch.bump();
        tracing::debug!(epoch, "aggregation cache invalidated");
    }

    /// The configuration every new context is built with.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// The epoch shared with every context of this aggregator.
    #[must_use]
    pub fn epoch(&self) -> &Arc<InvalidationEpoch> {
        &self.services.epoch
    }

    /// Current cache counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.services.stats.snapshot()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Convenience queries
    //
    // Each call obtains a context through `create(reason, false)` and falls
    // back to an empty answer when none is available.
    // ─────────────────────────────────────────────────────────────────────────

    /// [`AggregationContext::item_count`], or `0` without a context.
    #[must_use]
    pub fn item_count(&self, reason: &str, filter: &TypeFilter) -> u32 {
        self.create(reason, false)
            .map_or(0, |context| context.item_count(filter))
    }

    /// [`AggregationContext::has_item`], or `false` without a context.
    #[must_use]
    pub fn has_item(&self, reason: &str, filter: &TypeFilter) -> bool {
        self.create(reason, false)
            .is_some_and(|context| context.has_item(filter))
    }

    /// [`AggregationContext::all_available_stacks`], or empty without a
    /// context.
    #[must_use]
    pub fn all_available_stacks(&self, reason: &str, filter: &TypeFilter) -> Vec<UnitRef> {
        self.create(reason, false)
            .map(|context| context.all_available_stacks(filter))
            .unwrap_or_default()
    }

    /// [`AggregationContext::remove_remaining`], or `0` without a context.
    pub fn remove_remaining(
        &self,
        reason: &str,
        type_id: ResourceTypeId,
        amount: u32,
        ignore_modded: bool,
        removed: Option<&mut Vec<ResourceUnit>>,
    ) -> u32 {
        self.create(reason, false).map_or(0, |context| {
            context.remove_remaining(type_id, amount, ignore_modded, removed)
        })
    }

    fn discover(&self, reason: &str) -> Option<Arc<AggregationContext>> {
        let Some(reference) = self.world.resolve_reference_point() else {
            tracing::warn!(reason, "no reference point, aggregation unavailable");
            return None;
        };

        let providers = discover_providers(&*self.world, &reference, &self.config);
        tracing::debug!(
            reason,
            entity = reference.entity_id,
            providers = providers.len(),
            "aggregation context created"
        );

        Some(Arc::new(AggregationContext::new(
            reason,
            reference,
            self.config.clone(),
            providers,
            self.services.clone(),
        )))
    }
}

impl core::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Aggregator")
            .field("config", &self.config)
            .field("epoch", &self.services.epoch.current())
            .field("contexts", &self.contexts)
            .finish_non_exhaustive()
    }
}
