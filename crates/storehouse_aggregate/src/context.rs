//! Aggregation contexts.
//!
//! An [`AggregationContext`] is the unit of caching: one discovery pass, a
//! frozen copy of the configuration, and a lazily filled item cache over the
//! discovered providers.
//!
//! # Item cache validity
//!
//! Every query runs the same check before reading the cache:
//!
//! 1. if the shared [`InvalidationEpoch`] moved since the last pull, the cache
//!    is stale and its filter resets to unfiltered;
//! 2. if the last pull is older than the item-cache TTL, the cache is stale;
//! 3. if the cache is valid and its filter is compatible with the request,
//!    it answers the query;
//! 4. otherwise the live stacks are pulled again for the requested filter.
//!
//! Counts are the totals taken at pull time. Listings hand out live
//! [`UnitRef`]s, dropping any that emptied since the pull.

use hashbrown::HashMap;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::{Duration, Instant};
use storehouse_core::{Clock, InvalidationEpoch};
use storehouse_items::{ItemCatalog, ResourceTypeId, ResourceUnit, TypeFilter, UnitRef};
use storehouse_world::{DiscoveredProviders, PerCategory, ReferencePoint, StorageConfig};

use crate::removal::{RemovalRequest, remove_remaining};
use crate::stats::CacheStats;

/// Services every context of one aggregator shares.
#[derive(Clone)]
pub(crate) struct SharedServices {
    pub(crate) clock: Clock,
    pub(crate) epoch: Arc<InvalidationEpoch>,
    pub(crate) catalog: Arc<dyn ItemCatalog>,
    pub(crate) stats: Arc<CacheStats>,
}

// ─────────────────────────────────────────────────────────────────────────────
// ItemCache
// ─────────────────────────────────────────────────────────────────────────────

struct ItemCache {
    valid: bool,
    filter: TypeFilter,
    pulled_at: Option<Instant>,
    epoch: u64,
    per_category: PerCategory<usize>,
    units: Vec<UnitRef>,
    totals: HashMap<ResourceTypeId, u32>,
    total: u32,
}

impl ItemCache {
    fn new(epoch: u64) -> Self {
        Self {
            valid: false,
            filter: TypeFilter::unfiltered(),
            pulled_at: None,
            epoch,
            per_category: PerCategory::default(),
            units: Vec::new(),
            totals: HashMap::new(),
            total: 0,
        }
    }

    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.pulled_at
            .is_none_or(|pulled_at| now.saturating_duration_since(pulled_at) > ttl)
    }

    fn refill(&mut self, providers: &DiscoveredProviders, filter: &TypeFilter) {
        self.units.clear();
        self.totals.clear();
        self.total = 0;

        for (category, handles) in providers.iter() {
            let before = self.units.len();
            for handle in handles {
                let Some(units) = handle.live_units() else {
                    tracing::trace!(provider = %handle.id(), "provider gone, skipping");
                    continue;
                };
                for unit in units {
                    let snapshot = unit.snapshot();
                    if snapshot.is_cleared() || !filter.matches(snapshot.type_id) {
                        continue;
                    }
                    let entry = self.totals.entry(snapshot.type_id).or_insert(0);
                    *entry = entry.saturating_add(snapshot.quantity);
                    self.total = self.total.saturating_add(snapshot.quantity);
                    self.units.push(unit);
                }
            }
            *self.per_category.get_mut(category) = self.units.len() - before;
        }

        self.filter = filter.clone();
        self.valid = true;
    }

    fn count(&self, filter: &TypeFilter) -> u32 {
        if filter.is_unfiltered() {
            return self.total;
        }
        filter
            .iter()
            .filter_map(|type_id| self.totals.get(&type_id))
            .fold(0, |sum, count| sum.saturating_add(*count))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AggregationContext
// ─────────────────────────────────────────────────────────────────────────────

/// One discovery pass and the cached view derived from it.
///
/// Contexts are handed out as `Arc<AggregationContext>` by
/// [`Aggregator::create`](crate::Aggregator::create) and are safe to share
/// across threads; the item cache sits behind its own lock.
pub struct AggregationContext {
    reason: String,
    created_at: Instant,
    reference: ReferencePoint,
    config: StorageConfig,
    providers: DiscoveredProviders,
    services: SharedServices,
    items: Mutex<ItemCache>,
}

impl AggregationContext {
    pub(crate) fn new(
        reason: &str,
        reference: ReferencePoint,
        config: StorageConfig,
        providers: DiscoveredProviders,
        services: SharedServices,
    ) -> Self {
        let created_at = services.clock.now();
        let epoch = services.epoch.current();
        Self {
            reason: reason.to_owned(),
            created_at,
            reference,
            config,
            providers,
            services,
            items: Mutex::new(ItemCache::new(epoch)),
        }
    }

    /// The label given by the caller that created this context.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// When discovery ran.
    #[must_use]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Time since discovery ran.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.services.clock.elapsed_since(self.created_at)
    }

    /// The reference point discovery ran for.
    #[must_use]
    pub fn reference(&self) -> &ReferencePoint {
        &self.reference
    }

    /// The configuration snapshot taken at creation.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// The providers found by discovery.
    #[must_use]
    pub fn providers(&self) -> &DiscoveredProviders {
        &self.providers
    }

    /// Marks this context's item cache stale without touching other contexts.
    pub fn invalidate(&self) {
        self.items.lock().valid = false;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Total quantity of the stacks matching `filter`.
    #[must_use]
    pub fn item_count(&self, filter: &TypeFilter) -> u32 {
        self.pull(filter).count(filter)
    }

    /// Total quantity of one resource type.
    #[must_use]
    pub fn item_count_of(&self, type_id: ResourceTypeId) -> u32 {
        self.item_count(&TypeFilter::from_single_type(type_id))
    }

    /// Whether any stack matches `filter`.
    #[must_use]
    pub fn has_item(&self, filter: &TypeFilter) -> bool {
        self.item_count(filter) > 0
    }

    /// Whether any stack of `type_id` is available.
    #[must_use]
    pub fn has_item_of(&self, type_id: ResourceTypeId) -> bool {
        self.item_count_of(type_id) > 0
    }

    /// Live references to the non-empty stacks matching `filter`, in pull
    /// priority order.
    #[must_use]
    pub fn all_available_stacks(&self, filter: &TypeFilter) -> Vec<UnitRef> {
        let cache = self.pull(filter);
        cache
            .units
            .iter()
            .filter(|unit| {
                let snapshot = unit.snapshot();
                !snapshot.is_cleared() && filter.matches(snapshot.type_id)
            })
            .cloned()
            .collect()
    }

    /// Removes up to `amount` of `type_id`, walking providers in priority
    /// order. See [`remove_remaining`] for the exact rules.
    ///
    /// Removed stacks are appended to `removed` when given. The item cache is
    /// left as is; call [`invalidate`](Self::invalidate) or
    /// [`Aggregator::invalidate_cache`](crate::Aggregator::invalidate_cache)
    /// when fresh counts are needed.
    pub fn remove_remaining(
        &self,
        type_id: ResourceTypeId,
        amount: u32,
        ignore_modded: bool,
        removed: Option<&mut Vec<ResourceUnit>>,
    ) -> u32 {
        let request = RemovalRequest {
            type_id,
            amount,
            ignore_modded,
        };
        let taken = remove_remaining(
            &self.providers,
            &self.config,
            &*self.services.catalog,
            request,
            removed,
        );
        self.services.stats.record_removal(taken);
        tracing::debug!(
            reason = %self.reason,
            type_id = %type_id,
            requested = amount,
            removed = taken,
            "remove_remaining"
        );
        taken
    }

    /// Returns the item cache, re-pulled if it cannot answer `filter`.
    fn pull(&self, filter: &TypeFilter) -> MutexGuard<'_, ItemCache> {
        let mut cache = self.items.lock();
        let now = self.services.clock.now();
        let epoch = self.services.epoch.current();

        if cache.epoch != epoch {
            cache.valid = false;
            cache.filter = TypeFilter::unfiltered();
        }
        if cache.valid && cache.is_expired(now, self.config.item_cache_ttl()) {
            cache.valid = false;
        }
        if cache.valid && cache.filter.is_compatible_with(filter) {
            self.services.stats.record_item_hit();
            tracing::trace!(reason = %self.reason, %filter, "item cache hit");
            return cache;
        }

        cache.refill(&self.providers, filter);
        cache.pulled_at = Some(now);
        cache.epoch = epoch;
        self.services.stats.record_item_pull();

        tracing::debug!(
            reason = %self.reason,
            %filter,
            units = cache.units.len(),
            total = cache.total,
            per_category = ?cache.per_category,
            "item cache pulled"
        );

        cache
    }
}

impl core::fmt::Debug for AggregationContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AggregationContext")
            .field("reason", &self.reason)
            .field("reference", &self.reference)
            .field("providers", &self.providers.len())
            .finish_non_exhaustive()
    }
}
