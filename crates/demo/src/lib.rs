//! Demo base for storehouse.
//!
//! Builds a small in-memory base around one player, then runs a crafting
//! session against it: count, remove, observe stale counts, invalidate,
//! count again.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  Base (player 1 at origin)                                │
//! │                                                           │
//! │  collector ──▶ forge output ──▶ chests ──▶ truck cargo    │
//! │  (drained first)                          (drained last)  │
//! │                                                           │
//! │  a loot crate far away and a stranger's locker are never  │
//! │  discovered                                               │
//! └───────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::sync::Arc;
use storehouse_aggregate::{Aggregator, StatsSnapshot};
use storehouse_items::{ResourceTypeId, ResourceUnit, StackSizes, TypeFilter};
use storehouse_world::memory::{MemoryProvider, MemoryWorld};
use storehouse_world::{Position, ProviderCategory, ProviderId, ReferencePoint};

/// Resource types used by the demo base.
pub mod resources {
    use storehouse_items::ResourceTypeId;

    /// Stackable building material.
    pub const WOOD: ResourceTypeId = ResourceTypeId::new(1);
    /// Stackable building material.
    pub const IRON: ResourceTypeId = ResourceTypeId::new(2);
    /// Non-stackable tool.
    pub const WRENCH: ResourceTypeId = ResourceTypeId::new(30);
}

use resources::{IRON, WOOD, WRENCH};

/// The player the demo base belongs to.
pub const PLAYER: u64 = 1;

/// Builds the demo world.
#[must_use]
pub fn build_world() -> Arc<MemoryWorld> {
    let world = MemoryWorld::new().with_reference(ReferencePoint::new(PLAYER, Position::default()));

    let at = |x: f32, z: f32| Position::new(x, 0.0, z);
    let place = |id: u64, category: ProviderCategory, position: Position| {
        MemoryProvider::new(ProviderId(id), category, position)
    };

    world.insert(
        place(1, ProviderCategory::Collector, at(4.0, 2.0))
            .with_units([ResourceUnit::new(WOOD, 6)]),
    );
    world.insert(
        place(2, ProviderCategory::WorkstationOutput, at(-3.0, 1.0))
            .with_units([ResourceUnit::new(IRON, 12), ResourceUnit::new(WOOD, 2)]),
    );
    world.insert(
        place(3, ProviderCategory::LootableContainer, at(1.0, -5.0)).with_units([
            ResourceUnit::new(WOOD, 40),
            ResourceUnit::new(WRENCH, 1).with_modifications(true),
            ResourceUnit::new(WRENCH, 1),
        ]),
    );
    world.insert(
        place(4, ProviderCategory::LootableContainer, at(2.0, -5.0))
            .with_units([ResourceUnit::new(IRON, 30)]),
    );
    world.insert(
        place(5, ProviderCategory::VehicleCargo, at(10.0, 10.0))
            .with_owner(PLAYER)
            .with_units([ResourceUnit::new(WOOD, 100)]),
    );
    world.insert(
        place(6, ProviderCategory::LootableContainer, at(400.0, 0.0))
            .with_player_storage(false)
            .with_units([ResourceUnit::new(IRON, 500)]),
    );
    world.insert(
        place(7, ProviderCategory::LootableContainer, at(0.0, 3.0))
            .with_owner(PLAYER + 1)
            .with_units([ResourceUnit::new(WOOD, 999)]),
    );

    Arc::new(world)
}

/// The item catalog of the demo base.
#[must_use]
pub fn catalog() -> StackSizes {
    StackSizes::new()
        .with(WOOD, 500)
        .with(IRON, 500)
        .with(WRENCH, 1)
}

/// What a crafting session observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    /// Providers discovered by the first context.
    pub providers: usize,
    /// Items of every type available before crafting.
    pub total_before: u32,
    /// Wood available before crafting.
    pub wood_before: u32,
    /// Iron available before crafting.
    pub iron_before: u32,
    /// Wood removed for the recipe.
    pub wood_removed: u32,
    /// Plain wrenches removed, modded ones protected.
    pub wrenches_removed: u32,
    /// Wood count reported right after removal, before invalidation.
    pub wood_stale: u32,
    /// Wood count after invalidation.
    pub wood_after: u32,
    /// Cache counters at the end of the session.
    pub stats: StatsCounters,
}

/// Serializable copy of [`StatsSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsCounters {
    /// Context cache hits.
    pub context_hits: u64,
    /// Context cache misses.
    pub context_misses: u64,
    /// Item cache hits.
    pub item_cache_hits: u64,
    /// Item cache pulls.
    pub item_cache_pulls: u64,
    /// Items removed.
    pub units_removed: u64,
}

impl From<StatsSnapshot> for StatsCounters {
    fn from(stats: StatsSnapshot) -> Self {
        Self {
            context_hits: stats.context_hits,
            context_misses: stats.context_misses,
            item_cache_hits: stats.item_cache_hits,
            item_cache_pulls: stats.item_cache_pulls,
            units_removed: stats.units_removed,
        }
    }
}

/// Runs a crafting session: a recipe needing `wood_needed` wood and one
/// unmodified wrench.
///
/// Returns `None` when the aggregator has no reference point to work from.
pub fn run_session(aggregator: &Aggregator, wood_needed: u32) -> Option<SessionReport> {
    let context = aggregator.create("crafting", false)?;
    let count = |type_id: ResourceTypeId| {
        aggregator.item_count("crafting", &TypeFilter::from_single_type(type_id))
    };

    let total_before = aggregator.item_count("crafting", &TypeFilter::unfiltered());
    let wood_before = count(WOOD);
    let iron_before = count(IRON);
    tracing::info!(
        total = total_before,
        wood = wood_before,
        iron = iron_before,
        "available before crafting"
    );

    let mut removed = Vec::new();
    let wood_removed =
        aggregator.remove_remaining("crafting", WOOD, wood_needed, false, Some(&mut removed));
    let wrenches_removed =
        aggregator.remove_remaining("crafting", WRENCH, 1, true, Some(&mut removed));
    for unit in &removed {
        tracing::info!(type_id = %unit.type_id, quantity = unit.quantity, "removed");
    }

    let wood_stale = count(WOOD);
    aggregator.invalidate_cache();
    let wood_after = count(WOOD);
    tracing::info!(stale = wood_stale, fresh = wood_after, "wood after crafting");

    Some(SessionReport {
        providers: context.providers().len(),
        total_before,
        wood_before,
        iron_before,
        wood_removed,
        wrenches_removed,
        wood_stale,
        wood_after,
        stats: aggregator.stats().into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use storehouse_core::MockClock;
    use storehouse_world::StorageConfig;

    fn aggregator(config: StorageConfig) -> Aggregator {
        let (_clock, handle) = MockClock::shared();
        Aggregator::builder(build_world())
            .with_clock(handle)
            .with_catalog(Arc::new(catalog()))
            .with_config(config)
            .build()
            .expect("valid config")
    }

    #[test]
    fn session_within_range() {
        let config = StorageConfig {
            range: 100.0,
            ..StorageConfig::default()
        };
        let report = run_session(&aggregator(config), 50).expect("reference point");

        assert_eq!(report.providers, 5);
        assert_eq!(report.total_before, 192);
        assert_eq!(report.wood_before, 148);
        assert_eq!(report.iron_before, 42);
        assert_eq!(report.wood_removed, 50);
        assert_eq!(report.wrenches_removed, 1);
        assert_eq!(report.wood_stale, 148);
        assert_eq!(report.wood_after, 98);
    }

    #[test]
    fn vehicle_cargo_can_be_excluded() {
        let config = StorageConfig {
            range: 100.0,
            ..StorageConfig::default()
        }
        .with_category(ProviderCategory::VehicleCargo, false);

        let report = run_session(&aggregator(config), 60).expect("reference point");

        assert_eq!(report.wood_before, 48);
        assert_eq!(report.wood_removed, 48);
        assert_eq!(report.wood_after, 0);
    }

    #[test]
    fn unlimited_range_includes_distant_loot() {
        let config = StorageConfig::default();
        let report = run_session(&aggregator(config), 1).expect("reference point");

        assert_eq!(report.iron_before, 542);
    }
}
