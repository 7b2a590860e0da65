//! Priority-ordered removal.
//!
//! [`remove_remaining`] drains stacks of one resource type across the
//! discovered providers, highest priority category first. It is the only
//! code path that mutates provider contents.

use storehouse_items::{ItemCatalog, ResourceTypeId, ResourceUnit, UnitRef};
use storehouse_world::{DiscoveredProviders, ProviderHandle, StorageConfig};

/// What to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalRequest {
    /// Resource type to remove. Must be concrete.
    pub type_id: ResourceTypeId,
    /// How many items to remove. Zero removes nothing.
    pub amount: u32,
    /// Leave stacks carrying modifications untouched.
    pub ignore_modded: bool,
}

/// Removes up to `request.amount` items and returns how many were removed.
///
/// Categories are visited in pull priority order and skipped when disabled in
/// `config`. Within a category, providers are visited in discovery order and
/// units in slot order; providers that no longer exist are skipped.
///
/// Stackable types are taken partially from a unit as needed. A
/// non-stackable unit is taken whole and counts as one item.
///
/// Every provider of a category in which at least one unit changed is
/// marked modified once that category is done. Each mutated unit's removed
/// portion is appended to `removed` when given.
pub fn remove_remaining(
    providers: &DiscoveredProviders,
    config: &StorageConfig,
    catalog: &dyn ItemCatalog,
    request: RemovalRequest,
    mut removed: Option<&mut Vec<ResourceUnit>>,
) -> u32 {
    if request.amount == 0 || !request.type_id.is_concrete() {
        return 0;
    }

    let stackable = catalog.is_stackable(request.type_id);
    let mut still_needed = request.amount;

    for (category, handles) in providers.iter() {
        if still_needed == 0 {
            break;
        }
        if !config.is_category_enabled(category) {
            continue;
        }

        let mutated = drain_category(
            handles,
            request,
            stackable,
            &mut still_needed,
            removed.as_deref_mut(),
        );

        if mutated {
            for handle in handles {
                handle.mark_modified();
            }
            tracing::trace!(%category, still_needed, "category drained");
        }
    }

    request.amount - still_needed
}

/// Drains one category's providers; returns whether any unit changed.
fn drain_category(
    handles: &[ProviderHandle],
    request: RemovalRequest,
    stackable: bool,
    still_needed: &mut u32,
    mut removed: Option<&mut Vec<ResourceUnit>>,
) -> bool {
    let mut mutated = false;

    for handle in handles {
        let Some(units) = handle.live_units() else {
            tracing::trace!(provider = %handle.id(), "provider gone, skipping");
            continue;
        };

        for unit in &units {
            if *still_needed == 0 {
                return mutated;
            }
            let Some(taken) = take_from(unit, request, stackable, *still_needed) else {
                continue;
            };
            mutated = true;

            let consumed = if stackable { taken.quantity } else { 1 };
            let before = *still_needed;
            *still_needed = before.checked_sub(consumed).unwrap_or_else(|| {
                tracing::error!(
                    type_id = %request.type_id,
                    consumed,
                    still_needed = before,
                    "removal overshot the requested amount"
                );
                0
            });

            if let Some(out) = removed.as_deref_mut() {
                out.push(taken);
            }
        }
    }

    mutated
}

fn take_from(
    unit: &UnitRef,
    request: RemovalRequest,
    stackable: bool,
    still_needed: u32,
) -> Option<ResourceUnit> {
    let current = unit.snapshot();
    if current.is_cleared()
        || current.type_id != request.type_id
        || (request.ignore_modded && current.has_modifications)
    {
        return None;
    }

    if stackable {
        unit.take(still_needed)
    } else {
        unit.take_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storehouse_items::StackSizes;
    use storehouse_world::memory::{MemoryProvider, MemoryWorld};
    use storehouse_world::{
        Position, ProviderCategory, ProviderId, ReferencePoint, discover_providers,
    };

    const NAILS: ResourceTypeId = ResourceTypeId::new(5);
    const PICKAXE: ResourceTypeId = ResourceTypeId::new(6);

    fn request(type_id: ResourceTypeId, amount: u32) -> RemovalRequest {
        RemovalRequest {
            type_id,
            amount,
            ignore_modded: false,
        }
    }

    fn discover(world: &MemoryWorld) -> DiscoveredProviders {
        let reference = ReferencePoint::new(1, Position::default());
        discover_providers(world, &reference, &StorageConfig::default())
    }

    fn provider(
        world: &MemoryWorld,
        id: u64,
        category: ProviderCategory,
        units: impl IntoIterator<Item = ResourceUnit>,
    ) -> Arc<MemoryProvider> {
        world.insert(
            MemoryProvider::new(ProviderId(id), category, Position::default()).with_units(units),
        )
    }

    #[test]
    fn zero_amount_and_empty_type_remove_nothing() {
        let world = MemoryWorld::new();
        let bin = provider(&world, 1, ProviderCategory::Collector, [ResourceUnit::new(NAILS, 5)]);
        let providers = discover(&world);
        let config = StorageConfig::default();
        let catalog = StackSizes::new();

        assert_eq!(remove_remaining(&providers, &config, &catalog, request(NAILS, 0), None), 0);
        assert_eq!(
            remove_remaining(&providers, &config, &catalog, request(ResourceTypeId::EMPTY, 3), None),
            0
        );
        assert_eq!(bin.units()[0].quantity, 5);
        assert_eq!(bin.modified_count(), 0);
    }

    #[test]
    fn partial_take_from_stackable_unit() {
        let world = MemoryWorld::new();
        let bin = provider(&world, 1, ProviderCategory::Collector, [ResourceUnit::new(NAILS, 10)]);
        let providers = discover(&world);
        let mut removed = Vec::new();

        let taken = remove_remaining(
            &providers,
            &StorageConfig::default(),
            &StackSizes::new(),
            request(NAILS, 4),
            Some(&mut removed),
        );

        assert_eq!(taken, 4);
        assert_eq!(bin.units()[0].quantity, 6);
        assert_eq!(removed, vec![ResourceUnit::new(NAILS, 4)]);
        assert_eq!(bin.modified_count(), 1);
    }

    #[test]
    fn non_stackable_units_count_as_one() {
        let world = MemoryWorld::new();
        let chest = provider(
            &world,
            1,
            ProviderCategory::LootableContainer,
            [
                ResourceUnit::new(PICKAXE, 1),
                ResourceUnit::new(PICKAXE, 1),
                ResourceUnit::new(PICKAXE, 1),
            ],
        );
        let providers = discover(&world);
        let catalog = StackSizes::new().with(PICKAXE, 1);

        let taken = remove_remaining(
            &providers,
            &StorageConfig::default(),
            &catalog,
            request(PICKAXE, 2),
            None,
        );

        assert_eq!(taken, 2);
        let left: Vec<_> = chest.units().iter().map(|unit| unit.quantity).collect();
        assert_eq!(left, vec![0, 0, 1]);
    }

    #[test]
    fn untouched_categories_are_not_marked() {
        let world = MemoryWorld::new();
        let bin = provider(&world, 1, ProviderCategory::Collector, [ResourceUnit::new(NAILS, 10)]);
        let cargo = provider(&world, 2, ProviderCategory::VehicleCargo, [ResourceUnit::new(NAILS, 10)]);
        let providers = discover(&world);

        let taken = remove_remaining(
            &providers,
            &StorageConfig::default(),
            &StackSizes::new(),
            request(NAILS, 3),
            None,
        );

        assert_eq!(taken, 3);
        assert_eq!(bin.modified_count(), 1);
        assert_eq!(cargo.modified_count(), 0);
    }
}
