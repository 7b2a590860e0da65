//! Provider categories and per-category storage.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Kind of resource provider.
///
/// The declaration order is the pull priority: enumeration and removal always
/// visit collectors first and vehicle cargo last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    /// Passive collector devices (water collectors, hives, ...).
    Collector = 0,
    /// Output bins of crafting workstations.
    WorkstationOutput = 1,
    /// Lootable containers such as storage crates.
    LootableContainer = 2,
    /// Cargo holds of vehicles.
    VehicleCargo = 3,
}

impl ProviderCategory {
    /// Every category, in pull priority order.
    pub const ALL: [Self; 4] = [
        Self::Collector,
        Self::WorkstationOutput,
        Self::LootableContainer,
        Self::VehicleCargo,
    ];

    /// Stable snake-case name, used in logs and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collector => "collector",
            Self::WorkstationOutput => "workstation_output",
            Self::LootableContainer => "lootable_container",
            Self::VehicleCargo => "vehicle_cargo",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `T` per [`ProviderCategory`], iterated in pull priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerCategory<T> {
    slots: [T; 4],
}

impl<T> PerCategory<T> {
    /// Builds every slot from its category.
    pub fn from_fn(f: impl FnMut(ProviderCategory) -> T) -> Self {
        Self {
            slots: ProviderCategory::ALL.map(f),
        }
    }

    /// Returns the slot for `category`.
    #[must_use]
    pub fn get(&self, category: ProviderCategory) -> &T {
        &self.slots[category.index()]
    }

    /// Returns the slot for `category` mutably.
    pub fn get_mut(&mut self, category: ProviderCategory) -> &mut T {
        &mut self.slots[category.index()]
    }

    /// Iterates `(category, slot)` pairs in pull priority order.
    pub fn iter(&self) -> impl Iterator<Item = (ProviderCategory, &T)> {
        ProviderCategory::ALL.into_iter().zip(self.slots.iter())
    }

    /// Iterates slots mutably in pull priority order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_declaration_order() {
        let mut sorted = ProviderCategory::ALL;
        sorted.sort();
        assert_eq!(sorted, ProviderCategory::ALL);
        assert_eq!(ProviderCategory::ALL[0], ProviderCategory::Collector);
        assert_eq!(ProviderCategory::ALL[3], ProviderCategory::VehicleCargo);
    }

    #[test]
    fn per_category_iterates_in_priority_order() {
        let names = PerCategory::from_fn(ProviderCategory::as_str);
        let order: Vec<_> = names.iter().map(|(category, name)| (category, *name)).collect();

        assert_eq!(
            order,
            vec![
                (ProviderCategory::Collector, "collector"),
                (ProviderCategory::WorkstationOutput, "workstation_output"),
                (ProviderCategory::LootableContainer, "lootable_container"),
                (ProviderCategory::VehicleCargo, "vehicle_cargo"),
            ]
        );
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&ProviderCategory::WorkstationOutput).expect("serialize");
        assert_eq!(json, "\"workstation_output\"");
    }
}
