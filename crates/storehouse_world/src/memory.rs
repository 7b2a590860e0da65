//! In-memory world backend.
//!
//! [`MemoryWorld`] and [`MemoryProvider`] implement [`World`] and
//! [`Provider`] over plain vectors. They back the demo binary and the test
//! suites, and double as a reference for host integrations: ownership is a
//! single owner id, "in use by someone else" is a lock flag.
//!
//! # Example
//!
//! ```
//! use storehouse_items::{ResourceTypeId, ResourceUnit};
//! use storehouse_world::memory::{MemoryProvider, MemoryWorld};
//! use storehouse_world::{Position, ProviderCategory, ProviderId, ReferencePoint};
//!
//! let world = MemoryWorld::new()
//!     .with_reference(ReferencePoint::new(7, Position::default()));
//!
//! let crate_ = world.insert(
//!     MemoryProvider::new(ProviderId(1), ProviderCategory::LootableContainer, Position::default())
//!         .with_units([ResourceUnit::new(ResourceTypeId::new(3), 20)]),
//! );
//!
//! assert_eq!(crate_.units()[0].quantity, 20);
//! ```

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use parking_lot::RwLock;
use std::sync::Arc;
use storehouse_items::{ResourceUnit, UnitRef};

use crate::category::ProviderCategory;
use crate::discovery::World;
use crate::provider::{Position, Provider, ProviderId, ReferencePoint};

// ─────────────────────────────────────────────────────────────────────────────
// MemoryProvider
// ─────────────────────────────────────────────────────────────────────────────

/// A provider whose stacks live in a vector.
pub struct MemoryProvider {
    id: ProviderId,
    category: ProviderCategory,
    position: Position,
    owner: Option<u64>,
    player_storage: bool,
    locked: AtomicBool,
    slots: RwLock<Vec<UnitRef>>,
    modified: AtomicUsize,
}

impl MemoryProvider {
    /// Creates an empty, unowned, unlocked provider.
    #[must_use]
    pub fn new(id: ProviderId, category: ProviderCategory, position: Position) -> Self {
        Self {
            id,
            category,
            position,
            owner: None,
            player_storage: true,
            locked: AtomicBool::new(false),
            slots: RwLock::new(Vec::new()),
            modified: AtomicUsize::new(0),
        }
    }

    /// Fills the provider's slots with `units`.
    #[must_use]
    pub fn with_units(self, units: impl IntoIterator<Item = ResourceUnit>) -> Self {
        self.slots.write().extend(units.into_iter().map(UnitRef::new));
        self
    }

    /// Restricts eligibility to a single owning entity.
    #[must_use]
    pub fn with_owner(mut self, entity_id: u64) -> Self {
        self.owner = Some(entity_id);
        self
    }

    /// Marks the provider as world loot (`false`) or player storage (`true`).
    #[must_use]
    pub fn with_player_storage(mut self, player_storage: bool) -> Self {
        self.player_storage = player_storage;
        self
    }

    /// Appends a stack and returns its live reference.
    pub fn add_unit(&self, unit: ResourceUnit) -> UnitRef {
        let unit = UnitRef::new(unit);
        self.slots.write().push(unit.clone());
        unit
    }

    /// Locks or unlocks the provider (e.g. another player has it open).
    pub fn set_locked(&self, locked: bool) {
        self.locked.store(locked, Ordering::Release);
    }

    /// Copies of every stack, in slot order.
    #[must_use]
    pub fn units(&self) -> Vec<ResourceUnit> {
        self.slots.read().iter().map(UnitRef::snapshot).collect()
    }

    /// How many times [`Provider::mark_modified`] was called.
    #[must_use]
    pub fn modified_count(&self) -> usize {
        self.modified.load(Ordering::Acquire)
    }
}

impl Provider for MemoryProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn category(&self) -> ProviderCategory {
        self.category
    }

    fn position(&self) -> Position {
        self.position
    }

    fn is_eligible(&self, reference: &ReferencePoint) -> bool {
        if self.locked.load(Ordering::Acquire) {
            return false;
        }
        self.owner.is_none_or(|owner| owner == reference.entity_id)
    }

    fn is_player_storage(&self) -> bool {
        self.player_storage
    }

    fn live_units(&self) -> Vec<UnitRef> {
        self.slots.read().clone()
    }

    fn mark_modified(&self) {
        self.modified.fetch_add(1, Ordering::AcqRel);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryWorld
// ─────────────────────────────────────────────────────────────────────────────

/// A world holding a reference point and a list of providers.
///
/// Counts its scans, so tests can assert how often discovery ran.
#[derive(Default)]
pub struct MemoryWorld {
    reference: RwLock<Option<ReferencePoint>>,
    providers: RwLock<Vec<Arc<MemoryProvider>>>,
    scans: AtomicUsize,
}

impl MemoryWorld {
    /// Creates a world with no reference point and no providers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reference point.
    #[must_use]
    pub fn with_reference(self, reference: ReferencePoint) -> Self {
        self.set_reference(Some(reference));
        self
    }

    /// Replaces (or clears) the reference point.
    pub fn set_reference(&self, reference: Option<ReferencePoint>) {
        *self.reference.write() = reference;
    }

    /// Adds a provider and returns a shared handle to it.
    pub fn insert(&self, provider: MemoryProvider) -> Arc<MemoryProvider> {
        let provider = Arc::new(provider);
        self.providers.write().push(Arc::clone(&provider));
        provider
    }

    /// Removes a provider; once the returned `Arc` is dropped, discovered
    /// handles to it report it as gone.
    pub fn remove(&self, id: ProviderId) -> Option<Arc<MemoryProvider>> {
        let mut providers = self.providers.write();
        let index = providers.iter().position(|provider| provider.id == id)?;
        Some(providers.remove(index))
    }

    /// Looks up a provider by id.
    #[must_use]
    pub fn provider(&self, id: ProviderId) -> Option<Arc<MemoryProvider>> {
        self.providers
            .read()
            .iter()
            .find(|provider| provider.id == id)
            .cloned()
    }

    /// How many times [`World::scan`] ran.
    #[must_use]
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::Acquire)
    }
}

impl World for MemoryWorld {
    fn resolve_reference_point(&self) -> Option<ReferencePoint> {
        *self.reference.read()
    }

    fn scan(&self, _reference: &ReferencePoint, _range: Option<f32>) -> Vec<Arc<dyn Provider>> {
        self.scans.fetch_add(1, Ordering::AcqRel);
        self.providers
            .read()
            .iter()
            .map(|provider| Arc::clone(provider) as Arc<dyn Provider>)
            .collect()
    }
}
