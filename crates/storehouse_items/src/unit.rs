//! Resource types, stacks and live stack references.

use core::fmt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// ResourceTypeId
// ─────────────────────────────────────────────────────────────────────────────

/// Identifier for a kind of storable item.
///
/// [`ResourceTypeId::EMPTY`] marks an empty slot. It never names a concrete
/// type: units carrying it are ignored by reads and removals reject it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ResourceTypeId(u32);

impl ResourceTypeId {
    /// The empty-slot id.
    pub const EMPTY: Self = Self(0);

    /// Creates an id from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns `true` for every id except [`EMPTY`](Self::EMPTY).
    #[must_use]
    pub const fn is_concrete(self) -> bool {
        self.0 != 0
    }
}

impl From<u32> for ResourceTypeId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ResourceTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ResourceUnit
// ─────────────────────────────────────────────────────────────────────────────

/// A stack of one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUnit {
    /// Type of every item in the stack.
    pub type_id: ResourceTypeId,
    /// Number of items in the stack.
    pub quantity: u32,
    /// Whether the stack carries attached modifications (mods, dyes, ...).
    #[serde(default)]
    pub has_modifications: bool,
}

impl ResourceUnit {
    /// Creates an unmodified stack.
    #[must_use]
    pub fn new(type_id: ResourceTypeId, quantity: u32) -> Self {
        Self {
            type_id,
            quantity,
            has_modifications: false,
        }
    }

    /// Returns a copy flagged as carrying modifications.
    #[must_use]
    pub fn with_modifications(mut self, has_modifications: bool) -> Self {
        self.has_modifications = has_modifications;
        self
    }

    /// Returns `true` if the stack holds nothing readable.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.quantity == 0 || !self.type_id.is_concrete()
    }

    /// Empties the stack.
    pub fn clear(&mut self) {
        self.type_id = ResourceTypeId::EMPTY;
        self.quantity = 0;
        self.has_modifications = false;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UnitRef
// ─────────────────────────────────────────────────────────────────────────────

/// Live reference to a stack owned by a provider.
///
/// Cloning the reference does not copy the stack: every clone observes and
/// mutates the same storage. The lock belongs to the owning provider's
/// storage; the aggregation engine only takes it for the duration of a single
/// read or decrement.
#[derive(Clone)]
pub struct UnitRef(Arc<Mutex<ResourceUnit>>);

impl UnitRef {
    /// Wraps a stack in a new live reference.
    #[must_use]
    pub fn new(unit: ResourceUnit) -> Self {
        Self(Arc::new(Mutex::new(unit)))
    }

    /// Returns a copy of the stack as it is right now.
    #[must_use]
    pub fn snapshot(&self) -> ResourceUnit {
        self.0.lock().clone()
    }

    /// Returns the stack's type.
    #[must_use]
    pub fn type_id(&self) -> ResourceTypeId {
        self.0.lock().type_id
    }

    /// Returns the stack's current quantity.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.0.lock().quantity
    }

    /// Returns whether the stack carries modifications.
    #[must_use]
    pub fn has_modifications(&self) -> bool {
        self.0.lock().has_modifications
    }

    /// Returns `true` if the stack holds nothing readable.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.0.lock().is_cleared()
    }

    /// Removes up to `amount` items in place.
    ///
    /// Returns a record of what was removed, or `None` if nothing was. A stack
    /// that reaches zero is cleared.
    pub fn take(&self, amount: u32) -> Option<ResourceUnit> {
        let mut unit = self.0.lock();
        let taken = amount.min(unit.quantity);
        if taken == 0 || !unit.type_id.is_concrete() {
            return None;
        }

        let record = ResourceUnit {
            quantity: taken,
            ..unit.clone()
        };
        unit.quantity -= taken;
        if unit.quantity == 0 {
            unit.clear();
        }
        Some(record)
    }

    /// Removes the whole stack, returning what it held.
    pub fn take_all(&self) -> Option<ResourceUnit> {
        let mut unit = self.0.lock();
        if unit.is_cleared() {
            return None;
        }
        let record = unit.clone();
        unit.clear();
        Some(record)
    }

    /// Runs `f` with mutable access to the stack.
    ///
    /// Intended for the owning provider (adding items, swapping slots).
    pub fn update<R>(&self, f: impl FnOnce(&mut ResourceUnit) -> R) -> R {
        f(&mut self.0.lock())
    }

    /// Returns `true` if both references point at the same stack.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<ResourceUnit> for UnitRef {
    fn from(unit: ResourceUnit) -> Self {
        Self::new(unit)
    }
}

impl fmt::Debug for UnitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UnitRef").field(&*self.0.lock()).finish()
    }
}
