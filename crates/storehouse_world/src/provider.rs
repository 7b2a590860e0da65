//! The provider capability interface and the handles discovery hands out.

use core::fmt;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use storehouse_items::UnitRef;

use crate::category::ProviderCategory;

// ─────────────────────────────────────────────────────────────────────────────
// Positions
// ─────────────────────────────────────────────────────────────────────────────

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// East-west axis.
    pub x: f32,
    /// Vertical axis.
    pub y: f32,
    /// North-south axis.
    pub z: f32,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Squared straight-line distance to `other`.
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

/// Who is asking, and from where.
///
/// Resolved once per aggregation context and passed to every eligibility
/// check made during its discovery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Entity id of the player (or player-equivalent) the view is built for.
    pub entity_id: u64,
    /// Where that entity stands.
    pub position: Position,
}

impl ReferencePoint {
    /// Creates a reference point.
    #[must_use]
    pub const fn new(entity_id: u64, position: Position) -> Self {
        Self {
            entity_id,
            position,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Stable identifier of a provider within the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub u64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider-{}", self.0)
    }
}

/// A physical or logical source of stored resources.
///
/// Implemented by the host for each container kind it exposes. All methods
/// are called from the aggregation engine; none of them may call back into
/// it.
pub trait Provider: Send + Sync + 'static {
    /// Stable identifier.
    fn id(&self) -> ProviderId;

    /// Which category this provider belongs to. Must not change over the
    /// provider's lifetime.
    fn category(&self) -> ProviderCategory;

    /// Where the provider sits, for range checks.
    fn position(&self) -> Position;

    /// Ownership, lock and "in use by someone else" checks for `reference`.
    fn is_eligible(&self, reference: &ReferencePoint) -> bool;

    /// Whether this is player-built storage rather than world loot.
    ///
    /// Only consulted for [`ProviderCategory::LootableContainer`] when the
    /// configuration restricts pulling to player storage.
    fn is_player_storage(&self) -> bool {
        true
    }

    /// Live references to every stack the provider currently holds, in slot
    /// order. Empty slots may be included.
    fn live_units(&self) -> Vec<UnitRef>;

    /// Tells the owning subsystem that stacks were changed through a live
    /// reference, so it can persist and redraw.
    fn mark_modified(&self);
}

// ─────────────────────────────────────────────────────────────────────────────
// ProviderHandle
// ─────────────────────────────────────────────────────────────────────────────

/// Non-owning handle to a discovered provider.
///
/// Holding a handle does not keep the provider alive. If the host destroys it
/// between discovery and use, every accessor reports it as gone.
#[derive(Clone)]
pub struct ProviderHandle {
    id: ProviderId,
    category: ProviderCategory,
    provider: Weak<dyn Provider>,
}

impl ProviderHandle {
    /// Creates a handle to `provider`, capturing its id and category.
    #[must_use]
    pub fn new(provider: &Arc<dyn Provider>) -> Self {
        Self {
            id: provider.id(),
            category: provider.category(),
            provider: Arc::downgrade(provider),
        }
    }

    /// The provider's id at discovery time.
    #[must_use]
    pub fn id(&self) -> ProviderId {
        self.id
    }

    /// The provider's category at discovery time.
    #[must_use]
    pub fn category(&self) -> ProviderCategory {
        self.category
    }

    /// Returns the provider if it still exists.
    #[must_use]
    pub fn upgrade(&self) -> Option<Arc<dyn Provider>> {
        self.provider.upgrade()
    }

    /// Returns `true` if the provider still exists.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.provider.strong_count() > 0
    }

    /// Live stacks of the provider, or `None` if it is gone.
    #[must_use]
    pub fn live_units(&self) -> Option<Vec<UnitRef>> {
        self.upgrade().map(|provider| provider.live_units())
    }

    /// Forwards [`Provider::mark_modified`]. Returns `false` if the provider
    /// is gone.
    pub fn mark_modified(&self) -> bool {
        match self.upgrade() {
            Some(provider) => {
                provider.mark_modified();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("alive", &self.is_alive())
            .finish()
    }
}
