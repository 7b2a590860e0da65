//! Shared fixture for aggregation tests.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared fixture, not every test binary uses every helper"
)]

use std::sync::Arc;
use storehouse_aggregate::Aggregator;
use storehouse_core::{Clock, MockClock};
use storehouse_items::{ResourceTypeId, ResourceUnit, StackSizes};
use storehouse_world::memory::{MemoryProvider, MemoryWorld};
use storehouse_world::{Position, ProviderCategory, ProviderId, ReferencePoint, StorageConfig};

pub const WOOD: ResourceTypeId = ResourceTypeId::new(1);
pub const STONE: ResourceTypeId = ResourceTypeId::new(2);
pub const IRON: ResourceTypeId = ResourceTypeId::new(3);
pub const RIFLE: ResourceTypeId = ResourceTypeId::new(40);

pub const PLAYER: u64 = 7;

pub struct Fixture {
    pub world: Arc<MemoryWorld>,
    pub clock: Arc<MockClock>,
    pub handle: Clock,
    pub config: StorageConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let (clock, handle) = MockClock::shared();
        Self {
            world: Arc::new(
                MemoryWorld::new().with_reference(ReferencePoint::new(PLAYER, Position::default())),
            ),
            clock,
            handle,
            config: StorageConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StorageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn provider(
        &self,
        id: u64,
        category: ProviderCategory,
        units: impl IntoIterator<Item = ResourceUnit>,
    ) -> Arc<MemoryProvider> {
        self.world.insert(
            MemoryProvider::new(ProviderId(id), category, Position::default()).with_units(units),
        )
    }

    pub fn aggregator(&self) -> Aggregator {
        Aggregator::builder(self.world.clone())
            .with_config(self.config.clone())
            .with_clock(self.handle.clone())
            .with_catalog(Arc::new(StackSizes::new().with(RIFLE, 1)))
            .build()
            .expect("valid config")
    }
}

pub fn quantities(provider: &MemoryProvider) -> Vec<u32> {
    provider.units().iter().map(|unit| unit.quantity).collect()
}
