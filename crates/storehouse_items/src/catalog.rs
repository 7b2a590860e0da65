//! Static item knowledge the removal engine needs.

use hashbrown::HashMap;

use crate::unit::ResourceTypeId;

/// Read-only item definitions supplied by the host.
pub trait ItemCatalog: Send + Sync + 'static {
    /// Whether several items of `type_id` share one stack.
    ///
    /// Non-stackable stacks are always removed whole.
    fn is_stackable(&self, type_id: ResourceTypeId) -> bool;
}

/// Catalog backed by a table of maximum stack sizes.
///
/// A type is stackable when its maximum stack size is greater than one.
/// Types missing from the table are treated as stackable.
///
/// # Example
///
/// ```
/// use storehouse_items::{ItemCatalog, ResourceTypeId, StackSizes};
///
/// let pickaxe = ResourceTypeId::new(10);
/// let nails = ResourceTypeId::new(11);
///
/// let catalog = StackSizes::new().with(pickaxe, 1).with(nails, 500);
///
/// assert!(!catalog.is_stackable(pickaxe));
/// assert!(catalog.is_stackable(nails));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StackSizes {
    max_stack: HashMap<ResourceTypeId, u32>,
}

impl StackSizes {
    /// Creates an empty table (everything stackable).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table with `type_id` limited to `max_stack` items per stack.
    #[must_use]
    pub fn with(mut self, type_id: ResourceTypeId, max_stack: u32) -> Self {
        self.insert(type_id, max_stack);
        self
    }

    /// Sets the maximum stack size of `type_id`.
    pub fn insert(&mut self, type_id: ResourceTypeId, max_stack: u32) {
        self.max_stack.insert(type_id, max_stack);
    }

    /// Returns the maximum stack size of `type_id`, if known.
    #[must_use]
    pub fn max_stack(&self, type_id: ResourceTypeId) -> Option<u32> {
        self.max_stack.get(&type_id).copied()
    }
}

impl FromIterator<(ResourceTypeId, u32)> for StackSizes {
    fn from_iter<I: IntoIterator<Item = (ResourceTypeId, u32)>>(iter: I) -> Self {
        Self {
            max_stack: iter.into_iter().collect(),
        }
    }
}

impl ItemCatalog for StackSizes {
    fn is_stackable(&self, type_id: ResourceTypeId) -> bool {
        self.max_stack(type_id).is_none_or(|max| max > 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_types_are_stackable() {
        let catalog = StackSizes::new();
        assert!(catalog.is_stackable(ResourceTypeId::new(3)));
    }

    #[test]
    fn single_item_stacks_are_not_stackable() {
        let catalog: StackSizes = [(ResourceTypeId::new(1), 1), (ResourceTypeId::new(2), 6000)]
            .into_iter()
            .collect();

        assert!(!catalog.is_stackable(ResourceTypeId::new(1)));
        assert!(catalog.is_stackable(ResourceTypeId::new(2)));
        assert_eq!(catalog.max_stack(ResourceTypeId::new(2)), Some(6000));
    }
}
