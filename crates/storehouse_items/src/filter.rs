//! Immutable resource-type filters.
//!
//! A [`TypeFilter`] is either *unfiltered* (matches every type) or an explicit
//! set of type ids. Filters tag cached item listings, so besides membership
//! they answer two questions:
//!
//! - [`is_equivalent_to`](TypeFilter::is_equivalent_to) - do two filters select
//!   exactly the same types?
//! - [`is_compatible_with`](TypeFilter::is_compatible_with) - can a listing
//!   cached under this filter answer a request made with another one?
//!
//! # Example
//!
//! ```
//! use storehouse_items::{ResourceTypeId, TypeFilter};
//!
//! let wood = ResourceTypeId::new(1);
//! let stone = ResourceTypeId::new(2);
//!
//! let cached = TypeFilter::unfiltered();
//! let request = TypeFilter::from_single_type(wood);
//!
//! assert!(cached.is_compatible_with(&request));
//! assert!(!request.is_compatible_with(&TypeFilter::from_single_type(stone)));
//! ```

use core::fmt;
use hashbrown::HashSet;
use std::sync::Arc;

use crate::unit::ResourceTypeId;

#[derive(Clone)]
enum Selection {
    Unfiltered,
    Types(Arc<HashSet<ResourceTypeId>>),
}

/// Set of resource types, or the wildcard that matches everything.
///
/// Cloning is cheap; the member set is shared. No method mutates an existing
/// filter.
///
/// `TypeFilter` deliberately does not implement `PartialEq`: two empty sets
/// are *not* equivalent, which would break reflexivity.
#[derive(Clone)]
pub struct TypeFilter(Selection);

impl TypeFilter {
    /// The wildcard filter.
    #[must_use]
    pub fn unfiltered() -> Self {
        Self(Selection::Unfiltered)
    }

    /// A filter selecting exactly one type.
    #[must_use]
    pub fn from_single_type(type_id: ResourceTypeId) -> Self {
        Self::from_type_set([type_id])
    }

    /// A filter selecting the given types. Duplicates collapse; an empty
    /// iterator yields a filter that matches nothing.
    #[must_use]
    pub fn from_type_set(type_ids: impl IntoIterator<Item = ResourceTypeId>) -> Self {
        Self(Selection::Types(Arc::new(type_ids.into_iter().collect())))
    }

    /// Returns `true` for the wildcard filter.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        matches!(self.0, Selection::Unfiltered)
    }

    /// Explicit membership test. Always `false` for the wildcard.
    #[must_use]
    pub fn contains(&self, type_id: ResourceTypeId) -> bool {
        match &self.0 {
            Selection::Unfiltered => false,
            Selection::Types(types) => types.contains(&type_id),
        }
    }

    /// Returns `true` if a unit of `type_id` passes this filter.
    #[must_use]
    pub fn matches(&self, type_id: ResourceTypeId) -> bool {
        match &self.0 {
            Selection::Unfiltered => true,
            Selection::Types(types) => types.contains(&type_id),
        }
    }

    /// Number of explicit members; `0` for the wildcard.
    #[must_use]
    pub fn count(&self) -> usize {
        match &self.0 {
            Selection::Unfiltered => 0,
            Selection::Types(types) => types.len(),
        }
    }

    /// Iterates explicit members in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = ResourceTypeId> + '_ {
        let types = match &self.0 {
            Selection::Unfiltered => None,
            Selection::Types(types) => Some(types.iter().copied()),
        };
        types.into_iter().flatten()
    }

    /// Both wildcard, or both non-empty with identical members.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Selection::Unfiltered, Selection::Unfiltered) => true,
            (Selection::Types(lhs), Selection::Types(rhs)) => !lhs.is_empty() && lhs == rhs,
            _ => false,
        }
    }

    /// Whether results cached under `self` can answer `request`.
    ///
    /// A wildcard cache is a superset of any request. An explicit cache only
    /// serves an equivalent request.
    #[must_use]
    pub fn is_compatible_with(&self, request: &Self) -> bool {
        self.is_unfiltered() || self.is_equivalent_to(request)
    }

    /// Returns a new filter selecting the members of both. The wildcard
    /// absorbs everything.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        match (&self.0, &other.0) {
            (Selection::Types(lhs), Selection::Types(rhs)) => {
                Self::from_type_set(lhs.iter().chain(rhs.iter()).copied())
            }
            _ => Self::unfiltered(),
        }
    }
}

impl Default for TypeFilter {
    fn default() -> Self {
        Self::unfiltered()
    }
}

impl From<ResourceTypeId> for TypeFilter {
    fn from(type_id: ResourceTypeId) -> Self {
        Self::from_single_type(type_id)
    }
}

impl FromIterator<ResourceTypeId> for TypeFilter {
    fn from_iter<I: IntoIterator<Item = ResourceTypeId>>(iter: I) -> Self {
        Self::from_type_set(iter)
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Selection::Unfiltered => f.write_str("unfiltered"),
            Selection::Types(types) => {
                let mut sorted: Vec<_> = types.iter().copied().collect();
                sorted.sort_unstable();
                f.write_str("{")?;
                for (index, type_id) in sorted.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{type_id}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl fmt::Debug for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeFilter({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> ResourceTypeId {
        ResourceTypeId::new(raw)
    }

    fn empty() -> TypeFilter {
        TypeFilter::from_type_set(core::iter::empty::<ResourceTypeId>())
    }

    #[test]
    fn unfiltered_matches_everything_but_contains_nothing() {
        let filter = TypeFilter::unfiltered();
        assert!(filter.is_unfiltered());
        assert!(filter.matches(id(42)));
        assert!(!filter.contains(id(42)));
        assert_eq!(filter.count(), 0);
        assert_eq!(filter.iter().count(), 0);
    }

    #[test]
    fn type_set_deduplicates() {
        let filter = TypeFilter::from_type_set([id(1), id(2), id(1)]);
        assert_eq!(filter.count(), 2);
        assert!(filter.contains(id(1)));
        assert!(!filter.matches(id(3)));
    }

    #[test]
    fn empty_set_matches_nothing() {
        let filter = empty();
        assert!(!filter.is_unfiltered());
        assert!(!filter.matches(id(1)));
        assert_eq!(filter.count(), 0);
    }

    #[test]
    fn equivalence_ignores_order() {
        let a = TypeFilter::from_type_set([id(1), id(2)]);
        let b = TypeFilter::from_type_set([id(2), id(1)]);
        assert!(a.is_equivalent_to(&b));
        assert!(TypeFilter::unfiltered().is_equivalent_to(&TypeFilter::unfiltered()));
        assert!(!a.is_equivalent_to(&TypeFilter::unfiltered()));
    }

    #[test]
    fn empty_sets_are_never_equivalent() {
        let nothing = empty();
        assert!(!nothing.is_equivalent_to(&nothing.clone()));
        assert!(!nothing.is_equivalent_to(&empty()));
    }

    #[test]
    fn subset_is_not_equivalent() {
        let pair = TypeFilter::from_type_set([id(1), id(2)]);
        let single = TypeFilter::from_single_type(id(1));
        assert!(!pair.is_equivalent_to(&single));
        assert!(!pair.is_compatible_with(&single));
    }

    #[test]
    fn compatibility_rules() {
        let unfiltered = TypeFilter::unfiltered();
        let a = TypeFilter::from_single_type(id(1));
        let b = TypeFilter::from_single_type(id(2));

        assert!(unfiltered.is_compatible_with(&a));
        assert!(unfiltered.is_compatible_with(&unfiltered));
        assert!(a.is_compatible_with(&TypeFilter::from_single_type(id(1))));
        assert!(!a.is_compatible_with(&b));
        assert!(!a.is_compatible_with(&unfiltered));
    }

    #[test]
    fn union_returns_new_filter() {
        let a = TypeFilter::from_single_type(id(1));
        let b = TypeFilter::from_single_type(id(2));

        let both = a.union(&b);

        assert_eq!(both.count(), 2);
        assert_eq!(a.count(), 1);
        assert!(a.union(&TypeFilter::unfiltered()).is_unfiltered());
    }

    #[test]
    fn display_is_sorted() {
        let filter = TypeFilter::from_type_set([id(9), id(3)]);
        assert_eq!(filter.to_string(), "{#3, #9}");
        assert_eq!(TypeFilter::unfiltered().to_string(), "unfiltered");
    }
}
