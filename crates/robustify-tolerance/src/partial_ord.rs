//! Custom Partial Order Trait
//!
//! This module defines a `PartialOrder` trait which is different to the
//! standard libraries `PartialOrd` trait. Sets are ordered by inclusion,
//! which is the order perturbations are compared in.
//!
//! [`SetMaximalBasis`] maintains an antichain of maximal elements.

use core::fmt;
use std::collections::BTreeSet;

/// Result of a comparison in a partial order between an object `a` and `b`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i8)]
pub enum PartialOrdCompResult {
    /// Two given objects are incomparable
    Incomparable,
    /// First object is smaller than the second one
    Smaller,
    /// Both objects are equal
    Equal,
    /// First object is greater than the second one
    Greater,
}

impl fmt::Display for PartialOrdCompResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartialOrdCompResult::Incomparable => write!(f, "≠"),
            PartialOrdCompResult::Smaller => write!(f, "⊂"),
            PartialOrdCompResult::Equal => write!(f, "=="),
            PartialOrdCompResult::Greater => write!(f, "⊃"),
        }
    }
}

/// Trait for types implementing a partial order
///
/// This trait allows you to specify a custom partial order that does not
/// conflict with the standard [`PartialOrd`] trait.
pub trait PartialOrder {
    /// Compare `self` with `other`
    fn part_cmp(&self, other: &Self) -> PartialOrdCompResult;

    /// Check whether `self` is greater or equal to `other` in the partial order
    fn is_greater_or_equal(&self, other: &Self) -> bool {
        matches!(
            self.part_cmp(other),
            PartialOrdCompResult::Equal | PartialOrdCompResult::Greater
        )
    }

    /// Check whether `self` is smaller or equal to `other` in the partial order
    fn is_smaller_or_equal(&self, other: &Self) -> bool {
        matches!(
            self.part_cmp(other),
            PartialOrdCompResult::Equal | PartialOrdCompResult::Smaller
        )
    }
}

// sets are ordered by inclusion
impl<T: Ord> PartialOrder for BTreeSet<T> {
    fn part_cmp(&self, other: &Self) -> PartialOrdCompResult {
        match self.len().cmp(&other.len()) {
            std::cmp::Ordering::Less if self.is_subset(other) => PartialOrdCompResult::Smaller,
            std::cmp::Ordering::Equal if self == other => PartialOrdCompResult::Equal,
            std::cmp::Ordering::Greater if self.is_superset(other) => {
                PartialOrdCompResult::Greater
            }
            _ => PartialOrdCompResult::Incomparable,
        }
    }
}

/// Set of elements where each element is incomparable to every other element
/// in the set
///
/// Only the maximal elements of everything inserted are kept. An element that
/// is smaller than or equal to a stored element is rejected, inserting an
/// element removes all stored elements smaller than it.
#[derive(Debug, Clone, PartialEq)]
pub struct SetMaximalBasis<T: PartialOrder + Eq> {
    elements: Vec<T>,
}

impl<T: PartialOrder + Eq> SetMaximalBasis<T> {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Check whether `elem` is smaller than or equal to a stored element
    pub fn is_dominated(&self, elem: &T) -> bool {
        self.elements
            .iter()
            .any(|existing| existing.is_greater_or_equal(elem))
    }

    /// Insert `elem` if it is not dominated by a stored element
    ///
    /// Returns `true` if the element has been inserted.
    pub fn insert(&mut self, elem: T) -> bool {
        if self.is_dominated(&elem) {
            return false;
        }

        // remove elements that are smaller than the element we insert
        self.elements
            .retain(|existing| !existing.is_smaller_or_equal(&elem));
        self.elements.push(elem);
        true
    }

    /// Number of stored elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check whether no element is stored
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over the stored elements in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }
}

impl<T: PartialOrder + Eq> Default for SetMaximalBasis<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialOrder + Eq> FromIterator<T> for SetMaximalBasis<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for elem in iter {
            set.insert(elem);
        }
        set
    }
}

impl<T: PartialOrder + Eq> IntoIterator for SetMaximalBasis<T> {
    type Item = T;

    type IntoIter = <Vec<T> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, T: PartialOrder + Eq> IntoIterator for &'a SetMaximalBasis<T> {
    type Item = &'a T;

    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::partial_ord::{PartialOrdCompResult, PartialOrder, SetMaximalBasis};

    #[test]
    fn test_sets_equal() {
        let a = BTreeSet::from([1, 2, 3]);
        let b = BTreeSet::from([3, 2, 1]);

        assert_eq!(a.part_cmp(&b), PartialOrdCompResult::Equal);
        assert!(a.is_greater_or_equal(&b));
        assert!(a.is_smaller_or_equal(&b));
    }

    #[test]
    fn test_sets_subset() {
        let a = BTreeSet::from([1, 2, 3]);
        let b = BTreeSet::from([1, 3]);

        assert_eq!(a.part_cmp(&b), PartialOrdCompResult::Greater);
        assert_eq!(b.part_cmp(&a), PartialOrdCompResult::Smaller);

        assert!(a.is_greater_or_equal(&b));
        assert!(!b.is_greater_or_equal(&a));
        assert!(b.is_smaller_or_equal(&a));

        let empty = BTreeSet::new();
        assert_eq!(empty.part_cmp(&a), PartialOrdCompResult::Smaller);
    }

    #[test]
    fn test_sets_incomparable() {
        let a = BTreeSet::from([1, 2]);
        let b = BTreeSet::from([2, 3]);
        let c = BTreeSet::from([4]);

        assert_eq!(a.part_cmp(&b), PartialOrdCompResult::Incomparable);
        // same size, different elements
        assert_eq!(b.part_cmp(&a), PartialOrdCompResult::Incomparable);
        // larger but not a superset
        assert_eq!(a.part_cmp(&c), PartialOrdCompResult::Incomparable);
        assert!(!a.is_greater_or_equal(&c));
        assert!(!c.is_smaller_or_equal(&a));
    }

    #[test]
    fn test_display_partial_ord_comp_result() {
        assert_eq!(PartialOrdCompResult::Incomparable.to_string(), "≠");
        assert_eq!(PartialOrdCompResult::Equal.to_string(), "==");
        assert_eq!(PartialOrdCompResult::Greater.to_string(), "⊃");
        assert_eq!(PartialOrdCompResult::Smaller.to_string(), "⊂");
    }

    #[test]
    fn test_max_basis_insert() {
        let mut basis = SetMaximalBasis::new();

        assert!(basis.insert(BTreeSet::from([1])));
        assert!(basis.insert(BTreeSet::from([2, 3])));
        // dominates {1}
        assert!(basis.insert(BTreeSet::from([1, 4])));
        // dominated by {2, 3} and equal duplicates
        assert!(!basis.insert(BTreeSet::from([3])));
        assert!(!basis.insert(BTreeSet::from([1, 4])));
        // dominates both
        assert!(basis.insert(BTreeSet::from([1, 2, 3, 4])));

        assert_eq!(basis.len(), 1);
        assert!(!basis.is_empty());
        assert!(basis.is_dominated(&BTreeSet::from([2, 4])));
        assert_eq!(
            basis.into_iter().collect::<Vec<_>>(),
            vec![BTreeSet::from([1, 2, 3, 4])]
        );
    }

    #[test]
    fn test_max_basis_from_iter_is_antichain() {
        let basis = [
            BTreeSet::from([1, 2]),
            BTreeSet::from([1]),
            BTreeSet::from([3]),
            BTreeSet::from([2, 3]),
            BTreeSet::new(),
        ]
        .into_iter()
        .collect::<SetMaximalBasis<_>>();

        let got: BTreeSet<_> = basis.iter().cloned().collect();
        assert_eq!(
            got,
            BTreeSet::from([BTreeSet::from([1, 2]), BTreeSet::from([2, 3])])
        );

        for a in basis.iter() {
            for b in basis.iter() {
                if a != b {
                    assert_eq!(a.part_cmp(b), PartialOrdCompResult::Incomparable);
                }
            }
        }
    }
}
