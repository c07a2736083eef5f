//! Perturbations of an environment and their maximal accumulation
//!
//! A [`Delta`] is a set of transitions between accepting states of the
//! environment. The [`DeltaBuilder`] collects candidate deltas during a
//! search and only keeps the maximal ones.

use std::{
    collections::{BTreeSet, btree_set},
    fmt,
};

use robustify_lts::{StateId, Transition, display::display_set};

use crate::partial_ord::{PartialOrdCompResult, PartialOrder, SetMaximalBasis};

/// Set of transitions substituted for the transitions between accepting
/// states of the environment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Delta {
    transitions: BTreeSet<Transition<StateId>>,
}

impl Delta {
    /// Create an empty delta
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transitions in the delta
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check whether the delta is empty
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Check whether `t` is part of the delta
    pub fn contains(&self, t: &Transition<StateId>) -> bool {
        self.transitions.contains(t)
    }

    /// Add a transition, returns `false` if it was already contained
    pub fn insert(&mut self, t: Transition<StateId>) -> bool {
        self.transitions.insert(t)
    }

    /// Check whether every transition of `other` is part of `self`
    pub fn is_superset(&self, other: &BTreeSet<Transition<StateId>>) -> bool {
        self.transitions.is_superset(other)
    }

    /// Iterate over the transitions ordered by source, action and target
    pub fn iter(&self) -> btree_set::Iter<'_, Transition<StateId>> {
        self.transitions.iter()
    }

    /// Get the transitions ordered by action, then source, then target
    pub fn sorted_by_action(&self) -> Vec<&Transition<StateId>> {
        let mut sorted = self.transitions.iter().collect::<Vec<_>>();
        sorted.sort_by(|a, b| {
            (a.action(), a.source(), a.target()).cmp(&(b.action(), b.source(), b.target()))
        });
        sorted
    }

    /// Get the underlying set of transitions
    pub fn as_set(&self) -> &BTreeSet<Transition<StateId>> {
        &self.transitions
    }
}

impl From<BTreeSet<Transition<StateId>>> for Delta {
    fn from(transitions: BTreeSet<Transition<StateId>>) -> Self {
        Self { transitions }
    }
}

impl FromIterator<Transition<StateId>> for Delta {
    fn from_iter<I: IntoIterator<Item = Transition<StateId>>>(iter: I) -> Self {
        Self {
            transitions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Delta {
    type Item = &'a Transition<StateId>;

    type IntoIter = btree_set::Iter<'a, Transition<StateId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.transitions.iter()
    }
}

impl PartialOrder for Delta {
    fn part_cmp(&self, other: &Self) -> PartialOrdCompResult {
        self.transitions.part_cmp(&other.transitions)
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", display_set(self.sorted_by_action()))
    }
}

/// Accumulator of deltas that only keeps the maximal ones
///
/// A delta that is a subset of (or equal to) an accumulated delta is
/// discarded, adding a delta removes all accumulated subsets of it.
#[derive(Debug, Clone, Default)]
pub struct DeltaBuilder {
    deltas: SetMaximalBasis<Delta>,
}

impl DeltaBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate to the accumulator
    ///
    /// Returns `true` if the candidate has been stored.
    pub fn add(&mut self, candidate: Delta) -> bool {
        self.deltas.insert(candidate)
    }

    /// Check whether `candidate` is a subset of an accumulated delta
    pub fn is_dominated(&self, candidate: &Delta) -> bool {
        self.deltas.is_dominated(candidate)
    }

    /// Number of accumulated deltas
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// Check whether no delta has been accumulated
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Get the maximal deltas
    pub fn to_set(&self) -> BTreeSet<Delta> {
        self.deltas.iter().cloned().collect()
    }

    /// Consume the builder and return the maximal deltas in a stable order
    pub fn into_sorted_vec(self) -> Vec<Delta> {
        let mut deltas = self.deltas.into_iter().collect::<Vec<_>>();
        deltas.sort_by(|a, b| a.sorted_by_action().cmp(&b.sorted_by_action()));
        deltas
    }
}

/// [`DeltaBuilder`] that can be shared between threads
///
/// Every update, i.e., the dominance check and the conditional insertion, is
/// performed while holding the lock.
#[cfg(feature = "parallel")]
#[derive(Debug, Default)]
pub struct SharedDeltaBuilder {
    inner: parking_lot::Mutex<DeltaBuilder>,
}

#[cfg(feature = "parallel")]
impl SharedDeltaBuilder {
    /// Create an empty shared builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate to the accumulator
    pub fn add(&self, candidate: Delta) -> bool {
        self.inner.lock().add(candidate)
    }

    /// Number of accumulated deltas
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check whether no delta has been accumulated
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Consume the shared builder
    pub fn into_inner(self) -> DeltaBuilder {
        self.inner.into_inner()
    }
}
