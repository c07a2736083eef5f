//! Precomputed reachability closures
//!
//! The [`ClosureTable`] stores for each state the set of states reachable
//! from it. The heuristic search uses it to canonicalize state sets: two sets
//! with the same closure are explored only once.

use std::collections::{BTreeMap, BTreeSet};

use robustify_lts::TransitionSystem;

/// Map from a state to all states reachable from it (including itself)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureTable<S: Ord> {
    closures: BTreeMap<S, BTreeSet<S>>,
}

impl<S: Ord + Clone> ClosureTable<S> {
    /// Compute the closures of all `states` under the moves of `ts`
    pub fn new<T, I>(ts: &T, states: I) -> Self
    where
        T: TransitionSystem<State = S>,
        I: IntoIterator<Item = S>,
    {
        let closures = states
            .into_iter()
            .map(|s| {
                let reach = ts.reachable_from([s.clone()]);
                (s, reach)
            })
            .collect();

        Self { closures }
    }

    /// Get the closure of `state`
    ///
    /// Returns `None` if the closure of the state has not been computed.
    pub fn get(&self, state: &S) -> Option<&BTreeSet<S>> {
        self.closures.get(state)
    }

    /// Get the union of the closures of all `states`
    ///
    /// States without a precomputed closure are kept as they are.
    pub fn close<'a, I>(&self, states: I) -> BTreeSet<S>
    where
        I: IntoIterator<Item = &'a S>,
        S: 'a,
    {
        let mut closed = BTreeSet::new();
        for s in states {
            match self.closures.get(s) {
                Some(reach) => closed.extend(reach.iter().cloned()),
                None => {
                    closed.insert(s.clone());
                }
            }
        }
        closed
    }

    /// Number of states with a precomputed closure
    pub fn len(&self) -> usize {
        self.closures.len()
    }

    /// Check whether no closure has been computed
    pub fn is_empty(&self) -> bool {
        self.closures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use robustify_lts::{TransitionSystem, builder::LTSBuilder};

    use super::ClosureTable;

    #[test]
    fn test_closure_matches_direct_traversal() {
        let lts = LTSBuilder::new("g")
            .with_actions(["a", "b"])
            .unwrap()
            .with_states(5)
            .with_transitions([(0, "a", 1), (1, "b", 2), (2, "a", 1), (3, "a", 0), (4, "b", 4)])
            .unwrap()
            .build()
            .unwrap();

        let table = ClosureTable::new(&lts, lts.states());
        assert_eq!(table.len(), 5);
        assert_eq!(table.get(&0), Some(&BTreeSet::from([0, 1, 2])));
        assert_eq!(table.get(&2), Some(&BTreeSet::from([1, 2])));
        assert_eq!(table.get(&4), Some(&BTreeSet::from([4])));

        for s in lts.states() {
            assert_eq!(table.get(&s), Some(&lts.reachable_from([s])));
        }
    }

    #[test]
    fn test_close_union() {
        let lts = LTSBuilder::new("g")
            .with_actions(["a"])
            .unwrap()
            .with_states(4)
            .with_transitions([(0, "a", 1), (2, "a", 3)])
            .unwrap()
            .build()
            .unwrap();

        let table = ClosureTable::new(&lts, [0, 1, 2]);
        assert_eq!(table.close(&[0, 2]), BTreeSet::from([0, 1, 2, 3]));
        // 3 has no precomputed closure
        assert_eq!(table.close(&[3]), BTreeSet::from([3]));
        assert!(table.get(&3).is_none());
        assert!(!table.is_empty());
    }
}
