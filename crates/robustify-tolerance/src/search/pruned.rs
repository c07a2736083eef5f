//! Exact search over subsets of the winning set
//!
//! Instead of enumerating transition sets, this search enumerates the subsets
//! `S` of the winning set that contain the initial meta state. For each of
//! them, the completed moves leaving `S` are projected onto the environment
//! and removed from the candidate universe. The remaining transitions keep
//! every run inside `S`, which only contains good states, so the candidate is
//! sound without a conformance check.
//!
//! Subsets are enumerated by increasing number of non-initial winning states,
//! such that a depth limit bounds the number of enumerated subsets. Subsets
//! are evaluated in chunks. With the `parallel` feature, a chunk can be
//! evaluated on the rayon thread pool.

use std::collections::BTreeSet;

use log::{debug, info};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use robustify_lts::{StateId, Transition};

use crate::{
    ToleranceProblem,
    budget::{BudgetTracker, SearchBudget, SearchResult},
    delta::{Delta, DeltaBuilder},
    meta::{MetaState, MetaSystem},
    search::{Combinations, DeltaSearch, admissible_candidate, finish_search},
};

#[cfg(feature = "parallel")]
use crate::delta::SharedDeltaBuilder;

/// Number of subsets evaluated at once
const CHUNK_SIZE: usize = 4096;

/// Exact delta search enumerating subsets of the winning set
#[derive(Debug, Clone, Default)]
pub struct PrunedSearch {
    parallel: bool,
}

impl PrunedSearch {
    /// Create a new pruned search, optionally evaluating subsets in parallel
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }
}

impl DeltaSearch for PrunedSearch {
    fn name(&self) -> &'static str {
        "pruned"
    }

    fn search(&mut self, problem: &ToleranceProblem, budget: SearchBudget) -> SearchResult {
        let mut tracker = BudgetTracker::new(budget);
        let meta = MetaSystem::new(problem);
        let winning_states = meta.winning_set().len();

        if !meta.initial_is_winning() {
            info!("Initial meta state is not winning, no delta exists");
            return finish_search(DeltaBuilder::new(), &tracker, 0, winning_states);
        }

        let init = meta.initial_state();
        let others = meta
            .winning_set()
            .iter()
            .filter(|s| **s != init)
            .copied()
            .collect::<Vec<_>>();

        let enumeration = Enumeration {
            meta: &meta,
            required: problem.required(),
            init,
            others,
        };
        info!(
            "Enumerating subsets of {} winning states containing the initial state",
            winning_states
        );

        #[cfg(feature = "parallel")]
        let builder = if self.parallel {
            enumeration.run_parallel(&mut tracker)
        } else {
            enumeration.run_sequential(&mut tracker)
        };
        #[cfg(not(feature = "parallel"))]
        let builder = {
            if self.parallel {
                log::warn!("Built without the `parallel` feature, evaluating subsets sequentially");
            }
            enumeration.run_sequential(&mut tracker)
        };

        finish_search(builder, &tracker, 0, winning_states)
    }
}

/// Enumeration of the subsets of the winning set containing the initial state
struct Enumeration<'m, 'p> {
    meta: &'m MetaSystem<'p>,
    required: &'p BTreeSet<Transition<StateId>>,
    init: MetaState,
    others: Vec<MetaState>,
}

impl Enumeration<'_, '_> {
    /// Subset consisting of the initial state and the states at `indices` of
    /// `others`
    fn subset(&self, indices: &[usize]) -> BTreeSet<MetaState> {
        indices
            .iter()
            .map(|i| self.others[*i])
            .chain([self.init])
            .collect()
    }

    fn evaluate(&self, indices: &[usize]) -> Option<Delta> {
        let set = self.subset(indices);
        let candidate = admissible_candidate(self.meta, self.required, &set);
        if let Some(c) = candidate.as_ref() {
            debug!("Subset {indices:?} yields candidate {c}");
        }
        candidate
    }

    /// Call `f` on consecutive chunks of subsets, ordered by size, until all
    /// subsets have been enumerated or the budget is exhausted
    ///
    /// Subsets are given as indices into `others`.
    fn for_each_chunk<F>(&self, tracker: &mut BudgetTracker, mut f: F)
    where
        F: FnMut(&[Vec<usize>]),
    {
        let n = self.others.len();
        let mut chunk = Vec::with_capacity(CHUNK_SIZE);

        'enumeration: for k in 0..=n {
            if !tracker.allows_depth(k) {
                break;
            }

            for indices in Combinations::new(n, k) {
                if !tracker.visit_node() {
                    break 'enumeration;
                }

                chunk.push(indices);
                if chunk.len() == CHUNK_SIZE {
                    f(&chunk);
                    chunk.clear();
                }
            }
        }

        if !chunk.is_empty() {
            f(&chunk);
        }
    }

    fn run_sequential(&self, tracker: &mut BudgetTracker) -> DeltaBuilder {
        let mut builder = DeltaBuilder::new();
        self.for_each_chunk(tracker, |chunk| {
            for indices in chunk {
                if let Some(candidate) = self.evaluate(indices) {
                    builder.add(candidate);
                }
            }
        });
        builder
    }

    #[cfg(feature = "parallel")]
    fn run_parallel(&self, tracker: &mut BudgetTracker) -> DeltaBuilder {
        let shared = SharedDeltaBuilder::new();
        self.for_each_chunk(tracker, |chunk| {
            chunk.par_iter().for_each(|indices| {
                if let Some(candidate) = self.evaluate(indices) {
                    shared.add(candidate);
                }
            });
        });
        shared.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, time::Duration};

    use robustify_lts::{builder::LTSBuilder, lts::LTS};

    use crate::{
        ToleranceProblem,
        budget::{PartialReason, SearchBudget, SearchStatus},
        search::{DeltaSearch, exhaustive::ExhaustiveSearch},
    };

    use super::PrunedSearch;

    fn lts(name: &str, n: usize, accepting: &[usize], ts: &[(usize, &str, usize)]) -> LTS {
        LTSBuilder::new(name)
            .with_actions(["a", "b"])
            .unwrap()
            .with_states(n)
            .with_accepting(accepting.iter().copied())
            .unwrap()
            .with_transitions(ts.iter().copied())
            .unwrap()
            .build()
            .unwrap()
    }

    /// E: single state looping on `a`, C: chaos, P: never two consecutive `b`
    fn no_double_b() -> ToleranceProblem {
        let env = lts("E", 1, &[0], &[(0, "a", 0)]);
        let ctrl = lts("C", 1, &[0], &[(0, "a", 0), (0, "b", 0)]);
        let prop = lts(
            "P",
            3,
            &[0, 1],
            &[(0, "a", 0), (0, "b", 1), (1, "a", 0), (1, "b", 2), (2, "a", 2), (2, "b", 2)],
        );
        ToleranceProblem::new(env, ctrl, prop).unwrap()
    }

    #[test]
    fn test_no_double_b() {
        let problem = no_double_b();
        let result = PrunedSearch::new(false).search(&problem, SearchBudget::unlimited());

        assert_eq!(result.status, SearchStatus::Complete);
        assert_eq!(result.statistics.winning_states, 2);
        assert_eq!(result.statistics.explored_nodes, 2);
        assert_eq!(
            result.deltas.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
            vec!["{(0, a, 0)}"]
        );
    }

    #[test]
    fn test_agrees_with_exhaustive() {
        // E: 0 -a-> 1 -a-> 0, P forbids `b` after `a`
        let env = lts("E", 2, &[0, 1], &[(0, "a", 1), (1, "a", 0)]);
        let ctrl = lts("C", 1, &[0], &[(0, "a", 0), (0, "b", 0)]);
        let prop = lts(
            "P",
            3,
            &[0, 1],
            &[(0, "a", 1), (0, "b", 0), (1, "a", 1), (1, "b", 2), (2, "a", 2), (2, "b", 2)],
        );
        let problem = ToleranceProblem::new(env, ctrl, prop).unwrap();

        let pruned = PrunedSearch::new(false).search(&problem, SearchBudget::unlimited());
        let exhaustive = ExhaustiveSearch::new().search(&problem, SearchBudget::unlimited());

        assert_eq!(
            pruned.deltas.iter().collect::<BTreeSet<_>>(),
            exhaustive.deltas.iter().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn test_initial_state_not_winning() {
        // the controller immediately performs `b`, which P forbids
        let env = lts("E", 1, &[0], &[(0, "a", 0), (0, "b", 0)]);
        let ctrl = lts("C", 1, &[0], &[(0, "b", 0)]);
        let prop = lts("P", 2, &[0], &[(0, "a", 0), (0, "b", 1), (1, "a", 1), (1, "b", 1)]);
        let problem = ToleranceProblem::new(env, ctrl, prop).unwrap();

        let result = PrunedSearch::new(false).search(&problem, SearchBudget::unlimited());
        assert!(result.deltas.is_empty());
        assert_eq!(result.status, SearchStatus::Complete);
        assert_eq!(result.statistics.winning_states, 0);
    }

    #[test]
    fn test_depth_limit() {
        let problem = no_double_b();
        let result =
            PrunedSearch::new(false).search(&problem, SearchBudget::unlimited().with_max_depth(0));

        // only the initial state alone is evaluated
        assert_eq!(result.statistics.explored_nodes, 1);
        assert_eq!(result.status, SearchStatus::Partial(PartialReason::DepthLimit));
        assert_eq!(result.deltas.len(), 1);
    }

    /// E loops on `a`, C is an `a` cycle of length `n` and P accepts every
    /// trace, so every composite state on the cycle is winning
    fn controller_cycle(n: usize) -> ToleranceProblem {
        let env = lts("E", 1, &[0], &[(0, "a", 0)]);
        let accepting = (0..n).collect::<Vec<_>>();
        let cycle = (0..n).map(|i| (i, "a", (i + 1) % n)).collect::<Vec<_>>();
        let ctrl = lts("C", n, &accepting, &cycle);
        let prop = lts("P", 1, &[0], &[(0, "a", 0), (0, "b", 0)]);
        ToleranceProblem::new(env, ctrl, prop).unwrap()
    }

    #[test]
    fn test_controller_cycle() {
        let problem = controller_cycle(4);
        let result = PrunedSearch::new(false).search(&problem, SearchBudget::unlimited());

        assert_eq!(result.status, SearchStatus::Complete);
        assert_eq!(result.statistics.winning_states, 4);
        assert_eq!(result.statistics.explored_nodes, 8);
        // only the full cycle is closed, `b` is blocked by the controller
        assert_eq!(
            result.deltas.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
            vec!["{(0, a, 0), (0, b, 0)}"]
        );
    }

    #[test]
    fn test_depth_limit_bounds_enumeration() {
        let problem = controller_cycle(40);
        let result =
            PrunedSearch::new(false).search(&problem, SearchBudget::unlimited().with_max_depth(1));

        // the initial state alone and together with each of the 39 others
        assert_eq!(result.statistics.winning_states, 40);
        assert_eq!(result.statistics.explored_nodes, 40);
        assert_eq!(result.status, SearchStatus::Partial(PartialReason::DepthLimit));
        assert!(result.deltas.is_empty());
    }

    #[test]
    fn test_large_winning_set_is_bounded_by_node_limit() {
        let problem = controller_cycle(70);
        let result =
            PrunedSearch::new(false).search(&problem, SearchBudget::unlimited().with_max_nodes(100));

        assert_eq!(result.statistics.winning_states, 70);
        assert_eq!(result.statistics.explored_nodes, 100);
        assert_eq!(result.status, SearchStatus::Partial(PartialReason::NodeLimit));
    }

    #[test]
    fn test_time_limit_beyond_instant_range() {
        let problem = no_double_b();
        let result = PrunedSearch::new(false).search(
            &problem,
            SearchBudget::unlimited().with_time_limit(Duration::from_secs(u64::MAX / 2)),
        );
        assert_eq!(result.status, SearchStatus::Complete);

        let result = PrunedSearch::new(false)
            .search(&problem, SearchBudget::unlimited().with_time_limit(Duration::MAX));
        assert_eq!(result.status, SearchStatus::Complete);
        assert_eq!(result.deltas.len(), 1);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_agrees_with_sequential() {
        let problem = no_double_b();
        let sequential = PrunedSearch::new(false).search(&problem, SearchBudget::unlimited());
        let parallel = PrunedSearch::new(true).search(&problem, SearchBudget::unlimited());

        assert_eq!(sequential.deltas, parallel.deltas);
        assert_eq!(sequential.status, parallel.status);
    }
}
