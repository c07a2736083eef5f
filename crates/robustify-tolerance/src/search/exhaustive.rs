//! Exhaustive enumeration of candidate deltas
//!
//! Every superset of the required transitions within the candidate universe
//! is checked for conformance. The enumeration starts with the full universe
//! and removes more and more optional transitions, therefore a candidate that
//! is a subset of an already accumulated delta can be skipped without a
//! conformance check.
//!
//! The search space is exponential in the number of optional transitions, it
//! is meant as a reference for small instances.

use log::{debug, info, trace};
use robustify_lts::{StateId, Transition};

use crate::{
    ToleranceProblem,
    budget::{BudgetTracker, SearchBudget, SearchResult},
    delta::{Delta, DeltaBuilder},
    search::{Combinations, DeltaSearch, finish_search},
};

/// Exhaustive delta search
#[derive(Debug, Clone, Default)]
pub struct ExhaustiveSearch;

impl ExhaustiveSearch {
    /// Create a new exhaustive search
    pub fn new() -> Self {
        Self
    }

    fn candidate(
        problem: &ToleranceProblem,
        optional: &[Transition<StateId>],
        removed: &[usize],
    ) -> Delta {
        let kept = optional
            .iter()
            .enumerate()
            .filter(|(i, _)| removed.binary_search(i).is_err())
            .map(|(_, t)| t.clone());

        problem.required().iter().cloned().chain(kept).collect()
    }
}

impl DeltaSearch for ExhaustiveSearch {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn search(&mut self, problem: &ToleranceProblem, budget: SearchBudget) -> SearchResult {
        let mut tracker = BudgetTracker::new(budget);
        let mut builder = DeltaBuilder::new();
        let mut checks = 0;

        let optional = problem
            .universe()
            .difference(problem.required())
            .cloned()
            .collect::<Vec<_>>();
        info!(
            "Enumerating subsets of {} optional transitions",
            optional.len()
        );

        'search: for n_removed in 0..=optional.len() {
            if !tracker.allows_depth(n_removed) {
                break;
            }

            for removed in Combinations::new(optional.len(), n_removed) {
                if !tracker.visit_node() {
                    break 'search;
                }

                let candidate = Self::candidate(problem, &optional, &removed);
                if builder.is_dominated(&candidate) {
                    trace!("Skipping dominated candidate {candidate}");
                    continue;
                }

                checks += 1;
                if problem.is_sound(&candidate) {
                    debug!("Found sound delta {candidate}");
                    builder.add(candidate);
                }
            }
        }

        finish_search(builder, &tracker, checks, 0)
    }
}

#[cfg(test)]
mod tests {
    use robustify_lts::{builder::LTSBuilder, lts::LTS};

    use crate::{
        ToleranceProblem,
        budget::{PartialReason, SearchBudget, SearchStatus},
        search::DeltaSearch,
    };

    use super::ExhaustiveSearch;

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

    /// Two accepting environment states, the property forbids `b` after `a`
    fn problem() -> ToleranceProblem {
        let env = lts("E", 2, &[0, 1], &[(0, "a", 1), (1, "a", 0)]);
        let ctrl = lts("C", 1, &[0], &[(0, "a", 0), (0, "b", 0)]);
        let prop = lts(
            "P",
            3,
            &[0, 1],
            &[(0, "a", 1), (0, "b", 0), (1, "a", 1), (1, "b", 2), (2, "a", 2), (2, "b", 2)],
        );
        ToleranceProblem::new(env, ctrl, prop).unwrap()
    }

    #[test]
    fn test_only_b_free_deltas() {
        let problem = problem();
        let result = ExhaustiveSearch::new().search(&problem, SearchBudget::unlimited());

        // any reachable `b` happens after the required `a`, so no delta may
        // contain a `b` transition, all `a` transitions are fine
        assert_eq!(result.status, SearchStatus::Complete);
        assert_eq!(
            result.deltas.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
            vec!["{(0, a, 0), (0, a, 1), (1, a, 0), (1, a, 1)}"]
        );
        for d in result.deltas.iter() {
            assert!(problem.is_sound(d));
            assert!(d.is_superset(problem.required()));
        }
    }

    #[test]
    fn test_dominated_candidates_are_not_checked() {
        let problem = problem();
        let result = ExhaustiveSearch::new().search(&problem, SearchBudget::unlimited());

        // 6 optional transitions give 64 candidates
        assert_eq!(result.statistics.explored_nodes, 64);
        assert!(result.statistics.soundness_checks < 64);
    }

    #[test]
    fn test_node_limit() {
        let problem = problem();
        let result =
            ExhaustiveSearch::new().search(&problem, SearchBudget::unlimited().with_max_nodes(3));

        assert_eq!(result.status, SearchStatus::Partial(PartialReason::NodeLimit));
        assert_eq!(result.statistics.explored_nodes, 3);
        for d in result.deltas.iter() {
            assert!(problem.is_sound(d));
        }
    }

    #[test]
    fn test_depth_limit() {
        let problem = problem();
        let result =
            ExhaustiveSearch::new().search(&problem, SearchBudget::unlimited().with_max_depth(1));

        assert_eq!(result.status, SearchStatus::Partial(PartialReason::DepthLimit));
        // removing a single transition always leaves some `b` transition
        assert!(result.deltas.is_empty());
    }
}
