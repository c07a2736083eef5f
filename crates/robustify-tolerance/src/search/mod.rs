//! Strategies searching for maximal deltas
//!
//! Every strategy implements [`DeltaSearch`]. Use [`compute_deltas`] to run
//! the strategy selected in a [`SearchOptions`] object.

use std::{collections::BTreeSet, fmt};

use log::{info, warn};
#[cfg(feature = "config_deserialize")]
use serde::Deserialize;

use robustify_lts::{StateId, Transition};

use crate::{
    ToleranceProblem,
    budget::{BudgetTracker, SearchBudget, SearchResult, SearchStatistics},
    delta::{Delta, DeltaBuilder},
    meta::{MetaState, MetaSystem},
};

pub mod exhaustive;
pub mod heuristic;
pub mod pruned;

use exhaustive::ExhaustiveSearch;
use heuristic::{HeuristicOptions, HeuristicSearch};
use pruned::PrunedSearch;

/// Trait implemented by all delta search strategies
pub trait DeltaSearch {
    /// Name of the strategy
    fn name(&self) -> &'static str;

    /// Search for maximal deltas of `problem` within `budget`
    ///
    /// Every returned delta is sound. If the search is complete, no returned
    /// delta is a subset of another one.
    fn search(&mut self, problem: &ToleranceProblem, budget: SearchBudget) -> SearchResult;
}

/// Available search strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config_deserialize", derive(Deserialize))]
#[cfg_attr(feature = "config_deserialize", serde(rename_all = "lowercase"))]
pub enum Algorithm {
    /// [`ExhaustiveSearch`]
    Exhaustive,
    /// [`PrunedSearch`]
    #[default]
    Pruned,
    /// [`HeuristicSearch`]
    Heuristic,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Exhaustive => write!(f, "exhaustive"),
            Algorithm::Pruned => write!(f, "pruned"),
            Algorithm::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Options of a tolerance computation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "config_deserialize", derive(Deserialize))]
pub struct SearchOptions {
    /// Strategy to use
    #[cfg_attr(feature = "config_deserialize", serde(default))]
    pub algorithm: Algorithm,
    /// Limits of the search
    #[cfg_attr(feature = "config_deserialize", serde(default))]
    pub budget: SearchBudget,
    /// Parameters of the heuristic search
    #[cfg_attr(feature = "config_deserialize", serde(default))]
    pub heuristic: HeuristicOptions,
    /// Evaluate the pruned search in parallel
    #[cfg_attr(feature = "config_deserialize", serde(default))]
    pub parallel: bool,
}

/// Run the strategy selected in `options` on `problem`
pub fn compute_deltas(problem: &ToleranceProblem, options: &SearchOptions) -> SearchResult {
    let mut strategy: Box<dyn DeltaSearch> = match options.algorithm {
        Algorithm::Exhaustive => {
            if options.parallel {
                warn!("The exhaustive search does not support parallel evaluation");
            }
            Box::new(ExhaustiveSearch::new())
        }
        Algorithm::Pruned => Box::new(PrunedSearch::new(options.parallel)),
        Algorithm::Heuristic => Box::new(HeuristicSearch::new(options.heuristic)),
    };

    info!("Starting {} search", strategy.name());
    let result = strategy.search(problem, options.budget);
    info!(
        "Finished {} search ({}): found {} maximal deltas, {}",
        strategy.name(),
        result.status,
        result.deltas.len(),
        result.statistics
    );

    result
}

/// Candidate of the state set `set` if it satisfies both admissibility
/// conditions
///
/// The moves retained inside `set` have to cover the required transitions,
/// and so does the candidate itself.
pub(crate) fn admissible_candidate(
    meta: &MetaSystem<'_>,
    required: &BTreeSet<Transition<StateId>>,
    set: &BTreeSet<MetaState>,
) -> Option<Delta> {
    if !meta.retained(set).is_superset(required) {
        return None;
    }

    let candidate = meta.candidate(set);
    candidate.is_superset(required).then_some(candidate)
}

pub(crate) fn finish_search(
    builder: DeltaBuilder,
    tracker: &BudgetTracker,
    soundness_checks: usize,
    winning_states: usize,
) -> SearchResult {
    SearchResult {
        deltas: builder.into_sorted_vec(),
        status: tracker.status(),
        statistics: SearchStatistics {
            explored_nodes: tracker.nodes(),
            soundness_checks,
            winning_states,
            elapsed: tracker.elapsed(),
        },
    }
}

/// Iterator over all `k` element subsets of `0..n`, each as a sorted vector
/// of indices, in lexicographic order
#[derive(Debug, Clone)]
pub(crate) struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    pub(crate) fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        let k = self.indices.len();
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;

            if self.indices[i] < self.n - k + i {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }

        Some(current)
    }
}
