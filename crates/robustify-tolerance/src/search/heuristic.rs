//! Randomized depth first search over the winning set
//!
//! The search starts with the closure of the initial meta state and grows the
//! explored state set by randomly sampled frontier states. Each node of the
//! search tree yields one locally maximal delta: the candidate of the state
//! set is greedily extended by the remaining universe transitions in a random
//! order, keeping every extension that is still sound.
//!
//! Frontier states are sampled with probability
//!
//! ```text
//! p = target_branching / |frontier| / depth_decay^level
//! ```
//!
//! such that a node has about `target_branching` sampled states close to the
//! root and fewer the deeper the node is.

use std::collections::BTreeSet;

use log::{debug, info, trace, warn};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use robustify_lts::{StateId, Transition};
#[cfg(feature = "config_deserialize")]
use serde::Deserialize;

use crate::{
    ToleranceProblem,
    budget::{BudgetTracker, SearchBudget, SearchResult},
    closure::ClosureTable,
    delta::{Delta, DeltaBuilder},
    meta::{MetaState, MetaSystem},
    search::{DeltaSearch, finish_search},
};

/// Number of sampled frontier states above which a warning is emitted
const SAMPLE_WARNING_THRESHOLD: usize = 15;

/// Maximal number of sampled frontier states per node, all combinations of
/// them become children
const MAX_SAMPLED_STATES: usize = 20;

/// Parameters of the heuristic search
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config_deserialize", derive(Deserialize))]
#[cfg_attr(feature = "config_deserialize", serde(default))]
pub struct HeuristicOptions {
    /// Expected number of sampled frontier states at the root
    pub target_branching: f64,
    /// Factor by which the sampling probability decreases per level
    pub depth_decay: f64,
    /// Seed of the random number generator
    pub seed: u64,
}

impl Default for HeuristicOptions {
    fn default() -> Self {
        Self {
            target_branching: 5.0,
            depth_decay: 2.0,
            seed: 0,
        }
    }
}

impl HeuristicOptions {
    /// Probability with which a frontier state is sampled
    pub fn sampling_probability(&self, frontier_size: usize, level: usize) -> f64 {
        if frontier_size == 0 {
            return 0.0;
        }

        let level = i32::try_from(level).unwrap_or(i32::MAX);
        let p = self.target_branching / frontier_size as f64 / self.depth_decay.powi(level);
        if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
    }
}

/// Randomized heuristic delta search
///
/// The search is deterministic for a fixed random number generator state.
#[derive(Debug, Clone)]
pub struct HeuristicSearch<R: Rng = StdRng> {
    options: HeuristicOptions,
    rng: R,
}

impl HeuristicSearch<StdRng> {
    /// Create a new search seeded with `options.seed`
    pub fn new(options: HeuristicOptions) -> Self {
        Self {
            options,
            rng: StdRng::seed_from_u64(options.seed),
        }
    }
}

impl<R: Rng> HeuristicSearch<R> {
    /// Create a new search using the random number generator `rng`
    ///
    /// The seed in `options` is ignored.
    pub fn with_rng(options: HeuristicOptions, rng: R) -> Self {
        Self { options, rng }
    }
}

impl<R: Rng> DeltaSearch for HeuristicSearch<R> {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn search(&mut self, problem: &ToleranceProblem, budget: SearchBudget) -> SearchResult {
        let mut tracker = BudgetTracker::new(budget);
        let meta = MetaSystem::new(problem);
        let winning_states = meta.winning_set().len();

        if !meta.initial_is_winning() {
            info!("Initial meta state is not winning, no delta exists");
            return finish_search(DeltaBuilder::new(), &tracker, 0, winning_states);
        }

        let closures = meta.closure_table();
        let mut ctx = SearchContext::new(problem, &meta, &closures, &mut self.rng);
        ctx.run(&self.options, &mut tracker);

        info!(
            "Visited {} state sets, performed {} conformance checks",
            ctx.visited.len(),
            ctx.soundness_checks
        );

        finish_search(ctx.builder, &tracker, ctx.soundness_checks, winning_states)
    }
}

/// State of a single run of the heuristic search
struct SearchContext<'a, 'p, R: Rng> {
    problem: &'p ToleranceProblem,
    meta: &'a MetaSystem<'p>,
    closures: &'a ClosureTable<MetaState>,
    universe: Vec<Transition<StateId>>,
    visited: BTreeSet<BTreeSet<MetaState>>,
    builder: DeltaBuilder,
    rng: &'a mut R,
    soundness_checks: usize,
}

impl<'a, 'p, R: Rng> SearchContext<'a, 'p, R> {
    fn new(
        problem: &'p ToleranceProblem,
        meta: &'a MetaSystem<'p>,
        closures: &'a ClosureTable<MetaState>,
        rng: &'a mut R,
    ) -> Self {
        Self {
            problem,
            meta,
            closures,
            universe: problem.universe().iter().cloned().collect(),
            visited: BTreeSet::new(),
            builder: DeltaBuilder::new(),
            rng,
            soundness_checks: 0,
        }
    }

    fn run(&mut self, options: &HeuristicOptions, tracker: &mut BudgetTracker) {
        let mut stack = vec![(BTreeSet::from([self.meta.initial_state()]), 0usize)];

        while let Some((set, level)) = stack.pop() {
            let set = self.closures.close(&set);
            if self.visited.contains(&set) {
                continue;
            }
            if !tracker.allows_depth(level) {
                continue;
            }
            if !tracker.visit_node() {
                break;
            }
            trace!("Exploring set of {} states at level {level}", set.len());

            let candidate = self.meta.candidate(&set);
            if candidate.is_superset(self.problem.required()) {
                let delta = self.make_maximal(candidate);
                if self.builder.add(delta) {
                    debug!("Accumulated {} maximal deltas", self.builder.len());
                }
            }

            let frontier = self.meta.frontier(&set).into_iter().collect::<Vec<_>>();
            let sampled = self.sample(&frontier, level, options);
            for combination in 0..(1usize << sampled.len()) {
                let mut child = set.clone();
                child.extend(
                    sampled
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| combination & (1 << i) != 0)
                        .map(|(_, s)| *s),
                );
                stack.push((child, level + 1));
            }

            self.visited.insert(set);
        }
    }

    /// Sample each frontier state independently
    fn sample(
        &mut self,
        frontier: &[MetaState],
        level: usize,
        options: &HeuristicOptions,
    ) -> Vec<MetaState> {
        let p = options.sampling_probability(frontier.len(), level);
        let mut sampled = frontier
            .iter()
            .filter(|_| self.rng.gen_bool(p))
            .copied()
            .collect::<Vec<_>>();

        if sampled.len() > SAMPLE_WARNING_THRESHOLD {
            warn!(
                "Sampled {} of {} frontier states at level {level}, consider a smaller target branching",
                sampled.len(),
                frontier.len()
            );
        }
        sampled.truncate(MAX_SAMPLED_STATES);
        sampled
    }

    /// Greedily extend the sound `candidate` by universe transitions in a
    /// random order
    fn make_maximal(&mut self, mut candidate: Delta) -> Delta {
        self.universe.shuffle(self.rng);

        for t in self.universe.iter() {
            if candidate.contains(t) {
                continue;
            }

            let mut extended = candidate.clone();
            extended.insert(t.clone());
            self.soundness_checks += 1;
            if self.problem.is_sound(&extended) {
                candidate = extended;
            }
        }

        candidate
    }
}
