//! The meta composition of environment, controller and property
//!
//! Two compositions over the same state space are used:
//! - the *completed* meta composition `E_full ∥ (C ∥ P_err)`, containing
//!   every move any perturbation of the environment could introduce,
//! - the *required* meta composition `E[Re] ∥ (C ∥ P_err)`, containing only
//!   the moves every admissible perturbation has to keep.
//!
//! The winning set is computed once: the good states (reachable, accepting
//! states of the completed composition) from which every required move stays
//! good.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};
use robustify_lts::{
    Action, StateId, Transition, TransitionSystem, composition::ParallelComposition, lts::LTS,
};

use crate::{ToleranceProblem, closure::ClosureTable, delta::Delta, winning::WinningSetSolver};

/// State of a meta composition: `(environment, (controller, property))`
pub type MetaState = (StateId, (StateId, StateId));

/// Meta composition over borrowed components
pub type MetaComposition<'a> =
    ParallelComposition<&'a LTS, ParallelComposition<&'a LTS, &'a LTS>>;

/// Project a transition of the meta composition onto the environment
pub fn project_env(t: &Transition<MetaState>) -> Transition<StateId> {
    t.map_states(|s| s.0)
}

/// Completed and required meta compositions together with the derived state
/// sets shared by the searches
#[derive(Debug, Clone)]
pub struct MetaSystem<'a> {
    full: MetaComposition<'a>,
    required: MetaComposition<'a>,
    universe: &'a BTreeSet<Transition<StateId>>,
    moves: BTreeMap<MetaState, Vec<(Action, MetaState)>>,
    good: BTreeSet<MetaState>,
    winning: BTreeSet<MetaState>,
}

impl<'a> MetaSystem<'a> {
    /// Build the meta compositions of `problem` and compute the winning set
    pub fn new(problem: &'a ToleranceProblem) -> Self {
        let ctrl = problem.ctrl();
        let prop_err = problem.checker().prop_err();

        let full = ParallelComposition::new(
            problem.env_full(),
            ParallelComposition::new(ctrl, prop_err),
        );
        let required = ParallelComposition::new(
            problem.env_required(),
            ParallelComposition::new(ctrl, prop_err),
        );

        let reachable = full.reachable_states();
        let moves: BTreeMap<_, _> = reachable
            .iter()
            .map(|s| (*s, full.outgoing(s)))
            .collect();
        let good: BTreeSet<_> = reachable
            .iter()
            .filter(|s| full.is_accepting(s))
            .copied()
            .collect();

        let winning = WinningSetSolver::new(&required).solve(good.iter().copied());

        info!(
            "Meta composition: {} reachable states, {} good states, {} winning states",
            reachable.len(),
            good.len(),
            winning.len()
        );

        Self {
            full,
            required,
            universe: problem.universe(),
            moves,
            good,
            winning,
        }
    }

    /// Initial state of both meta compositions
    pub fn initial_state(&self) -> MetaState {
        self.full.initial_state()
    }

    /// Get the required meta composition
    pub fn required(&self) -> &MetaComposition<'a> {
        &self.required
    }

    /// States reachable in the completed meta composition
    pub fn reachable_states(&self) -> impl Iterator<Item = &MetaState> {
        self.moves.keys()
    }

    /// Reachable, accepting states of the completed meta composition
    pub fn good_states(&self) -> &BTreeSet<MetaState> {
        &self.good
    }

    /// The winning set
    pub fn winning_set(&self) -> &BTreeSet<MetaState> {
        &self.winning
    }

    /// Check whether the initial state is winning, i.e., whether any
    /// admissible perturbation exists
    pub fn initial_is_winning(&self) -> bool {
        self.winning.contains(&self.initial_state())
    }

    /// Moves of the completed meta composition leaving `state`
    pub fn full_moves(&self, state: &MetaState) -> &[(Action, MetaState)] {
        self.moves.get(state).map(Vec::as_slice).unwrap_or_default()
    }

    /// Closure of every reachable state under the required moves
    pub fn closure_table(&self) -> ClosureTable<MetaState> {
        let table = ClosureTable::new(&self.required, self.moves.keys().copied());
        debug!("Computed closures of {} states", table.len());
        table
    }

    /// Environment projections of the completed moves leaving `set`
    pub fn forbidden(&self, set: &BTreeSet<MetaState>) -> BTreeSet<Transition<StateId>> {
        self.projected_moves(set, |target| !set.contains(target))
    }

    /// Environment projections of the completed moves staying within `set`
    pub fn retained(&self, set: &BTreeSet<MetaState>) -> BTreeSet<Transition<StateId>> {
        self.projected_moves(set, |target| set.contains(target))
    }

    /// All transitions of the universe that are not forbidden by `set`
    pub fn candidate(&self, set: &BTreeSet<MetaState>) -> Delta {
        let forbidden = self.forbidden(set);
        self.universe
            .iter()
            .filter(|t| !forbidden.contains(*t))
            .cloned()
            .collect()
    }

    /// Winning states reachable by one completed move from `set` but not
    /// contained in it
    pub fn frontier(&self, set: &BTreeSet<MetaState>) -> BTreeSet<MetaState> {
        set.iter()
            .flat_map(move |s| self.full_moves(s).iter())
            .map(|(_, target)| *target)
            .filter(|target| !set.contains(target) && self.winning.contains(target))
            .collect()
    }

    fn projected_moves<F>(
        &self,
        set: &BTreeSet<MetaState>,
        keep: F,
    ) -> BTreeSet<Transition<StateId>>
    where
        F: Fn(&MetaState) -> bool,
    {
        let keep = &keep;
        set.iter()
            .flat_map(move |s| {
                self.full_moves(s)
                    .iter()
                    .filter(move |(_, target)| keep(target))
                    .map(move |(a, target)| Transition::new(s.0, a.clone(), target.0))
            })
            .collect()
    }
}
