//! Tolerance analysis of environment models
//!
//! Given an environment `E`, a controller `C` and a safety property `P` over
//! a shared alphabet, this crate computes maximal sets of transitions between
//! accepting states of `E` (deltas) such that the perturbed environment
//! composed with `C` still satisfies `P`.
//!
//! The entry point is [`ToleranceProblem`], which validates the inputs and
//! precomputes the derived automata. A [`search::DeltaSearch`] strategy then
//! explores the problem:
//! - [`search::exhaustive::ExhaustiveSearch`] enumerates subsets of the
//!   candidate universe and checks each of them,
//! - [`search::pruned::PrunedSearch`] enumerates subsets of the winning set of
//!   the meta composition,
//! - [`search::heuristic::HeuristicSearch`] explores the winning set with a
//!   randomized depth first search.
//!
//! Results of any strategy can be re-verified with
//! [`conformance::verify_deltas`].

use std::{collections::BTreeSet, error, fmt};

use log::info;
use robustify_lts::{
    Action, StateId, Transition, TransitionSystem,
    composition::ParallelComposition,
    deterministic::{DeterministicLTS, PropertyError},
    display::display_set,
    lts::LTS,
};

use crate::{conformance::ConformanceChecker, delta::Delta};

pub mod budget;
pub mod closure;
pub mod conformance;
pub mod delta;
pub mod meta;
pub mod partial_ord;
pub mod search;
pub mod winning;

/// Validated input of the tolerance analysis together with the automata
/// derived from it
#[derive(Debug, Clone)]
pub struct ToleranceProblem {
    /// Environment as given
    env: LTS,
    /// Controller
    ctrl: LTS,
    /// Safety property
    prop: DeterministicLTS,
    /// Completed environment `E_full`
    env_full: LTS,
    /// Environment reduced to the required transitions `E[Re]`
    env_required: LTS,
    /// All triples between accepting states of the environment
    universe: BTreeSet<Transition<StateId>>,
    /// Transitions every delta has to retain (`Re`)
    required: BTreeSet<Transition<StateId>>,
    /// Conformance checker for `C` and `P`
    checker: ConformanceChecker,
}

impl ToleranceProblem {
    /// Validate the inputs and precompute the derived automata
    ///
    /// The alphabets of `env` and `ctrl` must be equal and the alphabet of
    /// `prop` must be contained in them. `prop` has to be deterministic and
    /// complete.
    pub fn new(env: LTS, ctrl: LTS, prop: LTS) -> Result<Self, ToleranceError> {
        Self::check_alphabets(&env, &ctrl, &prop)?;
        let prop = DeterministicLTS::try_from(prop)?;

        let env_ctrl = ParallelComposition::new(&env, &ctrl);
        let reachable = env_ctrl.reachable_states();
        let required: BTreeSet<_> = env_ctrl
            .transitions_from(reachable.iter())
            .iter()
            .map(|t| t.map_states(|s| s.0))
            .filter(|t| env.is_accepting(t.source()) && env.is_accepting(t.target()))
            .collect();

        let universe = env.accepting_universe();
        let env_full = env.completed();
        let env_required = env.perturbed(required.iter());
        let checker = ConformanceChecker::new(ctrl.clone(), &prop);

        info!(
            "Tolerance problem for '{}', '{}' and '{}': {} candidate transitions, {} required transitions",
            env.name(),
            ctrl.name(),
            prop.as_lts().name(),
            universe.len(),
            required.len()
        );

        Ok(Self {
            env,
            ctrl,
            prop,
            env_full,
            env_required,
            universe,
            required,
            checker,
        })
    }

    fn check_alphabets(env: &LTS, ctrl: &LTS, prop: &LTS) -> Result<(), ToleranceError> {
        if env.alphabet() != ctrl.alphabet() {
            return Err(ToleranceError::AlphabetMismatch {
                component: ctrl.name().to_string(),
                reference: env.name().to_string(),
                actions: env
                    .alphabet()
                    .symmetric_difference(ctrl.alphabet())
                    .cloned()
                    .collect(),
            });
        }

        if !prop.alphabet().is_subset(env.alphabet()) {
            return Err(ToleranceError::AlphabetMismatch {
                component: prop.name().to_string(),
                reference: env.name().to_string(),
                actions: prop
                    .alphabet()
                    .difference(env.alphabet())
                    .cloned()
                    .collect(),
            });
        }

        Ok(())
    }

    /// Get the environment
    pub fn env(&self) -> &LTS {
        &self.env
    }

    /// Get the controller
    pub fn ctrl(&self) -> &LTS {
        &self.ctrl
    }

    /// Get the property
    pub fn prop(&self) -> &DeterministicLTS {
        &self.prop
    }

    /// Get the completed environment
    pub fn env_full(&self) -> &LTS {
        &self.env_full
    }

    /// Get the environment restricted to the required transitions
    pub fn env_required(&self) -> &LTS {
        &self.env_required
    }

    /// Get all transitions a delta may contain
    pub fn universe(&self) -> &BTreeSet<Transition<StateId>> {
        &self.universe
    }

    /// Get the transitions every delta has to contain
    pub fn required(&self) -> &BTreeSet<Transition<StateId>> {
        &self.required
    }

    /// Get the conformance checker for the controller and the property
    pub fn checker(&self) -> &ConformanceChecker {
        &self.checker
    }

    /// Substitute `delta` into the environment
    pub fn perturbed_env(&self, delta: &Delta) -> LTS {
        self.env.perturbed(delta)
    }

    /// Check whether the environment perturbed by `delta` conforms
    pub fn is_sound(&self, delta: &Delta) -> bool {
        self.checker.check(&self.perturbed_env(delta)).is_ok()
    }
}

/// Errors that can occur when setting up a [`ToleranceProblem`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToleranceError {
    /// The property is not deterministic or not complete
    MalformedProperty(PropertyError),
    /// The alphabet of a component does not match the alphabet of the
    /// environment
    AlphabetMismatch {
        /// Name of the offending component
        component: String,
        /// Name of the environment
        reference: String,
        /// Actions causing the mismatch
        actions: BTreeSet<Action>,
    },
}

impl From<PropertyError> for ToleranceError {
    fn from(value: PropertyError) -> Self {
        ToleranceError::MalformedProperty(value)
    }
}

impl fmt::Display for ToleranceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToleranceError::MalformedProperty(err) => write!(f, "Malformed property: {err}"),
            ToleranceError::AlphabetMismatch {
                component,
                reference,
                actions,
            } => write!(
                f,
                "Alphabet of '{component}' does not match the alphabet of '{reference}', conflicting actions: {}",
                display_set(actions.iter())
            ),
        }
    }
}

impl error::Error for ToleranceError {}
