//! Explicit labelled transition systems
//!
//! This module contains the [`LTS`] type, an explicit automaton with dense
//! integer states, as well as the derived automata the tolerance analysis
//! needs:
//! - [`LTS::completed`] adds every transition between accepting states and
//!   routes all remaining undefined pairs to a trap state,
//! - [`LTS::perturbed`] substitutes the transitions between accepting states,
//! - [`LTS::with_error_sink`] collapses the violating states of a property into
//!   one absorbing error state,
//! - [`LTS::complete_with_error_state`] completes a partial property.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::{Action, StateId, Transition, TransitionSystem, writer::into_fsp};

/// Explicit labelled transition system
///
/// States are integers `0..num_states()`. The transition relation may be
/// nondeterministic and partial. Use the [`crate::builder::LTSBuilder`] to
/// construct a valid automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LTS {
    /// Name of the automaton
    pub(crate) name: String,
    /// Alphabet of the automaton
    pub(crate) alphabet: BTreeSet<Action>,
    /// Initial state
    pub(crate) initial: StateId,
    /// Accepting states
    pub(crate) accepting: BTreeSet<StateId>,
    /// Outgoing transitions indexed by source state
    pub(crate) transitions: Vec<BTreeMap<Action, BTreeSet<StateId>>>,
}

impl LTS {
    /// Get the name of the automaton
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of states
    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }

    /// Get the accepting states
    pub fn accepting_states(&self) -> &BTreeSet<StateId> {
        &self.accepting
    }

    /// Iterate over all transitions, ordered by source, action and target
    pub fn transitions(&self) -> impl Iterator<Item = Transition<StateId>> + '_ {
        self.transitions.iter().enumerate().flat_map(|(src, out)| {
            out.iter().flat_map(move |(a, targets)| {
                targets.iter().map(move |tgt| Transition::new(src, a.clone(), *tgt))
            })
        })
    }

    /// Number of transitions
    pub fn num_transitions(&self) -> usize {
        self.transitions
            .iter()
            .map(|out| out.values().map(|t| t.len()).sum::<usize>())
            .sum()
    }

    /// Check whether a transition is part of the automaton
    pub fn has_transition(&self, t: &Transition<StateId>) -> bool {
        self.transitions
            .get(*t.source())
            .and_then(|out| out.get(t.action()))
            .is_some_and(|targets| targets.contains(t.target()))
    }

    /// Check whether every state has at most one successor per action
    pub fn is_deterministic(&self) -> bool {
        self.first_nondeterministic_pair().is_none()
    }

    /// Check whether every state has a successor for every action of the
    /// alphabet
    pub fn is_complete(&self) -> bool {
        self.first_undefined_pair().is_none()
    }

    /// Get the first `(state, action)` pair with more than one successor
    pub fn first_nondeterministic_pair(&self) -> Option<(StateId, Action)> {
        self.transitions.iter().enumerate().find_map(|(s, out)| {
            out.iter()
                .find(|(_, targets)| targets.len() > 1)
                .map(|(a, _)| (s, a.clone()))
        })
    }

    /// Get the first `(state, action)` pair without a successor
    pub fn first_undefined_pair(&self) -> Option<(StateId, Action)> {
        (0..self.num_states()).find_map(|s| {
            self.alphabet
                .iter()
                .find(|a| self.successors(&s, a).is_empty())
                .map(|a| (s, a.clone()))
        })
    }

    /// Get all triples between accepting states, i.e., every transition a
    /// perturbation of this automaton could possibly contain
    pub fn accepting_universe(&self) -> BTreeSet<Transition<StateId>> {
        let mut universe = BTreeSet::new();
        for src in self.accepting.iter() {
            for a in self.alphabet.iter() {
                for tgt in self.accepting.iter() {
                    universe.insert(Transition::new(*src, a.clone(), *tgt));
                }
            }
        }
        universe
    }

    /// Construct the completed automaton
    ///
    /// The completed automaton has one additional state, the trap state, with
    /// index `num_states()`. It contains
    /// - a transition on every action between every pair of accepting states,
    /// - all transitions of `self` with a non-accepting source or target,
    /// - a transition to the trap state for every remaining undefined pair.
    ///
    /// The trap state is absorbing and not accepting.
    pub fn completed(&self) -> LTS {
        let trap = self.num_states();
        let mut transitions = vec![BTreeMap::new(); trap + 1];

        for t in self.accepting_universe() {
            Self::insert_into(&mut transitions, t);
        }
        for t in self.transitions() {
            if !self.is_accepting(t.source()) || !self.is_accepting(t.target()) {
                Self::insert_into(&mut transitions, t);
            }
        }

        for out in transitions.iter_mut() {
            for a in self.alphabet.iter() {
                out.entry(a.clone())
                    .or_insert_with(|| BTreeSet::from([trap]));
            }
        }

        LTS {
            name: format!("{}_full", self.name),
            alphabet: self.alphabet.clone(),
            initial: self.initial,
            accepting: self.accepting.clone(),
            transitions,
        }
    }

    /// Substitute the transitions between accepting states by `delta`
    ///
    /// Transitions with a non-accepting source or target are kept. Triples in
    /// `delta` must only reference states and actions of `self`.
    pub fn perturbed<'a, I>(&self, delta: I) -> LTS
    where
        I: IntoIterator<Item = &'a Transition<StateId>>,
    {
        let mut transitions = vec![BTreeMap::new(); self.num_states()];

        for t in self.transitions() {
            if !self.is_accepting(t.source()) || !self.is_accepting(t.target()) {
                Self::insert_into(&mut transitions, t);
            }
        }
        for t in delta {
            debug_assert!(*t.source() < self.num_states() && *t.target() < self.num_states());
            debug_assert!(self.alphabet.contains(t.action()));
            Self::insert_into(&mut transitions, t.clone());
        }

        LTS {
            name: self.name.clone(),
            alphabet: self.alphabet.clone(),
            initial: self.initial,
            accepting: self.accepting.clone(),
            transitions,
        }
    }

    /// Remove every transition with a non-accepting source or target
    pub fn accepting_only(&self) -> LTS {
        let mut transitions = vec![BTreeMap::new(); self.num_states()];
        for t in self.transitions() {
            if self.is_accepting(t.source()) && self.is_accepting(t.target()) {
                Self::insert_into(&mut transitions, t);
            }
        }

        LTS {
            name: self.name.clone(),
            alphabet: self.alphabet.clone(),
            initial: self.initial,
            accepting: self.accepting.clone(),
            transitions,
        }
    }

    /// Collapse all non-accepting states into one absorbing error state
    ///
    /// The error state gets index `num_states()`, every transition into a
    /// non-accepting state is redirected to it and it loops on every action.
    /// The former non-accepting states are kept, but move to the error state
    /// on every action.
    /// Used on (deterministic, complete) safety properties: once the property
    /// is violated, the composition stays violated.
    pub fn with_error_sink(&self) -> LTS {
        let error = self.num_states();
        let redirect = |s: StateId| if self.is_accepting(&s) { s } else { error };

        let mut transitions = vec![BTreeMap::new(); error + 1];
        for t in self.transitions() {
            if self.is_accepting(t.source()) {
                Self::insert_into(&mut transitions, t.map_states(|s| redirect(*s)));
            }
        }
        for s in (0..=error).filter(|s| !self.is_accepting(s)) {
            for a in self.alphabet.iter() {
                Self::insert_into(&mut transitions, Transition::new(s, a.clone(), error));
            }
        }

        LTS {
            name: format!("{}_err", self.name),
            alphabet: self.alphabet.clone(),
            initial: redirect(self.initial),
            accepting: self.accepting.clone(),
            transitions,
        }
    }

    /// Complete the automaton by routing every undefined `(state, action)`
    /// pair into a new, absorbing, non-accepting error state
    ///
    /// This is the usual reading of a partial safety property, where a missing
    /// transition denotes a violation. It is never applied implicitly.
    pub fn complete_with_error_state(&self) -> LTS {
        let error = self.num_states();
        let mut transitions = self.transitions.clone();
        transitions.push(BTreeMap::new());

        for out in transitions.iter_mut() {
            for a in self.alphabet.iter() {
                out.entry(a.clone())
                    .or_insert_with(|| BTreeSet::from([error]));
            }
        }

        LTS {
            name: self.name.clone(),
            alphabet: self.alphabet.clone(),
            initial: self.initial,
            accepting: self.accepting.clone(),
            transitions,
        }
    }

    fn insert_into(transitions: &mut [BTreeMap<Action, BTreeSet<StateId>>], t: Transition<StateId>) {
        let Transition {
            source,
            action,
            target,
        } = t;
        transitions[source].entry(action).or_default().insert(target);
    }
}

impl TransitionSystem for LTS {
    type State = StateId;

    fn alphabet(&self) -> &BTreeSet<Action> {
        &self.alphabet
    }

    fn initial_state(&self) -> Self::State {
        self.initial
    }

    fn states(&self) -> Vec<Self::State> {
        (0..self.num_states()).collect()
    }

    fn is_accepting(&self, state: &Self::State) -> bool {
        self.accepting.contains(state)
    }

    fn successors(&self, state: &Self::State, action: &Action) -> Vec<Self::State> {
        self.transitions
            .get(*state)
            .and_then(|out| out.get(action))
            .map(|targets| targets.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for LTS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", into_fsp(self))
    }
}
