//! A library to represent and compose labelled transition systems
//!
//! This crate contains the types used to represent the finite automata that
//! the tolerance analysis works on. In particular, it contains:
//! - [`TransitionSystem`]: the common capability interface of every automaton
//!   flavor (explicit automata as well as synchronous products)
//! - [`lts::LTS`]: an explicit, integer indexed, possibly nondeterministic
//!   labelled transition system
//! - [`deterministic::DeterministicLTS`]: a validated deterministic and
//!   complete automaton, as required for safety properties
//! - [`composition::ParallelComposition`]: the synchronous product of two
//!   transition systems
//!
//! Explicit automata should be constructed with the
//! [`builder::LTSBuilder`], which validates states and actions.

use std::{
    collections::{BTreeSet, VecDeque},
    fmt::{self, Debug},
    hash::Hash,
};

pub mod builder;
pub mod composition;
pub mod deterministic;
pub mod display;
pub mod lts;
pub mod writer;

#[cfg(feature = "dot")]
pub mod dot;

/// Index of a state in an explicit automaton
///
/// States of an explicit automaton are always dense and start at 0.
pub type StateId = usize;

/// Label of a transition
///
/// Actions are compared by their name. Alphabets are ordered sets of actions,
/// therefore iterating over an alphabet always yields the actions ordered by
/// name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Action(String);

impl Action {
    /// Create a new action with the given name
    pub fn new(name: impl ToString) -> Self {
        Action(name.to_string())
    }

    /// Get the name of the action
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Action {
    fn from(value: &str) -> Self {
        Action::new(value)
    }
}

/// A single transition `(source, action, target)`
///
/// Transitions are the unit of both the transition relation of an automaton
/// and of the perturbations computed by the tolerance analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Transition<S> {
    source: S,
    action: Action,
    target: S,
}

impl<S> Transition<S> {
    /// Create a new transition
    pub fn new(source: S, action: impl Into<Action>, target: S) -> Self {
        Self {
            source,
            action: action.into(),
            target,
        }
    }

    /// Source state of the transition
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Label of the transition
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Target state of the transition
    pub fn target(&self) -> &S {
        &self.target
    }

    /// Apply `f` to source and target, keeping the action
    ///
    /// This is used to project transitions of a product onto one of its
    /// components.
    pub fn map_states<T, F: Fn(&S) -> T>(&self, f: F) -> Transition<T> {
        Transition {
            source: f(&self.source),
            action: self.action.clone(),
            target: f(&self.target),
        }
    }
}

impl<S: fmt::Display> fmt::Display for Transition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.source, self.action, self.target)
    }
}

/// Common interface of all automata
///
/// The trait is implemented by explicit automata ([`lts::LTS`],
/// [`deterministic::DeterministicLTS`]) as well as by synchronous products
/// ([`composition::ParallelComposition`]), which allows algorithms like
/// reachability or fixpoint computations to be written once for all of them.
pub trait TransitionSystem {
    /// Type of the states of the transition system
    type State: Clone + Debug + Eq + Hash + Ord;

    /// Get the alphabet of the transition system
    fn alphabet(&self) -> &BTreeSet<Action>;

    /// Get the initial state
    fn initial_state(&self) -> Self::State;

    /// Get all states of the transition system
    ///
    /// For products this is the full cartesian product of the component
    /// states, not only the reachable ones.
    fn states(&self) -> Vec<Self::State>;

    /// Check whether `state` is accepting
    fn is_accepting(&self, state: &Self::State) -> bool;

    /// Get the successors of `state` under `action`
    ///
    /// Returns an empty vector if the transition is undefined.
    fn successors(&self, state: &Self::State, action: &Action) -> Vec<Self::State>;

    /// Get all outgoing transitions of `state` as `(action, target)` pairs
    fn outgoing(&self, state: &Self::State) -> Vec<(Action, Self::State)> {
        self.alphabet()
            .iter()
            .flat_map(|a| {
                self.successors(state, a)
                    .into_iter()
                    .map(move |t| (a.clone(), t))
            })
            .collect()
    }

    /// Get all states reachable from any of the states in `from` (including
    /// the states in `from` themselves)
    fn reachable_from<I: IntoIterator<Item = Self::State>>(&self, from: I) -> BTreeSet<Self::State> {
        let mut visited: BTreeSet<Self::State> = BTreeSet::new();
        let mut queue = VecDeque::new();

        for s in from {
            if visited.insert(s.clone()) {
                queue.push_back(s);
            }
        }

        while let Some(state) = queue.pop_front() {
            for (_, succ) in self.outgoing(&state) {
                if visited.insert(succ.clone()) {
                    queue.push_back(succ);
                }
            }
        }

        visited
    }

    /// Get all states reachable from the initial state
    fn reachable_states(&self) -> BTreeSet<Self::State> {
        self.reachable_from([self.initial_state()])
    }

    /// Get all transitions whose source is contained in `states`
    fn transitions_from<'a, I>(&self, states: I) -> Vec<Transition<Self::State>>
    where
        I: IntoIterator<Item = &'a Self::State>,
        Self::State: 'a,
    {
        states
            .into_iter()
            .flat_map(|s| {
                self.outgoing(s)
                    .into_iter()
                    .map(|(a, t)| Transition::new(s.clone(), a, t))
            })
            .collect()
    }
}

// Borrowed transition systems can be composed without cloning them
impl<T: TransitionSystem + ?Sized> TransitionSystem for &T {
    type State = T::State;

    fn alphabet(&self) -> &BTreeSet<Action> {
        (**self).alphabet()
    }

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn states(&self) -> Vec<Self::State> {
        (**self).states()
    }

    fn is_accepting(&self, state: &Self::State) -> bool {
        (**self).is_accepting(state)
    }

    fn successors(&self, state: &Self::State, action: &Action) -> Vec<Self::State> {
        (**self).successors(state, action)
    }
}
