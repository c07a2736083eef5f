//! Factory methods for building a valid [`LTS`]
//!
//! The [`LTSBuilder`] ensures that every transition only references declared
//! actions and existing states, and that the initial and accepting states
//! exist.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::{Action, StateId, lts::LTS};

/// Maximal number of states of an automaton
pub const MAX_STATES: usize = 1 << 24;

/// Builder for constructing an [`LTS`]
///
/// Actions have to be declared before they can be used in a transition. If
/// no accepting states are declared explicitly, all states are accepting.
///
/// # Example
///
/// ```
/// use robustify_lts::builder::LTSBuilder;
///
/// let lts = LTSBuilder::new("env")
///     .with_actions(["a", "b"]).unwrap()
///     .with_states(2)
///     .with_initial(0).unwrap()
///     .with_transition(0, "a", 1).unwrap()
///     .with_transition(1, "b", 0).unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(lts.num_states(), 2);
/// assert_eq!(lts.num_transitions(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LTSBuilder {
    name: String,
    alphabet: BTreeSet<Action>,
    num_states: usize,
    initial: StateId,
    accepting: Option<BTreeSet<StateId>>,
    transitions: Vec<(StateId, Action, StateId)>,
}

impl LTSBuilder {
    /// Create a new builder for an automaton named `name`
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            alphabet: BTreeSet::new(),
            num_states: 0,
            initial: 0,
            accepting: None,
            transitions: Vec::new(),
        }
    }

    /// Add an action to the alphabet
    ///
    /// Returns an error if the action has already been declared.
    pub fn with_action(mut self, action: impl Into<Action>) -> Result<Self, BuilderError> {
        let action = action.into();
        if !self.alphabet.insert(action.clone()) {
            return Err(BuilderError::DuplicateAction(action));
        }
        Ok(self)
    }

    /// Add multiple actions to the alphabet
    pub fn with_actions<A, I>(self, actions: I) -> Result<Self, BuilderError>
    where
        A: Into<Action>,
        I: IntoIterator<Item = A>,
    {
        actions
            .into_iter()
            .try_fold(self, |builder, a| builder.with_action(a))
    }

    /// Set the number of states, states will be `0..n`
    pub fn with_states(mut self, n: usize) -> Self {
        self.num_states = n;
        self
    }

    /// Set the initial state
    pub fn with_initial(mut self, initial: StateId) -> Result<Self, BuilderError> {
        self.check_state(initial)?;
        self.initial = initial;
        Ok(self)
    }

    /// Set the accepting states (replacing the default of all states)
    pub fn with_accepting<I>(mut self, accepting: I) -> Result<Self, BuilderError>
    where
        I: IntoIterator<Item = StateId>,
    {
        let accepting = accepting.into_iter().collect::<BTreeSet<_>>();
        for s in accepting.iter() {
            self.check_state(*s)?;
        }
        self.accepting = Some(accepting);
        Ok(self)
    }

    /// Add a transition `source -action-> target`
    pub fn with_transition(
        mut self,
        source: StateId,
        action: impl Into<Action>,
        target: StateId,
    ) -> Result<Self, BuilderError> {
        let action = action.into();
        self.check_state(source)?;
        self.check_state(target)?;
        if !self.alphabet.contains(&action) {
            return Err(BuilderError::UnknownAction(action));
        }

        self.transitions.push((source, action, target));
        Ok(self)
    }

    /// Add multiple transitions
    pub fn with_transitions<A, I>(self, transitions: I) -> Result<Self, BuilderError>
    where
        A: Into<Action>,
        I: IntoIterator<Item = (StateId, A, StateId)>,
    {
        transitions
            .into_iter()
            .try_fold(self, |builder, (s, a, t)| builder.with_transition(s, a, t))
    }

    /// Check whether the action has been declared
    pub fn has_action(&self, action: &Action) -> bool {
        self.alphabet.contains(action)
    }

    fn check_state(&self, s: StateId) -> Result<(), BuilderError> {
        if s >= self.num_states {
            return Err(BuilderError::UnknownState(s, self.num_states));
        }
        Ok(())
    }

    /// Build the automaton
    ///
    /// Returns an error if the automaton has no states or more than
    /// [`MAX_STATES`] states.
    pub fn build(self) -> Result<LTS, BuilderError> {
        if self.num_states == 0 {
            return Err(BuilderError::NoStates(self.name));
        }
        if self.num_states > MAX_STATES {
            return Err(BuilderError::TooManyStates(self.name, self.num_states));
        }

        let mut transitions: Vec<BTreeMap<Action, BTreeSet<StateId>>> =
            vec![BTreeMap::new(); self.num_states];
        for (s, a, t) in self.transitions {
            transitions[s].entry(a).or_default().insert(t);
        }

        let accepting = self
            .accepting
            .unwrap_or_else(|| (0..self.num_states).collect());

        Ok(LTS {
            name: self.name,
            alphabet: self.alphabet,
            initial: self.initial,
            accepting,
            transitions,
        })
    }
}

/// Errors that can occur during the construction of an automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    /// An action was declared multiple times
    DuplicateAction(Action),
    /// A transition uses an action that was not declared
    UnknownAction(Action),
    /// A state index is out of range (state, number of states)
    UnknownState(StateId, usize),
    /// The automaton has no states
    NoStates(String),
    /// The automaton has more than [`MAX_STATES`] states (name, number of
    /// states)
    TooManyStates(String, usize),
}

impl std::error::Error for BuilderError {}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderError::DuplicateAction(a) => write!(f, "Duplicate action: {a}"),
            BuilderError::UnknownAction(a) => {
                write!(f, "Action '{a}' is not part of the alphabet")
            }
            BuilderError::UnknownState(s, n) => {
                write!(f, "Unknown state {s}, the automaton only has {n} states")
            }
            BuilderError::NoStates(name) => write!(f, "Automaton '{name}' has no states"),
            BuilderError::TooManyStates(name, n) => write!(
                f,
                "Automaton '{name}' has {n} states, at most {MAX_STATES} states are supported"
            ),
        }
    }
}
