//! Deterministic and complete automata
//!
//! Safety properties have to be deterministic and complete, such that the
//! property state reached by a trace is unique and every trace not accepted
//! by the property ends in a non-accepting state. [`DeterministicLTS`] can
//! only be obtained through [`TryFrom<LTS>`], which validates both
//! conditions.

use std::{collections::BTreeSet, fmt};

use crate::{Action, StateId, TransitionSystem, lts::LTS};

/// Explicit automaton that is guaranteed to be deterministic and complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterministicLTS {
    lts: LTS,
}

impl DeterministicLTS {
    /// Get the unique successor of `state` under `action`
    ///
    /// Returns `None` only if `action` is not part of the alphabet.
    pub fn next_state(&self, state: StateId, action: &Action) -> Option<StateId> {
        self.lts.successors(&state, action).first().copied()
    }

    /// Get the underlying automaton
    pub fn as_lts(&self) -> &LTS {
        &self.lts
    }

    /// Consume the wrapper and return the underlying automaton
    pub fn into_inner(self) -> LTS {
        self.lts
    }

    /// Collapse the violating states into a single absorbing error state
    ///
    /// See [`LTS::with_error_sink`].
    pub fn with_error_sink(&self) -> DeterministicLTS {
        // collapsing keeps both determinism and completeness
        DeterministicLTS {
            lts: self.lts.with_error_sink(),
        }
    }
}

impl TryFrom<LTS> for DeterministicLTS {
    type Error = PropertyError;

    fn try_from(lts: LTS) -> Result<Self, Self::Error> {
        if let Some((state, action)) = lts.first_nondeterministic_pair() {
            return Err(PropertyError::NotDeterministic {
                name: lts.name().to_string(),
                state,
                action,
            });
        }
        if let Some((state, action)) = lts.first_undefined_pair() {
            return Err(PropertyError::Incomplete {
                name: lts.name().to_string(),
                state,
                action,
            });
        }

        Ok(Self { lts })
    }
}

impl TransitionSystem for DeterministicLTS {
    type State = StateId;

    fn alphabet(&self) -> &BTreeSet<Action> {
        self.lts.alphabet()
    }

    fn initial_state(&self) -> Self::State {
        self.lts.initial_state()
    }

    fn states(&self) -> Vec<Self::State> {
        self.lts.states()
    }

    fn is_accepting(&self, state: &Self::State) -> bool {
        self.lts.is_accepting(state)
    }

    fn successors(&self, state: &Self::State, action: &Action) -> Vec<Self::State> {
        self.lts.successors(state, action)
    }
}

/// Reasons why an automaton can not be used as a safety property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// A state has more than one successor for an action
    NotDeterministic {
        /// Name of the automaton
        name: String,
        /// Offending state
        state: StateId,
        /// Offending action
        action: Action,
    },
    /// A state has no successor for an action
    Incomplete {
        /// Name of the automaton
        name: String,
        /// Offending state
        state: StateId,
        /// Offending action
        action: Action,
    },
}

impl std::error::Error for PropertyError {}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyError::NotDeterministic {
                name,
                state,
                action,
            } => write!(
                f,
                "Property '{name}' is not deterministic: state {state} has multiple successors for action '{action}'"
            ),
            PropertyError::Incomplete {
                name,
                state,
                action,
            } => write!(
                f,
                "Property '{name}' is not complete: state {state} has no successor for action '{action}'"
            ),
        }
    }
}
