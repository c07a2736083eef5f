//! Conformance of an environment with respect to a controller and a safety
//! property
//!
//! An environment `E` conforms if no reachable state of `E ∥ C ∥ P_err` is
//! non-accepting, where `P_err` is the property with all its violating states
//! collapsed into an absorbing error state. On a violation the checker
//! returns a shortest trace leading to it.

use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
};

use log::{debug, trace};
use robustify_lts::{
    Action, TransitionSystem, composition::ParallelComposition, deterministic::DeterministicLTS,
    display::join_iterator, lts::LTS,
};

use crate::{ToleranceProblem, delta::Delta};

/// Trace of actions leading to a state violating the property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample {
    trace: Vec<Action>,
}

impl Counterexample {
    /// Get the actions of the trace
    pub fn trace(&self) -> &[Action] {
        &self.trace
    }
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", join_iterator(self.trace.iter(), ", "))
    }
}

/// Checks environments against a fixed controller and property
#[derive(Debug, Clone)]
pub struct ConformanceChecker {
    ctrl: LTS,
    prop_err: LTS,
}

impl ConformanceChecker {
    /// Create a new checker for the controller `ctrl` and the property `prop`
    pub fn new(ctrl: LTS, prop: &DeterministicLTS) -> Self {
        Self {
            ctrl,
            prop_err: prop.with_error_sink().into_inner(),
        }
    }

    /// Get the property with its error sink
    pub fn prop_err(&self) -> &LTS {
        &self.prop_err
    }

    /// Check whether `env ∥ C` conforms to the property
    ///
    /// Explores `env ∥ C ∥ P_err` breadth first and returns the shortest trace
    /// to the first non-accepting composite state found.
    pub fn check<E: TransitionSystem>(&self, env: &E) -> Result<(), Counterexample> {
        let system =
            ParallelComposition::new(env, ParallelComposition::new(&self.ctrl, &self.prop_err));

        let init = system.initial_state();
        let mut parent: BTreeMap<_, Option<(_, Action)>> = BTreeMap::from([(init.clone(), None)]);
        let mut queue = VecDeque::from([init]);

        while let Some(state) = queue.pop_front() {
            if !system.is_accepting(&state) {
                let cex = Self::reconstruct_trace(&parent, state);
                trace!("Found violating trace {cex}");
                return Err(cex);
            }

            for (action, succ) in system.outgoing(&state) {
                if parent.contains_key(&succ) {
                    continue;
                }
                parent.insert(succ.clone(), Some((state.clone(), action)));
                queue.push_back(succ);
            }
        }

        Ok(())
    }

    fn reconstruct_trace<S: Ord + Clone>(
        parent: &BTreeMap<S, Option<(S, Action)>>,
        mut state: S,
    ) -> Counterexample {
        let mut trace = Vec::new();
        while let Some(Some((pred, action))) = parent.get(&state) {
            trace.push(action.clone());
            state = pred.clone();
        }
        trace.reverse();

        Counterexample { trace }
    }
}

/// Re-verify every delta of a search result
///
/// Each delta is substituted into the environment of `problem` and checked
/// for conformance. Returns all deltas that violate the property together
/// with a counterexample.
pub fn verify_deltas<'a, I>(problem: &ToleranceProblem, deltas: I) -> Vec<(Delta, Counterexample)>
where
    I: IntoIterator<Item = &'a Delta>,
{
    let violations = deltas
        .into_iter()
        .filter_map(|d| {
            let env = problem.perturbed_env(d);
            problem
                .checker()
                .check(&env)
                .err()
                .map(|cex| (d.clone(), cex))
        })
        .collect::<Vec<_>>();

    debug!("Re-verification found {} violating deltas", violations.len());
    violations
}

#[cfg(test)]
mod tests {
    use robustify_lts::{
        Action, builder::LTSBuilder, deterministic::DeterministicLTS, lts::LTS,
    };

    use super::ConformanceChecker;

    /// Property: never two consecutive `b`
    fn no_double_b() -> DeterministicLTS {
        LTSBuilder::new("p")
            .with_actions(["a", "b"])
            .unwrap()
            .with_states(3)
            .with_accepting([0, 1])
            .unwrap()
            .with_transitions([
                (0, "a", 0),
                (0, "b", 1),
                (1, "a", 0),
                (1, "b", 2),
                (2, "a", 2),
                (2, "b", 2),
            ])
            .unwrap()
            .build()
            .unwrap()
            .try_into()
            .unwrap()
    }

    fn chaos() -> LTS {
        LTSBuilder::new("c")
            .with_actions(["a", "b"])
            .unwrap()
            .with_states(1)
            .with_transitions([(0, "a", 0), (0, "b", 0)])
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_conforming_environment() {
        let env = LTSBuilder::new("e")
            .with_actions(["a", "b"])
            .unwrap()
            .with_states(2)
            .with_transitions([(0, "b", 1), (1, "a", 0)])
            .unwrap()
            .build()
            .unwrap();

        let checker = ConformanceChecker::new(chaos(), &no_double_b());
        assert_eq!(checker.check(&env), Ok(()));
    }

    #[test]
    fn test_violating_environment_shortest_trace() {
        let env = LTSBuilder::new("e")
            .with_actions(["a", "b"])
            .unwrap()
            .with_states(1)
            .with_transitions([(0, "a", 0), (0, "b", 0)])
            .unwrap()
            .build()
            .unwrap();

        let checker = ConformanceChecker::new(chaos(), &no_double_b());
        let cex = checker.check(&env).unwrap_err();
        assert_eq!(cex.trace(), &[Action::new("b"), Action::new("b")]);
        assert_eq!(cex.to_string(), "<b, b>");
    }

    #[test]
    fn test_controller_restricts_behavior() {
        let env = LTSBuilder::new("e")
            .with_actions(["a", "b"])
            .unwrap()
            .with_states(1)
            .with_transitions([(0, "a", 0), (0, "b", 0)])
            .unwrap()
            .build()
            .unwrap();
        // controller alternates b and a
        let ctrl = LTSBuilder::new("c")
            .with_actions(["a", "b"])
            .unwrap()
            .with_states(2)
            .with_transitions([(0, "b", 1), (1, "a", 0)])
            .unwrap()
            .build()
            .unwrap();

        let checker = ConformanceChecker::new(ctrl, &no_double_b());
        assert!(checker.check(&env).is_ok());
    }

    #[test]
    fn test_non_accepting_environment_state_is_violation() {
        let env = LTSBuilder::new("e")
            .with_actions(["a", "b"])
            .unwrap()
            .with_states(2)
            .with_accepting([0])
            .unwrap()
            .with_transitions([(0, "a", 1)])
            .unwrap()
            .build()
            .unwrap();

        let checker = ConformanceChecker::new(chaos(), &no_double_b());
        let cex = checker.check(&env).unwrap_err();
        assert_eq!(cex.trace(), &[Action::new("a")]);
    }
}
