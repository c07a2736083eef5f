//! Synchronous parallel composition of transition systems
//!
//! The product of two systems synchronizes on shared actions: a transition on
//! an action `a` exists iff every component that has `a` in its alphabet has a
//! transition on `a`. Components that do not know `a` stay in their current
//! state. A composite state is accepting iff all component states are
//! accepting.
//!
//! Products of more than two systems are built by nesting, e.g.,
//! `E ∥ (C ∥ P)` is
//! `ParallelComposition::new(e, ParallelComposition::new(c, p))`.

use std::collections::BTreeSet;

use crate::{Action, TransitionSystem};

/// Synchronous product of two transition systems
///
/// Components can be owned or borrowed, as `&T` implements
/// [`TransitionSystem`] whenever `T` does.
#[derive(Debug, Clone)]
pub struct ParallelComposition<L, R> {
    left: L,
    right: R,
    alphabet: BTreeSet<Action>,
}

impl<L: TransitionSystem, R: TransitionSystem> ParallelComposition<L, R> {
    /// Compose `left` and `right`
    pub fn new(left: L, right: R) -> Self {
        let alphabet = left
            .alphabet()
            .union(right.alphabet())
            .cloned()
            .collect();

        Self {
            left,
            right,
            alphabet,
        }
    }
}

impl<L: TransitionSystem, R: TransitionSystem> TransitionSystem for ParallelComposition<L, R> {
    type State = (L::State, R::State);

    fn alphabet(&self) -> &BTreeSet<Action> {
        &self.alphabet
    }

    fn initial_state(&self) -> Self::State {
        (self.left.initial_state(), self.right.initial_state())
    }

    fn states(&self) -> Vec<Self::State> {
        let right = self.right.states();
        self.left
            .states()
            .into_iter()
            .flat_map(|l| right.iter().map(move |r| (l.clone(), r.clone())))
            .collect()
    }

    fn is_accepting(&self, state: &Self::State) -> bool {
        self.left.is_accepting(&state.0) && self.right.is_accepting(&state.1)
    }

    fn successors(&self, state: &Self::State, action: &Action) -> Vec<Self::State> {
        if !self.alphabet.contains(action) {
            return Vec::new();
        }

        let (l, r) = state;
        let left_succ = if self.left.alphabet().contains(action) {
            self.left.successors(l, action)
        } else {
            vec![l.clone()]
        };
        let right_succ = if self.right.alphabet().contains(action) {
            self.right.successors(r, action)
        } else {
            vec![r.clone()]
        };

        left_succ
            .iter()
            .flat_map(|l| right_succ.iter().map(move |r| (l.clone(), r.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::{Action, Transition, TransitionSystem, builder::LTSBuilder, lts::LTS};

    use super::ParallelComposition;

    fn sender() -> LTS {
        LTSBuilder::new("sender")
            .with_actions(["send", "ack"])
            .unwrap()
            .with_states(2)
            .with_transitions([(0, "send", 1), (1, "ack", 0)])
            .unwrap()
            .build()
            .unwrap()
    }

    fn channel() -> LTS {
        LTSBuilder::new("channel")
            .with_actions(["send", "deliver", "ack"])
            .unwrap()
            .with_states(3)
            .with_accepting([0, 1])
            .unwrap()
            .with_transitions([(0, "send", 1), (1, "deliver", 2), (2, "ack", 0)])
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_alphabet_union() {
        let (s, c) = (sender(), channel());
        let prod = ParallelComposition::new(&s, &c);
        let expected: BTreeSet<Action> = ["ack", "deliver", "send"]
            .into_iter()
            .map(Action::from)
            .collect();
        assert_eq!(prod.alphabet(), &expected);
        assert_eq!(prod.states().len(), 6);
    }

    #[test]
    fn test_synchronization() {
        let (s, c) = (sender(), channel());
        let prod = ParallelComposition::new(&s, &c);

        // shared action needs both components
        assert_eq!(prod.successors(&(0, 0), &Action::new("send")), vec![(1, 1)]);
        assert!(prod.successors(&(0, 0), &Action::new("ack")).is_empty());
        // local action of the channel, sender stays put
        assert_eq!(prod.successors(&(1, 1), &Action::new("deliver")), vec![(1, 2)]);
        // unknown action
        assert!(prod.successors(&(0, 0), &Action::new("x")).is_empty());

        assert_eq!(
            prod.reachable_states(),
            BTreeSet::from([(0, 0), (1, 1), (1, 2)])
        );
        assert!(!prod.is_accepting(&(1, 2)));
        assert!(prod.is_accepting(&(1, 1)));
    }

    #[test]
    fn test_nested_composition_and_projection() {
        let (s, c, p) = (sender(), channel(), sender());
        let prod = ParallelComposition::new(&s, ParallelComposition::new(&c, &p));

        let init = prod.initial_state();
        assert_eq!(init, (0, (0, 0)));

        let transitions = prod.transitions_from(&prod.reachable_states());
        let projected: BTreeSet<_> = transitions.iter().map(|t| t.map_states(|s| s.0)).collect();
        assert_eq!(
            projected,
            BTreeSet::from([
                Transition::new(0, "send", 1),
                Transition::new(1, "ack", 0),
                Transition::new(1, "deliver", 1),
            ])
        );
    }
}
