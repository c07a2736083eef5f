//! Greatest fixpoint computation of the winning region
//!
//! Given a transition system and a target set, the winning set is the
//! largest subset `W` of the target such that every move from a state in `W`
//! leads into `W` again:
//!
//! ```text
//! W₀ = target
//! Wᵢ₊₁ = { s ∈ Wᵢ : every move from s leads into Wᵢ }
//! ```
//!
//! The fixpoint is unique, therefore the order in which states are examined
//! only influences the number of rounds, never the result.

use std::collections::BTreeSet;

use log::trace;
use robustify_lts::TransitionSystem;

/// Computes winning sets over the moves of a transition system
#[derive(Debug, Clone)]
pub struct WinningSetSolver<'a, T: TransitionSystem> {
    moves: &'a T,
}

impl<'a, T: TransitionSystem> WinningSetSolver<'a, T> {
    /// Create a solver using the moves of `moves`
    pub fn new(moves: &'a T) -> Self {
        Self { moves }
    }

    /// Compute the greatest fixpoint within `target`
    ///
    /// States are examined in the order they are yielded by `target`, states
    /// removed during a round are already excluded for the remaining states
    /// of the same round.
    pub fn solve<I>(&self, target: I) -> BTreeSet<T::State>
    where
        I: IntoIterator<Item = T::State>,
    {
        let mut order: Vec<T::State> = Vec::new();
        let mut winning: BTreeSet<T::State> = BTreeSet::new();
        for s in target {
            if winning.insert(s.clone()) {
                order.push(s);
            }
        }

        let mut rounds = 0;
        loop {
            rounds += 1;
            let mut changed = false;

            for s in order.iter() {
                if !winning.contains(s) {
                    continue;
                }

                let stays_winning = self
                    .moves
                    .outgoing(s)
                    .iter()
                    .all(|(_, succ)| winning.contains(succ));
                if !stays_winning {
                    winning.remove(s);
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        trace!(
            "Winning set computation converged after {rounds} rounds with {} states",
            winning.len()
        );
        winning
    }
}
