//! Textual output formats for explicit automata
//!
//! - [`into_fsp`] renders an automaton as a list of FSP-like process
//!   equations, e.g. `S0 = (a -> S1 | b -> STOP).`
//! - [`into_lts_format`] renders an automaton in the explicit `.lts` input
//!   format, such that it can be read again by the parser.

use std::collections::{BTreeSet, VecDeque};

use crate::{
    StateId, TransitionSystem,
    display::{indent_all, join_iterator},
    lts::LTS,
};

/// Render the part of `lts` reachable from its initial state as FSP-like
/// process equations
///
/// States are explored breadth first. Every explored state with outgoing
/// transitions gets one equation `S<i> = (a -> S<j> | ...)`, targets without
/// any outgoing transition are rendered as `STOP`. Equations are separated by
/// `,` and the last one is terminated by `.`.
///
/// # Example
///
/// ```
/// use robustify_lts::{builder::LTSBuilder, writer::into_fsp};
///
/// let lts = LTSBuilder::new("p")
///     .with_actions(["a", "b"]).unwrap()
///     .with_states(3)
///     .with_transitions([(0, "a", 1), (1, "a", 0), (1, "b", 2)]).unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(into_fsp(&lts), "S0 = (a -> S1),\nS1 = (a -> S0 | b -> STOP).");
/// ```
pub fn into_fsp(lts: &LTS) -> String {
    let is_deadlock = |s: &StateId| lts.outgoing(s).is_empty();

    let init = lts.initial_state();
    if is_deadlock(&init) {
        return format!("S{init} = STOP.");
    }

    let mut visited = BTreeSet::from([init]);
    let mut queue = VecDeque::from([init]);
    let mut equations = Vec::new();

    while let Some(state) = queue.pop_front() {
        let choices = lts.outgoing(&state).into_iter().map(|(a, succ)| {
            if is_deadlock(&succ) {
                return format!("{a} -> STOP");
            }
            if visited.insert(succ) {
                queue.push_back(succ);
            }
            format!("{a} -> S{succ}")
        });
        let choices = join_iterator(choices, " | ");

        equations.push(format!("S{state} = ({choices})"));
    }

    join_iterator(equations.iter(), ",\n") + "."
}

/// Render `lts` in the explicit `.lts` input format
///
/// # Example
///
/// ```
/// use robustify_lts::{builder::LTSBuilder, writer::into_lts_format};
///
/// let lts = LTSBuilder::new("p")
///     .with_actions(["a"]).unwrap()
///     .with_states(2)
///     .with_accepting([0]).unwrap()
///     .with_transition(0, "a", 1).unwrap()
///     .build()
///     .unwrap();
///
/// assert!(into_lts_format(&lts).starts_with("lts p {\n    alphabet { a }\n"));
/// ```
pub fn into_lts_format(lts: &LTS) -> String {
    let transitions = lts
        .transitions()
        .map(|t| format!("{} -{}-> {};\n", t.source(), t.action(), t.target()));
    let transitions = indent_all(transitions.collect::<String>());

    let body = format!(
        "alphabet {{ {} }}\nstates {}\ninitial {}\naccepting {{ {} }}\ntransitions {{\n{}}}\n",
        join_iterator(lts.alphabet().iter(), ", "),
        lts.num_states(),
        lts.initial_state(),
        join_iterator(lts.accepting_states().iter(), ", "),
        transitions,
    );

    format!("lts {} {{\n{}}}\n", lts.name(), indent_all(body))
}
