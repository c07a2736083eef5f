//! Visualization of automata in DOT format
//!
//! This module provides the trait [`ToDOT`] for converting automata into the
//! [DOT format](https://graphviz.org/doc/info/lang.html), which can be
//! visualized using tools like [Graphviz](https://graphviz.org/).
//!
//! The trait [`DOTDiff`] visualizes the difference between two automata over
//! the same states, e.g., an environment and one of its perturbations. Added
//! transitions are marked in green, removed transitions in red.

use crate::{
    StateId, Transition, TransitionSystem,
    display::{indent_all, join_iterator},
    lts::LTS,
};

/// Define the font type for labels and nodes in the graph
const GRAPH_OPTIONS: &str = "\
rankdir=LR \
fontname=\"Helvetica,Arial,sans-serif\" \
node [fontname=\"Helvetica,Arial,sans-serif\"] \
edge [fontname=\"Helvetica,Arial,sans-serif\"];";

/// Options for accepting states
const ACCEPTING_OPTIONS: &str = "shape = circle";
/// Options for non-accepting states
const NON_ACCEPTING_OPTIONS: &str = "shape = circle, style = dashed";
/// Marker of the initial state
const INITIAL_OPTIONS: &str = "penwidth = 3";

/// Options for removed transitions
const REMOVED: &str = "color = red, fontcolor = red";
/// Options for added transitions
const ADDED: &str = "color = green, fontcolor = green";

/// Objects implementing this trait can be visualized as a graph with graphviz
///
/// This trait is only available if the `dot` feature is enabled.
pub trait ToDOT {
    /// Get the underlying graph in DOT format
    fn get_dot_graph(&self) -> String;
}

/// Visualize the difference between two objects in DOT format
///
/// This trait is only available if the `dot` feature is enabled.
pub trait DOTDiff {
    /// Get the difference between `self` and `other` in DOT format
    ///
    /// Transitions only present in `self` are marked as removed, transitions
    /// only present in `other` are marked as added.
    fn get_dot_diff(&self, other: &Self) -> String;
}

impl LTS {
    fn get_node_encoding(&self) -> String {
        let (accepting, non_accepting): (Vec<_>, Vec<_>) =
            self.states().into_iter().partition(|s| self.is_accepting(s));

        let group = |nodes: Vec<StateId>, options: &str| {
            if nodes.is_empty() {
                return String::new();
            }
            let nodes = join_iterator(nodes.iter(), "\n");
            indent_all(format!("node [{options}];\n{}\n;", indent_all(nodes))) + "\n"
        };

        let init = indent_all(format!(
            "{} [{INITIAL_OPTIONS}];",
            self.initial_state()
        )) + "\n";

        format!(
            "{}{}{init}",
            group(accepting, ACCEPTING_OPTIONS),
            group(non_accepting, NON_ACCEPTING_OPTIONS),
        )
    }

    fn get_edge_encoding<'a>(
        edges: impl Iterator<Item = &'a Transition<StateId>>,
        edge_options: &str,
    ) -> String {
        let edge_options = if edge_options.is_empty() {
            String::new()
        } else {
            format!(", {edge_options}")
        };

        let edges = edges.map(|t| {
            format!(
                "{} -> {} [label = \"{}\"{edge_options}]",
                t.source(),
                t.target(),
                t.action()
            )
        });
        let mut edges = join_iterator(edges, ";\n");

        if !edges.is_empty() {
            edges += ";";
            edges = indent_all(edges);
            edges += "\n";
        }

        edges
    }

    fn get_graph(&self, title: String, edges: String) -> String {
        let graph_title =
            format!("graph [label =<<B>{title}</B>>, labelloc = t, fontsize = 35];\n");

        format!(
            "digraph \"{}\" {{\n{}\n{}{}{}}}",
            self.name(),
            indent_all(GRAPH_OPTIONS),
            indent_all(graph_title),
            self.get_node_encoding(),
            edges,
        )
    }
}

impl ToDOT for LTS {
    fn get_dot_graph(&self) -> String {
        let transitions = self.transitions().collect::<Vec<_>>();
        let edges = Self::get_edge_encoding(transitions.iter(), "");
        self.get_graph(self.name().to_string(), edges)
    }
}

impl DOTDiff for LTS {
    fn get_dot_diff(&self, other: &Self) -> String {
        let own = self.transitions().collect::<Vec<_>>();
        let others = other.transitions().collect::<Vec<_>>();

        let removed = own.iter().filter(|t| !other.has_transition(t));
        let added = others.iter().filter(|t| !self.has_transition(t));
        let regular = own.iter().filter(|t| other.has_transition(t));

        let edges = format!(
            "{}{}{}",
            Self::get_edge_encoding(removed, REMOVED),
            Self::get_edge_encoding(added, ADDED),
            Self::get_edge_encoding(regular, ""),
        );

        self.get_graph(format!("Diff: {} - {}", self.name(), other.name()), edges)
    }
}
