//! Budgets bounding a search and the status reported by it
//!
//! All searches are exponential in the worst case. A [`SearchBudget`] bounds
//! the number of explored nodes, the depth of the exploration and the wall
//! clock time. Exhausting a budget is not an error, the search returns the
//! deltas found so far with a [`SearchStatus::Partial`] status.

use std::{
    fmt,
    time::{Duration, Instant},
};

#[cfg(feature = "config_deserialize")]
use serde::Deserialize;

use crate::delta::Delta;

/// Limits of a search, `None` means unlimited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config_deserialize", derive(Deserialize))]
pub struct SearchBudget {
    /// Maximum number of explored nodes
    pub max_nodes: Option<usize>,
    /// Maximum depth of the exploration
    ///
    /// The depth is the number of removed optional transitions for the
    /// exhaustive search, the number of composite states added to the initial
    /// state for the pruned search, and the level in the search tree for the
    /// heuristic search.
    pub max_depth: Option<usize>,
    /// Maximum wall clock time
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    /// Budget without any limits
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Set the node limit
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    /// Set the depth limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Set the time limit
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    /// Check whether `depth` exceeds the depth limit
    pub fn exceeds_depth(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth > max)
    }
}

/// Reason why a search stopped before exploring its full search space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialReason {
    /// The node limit was reached
    NodeLimit,
    /// Parts of the search space were beyond the depth limit
    DepthLimit,
    /// The time limit was reached
    TimeLimit,
}

impl fmt::Display for PartialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialReason::NodeLimit => write!(f, "node limit reached"),
            PartialReason::DepthLimit => write!(f, "depth limit reached"),
            PartialReason::TimeLimit => write!(f, "time limit reached"),
        }
    }
}

/// Whether a search explored its full search space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// The full search space has been explored
    Complete,
    /// The search stopped early
    Partial(PartialReason),
}

impl SearchStatus {
    /// Check whether the search was complete
    pub fn is_complete(&self) -> bool {
        matches!(self, SearchStatus::Complete)
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStatus::Complete => write!(f, "complete"),
            SearchStatus::Partial(reason) => write!(f, "partial ({reason})"),
        }
    }
}

/// Statistics collected during a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStatistics {
    /// Number of explored nodes
    pub explored_nodes: usize,
    /// Number of conformance checks performed
    pub soundness_checks: usize,
    /// Size of the winning set
    pub winning_states: usize,
    /// Wall clock time of the search
    pub elapsed: Duration,
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "explored nodes: {}, conformance checks: {}, winning states: {}, time: {:.3}s",
            self.explored_nodes,
            self.soundness_checks,
            self.winning_states,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Result of a search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Maximal deltas found, in a stable order
    pub deltas: Vec<Delta>,
    /// Whether the search was complete
    pub status: SearchStatus,
    /// Statistics of the search
    pub statistics: SearchStatistics,
}

/// Tracks the consumption of a [`SearchBudget`] during a search
#[derive(Debug, Clone)]
pub(crate) struct BudgetTracker {
    budget: SearchBudget,
    start: Instant,
    deadline: Option<Instant>,
    nodes: usize,
    depth_limited: bool,
    stopped: Option<PartialReason>,
}

impl BudgetTracker {
    pub(crate) fn new(budget: SearchBudget) -> Self {
        let start = Instant::now();
        Self {
            budget,
            start,
            // a deadline beyond the range of `Instant` never expires
            deadline: budget
                .time_limit
                .and_then(|limit| start.checked_add(limit)),
            nodes: 0,
            depth_limited: false,
            stopped: None,
        }
    }

    /// Account for a new node, returns `false` if the search has to stop
    pub(crate) fn visit_node(&mut self) -> bool {
        if self.stopped.is_some() {
            return false;
        }
        if self.budget.max_nodes.is_some_and(|max| self.nodes >= max) {
            self.stopped = Some(PartialReason::NodeLimit);
            return false;
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.stopped = Some(PartialReason::TimeLimit);
            return false;
        }

        self.nodes += 1;
        true
    }

    /// Check whether `depth` is allowed, remembering that parts of the search
    /// space have been cut off otherwise
    pub(crate) fn allows_depth(&mut self, depth: usize) -> bool {
        if self.budget.exceeds_depth(depth) {
            self.depth_limited = true;
            return false;
        }
        true
    }

    pub(crate) fn nodes(&self) -> usize {
        self.nodes
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub(crate) fn status(&self) -> SearchStatus {
        match (self.stopped, self.depth_limited) {
            (Some(reason), _) => SearchStatus::Partial(reason),
            (None, true) => SearchStatus::Partial(PartialReason::DepthLimit),
            (None, false) => SearchStatus::Complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{BudgetTracker, PartialReason, SearchBudget, SearchStatus};

    #[test]
    fn test_unlimited_budget() {
        let mut tracker = BudgetTracker::new(SearchBudget::unlimited());
        for _ in 0..1000 {
            assert!(tracker.visit_node());
        }
        assert!(tracker.allows_depth(usize::MAX));
        assert_eq!(tracker.nodes(), 1000);
        assert_eq!(tracker.status(), SearchStatus::Complete);
    }

    #[test]
    fn test_node_limit() {
        let mut tracker = BudgetTracker::new(SearchBudget::unlimited().with_max_nodes(2));
        assert!(tracker.visit_node());
        assert!(tracker.visit_node());
        assert!(!tracker.visit_node());
        assert!(!tracker.visit_node());
        assert_eq!(tracker.nodes(), 2);
        assert_eq!(
            tracker.status(),
            SearchStatus::Partial(PartialReason::NodeLimit)
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut tracker = BudgetTracker::new(SearchBudget::unlimited().with_max_depth(1));
        assert!(tracker.allows_depth(0));
        assert!(tracker.allows_depth(1));
        assert_eq!(tracker.status(), SearchStatus::Complete);
        assert!(!tracker.allows_depth(2));
        assert_eq!(
            tracker.status(),
            SearchStatus::Partial(PartialReason::DepthLimit)
        );
    }

    #[test]
    fn test_time_limit() {
        let mut tracker =
            BudgetTracker::new(SearchBudget::unlimited().with_time_limit(Duration::ZERO));
        assert!(!tracker.visit_node());
        assert_eq!(
            tracker.status(),
            SearchStatus::Partial(PartialReason::TimeLimit)
        );
        assert_eq!(
            tracker.status().to_string(),
            "partial (time limit reached)"
        );
    }

    #[test]
    fn test_time_limit_beyond_instant_range() {
        let mut tracker =
            BudgetTracker::new(SearchBudget::unlimited().with_time_limit(Duration::MAX));
        assert!(tracker.visit_node());
        assert!(tracker.visit_node());
        assert_eq!(tracker.status(), SearchStatus::Complete);

        let mut tracker = BudgetTracker::new(
            SearchBudget::unlimited().with_time_limit(Duration::from_secs(u64::MAX / 2)),
        );
        assert!(tracker.visit_node());
        assert_eq!(tracker.status(), SearchStatus::Complete);
    }
}
