//! Configuration options of the tolerance analysis
//!
//! Options can be given in a configuration file, through environment
//! variables with the prefix `ROBUSTIFY` (nested keys are separated by `__`,
//! e.g. `ROBUSTIFY_HEURISTIC__SEED`), and through CLI flags, which take
//! precedence.

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use robustify_tolerance::{
    budget::SearchBudget,
    search::{Algorithm, SearchOptions, heuristic::HeuristicOptions},
};

/// Type representing configuration options of `robustify`
///
/// This type implements `serde::Deserialize` to easily parse the
/// configuration out of structured configuration.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct RobustifyConfig {
    /// Parameters of the heuristic search
    heuristic: Option<HeuristicOptions>,
    /// Limits of the search
    budget: Option<BudgetConfig>,
    /// Evaluate the pruned search in parallel
    parallel: Option<bool>,
}

/// Search limits as they appear in configuration files
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq)]
pub struct BudgetConfig {
    /// Maximum number of explored nodes
    max_nodes: Option<usize>,
    /// Maximum depth of the exploration
    max_depth: Option<usize>,
    /// Time limit in seconds
    time_limit_secs: Option<f64>,
}

impl BudgetConfig {
    fn to_search_budget(self) -> Result<SearchBudget, anyhow::Error> {
        let time_limit = self
            .time_limit_secs
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .with_context(|| format!("Invalid time limit of {secs} seconds"))
            })
            .transpose()?;

        Ok(SearchBudget {
            max_nodes: self.max_nodes,
            max_depth: self.max_depth,
            time_limit,
        })
    }
}

impl RobustifyConfig {
    /// Set the seed of the heuristic search
    pub fn set_seed(&mut self, seed: u64) {
        self.heuristic.get_or_insert_with(Default::default).seed = seed;
    }

    /// Set the node limit
    pub fn set_max_nodes(&mut self, max_nodes: usize) {
        self.budget.get_or_insert_with(Default::default).max_nodes = Some(max_nodes);
    }

    /// Set the depth limit
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.budget.get_or_insert_with(Default::default).max_depth = Some(max_depth);
    }

    /// Set the time limit in seconds
    pub fn set_time_limit_secs(&mut self, secs: f64) {
        self.budget.get_or_insert_with(Default::default).time_limit_secs = Some(secs);
    }

    /// Enable or disable parallel evaluation
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = Some(parallel);
    }

    /// Get the options for running `algorithm`
    ///
    /// Fails if the time limit is negative, not a number or too large to be
    /// represented.
    pub fn get_search_options(&self, algorithm: Algorithm) -> Result<SearchOptions, anyhow::Error> {
        let budget = self
            .budget
            .map(BudgetConfig::to_search_budget)
            .transpose()?
            .unwrap_or_default();

        Ok(SearchOptions {
            algorithm,
            budget,
            heuristic: self.heuristic.unwrap_or_default(),
            parallel: self.parallel.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use robustify_tolerance::{
        budget::SearchBudget,
        search::{Algorithm, heuristic::HeuristicOptions},
    };

    use crate::robustify_config::RobustifyConfig;

    #[test]
    fn test_robustify_config() {
        let json_data = "{
            \"heuristic\": {
                \"target_branching\": 3.0,
                \"depth_decay\": 1.5,
                \"seed\": 42
            },
            \"budget\": {
                \"max_nodes\": 1000,
                \"time_limit_secs\": 2.5
            },
            \"parallel\": true
        }";

        let config: RobustifyConfig = serde_json::from_str(json_data).unwrap();
        let options = config.get_search_options(Algorithm::Heuristic).unwrap();

        assert_eq!(options.algorithm, Algorithm::Heuristic);
        assert_eq!(
            options.heuristic,
            HeuristicOptions {
                target_branching: 3.0,
                depth_decay: 1.5,
                seed: 42
            }
        );
        assert_eq!(
            options.budget,
            SearchBudget {
                max_nodes: Some(1000),
                max_depth: None,
                time_limit: Some(Duration::from_millis(2500)),
            }
        );
        assert!(options.parallel);
    }

    #[test]
    fn test_partial_heuristic_config_uses_defaults() {
        let json_data = "{
            \"heuristic\": {
                \"seed\": 7
            }
        }";

        let config: RobustifyConfig = serde_json::from_str(json_data).unwrap();
        let options = config.get_search_options(Algorithm::Pruned).unwrap();

        assert_eq!(options.heuristic.seed, 7);
        assert_eq!(options.heuristic.target_branching, 5.0);
        assert_eq!(options.heuristic.depth_decay, 2.0);
        assert_eq!(options.budget, SearchBudget::unlimited());
        assert!(!options.parallel);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = RobustifyConfig::default();
        config.set_seed(3);
        config.set_max_nodes(10);
        config.set_max_depth(2);
        config.set_time_limit_secs(1.0);
        config.set_parallel(true);

        let options = config.get_search_options(Algorithm::Exhaustive).unwrap();
        assert_eq!(options.heuristic.seed, 3);
        assert_eq!(options.heuristic.target_branching, 5.0);
        assert_eq!(
            options.budget,
            SearchBudget::unlimited()
                .with_max_nodes(10)
                .with_max_depth(2)
                .with_time_limit(Duration::from_secs(1))
        );
        assert!(options.parallel);
    }

    #[test]
    fn test_invalid_time_limit() {
        for secs in [-1.0, f64::NAN, f64::INFINITY, 1e20] {
            let mut config = RobustifyConfig::default();
            config.set_time_limit_secs(secs);

            let err = config.get_search_options(Algorithm::Pruned).unwrap_err();
            assert!(
                err.to_string().starts_with("Invalid time limit"),
                "Unexpected error for {secs}: {err}"
            );
        }
    }

    #[test]
    fn test_large_time_limit() {
        let mut config = RobustifyConfig::default();
        config.set_time_limit_secs(1e15);

        let options = config.get_search_options(Algorithm::Pruned).unwrap();
        assert_eq!(
            options.budget.time_limit,
            Some(Duration::from_secs(1_000_000_000_000_000))
        );
    }
}
