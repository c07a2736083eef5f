//! This module contains the logic to render the results of the tolerance
//! analysis and to output automata in a specific format

use robustify_lts::{
    display::indent_all,
    lts::LTS,
    writer::{into_fsp, into_lts_format},
};
use robustify_tolerance::{
    ToleranceProblem, budget::SearchResult, conformance::Counterexample, delta::Delta,
};

use crate::cli::TranslationFormat;

/// Render the deltas found by a search together with the perturbed
/// environments restricted to their accepting states
pub fn render_deltas(problem: &ToleranceProblem, result: &SearchResult) -> String {
    let mut out = format!(
        "Found {} maximal deltas ({})\n",
        result.deltas.len(),
        result.status
    );

    for (i, delta) in result.deltas.iter().enumerate() {
        let env = problem.perturbed_env(delta).accepting_only();
        out += &format!("Delta {}: {delta}\n{}\n", i + 1, indent_all(into_fsp(&env)));
    }

    out
}

/// Render the violations found while re-verifying deltas
pub fn render_violations(violations: &[(Delta, Counterexample)]) -> String {
    violations
        .iter()
        .map(|(delta, cex)| format!("Delta {delta} violates the property: {cex}\n"))
        .collect()
}

/// Translate `lts` into the given output format
pub fn translate(lts: &LTS, format: TranslationFormat) -> String {
    match format {
        TranslationFormat::Fsp => into_fsp(lts) + "\n",
        TranslationFormat::Lts => into_lts_format(lts),
    }
}

#[cfg(test)]
mod tests {
    use robustify_lts::builder::LTSBuilder;
    use robustify_parser::{ParseLTS, lts_format::LTSParser};
    use robustify_tolerance::{
        ToleranceProblem,
        budget::SearchBudget,
        conformance::Counterexample,
        delta::Delta,
        search::{DeltaSearch, pruned::PrunedSearch},
    };

    use crate::cli::{
        TranslationFormat,
        output::{render_deltas, render_violations, translate},
    };

    fn problem() -> ToleranceProblem {
        let parser = LTSParser::new();
        let env = parser
            .parse_lts("lts E { alphabet { a, b } states 1 transitions { 0 -a-> 0; } }")
            .unwrap();
        let ctrl = parser
            .parse_lts("lts C { alphabet { a, b } states 1 transitions { 0 -a-> 0; 0 -b-> 0; } }")
            .unwrap();
        let prop = parser
            .parse_lts(
                "lts P {
                    alphabet { a, b }
                    states 2
                    accepting { 0 }
                    transitions { 0 -a-> 0; 0 -b-> 1; 1 -a-> 1; 1 -b-> 1; }
                }",
            )
            .unwrap();

        ToleranceProblem::new(env, ctrl, prop).unwrap()
    }

    #[test]
    fn test_render_deltas() {
        let problem = problem();
        let result = PrunedSearch::new(false).search(&problem, SearchBudget::unlimited());

        assert_eq!(
            render_deltas(&problem, &result),
            "Found 1 maximal deltas (complete)\nDelta 1: {(0, a, 0)}\n    S0 = (a -> S0).\n"
        );
    }

    #[test]
    fn test_render_violations() {
        let violations: Vec<(Delta, Counterexample)> = Vec::new();
        assert_eq!(render_violations(&violations), "");
    }

    #[test]
    fn test_translate_round_trip() {
        let lts = LTSBuilder::new("env")
            .with_actions(["a", "b"])
            .unwrap()
            .with_states(2)
            .with_accepting([0])
            .unwrap()
            .with_transitions([(0, "a", 1), (1, "b", 0)])
            .unwrap()
            .build()
            .unwrap();

        let lts_str = translate(&lts, TranslationFormat::Lts);
        assert_eq!(LTSParser::new().parse_lts(&lts_str).unwrap(), lts);

        assert_eq!(
            translate(&lts, TranslationFormat::Fsp),
            "S0 = (a -> S1),\nS1 = (b -> S0).\n"
        );
    }
}
