//! This module contains the parser for the explicit `.lts` automaton format.
//!
//! The parser uses the [pest](https://pest.rs/) parser generator, with the
//! grammar defined in `lts_format.pest`. An automaton is given as
//!
//! ```text
//! lts Env {
//!     alphabet { a, b }
//!     states 3
//!     initial 0          // optional, default 0
//!     accepting { 0, 1 } // optional, default: all states
//!     transitions {
//!         0 -a-> 1;
//!         1 -b-> 0;
//!     }
//! }
//! ```

use anyhow::{Context, Error};
use log::debug;
use pest::{Parser, Span, error, iterators::Pair};
use pest_derive::Parser;
use robustify_lts::{
    StateId,
    builder::{BuilderError, LTSBuilder},
    lts::LTS,
};

use crate::ParseLTS;

// Location of the grammar file and generation of parser
#[allow(missing_docs)]
#[derive(Parser)]
#[grammar = "./lts_format.pest"]
struct PestLTSParser;

/// Parser for the explicit `.lts` format
#[derive(Debug, Clone, Copy, Default)]
pub struct LTSParser;

impl LTSParser {
    pub fn new() -> Self {
        LTSParser {}
    }
}

impl ParseLTS for LTSParser {
    /// Parse a string in the `.lts` format into an automaton
    ///
    /// # Example
    ///
    /// ```
    /// use robustify_parser::{ParseLTS, lts_format::LTSParser};
    ///
    /// let input = "lts P {
    ///     alphabet { a }
    ///     states 1
    ///     transitions { 0 -a-> 0; }
    /// }";
    /// let lts = LTSParser::new().parse_lts(input).unwrap();
    /// assert_eq!(lts.name(), "P");
    /// assert_eq!(lts.num_transitions(), 1);
    /// ```
    fn parse_lts(&self, input: &str) -> Result<LTS, Error> {
        let mut pairs = PestLTSParser::parse(Rule::lts_file, input)?;
        let pair = pairs
            .next()
            .ok_or_else(|| anyhow::anyhow!("Missing: automaton definition"))?;

        let lts = parse_lts_definition(pair)?;
        debug!(
            "Parsed automaton '{}' with {} states and {} transitions",
            lts.name(),
            lts.num_states(),
            lts.num_transitions()
        );

        Ok(lts)
    }
}

/// Parse the definition of an automaton
fn parse_lts_definition(pair: Pair<'_, Rule>) -> Result<LTS, Error> {
    debug_assert!(
        pair.as_rule() == Rule::lts,
        "Got rule {:?} for {}",
        pair.as_rule(),
        pair.as_str()
    );
    let span = pair.as_span();
    let mut inner = pair.into_inner();

    let name = next_pair(&mut inner, span, "name of the automaton")?;
    let name = name.as_str();
    let mut builder = LTSBuilder::new(name);

    let alphabet = next_pair(&mut inner, span, "alphabet declaration")?;
    builder = parse_alphabet(alphabet, builder)
        .with_context(|| format!("Failed to parse alphabet of '{name}': "))?;

    let states = next_pair(&mut inner, span, "number of states")?;
    builder = builder.with_states(parse_single_integer(states)?);

    for pair in inner {
        builder = match pair.as_rule() {
            Rule::initial_decl => {
                let span = pair.as_span();
                let initial = parse_single_integer(pair)?;
                builder
                    .with_initial(initial)
                    .map_err(|err| builder_error(err, span))
                    .with_context(|| format!("Invalid initial state of '{name}': "))?
            }
            Rule::accepting_decl => parse_accepting(pair, builder)
                .with_context(|| format!("Failed to parse accepting states of '{name}': "))?,
            Rule::transitions_decl => parse_transitions(pair, builder)
                .with_context(|| format!("Failed to parse transitions of '{name}': "))?,
            _ => unreachable!(
                "Unknown rule for declaration {:?}: {}",
                pair.as_rule(),
                pair.as_str()
            ),
        };
    }

    builder
        .build()
        .map_err(|err| builder_error(err, span))
        .with_context(|| format!("Failed to build automaton '{name}': "))
}

/// Parse the alphabet declaration and add the actions to the builder
fn parse_alphabet(pair: Pair<'_, Rule>, mut builder: LTSBuilder) -> Result<LTSBuilder, Error> {
    debug_assert!(pair.as_rule() == Rule::alphabet_decl);

    for list in pair.into_inner() {
        for ident in list.into_inner() {
            let span = ident.as_span();
            builder = builder
                .with_action(ident.as_str())
                .map_err(|err| builder_error(err, span))?;
        }
    }

    Ok(builder)
}

/// Parse the accepting states
fn parse_accepting(pair: Pair<'_, Rule>, builder: LTSBuilder) -> Result<LTSBuilder, Error> {
    debug_assert!(pair.as_rule() == Rule::accepting_decl);
    let span = pair.as_span();

    let mut accepting = Vec::new();
    for list in pair.into_inner() {
        for int in list.into_inner() {
            accepting.push(parse_integer_const(int)?);
        }
    }

    Ok(builder
        .with_accepting(accepting)
        .map_err(|err| builder_error(err, span))?)
}

/// Parse the transitions block
fn parse_transitions(pair: Pair<'_, Rule>, mut builder: LTSBuilder) -> Result<LTSBuilder, Error> {
    debug_assert!(pair.as_rule() == Rule::transitions_decl);

    for transition in pair.into_inner() {
        let span = transition.as_span();
        let mut inner = transition.into_inner();

        let src = parse_integer_const(next_pair(&mut inner, span, "source state")?)?;
        let action = next_pair(&mut inner, span, "action")?.as_str();
        let tgt = parse_integer_const(next_pair(&mut inner, span, "target state")?)?;

        builder = builder
            .with_transition(src, action, tgt)
            .map_err(|err| builder_error(err, span))?;
    }

    Ok(builder)
}

/// Parse a declaration consisting of a keyword and a single integer
fn parse_single_integer(pair: Pair<'_, Rule>) -> Result<usize, Error> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    parse_integer_const(next_pair(&mut inner, span, "integer")?)
}

/// Parse an integer constant
#[inline(always)]
fn parse_integer_const(pair: Pair<'_, Rule>) -> Result<StateId, Error> {
    debug_assert!(
        pair.as_rule() == Rule::integer_const,
        "Got rule {:?} for {}",
        pair.as_rule(),
        pair.as_str()
    );

    pair.as_str().parse::<StateId>().map_err(|err| {
        new_parsing_error(format!("Invalid integer: {err}"), pair.as_span()).into()
    })
}

/// Get the next pair or return an error mentioning what was expected
fn next_pair<'a>(
    pairs: &mut pest::iterators::Pairs<'a, Rule>,
    span: Span<'_>,
    expected: &str,
) -> Result<Pair<'a, Rule>, Error> {
    pairs
        .next()
        .ok_or_else(|| new_parsing_error(format!("Missing: {expected}"), span).into())
}

/// Convert a builder error into a parsing error at the given location
fn builder_error(err: BuilderError, span: Span<'_>) -> Box<error::Error<()>> {
    new_parsing_error(err.to_string(), span)
}

/// Generate a new parsing error
fn new_parsing_error<S: Into<String>>(message: S, span: Span<'_>) -> Box<error::Error<()>> {
    let message = message.into();
    Box::new(error::Error::new_from_span(
        error::ErrorVariant::CustomError { message },
        span,
    ))
}
