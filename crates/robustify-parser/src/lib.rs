//! Parsers for automata
//!
//! This crate contains the trait [`ParseLTS`] that parsers for automata
//! implement, and the parser for the explicit `.lts` format
//! ([`lts_format::LTSParser`]).

use anyhow::Error;
use robustify_lts::lts::LTS;

// The pest derive generates errors as the doc comments are missing
#[allow(missing_docs)]
pub mod lts_format;

/// Parse an automaton from a string.
///
/// Parsers for automata should implement this trait.
pub trait ParseLTS {
    /// Try to parse an automaton from a string.
    fn parse_lts(&self, input: &str) -> Result<LTS, Error>;
}
