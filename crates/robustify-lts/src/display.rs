//! Helpers for rendering automata, transitions and sets of transitions as
//! text.

use std::fmt::Display;

/// Size of one level of indentation
pub const TAB_SIZE: usize = 4;

/// Join the string representations of `list` using the separator `sep`
///
/// The separator is not appended to the end of the result.
///
/// # Example
///
/// ```
/// use robustify_lts::display::join_iterator;
///
/// assert_eq!(join_iterator(["a", "b", "c"].iter(), ", "), "a, b, c");
/// ```
pub fn join_iterator<T: ToString, U: Iterator<Item = T>, S: Into<String>>(
    list: U,
    sep: S,
) -> String {
    list.map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(sep.into().as_str())
}

/// Render a set of items as `{x, y, z}`
///
/// Items are rendered in the order of the iterator, callers that need a
/// stable output should pass an ordered collection.
///
/// # Example
///
/// ```
/// use robustify_lts::{Transition, display::display_set};
///
/// let set = [Transition::new(0, "a", 1), Transition::new(1, "b", 0)];
/// assert_eq!(display_set(set.iter()), "{(0, a, 1), (1, b, 0)}");
/// assert_eq!(display_set(Vec::<Transition<usize>>::new().iter()), "{}");
/// ```
pub fn display_set<T: Display>(set: impl IntoIterator<Item = T>) -> String {
    format!("{{{}}}", join_iterator(set.into_iter(), ", "))
}

/// Indent all non-empty lines of `input` by [`TAB_SIZE`] spaces
///
/// # Example
///
/// ```
/// use robustify_lts::display::indent_all;
///
/// assert_eq!(indent_all("a\n\nb"), "    a\n\n    b");
/// ```
pub fn indent_all<S: Into<String>>(input: S) -> String {
    let tab = " ".repeat(TAB_SIZE);
    let input: String = input.into();

    let mut output = input
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{tab}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    if input.ends_with('\n') {
        output.push('\n');
    }

    output
}
