//! Single-codepoint predicates with a human description.
//!
//! The description shows up in error messages such as
//! `Required at least 1 character(s) (latin digit) but found only 0`.

use core::fmt;

/// A predicate over a single codepoint.
///
/// Implementations must be pure and cheap; the scanner may call them once per
/// scanned character.
pub trait CharFilter {
    /// Returns `true` if `cp` is accepted by this filter.
    fn accept(&self, cp: char) -> bool;

    /// A short human description used in error messages.
    fn description(&self) -> &str {
        "custom filter"
    }
}

/// A [`CharFilter`] built from a plain function pointer, usable in `const`
/// context. All built-ins in [`filters`] are of this type.
#[derive(Clone, Copy)]
pub struct NamedCharFilter {
    accept: fn(char) -> bool,
    description: &'static str,
}

impl NamedCharFilter {
    pub const fn new(accept: fn(char) -> bool, description: &'static str) -> Self {
        Self {
            accept,
            description,
        }
    }
}

impl CharFilter for NamedCharFilter {
    fn accept(&self, cp: char) -> bool {
        (self.accept)(cp)
    }

    fn description(&self) -> &str {
        self.description
    }
}

impl fmt::Debug for NamedCharFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedCharFilter")
            .field("description", &self.description)
            .finish()
    }
}

/// A [`CharFilter`] wrapping an arbitrary closure.
pub struct FnCharFilter<F> {
    predicate: F,
    description: &'static str,
}

impl<F: Fn(char) -> bool> CharFilter for FnCharFilter<F> {
    fn accept(&self, cp: char) -> bool {
        (self.predicate)(cp)
    }

    fn description(&self) -> &str {
        self.description
    }
}

/// Wraps a closure as a [`CharFilter`] with the generic description.
pub fn filter_fn<F: Fn(char) -> bool>(predicate: F) -> FnCharFilter<F> {
    FnCharFilter {
        predicate,
        description: "custom filter",
    }
}

/// Wraps a closure as a [`CharFilter`] with the given description.
pub fn described<F: Fn(char) -> bool>(
    predicate: F,
    description: &'static str,
) -> FnCharFilter<F> {
    FnCharFilter {
        predicate,
        description,
    }
}

/// The built-in filters.
pub mod filters {
    use super::NamedCharFilter;

    /// Accepts `0-9`.
    pub const LATIN_DIGIT: NamedCharFilter =
        NamedCharFilter::new(|c| c.is_ascii_digit(), "latin digit");

    /// Accepts `a-z` and `A-Z`.
    pub const LATIN_LETTER: NamedCharFilter =
        NamedCharFilter::new(|c| c.is_ascii_alphabetic(), "latin letter");

    /// Accepts Unicode whitespace.
    pub const WHITESPACE: NamedCharFilter =
        NamedCharFilter::new(char::is_whitespace, "whitespace");

    /// Accepts `\r` and `\n`.
    pub const NEWLINE: NamedCharFilter =
        NamedCharFilter::new(|c| c == '\r' || c == '\n', "newline");

    /// Accepts `0-7`.
    pub const OCTAL_DIGIT: NamedCharFilter =
        NamedCharFilter::new(|c| ('0'..='7').contains(&c), "octal digit");

    /// Accepts any character.
    pub const ANY: NamedCharFilter = NamedCharFilter::new(|_| true, "any character");

    /// Accepts `'`.
    pub const SINGLE_QUOTE: NamedCharFilter =
        NamedCharFilter::new(|c| c == '\'', "single quote");
}

#[cfg(test)]
mod tests {
    use super::{described, filter_fn, filters, CharFilter};

    #[test]
    fn built_ins() {
        assert!(filters::LATIN_DIGIT.accept('7'));
        assert!(!filters::LATIN_DIGIT.accept('a'));
        assert!(filters::OCTAL_DIGIT.accept('7'));
        assert!(!filters::OCTAL_DIGIT.accept('8'));
        assert!(filters::NEWLINE.accept('\r'));
        assert!(!filters::NEWLINE.accept(' '));
        assert!(filters::ANY.accept('\u{10FFFF}'));
        assert_eq!(filters::LATIN_LETTER.description(), "latin letter");
    }

    #[test]
    fn closures() {
        let tab_or_space = filter_fn(|c| c == ' ' || c == '\t');
        assert!(tab_or_space.accept('\t'));
        assert!(!tab_or_space.accept('x'));
        assert_eq!(tab_or_space.description(), "custom filter");

        let dollar = described(|c| c == '$', "dollar sign");
        assert_eq!(dollar.description(), "dollar sign");
    }
}
