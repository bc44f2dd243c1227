//! Configuration of the syntax-driven [`read_until_syntax`] scan: quoting,
//! escaping and entity decoding.
//!
//! [`read_until_syntax`]: crate::CharScanner::read_until_syntax

use alloc::{boxed::Box, string::String};
use core::fmt;

use crate::error::ScanError;

type EntityResolver = dyn Fn(&str) -> Option<String>;

/// Immutable description of how a syntax-driven scan treats quotes, escapes
/// and entities. All characters default to disabled.
///
/// The *quote-escape-lazy* flag applies only when quote-start, quote-end and
/// quote-escape are the same character: it decides whether an occurrence of
/// the quote character outside an active quotation is an escaped literal
/// quote (`true`) or an empty quoted region (`false`). The same rule applies
/// to the alt-quote triple.
///
/// ```
/// use charscan::{CharScanner, ScanSyntax};
///
/// let syntax = ScanSyntax::new().with_escape('\\');
/// let mut scanner = CharScanner::of("a\\\"b\"rest");
/// assert_eq!(
///     scanner.read_until_syntax('"', false, &syntax).unwrap().unwrap(),
///     "a\"b"
/// );
/// ```
pub struct ScanSyntax {
    pub escape: Option<char>,
    pub quote_start: Option<char>,
    pub quote_end: Option<char>,
    pub quote_escape: Option<char>,
    pub quote_escape_lazy: bool,
    pub alt_quote_start: Option<char>,
    pub alt_quote_end: Option<char>,
    pub alt_quote_escape: Option<char>,
    pub alt_quote_escape_lazy: bool,
    pub entity_start: Option<char>,
    pub entity_end: Option<char>,
    resolver: Option<Box<EntityResolver>>,
}

impl ScanSyntax {
    pub fn new() -> Self {
        Self {
            escape: None,
            quote_start: None,
            quote_end: None,
            quote_escape: None,
            quote_escape_lazy: false,
            alt_quote_start: None,
            alt_quote_end: None,
            alt_quote_escape: None,
            alt_quote_escape_lazy: false,
            entity_start: None,
            entity_end: None,
            resolver: None,
        }
    }

    /// Sets the escape character (active outside quotations only).
    pub fn with_escape(mut self, escape: char) -> Self {
        self.escape = Some(escape);
        self
    }

    /// Sets quote-start and quote-end to the same character.
    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote_start = Some(quote);
        self.quote_end = Some(quote);
        self
    }

    pub fn with_quote_escape(mut self, escape: char) -> Self {
        self.quote_escape = Some(escape);
        self
    }

    pub fn with_quote_escape_lazy(mut self, lazy: bool) -> Self {
        self.quote_escape_lazy = lazy;
        self
    }

    /// Sets alt-quote-start and alt-quote-end to the same character.
    pub fn with_alt_quote(mut self, quote: char) -> Self {
        self.alt_quote_start = Some(quote);
        self.alt_quote_end = Some(quote);
        self
    }

    pub fn with_alt_quote_escape(mut self, escape: char) -> Self {
        self.alt_quote_escape = Some(escape);
        self
    }

    pub fn with_alt_quote_escape_lazy(mut self, lazy: bool) -> Self {
        self.alt_quote_escape_lazy = lazy;
        self
    }

    /// Sets the delimiters of an entity, e.g. `'&'` and `';'`.
    pub fn with_entities(mut self, start: char, end: char) -> Self {
        self.entity_start = Some(start);
        self.entity_end = Some(end);
        self
    }

    /// Sets the resolver called with the text between entity-start and
    /// entity-end (exclusive). Returning `None` signals an unknown entity.
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Resolves `entity` to its replacement text.
    pub fn resolve_entity(&self, entity: &str) -> Result<String, ScanError> {
        self.resolver
            .as_ref()
            .and_then(|resolve| resolve(entity))
            .ok_or_else(|| ScanError::UnknownEntity(String::from(entity)))
    }
}

impl Default for ScanSyntax {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScanSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSyntax")
            .field("escape", &self.escape)
            .field("quote_start", &self.quote_start)
            .field("quote_end", &self.quote_end)
            .field("quote_escape", &self.quote_escape)
            .field("quote_escape_lazy", &self.quote_escape_lazy)
            .field("alt_quote_start", &self.alt_quote_start)
            .field("alt_quote_end", &self.alt_quote_end)
            .field("alt_quote_escape", &self.alt_quote_escape)
            .field("alt_quote_escape_lazy", &self.alt_quote_escape_lazy)
            .field("entity_start", &self.entity_start)
            .field("entity_end", &self.entity_end)
            .field("resolver", &self.resolver.as_ref().map(|_| ".."))
            .finish()
    }
}
