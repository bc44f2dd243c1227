//! Cursor-based character-stream scanner for handwritten recursive-descent
//! parsers.
//!
//! [`CharScanner`] consumes either a fully materialized text or a streaming
//! [`CharRead`] source through a bounded lookahead window, and exposes a rich
//! vocabulary of operations: peek, expect, match-while, read-until, skip-over,
//! plus specialized readers for lines, quoted/escaped string segments and
//! numeric literals.
//!
//! ```
//! use charscan::{filters, CharScanner};
//!
//! let mut scanner = CharScanner::of("abc def");
//! assert_eq!(scanner.read_while(&filters::LATIN_LETTER).unwrap(), "abc");
//! assert_eq!(scanner.skip_while_char(' ').unwrap(), 1);
//! assert_eq!(scanner.read_while(&filters::LATIN_LETTER).unwrap(), "def");
//! assert!(!scanner.has_next().unwrap());
//! ```

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod error;
mod filter;
mod message;
mod number;
mod scanner;
mod source;
mod syntax;

#[cfg(feature = "std")]
mod io;

pub use error::ScanError;
pub use filter::{described, filter_fn, filters, CharFilter, FnCharFilter, NamedCharFilter};
pub use message::{DefaultMessageHandler, MessageHandler, ScanMessage, Severity};
pub use number::{
    JavaNumber, LangNumberParser, NumberParser, NumberTarget, RadixHandler, RadixMode,
    StringNumberParser,
};
pub use scanner::{CharScanner, DEFAULT_CAPACITY};
pub use source::{CharRead, ReadError, StrReader};
pub use syntax::ScanSyntax;

#[cfg(feature = "std")]
pub use io::Utf8Reader;

#[cfg(test)]
mod tests;
