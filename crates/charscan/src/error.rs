use alloc::{
    format,
    string::{String, ToString},
};

use thiserror::Error;

use crate::message::ScanMessage;

/// Errors surfaced by scanner operations.
///
/// Configuration errors ([`ScanError::Lookahead`],
/// [`ScanError::InvalidArgument`]) are raised before any state change.
/// Everything else surfaces at the call site that triggered it; successful
/// reads never fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// A lookahead request exceeded the configured buffer capacity.
    #[error(
        "lookahead size of {requested} characters exceeds the configured buffer size of {capacity}"
    )]
    Lookahead { requested: usize, capacity: usize },

    /// An operation was called with inconsistent arguments (e.g. `min > max`).
    #[error("{0}")]
    InvalidArgument(String),

    /// A [`require`](crate::CharScanner::require) expectation did not match.
    #[error("Expecting '{expected}' but found: {found}")]
    Expected { expected: String, found: String },

    /// Fewer characters matched a filter than the caller demanded.
    #[error("Required at least {min} character(s) ({description}) but found only {found}")]
    RequiredCharacters {
        min: usize,
        description: String,
        found: usize,
    },

    /// A numeric literal could not be converted to the requested type.
    #[error("{}", number_format_message(.literal, .radix))]
    NumberFormat { literal: String, radix: u32 },

    /// The entity resolver did not know the scanned entity.
    #[error("unknown entity {0}")]
    UnknownEntity(String),

    /// An error-severity message was handed to a throwing message handler.
    #[error("{0}")]
    Message(ScanMessage),

    /// The backing source failed; the source has been released.
    #[error("read error: {0}")]
    Read(String),

    /// The scanner was closed.
    #[error("scanner is closed")]
    Closed,
}

impl ScanError {
    /// The bare message text, without the line/column prefix that
    /// [`ScanMessage`] renders in its `Display` form.
    pub fn message_text(&self) -> String {
        match self {
            ScanError::Message(message) => message.text.clone(),
            other => other.to_string(),
        }
    }
}

fn number_format_message(literal: &str, radix: &u32) -> String {
    if *radix == 10 {
        format!("For input string: \"{literal}\"")
    } else {
        format!("For input string: \"{literal}\" under radix {radix}")
    }
}
