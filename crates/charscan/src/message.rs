//! The message/reporting surface of the scanner.
//!
//! Literal readers can run in a tolerant mode where malformed input produces a
//! [`Severity::Warning`] message and scanning continues; strict callers route
//! the same condition through [`Severity::Error`], which the default handler
//! turns into a [`ScanError::Message`].

use alloc::{string::String, vec::Vec};
use core::fmt;

use crate::error::ScanError;

/// Severity of a [`ScanMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A message produced while scanning, carrying its source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanMessage {
    pub severity: Severity,
    /// 1-based line of the character that triggered the message.
    pub line: u32,
    /// 1-based column of the character that triggered the message.
    pub column: u32,
    pub text: String,
}

impl fmt::Display for ScanMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at line {} in column {}: {}",
            self.line, self.column, self.text
        )
    }
}

/// Receives the messages emitted by a scanner.
pub trait MessageHandler {
    /// Handles one message. Returning an error aborts the operation that
    /// produced the message.
    fn handle(&mut self, message: ScanMessage) -> Result<(), ScanError>;

    /// The messages collected so far, if this handler collects.
    fn messages(&self) -> &[ScanMessage] {
        &[]
    }
}

/// Default [`MessageHandler`]: logs every message through the `log` facade,
/// collects non-fatal ones, and fails on [`Severity::Error`].
pub struct DefaultMessageHandler {
    throw_on_error: bool,
    messages: Vec<ScanMessage>,
}

impl DefaultMessageHandler {
    /// A handler that fails on error messages and collects the rest.
    pub fn new() -> Self {
        Self {
            throw_on_error: true,
            messages: Vec::new(),
        }
    }

    /// A handler that collects every message, including errors.
    pub fn lenient() -> Self {
        Self {
            throw_on_error: false,
            messages: Vec::new(),
        }
    }
}

impl Default for DefaultMessageHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageHandler for DefaultMessageHandler {
    fn handle(&mut self, message: ScanMessage) -> Result<(), ScanError> {
        match message.severity {
            Severity::Error => log::error!("{message}"),
            Severity::Warning => log::warn!("{message}"),
            Severity::Info => log::debug!("{message}"),
        }
        if self.throw_on_error && message.severity == Severity::Error {
            return Err(ScanError::Message(message));
        }
        self.messages.push(message);
        Ok(())
    }

    fn messages(&self) -> &[ScanMessage] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{DefaultMessageHandler, MessageHandler, ScanMessage, Severity};
    use crate::error::ScanError;

    fn message(severity: Severity, text: &str) -> ScanMessage {
        ScanMessage {
            severity,
            line: 3,
            column: 7,
            text: text.to_string(),
        }
    }

    #[test]
    fn default_throws_on_error() {
        let mut handler = DefaultMessageHandler::new();
        assert!(handler.handle(message(Severity::Warning, "w")).is_ok());
        let err = handler.handle(message(Severity::Error, "boom")).unwrap_err();
        assert_eq!(
            err,
            ScanError::Message(message(Severity::Error, "boom"))
        );
        assert_eq!(handler.messages().len(), 1);
    }

    #[test]
    fn lenient_collects_errors() {
        let mut handler = DefaultMessageHandler::lenient();
        assert!(handler.handle(message(Severity::Error, "boom")).is_ok());
        assert_eq!(handler.messages().len(), 1);
        assert_eq!(
            handler.messages()[0].to_string(),
            "at line 3 in column 7: boom"
        );
    }
}
