//! Readers for Java-syntax string and character literals with the standard
//! escape sequences.
//!
//! Both readers run strict by default: any malformed input becomes an
//! error-severity message, which the default handler turns into an error.
//! The `_with(Severity::Warning)` variants are tolerant: malformed escapes
//! produce `?`, the problem is recorded as a warning, and scanning continues
//! past the literal.

use alloc::{format, string::String, string::ToString};

use super::CharScanner;
use crate::error::ScanError;
use crate::filter::filters;
use crate::message::Severity;

/// Resolves a single-character escape (the character after `\`) per the Java
/// language rules, or `None` for an invalid escape character.
fn resolve_escape(cp: char) -> Option<char> {
    match cp {
        '0' => Some('\0'),
        '1' => Some('\u{1}'),
        '2' => Some('\u{2}'),
        '3' => Some('\u{3}'),
        '4' => Some('\u{4}'),
        '5' => Some('\u{5}'),
        '6' => Some('\u{6}'),
        '7' => Some('\u{7}'),
        't' => Some('\t'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        'f' => Some('\u{c}'),
        'b' => Some('\u{8}'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('"'),
        _ => None,
    }
}

fn octal_value(cp: char) -> Option<u32> {
    if ('0'..='7').contains(&cp) {
        Some(cp as u32 - '0' as u32)
    } else {
        None
    }
}

impl CharScanner {
    /// Reads a Java string literal (`"..."`), resolving escape sequences.
    /// Returns `None` without consuming anything if the cursor is not at a
    /// `"`. Malformed escapes and an unterminated literal are errors.
    pub fn read_java_string_literal(&mut self) -> Result<Option<String>, ScanError> {
        self.read_java_string_literal_with(Severity::Error)
    }

    /// Like [`read_java_string_literal`](Self::read_java_string_literal)
    /// with an explicit severity. With [`Severity::Warning`] malformed
    /// escapes yield `?` (or the raw character) and an unterminated literal
    /// yields the text read so far, each recorded as a warning message.
    pub fn read_java_string_literal_with(
        &mut self,
        severity: Severity,
    ) -> Result<Option<String>, ScanError> {
        if self.peek()? != Some('"') {
            return Ok(None);
        }
        self.consume_cp('"');
        let mut out = String::new();
        loop {
            while self.offset < self.limit {
                let cp = self.buffer[self.offset];
                self.consume_cp(cp);
                match cp {
                    '"' => return Ok(Some(out)),
                    '\\' => self.parse_escape_sequence(&mut out, severity)?,
                    _ => out.push(cp),
                }
            }
            if !self.fill()? {
                break;
            }
        }
        self.emit_message(severity, "Java string literal not terminated".to_string())?;
        Ok(Some(out))
    }

    /// Reads a Java character literal (`'x'`), resolving escape sequences
    /// including the explicit octal form `\NNN`. Returns `None` without
    /// consuming anything if the cursor is not at a `'`.
    pub fn read_java_char_literal(&mut self) -> Result<Option<char>, ScanError> {
        self.read_java_char_literal_with(Severity::Error)
    }

    /// Like [`read_java_char_literal`](Self::read_java_char_literal) with an
    /// explicit severity. With [`Severity::Warning`] a malformed literal
    /// yields `?` after resyncing past the closing quote.
    pub fn read_java_char_literal_with(
        &mut self,
        severity: Severity,
    ) -> Result<Option<char>, ScanError> {
        if !self.expect_one('\'')? {
            return Ok(None);
        }
        let mut follower: Option<char> = None;
        let error: String = 'err: {
            match self.next()? {
                Some('\\') => {
                    let Some(cp) = self.next()? else {
                        break 'err "'\\".to_string();
                    };
                    if cp == 'u' {
                        let value = self.parse_unicode_escape(severity)?;
                        if self.expect_one('\'')? {
                            return Ok(Some(value));
                        }
                        break 'err format!("'\\u{:04x}", value as u32);
                    }
                    let next = self.next()?;
                    follower = next;
                    if next == Some('\'') {
                        if let Some(resolved) = resolve_escape(cp) {
                            return Ok(Some(resolved));
                        }
                        break 'err format!("'\\{cp}'");
                    }
                    if let (Some(high), Some(low)) =
                        (octal_value(cp), next.and_then(octal_value))
                    {
                        let mut value = high * 8 + low;
                        let mut last = self.next()?;
                        if value <= 31 {
                            if let Some(digit) = last.and_then(octal_value) {
                                value = value * 8 + digit;
                                last = self.next()?;
                            }
                        }
                        follower = last;
                        if last == Some('\'') {
                            if let Some(resolved) = char::from_u32(value) {
                                return Ok(Some(resolved));
                            }
                        }
                        let tail = last.map(String::from).unwrap_or_default();
                        break 'err format!("'\\{value:o}{tail}");
                    }
                    let tail = next.map(String::from).unwrap_or_default();
                    format!("'\\{cp}{tail}")
                }
                Some(cp) => {
                    if self.expect_one('\'')? {
                        return Ok(Some(cp));
                    }
                    format!("'{cp}")
                }
                None => "'".to_string(),
            }
        };
        let mut error = error;
        if follower != Some('\'') {
            if let Some(rest) = self.read_until_filter(&filters::SINGLE_QUOTE, true)? {
                error.push_str(&rest);
            }
            if self.expect_one('\'')? {
                error.push('\'');
            }
        }
        self.emit_message(severity, format!("Invalid Java character literal: {error}"))?;
        Ok(Some('?'))
    }

    /// Resolves the escape sequence after a consumed `\` inside a string
    /// literal, appending the result to `out`.
    fn parse_escape_sequence(
        &mut self,
        out: &mut String,
        severity: Severity,
    ) -> Result<(), ScanError> {
        let Some(cp) = self.next()? else {
            self.emit_message(severity, "Illegal escape sequence \\".to_string())?;
            return Ok(());
        };
        if cp == 'u' {
            let value = self.parse_unicode_escape(severity)?;
            out.push(value);
            return Ok(());
        }
        if let Some(first) = octal_value(cp) {
            // Octal escape: up to three digits, the three-digit form only
            // when the two-digit value stays within \37.
            let mut value = first;
            if let Some(second) = self.peek()?.and_then(octal_value) {
                self.next()?;
                value = value * 8 + second;
                if value <= 31 {
                    if let Some(third) = self.peek()?.and_then(octal_value) {
                        self.next()?;
                        value = value * 8 + third;
                    }
                }
            }
            if let Some(resolved) = char::from_u32(value) {
                out.push(resolved);
            }
            return Ok(());
        }
        if let Some(resolved) = resolve_escape(cp) {
            out.push(resolved);
            return Ok(());
        }
        self.emit_message(severity, format!("Illegal escape sequence \\{cp}"))?;
        out.push(cp);
        Ok(())
    }

    /// Parses the hex digits of a `\u` escape, after collapsing any number of
    /// leading `u`s. Fewer than four hex digits is reported and yields `?`.
    fn parse_unicode_escape(&mut self, severity: Severity) -> Result<char, ScanError> {
        self.skip_while_char('u')?;
        let mut value: u32 = 0;
        for parsed in 0..4usize {
            match self.read_digit_radix(16)? {
                Some(digit) => value = value * 16 + digit,
                None => {
                    let partial = if parsed == 0 {
                        String::new()
                    } else {
                        format!("{value:0parsed$x}")
                    };
                    self.emit_message(
                        severity,
                        format!("Illegal escape sequence \\u{partial}"),
                    )?;
                    return Ok('?');
                }
            }
        }
        match char::from_u32(value) {
            Some(resolved) => Ok(resolved),
            None => {
                // Surrogate halves are not scalar values.
                self.emit_message(severity, format!("Illegal escape sequence \\u{value:04x}"))?;
                Ok('?')
            }
        }
    }
}
