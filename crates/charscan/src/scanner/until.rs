//! The `read_until` family, including the syntax-driven scan with quoting,
//! escaping and entity decoding.

use alloc::string::String;

use super::{lower, CharScanner};
use crate::error::ScanError;
use crate::filter::CharFilter;
use crate::syntax::ScanSyntax;

/// State of the syntax-driven scan, one value per consumed character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UntilState {
    /// Accumulating normal text.
    Scan,
    /// The previous character was the escape; the current one is literal.
    Escape,
    /// Inside a quotation; the plain escape is disabled here.
    Quote,
    /// After the quote-escape inside a quotation.
    QuoteEscape,
    /// Collecting an entity body.
    Entity,
}

/// The quote/entity machine driving [`CharScanner::read_until_syntax_filter`]:
/// one state value plus the frame of the active quotation.
struct SyntaxMachine<'s> {
    syntax: &'s ScanSyntax,
    state: UntilState,
    /// End/escape of the active quotation (valid in `Quote`/`QuoteEscape`).
    quote_end: char,
    quote_escape: Option<char>,
    /// One-shot marker: the next character closes a lazily-escaped quote.
    lazy_end: Option<char>,
    out: String,
    entity: String,
}

impl<'s> SyntaxMachine<'s> {
    fn new(syntax: &'s ScanSyntax) -> Self {
        Self {
            syntax,
            state: UntilState::Scan,
            quote_end: '\0',
            quote_escape: None,
            lazy_end: None,
            out: String::new(),
            entity: String::new(),
        }
    }

    /// Feeds one character. Returns `Ok(true)` when the stop filter matched;
    /// the matching character is not part of the output and the caller must
    /// not consume it.
    fn step(&mut self, cp: char, stop: &dyn CharFilter) -> Result<bool, ScanError> {
        match self.state {
            UntilState::Scan => {
                if stop.accept(cp) {
                    return Ok(true);
                }
                if self.syntax.escape == Some(cp) {
                    self.state = UntilState::Escape;
                } else if self.syntax.entity_start == Some(cp) {
                    self.entity.clear();
                    self.state = UntilState::Entity;
                } else if !self.open_quote(cp) {
                    self.out.push(cp);
                }
                Ok(false)
            }
            UntilState::Escape => {
                self.out.push(cp);
                self.state = UntilState::Scan;
                Ok(false)
            }
            UntilState::Quote => {
                if self.lazy_end == Some(cp) {
                    // Doubled quote right after a lazy open: a literal quote,
                    // no quotation remains active.
                    self.lazy_end = None;
                    self.out.push(cp);
                    self.state = UntilState::Scan;
                    return Ok(false);
                }
                self.lazy_end = None;
                if self.quote_escape == Some(cp) {
                    self.state = UntilState::QuoteEscape;
                } else if cp == self.quote_end {
                    self.state = UntilState::Scan;
                } else {
                    self.out.push(cp);
                }
                Ok(false)
            }
            UntilState::QuoteEscape => {
                if cp == self.quote_end {
                    // Escaped quote-end: a literal quote, still inside.
                    self.out.push(cp);
                    self.state = UntilState::Quote;
                    Ok(false)
                } else if self.quote_escape == Some(self.quote_end) {
                    // The escape was the quote-end itself: the quotation
                    // ended there and the current character is plain text.
                    self.state = UntilState::Scan;
                    self.out.push(cp);
                    Ok(false)
                } else {
                    // The escape did not escape anything: it was a regular
                    // character, and the current one is re-interpreted
                    // inside the quotation.
                    if let Some(escape) = self.quote_escape {
                        self.out.push(escape);
                    }
                    self.state = UntilState::Quote;
                    self.step(cp, stop)
                }
            }
            UntilState::Entity => {
                if self.syntax.entity_end == Some(cp) {
                    let replacement = self.syntax.resolve_entity(&self.entity)?;
                    self.out.push_str(&replacement);
                    self.state = UntilState::Scan;
                } else {
                    self.entity.push(cp);
                }
                Ok(false)
            }
        }
    }

    /// Starts a quotation if `cp` is a quote-start. Returns `true` when a
    /// quotation was opened (the quote character is not copied).
    fn open_quote(&mut self, cp: char) -> bool {
        let s = self.syntax;
        let frame = if s.quote_start == Some(cp) {
            s.quote_end
                .map(|end| (end, s.quote_escape, s.quote_escape_lazy))
        } else if s.alt_quote_start == Some(cp) {
            s.alt_quote_end
                .map(|end| (end, s.alt_quote_escape, s.alt_quote_escape_lazy))
        } else {
            None
        };
        let Some((end, escape, lazy)) = frame else {
            return false;
        };
        self.quote_end = end;
        self.quote_escape = escape;
        self.state = UntilState::Quote;
        self.lazy_end = None;
        if lazy && escape == Some(end) && cp == end {
            self.lazy_end = Some(end);
        }
        true
    }

    /// The accumulated output at end of text. A pending quote-escape or
    /// escape and an unterminated entity body are dropped.
    fn finish(self) -> String {
        self.out
    }
}

impl CharScanner {
    /// Reads until `stop` is consumed. At end of text without a stop, returns
    /// the accumulated text when `accept_eot` is `true` and `None` otherwise.
    pub fn read_until(
        &mut self,
        stop: char,
        accept_eot: bool,
    ) -> Result<Option<String>, ScanError> {
        if !self.has_next()? {
            return Ok(eot_result(accept_eot, String::new()));
        }
        self.scratch.clear();
        loop {
            while self.offset < self.limit {
                let cp = self.buffer[self.offset];
                self.consume_cp(cp);
                if cp == stop {
                    return Ok(Some(self.scratch.clone()));
                }
                self.scratch.push(cp);
            }
            if !self.fill()? {
                return Ok(eot_result(accept_eot, self.scratch.clone()));
            }
        }
    }

    /// Reads until an unescaped `stop` is consumed. `escape` makes the next
    /// character literal; when `escape == stop`, a lone occurrence followed
    /// by anything else terminates the scan, yielding the accumulated text
    /// and leaving the follower unconsumed.
    pub fn read_until_escaped(
        &mut self,
        stop: char,
        accept_eot: bool,
        escape: char,
    ) -> Result<Option<String>, ScanError> {
        if !self.has_next()? {
            return Ok(eot_result(accept_eot, String::new()));
        }
        self.scratch.clear();
        loop {
            while self.offset < self.limit {
                let cp = self.buffer[self.offset];
                self.consume_cp(cp);
                if cp == escape {
                    if self.offset >= self.limit && !self.fill()? {
                        return Ok(eot_result(accept_eot, self.scratch.clone()));
                    }
                    let next = self.buffer[self.offset];
                    if escape == stop && next != stop {
                        return Ok(Some(self.scratch.clone()));
                    }
                    self.scratch.push(next);
                    self.consume_cp(next);
                } else if cp == stop {
                    return Ok(Some(self.scratch.clone()));
                } else {
                    self.scratch.push(cp);
                }
            }
            if !self.fill()? {
                return Ok(eot_result(accept_eot, self.scratch.clone()));
            }
        }
    }

    /// Reads until a character accepted by `filter`, leaving that character
    /// unconsumed.
    pub fn read_until_filter(
        &mut self,
        filter: &dyn CharFilter,
        accept_eot: bool,
    ) -> Result<Option<String>, ScanError> {
        if !self.has_next()? {
            return Ok(eot_result(accept_eot, String::new()));
        }
        self.scratch.clear();
        loop {
            while self.offset < self.limit {
                let cp = self.buffer[self.offset];
                if filter.accept(cp) {
                    return Ok(Some(self.scratch.clone()));
                }
                self.scratch.push(cp);
                self.consume_cp(cp);
            }
            if !self.fill()? {
                return Ok(eot_result(accept_eot, self.scratch.clone()));
            }
        }
    }

    /// Reads until a character accepted by `stop_filter` (unconsumed) or a
    /// full match of `stop` (also unconsumed). Needs lookahead of the length
    /// of `stop`. `trim == true` skips leading spaces and strips trailing
    /// spaces from the result.
    pub fn read_until_stop_string(
        &mut self,
        stop_filter: &dyn CharFilter,
        accept_eot: bool,
        stop: &str,
        ignore_case: bool,
        trim: bool,
    ) -> Result<Option<String>, ScanError> {
        if stop.is_empty() {
            return Ok(Some(String::new()));
        }
        let stop_chars: alloc::vec::Vec<char> = if ignore_case {
            stop.chars().map(lower).collect()
        } else {
            stop.chars().collect()
        };
        self.verify_lookahead(stop_chars.len())?;
        if !self.has_next()? {
            return Ok(eot_result(accept_eot, String::new()));
        }
        if trim {
            self.skip_while_char(' ')?;
        }
        let first = stop_chars[0];
        self.scratch.clear();
        let mut pending_spaces = 0usize;
        loop {
            while self.offset < self.limit {
                let cp = self.buffer[self.offset];
                if stop_filter.accept(cp) {
                    return Ok(Some(self.scratch.clone()));
                }
                if (cp == first || (ignore_case && lower(cp) == first))
                    && self.matches_ahead(&stop_chars, ignore_case)?
                {
                    return Ok(Some(self.scratch.clone()));
                }
                if trim && cp == ' ' {
                    pending_spaces += 1;
                } else {
                    while pending_spaces > 0 {
                        self.scratch.push(' ');
                        pending_spaces -= 1;
                    }
                    self.scratch.push(cp);
                }
                self.consume_cp(cp);
            }
            if !self.fill()? {
                return Ok(eot_result(accept_eot, self.scratch.clone()));
            }
        }
    }

    /// Syntax-driven scan stopping at `stop`, which is consumed (use
    /// [`read_until_syntax_filter`](Self::read_until_syntax_filter) to leave
    /// the stop unconsumed). Quotations are unwrapped, escapes resolved and
    /// entities replaced per `syntax`.
    pub fn read_until_syntax(
        &mut self,
        stop: char,
        accept_eot: bool,
        syntax: &ScanSyntax,
    ) -> Result<Option<String>, ScanError> {
        let stop_filter = crate::filter::filter_fn(move |c| c == stop);
        let result = self.read_until_syntax_filter(&stop_filter, accept_eot, syntax)?;
        self.expect_one(stop)?;
        Ok(result)
    }

    /// Syntax-driven scan stopping at the first character accepted by
    /// `filter` outside quotations and entities; the stop character is not
    /// consumed.
    pub fn read_until_syntax_filter(
        &mut self,
        filter: &dyn CharFilter,
        accept_eot: bool,
        syntax: &ScanSyntax,
    ) -> Result<Option<String>, ScanError> {
        if !self.has_next()? {
            return Ok(eot_result(accept_eot, String::new()));
        }
        let mut machine = SyntaxMachine::new(syntax);
        loop {
            while self.offset < self.limit {
                let cp = self.buffer[self.offset];
                if machine.step(cp, filter)? {
                    return Ok(Some(machine.finish()));
                }
                self.consume_cp(cp);
            }
            if !self.fill()? {
                return Ok(if accept_eot {
                    Some(machine.finish())
                } else {
                    None
                });
            }
        }
    }
}

fn eot_result(accept_eot: bool, accumulated: String) -> Option<String> {
    if accept_eot {
        Some(accumulated)
    } else {
        None
    }
}
