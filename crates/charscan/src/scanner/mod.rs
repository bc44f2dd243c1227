//! The scanner state machine: buffer/lookahead discipline and the cursor,
//! expect, skip and read primitives.
//!
//! State is one struct with a tagged backing: an in-memory text holds the
//! entire input as the buffer and is at end-of-stream from the start, a
//! streaming backing refills a bounded window from a [`CharRead`] and keeps a
//! second window of the same size to service lookahead requests that cross
//! the primary window.
//!
//! Invariants kept by every public operation:
//! - `0 <= offset <= limit`;
//! - `line`/`column` advance exactly once per consumed character (`\n`
//!   increments the line and resets the column, everything else, `\r`
//!   included, increments the column);
//! - lookahead requests validate against the capacity before consuming
//!   anything;
//! - the backing source is released exactly once, on end-of-stream, read
//!   failure or [`close`](CharScanner::close).

mod literal;
mod number;
mod until;

use alloc::{
    boxed::Box,
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

use crate::error::ScanError;
use crate::filter::CharFilter;
use crate::message::{DefaultMessageHandler, MessageHandler, ScanMessage, Severity};
use crate::source::CharRead;

/// Default window capacity of a streaming scanner, in characters.
pub const DEFAULT_CAPACITY: usize = 4096;

enum Backing {
    /// In-memory text: the whole input is the buffer, EOS from the start.
    Text,
    /// Reader-backed stream with a bounded window and a secondary lookahead
    /// window of the same capacity.
    Stream {
        /// `None` once the source has been released (EOS, error or close).
        reader: Option<Box<dyn CharRead>>,
        lookahead: Vec<char>,
        lookahead_limit: usize,
        capacity: usize,
    },
}

/// A cursor over a stream of characters with bounded lookahead.
///
/// Instances are single-threaded by design; every operation is fully ordered
/// with respect to prior operations on the same instance.
pub struct CharScanner {
    buffer: Vec<char>,
    /// Index of the next character to consume.
    offset: usize,
    /// One past the last valid character in `buffer`.
    limit: usize,
    /// Characters consumed before the current buffer.
    position: usize,
    line: u32,
    column: u32,
    /// Reusable builder for reads that cross a refill.
    scratch: String,
    handler: Box<dyn MessageHandler>,
    closed: bool,
    backing: Backing,
}

impl CharScanner {
    /// Creates a scanner over an in-memory text. The entire text is the
    /// buffer, so lookahead is unbounded.
    pub fn of(text: &str) -> Self {
        Self::of_with_handler(text, Box::new(DefaultMessageHandler::new()))
    }

    /// Like [`of`](Self::of) with a custom message handler.
    pub fn of_with_handler(text: &str, handler: Box<dyn MessageHandler>) -> Self {
        let buffer: Vec<char> = text.chars().collect();
        let limit = buffer.len();
        Self {
            buffer,
            offset: 0,
            limit,
            position: 0,
            line: 1,
            column: 1,
            scratch: String::new(),
            handler,
            closed: false,
            backing: Backing::Text,
        }
    }

    /// Creates a streaming scanner with the default capacity of
    /// [`DEFAULT_CAPACITY`] characters.
    pub fn from_reader(reader: impl CharRead + 'static) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, reader)
    }

    /// Creates a streaming scanner. `capacity` bounds both the window and the
    /// lookahead available to operations like
    /// [`expect_at`](Self::expect_at) and [`peek_at`](Self::peek_at).
    pub fn with_capacity(capacity: usize, reader: impl CharRead + 'static) -> Self {
        Self::with_capacity_and_handler(capacity, reader, Box::new(DefaultMessageHandler::new()))
    }

    /// Like [`with_capacity`](Self::with_capacity) with a custom message
    /// handler.
    pub fn with_capacity_and_handler(
        capacity: usize,
        reader: impl CharRead + 'static,
        handler: Box<dyn MessageHandler>,
    ) -> Self {
        Self {
            buffer: Vec::new(),
            offset: 0,
            limit: 0,
            position: 0,
            line: 1,
            column: 1,
            scratch: String::new(),
            handler,
            closed: false,
            backing: Backing::Stream {
                reader: Some(Box::new(reader)),
                lookahead: Vec::new(),
                lookahead_limit: 0,
                capacity: capacity.max(1),
            },
        }
    }

    /// Number of characters consumed since construction.
    pub fn position(&self) -> usize {
        self.position + self.offset
    }

    /// 1-based line of the next character to consume.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-based column of the next character to consume.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// The messages collected by the message handler so far.
    pub fn messages(&self) -> &[ScanMessage] {
        self.handler.messages()
    }

    /// Hands a pre-built message to the message handler.
    pub fn add_message(&mut self, message: ScanMessage) -> Result<(), ScanError> {
        self.handler.handle(message)
    }

    /// Closes the scanner, releasing the backing source. Idempotent; every
    /// operation after the first close fails with [`ScanError::Closed`].
    pub fn close(&mut self) {
        self.release_source();
        self.closed = true;
    }

    // ------------------------------------------------------------------
    // Buffer discipline
    // ------------------------------------------------------------------

    pub(crate) fn ensure_open(&self) -> Result<(), ScanError> {
        if self.closed {
            return Err(ScanError::Closed);
        }
        Ok(())
    }

    fn is_eos(&self) -> bool {
        match &self.backing {
            Backing::Text => true,
            Backing::Stream { reader, .. } => reader.is_none(),
        }
    }

    fn lookahead_limit(&self) -> usize {
        match &self.backing {
            Backing::Text => 0,
            Backing::Stream {
                lookahead_limit, ..
            } => *lookahead_limit,
        }
    }

    fn release_source(&mut self) {
        if let Backing::Stream { reader, .. } = &mut self.backing {
            *reader = None;
        }
    }

    /// Updates line/column and advances the offset past the given character.
    pub(crate) fn consume_cp(&mut self, cp: char) {
        if cp == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.offset += 1;
    }

    /// Advances `offset` character by character so line/column stay correct.
    fn set_offset(&mut self, new_offset: usize) {
        debug_assert!(new_offset >= self.offset && new_offset <= self.limit);
        while self.offset < new_offset {
            let cp = self.buffer[self.offset];
            self.consume_cp(cp);
        }
    }

    /// Consumes the rest of the primary buffer and refills it: swaps in the
    /// lookahead window if present, otherwise reads from the backing source.
    /// Returns `false` on end-of-stream.
    pub(crate) fn fill(&mut self) -> Result<bool, ScanError> {
        if matches!(self.backing, Backing::Text) {
            return Ok(false);
        }
        if self.lookahead_limit() > 0 {
            self.shift_lookahead();
            return Ok(true);
        }
        if self.is_eos() {
            self.limit = self.offset;
            return Ok(false);
        }
        self.set_offset(self.limit);
        self.position += self.limit;
        self.offset = 0;
        self.limit = 0;
        self.limit = self.read_window(false)?;
        Ok(self.limit > 0)
    }

    /// Ensures the secondary window is populated (`true`) or the backing
    /// source is exhausted (`false`). Idempotent.
    fn fill_lookahead(&mut self) -> Result<bool, ScanError> {
        if self.lookahead_limit() > 0 {
            return Ok(true);
        }
        if self.is_eos() {
            return Ok(false);
        }
        let filled = self.read_window(true)?;
        if filled == 0 {
            return Ok(false);
        }
        if let Backing::Stream {
            lookahead_limit, ..
        } = &mut self.backing
        {
            *lookahead_limit = filled;
        }
        Ok(true)
    }

    /// Reads from the backing source into the primary (`into_lookahead ==
    /// false`) or lookahead window until the window is full or the stream
    /// ends. A read failure releases the source.
    fn read_window(&mut self, into_lookahead: bool) -> Result<usize, ScanError> {
        let mut filled = 0;
        let mut eof = false;
        let mut failure = None;
        if let Backing::Stream {
            reader: Some(reader),
            lookahead,
            capacity,
            ..
        } = &mut self.backing
        {
            let capacity = *capacity;
            let window = if into_lookahead {
                lookahead
            } else {
                &mut self.buffer
            };
            if window.len() != capacity {
                window.resize(capacity, '\0');
            }
            while filled < capacity {
                match reader.read(&mut window[filled..capacity]) {
                    Ok(0) => {
                        eof = true;
                        break;
                    }
                    Ok(read) => filled += read,
                    Err(error) => {
                        failure = Some(error);
                        break;
                    }
                }
            }
        }
        if let Some(error) = failure {
            self.release_source();
            return Err(ScanError::Read(error.to_string()));
        }
        if eof {
            self.release_source();
        }
        Ok(filled)
    }

    /// Swaps the lookahead window in as the primary buffer.
    fn shift_lookahead(&mut self) {
        self.set_offset(self.limit);
        self.position += self.limit;
        if let Backing::Stream {
            lookahead,
            lookahead_limit,
            ..
        } = &mut self.backing
        {
            core::mem::swap(&mut self.buffer, lookahead);
            self.offset = 0;
            self.limit = *lookahead_limit;
            *lookahead_limit = 0;
        }
    }

    /// Fails fast when a lookahead of `length` characters cannot be serviced
    /// by the configured capacity. No state change.
    pub(crate) fn verify_lookahead(&self, length: usize) -> Result<(), ScanError> {
        if let Backing::Stream { capacity, .. } = &self.backing {
            if length > *capacity {
                return Err(ScanError::Lookahead {
                    requested: length,
                    capacity: *capacity,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn emit_message(
        &mut self,
        severity: Severity,
        text: String,
    ) -> Result<(), ScanError> {
        let message = ScanMessage {
            severity,
            line: self.line,
            column: self.column,
            text,
        };
        self.handler.handle(message)
    }

    // ------------------------------------------------------------------
    // Basic cursor
    // ------------------------------------------------------------------

    /// Returns `true` iff at least one character is reachable from the
    /// current position, refilling the buffer if necessary.
    pub fn has_next(&mut self) -> Result<bool, ScanError> {
        self.ensure_open()?;
        if self.offset < self.limit {
            return Ok(true);
        }
        self.fill()
    }

    /// Consumes and returns the next character, or `None` at end of text.
    pub fn next(&mut self) -> Result<Option<char>, ScanError> {
        if !self.has_next()? {
            return Ok(None);
        }
        let cp = self.buffer[self.offset];
        self.consume_cp(cp);
        Ok(Some(cp))
    }

    /// Returns the next character without consuming it.
    pub fn peek(&mut self) -> Result<Option<char>, ScanError> {
        if !self.has_next()? {
            return Ok(None);
        }
        Ok(Some(self.buffer[self.offset]))
    }

    /// Returns the character `lookahead_offset` positions ahead of the cursor
    /// without consuming anything. For a streaming scanner this may populate
    /// the lookahead window; an offset that cannot be serviced by the
    /// configured capacity is a [`ScanError::Lookahead`] error.
    pub fn peek_at(&mut self, lookahead_offset: usize) -> Result<Option<char>, ScanError> {
        if !self.has_next()? {
            return Ok(None);
        }
        let index = self.offset + lookahead_offset;
        if index < self.limit {
            return Ok(Some(self.buffer[index]));
        }
        if matches!(self.backing, Backing::Text) {
            return Ok(None);
        }
        if !self.fill_lookahead()? {
            return Ok(None);
        }
        let index = index - self.limit;
        if let Backing::Stream {
            lookahead,
            lookahead_limit,
            capacity,
            ..
        } = &self.backing
        {
            if index < *lookahead_limit {
                return Ok(Some(lookahead[index]));
            }
            if self.is_eos() {
                return Ok(None);
            }
            return Err(ScanError::Lookahead {
                requested: lookahead_offset,
                capacity: *capacity,
            });
        }
        Ok(None)
    }

    /// Returns up to `count` characters ahead of the cursor as a string
    /// without consuming them. Shorter than `count` only at end of text.
    pub fn peek_string(&mut self, count: usize) -> Result<String, ScanError> {
        if count == 0 || !self.has_next()? {
            return Ok(String::new());
        }
        let rest = self.limit - self.offset;
        if rest >= count {
            return Ok(self.buffer[self.offset..self.offset + count].iter().collect());
        }
        if matches!(self.backing, Backing::Text) {
            return Ok(self.buffer[self.offset..self.limit].iter().collect());
        }
        if !self.fill_lookahead()? {
            return Ok(self.buffer[self.offset..self.limit].iter().collect());
        }
        if let Backing::Stream {
            lookahead,
            lookahead_limit,
            capacity,
            ..
        } = &self.backing
        {
            let full_rest = rest + *lookahead_limit;
            if count > full_rest && !self.is_eos() {
                return Err(ScanError::Lookahead {
                    requested: count,
                    capacity: *capacity,
                });
            }
            let take = (count - rest).min(*lookahead_limit);
            let mut out = String::with_capacity(rest + take);
            out.extend(&self.buffer[self.offset..self.limit]);
            out.extend(&lookahead[..take]);
            return Ok(out);
        }
        Ok(String::new())
    }

    /// Returns the characters matching `filter` ahead of the cursor, up to
    /// `max_len`, without consuming them. `max_len` beyond the lookahead
    /// capacity of a streaming scanner is a configuration error.
    pub fn peek_while(
        &mut self,
        filter: &dyn CharFilter,
        max_len: usize,
    ) -> Result<String, ScanError> {
        if !self.has_next()? {
            return Ok(String::new());
        }
        let end = self.limit.min(self.offset.saturating_add(max_len));
        let mut index = self.offset;
        while index < end {
            if !filter.accept(self.buffer[index]) {
                return Ok(self.buffer[self.offset..index].iter().collect());
            }
            index += 1;
        }
        let rest = index - self.offset;
        if rest == max_len || matches!(self.backing, Backing::Text) || !self.fill_lookahead()? {
            return Ok(self.buffer[self.offset..index].iter().collect());
        }
        if let Backing::Stream {
            lookahead,
            lookahead_limit,
            capacity,
            ..
        } = &self.backing
        {
            let full_rest = rest + *lookahead_limit;
            if max_len > full_rest && !self.is_eos() {
                return Err(ScanError::Lookahead {
                    requested: max_len,
                    capacity: *capacity,
                });
            }
            let end = (max_len - rest).min(*lookahead_limit);
            let mut ahead = 0;
            while ahead < end {
                if !filter.accept(lookahead[ahead]) {
                    break;
                }
                ahead += 1;
            }
            let mut out = String::with_capacity(rest + ahead);
            out.extend(&self.buffer[self.offset..self.limit]);
            out.extend(&lookahead[..ahead]);
            return Ok(out);
        }
        Ok(String::new())
    }

    /// Consumes up to `count` characters and returns them. Shorter than
    /// `count` only at end of text; pass `usize::MAX` to read everything.
    pub fn read(&mut self, count: usize) -> Result<String, ScanError> {
        if count == 0 || !self.has_next()? {
            return Ok(String::new());
        }
        self.scratch.clear();
        let mut remain = count;
        loop {
            let take = (self.limit - self.offset).min(remain);
            let end = self.offset + take;
            while self.offset < end {
                let cp = self.buffer[self.offset];
                self.scratch.push(cp);
                self.consume_cp(cp);
            }
            remain -= take;
            if remain == 0 || !self.fill()? {
                return Ok(self.scratch.clone());
            }
        }
    }

    // ------------------------------------------------------------------
    // Match/expect
    // ------------------------------------------------------------------

    /// Atomic expectation: if `expected` matches completely at the cursor the
    /// scanner advances past it, otherwise the state is unchanged.
    pub fn expect(&mut self, expected: &str, ignore_case: bool) -> Result<bool, ScanError> {
        self.expect_at(expected, ignore_case, false, 0)
    }

    /// Atomic non-consuming check for `expected` at the cursor.
    pub fn expect_lookahead(
        &mut self,
        expected: &str,
        ignore_case: bool,
    ) -> Result<bool, ScanError> {
        self.expect_at(expected, ignore_case, true, 0)
    }

    /// Atomic expectation at `off` characters ahead of the cursor: on a full
    /// match either advances past the offset and the match (`lookahead ==
    /// false`) or leaves the state unchanged (`lookahead == true`); on a
    /// mismatch the state is unchanged. Needs lookahead of `off` plus the
    /// length of `expected`.
    pub fn expect_at(
        &mut self,
        expected: &str,
        ignore_case: bool,
        lookahead: bool,
        off: usize,
    ) -> Result<bool, ScanError> {
        let len = expected.chars().count();
        if len == 0 {
            return Ok(true);
        }
        if !self.has_next()? {
            return Ok(false);
        }
        if matches!(self.backing, Backing::Stream { .. }) && !self.is_eos() {
            self.verify_lookahead(off + len)?;
        }
        let mut ahead = off;
        for exp in expected.chars() {
            match self.peek_at(ahead)? {
                Some(cp) if chars_match(cp, exp, ignore_case) => ahead += 1,
                _ => return Ok(false),
            }
        }
        if !lookahead {
            self.skip(off + len)?;
        }
        Ok(true)
    }

    /// Non-atomic expectation: consumes the longest common prefix of the
    /// input and `expected`, returning `false` on the first mismatch. Use
    /// only when partial consumption is acceptable.
    pub fn expect_unsafe(&mut self, expected: &str, ignore_case: bool) -> Result<bool, ScanError> {
        for exp in expected.chars() {
            if !self.has_next()? {
                return Ok(false);
            }
            let cp = self.buffer[self.offset];
            if !chars_match(cp, exp, ignore_case) {
                return Ok(false);
            }
            self.consume_cp(cp);
        }
        Ok(true)
    }

    /// Consumes one character iff it equals `expected`.
    pub fn expect_one(&mut self, expected: char) -> Result<bool, ScanError> {
        if self.has_next()? && self.buffer[self.offset] == expected {
            self.consume_cp(expected);
            return Ok(true);
        }
        Ok(false)
    }

    /// Like [`expect_one`](Self::expect_one), emitting a warning message on
    /// mismatch.
    pub fn expect_one_warn(&mut self, expected: char) -> Result<bool, ScanError> {
        if self.expect_one(expected)? {
            return Ok(true);
        }
        self.emit_message(Severity::Warning, format!("Expected '{expected}'"))?;
        Ok(false)
    }

    /// Consumes one character iff `expected` accepts it.
    pub fn expect_one_filter(&mut self, expected: &dyn CharFilter) -> Result<bool, ScanError> {
        if !self.has_next()? {
            return Ok(false);
        }
        let cp = self.buffer[self.offset];
        if expected.accept(cp) {
            self.consume_cp(cp);
            return Ok(true);
        }
        Ok(false)
    }

    /// Like [`expect_unsafe`](Self::expect_unsafe) but a mismatch is an
    /// [`ScanError::Expected`] error.
    pub fn require(&mut self, expected: &str, ignore_case: bool) -> Result<(), ScanError> {
        let found_start = self.offset;
        let found_limit = self.limit;
        let found: String = self.buffer
            [found_start..found_limit.min(found_start + expected.chars().count())]
            .iter()
            .collect();
        if self.expect_unsafe(expected, ignore_case)? {
            return Ok(());
        }
        Err(ScanError::Expected {
            expected: expected.to_string(),
            found,
        })
    }

    /// Requires one character equal to `expected`.
    pub fn require_one(&mut self, expected: char) -> Result<(), ScanError> {
        if self.expect_one(expected)? {
            return Ok(());
        }
        let found = match self.peek()? {
            Some(cp) => cp.to_string(),
            None => String::new(),
        };
        Err(ScanError::Expected {
            expected: expected.to_string(),
            found,
        })
    }

    /// Skips characters matching `filter`, up to `max`; fewer than `min`
    /// matches is a [`ScanError::RequiredCharacters`] error. Returns the
    /// count.
    pub fn require_filter(
        &mut self,
        filter: &dyn CharFilter,
        min: usize,
        max: usize,
    ) -> Result<usize, ScanError> {
        check_min_max(min, max)?;
        let count = self.skip_while_max(filter, max)?;
        if count < min {
            return Err(ScanError::RequiredCharacters {
                min,
                description: filter.description().to_string(),
                found: count,
            });
        }
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Skip/read while
    // ------------------------------------------------------------------

    /// Consumes up to `count` characters across refills and returns how many
    /// were actually consumed.
    pub fn skip(&mut self, count: usize) -> Result<usize, ScanError> {
        if count == 0 || !self.has_next()? {
            return Ok(0);
        }
        let mut skipped = 0;
        let mut remain = count;
        loop {
            let window = self.limit - self.offset;
            if window >= remain {
                self.set_offset(self.offset + remain);
                return Ok(count);
            }
            self.set_offset(self.limit);
            skipped += window;
            remain -= window;
            if !self.fill()? {
                return Ok(skipped);
            }
        }
    }

    /// Consumes `\n`, `\r\n` (also across a refill) as one logical newline
    /// and returns the number of characters consumed (0 if the cursor is not
    /// at a newline; a bare `\r` is not consumed).
    pub fn skip_newline(&mut self) -> Result<usize, ScanError> {
        if !self.has_next()? {
            return Ok(0);
        }
        match self.buffer[self.offset] {
            '\n' => {
                self.consume_cp('\n');
                Ok(1)
            }
            '\r' => {
                if self.offset + 1 < self.limit {
                    if self.buffer[self.offset + 1] == '\n' {
                        self.consume_cp('\r');
                        self.consume_cp('\n');
                        return Ok(2);
                    }
                    Ok(0)
                } else if self.peek_at(1)? == Some('\n') {
                    self.skip(2)?;
                    Ok(2)
                } else {
                    Ok(0)
                }
            }
            _ => Ok(0),
        }
    }

    /// Consumes characters until `stop` was consumed (`true`) or the end of
    /// text was reached (`false`).
    pub fn skip_until(&mut self, stop: char) -> Result<bool, ScanError> {
        while self.has_next()? {
            while self.offset < self.limit {
                let cp = self.buffer[self.offset];
                self.consume_cp(cp);
                if cp == stop {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Like [`skip_until`](Self::skip_until), treating `escape` as "the next
    /// character is literal" (a doubled escape is the escape itself).
    pub fn skip_until_escaped(&mut self, stop: char, escape: char) -> Result<bool, ScanError> {
        let mut escape_active = false;
        while self.has_next()? {
            while self.offset < self.limit {
                let cp = self.buffer[self.offset];
                self.consume_cp(cp);
                if cp == escape {
                    escape_active = !escape_active;
                } else {
                    if cp == stop && !escape_active {
                        return Ok(true);
                    }
                    escape_active = false;
                }
            }
        }
        Ok(false)
    }

    /// Consumes characters equal to `c` and returns the count.
    pub fn skip_while_char(&mut self, c: char) -> Result<usize, ScanError> {
        let mut count = 0;
        while self.has_next()? {
            while self.offset < self.limit {
                if self.buffer[self.offset] != c {
                    return Ok(count);
                }
                self.consume_cp(c);
                count += 1;
            }
        }
        Ok(count)
    }

    /// Consumes characters matching `filter` and returns the count.
    pub fn skip_while(&mut self, filter: &dyn CharFilter) -> Result<usize, ScanError> {
        self.skip_while_max(filter, usize::MAX)
    }

    /// Consumes up to `max` characters matching `filter` and returns the
    /// count.
    pub fn skip_while_max(
        &mut self,
        filter: &dyn CharFilter,
        max: usize,
    ) -> Result<usize, ScanError> {
        let mut remain = max;
        while remain > 0 && self.has_next()? {
            let end = self.limit.min(self.offset.saturating_add(remain));
            let mut stopped = false;
            while self.offset < end {
                let cp = self.buffer[self.offset];
                if !filter.accept(cp) {
                    stopped = true;
                    break;
                }
                self.consume_cp(cp);
                remain -= 1;
            }
            if stopped {
                break;
            }
        }
        Ok(max - remain)
    }

    /// Reads characters matching `filter` until the first mismatch.
    pub fn read_while(&mut self, filter: &dyn CharFilter) -> Result<String, ScanError> {
        self.read_while_bounded(filter, 0, usize::MAX)
    }

    /// Reads up to `max` characters matching `filter`.
    pub fn read_while_max(
        &mut self,
        filter: &dyn CharFilter,
        max: usize,
    ) -> Result<String, ScanError> {
        self.read_while_bounded(filter, 0, max)
    }

    /// Reads between `min` and `max` characters matching `filter`. Fewer than
    /// `min` matches is a [`ScanError::RequiredCharacters`] error.
    pub fn read_while_bounded(
        &mut self,
        filter: &dyn CharFilter,
        min: usize,
        max: usize,
    ) -> Result<String, ScanError> {
        check_min_max(min, max)?;
        self.ensure_open()?;
        self.scratch.clear();
        let mut count = 0;
        if self.offset >= self.limit {
            self.fill()?;
        }
        let mut remain = max;
        'scan: while remain > 0 {
            let end = self.limit.min(self.offset.saturating_add(remain));
            while self.offset < end {
                let cp = self.buffer[self.offset];
                if !filter.accept(cp) {
                    break 'scan;
                }
                self.scratch.push(cp);
                self.consume_cp(cp);
                count += 1;
                remain -= 1;
            }
            if remain == 0 || !self.fill()? {
                break;
            }
        }
        if count < min {
            return Err(ScanError::RequiredCharacters {
                min,
                description: filter.description().to_string(),
                found: count,
            });
        }
        Ok(self.scratch.clone())
    }

    /// Scans forward until `substring` appears (consuming it, `true`), a
    /// character accepted by `stop_filter` is reached (not consumed,
    /// `false`), or the end of text is reached (`false`).
    pub fn skip_over(
        &mut self,
        substring: &str,
        ignore_case: bool,
        stop_filter: Option<&dyn CharFilter>,
    ) -> Result<bool, ScanError> {
        let sub = fold_chars(substring, ignore_case);
        if sub.is_empty() {
            return Ok(true);
        }
        self.verify_lookahead(sub.len())?;
        if !self.has_next()? {
            return Ok(false);
        }
        let first = sub[0];
        loop {
            while self.offset < self.limit {
                let cp = self.buffer[self.offset];
                if let Some(filter) = stop_filter {
                    if filter.accept(cp) {
                        return Ok(false);
                    }
                }
                if cp == first || (ignore_case && lower(cp) == first) {
                    if self.matches_ahead(&sub, ignore_case)? {
                        self.skip(sub.len())?;
                        return Ok(true);
                    }
                }
                self.consume_cp(cp);
            }
            if !self.fill()? {
                return Ok(false);
            }
        }
    }

    /// Checks whether the (case-folded) characters of `sub` are next at the
    /// cursor, without consuming anything. `sub[0]` is assumed checked.
    pub(crate) fn matches_ahead(
        &mut self,
        sub: &[char],
        ignore_case: bool,
    ) -> Result<bool, ScanError> {
        for (index, &expected) in sub.iter().enumerate().skip(1) {
            match self.peek_at(index)? {
                Some(cp) if cp == expected || (ignore_case && lower(cp) == expected) => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Line reading
    // ------------------------------------------------------------------

    /// Reads up to and including the next line terminator (`\n`, `\r\n` or a
    /// bare `\r`) and returns the line without the terminator. Returns `None`
    /// only when already at end of text. `trim == true` strips leading and
    /// trailing spaces from the result without altering consumption.
    pub fn read_line(&mut self, trim: bool) -> Result<Option<String>, ScanError> {
        if !self.has_next()? {
            return Ok(None);
        }
        if trim {
            self.skip_while_char(' ')?;
        }
        self.scratch.clear();
        let mut pending_spaces = 0usize;
        loop {
            while self.offset < self.limit {
                let cp = self.buffer[self.offset];
                match cp {
                    '\n' => {
                        self.consume_cp(cp);
                        return Ok(Some(self.scratch.clone()));
                    }
                    '\r' => {
                        self.consume_cp(cp);
                        if self.offset >= self.limit && !self.fill()? {
                            return Ok(Some(self.scratch.clone()));
                        }
                        if self.offset < self.limit && self.buffer[self.offset] == '\n' {
                            self.consume_cp('\n');
                        }
                        return Ok(Some(self.scratch.clone()));
                    }
                    ' ' if trim => {
                        pending_spaces += 1;
                        self.consume_cp(cp);
                    }
                    _ => {
                        while pending_spaces > 0 {
                            self.scratch.push(' ');
                            pending_spaces -= 1;
                        }
                        self.scratch.push(cp);
                        self.consume_cp(cp);
                    }
                }
            }
            if !self.fill()? {
                return Ok(Some(self.scratch.clone()));
            }
        }
    }

    // ------------------------------------------------------------------
    // Debugging
    // ------------------------------------------------------------------

    /// The characters already parsed but still available in the buffer. For
    /// debugging and error messages.
    pub fn buffer_parsed(&self) -> String {
        self.buffer[..self.offset].iter().collect()
    }

    /// The buffered characters not yet parsed (including the lookahead
    /// window of a streaming scanner).
    pub fn buffer_to_parse(&self) -> String {
        if self.offset >= self.limit {
            return String::new();
        }
        let mut out: String = self.buffer[self.offset..self.limit].iter().collect();
        if let Backing::Stream {
            lookahead,
            lookahead_limit,
            ..
        } = &self.backing
        {
            out.extend(&lookahead[..*lookahead_limit]);
        }
        out
    }
}

impl fmt::Display for CharScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}«{}»", self.buffer_parsed(), self.buffer_to_parse())
    }
}

impl fmt::Debug for CharScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharScanner")
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .field("position", &self.position())
            .field("line", &self.line)
            .field("column", &self.column)
            .field("closed", &self.closed)
            .field("streaming", &matches!(self.backing, Backing::Stream { .. }))
            .finish()
    }
}

/// Case-folds one character the way single-character comparisons do.
pub(crate) fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

pub(crate) fn chars_match(cp: char, expected: char, ignore_case: bool) -> bool {
    cp == expected || (ignore_case && lower(cp) == lower(expected))
}

fn fold_chars(text: &str, ignore_case: bool) -> Vec<char> {
    if ignore_case {
        text.chars().map(lower).collect()
    } else {
        text.chars().collect()
    }
}

fn check_min_max(min: usize, max: usize) -> Result<(), ScanError> {
    if max < min {
        return Err(ScanError::InvalidArgument(format!(
            "Min ({min}) must be less or equal to max ({max})"
        )));
    }
    Ok(())
}
