//! The backing source contract of a streaming scanner.
//!
//! The scanner only cares about the fill contract: a [`CharRead`] delivers
//! decoded characters into a window and signals end-of-stream by returning
//! `Ok(0)`. For production I/O implement [`CharRead`] for your input source;
//! [`StrReader`] adapts in-memory text, optionally in fixed-size chunks to
//! exercise refill boundaries the way a real stream would.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

use thiserror::Error;

/// Failure of a backing source. The scanner releases the source and surfaces
/// this as [`ScanError::Read`](crate::ScanError::Read).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ReadError {
    message: String,
}

impl ReadError {
    pub fn new(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// A pull source of decoded characters.
pub trait CharRead {
    /// Reads characters into `buf` and returns how many were delivered.
    ///
    /// `Ok(0)` signals end-of-stream and must keep being returned on
    /// subsequent calls. Short reads are fine; the scanner keeps calling
    /// until its window is full or the stream ends.
    fn read(&mut self, buf: &mut [char]) -> Result<usize, ReadError>;
}

/// A [`CharRead`] over in-memory text, optionally limited to fixed-size
/// chunks per `read` call.
///
/// Chunked reading simulates streaming input and is the workhorse of the
/// refill-boundary tests: every scan over `StrReader::chunked(text, 1)` has
/// to cross a refill between any two characters.
#[derive(Debug, Clone)]
pub struct StrReader {
    chars: Vec<char>,
    pos: usize,
    chunk: usize,
}

impl StrReader {
    /// Reads the whole text as fast as the scanner's window allows.
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            chunk: usize::MAX,
        }
    }

    /// Reads at most `chunk` characters per `read` call (minimum 1).
    pub fn chunked(text: &str, chunk: usize) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            chunk: chunk.max(1),
        }
    }
}

impl CharRead for StrReader {
    fn read(&mut self, buf: &mut [char]) -> Result<usize, ReadError> {
        let remaining = self.chars.len() - self.pos;
        let count = remaining.min(buf.len()).min(self.chunk);
        buf[..count].copy_from_slice(&self.chars[self.pos..self.pos + count]);
        self.pos += count;
        Ok(count)
    }
}

/// A [`CharRead`] that fails after delivering a prefix. Test helper for the
/// error path of `fill`.
#[cfg(test)]
pub(crate) struct FailingReader {
    prefix: StrReader,
    message: &'static str,
}

#[cfg(test)]
impl FailingReader {
    pub(crate) fn new(prefix: &str, message: &'static str) -> Self {
        Self {
            prefix: StrReader::new(prefix),
            message,
        }
    }
}

#[cfg(test)]
impl CharRead for FailingReader {
    fn read(&mut self, buf: &mut [char]) -> Result<usize, ReadError> {
        match self.prefix.read(buf)? {
            0 => Err(ReadError::new(self.message)),
            n => Ok(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CharRead, StrReader};

    #[test]
    fn full_read() {
        let mut reader = StrReader::new("hello");
        let mut buf = ['\0'; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 5);
        assert_eq!(buf[..5].iter().collect::<alloc::string::String>(), "hello");
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn chunked_read() {
        let mut reader = StrReader::chunked("hello", 2);
        let mut buf = ['\0'; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn zero_chunk_clamped() {
        let mut reader = StrReader::chunked("ab", 0);
        let mut buf = ['\0'; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
    }

    #[test]
    fn small_destination() {
        let mut reader = StrReader::new("hello");
        let mut buf = ['\0'; 3];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
    }
}
