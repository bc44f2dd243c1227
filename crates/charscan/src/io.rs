//! `std::io::Read` adapter (`std` feature).

use alloc::vec::Vec;

use std::io::Read;

use crate::source::{CharRead, ReadError};

/// Adapts a byte-oriented [`std::io::Read`] into a [`CharRead`] by decoding
/// UTF-8 incrementally. A multi-byte sequence split across two underlying
/// reads is carried over to the next call; invalid UTF-8 is a [`ReadError`].
pub struct Utf8Reader<R> {
    inner: R,
    pending: Vec<u8>,
    start: usize,
    eof: bool,
}

impl<R: Read> Utf8Reader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            start: 0,
            eof: false,
        }
    }

    fn refill(&mut self) -> Result<(), ReadError> {
        if self.start > 0 {
            self.pending.drain(..self.start);
            self.start = 0;
        }
        let mut chunk = [0u8; 4096];
        let n = self.inner.read(&mut chunk).map_err(ReadError::new)?;
        if n == 0 {
            self.eof = true;
        } else {
            self.pending.extend_from_slice(&chunk[..n]);
        }
        Ok(())
    }
}

fn utf8_len_from_lead(b0: u8) -> Option<usize> {
    if b0 < 0x80 {
        Some(1)
    } else if (0xC2..=0xDF).contains(&b0) {
        Some(2)
    } else if (0xE0..=0xEF).contains(&b0) {
        Some(3)
    } else if (0xF0..=0xF4).contains(&b0) {
        Some(4)
    } else {
        None
    }
}

impl<R: Read> CharRead for Utf8Reader<R> {
    fn read(&mut self, buf: &mut [char]) -> Result<usize, ReadError> {
        let mut decoded = 0;
        while decoded < buf.len() {
            let available = self.pending.len() - self.start;
            if available < 4 && !self.eof {
                self.refill()?;
                continue;
            }
            if available == 0 {
                break;
            }
            let bytes = &self.pending[self.start..];
            let len = utf8_len_from_lead(bytes[0])
                .ok_or_else(|| ReadError::new("invalid UTF-8 lead byte"))?;
            if bytes.len() < len {
                // EOF in the middle of a sequence (the non-EOF case refilled above).
                return Err(ReadError::new("truncated UTF-8 sequence"));
            }
            let text = core::str::from_utf8(&bytes[..len])
                .map_err(|_| ReadError::new("invalid UTF-8 sequence"))?;
            if let Some(ch) = text.chars().next() {
                buf[decoded] = ch;
                decoded += 1;
            }
            self.start += len;
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::Utf8Reader;
    use crate::source::CharRead;

    /// `std::io::Read` that delivers one byte per call, splitting every
    /// multi-byte character.
    struct ByteAtATime<'a> {
        data: &'a [u8],
        pos: usize,
    }

    impl std::io::Read for ByteAtATime<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.data.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn decodes_across_read_boundaries() {
        let text = "a\u{2022}\u{10348}z";
        let reader = ByteAtATime {
            data: text.as_bytes(),
            pos: 0,
        };
        let mut utf8 = Utf8Reader::new(reader);
        let mut buf = ['\0'; 8];
        let n = utf8.read(&mut buf).unwrap();
        assert_eq!(buf[..n].iter().collect::<alloc::string::String>(), text);
        assert_eq!(utf8.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn invalid_lead_byte() {
        let reader = ByteAtATime {
            data: &[b'a', 0xFF],
            pos: 0,
        };
        let mut utf8 = Utf8Reader::new(reader);
        let mut buf = ['\0'; 8];
        assert!(utf8.read(&mut buf).is_err());
    }

    #[test]
    fn truncated_sequence() {
        let reader = ByteAtATime {
            data: &[0xE2, 0x80],
            pos: 0,
        };
        let mut utf8 = Utf8Reader::new(reader);
        let mut buf = ['\0'; 8];
        assert!(utf8.read(&mut buf).is_err());
    }
}
