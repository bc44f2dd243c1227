//! The generic number driver and the typed convenience readers built on it.

use alloc::{format, string::String, string::ToString};

use super::CharScanner;
use crate::error::ScanError;
use crate::number::{
    JavaNumber, LangNumberParser, NumberParser, NumberTarget, RadixMode, StringNumberParser,
};

fn sign_of(cp: Option<char>) -> Option<char> {
    match cp {
        Some('+') => Some('+'),
        Some('-') => Some('-'),
        _ => None,
    }
}

/// The exponent character for the given radix: `e`/`E` for decimal numbers,
/// `p`/`P` for hex (where `E` is a digit).
fn exponent_symbol(cp: char, radix: u32) -> Option<char> {
    if radix == 16 {
        match cp {
            'p' | 'P' => Some(cp),
            _ => None,
        }
    } else {
        match cp {
            'e' | 'E' => Some(cp),
            _ => None,
        }
    }
}

impl CharScanner {
    /// Reads at most one number token at the cursor, delegating every
    /// decision to `parser`. Nothing is consumed unless the parser accepts
    /// it; a rejected leading sign leaves the scanner untouched.
    ///
    /// Digits are classified under `max(radix, 10)` so that an input like
    /// `0b1012` is consumed as one (malformed) token instead of stopping
    /// after `101` and leaving `2` in the stream.
    pub fn read_number(&mut self, parser: &mut dyn NumberParser) -> Result<(), ScanError> {
        // Number of peeked-but-unconsumed characters ahead of the cursor
        // (a pending sign, or an exponent symbol plus its sign).
        let mut skip_count: usize = 1;
        let mut cp = self.peek()?;
        if let Some(sign) = sign_of(cp) {
            if parser.sign(sign) {
                cp = self.peek_at(skip_count)?;
                skip_count += 1;
            }
        }
        let mut radix: u32 = 10;
        if cp == Some('0') {
            if skip_count == 2 {
                // The sign is settled now that a digit follows it.
                self.next()?;
                skip_count -= 1;
            }
            let radix_char = self.peek_at(skip_count)?;
            let (probed, symbol) = match radix_char {
                Some(c @ ('x' | 'X')) => (16, c),
                Some(c @ ('b' | 'B')) => (2, c),
                Some(c) if c.is_ascii_digit() => (8, '0'),
                _ => (0, '\0'),
            };
            let applied = parser.radix(probed, symbol);
            if applied > 0 {
                radix = applied;
                if probed == 8 {
                    // The leading zero is consumed; the digit after it is
                    // part of the number and stays for the digit loop.
                    self.next()?;
                    cp = radix_char;
                } else {
                    self.skip(2)?;
                    cp = self.peek()?;
                }
            }
            if radix < 10 {
                radix = 10;
            }
        }
        loop {
            let Some(c) = cp else { break };
            let mut advance = false;
            if let Some(digit) = c.to_digit(radix) {
                advance = parser.digit(digit, c);
                if !advance {
                    break;
                }
            } else if c == '.' {
                advance = parser.dot();
                if !advance {
                    break;
                }
            } else if let Some(symbol) = exponent_symbol(c, radix) {
                let after = self.peek_at(skip_count)?;
                let exp_sign = sign_of(after);
                if exp_sign.is_some() {
                    skip_count += 1;
                }
                advance = parser.exponent(symbol, exp_sign);
                if !advance {
                    break;
                }
            } else {
                match parser.special_for(c) {
                    Some(special) => {
                        if self.expect_at(&special, false, false, skip_count - 1)? {
                            skip_count = 1;
                            parser.special(&special);
                            // Already consumed, nothing to advance past.
                        } else {
                            break;
                        }
                    }
                    None => break,
                }
            }
            if advance {
                if skip_count > 1 {
                    self.skip(skip_count)?;
                    skip_count = 1;
                } else {
                    self.next()?;
                }
            }
            cp = self.peek()?;
        }
        Ok(())
    }

    /// Reads a decimal digit (radix 10) at the cursor.
    pub fn read_digit(&mut self) -> Result<Option<u32>, ScanError> {
        self.read_digit_radix(10)
    }

    /// Reads one digit under `radix` (2..=36) at the cursor; `None` without
    /// consuming anything if the cursor is not at such a digit.
    pub fn read_digit_radix(&mut self, radix: u32) -> Result<Option<u32>, ScanError> {
        if !(2..=36).contains(&radix) {
            return Err(ScanError::InvalidArgument(format!(
                "radix {radix} out of range 2..=36"
            )));
        }
        let Some(cp) = self.peek()? else {
            return Ok(None);
        };
        match cp.to_digit(radix) {
            Some(value) => {
                self.consume_cp(cp);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Reads an `i32` literal (optional sign, radix prefixes per `mode`).
    /// `Ok(None)` when the cursor is not at a number.
    pub fn read_i32(&mut self, mode: RadixMode) -> Result<Option<i32>, ScanError> {
        let mut parser = LangNumberParser::new(mode, NumberTarget::I32);
        self.read_number(&mut parser)?;
        parser.as_i32()
    }

    /// Reads an `i64` literal (optional sign, radix prefixes per `mode`).
    pub fn read_i64(&mut self, mode: RadixMode) -> Result<Option<i64>, ScanError> {
        let mut parser = LangNumberParser::new(mode, NumberTarget::I64);
        self.read_number(&mut parser)?;
        parser.as_i64()
    }

    /// Reads an `f64` literal: signed, radix-prefixed, dotted,
    /// exponent-bearing, `NaN`/`Infinity`, with `_` digit delimiters.
    pub fn read_f64(&mut self, mode: RadixMode) -> Result<Option<f64>, ScanError> {
        let mut parser = LangNumberParser::with_delimiters(mode, NumberTarget::F64, "_");
        self.read_number(&mut parser)?;
        parser.as_f64()
    }

    /// Reads an `f32` literal; same syntax as [`read_f64`](Self::read_f64).
    pub fn read_f32(&mut self, mode: RadixMode) -> Result<Option<f32>, ScanError> {
        let mut parser = LangNumberParser::with_delimiters(mode, NumberTarget::F32, "_");
        self.read_number(&mut parser)?;
        parser.as_f32()
    }

    /// Reads an unsigned decimal digit run of at most `max_digits` characters
    /// as a `u64`. No sign, no radix prefix. Not being at a digit is an
    /// error.
    pub fn read_unsigned_long(&mut self, max_digits: usize) -> Result<u64, ScanError> {
        if max_digits == 0 {
            return Err(ScanError::InvalidArgument(
                "max_digits must be positive".to_string(),
            ));
        }
        let digits =
            self.read_while_max(&crate::filter::filters::LATIN_DIGIT, max_digits)?;
        if digits.is_empty() {
            let found = self.peek()?.map(String::from).unwrap_or_default();
            return Err(ScanError::Expected {
                expected: "digit".to_string(),
                found,
            });
        }
        digits.parse::<u64>().map_err(|_| ScanError::NumberFormat {
            literal: digits,
            radix: 10,
        })
    }

    /// Reads a Java number literal: radix prefixes, `_` delimiters,
    /// `NaN`/`Infinity`, and the `l`/`L`, `f`/`F`, `d`/`D` suffixes.
    /// Unsuffixed literals with a dot or exponent are doubles, all other
    /// unsuffixed literals are `i32`.
    pub fn read_java_number_literal(&mut self) -> Result<Option<JavaNumber>, ScanError> {
        let mut parser = StringNumberParser::with_options(RadixMode::All, true, true, "_", true);
        self.read_number(&mut parser)?;
        let Some(text) = parser.as_str() else {
            return Ok(None);
        };
        let literal: String = text.chars().filter(|c| *c != '_').collect();
        let number = match self.peek()? {
            Some('l' | 'L') => Some(JavaNumber::Long(parse_radix_integer::<i64>(&literal)?)),
            Some('f' | 'F') => Some(JavaNumber::Float(reparse_f32(&literal)?)),
            Some('d' | 'D') => Some(JavaNumber::Double(reparse_f64(&literal)?)),
            _ => None,
        };
        if let Some(number) = number {
            self.next()?;
            return Ok(Some(number));
        }
        if literal
            .chars()
            .any(|c| matches!(c, '.' | 'p' | 'P' | 'N' | 'I'))
            || (!literal.starts_with("0x")
                && !literal.starts_with("0X")
                && literal.contains(['e', 'E']))
        {
            return Ok(Some(JavaNumber::Double(reparse_f64(&literal)?)));
        }
        Ok(Some(JavaNumber::Int(parse_radix_integer::<i32>(&literal)?)))
    }
}

/// Re-scans a completed literal as `f64`; handles hex floats, which the
/// standard parser does not.
fn reparse_f64(literal: &str) -> Result<f64, ScanError> {
    CharScanner::of(literal)
        .read_f64(RadixMode::All)?
        .ok_or_else(|| ScanError::NumberFormat {
            literal: literal.to_string(),
            radix: 10,
        })
}

fn reparse_f32(literal: &str) -> Result<f32, ScanError> {
    CharScanner::of(literal)
        .read_f32(RadixMode::All)?
        .ok_or_else(|| ScanError::NumberFormat {
            literal: literal.to_string(),
            radix: 10,
        })
}

trait RadixParsable: Sized {
    fn from_str_radix(text: &str, radix: u32) -> Option<Self>;
}

impl RadixParsable for i32 {
    fn from_str_radix(text: &str, radix: u32) -> Option<Self> {
        i32::from_str_radix(text, radix).ok()
    }
}

impl RadixParsable for i64 {
    fn from_str_radix(text: &str, radix: u32) -> Option<Self> {
        i64::from_str_radix(text, radix).ok()
    }
}

/// Parses a literal with an optional sign and radix prefix (`0x`, `0b`,
/// leading-zero octal) into a signed integer.
fn parse_radix_integer<N: RadixParsable>(literal: &str) -> Result<N, ScanError> {
    let (sign, unsigned) = match literal.strip_prefix(['+', '-']) {
        Some(rest) => (&literal[..1], rest),
        None => ("", literal),
    };
    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(bin) = unsigned
        .strip_prefix("0b")
        .or_else(|| unsigned.strip_prefix("0B"))
    {
        (2, bin)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };
    let mut signed = String::with_capacity(sign.len() + digits.len());
    signed.push_str(sign);
    signed.push_str(digits);
    N::from_str_radix(&signed, radix).ok_or_else(|| ScanError::NumberFormat {
        literal: literal.to_string(),
        radix,
    })
}
