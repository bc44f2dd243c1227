//! Typed number parser: accumulates the mantissa as a negative `i64` (so the
//! most negative value stays representable) and finalizes into `i32`/`i64`
//! directly or composes `f32`/`f64` values.
//!
//! Composition of decimal floats uses the power-of-ten fast path when the
//! mantissa and exponent are inside the exactly-representable window, and
//! falls back to the standard correctly-rounded parser for pathological
//! inputs (mantissa overflow, large exponents). Floats under radix 2/8/16
//! are composed through the binary path: every digit contributes 1/3/4
//! mantissa bits, the exponent and dot offset scale in powers of two, and
//! digits dropped on overflow fold into a sticky bit for the final
//! round-to-nearest-even.

use alloc::string::String;

use super::{
    compose_bits, special_lookup, specials, DigitClass, NumberParser, NumberState, RadixHandler,
    RadixMode, SpecialToken, INFINITY, NAN,
};
use crate::error::ScanError;

/// Powers of ten that are exactly representable as `f64`.
const POW_10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// Powers of ten that are exactly representable as `f32`.
const POW_10_F32: [f32; 11] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10,
];

/// The numeric type a [`LangNumberParser`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberTarget {
    I32,
    I64,
    F32,
    F64,
}

impl NumberTarget {
    fn is_decimal(self) -> bool {
        matches!(self, NumberTarget::F32 | NumberTarget::F64)
    }

    /// The largest magnitude accepted without a leading `-`.
    fn max_magnitude(self) -> i64 {
        match self {
            NumberTarget::I32 => i32::MAX as i64,
            _ => i64::MAX,
        }
    }
}

/// [`NumberParser`] producing language-typed values.
///
/// Integer targets keep no text around: the literal is reconstructed lazily
/// when an error needs it or when mixed-case hex digits force preserving the
/// original spelling. Decimal targets track the literal as scanned, which
/// also feeds the fallback composition path.
pub struct LangNumberParser {
    mode: RadixMode,
    target: NumberTarget,
    tokens: alloc::vec::Vec<SpecialToken>,
    st: NumberState,
    /// Lower bound of the accumulation, `-max` until a `-` sign widens it.
    min: i64,
    min_mul: i64,
    /// The mantissa, accumulated negative.
    mantissa: i64,
    /// Magnitude of the exponent digits (always base 10), saturating.
    exponent: i64,
    /// Trailing zeros not yet folded into the mantissa (decimal targets).
    pending_zeros: u32,
    /// Mantissa digit count when the first digit overflowed.
    digits_overflow: Option<u32>,
    /// Digits dropped since the overflow.
    overflow_dropped: u32,
    /// A dropped digit was non-zero.
    overflow_sticky: bool,
    /// `NaN` or signed infinity, set by a special literal.
    special: Option<f64>,
    upper_case: Option<bool>,
    literal: String,
    built: bool,
}

impl LangNumberParser {
    /// A parser for `target` without digit delimiters. Decimal targets
    /// accept `NaN` and `Infinity`.
    pub fn new(mode: RadixMode, target: NumberTarget) -> Self {
        Self::with_delimiters(mode, target, "")
    }

    /// Like [`new`](Self::new) but additionally accepting the given digit
    /// delimiter characters (e.g. `"_"`).
    pub fn with_delimiters(mode: RadixMode, target: NumberTarget, delimiters: &str) -> Self {
        let decimal = target.is_decimal();
        Self {
            mode,
            target,
            tokens: specials(delimiters, decimal),
            st: NumberState::new(),
            min: -target.max_magnitude(),
            min_mul: 0,
            mantissa: 0,
            exponent: 0,
            pending_zeros: 0,
            digits_overflow: None,
            overflow_dropped: 0,
            overflow_sticky: false,
            special: None,
            upper_case: None,
            literal: String::new(),
            built: decimal,
        }
    }

    fn min_mul(&mut self) -> i64 {
        if self.min_mul == 0 {
            self.min_mul = self.min / i64::from(self.st.radix);
        }
        self.min_mul
    }

    /// `mantissa *= radix` in negative space; `false` on overflow.
    fn try_multiply(&mut self) -> bool {
        let min_mul = self.min_mul();
        if self.mantissa < min_mul {
            return false;
        }
        let next = self.mantissa * i64::from(self.st.radix);
        if next < self.min {
            return false;
        }
        self.mantissa = next;
        true
    }

    /// `mantissa = mantissa * radix - digit`; `false` on overflow.
    fn try_accumulate(&mut self, digit: u32) -> bool {
        let min_mul = self.min_mul();
        if self.mantissa < min_mul {
            return false;
        }
        let next = self.mantissa * i64::from(self.st.radix);
        if next < self.min + i64::from(digit) {
            return false;
        }
        self.mantissa = next - i64::from(digit);
        true
    }

    /// Rebuilds the literal from the accumulated state (integer targets
    /// allocate it only here).
    fn ensure_literal(&mut self) {
        if self.built {
            return;
        }
        self.built = true;
        let mut out = String::new();
        if let Some(sign) = self.st.sign {
            out.push(sign);
        }
        if let Some(radix_char) = self.st.radix_char {
            out.push('0');
            if radix_char != '0' {
                out.push(radix_char);
            }
        }
        for _ in 0..self.st.digits_leading_zeros {
            out.push('0');
        }
        if self.st.digits_total > self.st.digits_leading_zeros {
            push_radix_digits(
                &mut out,
                self.mantissa.unsigned_abs(),
                self.st.radix,
                self.upper_case == Some(true),
            );
        }
        self.literal = out;
    }

    fn error_digit(&mut self, digit_char: char) {
        if !self.built {
            self.ensure_literal();
            self.literal.push(digit_char);
        }
        self.st.error = true;
    }

    /// Tracks the case of hex letter digits; on the first mixed-case digit
    /// the literal switches to verbatim capture to preserve the spelling.
    fn prevent_case(&mut self, digit: u32, digit_char: char) {
        if digit <= 9 || self.built {
            return;
        }
        let upper = digit_char.is_uppercase();
        match self.upper_case {
            None => self.upper_case = Some(upper),
            Some(previous) if previous != upper => {
                self.ensure_literal();
                self.literal.push(digit_char);
                self.upper_case = None;
            }
            _ => {}
        }
    }

    fn start_overflow(&mut self) {
        if self.digits_overflow.is_none() {
            self.digits_overflow = Some(self.st.digits_total);
        }
    }

    fn is_empty(&self) -> bool {
        !self.st.error && self.st.digits_total == 0 && self.special.is_none()
    }

    fn number_error(&mut self) -> ScanError {
        self.ensure_literal();
        ScanError::NumberFormat {
            literal: self.literal.clone(),
            radix: self.st.radix,
        }
    }

    fn check_malformed(&mut self) -> Result<(), ScanError> {
        if self.st.error
            || self.st.open_delimiter
            || (self.st.exponent_symbol.is_some() && self.st.exponent_digits_total == 0)
        {
            return Err(self.number_error());
        }
        Ok(())
    }

    fn finish_integer(&mut self) -> Result<Option<i64>, ScanError> {
        if self.is_empty() {
            return Ok(None);
        }
        self.check_malformed()?;
        Ok(Some(if self.st.sign == Some('-') {
            self.mantissa
        } else {
            -self.mantissa
        }))
    }

    /// The parsed value as `i32`.
    pub fn as_i32(&mut self) -> Result<Option<i32>, ScanError> {
        debug_assert_eq!(self.target, NumberTarget::I32);
        Ok(self.finish_integer()?.map(|value| value as i32))
    }

    /// The parsed value as `i64`.
    pub fn as_i64(&mut self) -> Result<Option<i64>, ScanError> {
        debug_assert_eq!(self.target, NumberTarget::I64);
        self.finish_integer()
    }

    fn exponent_value(&self) -> i64 {
        if self.st.exponent_sign == Some('-') {
            -self.exponent
        } else {
            self.exponent
        }
    }

    /// Digit positions the kept mantissa is off from the scanned value:
    /// digits dropped on overflow plus deferred trailing zeros, minus the
    /// fraction digits.
    fn digit_scale(&self) -> i64 {
        i64::from(self.overflow_dropped) + i64::from(self.pending_zeros)
            - i64::from(self.st.fraction_digits())
    }

    /// The signed power of ten scaling the kept mantissa (radix 10 only).
    fn scale(&self) -> i64 {
        self.exponent_value() + self.digit_scale()
    }

    /// The parsed value as `f64`.
    pub fn as_f64(&mut self) -> Result<Option<f64>, ScanError> {
        debug_assert_eq!(self.target, NumberTarget::F64);
        if self.is_empty() {
            return Ok(None);
        }
        if let Some(special) = self.special {
            if self.st.error {
                return Err(self.number_error());
            }
            return Ok(Some(special));
        }
        self.check_malformed()?;
        let negative = self.st.sign == Some('-');
        let magnitude = self.mantissa.unsigned_abs();
        let scale = self.scale();
        let value = match self.st.radix {
            10 => {
                if self.digits_overflow.is_none()
                    && magnitude < (1u64 << 53)
                    && scale.unsigned_abs() <= 22
                {
                    if scale >= 0 {
                        magnitude as f64 * POW_10[scale as usize]
                    } else {
                        magnitude as f64 / POW_10[scale.unsigned_abs() as usize]
                    }
                } else {
                    let text: String = self.literal.chars().filter(|c| *c != '_').collect();
                    match text.parse::<f64>() {
                        // The standard parser applies the sign itself.
                        Ok(value) => return Ok(Some(value)),
                        Err(_) => return Err(self.number_error()),
                    }
                }
            }
            radix @ (2 | 8 | 16) => {
                let bits = bits_per_digit(radix);
                let k = bits * self.digit_scale() + self.exponent_value();
                f64::from_bits(compose_bits(magnitude, k, self.overflow_sticky, 52, 1023))
            }
            _ => return Err(self.number_error()),
        };
        Ok(Some(if negative { -value } else { value }))
    }

    /// The parsed value as `f32`.
    pub fn as_f32(&mut self) -> Result<Option<f32>, ScanError> {
        debug_assert_eq!(self.target, NumberTarget::F32);
        if self.is_empty() {
            return Ok(None);
        }
        if let Some(special) = self.special {
            if self.st.error {
                return Err(self.number_error());
            }
            return Ok(Some(special as f32));
        }
        self.check_malformed()?;
        let negative = self.st.sign == Some('-');
        let magnitude = self.mantissa.unsigned_abs();
        let scale = self.scale();
        let value = match self.st.radix {
            10 => {
                if self.digits_overflow.is_none()
                    && magnitude < (1u64 << 24)
                    && scale.unsigned_abs() <= 10
                {
                    if scale >= 0 {
                        magnitude as f32 * POW_10_F32[scale as usize]
                    } else {
                        magnitude as f32 / POW_10_F32[scale.unsigned_abs() as usize]
                    }
                } else {
                    let text: String = self.literal.chars().filter(|c| *c != '_').collect();
                    match text.parse::<f32>() {
                        Ok(value) => return Ok(Some(value)),
                        Err(_) => return Err(self.number_error()),
                    }
                }
            }
            radix @ (2 | 8 | 16) => {
                let bits = bits_per_digit(radix);
                let k = bits * self.digit_scale() + self.exponent_value();
                f32::from_bits(compose_bits(magnitude, k, self.overflow_sticky, 23, 127) as u32)
            }
            _ => return Err(self.number_error()),
        };
        Ok(Some(if negative { -value } else { value }))
    }
}

impl NumberParser for LangNumberParser {
    fn sign(&mut self, sign: char) -> bool {
        debug_assert!(self.st.sign.is_none());
        if sign == '-' {
            // Widen the bound so the most negative value is accepted.
            if self.min == -(i32::MAX as i64) {
                self.min = i32::MIN as i64;
            } else if self.min == -i64::MAX {
                self.min = i64::MIN;
            }
        }
        self.st.sign = Some(sign);
        if self.built {
            self.literal.push(sign);
        }
        true
    }

    fn radix(&mut self, radix: u32, symbol: char) -> u32 {
        let applied = self.mode.radix(radix, symbol);
        if applied != 0 {
            self.st.radix = applied;
            self.st.radix_char = Some(if applied == 8 && symbol.is_ascii_digit() {
                '0'
            } else {
                symbol
            });
            if self.built {
                self.literal.push('0');
                if symbol != '0' {
                    self.literal.push(symbol);
                }
            }
        }
        applied
    }

    fn digit(&mut self, digit: u32, digit_char: char) -> bool {
        if self.built {
            self.literal.push(digit_char);
        }
        let class = self.st.record_digit(digit);
        self.st.open_delimiter = false;
        if self.st.exponent_symbol.is_some() {
            if self.st.exponent_digits_total > self.st.exponent_digits_leading_zeros {
                self.exponent = self
                    .exponent
                    .saturating_mul(10)
                    .saturating_add(i64::from(digit))
                    .min(1_000_000_000);
            }
            return true;
        }
        if self.st.error {
            return true;
        }
        if self.special.is_some() {
            // A special literal cannot be followed by digits.
            self.ensure_literal();
            self.st.error = true;
            return true;
        }
        if digit >= self.st.radix {
            self.error_digit(digit_char);
            return true;
        }
        if class == DigitClass::LeadingZero {
            return true;
        }
        if self.target.is_decimal() {
            if class == DigitClass::TrailingZero {
                if self.digits_overflow.is_some() {
                    self.overflow_dropped += 1;
                } else {
                    self.pending_zeros += 1;
                }
                return true;
            }
            if self.digits_overflow.is_some() {
                self.overflow_dropped += 1;
                self.overflow_sticky |= digit != 0;
                return true;
            }
            while self.pending_zeros > 0 {
                if !self.try_multiply() {
                    // The deferred zeros no longer fit: from here on every
                    // digit only scales the value.
                    self.start_overflow();
                    self.overflow_dropped += self.pending_zeros + 1;
                    self.pending_zeros = 0;
                    self.overflow_sticky |= digit != 0;
                    return true;
                }
                self.pending_zeros -= 1;
            }
            if !self.try_accumulate(digit) {
                self.start_overflow();
                self.overflow_dropped += 1;
                self.overflow_sticky |= digit != 0;
            }
            return true;
        }
        self.prevent_case(digit, digit_char);
        if !self.try_accumulate(digit) {
            self.error_digit(digit_char);
        }
        true
    }

    fn dot(&mut self) -> bool {
        if !self.target.is_decimal() {
            return false;
        }
        if self.st.dot_position.is_some() || self.st.exponent_symbol.is_some() {
            self.st.error = true;
        } else {
            self.st.dot_position = Some(self.st.digits_total);
        }
        if self.built {
            self.literal.push('.');
        }
        true
    }

    fn exponent(&mut self, symbol: char, sign: Option<char>) -> bool {
        if self.st.open_delimiter {
            self.st.error = true;
            self.ensure_literal();
            self.literal.push(symbol);
            if let Some(sign) = sign {
                self.literal.push(sign);
            }
            return true;
        }
        if !self.target.is_decimal() {
            return false;
        }
        if self.st.exponent_symbol.is_some() {
            self.st.error = true;
        } else {
            self.st.exponent_symbol = Some(symbol);
            self.st.exponent_sign = sign;
        }
        if self.built {
            self.literal.push(symbol);
            if let Some(sign) = sign {
                self.literal.push(sign);
            }
        }
        true
    }

    fn special_for(&mut self, cp: char) -> Option<String> {
        special_lookup(&self.tokens, cp, &self.st)
    }

    fn special(&mut self, special: &str) {
        if special.chars().count() == 1 {
            self.st.open_delimiter = true;
        } else {
            self.special = Some(match special {
                NAN => f64::NAN,
                INFINITY if self.st.sign == Some('-') => f64::NEG_INFINITY,
                INFINITY => f64::INFINITY,
                _ => f64::NAN,
            });
        }
        if self.built {
            self.literal.push_str(special);
        }
    }
}

fn bits_per_digit(radix: u32) -> i64 {
    match radix {
        2 => 1,
        8 => 3,
        _ => 4,
    }
}

fn push_radix_digits(out: &mut String, mut value: u64, radix: u32, upper: bool) {
    if value == 0 {
        out.push('0');
        return;
    }
    let mut digits = [0u8; 64];
    let mut count = 0;
    while value > 0 {
        digits[count] = (value % u64::from(radix)) as u8;
        value /= u64::from(radix);
        count += 1;
    }
    while count > 0 {
        count -= 1;
        if let Some(digit) = char::from_digit(u32::from(digits[count]), radix) {
            out.push(if upper {
                digit.to_ascii_uppercase()
            } else {
                digit
            });
        }
    }
}
