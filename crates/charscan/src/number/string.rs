//! String-building number parser: scans a number token and keeps its textual
//! form, leaving conversion to the caller.

use alloc::string::String;

use super::{special_lookup, specials, NumberParser, NumberState, RadixHandler, RadixMode,
    SpecialToken};

/// [`NumberParser`] that accumulates the scanned literal as text. Used by
/// [`read_java_number_literal`](crate::CharScanner::read_java_number_literal)
/// and wherever the original spelling matters more than the value.
pub struct StringNumberParser {
    mode: RadixMode,
    accept_decimal: bool,
    add_radix: bool,
    tokens: alloc::vec::Vec<SpecialToken>,
    st: NumberState,
    number: String,
}

impl StringNumberParser {
    /// A parser accepting decimal syntax, with the radix prefix included in
    /// the text, no delimiters and no special numbers.
    pub fn new(mode: RadixMode) -> Self {
        Self::with_options(mode, true, true, "", false)
    }

    /// Full configuration: whether dot/exponent syntax is accepted, whether
    /// the radix prefix is kept in the text, the accepted digit delimiters,
    /// and whether `NaN`/`Infinity` are recognized.
    pub fn with_options(
        mode: RadixMode,
        accept_decimal: bool,
        add_radix: bool,
        delimiters: &str,
        special_numbers: bool,
    ) -> Self {
        Self {
            mode,
            accept_decimal,
            add_radix,
            tokens: specials(delimiters, special_numbers),
            st: NumberState::new(),
            number: String::new(),
        }
    }

    /// The scanned text, or `None` when nothing was scanned.
    pub fn as_str(&self) -> Option<&str> {
        if self.number.is_empty() {
            None
        } else {
            Some(&self.number)
        }
    }

    /// The radix that applied while scanning.
    pub fn radix(&self) -> u32 {
        self.st.radix
    }
}

impl NumberParser for StringNumberParser {
    fn sign(&mut self, sign: char) -> bool {
        self.st.sign = Some(sign);
        self.number.push(sign);
        true
    }

    fn radix(&mut self, radix: u32, symbol: char) -> u32 {
        let applied = self.mode.radix(radix, symbol);
        if applied != 0 {
            self.st.radix = applied;
            self.st.radix_char = Some(symbol);
            if self.add_radix {
                self.number.push('0');
                if symbol != '0' {
                    self.number.push(symbol);
                }
            }
        }
        applied
    }

    fn digit(&mut self, digit: u32, digit_char: char) -> bool {
        self.st.record_digit(digit);
        self.st.open_delimiter = false;
        self.number.push(digit_char);
        true
    }

    fn dot(&mut self) -> bool {
        if !self.accept_decimal {
            return false;
        }
        if self.st.dot_position.is_none() {
            self.st.dot_position = Some(self.st.digits_total);
        } else {
            self.st.error = true;
        }
        self.number.push('.');
        true
    }

    fn exponent(&mut self, symbol: char, sign: Option<char>) -> bool {
        if !self.accept_decimal {
            return false;
        }
        if self.st.open_delimiter || self.st.exponent_symbol.is_some() {
            self.st.error = true;
        } else {
            self.st.exponent_symbol = Some(symbol);
            self.st.exponent_sign = sign;
        }
        self.number.push(symbol);
        if let Some(sign) = sign {
            self.number.push(sign);
        }
        true
    }

    fn special_for(&mut self, cp: char) -> Option<String> {
        special_lookup(&self.tokens, cp, &self.st)
    }

    fn special(&mut self, special: &str) {
        if special.chars().count() == 1 {
            self.st.open_delimiter = true;
        }
        self.number.push_str(special);
    }
}

#[cfg(test)]
mod tests {
    use super::{NumberParser, RadixMode, StringNumberParser};

    #[test]
    fn empty_until_fed() {
        let parser = StringNumberParser::new(RadixMode::All);
        assert_eq!(parser.as_str(), None);
    }

    #[test]
    fn collects_text_verbatim() {
        let mut parser = StringNumberParser::new(RadixMode::All);
        assert!(parser.sign('-'));
        assert_eq!(NumberParser::radix(&mut parser, 16, 'x'), 16);
        for digit_char in "Ff".chars() {
            assert!(parser.digit(15, digit_char));
        }
        assert_eq!(parser.as_str(), Some("-0xFf"));
        assert_eq!(parser.radix(), 16);
    }

    #[test]
    fn only10_rejects_prefix() {
        let mut parser = StringNumberParser::new(RadixMode::Only10);
        assert_eq!(NumberParser::radix(&mut parser, 16, 'x'), 0);
        assert_eq!(parser.radix(), 10);
    }
}
