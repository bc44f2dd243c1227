use alloc::string::ToString;

use crate::filter::{described, filters};
use crate::source::StrReader;
use crate::{CharScanner, ScanError};

#[test]
fn next_and_has_next() {
    let mut scanner = CharScanner::of("0123456789");
    for digit in 0..10u32 {
        assert!(scanner.has_next().unwrap());
        let expected = char::from_digit(digit, 10).unwrap();
        assert_eq!(scanner.next().unwrap(), Some(expected));
    }
    assert!(!scanner.has_next().unwrap());
    assert_eq!(scanner.next().unwrap(), None);
    assert_eq!(scanner.position(), 10);
    assert_eq!(scanner.column(), 11);
    assert_eq!(scanner.line(), 1);
}

#[test]
fn peek_is_stable() {
    let mut scanner = CharScanner::of("abc");
    assert_eq!(scanner.peek().unwrap(), Some('a'));
    assert_eq!(scanner.peek().unwrap(), Some('a'));
    assert_eq!(scanner.next().unwrap(), Some('a'));
    assert_eq!(scanner.peek().unwrap(), Some('b'));
    assert_eq!(scanner.next().unwrap(), Some('b'));
    assert_eq!(scanner.next().unwrap(), Some('c'));
    assert_eq!(scanner.peek().unwrap(), None);
    assert_eq!(scanner.next().unwrap(), None);
}

#[test]
fn peek_at_crosses_the_window() {
    let text = "abcdefgh";
    let mut scanner = CharScanner::with_capacity(4, StrReader::chunked(text, 3));
    assert_eq!(scanner.peek_at(0).unwrap(), Some('a'));
    assert_eq!(scanner.peek_at(3).unwrap(), Some('d'));
    assert_eq!(scanner.position(), 0);
    scanner.skip(2).unwrap();
    assert_eq!(scanner.peek_at(3).unwrap(), Some('f'));
    assert_eq!(scanner.read(usize::MAX).unwrap(), "cdefgh");
}

#[test]
fn peek_at_validates_capacity() {
    let mut scanner = CharScanner::with_capacity(4, StrReader::new("abcdefghij"));
    scanner.skip(1).unwrap();
    // Exactly at capacity still works, one past it is a configuration error.
    assert_eq!(scanner.peek_at(3).unwrap(), Some('e'));
    match scanner.peek_at(7) {
        Err(ScanError::Lookahead { capacity: 4, .. }) => {}
        other => panic!("expected lookahead error, got {other:?}"),
    }
    // The failed request did not consume anything.
    assert_eq!(scanner.position(), 1);
    assert_eq!(scanner.peek().unwrap(), Some('b'));
}

#[test]
fn peek_at_past_the_end_is_none() {
    let mut scanner = CharScanner::with_capacity(8, StrReader::new("abc"));
    assert_eq!(scanner.peek_at(2).unwrap(), Some('c'));
    assert_eq!(scanner.peek_at(3).unwrap(), None);
    let mut scanner = CharScanner::of("abc");
    assert_eq!(scanner.peek_at(5).unwrap(), None);
}

#[test]
fn peek_string_and_peek_while() {
    let mut scanner = CharScanner::of("abc def");
    assert_eq!(scanner.peek_string(3).unwrap(), "abc");
    assert_eq!(scanner.peek_string(100).unwrap(), "abc def");
    assert_eq!(scanner.position(), 0);

    let mut scanner = CharScanner::with_capacity(3, StrReader::new("abc def  ghi"));
    assert_eq!(scanner.peek_while(&filters::LATIN_LETTER, 3).unwrap(), "abc");
    scanner.skip(3).unwrap();
    assert_eq!(scanner.peek_while(&filters::LATIN_LETTER, 3).unwrap(), "");
    scanner.skip(1).unwrap();
    assert_eq!(scanner.peek_while(&filters::LATIN_LETTER, 3).unwrap(), "def");
    scanner.skip(3).unwrap();
    scanner.skip(2).unwrap();
    assert_eq!(scanner.peek_while(&filters::LATIN_LETTER, 2).unwrap(), "gh");
    assert_eq!(scanner.peek_while(&filters::LATIN_LETTER, 3).unwrap(), "ghi");
}

#[test]
fn read_counts_characters() {
    let mut scanner = CharScanner::of("abc def  ghi");
    assert_eq!(scanner.read(3).unwrap(), "abc");
    assert_eq!(scanner.skip_while_char(' ').unwrap(), 1);
    assert_eq!(scanner.read(3).unwrap(), "def");
    assert_eq!(scanner.skip_while_char(' ').unwrap(), 2);
    assert_eq!(scanner.read(3).unwrap(), "ghi");
    assert!(!scanner.has_next().unwrap());
}

#[test]
fn read_while_with_max() {
    let mut scanner = CharScanner::of("abc def  ghi");
    let letters = filters::LATIN_LETTER;
    assert_eq!(scanner.read_while(&letters).unwrap(), "abc");
    assert_eq!(scanner.read_while(&letters).unwrap(), "");
    assert_eq!(scanner.read_while_max(&letters, 0).unwrap(), "");
    assert_eq!(scanner.read_while(&filters::WHITESPACE).unwrap(), " ");
    assert_eq!(scanner.read_while(&letters).unwrap(), "def");
    assert_eq!(scanner.read_while(&filters::WHITESPACE).unwrap(), "  ");
    assert_eq!(scanner.read_while_max(&letters, 2).unwrap(), "gh");
    assert_eq!(scanner.read_while_max(&letters, 2).unwrap(), "i");
    assert!(!scanner.has_next().unwrap());
    assert_eq!(scanner.position(), 12);
    assert_eq!(scanner.column(), 13);
    assert_eq!(scanner.line(), 1);
}

#[test]
fn read_while_bounded_enforces_min() {
    let mut scanner = CharScanner::of("ab12");
    let error = scanner
        .read_while_bounded(&filters::LATIN_DIGIT, 1, 4)
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Required at least 1 character(s) (latin digit) but found only 0"
    );
    assert_eq!(scanner.position(), 0);

    let error = scanner.read_while_bounded(&filters::ANY, 3, 2).unwrap_err();
    assert!(matches!(error, ScanError::InvalidArgument(_)));
}

#[test]
fn skip_while_filter_with_max() {
    let text = "abc def \tghi\t\t \t";
    let blank = described(|c| c == ' ' || c == '\t', "blank");
    let mut scanner = CharScanner::of(text);
    assert_eq!(scanner.position(), 0);
    assert_eq!(scanner.skip_while(&blank).unwrap(), 0);
    assert_eq!(scanner.read(3).unwrap(), "abc");
    assert_eq!(scanner.skip_while(&blank).unwrap(), 1);
    assert_eq!(scanner.read(3).unwrap(), "def");
    assert_eq!(scanner.skip_while(&blank).unwrap(), 2);
    assert_eq!(scanner.read(3).unwrap(), "ghi");
    assert_eq!(scanner.position(), 12);
    assert_eq!(scanner.skip_while_max(&blank, 3).unwrap(), 3);
    assert_eq!(scanner.position(), 15);
    assert_eq!(scanner.skip_while_max(&blank, 5).unwrap(), 1);
    assert!(!scanner.has_next().unwrap());
    assert_eq!(scanner.position(), 16);
}

#[test]
fn expect_unsafe_consumes_the_common_prefix() {
    let mut scanner = CharScanner::of("string");
    assert!(!scanner.expect_unsafe("strign", false).unwrap());
    assert_eq!(scanner.read(2).unwrap(), "ng");
    assert!(!scanner.has_next().unwrap());
    assert_eq!(scanner.position(), 6);
}

#[test]
fn expect_sequences() {
    let mut scanner = CharScanner::of("public static final String foo;");
    assert!(scanner.expect_unsafe("public", false).unwrap());
    assert!(!scanner.expect_one('$').unwrap());
    assert!(scanner.expect_one(' ').unwrap());
    assert!(scanner.expect_unsafe("StATiC", true).unwrap());
    assert!(scanner.expect_one(' ').unwrap());
    assert!(!scanner.expect_unsafe("FINAL", false).unwrap());
    assert!(scanner.expect_unsafe("FINAL", true).unwrap());
    assert!(scanner.expect_one(' ').unwrap());
    assert!(!scanner.expect_unsafe("string", false).unwrap());
    assert!(scanner.expect_unsafe("String", false).unwrap());
    assert_eq!(scanner.next().unwrap(), Some(' '));
    assert!(!scanner.expect_unsafe("banana", true).unwrap());
    assert!(scanner.expect_unsafe("foo", false).unwrap());
    assert_eq!(scanner.next().unwrap(), Some(';'));
    assert!(!scanner.has_next().unwrap());
    assert_eq!(scanner.position(), 31);
}

#[test]
fn expect_is_atomic() {
    let mut scanner = CharScanner::with_capacity(32, StrReader::chunked("Hello World!", 3));
    assert!(!scanner.expect("Hello WorlD", false).unwrap());
    assert_eq!(scanner.position(), 0);
    assert_eq!(scanner.column(), 1);
    assert!(scanner.expect("Hello ", false).unwrap());
    assert_eq!(scanner.position(), 6);
    assert!(scanner.expect("WorlD!", true).unwrap());
    assert_eq!(scanner.position(), 12);
    assert!(!scanner.has_next().unwrap());
}

#[test]
fn expect_lookahead_never_consumes() {
    let mut scanner = CharScanner::of("abcdef");
    assert!(scanner.expect_lookahead("abc", false).unwrap());
    assert_eq!(scanner.position(), 0);
    assert!(scanner.expect_at("cde", false, true, 2).unwrap());
    assert_eq!(scanner.position(), 0);
    assert!(scanner.expect_at("cde", false, false, 2).unwrap());
    assert_eq!(scanner.position(), 5);
}

#[test]
fn require_reports_the_tail() {
    let mut scanner = CharScanner::of("foo");
    let error = scanner.require("for", false).unwrap_err();
    assert_eq!(error.to_string(), "Expecting 'for' but found: foo");
    assert!(scanner.require("o", false).is_ok());
}

#[test]
fn require_filter_counts() {
    let mut scanner = CharScanner::of("12ab");
    assert_eq!(scanner.require_filter(&filters::LATIN_DIGIT, 1, 4).unwrap(), 2);
    let error = scanner
        .require_filter(&filters::LATIN_DIGIT, 2, 4)
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Required at least 2 character(s) (latin digit) but found only 0"
    );
}

#[test]
fn skip_over_consumes_the_substring() {
    let mut scanner = CharScanner::with_capacity(32, StrReader::new("xxYzFOOxYztheend"));
    assert!(scanner.skip_over("xYz", false, None).unwrap());
    assert!(scanner.expect_unsafe("FOO", false).unwrap());
    assert!(scanner.skip_over("xYz", false, None).unwrap());
    assert_eq!(scanner.read(usize::MAX).unwrap(), "theend");

    let mut scanner = CharScanner::with_capacity(32, StrReader::new("xxyzfooxyztheend"));
    assert!(scanner.skip_over("xYz", true, None).unwrap());
    assert!(scanner.expect_unsafe("FOO", true).unwrap());
    assert!(scanner.skip_over("xYz", true, None).unwrap());
    assert_eq!(scanner.read(usize::MAX).unwrap(), "theend");
}

#[test]
fn skip_over_honors_the_stop_filter() {
    let mut scanner = CharScanner::of("abc\ndef");
    assert!(!scanner
        .skip_over("def", false, Some(&filters::NEWLINE))
        .unwrap());
    assert_eq!(scanner.peek().unwrap(), Some('\n'));
}

#[test]
fn skip_until_with_escape() {
    let mut scanner = CharScanner::of("string");
    assert!(scanner.skip_until('n').unwrap());
    assert_eq!(scanner.next().unwrap(), Some('g'));
    assert!(!scanner.has_next().unwrap());

    let mut scanner = CharScanner::of("\"Quoted text with \\\" inside!\"12345");
    assert_eq!(scanner.next().unwrap(), Some('"'));
    assert!(scanner.skip_until_escaped('"', '\\').unwrap());
    assert!(scanner.expect_unsafe("12345", false).unwrap());
}

#[test]
fn empty_input() {
    let mut scanner = CharScanner::of("");
    assert_eq!(scanner.peek().unwrap(), None);
    assert_eq!(scanner.next().unwrap(), None);
    assert_eq!(scanner.read_digit().unwrap(), None);
    assert_eq!(scanner.read(1).unwrap(), "");
    assert_eq!(scanner.read_line(false).unwrap(), None);
    assert_eq!(scanner.read_until(' ', true).unwrap(), Some("".into()));
    assert_eq!(scanner.read_until(' ', false).unwrap(), None);
    assert_eq!(
        scanner.read_until_escaped(' ', true, '\\').unwrap(),
        Some("".into())
    );
    assert_eq!(scanner.read_until_escaped(' ', false, '\\').unwrap(), None);
    assert_eq!(
        scanner.read_until_filter(&filters::ANY, true).unwrap(),
        Some("".into())
    );
    assert_eq!(scanner.read_until_filter(&filters::ANY, false).unwrap(), None);
    assert_eq!(scanner.read_while(&filters::ANY).unwrap(), "");
    assert!(!scanner.skip_until(' ').unwrap());
    assert!(!scanner.skip_until_escaped(' ', '\\').unwrap());
    assert_eq!(scanner.skip_while_char(' ').unwrap(), 0);
    assert_eq!(scanner.skip_while(&filters::ANY).unwrap(), 0);
    assert!(!scanner.expect_one(' ').unwrap());
    assert!(!scanner.expect_unsafe("Text", true).unwrap());
    assert_eq!(scanner.position(), 0);
    assert_eq!(scanner.column(), 1);
    assert_eq!(scanner.line(), 1);
}

#[test]
fn close_is_final() {
    let mut scanner = CharScanner::of("abc");
    assert_eq!(scanner.next().unwrap(), Some('a'));
    scanner.close();
    scanner.close();
    assert_eq!(scanner.next().unwrap_err(), ScanError::Closed);
    assert_eq!(scanner.read(1).unwrap_err(), ScanError::Closed);
    assert_eq!(scanner.has_next().unwrap_err(), ScanError::Closed);
}

#[test]
fn read_failure_releases_the_source() {
    let reader = crate::source::FailingReader::new("ab", "boom");
    let mut scanner = CharScanner::with_capacity(8, reader);
    match scanner.read(usize::MAX) {
        Err(ScanError::Read(message)) => assert_eq!(message, "boom"),
        other => panic!("expected read error, got {other:?}"),
    }
}

#[test]
fn supplementary_codepoints_count_once() {
    let mut scanner = CharScanner::of("a\u{10348}b");
    assert_eq!(scanner.next().unwrap(), Some('a'));
    assert_eq!(scanner.next().unwrap(), Some('\u{10348}'));
    assert_eq!(scanner.position(), 2);
    assert_eq!(scanner.column(), 3);
    assert_eq!(scanner.next().unwrap(), Some('b'));
    assert_eq!(scanner.position(), 3);
}
