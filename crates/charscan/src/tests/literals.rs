use alloc::boxed::Box;
use alloc::string::String;

use crate::{CharScanner, DefaultMessageHandler, Severity};

fn tolerant(text: &str) -> CharScanner {
    CharScanner::of_with_handler(text, Box::new(DefaultMessageHandler::lenient()))
}

#[test]
fn string_literal_with_escapes() {
    let text = "\"Hi \\\"\\176\\477\\579\\u2022\\uuuuu2211\\\"\\n\"";
    let mut scanner = CharScanner::of(text);
    let result = scanner.read_java_string_literal().unwrap().unwrap();
    assert_eq!(result, "Hi \"~'7/9\u{2022}\u{2211}\"\n");
    assert!(!scanner.has_next().unwrap());
    assert_eq!(scanner.position(), 39);
    assert_eq!(scanner.column(), 40);
    assert_eq!(scanner.line(), 1);
}

#[test]
fn string_literal_requires_a_quote() {
    let mut scanner = CharScanner::of("plain");
    assert_eq!(scanner.read_java_string_literal().unwrap(), None);
    assert_eq!(scanner.position(), 0);
}

fn check_invalid_string(text: &str, illegal_escape: Option<&str>, tolerant_result: &str) {
    // Tolerant mode substitutes and keeps going.
    let mut scanner = tolerant(text);
    assert_eq!(
        scanner
            .read_java_string_literal_with(Severity::Warning)
            .unwrap()
            .unwrap(),
        tolerant_result,
        "input {text:?}"
    );
    assert!(!scanner.messages().is_empty());
    while scanner.has_next().unwrap() {
        scanner.next().unwrap();
    }
    assert_eq!(scanner.position(), text.chars().count());

    // Strict mode fails with the message.
    let error = CharScanner::of(text)
        .read_java_string_literal()
        .unwrap_err();
    let expected = match illegal_escape {
        Some(escape) => alloc::format!("Illegal escape sequence {escape}"),
        None => String::from("Java string literal not terminated"),
    };
    assert_eq!(error.message_text(), expected, "input {text:?}");
}

#[test]
fn string_literal_errors() {
    check_invalid_string("\"", None, "");
    check_invalid_string("\"a", None, "a");
    check_invalid_string("\"ab", None, "ab");
    check_invalid_string("\"ab\\\"", None, "ab\"");
    check_invalid_string("\"ab\\\"\\8", Some("\\8"), "ab\"8");
    check_invalid_string("\"\\u1\"$", Some("\\u1"), "?");
    check_invalid_string("\"a\\u123x\"", Some("\\u123"), "a?x");
}

#[test]
fn char_literal_with_escapes() {
    let text = "'a'$'\\''$'\\\\'$'\\0'$'\\47'$'\\176'$'\\u2022'$";
    let mut scanner = CharScanner::of(text);
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('a'));
    assert!(scanner.expect_one('$').unwrap());
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('\''));
    assert!(scanner.expect_one('$').unwrap());
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('\\'));
    assert!(scanner.expect_one('$').unwrap());
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('\0'));
    assert!(scanner.expect_one('$').unwrap());
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('\''));
    assert!(scanner.expect_one('$').unwrap());
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('~'));
    assert!(scanner.expect_one('$').unwrap());
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('\u{2022}'));
    assert!(scanner.expect_one('$').unwrap());
    assert!(!scanner.has_next().unwrap());
    assert_eq!(scanner.position(), 41);
}

#[test]
fn char_literals_back_to_back() {
    let text = "'a''\\'''\\\\''\\0''\\47''\\176''\\u2022'";
    let mut scanner = CharScanner::of(text);
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('a'));
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('\''));
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('\\'));
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('\0'));
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('\''));
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('~'));
    assert_eq!(scanner.read_java_char_literal().unwrap(), Some('\u{2022}'));
    assert!(!scanner.has_next().unwrap());
    assert_eq!(scanner.position(), 34);
}

#[test]
fn char_literal_requires_a_quote() {
    let mut scanner = CharScanner::of("x");
    assert_eq!(scanner.read_java_char_literal().unwrap(), None);
    assert_eq!(scanner.position(), 0);
}

fn check_invalid_char(text: &str, expected_error_value: &str) {
    let mut scanner = tolerant(text);
    assert_eq!(
        scanner
            .read_java_char_literal_with(Severity::Warning)
            .unwrap(),
        Some('?'),
        "input {text:?}"
    );
    while scanner.has_next().unwrap() {
        scanner.next().unwrap();
    }
    assert_eq!(scanner.position(), text.chars().count());

    let error = CharScanner::of(text).read_java_char_literal().unwrap_err();
    let message = error.message_text();
    assert!(
        message.contains(expected_error_value),
        "message {message:?} should contain {expected_error_value:?}"
    );
}

#[test]
fn char_literal_errors() {
    check_invalid_char("'", "'");
    check_invalid_char("'a", "'a");
    check_invalid_char("'ab'", "'ab'");
    check_invalid_char("'ab'$", "'ab'");
    check_invalid_char("'\\u12345'$", "'\\u12345'");
    check_invalid_char("'\\8'$", "'\\8'");
    check_invalid_char("'\\78'$", "'\\78'");
    check_invalid_char("'\\477'$", "'\\477'");
}

#[test]
fn tolerant_messages_carry_positions() {
    let mut scanner = tolerant("\"a\\8\"");
    assert_eq!(
        scanner
            .read_java_string_literal_with(Severity::Warning)
            .unwrap()
            .unwrap(),
        "a8"
    );
    let messages = scanner.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].severity, Severity::Warning);
    assert_eq!(messages[0].line, 1);
    assert_eq!(messages[0].text, "Illegal escape sequence \\8");
}
