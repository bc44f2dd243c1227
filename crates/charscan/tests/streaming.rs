//! Integration tests driving the public API through a streaming source with
//! tiny windows, checking parity with the in-memory scanner.

use charscan::{filters, CharScanner, RadixMode, ScanError, ScanSyntax, StrReader};

fn streamed(text: &str, capacity: usize, chunk: usize) -> CharScanner {
    CharScanner::with_capacity(capacity, StrReader::chunked(text, chunk))
}

#[test]
fn refill_boundary_read_until() {
    let text = "alpha,beta,gamma";
    for capacity in 1..5 {
        for chunk in 1..4 {
            let mut scanner = streamed(text, capacity, chunk);
            assert_eq!(
                scanner.read_until(',', true).unwrap().unwrap(),
                "alpha",
                "capacity {capacity} chunk {chunk}"
            );
            assert_eq!(scanner.read_until(',', true).unwrap().unwrap(), "beta");
            assert_eq!(scanner.read_until(',', true).unwrap().unwrap(), "gamma");
            assert!(!scanner.has_next().unwrap());
        }
    }
}

#[test]
fn refill_boundary_escapes() {
    let text = "a\\,b\\\\,rest";
    for capacity in 1..4 {
        let mut scanner = streamed(text, capacity, 1);
        assert_eq!(
            scanner.read_until_escaped(',', true, '\\').unwrap().unwrap(),
            "a,b\\"
        );
        assert_eq!(scanner.read(usize::MAX).unwrap(), "rest");
    }
}

#[test]
fn refill_boundary_syntax_scan() {
    let syntax = ScanSyntax::new()
        .with_escape('\\')
        .with_quote('"')
        .with_quote_escape('"')
        .with_entities('&', ';')
        .with_resolver(|name| match name {
            "amp" => Some(String::from("&")),
            _ => None,
        });
    let text = "say \"hi \"\" there\" &amp; bye!tail";
    let expected = "say hi \" there & bye";
    for capacity in 1..4 {
        let mut scanner = streamed(text, capacity, 1);
        assert_eq!(
            scanner.read_until_syntax('!', false, &syntax).unwrap().unwrap(),
            expected,
            "capacity {capacity}"
        );
        assert_eq!(scanner.read(usize::MAX).unwrap(), "tail");
    }
}

#[test]
fn expect_shifts_the_lookahead_window() {
    let text = "prefix-expected-suffix";
    let mut scanner = streamed(text, 9, 2);
    assert!(scanner.expect("prefix-", false).unwrap());
    assert!(!scanner.expect("expected!", false).unwrap());
    assert_eq!(scanner.position(), 7);
    assert!(scanner.expect("expected-", false).unwrap());
    assert_eq!(scanner.read(usize::MAX).unwrap(), "suffix");
}

#[test]
fn lookahead_capacity_is_enforced() {
    let mut scanner = streamed("abcdefghij", 3, 1);
    assert!(scanner.expect("abc", false).unwrap());
    let error = scanner.expect("defg", false).unwrap_err();
    assert_eq!(
        error,
        ScanError::Lookahead {
            requested: 4,
            capacity: 3
        }
    );
    // Nothing was consumed by the failed request.
    assert_eq!(scanner.position(), 3);
    assert!(scanner.expect("def", false).unwrap());
}

#[test]
fn skip_over_across_windows() {
    let text = "...needle-haystack-needle!";
    let mut scanner = streamed(text, 6, 1);
    assert!(scanner.skip_over("needle", false, None).unwrap());
    assert!(scanner.expect("-", false).unwrap());
    assert!(scanner
        .skip_over("needle", false, Some(&filters::NEWLINE))
        .unwrap());
    assert_eq!(scanner.read(usize::MAX).unwrap(), "!");
}

#[test]
fn numbers_across_windows() {
    let text = "-9223372036854775808 9223372036854775807 -1.25e2";
    let mut scanner = streamed(text, 4, 1);
    assert_eq!(
        scanner.read_i64(RadixMode::Only10).unwrap(),
        Some(i64::MIN)
    );
    scanner.skip(1).unwrap();
    assert_eq!(
        scanner.read_i64(RadixMode::Only10).unwrap(),
        Some(i64::MAX)
    );
    scanner.skip(1).unwrap();
    assert_eq!(scanner.read_f64(RadixMode::Only10).unwrap(), Some(-125.0));
}

#[test]
fn string_literal_across_windows() {
    let text = "\"Hi \\\"\\176\\u2022\\n\" rest";
    for capacity in 1..5 {
        let mut scanner = streamed(text, capacity, 1);
        assert_eq!(
            scanner.read_java_string_literal().unwrap().unwrap(),
            "Hi \"~\u{2022}\n"
        );
        assert_eq!(scanner.read(usize::MAX).unwrap(), " rest");
    }
}

#[test]
fn position_line_column_across_windows() {
    let text = "ab\ncd\r\nef";
    let mut scanner = streamed(text, 2, 1);
    assert_eq!(scanner.read_line(false).unwrap().unwrap(), "ab");
    assert_eq!((scanner.line(), scanner.column()), (2, 1));
    assert_eq!(scanner.read_line(false).unwrap().unwrap(), "cd");
    assert_eq!((scanner.line(), scanner.column()), (3, 1));
    assert_eq!(scanner.read_line(false).unwrap().unwrap(), "ef");
    assert_eq!(scanner.position(), 9);
    assert_eq!(scanner.read_line(false).unwrap(), None);
}

#[test]
fn close_releases_the_stream() {
    let mut scanner = streamed("abc", 2, 1);
    assert_eq!(scanner.next().unwrap(), Some('a'));
    scanner.close();
    assert_eq!(scanner.next().unwrap_err(), ScanError::Closed);
}
