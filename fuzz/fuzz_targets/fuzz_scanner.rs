#![no_main]

use arbitrary::Arbitrary;
use charscan::{
    filters, CharScanner, DefaultMessageHandler, RadixMode, ScanSyntax, Severity, StrReader,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Plan {
    text: String,
    chunk: u8,
    capacity: u8,
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Next,
    PeekAt(u8),
    Read(u8),
    ReadLine(bool),
    ReadUntil(char, bool),
    ReadUntilEscaped(char, bool, char),
    ReadUntilSyntax(char, bool),
    ReadWhileLetters,
    SkipNewline,
    Skip(u8),
    SkipOver(u8),
    Expect(u8, bool),
    ReadI64,
    ReadF64,
    JavaString,
    JavaChar,
}

fn run(plan: Plan) {
    let chunk = usize::from(plan.chunk % 7) + 1;
    let capacity = usize::from(plan.capacity % 15) + 1;
    let syntax = ScanSyntax::new()
        .with_escape('\\')
        .with_quote('"')
        .with_quote_escape('"')
        .with_quote_escape_lazy(plan.capacity & 1 == 0)
        .with_alt_quote('\'')
        .with_alt_quote_escape('\'')
        .with_entities('&', ';')
        .with_resolver(|name| (name == "amp").then(|| String::from("&")));

    let mut scanner = CharScanner::with_capacity_and_handler(
        capacity,
        StrReader::chunked(&plan.text, chunk),
        Box::new(DefaultMessageHandler::lenient()),
    );
    let total = plan.text.chars().count();
    for op in plan.ops {
        let before = scanner.position();
        let result: Result<(), charscan::ScanError> = (|| {
            match op {
                Op::Next => {
                    scanner.next()?;
                }
                Op::PeekAt(k) => {
                    let _ = scanner.peek_at(usize::from(k) % (capacity + 2));
                }
                Op::Read(n) => {
                    scanner.read(usize::from(n))?;
                }
                Op::ReadLine(trim) => {
                    scanner.read_line(trim)?;
                }
                Op::ReadUntil(stop, eot) => {
                    scanner.read_until(stop, eot)?;
                }
                Op::ReadUntilEscaped(stop, eot, escape) => {
                    scanner.read_until_escaped(stop, eot, escape)?;
                }
                Op::ReadUntilSyntax(stop, eot) => {
                    scanner.read_until_syntax(stop, eot, &syntax)?;
                }
                Op::ReadWhileLetters => {
                    scanner.read_while(&filters::LATIN_LETTER)?;
                }
                Op::SkipNewline => {
                    scanner.skip_newline()?;
                }
                Op::Skip(n) => {
                    scanner.skip(usize::from(n))?;
                }
                Op::SkipOver(n) => {
                    let needle = "ab".repeat(usize::from(n % 4) + 1);
                    let _ = scanner.skip_over(&needle, n & 1 == 0, Some(&filters::NEWLINE));
                }
                Op::Expect(n, ignore_case) => {
                    let probe = "xy".repeat(usize::from(n % 4) + 1);
                    let _ = scanner.expect(&probe, ignore_case);
                }
                Op::ReadI64 => {
                    let _ = scanner.read_i64(RadixMode::All);
                }
                Op::ReadF64 => {
                    let _ = scanner.read_f64(RadixMode::NoOctal);
                }
                Op::JavaString => {
                    scanner.read_java_string_literal_with(Severity::Warning)?;
                }
                Op::JavaChar => {
                    scanner.read_java_char_literal_with(Severity::Warning)?;
                }
            }
            Ok(())
        })();
        let _ = result;
        // Progress is monotonic and bounded by the input length.
        assert!(scanner.position() >= before);
        assert!(scanner.position() <= total);
        assert!(scanner.line() >= 1 && scanner.column() >= 1);
    }
}

fuzz_target!(|plan: Plan| run(plan));
