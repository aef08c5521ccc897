//! Pipeline integration tests — template → program → Swift toolchain → output.
//!
//! Generation tests run everywhere and pin down the program each template
//! becomes. Tests that execute programs need `swift` and `swiftc` on PATH
//! and are ignored by default; run them with `cargo test -- --ignored`.

use std::process::Command;

use stitch::swift::SourceFile;
use stitch::{Binding, ErrorKind, Fixer, Options, Processor, Toolchain};

/// Helper: the default toolchain. Panics when `swift` or `swiftc` does not
/// start, so an ignored test run without one fails loudly.
fn toolchain() -> Toolchain {
    let toolchain = Toolchain::default();
    let starts = |cmd: &str| {
        Command::new(cmd)
            .arg("--version")
            .output()
            .is_ok_and(|output| output.status.success())
    };
    assert!(
        starts(&toolchain.swift) && starts(&toolchain.swiftc),
        "swift and swiftc must be on PATH"
    );
    toolchain
}

fn options(bindings: &[(&str, &str)]) -> Options {
    let mut options = Options::new("test.swift.gyb");
    options.bindings = bindings
        .iter()
        .map(|(name, value)| Binding::new(*name, *value))
        .collect();
    options
}

fn render(template: &str, bindings: &[(&str, &str)]) -> String {
    Processor::render(template, &options(bindings), &toolchain()).expect("render failed")
}

// =============================================================================
// Generation
// =============================================================================

#[test]
fn passthrough_program_prints_the_text() {
    let program = Processor::generate("plain text\n", &options(&[]));
    assert_eq!(
        program,
        "#sourceLocation(file: \"test.swift.gyb\", line: 1)\nprint(\"plain text\\n\", terminator: \"\")\n"
    );
    assert!(SourceFile::parse(&program).is_clean());
}

#[test]
fn symbols_and_quotes_are_escaped_in_the_program() {
    let program = Processor::generate("a$$b%%c \"q\" \\", &options(&[]));
    assert!(
        program.contains("print(\"a$b%c \\\"q\\\" \\\\\", terminator: \"\")"),
        "{program}"
    );
}

#[test]
fn substitution_becomes_an_interpolation() {
    let program = Processor::generate("x = ${x}", &options(&[("x", "42")]));
    assert!(program.ends_with("print(\"x = \\(x)\", terminator: \"\")\n"), "{program}");
}

#[test]
fn loop_program_has_the_template_shape() {
    let program = Processor::generate("% for i in 0..<3 {\n${i}\n% }\n", &options(&[]));
    assert_eq!(
        program,
        [
            "#sourceLocation(file: \"test.swift.gyb\", line: 1)",
            "for i in 0..<3 {",
            "print(\"\\(i)\\n\", terminator: \"\")",
            "}",
            "",
        ]
        .join("\n")
    );
}

#[test]
fn output_between_brace_and_else_stays_broken() {
    // No directive is to blame, so the fixer leaves the orphaned `else` for
    // the compiler to report.
    let template = "% if true {\na\n% }\nstray\n% else {\nb\n% }\n";
    let program = Processor::generate(template, &options(&[]));
    assert!(program.contains("print(\"stray\\n\", terminator: \"\")\nelse {"), "{program}");
    assert!(Fixer::new(&stitch::swift::Swift).problems(&program).is_empty());

    let file = SourceFile::parse(&program);
    assert!(!file.diagnostics.is_empty());
    assert!(
        file.diagnostics.iter().any(|d| d.message.contains("else")),
        "{:?}",
        file.diagnostics
    );
}

#[test]
fn bindings_are_declared_first() {
    let program = Processor::generate("x = ${x}", &options(&[("x", "42")]));
    assert!(program.starts_with("let x = \"42\"\n\n"));
}

#[test]
fn every_generated_directive_is_legal() {
    let template = "\
% for i in 0..<3 {
%   if i % 2 == 0 {
even ${i}
%   } else {
odd ${i}
%   }
% }
%{
func twice(_ n: Int) -> Int {
    return n * 2
}
}%
${twice(21)}
";
    let program = Processor::generate(template, &options(&[]));
    let file = SourceFile::parse(&program);
    assert!(file.is_clean(), "{program}");
    assert!(!file.directives().is_empty());
}

#[test]
fn directives_map_code_to_template_lines() {
    let template = "a\nb\n% let x = 1\n";
    let program = Processor::generate(template, &options(&[]));
    let file = SourceFile::parse(&program);
    let lines: Vec<usize> = file
        .directives()
        .iter()
        .filter_map(|d| stitch::swift::directive::line_at(file.source, &file.tokens, d.index))
        .collect();
    assert_eq!(lines, vec![1, 3]);
}

#[test]
fn dump_serializes_nodes() {
    let nodes = Processor::parse("a${b}\n% c\n");
    let json = serde_json::to_value(&nodes).unwrap();
    assert_eq!(json[0]["kind"], "literal");
    assert_eq!(json[1]["kind"], "substitution");
    assert_eq!(json[1]["expression"], "b");
    assert_eq!(json[3]["kind"], "code");
}

// =============================================================================
// Execution
// =============================================================================

#[test]
#[ignore = "needs swift and swiftc on PATH"]
fn escaped_symbols_render_once() {
    assert_eq!(render("a$$b%%c", &[]), "a$b%c");
}

#[test]
#[ignore = "needs swift and swiftc on PATH"]
fn binding_substitution() {
    assert_eq!(render("x = ${x}", &[("x", "42")]), "x = 42");
}

#[test]
#[ignore = "needs swift and swiftc on PATH"]
fn loop_repeats_output() {
    assert_eq!(render("% for i in 0..<3 {\n${i}\n% }\n", &[]), "0\n1\n2\n");
}

#[test]
#[ignore = "needs swift and swiftc on PATH"]
fn quotes_and_backslashes_survive() {
    assert_eq!(
        render("say \"\"\" \\n ${\"}\"}\n", &[]),
        "say \"\"\" \\n }\n"
    );
}

#[test]
#[ignore = "needs swift and swiftc on PATH"]
fn output_between_brace_and_else_is_a_compilation_error() {
    let template = "% if true {\na\n% }\nstray\n% else {\nb\n% }\n";
    let err = Processor::render(template, &options(&[]), &toolchain()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CompilationError, "{err}");
    assert_eq!(err.template(), "test.swift.gyb");
}

#[test]
#[ignore = "needs swift and swiftc on PATH"]
fn runtime_failure_is_an_execution_error() {
    let template = "% let xs: [Int] = []\n${xs[1]}\n";
    let err = Processor::render(template, &options(&[]), &toolchain()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExecutionError, "{err}");
}

#[test]
#[ignore = "needs swift and swiftc on PATH"]
fn compile_path_matches_interpreter() {
    let toolchain = toolchain();
    let compiled = Toolchain {
        force_compile: true,
        ..toolchain.clone()
    };
    let template = "% for i in 1...2 {\nline ${i}\n% }\n";
    let a = Processor::render(template, &options(&[]), &toolchain).expect("interpret");
    let b = Processor::render(template, &options(&[]), &compiled).expect("compile");
    assert_eq!(a, b);
}
