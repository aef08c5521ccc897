//! Template processor — template text → tokens → nodes → Swift program → output.

pub mod ast;
pub mod codegen;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Node;
pub use codegen::{Binding, CodeGenerator};
pub use token::{Token, TokenKind};

use tracing::debug;

use crate::error::RunError;
use crate::fixer::Fixer;
use crate::run::Toolchain;
use crate::swift::Swift;
use lexer::Lexer;

/// How to turn one template into a program.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Template name that `#sourceLocation` directives refer to.
    pub file: String,
    pub bindings: Vec<Binding>,
    /// Output-visible line marker with `{file}` and `{line}` placeholders.
    pub line_directive: Option<String>,
}

impl Options {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }
}

/// The template processor.
///
/// Each stage is reachable on its own so the CLI can stop after any of them.
pub struct Processor;

impl Processor {
    pub fn tokenize(template: &str) -> Vec<Token<'_>> {
        Lexer::new(template, &Swift).tokenize()
    }

    pub fn parse(template: &str) -> Vec<Node<'_>> {
        parser::build(Lexer::new(template, &Swift))
    }

    /// Generate the Swift program for `template`, with directives fixed.
    pub fn generate(template: &str, options: &Options) -> String {
        let nodes = Self::parse(template);
        debug!(file = %options.file, nodes = nodes.len(), "parsed template");
        let program = CodeGenerator::new(template, &options.file, &Swift)
            .with_line_directive(options.line_directive.as_deref())
            .generate(&nodes, &options.bindings);
        Fixer::new(&Swift).fix(&program)
    }

    /// Generate and run `template`, returning what it prints.
    pub fn render(
        template: &str,
        options: &Options,
        toolchain: &Toolchain,
    ) -> Result<String, RunError> {
        let program = Self::generate(template, options);
        toolchain.run(&program, &options.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swift::SourceFile;

    #[test]
    fn generate_passthrough() {
        let program = Processor::generate("hello\n", &Options::new("t.gyb"));
        assert_eq!(
            program,
            "#sourceLocation(file: \"t.gyb\", line: 1)\nprint(\"hello\\n\", terminator: \"\")\n"
        );
    }

    #[test]
    fn generated_if_else_is_clean() {
        let template = "% if n.count > 1 {\nmany\n% } else {\none\n% }\n";
        let mut options = Options::new("t.gyb");
        options.bindings.push(Binding::new("n", "2"));
        let program = Processor::generate(template, &options);
        assert!(SourceFile::parse(&program).is_clean(), "{program}");
    }

    #[test]
    fn else_on_its_own_line_stays_attached() {
        let template = "% if true {\na\n% }\n% else {\nb\n% }\n";
        let program = Processor::generate(template, &Options::new("t.gyb"));
        assert!(program.contains("}\nelse {"), "{program}");
        assert!(SourceFile::parse(&program).is_clean(), "{program}");
    }

    #[test]
    fn output_inside_brackets_moves_the_directive_out() {
        let template = "% let xs = [\n${1}\n% ]\n";
        let program = Processor::generate(template, &Options::new("t.gyb"));
        let file = SourceFile::parse(&program);
        for d in file.directives() {
            assert!(file.blame(d).is_none(), "{program}");
        }
    }
}
