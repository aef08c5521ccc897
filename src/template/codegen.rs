//! Code generator — compiles template nodes into one Swift program.
//!
//! Bindings become `let` declarations. Runs of output nodes become a single
//! `print`; runs of code nodes are emitted verbatim. A directive from the
//! [`Oracle`] maps program lines back to template lines, and one is emitted
//! wherever the program would otherwise drift out of step with the template.
//!
//! The printed text keeps the template's line structure. Its first template
//! line sits in a one-line string on the `print(` line itself, and the rest
//! follows in a multi-line literal, so every interpolation lands on the
//! program line that maps to its template line.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::ast::Node;
use crate::line_index::LineIndex;
use crate::swift::{directive, Oracle};

/// A `NAME=VALUE` binding, visible to template code as `let NAME = "VALUE"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub value: String,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl FromStr for Binding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("missing binding name in `{s}`"));
        }
        Ok(Binding::new(name, value))
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Generates the program for one template. Single use.
pub struct CodeGenerator<'a> {
    file: &'a str,
    oracle: &'a dyn Oracle,
    line_directive: Option<&'a str>,
    lines: LineIndex,
    chunks: Vec<String>,
    /// Program line the next chunk starts on.
    next_line: usize,
    /// Program line of the last directive, and the template line it named.
    anchor: Option<(usize, usize)>,
}

impl<'a> CodeGenerator<'a> {
    /// `template` is the source the nodes were parsed from; `file` is the
    /// name directives refer to. Directives are rendered by `oracle`.
    pub fn new(template: &str, file: &'a str, oracle: &'a dyn Oracle) -> Self {
        Self {
            file,
            oracle,
            line_directive: None,
            lines: LineIndex::new(template),
            chunks: Vec::new(),
            next_line: 1,
            anchor: None,
        }
    }

    /// Also print a marker with `{file}` and `{line}` placeholders filled in
    /// at the start of every output batch. Empty disables it.
    pub fn with_line_directive(mut self, format: Option<&'a str>) -> Self {
        self.line_directive = format.filter(|f| !f.is_empty());
        self
    }

    pub fn generate(mut self, nodes: &[Node<'_>], bindings: &[Binding]) -> String {
        for binding in bindings {
            self.push(format!(
                "let {} = {}",
                binding.name,
                directive::string_literal(&binding.value)
            ));
        }
        if !bindings.is_empty() {
            self.push(String::new());
        }

        for batch in batches(nodes) {
            if batch[0].is_output() {
                self.output_batch(batch);
            } else {
                self.code_batch(batch);
            }
        }

        debug!(
            nodes = nodes.len(),
            lines = self.next_line - 1,
            "generated program"
        );
        let mut program = self.chunks.join("\n");
        program.push('\n');
        program
    }

    fn push(&mut self, chunk: String) {
        self.next_line += chunk.matches('\n').count() + 1;
        self.chunks.push(chunk);
    }

    /// Emit a directive for `template_line` unless the next program line
    /// already maps there.
    fn sync(&mut self, template_line: usize) {
        if let Some((directive_line, announced)) = self.anchor {
            let mapped = announced + (self.next_line - directive_line - 1);
            if mapped == template_line {
                return;
            }
        }
        self.anchor = Some((self.next_line, template_line));
        let directive = self.oracle.directive(self.file, template_line);
        self.push(directive);
    }

    fn output_batch(&mut self, batch: &[Node<'_>]) {
        let line = self.lines.line_of(batch[0].offset());
        self.sync(line);

        let mut text = PrintText::default();
        if let Some(format) = self.line_directive {
            let marker = format
                .replace("{file}", self.file)
                .replace("{line}", &line.to_string());
            text.push_inline(&marker);
            text.push_inline("\n");
        }
        for node in batch {
            match node {
                Node::Literal { text: literal, .. } => text.push_text(literal),
                Node::Substitution { expression, .. } => text.push_interpolation(expression),
                Node::Code { .. } => {}
            }
        }
        self.push(text.into_print());
    }

    /// Code nodes are emitted one chunk each, so two blocks sharing a
    /// template line get a fresh directive instead of shifting what follows.
    fn code_batch(&mut self, batch: &[Node<'_>]) {
        for node in batch {
            if let Node::Code { text, offset } = node {
                self.sync(self.lines.line_of(*offset));
                self.push(text.to_string());
            }
        }
    }
}

/// The argument of one `print`: a one-line head holding everything up to
/// the first template newline, then a multi-line tail.
#[derive(Debug, Default)]
struct PrintText {
    head: String,
    tail: Option<String>,
}

impl PrintText {
    /// Text that stays in the head, newlines escaped.
    fn push_inline(&mut self, text: &str) {
        escape_into(&mut self.head, text, true);
    }

    fn push_text(&mut self, text: &str) {
        if let Some(tail) = &mut self.tail {
            escape_into(tail, text, false);
            return;
        }
        match text.split_once('\n') {
            Some((first, rest)) => {
                escape_into(&mut self.head, first, true);
                self.head.push_str("\\n");
                let mut tail = String::new();
                escape_into(&mut tail, rest, false);
                self.tail = Some(tail);
            }
            None => escape_into(&mut self.head, text, true),
        }
    }

    fn push_interpolation(&mut self, expression: &str) {
        if self.tail.is_none() && expression.contains('\n') {
            // A one-line string cannot hold a line break, not even inside
            // `\( )`; everything moves to the multi-line literal.
            self.tail = Some(std::mem::take(&mut self.head));
        }
        let out = self.tail.as_mut().unwrap_or(&mut self.head);
        out.push_str("\\(");
        out.push_str(expression);
        out.push(')');
    }

    fn into_print(self) -> String {
        match self.tail {
            Some(tail) if !tail.is_empty() && self.head.is_empty() => {
                format!("print(\"\"\"\n{tail}\n\"\"\", terminator: \"\")")
            }
            Some(tail) if !tail.is_empty() => format!(
                "print(\"{}\" + \"\"\"\n{tail}\n\"\"\", terminator: \"\")",
                self.head
            ),
            _ => format!("print(\"{}\", terminator: \"\")", self.head),
        }
    }
}

/// Maximal runs of output nodes and of code nodes.
fn batches<'n, 'a>(nodes: &'n [Node<'a>]) -> Vec<&'n [Node<'a>]> {
    let mut batches = Vec::new();
    let mut start = 0;
    for i in 1..=nodes.len() {
        if i == nodes.len() || nodes[i].is_output() != nodes[start].is_output() {
            batches.push(&nodes[start..i]);
            start = i;
        }
    }
    batches
}

/// Escape text for a string literal body. `inline` also escapes newlines,
/// for one-line literals.
fn escape_into(out: &mut String, text: &str, inline: bool) {
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            '\n' if inline => out.push_str("\\n"),
            c => out.push(c),
        }
    }
}
