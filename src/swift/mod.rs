//! Swift oracle — the embedded language's lexer and structural checker.
//!
//! The template tokenizer asks it where embedded code ends; the directive
//! fixer asks it whether a `#sourceLocation` sits somewhere legal. Both go
//! through the narrow [`Oracle`] trait.

pub mod check;
pub mod directive;
pub mod lexer;
pub mod token;

pub use check::Diagnostic;
pub use lexer::Lexer;
pub use token::{Delimiter, Keyword, Token, TokenKind};

use crate::line_index::LineIndex;

/// Lexing and validity checks for the embedded language.
pub trait Oracle {
    /// Lazily lex `text`. Must tolerate incomplete and invalid input, and
    /// must not report delimiters found inside strings or comments.
    fn tokens<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = Token> + 'a>;

    /// Lex all of `text` and run the structural check.
    fn parse<'a>(&self, text: &'a str) -> SourceFile<'a>;

    /// A directive telling the compiler that the following line is `line`
    /// of `file`.
    fn directive(&self, file: &str, line: usize) -> String;
}

/// The Swift implementation of [`Oracle`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Swift;

impl Oracle for Swift {
    fn tokens<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = Token> + 'a> {
        Box::new(Lexer::new(text))
    }

    fn parse<'a>(&self, text: &'a str) -> SourceFile<'a> {
        SourceFile::parse(text)
    }

    fn directive(&self, file: &str, line: usize) -> String {
        directive::render(file, line)
    }
}

/// A directive found in a [`SourceFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveRef {
    /// Index of the `#sourceLocation` token.
    pub index: usize,
    /// Token count.
    pub len: usize,
}

/// A lexed and checked Swift source.
#[derive(Debug)]
pub struct SourceFile<'a> {
    pub source: &'a str,
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
    lines: LineIndex,
}

impl<'a> SourceFile<'a> {
    pub fn parse(source: &'a str) -> Self {
        let tokens = Lexer::new(source).tokenize();
        let diagnostics = check::diagnose(source, &tokens);
        Self {
            source,
            tokens,
            diagnostics,
            lines: LineIndex::new(source),
        }
    }

    /// 1-based line on which token `index` begins.
    pub fn line_of(&self, index: usize) -> usize {
        self.lines.line_of(self.tokens[index].text.start)
    }

    /// Every well-formed directive, in source order.
    pub fn directives(&self) -> Vec<DirectiveRef> {
        let mut found = Vec::new();
        let mut i = 0;
        while i < self.tokens.len() {
            match directive::match_at(self.source, &self.tokens, i) {
                Some(len) => {
                    found.push(DirectiveRef { index: i, len });
                    i += len;
                }
                None => i += 1,
            }
        }
        found
    }

    /// The diagnostic that makes a directive problematic: one covering it,
    /// or one starting at the token right after it.
    pub fn blame(&self, directive: DirectiveRef) -> Option<&Diagnostic> {
        let span = directive.index..directive.index + directive.len;
        self.diagnostics.iter().find(|d| {
            let overlaps = d.tokens.start < span.end && span.start < d.tokens.end;
            overlaps || d.tokens.start == span.end
        })
    }

    /// Whether the source has any structural problem at all.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
