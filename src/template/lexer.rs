//! Tokenizer for templates.
//!
//! Splits template text into [`Token`]s without copying it. The end of
//! `${...}` and `%{...}%` is found by asking the embedded-language
//! [`Oracle`] for its delimiter stream, so braces inside Swift strings,
//! comments and closures never end a substitution early. The tokenizer
//! never fails: an unterminated construct degrades to literal text.

use tracing::debug;

use super::token::{Token, TokenKind};
use crate::swift::{self, Delimiter, Oracle};

pub struct Lexer<'a, 'o> {
    source: &'a str,
    pos: usize,
    oracle: &'o dyn Oracle,
}

impl<'a, 'o> Lexer<'a, 'o> {
    pub fn new(source: &'a str, oracle: &'o dyn Oracle) -> Self {
        Self {
            source,
            pos: 0,
            oracle,
        }
    }

    pub fn tokenize(self) -> Vec<Token<'a>> {
        self.collect()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn emit(&mut self, kind: TokenKind, len: usize) -> Token<'a> {
        let token = Token {
            kind,
            text: &self.source[self.pos..self.pos + len],
            offset: self.pos,
        };
        self.pos += len;
        token
    }

    /// Offset in `code` of the `}` that ends it: the first close delimiter
    /// that takes the nesting count below zero. A stray `)` or `]` there
    /// leaves the construct unterminated.
    fn find_terminator(&self, code: &str) -> Option<usize> {
        let mut depth: i32 = 0;
        for token in self.oracle.tokens(code) {
            match token.kind.delimiter() {
                Delimiter::Open => depth += 1,
                Delimiter::Close => {
                    depth -= 1;
                    if depth < 0 {
                        return (token.kind == swift::TokenKind::RBrace)
                            .then_some(token.text.start);
                    }
                }
                Delimiter::Other => {}
            }
        }
        None
    }

    fn lex_substitution(&mut self) -> Token<'a> {
        match self.find_terminator(&self.rest()[2..]) {
            Some(close) => self.emit(TokenKind::SubstitutionOpen, 2 + close + 1),
            None => {
                debug!(offset = self.pos, "unterminated substitution, keeping `$` as text");
                self.emit(TokenKind::Literal, 1)
            }
        }
    }

    fn lex_block(&mut self) -> Token<'a> {
        let rest = self.rest();
        if let Some(close) = self.find_terminator(&rest[2..]) {
            let end = 2 + close + 1;
            if rest[end..].starts_with('%') {
                let mut len = end + 1;
                if rest[len..].starts_with("\r\n") {
                    len += 2;
                } else if rest[len..].starts_with('\n') {
                    len += 1;
                }
                return self.emit(TokenKind::CodeBlock, len);
            }
        }
        debug!(offset = self.pos, "unterminated code block, keeping `%` as text");
        self.emit(TokenKind::Literal, 1)
    }

    /// Length of the `%`-line starting at `at`, newline included, if `at`
    /// begins one: start of line, optional indentation, then `%` followed by
    /// anything but `{` or `%`.
    fn code_line_len(&self, at: usize) -> Option<usize> {
        if at > 0 && self.source.as_bytes()[at - 1] != b'\n' {
            return None;
        }
        let line = &self.source[at..];
        let body = line.trim_start_matches([' ', '\t']);
        let mut chars = body.chars();
        if chars.next() != Some('%') {
            return None;
        }
        if matches!(chars.next(), None | Some('{') | Some('%')) {
            return None;
        }
        Some(line.find('\n').map_or(line.len(), |nl| nl + 1))
    }

    /// Maximal literal run: up to the next `$` or `%`, or the start of an
    /// indented `%`-line. Always at least one character.
    fn literal_len(&self) -> usize {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        let mut prev = match chars.next() {
            Some((_, c)) => c,
            None => return 0,
        };
        for (i, c) in chars {
            if c == '$' || c == '%' {
                return i;
            }
            if prev == '\n' && self.code_line_len(self.pos + i).is_some() {
                return i;
            }
            prev = c;
        }
        rest.len()
    }
}

impl<'a> Iterator for Lexer<'a, '_> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = self.rest();
        if rest.is_empty() {
            return None;
        }

        let token = if rest.starts_with("$$") || rest.starts_with("%%") {
            self.emit(TokenKind::Symbol, 2)
        } else if rest.starts_with("${") {
            self.lex_substitution()
        } else if rest.starts_with("%{") {
            self.lex_block()
        } else if let Some(len) = self.code_line_len(self.pos) {
            self.emit(TokenKind::CodeLines, len)
        } else {
            let len = self.literal_len();
            self.emit(TokenKind::Literal, len)
        };
        Some(token)
    }
}
