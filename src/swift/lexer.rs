//! Lexer for Swift source.
//!
//! Best-effort and total: it never fails. Unterminated strings and comments
//! run to the end of the input and are flagged on the token; characters that
//! start no Swift token become [`TokenKind::Unknown`]. The lexer is an
//! iterator so callers that only need a prefix of the stream (brace matching)
//! stop as soon as they have an answer.

use super::token::{Keyword, Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            done: false,
        }
    }

    /// Lex the whole input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(self) -> Vec<Token> {
        self.collect()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    /// Whitespace, newlines and comments. Returns `true` if a block comment
    /// ran off the end of the input.
    fn skip_leading_trivia(&mut self) -> bool {
        let mut unterminated = false;
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\n' | '\r' | '\u{000B}' | '\u{000C}') => {
                    self.advance();
                }
                Some('/') if self.rest().starts_with("//") => self.skip_line_comment(),
                Some('/') if self.rest().starts_with("/*") => {
                    unterminated |= !self.skip_block_comment();
                }
                _ => break,
            }
        }
        unterminated
    }

    /// Whitespace and comments up to, never including, the next newline.
    fn skip_trailing_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t') => {
                    self.advance();
                }
                Some('/') if self.rest().starts_with("//") => self.skip_line_comment(),
                Some('/') if self.rest().starts_with("/*") => {
                    let saved = self.pos;
                    let closed = self.skip_block_comment();
                    if !closed || self.source[saved..self.pos].contains('\n') {
                        self.pos = saved;
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        self.advance_while(|c| c != '\n' && c != '\r');
    }

    /// Block comments nest. Returns `false` if the input ends first.
    fn skip_block_comment(&mut self) -> bool {
        self.pos += 2;
        let mut depth = 1;
        while !self.rest().is_empty() {
            if self.rest().starts_with("/*") {
                depth += 1;
                self.pos += 2;
            } else if self.rest().starts_with("*/") {
                depth -= 1;
                self.pos += 2;
                if depth == 0 {
                    return true;
                }
            } else {
                self.advance();
            }
        }
        false
    }

    fn lex_token(&mut self, ch: char) -> (TokenKind, bool) {
        let kind = match ch {
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            ';' => self.single(TokenKind::Semicolon),
            '@' => self.single(TokenKind::At),
            '\\' => self.single(TokenKind::Backslash),
            '"' => {
                let terminated = self.lex_string(0);
                return (TokenKind::String, !terminated);
            }
            '#' => return self.lex_pound(),
            '`' => self.lex_backtick(),
            '$' => {
                self.advance();
                self.advance_while(is_ident_continue);
                TokenKind::Identifier
            }
            '0'..='9' => self.lex_number(),
            '.' => self.lex_dot(),
            c if is_operator_char(c) => self.lex_operator(),
            c if is_ident_start(c) => self.lex_ident_or_keyword(),
            _ => self.single(TokenKind::Unknown),
        };
        (kind, false)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn lex_ident_or_keyword(&mut self) -> TokenKind {
        let start = self.pos;
        self.advance_while(is_ident_continue);
        match Keyword::from_ident(&self.source[start..self.pos]) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier,
        }
    }

    fn lex_backtick(&mut self) -> TokenKind {
        self.advance();
        self.advance_while(|c| c != '`' && c != '\n');
        if self.peek() == Some('`') {
            self.advance();
        }
        TokenKind::Identifier
    }

    /// `#keyword`, or a raw string opened by one or more `#`.
    fn lex_pound(&mut self) -> (TokenKind, bool) {
        let hashes = self.rest().chars().take_while(|&c| c == '#').count();
        if self.peek_nth(hashes) == Some('"') {
            self.pos += hashes;
            let terminated = self.lex_string(hashes);
            return (TokenKind::String, !terminated);
        }
        self.advance();
        if hashes == 1 && self.peek().is_some_and(is_ident_start) {
            self.advance_while(is_ident_continue);
            return (TokenKind::PoundKeyword, false);
        }
        (TokenKind::Unknown, false)
    }

    /// Lex a string literal starting at its opening quote. `hashes` is the
    /// raw-string delimiter depth, already consumed. Returns `false` if the
    /// literal is unterminated.
    fn lex_string(&mut self, hashes: usize) -> bool {
        let pounds = "#".repeat(hashes);
        let multiline = self.rest().starts_with("\"\"\"");
        let quote = if multiline { "\"\"\"" } else { "\"" };
        self.pos += quote.len();
        let close = format!("{quote}{pounds}");
        let escape = format!("\\{pounds}");

        loop {
            let Some(ch) = self.peek() else {
                return false;
            };
            if self.rest().starts_with(&escape) {
                self.pos += escape.len();
                match self.peek() {
                    Some('(') => {
                        self.advance();
                        if !self.skip_interpolation() {
                            return false;
                        }
                    }
                    Some('\n') | Some('\r') if !multiline => return false,
                    Some(_) => {
                        self.advance();
                    }
                    None => return false,
                }
                continue;
            }
            if ch == '"' && self.rest().starts_with(&close) {
                self.pos += close.len();
                return true;
            }
            if (ch == '\n' || ch == '\r') && !multiline {
                return false;
            }
            self.advance();
        }
    }

    /// Skip the body of `\( ... )` inside a string, past the closing paren.
    fn skip_interpolation(&mut self) -> bool {
        let mut depth = 1;
        loop {
            match self.peek() {
                None => return false,
                Some('(') => {
                    depth += 1;
                    self.advance();
                }
                Some(')') => {
                    self.advance();
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                Some('"') => {
                    if !self.lex_string(0) {
                        return false;
                    }
                }
                Some('#') => {
                    let hashes = self.rest().chars().take_while(|&c| c == '#').count();
                    if self.peek_nth(hashes) == Some('"') {
                        self.pos += hashes;
                        if !self.lex_string(hashes) {
                            return false;
                        }
                    } else {
                        self.pos += hashes;
                    }
                }
                Some('/') if self.rest().starts_with("//") => self.skip_line_comment(),
                Some('/') if self.rest().starts_with("/*") => {
                    if !self.skip_block_comment() {
                        return false;
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        let radix_prefix = ["0x", "0o", "0b"]
            .iter()
            .any(|p| self.rest().starts_with(p));
        if radix_prefix {
            self.pos += 2;
            self.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
            return TokenKind::Integer;
        }

        let mut kind = TokenKind::Integer;
        self.advance_while(|c| c.is_ascii_digit() || c == '_');
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit() || c == '_');
            kind = TokenKind::Float;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent = match self.peek_nth(1) {
                Some('+' | '-') => self.peek_nth(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent {
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                self.advance_while(|c| c.is_ascii_digit() || c == '_');
                kind = TokenKind::Float;
            }
        }
        // `1abc` is not valid Swift, but keep it in one token.
        self.advance_while(is_ident_continue);
        kind
    }

    /// `.` on its own, or a dot operator such as `..<` and `...`.
    fn lex_dot(&mut self) -> TokenKind {
        if self.peek_nth(1) != Some('.') {
            return self.single(TokenKind::Dot);
        }
        self.advance_while(|c| c == '.' || is_operator_char(c));
        TokenKind::Operator
    }

    fn lex_operator(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_operator_char(c) || self.rest().starts_with("//") || self.rest().starts_with("/*")
            {
                break;
            }
            self.advance();
        }
        if self.pos == start {
            // A lone `/` that opens a comment never reaches here; anything
            // else is a single unknown character.
            return self.single(TokenKind::Unknown);
        }
        match &self.source[start..self.pos] {
            "=" => TokenKind::Equal,
            "->" => TokenKind::Arrow,
            _ => TokenKind::Operator,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }

        let leading_start = self.pos;
        let comment_unterminated = self.skip_leading_trivia();
        let leading = leading_start..self.pos;

        let start = self.pos;
        let (kind, unterminated) = match self.peek() {
            None => {
                self.done = true;
                (TokenKind::Eof, false)
            }
            Some(ch) => self.lex_token(ch),
        };
        let text = start..self.pos;

        let trailing_start = self.pos;
        if kind != TokenKind::Eof {
            self.skip_trailing_trivia();
        }

        Some(Token {
            kind,
            leading,
            text,
            trailing: trailing_start..self.pos,
            unterminated: unterminated || comment_unterminated,
        })
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '/' | '=' | '-' | '+' | '!' | '*' | '%' | '<' | '>' | '&' | '|' | '^' | '~' | '?'
    )
}
