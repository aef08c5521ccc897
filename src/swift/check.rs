//! Structural checker for Swift token streams.
//!
//! This is not a Swift parser. It tracks delimiter nesting and pending
//! statement headers, which is enough to decide whether a `#sourceLocation`
//! directive sits where a statement may begin, and to report the breakage a
//! misplaced directive causes downstream (an orphaned `else`, a body brace
//! cut off from its header, an expression continued on the next line).

use std::ops::Range;

use super::directive;
use super::token::{Keyword, Token, TokenKind};

/// An unexpected span, as a range of token indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub tokens: Range<usize>,
    pub message: String,
}

/// Check a complete token stream (ending in `Eof`).
pub fn diagnose(source: &str, tokens: &[Token]) -> Vec<Diagnostic> {
    Checker::new(source, tokens).run()
}

#[derive(Debug)]
struct Frame {
    /// Opening delimiter; `None` for the file scope.
    open: Option<TokenKind>,
    index: usize,
    /// Header keyword whose body this brace opened.
    header: Option<Keyword>,
    /// Header keyword still waiting for its `{`.
    awaiting: Option<Keyword>,
}

impl Frame {
    fn is_brace_scope(&self) -> bool {
        matches!(self.open, None | Some(TokenKind::LBrace))
    }
}

struct Checker<'a> {
    source: &'a str,
    tokens: &'a [Token],
    frames: Vec<Frame>,
    diagnostics: Vec<Diagnostic>,
    /// Header of the brace closed by the previous token, if any.
    last_closed: Option<Keyword>,
}

impl<'a> Checker<'a> {
    fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            source,
            tokens,
            frames: vec![Frame {
                open: None,
                index: 0,
                header: None,
                awaiting: None,
            }],
            diagnostics: Vec::new(),
            last_closed: None,
        }
    }

    fn run(mut self) -> Vec<Diagnostic> {
        let tokens = self.tokens;
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            let last_closed = self.last_closed.take();

            if token.unterminated {
                self.report(i..i + 1, "unterminated string literal or comment");
            }

            match token.kind {
                TokenKind::PoundKeyword if token.text(self.source) == directive::NAME => {
                    if let Some(len) = directive::match_at(self.source, tokens, i) {
                        self.check_directive(i, len, last_closed);
                        i += len;
                        continue;
                    }
                    self.report(i..i + 1, "malformed #sourceLocation directive");
                }
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => self.open(i),
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => self.close(i),
                TokenKind::Semicolon => self.frame_mut().awaiting = None,
                TokenKind::Keyword(Keyword::Else) => self.check_else(i),
                TokenKind::Keyword(kw) if kw.opens_header() => {
                    if kw == Keyword::Catch {
                        self.check_catch(i);
                    }
                    self.begin_header(i, kw, last_closed);
                }
                TokenKind::Eof => self.finish(),
                _ => {}
            }
            i += 1;
        }
        self.diagnostics
    }

    fn report(&mut self, tokens: Range<usize>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            tokens,
            message: message.into(),
        });
    }

    fn frame(&self) -> &Frame {
        // The file scope is never popped.
        &self.frames[self.frames.len() - 1]
    }

    fn frame_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn prev(&self, i: usize) -> Option<&'a Token> {
        i.checked_sub(1).and_then(|p| self.tokens.get(p))
    }

    fn open(&mut self, i: usize) {
        let kind = self.tokens[i].kind;
        let header = if kind == TokenKind::LBrace {
            self.frame_mut().awaiting.take()
        } else {
            None
        };
        self.frames.push(Frame {
            open: Some(kind),
            index: i,
            header,
            awaiting: None,
        });
    }

    fn close(&mut self, i: usize) {
        let kind = self.tokens[i].kind;
        let matching = self
            .frames
            .iter()
            .rposition(|f| f.open.and_then(TokenKind::closer) == Some(kind));

        let Some(pos) = matching else {
            self.report(i..i + 1, "unexpected closing delimiter");
            return;
        };

        let unclosed: Vec<usize> = self.frames.drain(pos + 1..).map(|f| f.index).collect();
        for index in unclosed {
            self.report(index..index + 1, "unclosed delimiter");
        }
        if let Some(frame) = self.frames.pop() {
            self.last_closed = frame.header;
        }
    }

    fn finish(&mut self) {
        let unclosed: Vec<usize> = self.frames.drain(1..).map(|f| f.index).collect();
        for index in unclosed {
            self.report(index..index + 1, "unclosed delimiter");
        }
    }

    fn begin_header(&mut self, i: usize, kw: Keyword, last_closed: Option<Keyword>) {
        if !self.frame().is_brace_scope() {
            return;
        }
        let prev = self.prev(i).map(|t| t.kind);
        if prev == Some(TokenKind::Dot) {
            // `self.init(...)`, `Foo.default`
            return;
        }
        if kw == Keyword::While
            && prev == Some(TokenKind::RBrace)
            && last_closed == Some(Keyword::Repeat)
        {
            return;
        }
        self.frame_mut().awaiting = Some(kw);
    }

    fn check_else(&mut self, i: usize) {
        let after_brace = self.prev(i).is_some_and(|t| t.kind == TokenKind::RBrace);
        let in_guard = self.frame().awaiting == Some(Keyword::Guard);
        if !after_brace && !in_guard {
            self.report(i..i + 1, "`else` must follow the closing brace of an `if`");
        }
    }

    fn check_catch(&mut self, i: usize) {
        if !self.prev(i).is_some_and(|t| t.kind == TokenKind::RBrace) {
            self.report(i..i + 1, "`catch` must follow the closing brace of a `do`");
        }
    }

    fn check_directive(&mut self, i: usize, len: usize, last_closed: Option<Keyword>) {
        let tokens = self.tokens;
        let mut problems = Vec::new();

        if i > 0 && !tokens[i].starts_line(self.source) {
            problems.push("must begin a line");
        }
        let next = tokens.get(i + len);
        if let Some(next) = next {
            if next.kind != TokenKind::Eof && !next.starts_line(self.source) {
                problems.push("must end its line");
            }
        }
        if !self.frame().is_brace_scope() {
            problems.push("cannot appear inside parentheses or brackets");
        } else if self.frame().awaiting.is_some() {
            problems.push("cannot appear inside a statement header");
        }
        if let Some(prev) = self.prev(i) {
            if self.requires_continuation(prev) {
                problems.push("interrupts an unfinished statement");
            }
        }
        if last_closed == Some(Keyword::Repeat) {
            problems.push("cannot separate `repeat` from its `while`");
        }

        if !problems.is_empty() {
            self.report(
                i..i + len,
                format!("#sourceLocation {}", problems.join(", ")),
            );
        }

        if let Some(next) = next {
            if cannot_start_statement(self.source, next) {
                let at = i + len;
                self.report(at..at + 1, "expected a statement after #sourceLocation");
            }
        }
    }

    /// Whether a statement ending in `token` must continue on the next line.
    fn requires_continuation(&self, token: &Token) -> bool {
        match token.kind {
            TokenKind::Comma
            | TokenKind::Equal
            | TokenKind::Arrow
            | TokenKind::Dot
            | TokenKind::At
            | TokenKind::Backslash
            | TokenKind::LParen
            | TokenKind::LBracket => true,
            // Case labels end in a colon.
            TokenKind::Colon => self.frame().header != Some(Keyword::Switch),
            TokenKind::Operator => !is_postfix(self.source, token),
            TokenKind::Keyword(kw) => matches!(
                kw,
                Keyword::Let
                    | Keyword::Var
                    | Keyword::As
                    | Keyword::Is
                    | Keyword::Try
                    | Keyword::Await
                    | Keyword::Import
                    | Keyword::Typealias
                    | Keyword::Where
                    | Keyword::Case
                    | Keyword::Default
                    | Keyword::Else
            ),
            _ => false,
        }
    }
}

/// `x!`, `y?` — attached to their operand with no space before.
fn is_postfix(source: &str, token: &Token) -> bool {
    matches!(token.text(source), "!" | "?") && token.leading.is_empty()
}

/// `-x`, `!flag`, `..<n` — attached to their operand with no space after.
fn is_prefix(source: &str, token: &Token) -> bool {
    matches!(token.text(source), "-" | "+" | "!" | "~" | "&" | "..<" | "...")
        && token.trailing.is_empty()
}

/// Tokens that cannot open a statement. `else` and `catch` are left to
/// their own checks.
fn cannot_start_statement(source: &str, token: &Token) -> bool {
    match token.kind {
        TokenKind::RParen
        | TokenKind::RBracket
        | TokenKind::Comma
        | TokenKind::Colon
        | TokenKind::Equal
        | TokenKind::Arrow
        | TokenKind::Dot
        | TokenKind::LBrace => true,
        TokenKind::Keyword(kw) => matches!(
            kw,
            Keyword::Where | Keyword::In | Keyword::As | Keyword::Is
        ),
        TokenKind::Operator => !is_prefix(source, token),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swift::Lexer;

    fn check(src: &str) -> Vec<Diagnostic> {
        let tokens = Lexer::new(src).tokenize();
        diagnose(src, &tokens)
    }

    fn flagged_texts(src: &str) -> Vec<String> {
        let tokens = Lexer::new(src).tokenize();
        diagnose(src, &tokens)
            .iter()
            .map(|d| {
                let start = tokens[d.tokens.start].text.start;
                let end = tokens[d.tokens.end - 1].text.end;
                src[start..end].to_string()
            })
            .collect()
    }

    const D: &str = "#sourceLocation(file: \"t\", line: 1)";

    #[test]
    fn well_formed_program_is_clean() {
        let src = format!(
            "{D}\nlet xs = [1, 2]\n{D}\nfor x in xs {{\n{D}\n  print(x)\n{D}\n}}\n"
        );
        assert!(check(&src).is_empty(), "{:?}", check(&src));
    }

    #[test]
    fn directive_before_else_orphans_it() {
        let src = format!("if a {{\n}}\n{D}\nelse {{\n}}\n");
        assert_eq!(flagged_texts(&src), vec!["else"]);
    }

    #[test]
    fn if_else_chain_is_clean() {
        assert!(check("if a {\n} else if b {\n} else {\n}\n").is_empty());
    }

    #[test]
    fn guard_else_is_clean() {
        assert!(check("guard let x = y else { return }\n").is_empty());
    }

    #[test]
    fn directive_inside_header_is_flagged() {
        let src = format!("if a\n{D}\n{{\n}}\n");
        let texts = flagged_texts(&src);
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0], D);
        assert_eq!(texts[1], "{");
    }

    #[test]
    fn directive_inside_parens_is_flagged() {
        let src = format!("print(\n{D}\n1)\n");
        assert_eq!(flagged_texts(&src), vec![D.to_string()]);
    }

    #[test]
    fn directive_after_binary_operator_is_flagged() {
        let src = format!("let x = 1 +\n{D}\n2\n");
        assert_eq!(flagged_texts(&src), vec![D.to_string()]);
    }

    #[test]
    fn directive_before_member_continuation_is_flagged() {
        let src = format!("let x = xs\n{D}\n.count\n");
        assert_eq!(flagged_texts(&src), vec!["."]);
    }

    #[test]
    fn directive_sharing_a_line_is_flagged() {
        let src = format!("let x = 1; {D}\n");
        assert_eq!(flagged_texts(&src), vec![D.to_string()]);
        let src = format!("{D} let x = 1\n");
        assert_eq!(flagged_texts(&src), vec![D.to_string()]);
    }

    #[test]
    fn directive_after_case_label_is_clean() {
        let src = format!("switch x {{\ncase 1:\n{D}\n  print(1)\ndefault:\n  break\n}}\n");
        assert!(check(&src).is_empty(), "{:?}", check(&src));
    }

    #[test]
    fn repeat_while_is_clean() {
        let src = format!("repeat {{\n  i += 1\n}} while i < 3\n{D}\nprint(i)\n");
        assert!(check(&src).is_empty(), "{:?}", check(&src));
    }

    #[test]
    fn directive_between_repeat_body_and_while_is_flagged() {
        let src = format!("repeat {{\n  i += 1\n}}\n{D}\nwhile i < 3\n");
        assert_eq!(flagged_texts(&src), vec![D.to_string()]);
    }

    #[test]
    fn directive_after_other_bodies_is_clean() {
        let src = format!("while i < 3 {{\n  i += 1\n}}\n{D}\nprint(i)\n");
        assert!(check(&src).is_empty(), "{:?}", check(&src));
    }

    #[test]
    fn postfix_operator_ends_a_statement() {
        let src = format!("let x = y!\n{D}\nprint(x)\n");
        assert!(check(&src).is_empty());
    }

    #[test]
    fn unbalanced_delimiters_are_flagged() {
        assert_eq!(flagged_texts("}\n"), vec!["}"]);
        assert_eq!(flagged_texts("if a {\n"), vec!["{"]);
        assert_eq!(flagged_texts("foo(]\n"), vec!["]", "("]);
    }

    #[test]
    fn malformed_directive_is_flagged() {
        assert_eq!(
            flagged_texts("#sourceLocation(line: 1)\n"),
            vec!["#sourceLocation"]
        );
    }

    #[test]
    fn unterminated_string_is_flagged() {
        assert_eq!(flagged_texts("let s = \"abc\n"), vec!["\"abc"]);
    }
}
