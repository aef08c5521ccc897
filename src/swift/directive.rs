//! `#sourceLocation` directives: rendering and recognition.
//!
//! A well-formed directive is always exactly ten tokens:
//! `#sourceLocation` `(` `file` `:` `"name"` `,` `line` `:` `N` `)`.
//! The argument-less reset form `#sourceLocation()` is three tokens.

use super::token::{Token, TokenKind};

pub const NAME: &str = "#sourceLocation";

/// Token count of a directive carrying a file and line.
pub const LEN: usize = 10;

/// Offset of the line-number token within a directive.
pub const LINE_TOKEN: usize = 8;

/// Render a directive mapping the following line to `file:line`.
pub fn render(file: &str, line: usize) -> String {
    format!("{NAME}(file: {}, line: {line})", string_literal(file))
}

/// Quote `value` as a single-line Swift string literal.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// If a directive starts at token `i`, return its token count.
pub fn match_at(source: &str, tokens: &[Token], i: usize) -> Option<usize> {
    let head = tokens.get(i)?;
    if head.kind != TokenKind::PoundKeyword || head.text(source) != NAME {
        return None;
    }

    let is = |k: usize, kind: TokenKind| tokens.get(i + k).is_some_and(|t| t.kind == kind);
    let named = |k: usize, name: &str| {
        tokens
            .get(i + k)
            .is_some_and(|t| t.kind == TokenKind::Identifier && t.text(source) == name)
    };

    if !is(1, TokenKind::LParen) {
        return None;
    }
    if is(2, TokenKind::RParen) {
        return Some(3);
    }

    let well_formed = named(2, "file")
        && is(3, TokenKind::Colon)
        && is(4, TokenKind::String)
        && !tokens[i + 4].unterminated
        && is(5, TokenKind::Comma)
        && named(6, "line")
        && is(7, TokenKind::Colon)
        && is(8, TokenKind::Integer)
        && is(9, TokenKind::RParen);
    well_formed.then_some(LEN)
}

/// The line number a well-formed directive at token `i` announces.
pub fn line_at(source: &str, tokens: &[Token], i: usize) -> Option<usize> {
    if match_at(source, tokens, i)? != LEN {
        return None;
    }
    tokens[i + LINE_TOKEN].text(source).replace('_', "").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swift::Lexer;

    #[test]
    fn render_quotes_file_name() {
        assert_eq!(
            render("dir/a \"b\".gyb", 12),
            r#"#sourceLocation(file: "dir/a \"b\".gyb", line: 12)"#
        );
    }

    #[test]
    fn rendered_directive_matches() {
        let src = render("t.swift.gyb", 7);
        let tokens = Lexer::new(&src).tokenize();
        assert_eq!(match_at(&src, &tokens, 0), Some(LEN));
        assert_eq!(line_at(&src, &tokens, 0), Some(7));
    }

    #[test]
    fn reset_form_matches() {
        let src = "#sourceLocation()";
        let tokens = Lexer::new(src).tokenize();
        assert_eq!(match_at(src, &tokens, 0), Some(3));
        assert_eq!(line_at(src, &tokens, 0), None);
    }

    #[test]
    fn malformed_directives_do_not_match() {
        for src in [
            "#sourceLocation",
            "#sourceLocation(file: \"a\")",
            "#sourceLocation(line: 1, file: \"a\")",
            "#sourceLocation(file: \"a, line: 1)",
            "#if(file: \"a\", line: 1)",
        ] {
            let tokens = Lexer::new(src).tokenize();
            assert_eq!(match_at(src, &tokens, 0), None, "{src}");
        }
    }
}
