//! AST builder: maps each template token to one node.
//!
//! No error conditions; anything malformed was already turned into literal
//! text by the tokenizer.

use std::borrow::Cow;

use super::ast::Node;
use super::token::{Token, TokenKind};

/// Build the node sequence for a token stream.
pub fn build<'a>(tokens: impl IntoIterator<Item = Token<'a>>) -> Vec<Node<'a>> {
    tokens.into_iter().map(node).collect()
}

/// Map one token to its node.
pub fn node(token: Token<'_>) -> Node<'_> {
    let text = token.text;
    match token.kind {
        TokenKind::Literal => Node::Literal {
            text,
            offset: token.offset,
        },
        TokenKind::Symbol => Node::Literal {
            text: &text[..1],
            offset: token.offset,
        },
        TokenKind::SubstitutionOpen => Node::Substitution {
            expression: &text[2..text.len() - 1],
            offset: token.offset + 2,
        },
        TokenKind::CodeBlock => {
            let body = strip_newline(text);
            Node::Code {
                text: Cow::Borrowed(&body[2..body.len() - 2]),
                offset: token.offset + 2,
            }
        }
        TokenKind::CodeLines => Node::Code {
            text: code_lines(strip_newline(text)),
            offset: token.offset,
        },
    }
}

/// Drop one trailing `\n` or `\r\n`.
fn strip_newline(text: &str) -> &str {
    text.strip_suffix('\n')
        .map(|t| t.strip_suffix('\r').unwrap_or(t))
        .unwrap_or(text)
}

/// Strip each line's indentation, `%`, and the whitespace run after it.
/// Line count is preserved so offsets stay aligned.
fn code_lines(text: &str) -> Cow<'_, str> {
    if !text.contains('\n') {
        return Cow::Borrowed(code_line(text));
    }
    let lines: Vec<&str> = text.split('\n').map(code_line).collect();
    Cow::Owned(lines.join("\n"))
}

fn code_line(line: &str) -> &str {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let line = line.trim_start_matches([' ', '\t']);
    let line = line.strip_prefix('%').unwrap_or(line);
    line.trim_start_matches([' ', '\t'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swift::Swift;
    use crate::template::lexer::Lexer;

    fn parse(src: &str) -> Vec<Node<'_>> {
        build(Lexer::new(src, &Swift))
    }

    #[test]
    fn symbol_collapses_to_one_character() {
        assert_eq!(
            parse("$$%%"),
            vec![
                Node::Literal { text: "$", offset: 0 },
                Node::Literal { text: "%", offset: 2 },
            ]
        );
    }

    #[test]
    fn substitution_strips_wrapper() {
        assert_eq!(
            parse("a${ x + 1 }"),
            vec![
                Node::Literal { text: "a", offset: 0 },
                Node::Substitution {
                    expression: " x + 1 ",
                    offset: 3,
                },
            ]
        );
    }

    #[test]
    fn code_block_strips_wrapper_and_newline() {
        assert_eq!(
            parse("%{\nlet a = 1\n}%\n"),
            vec![Node::Code {
                text: Cow::Borrowed("\nlet a = 1\n"),
                offset: 2,
            }]
        );
    }

    #[test]
    fn code_line_strips_percent_and_whitespace() {
        assert_eq!(
            parse("  %\t for x in xs {\n"),
            vec![Node::Code {
                text: Cow::Borrowed("for x in xs {"),
                offset: 0,
            }]
        );
    }

    #[test]
    fn multi_line_code_keeps_line_count() {
        let text = code_lines("% a\n  % b\n%c");
        assert_eq!(text, "a\nb\nc");
    }

    #[test]
    fn crlf_code_line() {
        assert_eq!(
            parse("% let a = 1\r\n"),
            vec![Node::Code {
                text: Cow::Borrowed("let a = 1"),
                offset: 0,
            }]
        );
    }
}
