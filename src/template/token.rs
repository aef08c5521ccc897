//! Token types for the template tokenizer.

use serde::Serialize;

/// A token produced by the tokenizer. `text` borrows the template buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of `text` in the template.
    pub offset: usize,
}

/// The kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Text copied to the output verbatim.
    Literal,
    /// `${expr}`
    SubstitutionOpen,
    /// One `%`-line, including its newline.
    CodeLines,
    /// `%{ code }%`, plus one trailing newline if present.
    CodeBlock,
    /// `$$` or `%%`
    Symbol,
}
