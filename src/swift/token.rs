//! Token types for the Swift lexer.
//!
//! Every token owns the trivia around it: whitespace, newlines and comments
//! before it (`leading`), and whitespace/comments after it up to the next
//! newline (`trailing`). Concatenating `leading + text + trailing` for all
//! tokens reproduces the lexed source exactly.

use std::ops::Range;

/// A token produced by the lexer. Ranges are byte offsets into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub leading: Range<usize>,
    pub text: Range<usize>,
    pub trailing: Range<usize>,
    /// Set when a string literal or a block comment in the leading trivia
    /// runs off the end of the input.
    pub unterminated: bool,
}

impl Token {
    /// The token's own text.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.text.clone()]
    }

    pub fn leading<'a>(&self, source: &'a str) -> &'a str {
        &source[self.leading.clone()]
    }

    pub fn trailing<'a>(&self, source: &'a str) -> &'a str {
        &source[self.trailing.clone()]
    }

    /// Whether a newline separates this token from the one before it.
    pub fn starts_line(&self, source: &str) -> bool {
        self.leading(source).contains('\n')
    }
}

/// The kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword(Keyword),
    /// `#sourceLocation`, `#if`, `#file`, ...
    PoundKeyword,
    Integer,
    Float,
    String,

    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Dot,
    At,
    Backslash,
    Arrow, // ->
    Equal, // =
    /// Any other run of operator characters.
    Operator,

    Unknown,
    Eof,
}

/// Delimiter classification used for brace matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Open,
    Close,
    Other,
}

impl TokenKind {
    pub fn delimiter(self) -> Delimiter {
        match self {
            TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => Delimiter::Open,
            TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => Delimiter::Close,
            _ => Delimiter::Other,
        }
    }

    /// The closer matching an opening delimiter.
    pub fn closer(self) -> Option<TokenKind> {
        match self {
            TokenKind::LBrace => Some(TokenKind::RBrace),
            TokenKind::LParen => Some(TokenKind::RParen),
            TokenKind::LBracket => Some(TokenKind::RBracket),
            _ => None,
        }
    }
}

/// Keywords the structural checker cares about. Every other reserved word
/// lexes as [`Keyword::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    Else,
    Guard,
    While,
    Repeat,
    For,
    In,
    Switch,
    Case,
    Default,
    Do,
    Catch,
    Where,
    Func,
    Init,
    Struct,
    Class,
    Enum,
    Extension,
    Protocol,
    Let,
    Var,
    As,
    Is,
    Try,
    Await,
    Import,
    Typealias,
    Other,
}

impl Keyword {
    pub fn from_ident(s: &str) -> Option<Keyword> {
        let kw = match s {
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "guard" => Keyword::Guard,
            "while" => Keyword::While,
            "repeat" => Keyword::Repeat,
            "for" => Keyword::For,
            "in" => Keyword::In,
            "switch" => Keyword::Switch,
            "case" => Keyword::Case,
            "default" => Keyword::Default,
            "do" => Keyword::Do,
            "catch" => Keyword::Catch,
            "where" => Keyword::Where,
            "func" => Keyword::Func,
            "init" => Keyword::Init,
            "struct" => Keyword::Struct,
            "class" => Keyword::Class,
            "enum" => Keyword::Enum,
            "extension" => Keyword::Extension,
            "protocol" => Keyword::Protocol,
            "let" => Keyword::Let,
            "var" => Keyword::Var,
            "as" => Keyword::As,
            "is" => Keyword::Is,
            "try" => Keyword::Try,
            "await" => Keyword::Await,
            "import" => Keyword::Import,
            "typealias" => Keyword::Typealias,
            "break" | "continue" | "return" | "throw" | "fallthrough" | "defer" | "deinit"
            | "subscript" | "operator" | "associatedtype" | "static" | "private" | "fileprivate"
            | "internal" | "public" | "open" | "inout" | "throws" | "rethrows" | "true"
            | "false" | "nil" | "self" | "Self" | "super" | "Any" => Keyword::Other,
            _ => return None,
        };
        Some(kw)
    }

    /// Keywords that open a statement header which is only complete once its
    /// `{` body begins.
    pub fn opens_header(self) -> bool {
        matches!(
            self,
            Keyword::If
                | Keyword::Guard
                | Keyword::While
                | Keyword::For
                | Keyword::Switch
                | Keyword::Func
                | Keyword::Init
                | Keyword::Struct
                | Keyword::Class
                | Keyword::Enum
                | Keyword::Extension
                | Keyword::Protocol
                | Keyword::Repeat
                | Keyword::Do
                | Keyword::Catch
        )
    }
}
