//! AST for templates.
//!
//! A template is a flat sequence of nodes; control flow lives inside `Code`
//! text and is resolved by the Swift compiler, not here.

use std::borrow::Cow;

use serde::Serialize;

/// One template node. Text borrows the template buffer except for multi-line
/// `%`-code, which has to be re-joined without its `%` prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node<'a> {
    /// Output text.
    Literal { text: &'a str, offset: usize },
    /// Swift statements.
    Code { text: Cow<'a, str>, offset: usize },
    /// A Swift expression interpolated into the output.
    Substitution { expression: &'a str, offset: usize },
}

impl Node<'_> {
    /// Byte offset in the template, for line lookup.
    pub fn offset(&self) -> usize {
        match self {
            Node::Literal { offset, .. }
            | Node::Code { offset, .. }
            | Node::Substitution { offset, .. } => *offset,
        }
    }

    /// Literal and substitution nodes both produce output.
    pub fn is_output(&self) -> bool {
        !matches!(self, Node::Code { .. })
    }
}
