//! An owned, editable copy of a lexed program.
//!
//! Each token becomes a [`Piece`] holding its own leading and trailing
//! trivia, so directives can be cut out and spliced back in elsewhere and
//! the whole stream re-serialized.

use crate::swift::{DirectiveRef, SourceFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub leading: String,
    pub text: String,
    pub trailing: String,
    /// Set on the first piece of a directive: its token count.
    pub directive: Option<usize>,
}

impl Piece {
    fn newlines(&self) -> usize {
        count_newlines(&self.leading) + count_newlines(&self.text) + count_newlines(&self.trailing)
    }
}

/// A directive cut out of a [`Stream`], together with the trivia that
/// travels with it.
#[derive(Debug, Clone)]
pub struct Detached {
    pieces: Vec<Piece>,
}

impl Detached {
    pub fn len(&self) -> usize {
        self.pieces.len()
    }
}

#[derive(Debug, Clone)]
pub struct Stream {
    pieces: Vec<Piece>,
}

impl Stream {
    pub fn new(file: &SourceFile<'_>) -> Self {
        let mut pieces: Vec<Piece> = file
            .tokens
            .iter()
            .map(|t| Piece {
                leading: t.leading(file.source).to_string(),
                text: t.text(file.source).to_string(),
                trailing: t.trailing(file.source).to_string(),
                directive: None,
            })
            .collect();
        for DirectiveRef { index, len } in file.directives() {
            pieces[index].directive = Some(len);
        }
        Self { pieces }
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Token count of the directive starting at `index`, if one does.
    pub fn directive_at(&self, index: usize) -> Option<usize> {
        self.pieces.get(index).and_then(|p| p.directive)
    }

    /// 1-based line on which the text of piece `index` begins.
    pub fn line_of(&self, index: usize) -> usize {
        let before: usize = self.pieces[..index].iter().map(Piece::newlines).sum();
        1 + before + count_newlines(&self.pieces[index].leading)
    }

    /// Whether piece `index` begins a line. The end-of-file piece always
    /// counts as one.
    pub fn starts_line(&self, index: usize) -> bool {
        if index == 0 || index + 1 == self.pieces.len() {
            return true;
        }
        self.pieces[index].leading.contains('\n') || self.pieces[index - 1].trailing.ends_with('\n')
    }

    pub fn set_text(&mut self, index: usize, text: String) {
        self.pieces[index].text = text;
    }

    /// Cut `len` pieces out at `index`.
    ///
    /// Leading trivia up to its last newline stays behind, and so does
    /// trailing trivia from its first newline on. The directive keeps the
    /// line break that put it on its own line, so removing it neither leaves
    /// a blank line nor joins two lines. `index` must not cover the final
    /// end-of-file piece.
    pub fn detach(&mut self, index: usize, len: usize) -> Detached {
        let mut pieces: Vec<Piece> = self.pieces.drain(index..index + len).collect();

        if let Some(first) = pieces.first_mut() {
            let split = first.leading.rfind('\n').unwrap_or(first.leading.len());
            let kept = first.leading[..split].to_string();
            first.leading.replace_range(..split, "");
            if index > 0 {
                self.pieces[index - 1].trailing.push_str(&kept);
            } else if let Some(next) = self.pieces.get_mut(index) {
                next.leading.insert_str(0, &kept);
            }
        }

        if let Some(last) = pieces.last_mut() {
            let split = last.trailing.find('\n').unwrap_or(last.trailing.len());
            let kept = last.trailing.split_off(split);
            if let Some(next) = self.pieces.get_mut(index) {
                next.leading.insert_str(0, &kept);
            }
        }

        Detached { pieces }
    }

    /// Splice a detached directive in before piece `index`, starting a new
    /// line for it if its own trivia does not.
    pub fn insert(&mut self, index: usize, detached: &Detached) {
        let mut pieces = detached.pieces.clone();
        if index > 0 {
            if let Some(first) = pieces.first_mut() {
                if !first.leading.contains('\n') {
                    first.leading.insert(0, '\n');
                }
            }
        }
        self.pieces.splice(index..index, pieces);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            out.push_str(&piece.leading);
            out.push_str(&piece.text);
            out.push_str(&piece.trailing);
        }
        out
    }
}

fn count_newlines(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(src: &str) -> Stream {
        Stream::new(&SourceFile::parse(src))
    }

    #[test]
    fn render_is_lossless() {
        let src = "  // c\nlet a = 1 /* x */\n\n#sourceLocation(file: \"t\", line: 2)\nf()\n";
        assert_eq!(stream(src).render(), src);
    }

    #[test]
    fn directive_heads_are_marked() {
        let s = stream("a\n#sourceLocation(file: \"t\", line: 2)\nb\n");
        assert_eq!(s.directive_at(0), None);
        assert_eq!(s.directive_at(1), Some(10));
        assert_eq!(s.directive_at(2), None);
    }

    #[test]
    fn detach_takes_its_line_break() {
        let mut s = stream("a\n#sourceLocation(file: \"t\", line: 2)\nb\n");
        let unit = s.detach(1, 10);
        assert_eq!(unit.len(), 10);
        assert_eq!(s.render(), "a\nb\n");
    }

    #[test]
    fn detach_leaves_leading_comments_behind() {
        let mut s = stream("a\n// note\n  #sourceLocation(file: \"t\", line: 2) // tail\nb\n");
        s.detach(1, 10);
        assert_eq!(s.render(), "a\n// note\nb\n");
    }

    #[test]
    fn detach_first_piece() {
        let mut s = stream("#sourceLocation(file: \"t\", line: 1)\nb\n");
        s.detach(0, 10);
        assert_eq!(s.render(), "\nb\n");
    }

    #[test]
    fn insert_starts_a_new_line() {
        let mut s = stream("#sourceLocation(file: \"t\", line: 1)\na b\n");
        let unit = s.detach(0, 10);
        // Stream is now `\na b\n`; put the directive between `a` and `b`.
        s.insert(1, &unit);
        assert_eq!(s.render(), "\na \n#sourceLocation(file: \"t\", line: 1)b\n");
    }

    #[test]
    fn line_of_counts_all_trivia_and_text() {
        let s = stream("let s = \"\"\"\nx\n\"\"\"\n// c\nf()\n");
        // Tokens: let s = <string> f ( ) eof
        assert_eq!(s.line_of(0), 1);
        assert_eq!(s.line_of(4), 5);
    }

    #[test]
    fn only_line_heads_and_eof_start_lines() {
        let s = stream("a b\nc d");
        // Tokens: a b c d eof
        let heads: Vec<bool> = (0..s.len()).map(|i| s.starts_line(i)).collect();
        assert_eq!(heads, vec![true, false, true, false, true]);
    }

    #[test]
    fn set_text_replaces_one_token() {
        let mut s = stream("#sourceLocation(file: \"t\", line: 1)\n");
        s.set_text(8, "42".to_string());
        assert_eq!(s.render(), "#sourceLocation(file: \"t\", line: 42)\n");
    }
}
