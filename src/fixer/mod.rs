//! Directive fixer.
//!
//! The code generator puts a `#sourceLocation` in front of every batch
//! without knowing what the surrounding Swift looks like, so some land where
//! Swift does not accept them: between `}` and `else`, inside a statement
//! header, in the middle of a multi-line expression. The fixer moves each
//! such directive forward to the first position where it checks clean,
//! re-targeting its line number so the code after it still maps to the
//! right template line. A directive that fits nowhere is dropped.
//!
//! Output is a fixed point: running the fixer on its own output changes
//! nothing.

mod splice;

use tracing::{debug, trace, warn};

use crate::swift::{directive, DirectiveRef, Oracle, SourceFile};
use splice::Stream;

/// A directive the oracle flags, and where the error it causes starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Problem {
    /// 1-based program line of the directive.
    pub line: usize,
    /// 1-based program line of the first flagged token.
    pub error_line: usize,
}

pub struct Fixer<'o> {
    oracle: &'o dyn Oracle,
}

impl<'o> Fixer<'o> {
    pub fn new(oracle: &'o dyn Oracle) -> Self {
        Self { oracle }
    }

    /// Relocate or drop every problematic directive in `program`.
    pub fn fix(&self, program: &str) -> String {
        let mut text = program.to_string();
        let budget = self.budget(&text);

        for round in 0..budget {
            let Some(problem) = self.problems(&text).first().copied() else {
                debug!(rounds = round, "directives fixed");
                return text;
            };
            trace!(
                round,
                line = problem.line,
                error_line = problem.error_line,
                "relocating directive"
            );
            text = self.relocate(&text, problem.line);
        }

        self.drop_remaining(text)
    }

    /// Flagged directives, in ascending line order.
    pub fn problems(&self, program: &str) -> Vec<Problem> {
        let file = self.oracle.parse(program);
        file.directives()
            .into_iter()
            .filter_map(|d| {
                let diagnostic = file.blame(d)?;
                Some(Problem {
                    line: file.line_of(d.index),
                    error_line: file.line_of(diagnostic.tokens.start),
                })
            })
            .collect()
    }

    /// Each directive may need a move, and a move can disturb a neighbour.
    fn budget(&self, program: &str) -> usize {
        2 * self.oracle.parse(program).directives().len() + 4
    }

    fn relocate(&self, program: &str, line: usize) -> String {
        let file = self.oracle.parse(program);
        let Some(target) = find_directive(&file, line) else {
            return program.to_string();
        };
        let mut stream = Stream::new(&file);
        let unit = stream.detach(target.index, target.len);

        // Candidates are line starts from the vacated position on, plus the
        // end of file.
        let mut slot = target.index;
        while slot < stream.len() {
            if let Some(len) = stream.directive_at(slot) {
                slot += len;
                continue;
            }
            if !stream.starts_line(slot) {
                slot += 1;
                continue;
            }

            let mut trial = stream.clone();
            trial.insert(slot, &unit);
            let landed = trial.line_of(slot);
            if unit.len() == directive::LEN {
                trial.set_text(slot + directive::LINE_TOKEN, (landed + 1).to_string());
            }
            let candidate = trial.render();

            if !self.is_flagged_at(&candidate, landed) {
                debug!(from = line, to = landed, "moved #sourceLocation");
                return candidate;
            }
            slot += 1;
        }

        warn!(line, "no valid position for #sourceLocation, dropping it");
        stream.render()
    }

    fn is_flagged_at(&self, program: &str, line: usize) -> bool {
        self.problems(program).iter().any(|p| p.line == line)
    }

    /// Drop whatever is still flagged, one directive at a time.
    fn drop_remaining(&self, mut text: String) -> String {
        while let Some(problem) = self.problems(&text).first().copied() {
            warn!(
                line = problem.line,
                "fixer budget exhausted, dropping #sourceLocation"
            );
            match self.without_directive(&text, problem.line) {
                Some(next) => text = next,
                None => break,
            }
        }
        text
    }

    fn without_directive(&self, program: &str, line: usize) -> Option<String> {
        let file = self.oracle.parse(program);
        let target = find_directive(&file, line)?;
        let mut stream = Stream::new(&file);
        stream.detach(target.index, target.len);
        Some(stream.render())
    }
}

fn find_directive(file: &SourceFile<'_>, line: usize) -> Option<DirectiveRef> {
    file.directives()
        .into_iter()
        .find(|d| file.line_of(d.index) == line)
}
