//! Stitch — Swift-embedded text templates.
//!
//! A template is plain text with `${expr}` substitutions, `%`-prefixed code
//! lines and `%{ ... }%` code blocks. It compiles to one Swift program whose
//! output is the rendered text; `#sourceLocation` directives keep compiler
//! errors pointing at template lines.

pub mod config;
pub mod error;
pub mod fixer;
pub mod line_index;
pub mod run;
pub mod swift;
pub mod template;

pub use config::Config;
pub use error::{ConfigError, ErrorKind, RunError};
pub use fixer::Fixer;
pub use run::Toolchain;
pub use template::{Binding, Node, Options, Processor};
