//! Error types for running generated programs and loading configuration.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A hard failure while turning a generated program into output.
#[derive(Debug, Error)]
pub enum RunError {
    /// The Swift compiler rejected the program.
    #[error("{template}: compilation failed\n{stderr}")]
    Compilation { template: String, stderr: String },

    /// The program compiled but exited with a failure status.
    #[error("{template}: execution failed\n{stderr}")]
    Execution { template: String, stderr: String },

    /// A toolchain binary could not be started.
    #[error("{template}: cannot run `{command}`: {source}")]
    Toolchain {
        template: String,
        command: String,
        #[source]
        source: io::Error,
    },

    /// Scratch files could not be written or read.
    #[error("{template}: {source}")]
    Io {
        template: String,
        #[source]
        source: io::Error,
    },
}

/// Classification printed ahead of a [`RunError`] message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CompilationError,
    ExecutionError,
    ToolchainError,
    IoError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::CompilationError => "CompilationError",
            ErrorKind::ExecutionError => "ExecutionError",
            ErrorKind::ToolchainError => "ToolchainError",
            ErrorKind::IoError => "IoError",
        };
        f.write_str(name)
    }
}

impl RunError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunError::Compilation { .. } => ErrorKind::CompilationError,
            RunError::Execution { .. } => ErrorKind::ExecutionError,
            RunError::Toolchain { .. } => ErrorKind::ToolchainError,
            RunError::Io { .. } => ErrorKind::IoError,
        }
    }

    /// Name of the template the failing program came from.
    pub fn template(&self) -> &str {
        match self {
            RunError::Compilation { template, .. }
            | RunError::Execution { template, .. }
            | RunError::Toolchain { template, .. }
            | RunError::Io { template, .. } => template,
        }
    }
}

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_carries_template_and_stderr() {
        let err = RunError::Compilation {
            template: "a.swift.gyb".to_string(),
            stderr: "a.swift.gyb:3:1: error: expected expression".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("a.swift.gyb: compilation failed"));
        assert!(text.contains("a.swift.gyb:3:1: error"));
        assert_eq!(err.kind(), ErrorKind::CompilationError);
        assert_eq!(err.kind().to_string(), "CompilationError");
    }

    #[test]
    fn toolchain_error_keeps_source() {
        let err = RunError::Toolchain {
            template: "t".to_string(),
            command: "swift".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.kind(), ErrorKind::ToolchainError);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.template(), "t");
    }
}
