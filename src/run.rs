//! Execution orchestrator — hands a generated program to the Swift toolchain
//! and collects what it prints.
//!
//! Every run gets its own scratch directory holding `main.swift` (and the
//! executable, on the compile path). The directory is removed when the run
//! returns, whether it succeeded or not.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;
use tracing::debug;

use crate::error::RunError;

const SOURCE_NAME: &str = "main.swift";

#[cfg(windows)]
const EXECUTABLE_NAME: &str = "main.exe";
#[cfg(not(windows))]
const EXECUTABLE_NAME: &str = "main";

/// Interpret, or compile and run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Interpret,
    Compile,
}

/// The Swift commands used to run programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub swift: String,
    pub swiftc: String,
    pub compiler_flags: Vec<String>,
    /// Always take the compile path.
    pub force_compile: bool,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            swift: "swift".to_string(),
            swiftc: "swiftc".to_string(),
            compiler_flags: Vec::new(),
            force_compile: false,
        }
    }
}

impl Toolchain {
    /// Which path a run takes. There is no interpreter on Windows.
    pub fn mode(&self) -> Mode {
        if self.force_compile || cfg!(windows) {
            Mode::Compile
        } else {
            Mode::Interpret
        }
    }

    /// Run `program` and return its standard output, with `\r\n` folded to
    /// `\n`. `template` names the source in errors.
    pub fn run(&self, program: &str, template: &str) -> Result<String, RunError> {
        let io_error = |source| RunError::Io {
            template: template.to_string(),
            source,
        };

        let dir = TempDir::new().map_err(io_error)?;
        let source = dir.path().join(SOURCE_NAME);
        fs::write(&source, program).map_err(io_error)?;

        let mode = self.mode();
        debug!(?mode, dir = %dir.path().display(), "running generated program");

        let stdout = match mode {
            Mode::Interpret => self.interpret(&source, template)?,
            Mode::Compile => self.compile_and_run(dir.path(), &source, template)?,
        };
        Ok(normalize_newlines(&stdout))
    }

    fn interpret(&self, source: &Path, template: &str) -> Result<String, RunError> {
        let mut command = Command::new(&self.swift);
        command.arg(source);
        let output = spawn(&mut command, &self.swift, template)?;
        let stderr = lossy(&output.stderr);
        if !output.status.success() {
            // The interpreter compiles first; compiler diagnostics mean the
            // program never started.
            if has_compiler_diagnostics(&stderr) {
                return Err(RunError::Compilation {
                    template: template.to_string(),
                    stderr,
                });
            }
            return Err(RunError::Execution {
                template: template.to_string(),
                stderr,
            });
        }
        Ok(lossy(&output.stdout))
    }

    fn compile_and_run(&self, dir: &Path, source: &Path, template: &str) -> Result<String, RunError> {
        let executable = dir.join(EXECUTABLE_NAME);

        let mut compile = Command::new(&self.swiftc);
        compile
            .args(&self.compiler_flags)
            .arg(source)
            .arg("-o")
            .arg(&executable);
        let output = spawn(&mut compile, &self.swiftc, template)?;
        if !output.status.success() {
            return Err(RunError::Compilation {
                template: template.to_string(),
                stderr: lossy(&output.stderr),
            });
        }

        let display = executable.display().to_string();
        let output = spawn(&mut Command::new(&executable), &display, template)?;
        if !output.status.success() {
            return Err(RunError::Execution {
                template: template.to_string(),
                stderr: lossy(&output.stderr),
            });
        }
        Ok(lossy(&output.stdout))
    }
}

fn spawn(command: &mut Command, name: &str, template: &str) -> Result<Output, RunError> {
    command.output().map_err(|source| RunError::Toolchain {
        template: template.to_string(),
        command: name.to_string(),
        source,
    })
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Whether stderr holds `file:line:col: error:` diagnostics.
fn has_compiler_diagnostics(stderr: &str) -> bool {
    stderr.lines().any(|line| {
        let Some((location, _)) = line.split_once(": error:") else {
            return false;
        };
        let mut parts = location.rsplitn(3, ':');
        let col = parts.next().unwrap_or("");
        let row = parts.next().unwrap_or("");
        let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        is_number(col) && is_number(row) && parts.next().is_some()
    })
}
