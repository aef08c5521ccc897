//! Configuration — toolchain commands and output defaults loaded from
//! ~/.stitch/config.yaml.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::run::Toolchain;

/// Settings loaded from YAML. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interpreter command.
    pub swift: String,
    /// Compiler command.
    pub swiftc: String,
    /// Extra arguments passed to the compiler.
    pub compiler_flags: Vec<String>,
    /// Output-visible line marker format, e.g. `// ###sourceLocation(file: "{file}", line: {line})`.
    pub line_directive: Option<String>,
    /// Always compile instead of interpreting.
    pub force_compile: bool,
}

impl Default for Config {
    fn default() -> Self {
        let toolchain = Toolchain::default();
        Self {
            swift: toolchain.swift,
            swiftc: toolchain.swiftc,
            compiler_flags: toolchain.compiler_flags,
            line_directive: None,
            force_compile: toolchain.force_compile,
        }
    }
}

/// Default path for the config file.
pub fn default_config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".stitch");
    path.push("config.yaml");
    path
}

impl Config {
    /// Load from the default path. A missing file gives the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn toolchain(&self) -> Toolchain {
        Toolchain {
            swift: self.swift.clone(),
            swiftc: self.swiftc.clone(),
            compiler_flags: self.compiler_flags.clone(),
            force_compile: self.force_compile,
        }
    }
}
