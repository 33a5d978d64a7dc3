//! Toolkit environment detection.
//!
//! Modules can only be run from inside an initialized GRASS session, which is
//! signalled by `GISBASE` pointing at the installation root.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Environment variable marking an initialized toolkit session.
pub const GISBASE_VAR: &str = "GISBASE";

/// The toolkit installation the modules are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    gisbase: PathBuf,
}

impl Environment {
    /// Creates an environment rooted at `gisbase`.
    pub fn new(gisbase: impl Into<PathBuf>) -> Self {
        Self {
            gisbase: gisbase.into(),
        }
    }

    /// Reads `GISBASE` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvironment`] if the variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_value(std::env::var_os(GISBASE_VAR))
    }

    fn from_value(value: Option<std::ffi::OsString>) -> Result<Self> {
        match value {
            Some(v) if !v.is_empty() => Ok(Self::new(v)),
            _ => Err(ConfigError::MissingEnvironment {
                variable: GISBASE_VAR.to_string(),
            }
            .into()),
        }
    }

    /// Installation root.
    #[must_use]
    pub fn gisbase(&self) -> &Path {
        &self.gisbase
    }

    /// Resolves a module name to the program that should be executed.
    ///
    /// Compiled modules live in `bin/`, script modules in `scripts/`. Anything
    /// not found there is left to `PATH` lookup.
    #[must_use]
    pub fn resolve_program(&self, module: &str) -> PathBuf {
        ["bin", "scripts"]
            .iter()
            .map(|dir| self.gisbase.join(dir).join(module))
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| PathBuf::from(module))
    }
}
