//! Invocation of external toolkit modules.
//!
//! Every geospatial operation is delegated to a toolkit module run as a
//! blocking subprocess. [`Invocation`] describes one command line and
//! [`Toolkit`] is the seam that executes it, so the pipeline can be driven
//! against a real installation ([`GrassToolkit`]) or a test double.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use log::debug;

use crate::environment::Environment;
use crate::error::{Result, ToolkitError};

/// A single toolkit module command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    module: String,
    flags: String,
    params: Vec<(String, String)>,
    stdin: Option<String>,
    quiet: bool,
    overwrite: bool,
}

impl Invocation {
    /// Starts a command line for `module` (e.g. `"r.what"`).
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Self::default()
        }
    }

    /// Adds single-letter flags, e.g. `"f"` for `-f`.
    #[must_use]
    pub fn flags(mut self, flags: &str) -> Self {
        self.flags.push_str(flags);
        self
    }

    /// Appends a `key=value` parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Text written to the module's standard input.
    #[must_use]
    pub fn stdin(mut self, text: impl Into<String>) -> Self {
        self.stdin = Some(text.into());
        self
    }

    /// Adds `--quiet`.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Adds `--overwrite` when `enabled`.
    #[must_use]
    pub fn overwrite(mut self, enabled: bool) -> Self {
        self.overwrite = enabled;
        self
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn flag_set(&self) -> &str {
        &self.flags
    }

    /// Value of the first parameter named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn input(&self) -> Option<&str> {
        self.stdin.as_deref()
    }

    #[must_use]
    pub fn is_overwrite(&self) -> bool {
        self.overwrite
    }

    /// Argument vector in toolkit order: flags, parameters, long switches.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.params.len() + 3);
        if !self.flags.is_empty() {
            args.push(format!("-{}", self.flags));
        }
        args.extend(self.params.iter().map(|(k, v)| format!("{k}={v}")));
        if self.overwrite {
            args.push("--overwrite".to_string());
        }
        if self.quiet {
            args.push("--quiet".to_string());
        }
        args
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.module)?;
        for arg in self.args() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Executes toolkit module invocations.
pub trait Toolkit {
    /// Runs `invocation` to completion and returns its standard output.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolkitError`] if the module cannot be started or exits
    /// with a failure status.
    fn run(&self, invocation: &Invocation) -> Result<String>;
}

impl<T: Toolkit + ?Sized> Toolkit for &T {
    fn run(&self, invocation: &Invocation) -> Result<String> {
        (**self).run(invocation)
    }
}

/// Runs modules of a local installation as subprocesses.
#[derive(Debug, Clone)]
pub struct GrassToolkit {
    env: Environment,
}

impl GrassToolkit {
    #[must_use]
    pub fn new(env: Environment) -> Self {
        Self { env }
    }
}

impl Toolkit for GrassToolkit {
    fn run(&self, invocation: &Invocation) -> Result<String> {
        let module = invocation.module();
        debug!("Running: {invocation}");

        let mut child = Command::new(self.env.resolve_program(module))
            .args(invocation.args())
            .stdin(if invocation.input().is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolkitError::Spawn {
                module: module.to_string(),
                source,
            })?;

        // Feed stdin from a separate thread so a module that writes a lot
        // before draining its input cannot deadlock against us.
        let output = std::thread::scope(|scope| {
            let writer = child.stdin.take().map(|mut stdin| {
                let text = invocation.input().unwrap_or_default();
                scope.spawn(move || match stdin.write_all(text.as_bytes()) {
                    Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
                    other => other,
                })
            });
            let output = child.wait_with_output();
            let written = writer.map_or(Ok(()), |handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")))
            });
            output.and_then(|out| written.map(|()| out))
        })
        .map_err(|source| ToolkitError::Io {
            module: module.to_string(),
            source,
        })?;

        if !output.status.success() {
            return Err(ToolkitError::Failed {
                module: module.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        String::from_utf8(output.stdout).map_err(|e| {
            ToolkitError::UnexpectedOutput {
                module: module.to_string(),
                message: format!("output is not valid UTF-8: {e}"),
            }
            .into()
        })
    }
}

/// Parses shell-style `key=value` lines as printed by modules run with `-g`.
///
/// Lines without `=` are ignored; surrounding quotes on values are stripped.
#[must_use]
pub fn parse_key_values(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| {
            let v = v.trim();
            let v = v
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(v);
            (k.trim().to_string(), v.to_string())
        })
        .collect()
}
