//! Custom error types for raster label sampling.
//!
//! Failures fall in two families: an external toolkit module could not be run
//! or reported failure, or the supplied options/environment are unusable.
//! Both are wrapped by [`RastLabelError`], which the binary turns into a
//! user-facing message plus an optional recovery hint.

use thiserror::Error;

/// Main error type for the sampling pipeline.
///
/// It uses `#[error(transparent)]` to delegate display formatting to the
/// underlying error variants.
#[derive(Debug, Error)]
pub enum RastLabelError {
    /// An external toolkit module failed
    #[error(transparent)]
    Toolkit(#[from] ToolkitError),

    /// Options or environment are invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The run was interrupted before it completed
    #[error("Interrupted")]
    Interrupted,
}

/// Errors raised while running an external toolkit module.
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// The module executable could not be started
    #[error("Failed to start module '{module}': {source}")]
    Spawn {
        /// Module name (e.g. `r.what`)
        module: String,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// The module exited with a failure status
    #[error(
        "Module '{module}' failed ({}): {stderr}",
        .status.map_or_else(|| "terminated by signal".to_string(), |c| format!("exit status {c}"))
    )]
    Failed {
        /// Module name
        module: String,
        /// Exit code, `None` when killed by a signal
        status: Option<i32>,
        /// Captured standard error, trimmed
        stderr: String,
    },

    /// Feeding stdin or collecting stdout failed
    #[error("I/O error while talking to module '{module}': {source}")]
    Io {
        /// Module name
        module: String,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// The module produced output that could not be interpreted
    #[error("Unexpected output from module '{module}': {message}")]
    UnexpectedOutput {
        /// Module name
        module: String,
        /// What was wrong with the output
        message: String,
    },
}

/// Configuration errors.
///
/// These errors occur when options or the process environment are invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty
    #[error("${variable} not defined")]
    MissingEnvironment {
        /// Variable name, without the leading `$`
        variable: String,
    },

    /// Required option is missing
    #[error("Missing required option: {option}")]
    MissingRequired {
        /// The missing option name
        option: String,
    },

    /// Invalid option value
    #[error("Invalid {option} option: {message}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why it's invalid
        message: String,
    },

    /// Two rasters map onto the same attribute column
    #[error("Column '{column}' would be created more than once")]
    DuplicateColumn {
        /// The colliding column name
        column: String,
    },

    /// Joined columns already exist on the input map
    #[error("Columns already present in vector map '{map}': {}", .columns.join(", "))]
    ColumnConflict {
        /// The input vector map
        map: String,
        /// Columns that would be overwritten
        columns: Vec<String>,
    },
}

/// Type alias for Results using `RastLabelError`.
pub type Result<T> = std::result::Result<T, RastLabelError>;

impl RastLabelError {
    /// Get a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Toolkit(e) => e.user_message(),
            Self::Config(e) => format!("Configuration error: {e}"),
            Self::Interrupted => "Interrupted by user.".to_string(),
        }
    }

    /// Get recovery suggestions if available.
    ///
    /// Returns helpful suggestions on how to fix or work around the error.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Toolkit(e) => e.recovery_suggestion(),
            Self::Config(e) => e.recovery_suggestion(),
            Self::Interrupted => None,
        }
    }
}

impl ToolkitError {
    /// Name of the module the error originated from.
    #[must_use]
    pub fn module(&self) -> &str {
        match self {
            Self::Spawn { module, .. }
            | Self::Failed { module, .. }
            | Self::Io { module, .. }
            | Self::UnexpectedOutput { module, .. } => module,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Failed { stderr, .. } if stderr.is_empty() => {
                format!("Module '{}' failed without a message.", self.module())
            },
            _ => self.to_string(),
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Spawn { .. } => Some(
                "Run this command from within a GRASS session so toolkit modules are on PATH."
                    .to_string(),
            ),
            Self::Failed { .. } => {
                Some("Check that the named maps exist in the current search path.".to_string())
            },
            Self::Io { .. } | Self::UnexpectedOutput { .. } => None,
        }
    }
}

impl ConfigError {
    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::MissingEnvironment { .. } => {
                Some("You must be in GRASS GIS to run this program.".to_string())
            },
            Self::MissingRequired { .. } => {
                Some("Pass --output, or -o to add the columns to the input map.".to_string())
            },
            Self::DuplicateColumn { .. } => {
                Some("Rename or copy one of the rasters so their names differ.".to_string())
            },
            Self::ColumnConflict { .. } => {
                Some("Use --overwrite to replace the existing column values.".to_string())
            },
            Self::InvalidOption { .. } => None,
        }
    }
}
