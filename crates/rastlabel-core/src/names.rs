//! Raster name normalization.
//!
//! Raster options arrive as comma separated lists of possibly
//! mapset-qualified names (`landuse@PERMANENT`). Toolkit calls need the
//! qualified name, attribute columns need a bare lowercase identifier.

use crate::error::{ConfigError, Result};

/// A raster map as passed to toolkit modules plus its column identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterName {
    /// Name as given, including any `@mapset` qualifier.
    pub qualified: String,
    /// Lowercased base name, used as the attribute column name.
    pub column: String,
}

impl RasterName {
    /// Derives the column identifier from a (possibly qualified) raster name.
    ///
    /// ```
    /// use rastlabel_core::names::RasterName;
    ///
    /// let name = RasterName::new("LandUse@PERMANENT");
    /// assert_eq!(name.qualified, "LandUse@PERMANENT");
    /// assert_eq!(name.column, "landuse");
    /// ```
    pub fn new(qualified: impl Into<String>) -> Self {
        let qualified = qualified.into();
        let column = qualified
            .split('@')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        Self { qualified, column }
    }
}

/// Splits a comma separated raster option.
///
/// Empty entries are dropped, so an unset option yields an empty list rather
/// than a single empty name.
#[must_use]
pub fn parse_raster_list(raw: &str) -> Vec<RasterName> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(RasterName::new)
        .collect()
}

/// Checks that `column` can be used unquoted as an SQL column name.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidOption`] naming `option` otherwise.
pub fn validate_identifier(option: &str, column: &str) -> Result<()> {
    let mut chars = column.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidOption {
            option: option.to_string(),
            message: format!("'{column}' is not a valid column name"),
        }
        .into())
    }
}
