//! Validated module options.

use crate::error::{ConfigError, Result};
use crate::names::{RasterName, parse_raster_list};

/// Name recorded in the command history of the output map.
pub const MODULE_NAME: &str = "v.what.rastlabel";

/// Options of one sampling run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Input point map.
    pub vector: String,
    /// Comma separated rasters sampled with labels.
    pub raster: String,
    /// Comma separated rasters sampled without labels.
    pub raster2: String,
    /// Output point map; a temporary map is used when absent.
    pub output: Option<String>,
    /// Join the sampled columns onto `vector`.
    pub add_columns: bool,
    /// Allow replacing existing maps and columns.
    pub overwrite: bool,
}

impl Options {
    /// Output name, treating an empty string as absent.
    #[must_use]
    pub fn output_name(&self) -> Option<&str> {
        self.output.as_deref().filter(|o| !o.is_empty())
    }

    #[must_use]
    pub fn labeled_rasters(&self) -> Vec<RasterName> {
        parse_raster_list(&self.raster)
    }

    #[must_use]
    pub fn unlabeled_rasters(&self) -> Vec<RasterName> {
        parse_raster_list(&self.raster2)
    }

    /// Checks required options and the output/`-o` rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] for the first missing option.
    pub fn validate(&self) -> Result<()> {
        let missing = |option: &str| -> Result<()> {
            Err(ConfigError::MissingRequired {
                option: option.to_string(),
            }
            .into())
        };
        if self.vector.trim().is_empty() {
            return missing("vector");
        }
        if self.labeled_rasters().is_empty() {
            return missing("raster");
        }
        if self.output_name().is_none() && !self.add_columns {
            return missing("output or -o");
        }
        Ok(())
    }

    /// Command history line: module name followed by every non-empty option.
    ///
    /// ```
    /// use rastlabel_core::options::Options;
    ///
    /// let options = Options {
    ///     vector: "sites".into(),
    ///     raster: "landuse".into(),
    ///     output: Some("result".into()),
    ///     ..Options::default()
    /// };
    /// assert_eq!(
    ///     options.history(),
    ///     "v.what.rastlabel vector='sites' raster='landuse' output='result'"
    /// );
    /// ```
    #[must_use]
    pub fn history(&self) -> String {
        let pairs = [
            ("vector", self.vector.as_str()),
            ("raster", self.raster.as_str()),
            ("raster2", self.raster2.as_str()),
            ("output", self.output_name().unwrap_or_default()),
        ];
        let mut hist = MODULE_NAME.to_string();
        for (key, value) in pairs.iter().filter(|(_, v)| !v.is_empty()) {
            let quote = if value.contains('\'') { '"' } else { '\'' };
            hist.push_str(&format!(" {key}={quote}{value}{quote}"));
        }
        hist
    }
}
