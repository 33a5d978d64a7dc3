//! Attribute schema of the sampled point layer.
//!
//! The import step needs a column declaration string. It is built from the
//! storage type of every labeled raster: integer maps get an `integer` id
//! column, floating point maps a `double precision` one, and each map also
//! gets a text column holding its category label.

use std::collections::HashSet;
use std::fmt;

use crate::error::{ConfigError, Result, ToolkitError};
use crate::names::{RasterName, validate_identifier};
use crate::toolkit::{Invocation, Toolkit, parse_key_values};

/// Width of the label text columns.
pub const LABEL_WIDTH: u16 = 255;

/// Storage type of a raster map as reported by `r.info -g`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterDataType {
    /// Integer cells
    Cell,
    /// Single precision floating point cells
    FCell,
    /// Double precision floating point cells
    DCell,
}

impl RasterDataType {
    /// Parses the `datatype` value of `r.info -g`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CELL" => Some(Self::Cell),
            "FCELL" => Some(Self::FCell),
            "DCELL" => Some(Self::DCell),
            _ => None,
        }
    }

    /// Whether cell values are discrete.
    #[must_use]
    pub fn is_discrete(self) -> bool {
        matches!(self, Self::Cell)
    }

    /// Column type able to hold a cell value.
    #[must_use]
    pub fn value_column_type(self) -> ColumnType {
        if self.is_discrete() {
            ColumnType::Integer
        } else {
            ColumnType::DoublePrecision
        }
    }
}

/// SQL column types used by the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    DoublePrecision,
    Varchar(u16),
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::DoublePrecision => f.write_str("double precision"),
            Self::Varchar(width) => write!(f, "varchar({width})"),
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.column_type)
    }
}

/// Ordered column list of the sampled layer.
///
/// Always starts with `x`, `y` and `label`, followed by an id and a label
/// column per labeled raster in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSchema {
    columns: Vec<Column>,
}

impl OutputSchema {
    /// Names of the leading columns written by the sampler.
    pub const FIXED_COLUMNS: [&'static str; 3] = ["x", "y", "label"];

    /// Schema holding only the fixed leading columns.
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: vec![
                Column::new("x", ColumnType::DoublePrecision),
                Column::new("y", ColumnType::DoublePrecision),
                Column::new("label", ColumnType::Integer),
            ],
        }
    }

    /// Appends the id and label columns for one labeled raster.
    pub fn push_labeled(&mut self, raster: &RasterName, data_type: RasterDataType) {
        self.columns.push(Column::new(
            format!("ID_{}", raster.column),
            data_type.value_column_type(),
        ));
        self.columns
            .push(Column::new(&raster.column, ColumnType::Varchar(LABEL_WIDTH)));
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of fields expected in each sampled record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Default for OutputSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the `columns=` value for `v.in.ascii`.
impl fmt::Display for OutputSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{column}")?;
        }
        Ok(())
    }
}

/// Queries the storage type of `raster` with `r.info -g`.
///
/// # Errors
///
/// Fails if the module fails or reports no known `datatype`.
pub fn raster_data_type<T: Toolkit>(toolkit: &T, raster: &RasterName) -> Result<RasterDataType> {
    let info = toolkit.run(
        &Invocation::new("r.info")
            .flags("g")
            .param("map", &raster.qualified)
            .quiet(),
    )?;
    let value = parse_key_values(&info)
        .remove("datatype")
        .unwrap_or_default();
    RasterDataType::parse(&value).ok_or_else(|| {
        ToolkitError::UnexpectedOutput {
            module: "r.info".to_string(),
            message: format!("unknown datatype '{value}' for raster '{}'", raster.qualified),
        }
        .into()
    })
}

/// Builds the output schema for the labeled rasters.
///
/// Only reads raster metadata; nothing is written to the database.
///
/// # Errors
///
/// Fails if a data type query fails.
pub fn build_schema<T: Toolkit>(toolkit: &T, rasters: &[RasterName]) -> Result<OutputSchema> {
    let mut schema = OutputSchema::new();
    for raster in rasters {
        let data_type = raster_data_type(toolkit, raster)?;
        schema.push_labeled(raster, data_type);
    }
    Ok(schema)
}

/// Rejects raster sets whose derived columns are invalid or collide.
///
/// Column names are compared case-insensitively, together with the fixed
/// columns and the `cat` key the import adds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidOption`] or [`ConfigError::DuplicateColumn`].
pub fn check_columns(labeled: &[RasterName], unlabeled: &[RasterName]) -> Result<()> {
    let mut seen: HashSet<String> = OutputSchema::FIXED_COLUMNS
        .iter()
        .chain(std::iter::once(&"cat"))
        .map(|s| (*s).to_string())
        .collect();

    let labeled_names = labeled
        .iter()
        .flat_map(|r| [("raster", format!("id_{}", r.column)), ("raster", r.column.clone())]);
    let unlabeled_names = unlabeled.iter().map(|r| ("raster2", r.column.clone()));

    for (option, column) in labeled_names.chain(unlabeled_names) {
        validate_identifier(option, &column)?;
        if !seen.insert(column.to_lowercase()) {
            return Err(ConfigError::DuplicateColumn { column }.into());
        }
    }
    Ok(())
}
