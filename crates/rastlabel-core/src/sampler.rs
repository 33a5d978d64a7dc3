//! Point sampling of labeled rasters.
//!
//! The input points are exported as `x y cat` text and fed to `r.what`,
//! which echoes each coordinate and category and appends a value and a
//! category label per raster, pipe delimited. The category travels along as
//! `label` and later serves as the join key back to the input map.

use log::{debug, info};

use crate::error::Result;
use crate::names::RasterName;
use crate::toolkit::{Invocation, Toolkit};

/// Significant digits used when exporting point coordinates.
pub const COORDINATE_PRECISION: u8 = 12;

/// Token `r.what` prints for a cell without data.
pub const MISSING_VALUE: &str = "*";

/// Normalized `r.what` output ready for `v.in.ascii`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Samples {
    text: String,
    records: usize,
}

impl Samples {
    /// Wraps raw `r.what` output, blanking missing values.
    #[must_use]
    pub fn from_query_output(raw: &str) -> Self {
        let text = normalize_missing(raw);
        let records = text.lines().filter(|l| !l.trim().is_empty()).count();
        Self { text, records }
    }

    /// Pipe delimited records, one per line.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of sampled points.
    #[must_use]
    pub fn records(&self) -> usize {
        self.records
    }
}

/// Replaces every interior field that is exactly [`MISSING_VALUE`] with an
/// empty field.
///
/// This is the `|*|` to `||` rewrite applied field-wise, so runs of missing
/// values (`|*|*|`) are blanked as well and the result is stable under
/// repeated application. Leading and trailing fields are never touched, nor
/// is a `*` that is only part of a field.
#[must_use]
pub fn normalize_missing(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for line in raw.split_inclusive('\n') {
        let (body, newline) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        let fields: Vec<&str> = body.split('|').collect();
        let last = fields.len().saturating_sub(1);
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push('|');
            }
            if i == 0 || i == last || *field != MISSING_VALUE {
                out.push_str(field);
            }
        }
        out.push_str(newline);
    }
    out
}

/// Exports the points of `vector` as `x y cat` lines.
///
/// # Errors
///
/// Fails if `v.out.ascii` fails.
pub fn export_points<T: Toolkit>(toolkit: &T, vector: &str) -> Result<String> {
    info!("Exporting points of {vector}");
    toolkit.run(
        &Invocation::new("v.out.ascii")
            .param("input", vector)
            .param("format", "point")
            .param("separator", "space")
            .param("precision", COORDINATE_PRECISION.to_string())
            .quiet(),
    )
}

/// Queries all `rasters` at the exported `points`, including category labels.
///
/// # Errors
///
/// Fails if `r.what` fails.
pub fn query_rasters<T: Toolkit>(
    toolkit: &T,
    rasters: &[RasterName],
    points: &str,
) -> Result<Samples> {
    let maps = rasters
        .iter()
        .map(|r| r.qualified.as_str())
        .collect::<Vec<_>>()
        .join(",");
    info!("Sampling {maps}");
    let raw = toolkit.run(
        &Invocation::new("r.what")
            .flags("f")
            .param("map", maps)
            .stdin(points)
            .quiet(),
    )?;
    let samples = Samples::from_query_output(&raw);
    debug!("r.what returned {} record(s)", samples.records());
    Ok(samples)
}

/// Exports the points of `vector` and samples `rasters` at them.
///
/// # Errors
///
/// Fails if either module fails.
pub fn sample<T: Toolkit>(toolkit: &T, vector: &str, rasters: &[RasterName]) -> Result<Samples> {
    let points = export_points(toolkit, vector)?;
    query_rasters(toolkit, rasters, &points)
}
