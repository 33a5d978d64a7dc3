//! Joining sampled columns back onto the input map.
//!
//! The sampled layer keeps each input point's category in `label`, so its
//! attribute table can be joined to the input on `cat = label`. Only the
//! sampled columns are carried over; the key, coordinate and label columns
//! of the sampled table are left behind.

use log::{info, warn};

use crate::error::{ConfigError, Result};
use crate::toolkit::{Invocation, Toolkit};

/// Columns of the sampled table that are never joined.
pub const SKIPPED_COLUMNS: [&str; 4] = ["cat", "x", "y", "label"];

/// Column names of `table`, in table order.
///
/// # Errors
///
/// Fails if `db.columns` fails.
pub fn table_columns<T: Toolkit>(toolkit: &T, table: &str) -> Result<Vec<String>> {
    let out = toolkit.run(&Invocation::new("db.columns").param("table", table))?;
    Ok(out
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .collect())
}

/// Column names attached to layer 1 of `map`, as listed by `v.info -c`.
///
/// # Errors
///
/// Fails if `v.info` fails.
pub fn map_columns<T: Toolkit>(toolkit: &T, map: &str) -> Result<Vec<String>> {
    let out = toolkit.run(&Invocation::new("v.info").flags("c").param("map", map).quiet())?;
    Ok(out
        .lines()
        .filter_map(|l| l.split_once('|'))
        .map(|(_, name)| name.trim().to_string())
        .collect())
}

/// Columns of the sampled table that are joined onto the input.
#[must_use]
pub fn joinable_columns(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| !SKIPPED_COLUMNS.iter().any(|s| c.eq_ignore_ascii_case(s)))
        .cloned()
        .collect()
}

/// Joins the sampled columns of `output` onto `vector`.
///
/// An index on `label` is created first. Unless `overwrite` is set, the join
/// is refused when any sampled column already exists on `vector`.
/// Returns the joined column names.
///
/// # Errors
///
/// Returns [`ConfigError::ColumnConflict`] on a name clash, or the failing
/// module's error.
pub fn join_to_input<T: Toolkit>(
    toolkit: &T,
    vector: &str,
    output: &str,
    overwrite: bool,
) -> Result<Vec<String>> {
    let columns = joinable_columns(&table_columns(toolkit, output)?);
    if columns.is_empty() {
        warn!("No sampled columns to join onto {vector}");
        return Ok(columns);
    }

    let existing = map_columns(toolkit, vector)?;
    let clashes: Vec<String> = columns
        .iter()
        .filter(|c| existing.iter().any(|e| e.eq_ignore_ascii_case(c)))
        .cloned()
        .collect();
    if !clashes.is_empty() {
        if !overwrite {
            return Err(ConfigError::ColumnConflict {
                map: vector.to_string(),
                columns: clashes,
            }
            .into());
        }
        warn!("Overwriting columns of {vector}: {}", clashes.join(", "));
    }

    toolkit.run(
        &Invocation::new("db.execute")
            .param("sql", format!("CREATE INDEX {output}_label ON {output} (label);"))
            .quiet(),
    )?;

    info!("Joining {} column(s) onto {vector}", columns.len());
    toolkit.run(
        &Invocation::new("v.db.join")
            .param("map", vector)
            .param("column", "cat")
            .param("other_table", output)
            .param("other_column", "label")
            .param("subset_columns", columns.join(","))
            .quiet(),
    )?;
    Ok(columns)
}
