//! Display utilities for formatting CLI output.

use tabled::{Table, Tabled};

use rastlabel_core::pipeline::RunSummary;

/// Table row representation for one column of the sampled map.
#[derive(Tabled)]
pub struct ColumnRow {
    /// Column name.
    #[tabled(rename = "Column")]
    pub name: String,
    /// SQL type of the column.
    #[tabled(rename = "Type")]
    pub column_type: String,
    /// Whether the column was joined onto the input map.
    #[tabled(rename = "Joined")]
    pub joined: String,
}

/// Builds one row per output column.
#[must_use]
pub fn column_rows(summary: &RunSummary) -> Vec<ColumnRow> {
    summary
        .columns
        .iter()
        .map(|c| ColumnRow {
            name: c.name.clone(),
            column_type: c.column_type.to_string(),
            joined: if summary.joined.contains(&c.name) {
                "yes".to_string()
            } else {
                "no".to_string()
            },
        })
        .collect()
}

/// Formats a run summary as a header line plus a column table.
#[must_use]
pub fn format_summary(summary: &RunSummary) -> String {
    let status = if summary.temporary {
        " (temporary, removed)"
    } else {
        ""
    };
    format!(
        "\nSampled {} point(s) into {}{status}\n\n{}",
        summary.points,
        summary.output,
        Table::new(column_rows(summary))
    )
}
