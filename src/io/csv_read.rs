use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::io::build_table;
use crate::model::{Cell, Table};

/// Reads a comma separated file with a header row.
///
/// Fields are kept as text; empty fields become [`Cell::Null`].
pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if header.iter().all(|label| label.trim().is_empty()) {
        return Err(ToolError::InvalidWorkbook("CSV file has no header".into()));
    }

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Null
                    } else {
                        Cell::String(field.to_string())
                    }
                })
                .collect(),
        );
    }

    let table = build_table(header, rows)?;
    debug!(
        path = %path.display(),
        columns = ?table.columns(),
        rows = table.row_count(),
        "read CSV file"
    );
    Ok(table)
}

/// Reads the header record as written, without making the labels unique.
pub fn read_header(path: &Path) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    Ok(reader.headers()?.iter().map(str::to_string).collect())
}
