//! Adapters between files on disk and in-memory [`Table`]s.

pub mod csv_read;
pub mod csv_write;
pub mod discover;
pub mod excel_read;
pub mod excel_write;

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, ToolError};
use crate::model::{Cell, Table};
use crate::normalize::normalize;
use crate::schema::TemplateSchema;

/// File layouts the tool can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    /// Picks the format from the file extension; anything but `.csv` is xlsx.
    pub fn from_path(path: &Path) -> Self {
        if has_extension(path, "csv") {
            OutputFormat::Csv
        } else {
            OutputFormat::Xlsx
        }
    }
}

/// Settings for [`write_table`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Text written for null cells in CSV output. Xlsx output leaves them blank.
    pub null_value: String,
}

/// Reads a table from a spreadsheet or CSV file.
///
/// The first row is the header. `sheet` selects a worksheet by name; the first
/// worksheet is used otherwise. It is ignored for CSV files.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
    if has_extension(path, "csv") {
        csv_read::read_table(path)
    } else {
        excel_read::read_table(path, sheet)
    }
}

/// Reads the header row of a template file as the output schema.
///
/// Labels are trimmed and blank cells are dropped. Repeated labels are kept
/// as written so schema validation can reject them.
pub fn read_template(path: &Path, sheet: Option<&str>) -> Result<TemplateSchema> {
    let raw = if has_extension(path, "csv") {
        csv_read::read_header(path)?
    } else {
        excel_read::read_header(path, sheet)?
    };
    let raw_count = raw.len();
    let columns = template_columns(raw);
    if columns.is_empty() {
        return Err(ToolError::InvalidWorkbook(format!(
            "template {} has no column names",
            path.display()
        )));
    }
    if columns.len() < raw_count {
        debug!(
            path = %path.display(),
            skipped = raw_count - columns.len(),
            "ignoring blank template headers"
        );
    }
    Ok(TemplateSchema::new(columns))
}

fn template_columns(raw: Vec<String>) -> Vec<String> {
    raw.iter()
        .map(|label| label.trim())
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// Writes `table` to `path`, choosing the format from the extension.
pub fn write_table(table: &Table, path: &Path, options: &WriteOptions) -> Result<()> {
    match OutputFormat::from_path(path) {
        OutputFormat::Csv => csv_write::write_table(path, table, options),
        OutputFormat::Xlsx => excel_write::write_table(path, table),
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Turns a raw header row into unique column labels.
///
/// Labels are trimmed, blank labels become `Unnamed: <index>` and labels that
/// collide with an earlier one after normalization get a `.1`, `.2`, ...
/// suffix.
pub(crate) fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(raw.len());
    raw.into_iter()
        .enumerate()
        .map(|(idx, label)| {
            let label = label.trim();
            let base = if label.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                label.to_string()
            };
            let mut candidate = base.clone();
            let mut counter = 1;
            while !seen.insert(normalize(&candidate)) {
                candidate = format!("{base}.{counter}");
                counter += 1;
            }
            candidate
        })
        .collect()
}

/// Builds a table from a raw header and data rows, dropping rows that hold
/// nothing but nulls.
pub(crate) fn build_table(header: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Table> {
    let rows = rows
        .into_iter()
        .filter(|row| !row.iter().all(Cell::is_null))
        .collect();
    Table::from_rows(unique_headers(header), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn headers_are_trimmed_named_and_deduplicated() {
        let headers = unique_headers(labels(&[" Name ", "", "name", "NAME", "Amt"]));
        assert_eq!(headers, labels(&["Name", "Unnamed: 1", "name.1", "NAME.2", "Amt"]));
    }

    #[test]
    fn template_headers_keep_repeats_and_drop_blanks() {
        let columns = template_columns(labels(&[" Name ", "", "Name", "  ", "Amt"]));
        assert_eq!(columns, labels(&["Name", "Name", "Amt"]));
    }

    #[test]
    fn blank_rows_are_dropped() {
        let table = build_table(
            labels(&["A", "B"]),
            vec![
                vec![Cell::Null, Cell::Null],
                vec![Cell::from(""), Cell::Null],
                vec![Cell::Null],
            ],
        )
        .unwrap();

        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn output_format_follows_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("out/combined.CSV")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("combined.xlsx")), OutputFormat::Xlsx);
        assert_eq!(OutputFormat::from_path(Path::new("combined")), OutputFormat::Xlsx);
    }
}
