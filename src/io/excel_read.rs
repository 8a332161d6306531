use std::path::Path;

use calamine::{DataType, Range, Reader, open_workbook_auto};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::io::build_table;
use crate::model::{Cell, Table};

/// Reads one worksheet of an xlsx, xlsm, xls or ods workbook.
///
/// The first row of the used range is the header. `sheet` selects a worksheet
/// by name; the first worksheet is used otherwise.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let range = open_range(path, sheet)?;
    let table = range_to_table(&range)?;
    debug!(
        path = %path.display(),
        columns = ?table.columns(),
        rows = table.row_count(),
        "read worksheet"
    );
    Ok(table)
}

/// Reads the first row of a worksheet as written, without making the labels
/// unique.
pub fn read_header(path: &Path, sheet: Option<&str>) -> Result<Vec<String>> {
    let range = open_range(path, sheet)?;
    range
        .rows()
        .next()
        .map(|first_row| first_row.iter().map(header_label).collect())
        .ok_or_else(|| ToolError::InvalidWorkbook("worksheet is empty".into()))
}

fn open_range(path: &Path, sheet: Option<&str>) -> Result<Range<DataType>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match sheet {
        Some(name) => workbook
            .worksheet_range(name)
            .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ToolError::InvalidWorkbook("workbook has no worksheets".into()))?,
    }?;
    Ok(range)
}

fn range_to_table(range: &Range<DataType>) -> Result<Table> {
    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(first_row) => first_row.iter().map(header_label).collect(),
        None => Vec::new(),
    };
    if header.is_empty() {
        return Err(ToolError::InvalidWorkbook("worksheet is empty".into()));
    }

    let data = rows
        .map(|row| row.iter().map(cell_value).collect::<Vec<Cell>>())
        .collect();
    build_table(header, data)
}

fn header_label(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &DataType) -> Cell {
    match cell {
        DataType::String(value) => Cell::String(value.clone()),
        DataType::Float(value) => Cell::Number(*value),
        DataType::Int(value) => Cell::Number(*value as f64),
        DataType::Bool(value) => Cell::Bool(*value),
        DataType::DateTime(value) => Cell::Number(*value),
        DataType::Empty => Cell::Null,
        other => Cell::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_cells_to_values() {
        assert_eq!(cell_value(&DataType::String("x".into())), Cell::from("x"));
        assert_eq!(cell_value(&DataType::Int(3)), Cell::Number(3.0));
        assert_eq!(cell_value(&DataType::Float(2.5)), Cell::Number(2.5));
        assert_eq!(cell_value(&DataType::Bool(true)), Cell::Bool(true));
        assert_eq!(cell_value(&DataType::Empty), Cell::Null);
        assert_eq!(cell_value(&DataType::String(String::new())), Cell::String(String::new()));
    }

    #[test]
    fn numeric_headers_become_labels() {
        assert_eq!(header_label(&DataType::Float(2025.0)), "2025");
        assert_eq!(header_label(&DataType::Empty), "");
    }

    #[test]
    fn range_header_and_rows_become_a_table() {
        let mut range = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), DataType::String("Name".into()));
        range.set_value((0, 1), DataType::String("Amt".into()));
        range.set_value((1, 0), DataType::String("X".into()));
        range.set_value((1, 1), DataType::Float(10.0));
        range.set_value((2, 0), DataType::String("Y".into()));

        let table = range_to_table(&range).expect("table built");

        assert_eq!(table.columns(), &["Name".to_string(), "Amt".to_string()][..]);
        assert_eq!(table.column("Amt"), Some(&[Cell::Number(10.0), Cell::Null][..]));
    }

    #[test]
    fn empty_range_is_invalid() {
        let range: Range<DataType> = Range::empty();
        assert!(matches!(range_to_table(&range), Err(ToolError::InvalidWorkbook(_))));
    }
}
