use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};
use crate::normalize::normalize;

/// Represents a single cell value read from, or written to, a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Cell {
    /// Plain string literal. An empty string is still a value.
    String(String),
    /// Numeric literal. Spreadsheet integers and dates are stored as numbers.
    Number(f64),
    /// Boolean literal.
    Bool(bool),
    /// Null marker: the source had no data for this cell.
    Null,
}

impl Cell {
    /// Returns `true` for the null marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::String(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::String(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::String(value) => f.write_str(value),
            Cell::Number(value) => write!(f, "{value}"),
            Cell::Bool(value) => write!(f, "{value}"),
            Cell::Null => Ok(()),
        }
    }
}

/// An in-memory table: ordered, uniquely named columns of equal length.
///
/// Values are stored column-major so projections can copy whole columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    values: Vec<Vec<Cell>>,
}

impl Table {
    /// Builds a table from column labels and their values.
    pub fn new(columns: Vec<String>, values: Vec<Vec<Cell>>) -> Result<Self> {
        ensure_unique(&columns)?;
        if columns.len() != values.len() {
            return Err(ToolError::RaggedColumn {
                column: format!("#{}", columns.len().min(values.len())),
                expected: columns.len(),
                actual: values.len(),
            });
        }
        let expected = values.first().map(Vec::len).unwrap_or(0);
        for (column, cells) in columns.iter().zip(&values) {
            if cells.len() != expected {
                return Err(ToolError::RaggedColumn {
                    column: column.clone(),
                    expected,
                    actual: cells.len(),
                });
            }
        }
        Ok(Self { columns, values })
    }

    /// Builds a table from a header and row-major data.
    ///
    /// Rows shorter than the header are padded with [`Cell::Null`]; longer rows
    /// are rejected.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let width = columns.len();
        let mut values: Vec<Vec<Cell>> = (0..width).map(|_| Vec::with_capacity(rows.len())).collect();
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(ToolError::RaggedColumn {
                    column: format!("row {}", row_idx + 1),
                    expected: width,
                    actual: row.len(),
                });
            }
            let mut cells = row.into_iter();
            for column in values.iter_mut() {
                column.push(cells.next().unwrap_or(Cell::Null));
            }
        }
        Self::new(columns, values)
    }

    /// Creates a table with the given columns and no rows.
    pub fn empty(columns: Vec<String>) -> Result<Self> {
        let values = columns.iter().map(|_| Vec::new()).collect();
        Self::new(columns, values)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.values.first().map(Vec::len).unwrap_or(0)
    }

    /// Returns the values of the column with exactly this label.
    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns
            .iter()
            .position(|column| column == name)
            .map(|idx| self.values[idx].as_slice())
    }

    /// Iterates over rows, yielding the cells of each row in column order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Cell>> + '_ {
        (0..self.row_count()).map(move |row| self.values.iter().map(|column| &column[row]).collect())
    }

    /// Appends a new column. Its length must match the current row count.
    pub fn push_column(&mut self, name: impl Into<String>, cells: Vec<Cell>) -> Result<()> {
        let name = name.into();
        let key = normalize(&name);
        if self.columns.iter().any(|column| normalize(column) == key) {
            return Err(ToolError::DuplicateColumn(name));
        }
        if !self.columns.is_empty() && cells.len() != self.row_count() {
            return Err(ToolError::RaggedColumn {
                column: name,
                expected: self.row_count(),
                actual: cells.len(),
            });
        }
        self.columns.push(name);
        self.values.push(cells);
        Ok(())
    }

    /// Appends every row of `other`, which must have exactly the same columns.
    pub fn append(&mut self, other: Table) -> Result<()> {
        if self.columns != other.columns {
            return Err(ToolError::InvalidWorkbook(format!(
                "cannot append table with columns {:?} to table with columns {:?}",
                other.columns, self.columns
            )));
        }
        for (target, source) in self.values.iter_mut().zip(other.values) {
            target.extend(source);
        }
        Ok(())
    }
}

fn ensure_unique(columns: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(normalize(column)) {
            return Err(ToolError::DuplicateColumn(column.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|label| label.to_string()).collect()
    }

    #[test]
    fn from_rows_pads_short_rows_with_null() {
        let table = Table::from_rows(
            names(&["Name", "Amt"]),
            vec![vec!["X".into(), 10.0.into()], vec!["Y".into()]],
        )
        .expect("table built");

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("Amt"), Some(&[Cell::Number(10.0), Cell::Null][..]));
    }

    #[test]
    fn rejects_duplicate_normalized_columns() {
        let error = Table::empty(names(&["Name", " name "])).unwrap_err();
        assert!(matches!(error, ToolError::DuplicateColumn(column) if column == " name "));
    }

    #[test]
    fn rejects_columns_of_different_lengths() {
        let error = Table::new(
            names(&["A", "B"]),
            vec![vec![Cell::Null], vec![Cell::Null, Cell::Null]],
        )
        .unwrap_err();
        assert!(matches!(error, ToolError::RaggedColumn { expected: 1, actual: 2, .. }));
    }

    #[test]
    fn append_keeps_row_order() {
        let mut first = Table::from_rows(names(&["A"]), vec![vec!["1".into()]]).unwrap();
        let second = Table::from_rows(names(&["A"]), vec![vec!["2".into()], vec!["3".into()]]).unwrap();
        first.append(second).expect("appended");

        let rows: Vec<String> = first.rows().map(|row| row[0].to_string()).collect();
        assert_eq!(rows, vec!["1", "2", "3"]);
    }

    #[test]
    fn null_and_empty_string_are_distinct() {
        assert_ne!(Cell::Null, Cell::String(String::new()));
        assert!(Cell::Null.is_null());
        assert!(!Cell::from("").is_null());
    }
}
