use std::path::Path;

use rust_xlsxwriter::{Format, Formula, Table as ExcelTable, TableColumn, Workbook};

use crate::error::Result;
use crate::model::{Cell, Table};

/// Name of the worksheet holding the merged rows.
pub const OUTPUT_SHEET: &str = "Combined";

/// Excel drops empty string cells, so empty text is stored as a formula with
/// an empty cached text result.
const EMPTY_TEXT_FORMULA: &str = "=\"\"";

/// Writes the table as a single worksheet with a header row and an
/// autofilter table. Null cells are left blank; empty strings are kept as
/// empty text cells.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(OUTPUT_SHEET)?;
    worksheet.set_formula_result_default("");

    let header_format = Format::new().set_bold();
    for (col_idx, header) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, &header_format)?;
    }

    for (row_idx, row) in table.rows().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col_idx, cell) in row.into_iter().enumerate() {
            let col_num = col_idx as u16;
            match cell {
                Cell::String(value) if value.is_empty() => {
                    worksheet.write_formula(row_num, col_num, Formula::new(EMPTY_TEXT_FORMULA))?;
                }
                Cell::String(value) => {
                    worksheet.write_string(row_num, col_num, value)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row_num, col_num, *value)?;
                }
                Cell::Bool(value) => {
                    worksheet.write_boolean(row_num, col_num, *value)?;
                }
                Cell::Null => {}
            }
        }
    }

    if !table.columns().is_empty() {
        let columns: Vec<TableColumn> = table
            .columns()
            .iter()
            .map(|header| TableColumn::new().set_header(header))
            .collect();
        let mut excel_table = ExcelTable::new();
        excel_table.set_autofilter(true).set_columns(&columns);

        let col_end = (table.columns().len() as u16).saturating_sub(1);
        let row_end = table.row_count().max(1) as u32;
        worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    }

    workbook.save(path)?;
    Ok(())
}
