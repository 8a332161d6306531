use crate::error::{Result, ToolError};
use crate::model::{Cell, Table};
use crate::schema::{Resolution, ResolvedMapping};

/// Shapes `table` to the output schema described by `mapping`.
///
/// Columns appear in mapping order. Resolved columns are copied row-for-row;
/// absent columns are filled with [`Cell::Null`], one per input row.
pub fn project(table: &Table, mapping: &ResolvedMapping) -> Result<Table> {
    let row_count = table.row_count();
    let mut columns = Vec::with_capacity(mapping.len());
    let mut values = Vec::with_capacity(mapping.len());

    for (output, resolution) in mapping.entries() {
        let cells = match resolution {
            Resolution::Source(source) => table
                .column(source)
                .ok_or_else(|| {
                    ToolError::InvalidWorkbook(format!(
                        "resolved column '{source}' is missing from the source table"
                    ))
                })?
                .to_vec(),
            Resolution::Absent => vec![Cell::Null; row_count],
        };
        columns.push(output.clone());
        values.push(cells);
    }

    Table::new(columns, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{TargetSchema, TemplateSchema, resolve};

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    fn source() -> Table {
        Table::from_rows(
            labels(&["amount", "Name", "Ignored"]),
            vec![
                vec![10.0.into(), "X".into(), "a".into()],
                vec![20.0.into(), "".into(), "b".into()],
            ],
        )
        .expect("source table")
    }

    fn template(columns: &[&str]) -> TargetSchema {
        TargetSchema::Template(TemplateSchema::new(labels(columns)))
    }

    #[test]
    fn columns_follow_mapping_order() {
        let table = source();
        let mapping = resolve(&template(&["Name", "Amount"]), table.columns()).unwrap();
        let projected = project(&table, &mapping).expect("projected");

        assert_eq!(projected.columns(), &labels(&["Name", "Amount"])[..]);
        assert_eq!(
            projected.column("Name"),
            Some(&[Cell::from("X"), Cell::from("")][..])
        );
        assert_eq!(
            projected.column("Amount"),
            Some(&[Cell::Number(10.0), Cell::Number(20.0)][..])
        );
    }

    #[test]
    fn absent_columns_are_filled_with_null_per_row() {
        let table = source();
        let mapping = resolve(&template(&["Name", "Region"]), table.columns()).unwrap();
        let projected = project(&table, &mapping).expect("projected");

        assert_eq!(projected.row_count(), 2);
        assert_eq!(projected.column("Region"), Some(&[Cell::Null, Cell::Null][..]));
        assert_eq!(projected.column("Name").unwrap()[1], Cell::String(String::new()));
    }

    #[test]
    fn projection_is_repeatable_and_leaves_input_untouched() {
        let table = source();
        let before = table.clone();
        let mapping = resolve(&template(&["Region", "Amount"]), table.columns()).unwrap();

        let first = project(&table, &mapping).unwrap();
        let second = project(&table, &mapping).unwrap();

        assert_eq!(first, second);
        assert_eq!(table, before);
    }

    #[test]
    fn empty_table_projects_to_empty_table() {
        let table = Table::empty(labels(&["Name"])).unwrap();
        let mapping = resolve(&template(&["Name", "Region"]), table.columns()).unwrap();
        let projected = project(&table, &mapping).unwrap();

        assert_eq!(projected.row_count(), 0);
        assert_eq!(projected.columns().len(), 2);
    }
}
