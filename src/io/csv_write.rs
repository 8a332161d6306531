use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{Result, ToolError};
use crate::io::WriteOptions;
use crate::model::{Cell, Table};

/// Writes the table as CSV with a header row.
///
/// Null cells are written as `options.null_value`, left unquoted when it is
/// empty. Empty strings are always written as `""`, so a bare empty field only
/// ever stands for null.
pub fn write_table(path: &Path, table: &Table, options: &WriteOptions) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_path(path)?;

    let header = table
        .columns()
        .iter()
        .map(|label| encode_field(label, QuoteStyle::Necessary))
        .collect::<Result<Vec<_>>>()?;
    writer.write_record(&header)?;

    for row in table.rows() {
        let fields = row
            .into_iter()
            .map(|cell| match cell {
                Cell::Null if options.null_value.is_empty() => Ok(Vec::new()),
                Cell::Null => encode_field(&options.null_value, QuoteStyle::Necessary),
                Cell::String(value) if value.is_empty() => encode_field(value, QuoteStyle::Always),
                other => encode_field(&other.to_string(), QuoteStyle::Necessary),
            })
            .collect::<Result<Vec<_>>>()?;
        writer.write_record(&fields)?;
    }

    writer.flush()?;
    Ok(())
}

/// Quotes and escapes a single field; the outer writer copies it verbatim.
fn encode_field(value: &str, style: QuoteStyle) -> Result<Vec<u8>> {
    let mut encoder = WriterBuilder::new()
        .quote_style(style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    encoder.write_record([value])?;
    let mut encoded = encoder
        .into_inner()
        .map_err(|error| ToolError::Io(error.into_error()))?;
    encoded.pop();
    Ok(encoded)
}
