//! End-to-end runs: discover inputs, reconcile them and write the output file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{info, instrument, warn};

use crate::concat::{self, ConcatOptions, SchemaMode, SourceTable, Warning};
use crate::error::{Result, ToolError};
use crate::io::{self, WriteOptions, discover};
use crate::mapping;
use crate::schema::{self, ResolvedMapping, TargetSchema};

/// Placeholder in the output path replaced by the run timestamp.
pub const TIMESTAMP_PLACEHOLDER: &str = "{timestamp}";

/// Where the output schema comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// All inputs share the first input's columns.
    Identical,
    /// Alias mapping document, or the built-in mapping when `None`.
    Mapping(Option<PathBuf>),
    /// Header row of a template file.
    Template(PathBuf),
}

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatConfig {
    pub folder: PathBuf,
    pub output: PathBuf,
    pub pattern: Option<String>,
    pub sheet: Option<String>,
    pub schema: SchemaSource,
    pub options: ConcatOptions,
    pub write: WriteOptions,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
    pub merged: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Columns of one input file and how they resolve against the target schema.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub columns: Result<Vec<String>>,
    pub mapping: Option<ResolvedMapping>,
}

/// Merges every input file of `config.folder` into `config.output`.
///
/// The schema is loaded and validated before any input is read. Inputs that
/// cannot be read are skipped with a warning; nothing is written when no input
/// could be used.
#[instrument(
    level = "info",
    skip_all,
    fields(folder = %config.folder.display(), output = %config.output.display())
)]
pub fn run(config: &ConcatConfig) -> Result<RunSummary> {
    let mode = load_schema(&config.schema, config.sheet.as_deref())?;
    let files = discover::list_input_files(&config.folder, config.pattern.as_deref())?;
    info!(file_count = files.len(), "found input files");

    let sheet = config.sheet.as_deref();
    let sources = files.iter().map(|path| {
        info!(file = %path.display(), "reading input");
        SourceTable::new(
            source_label(path),
            io::read_table(path, sheet).map_err(|error| ToolError::read(path, error)),
        )
    });
    let outcome = concat::concat(sources, &mode, &config.options)?;

    let output = resolve_output_path(&config.output, Local::now());
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    io::write_table(&outcome.table, &output, &config.write)?;
    info!(
        output = %output.display(),
        rows = outcome.table.row_count(),
        "wrote concatenated table"
    );
    for warning in &outcome.warnings {
        warn!(source = %warning.source, message = %warning.message, "input skipped");
    }

    Ok(RunSummary {
        output,
        rows: outcome.table.row_count(),
        columns: outcome.table.columns().to_vec(),
        merged: outcome.merged,
        warnings: outcome.warnings,
    })
}

/// Reads the header of every input file and resolves it against the target
/// schema without writing anything.
#[instrument(level = "info", skip_all, fields(folder = %config.folder.display()))]
pub fn inspect(config: &ConcatConfig) -> Result<Vec<FileReport>> {
    let mode = load_schema(&config.schema, config.sheet.as_deref())?;
    let target = match mode {
        SchemaMode::Target(target) => Some(target.excluding(&config.options.exclude)),
        SchemaMode::Identical => None,
    };
    let files = discover::list_input_files(&config.folder, config.pattern.as_deref())?;

    files
        .into_iter()
        .map(|path| -> Result<FileReport> {
            let columns = io::read_table(&path, config.sheet.as_deref())
                .map(|table| table.columns().to_vec());
            let mapping = match (&target, &columns) {
                (Some(target), Ok(columns)) => Some(schema::resolve(target, columns)?),
                _ => None,
            };
            Ok(FileReport {
                path,
                columns,
                mapping,
            })
        })
        .collect()
}

/// Loads the configured schema. Mapping and template problems surface here,
/// before any input is touched.
pub fn load_schema(source: &SchemaSource, sheet: Option<&str>) -> Result<SchemaMode> {
    let mode = match source {
        SchemaSource::Identical => SchemaMode::Identical,
        SchemaSource::Mapping(path) => {
            SchemaMode::Target(TargetSchema::Aliases(mapping::load(path.as_deref())?))
        }
        SchemaSource::Template(path) => {
            if !path.exists() {
                return Err(ToolError::MissingInput(path.clone()));
            }
            let template = io::read_template(path, sheet)?;
            info!(template = %path.display(), columns = ?template.columns(), "loaded template");
            SchemaMode::Target(TargetSchema::Template(template))
        }
    };
    if let SchemaMode::Target(target) = &mode {
        target.validate()?;
    }
    Ok(mode)
}

/// Expands [`TIMESTAMP_PLACEHOLDER`] and appends `.xlsx` when the path has no
/// extension.
pub fn resolve_output_path(raw: &Path, now: DateTime<Local>) -> PathBuf {
    let text = raw.to_string_lossy();
    let mut path = if text.contains(TIMESTAMP_PLACEHOLDER) {
        let stamp = now.format("%Y%m%d_%H%M%S").to_string();
        PathBuf::from(text.replace(TIMESTAMP_PLACEHOLDER, &stamp))
    } else {
        raw.to_path_buf()
    };
    if path.extension().is_none() {
        path.set_extension("xlsx");
    }
    path
}

fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 1, 31, 8, 5, 9)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn timestamp_placeholder_is_expanded() {
        let path = resolve_output_path(Path::new("out/combined_{timestamp}.csv"), fixed_time());
        assert_eq!(path, PathBuf::from("out/combined_20250131_080509.csv"));
    }

    #[test]
    fn missing_extension_defaults_to_xlsx() {
        let path = resolve_output_path(Path::new("combined"), fixed_time());
        assert_eq!(path, PathBuf::from("combined.xlsx"));
    }

    #[test]
    fn explicit_extension_is_kept() {
        let path = resolve_output_path(Path::new("combined.csv"), fixed_time());
        assert_eq!(path, PathBuf::from("combined.csv"));
    }

    #[test]
    fn missing_template_is_reported_before_reading_inputs() {
        let error = load_schema(&SchemaSource::Template(PathBuf::from("/nonexistent/template.xlsx")), None)
            .unwrap_err();
        assert!(matches!(error, ToolError::MissingInput(_)));
    }

    #[test]
    fn builtin_mapping_is_used_without_a_document() {
        let mode = load_schema(&SchemaSource::Mapping(None), None).expect("schema loaded");
        assert_eq!(
            mode,
            SchemaMode::Target(TargetSchema::Aliases(mapping::MappingSpec::builtin()))
        );
    }
}
