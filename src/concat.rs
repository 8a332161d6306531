//! Merges many source tables into one output table with a fixed column order.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ToolError};
use crate::model::{Cell, Table};
use crate::normalize::normalize;
use crate::project::project;
use crate::schema::{self, ResolvedMapping, TargetSchema, TemplateSchema};

/// Name of the column holding the `period` value when one is configured.
pub const PERIOD_COLUMN: &str = "datePeriod";

/// One input to [`concat`]: a label used in warnings plus the outcome of
/// reading the table.
#[derive(Debug)]
pub struct SourceTable {
    pub label: String,
    pub table: Result<Table>,
}

impl SourceTable {
    pub fn new(label: impl Into<String>, table: Result<Table>) -> Self {
        Self {
            label: label.into(),
            table,
        }
    }
}

/// How the output schema is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaMode {
    /// The first readable table defines the schema; every later table must
    /// carry the same normalized column set.
    Identical,
    /// An explicit alias mapping or template schema.
    Target(TargetSchema),
}

/// Optional adjustments applied on top of the target schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConcatOptions {
    /// Output columns to drop, matched by normalized name.
    pub exclude: Vec<String>,
    /// Appends a column with this name holding each row's source label.
    pub source_column: Option<String>,
    /// Appends a [`PERIOD_COLUMN`] column holding this value on every row.
    pub period: Option<String>,
    /// Skips tables whose share of resolved output columns is below this
    /// fraction.
    pub min_match_rate: Option<f64>,
}

/// A source table that was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub source: String,
    pub message: String,
}

/// Result of a successful merge.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatOutcome {
    pub table: Table,
    /// Labels of the tables whose rows made it into the output, in order.
    pub merged: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Concatenates `sources` using [`schema::resolve`] to reconcile columns.
pub fn concat<I>(sources: I, mode: &SchemaMode, options: &ConcatOptions) -> Result<ConcatOutcome>
where
    I: IntoIterator<Item = SourceTable>,
{
    concat_with(sources, mode, options, schema::resolve)
}

/// Concatenates `sources` in the order given, resolving each table with
/// `resolver`.
///
/// Rows keep their source order and tables keep caller order. Sources that
/// failed to load, or that fall below `min_match_rate`, are skipped and
/// reported as warnings. Fails with [`ToolError::NoValidInput`] when nothing
/// could be merged.
#[instrument(level = "info", skip_all)]
pub fn concat_with<I, F>(
    sources: I,
    mode: &SchemaMode,
    options: &ConcatOptions,
    resolver: F,
) -> Result<ConcatOutcome>
where
    I: IntoIterator<Item = SourceTable>,
    F: Fn(&TargetSchema, &[String]) -> Result<ResolvedMapping>,
{
    let mut state = match mode {
        SchemaMode::Target(target) => Some(MergeState::new(target.clone(), None, options)?),
        SchemaMode::Identical => None,
    };
    let mut merged = Vec::new();
    let mut warnings = Vec::new();

    for source in sources {
        let label = source.label;
        let table = match source.table {
            Ok(table) => table,
            Err(error) => {
                warn!(source = %label, %error, "skipping unreadable table");
                warnings.push(Warning {
                    source: label,
                    message: error.to_string(),
                });
                continue;
            }
        };

        if state.is_none() {
            let template = TargetSchema::Template(TemplateSchema::new(table.columns().to_vec()));
            let reference = ColumnSet::of(&table);
            info!(source = %label, column_count = table.columns().len(), "schema taken from first table");
            state = Some(MergeState::new(template, Some(reference), options)?);
        }
        let Some(state) = state.as_mut() else {
            continue;
        };

        if let Some(reference) = &state.reference {
            reference.ensure_same(&label, &table)?;
        }

        let mapping = resolver(&state.target, table.columns())?;
        if let Some(rate) = options.min_match_rate {
            let matched = mapping.matched_count();
            let total = mapping.len();
            if total > 0 && (matched as f64) < rate * total as f64 {
                let message = format!(
                    "only {matched} of {total} output columns matched, below the {:.0}% threshold",
                    rate * 100.0
                );
                warn!(source = %label, matched, total, "skipping poorly matched table");
                warnings.push(Warning {
                    source: label,
                    message,
                });
                continue;
            }
        }
        let absent: Vec<&str> = mapping.absent_columns().collect();
        if !absent.is_empty() {
            debug!(source = %label, ?absent, "output columns missing from source");
        }

        let mut projected = project(&table, &mapping)?;
        let rows = projected.row_count();
        if let Some(column) = &options.source_column {
            projected.push_column(column.clone(), vec![Cell::String(label.clone()); rows])?;
        }
        if let Some(period) = &options.period {
            projected.push_column(PERIOD_COLUMN, vec![Cell::String(period.clone()); rows])?;
        }
        state.output.append(projected)?;
        info!(source = %label, rows, matched = mapping.matched_count(), "merged table");
        merged.push(label);
    }

    let Some(state) = state.filter(|_| !merged.is_empty()) else {
        return Err(ToolError::NoValidInput);
    };

    info!(
        tables = merged.len(),
        skipped = warnings.len(),
        rows = state.output.row_count(),
        "concatenation finished"
    );
    Ok(ConcatOutcome {
        table: state.output,
        merged,
        warnings,
    })
}

struct MergeState {
    target: TargetSchema,
    reference: Option<ColumnSet>,
    output: Table,
}

impl MergeState {
    fn new(target: TargetSchema, reference: Option<ColumnSet>, options: &ConcatOptions) -> Result<Self> {
        let target = target.excluding(&options.exclude);
        target.validate()?;

        let mut columns: Vec<String> = target.output_names().into_iter().map(str::to_string).collect();
        if columns.is_empty() {
            return Err(ToolError::InvalidMapping("target schema has no output columns".into()));
        }
        columns.extend(options.source_column.iter().cloned());
        if options.period.is_some() {
            columns.push(PERIOD_COLUMN.to_string());
        }
        let output = Table::empty(columns).map_err(|error| match error {
            ToolError::DuplicateColumn(name) => ToolError::AmbiguousTarget(name),
            other => other,
        })?;

        Ok(Self {
            target,
            reference,
            output,
        })
    }
}

/// Normalized column set of the first table in identical-columns mode.
struct ColumnSet {
    keys: BTreeSet<String>,
    labels: Vec<String>,
}

impl ColumnSet {
    fn of(table: &Table) -> Self {
        Self {
            keys: table.columns().iter().map(|column| normalize(column)).collect(),
            labels: table.columns().to_vec(),
        }
    }

    fn ensure_same(&self, label: &str, table: &Table) -> Result<()> {
        let keys: BTreeSet<String> = table.columns().iter().map(|column| normalize(column)).collect();
        if keys == self.keys {
            return Ok(());
        }
        let missing = self
            .labels
            .iter()
            .filter(|column| !keys.contains(&normalize(column)))
            .cloned()
            .collect();
        let unexpected = table
            .columns()
            .iter()
            .filter(|column| !self.keys.contains(&normalize(column)))
            .cloned()
            .collect();
        Err(ToolError::SchemaMismatch {
            source_label: label.to_string(),
            missing,
            unexpected,
        })
    }
}
