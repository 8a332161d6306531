//! Target schemas and their resolution against the columns of a source table.

use std::collections::{HashMap, HashSet};

use crate::error::{Result, ToolError};
use crate::mapping::MappingSpec;
use crate::normalize::normalize;

/// Ordered output column names taken from the header row of a template table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSchema {
    columns: Vec<String>,
}

impl TemplateSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Describes the output columns a source table is reconciled against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSchema {
    /// Output columns with candidate aliases; the first declared alias present wins.
    Aliases(MappingSpec),
    /// Output columns matched by normalized name only.
    Template(TemplateSchema),
}

impl TargetSchema {
    /// Output column names in schema order.
    pub fn output_names(&self) -> Vec<&str> {
        match self {
            TargetSchema::Aliases(spec) => spec.output_names().collect(),
            TargetSchema::Template(template) => {
                template.columns().iter().map(String::as_str).collect()
            }
        }
    }

    /// Fails with [`ToolError::AmbiguousTarget`] when two output names share a
    /// normalized key.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in self.output_names() {
            if !seen.insert(normalize(name)) {
                return Err(ToolError::AmbiguousTarget(name.to_string()));
            }
        }
        Ok(())
    }

    /// Drops the output columns whose normalized name is listed in `excluded`.
    pub fn excluding(self, excluded: &[String]) -> Self {
        if excluded.is_empty() {
            return self;
        }
        let excluded: HashSet<String> = excluded.iter().map(|name| normalize(name)).collect();
        let keep = |name: &str| !excluded.contains(&normalize(name));
        match self {
            TargetSchema::Aliases(spec) => TargetSchema::Aliases(MappingSpec::from_columns(
                spec.columns()
                    .iter()
                    .filter(|column| keep(column.name.as_str()))
                    .cloned()
                    .collect(),
            )),
            TargetSchema::Template(template) => TargetSchema::Template(TemplateSchema::new(
                template
                    .columns
                    .into_iter()
                    .filter(|name| keep(name.as_str()))
                    .collect(),
            )),
        }
    }
}

/// Where the values of one output column come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Copy the values of the named source column.
    Source(String),
    /// The source has no such column; fill with nulls.
    Absent,
}

/// Output column → resolution for one source table, in target schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping {
    entries: Vec<(String, Resolution)>,
}

impl ResolvedMapping {
    pub fn entries(&self) -> &[(String, Resolution)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of output columns resolved to a source column.
    pub fn matched_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, resolution)| matches!(resolution, Resolution::Source(_)))
            .count()
    }

    /// Output columns the source table could not supply.
    pub fn absent_columns(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, resolution)| *resolution == Resolution::Absent)
            .map(|(name, _)| name.as_str())
    }
}

/// Resolves every output column of `target` against `source_columns`.
///
/// Unmatched output columns resolve to [`Resolution::Absent`]. When several
/// source columns share a normalized key, the first one in source order is
/// used. A source column may feed more than one output column.
pub fn resolve(target: &TargetSchema, source_columns: &[String]) -> Result<ResolvedMapping> {
    target.validate()?;

    let mut by_key: HashMap<String, &str> = HashMap::with_capacity(source_columns.len());
    for column in source_columns {
        by_key.entry(normalize(column)).or_insert(column.as_str());
    }
    let lookup = |label: &str| by_key.get(&normalize(label)).map(|column| column.to_string());

    let entries = match target {
        TargetSchema::Aliases(spec) => spec
            .columns()
            .iter()
            .map(|column| {
                let resolution = column
                    .aliases
                    .iter()
                    .find_map(|alias| lookup(alias.as_str()))
                    .map_or(Resolution::Absent, Resolution::Source);
                (column.name.clone(), resolution)
            })
            .collect(),
        TargetSchema::Template(template) => template
            .columns()
            .iter()
            .map(|name| {
                let resolution = lookup(name.as_str()).map_or(Resolution::Absent, Resolution::Source);
                (name.clone(), resolution)
            })
            .collect(),
    };

    Ok(ResolvedMapping { entries })
}
