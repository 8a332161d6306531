//! Alias mappings from output columns to the source labels they accept.
//!
//! A mapping document is a JSON object. Each entry is either a flat list of
//! aliases, or an object of sub-labels that expands into one output column per
//! sub-label named `"<category> - <sub-label>"`:
//!
//! ```json
//! {
//!     "Name": ["Name", "full_name"],
//!     "Sales": { "Cash": ["Cash Sales"], "Card": ["Credit card"] }
//! }
//! ```
//!
//! Entry order is preserved and becomes the output column order.

mod builtin;

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::error::Category;
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::normalize::normalize;

/// An output column together with the source labels accepted for it, in
/// precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumn {
    pub name: String,
    pub aliases: Vec<String>,
}

impl OutputColumn {
    pub fn new<I, S>(name: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }
}

/// Flattened alias mapping describing the output schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSpec {
    columns: Vec<OutputColumn>,
}

impl MappingSpec {
    /// Wraps already flattened output columns without validating them.
    pub fn from_columns(columns: Vec<OutputColumn>) -> Self {
        Self { columns }
    }

    /// The built-in default mapping.
    pub fn builtin() -> Self {
        let columns = builtin::DEFAULT_COLUMNS
            .iter()
            .map(|(name, aliases)| OutputColumn::new(*name, aliases.iter().copied()))
            .collect();
        Self { columns }
    }

    /// Parses a mapping document, flattening nested categories.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let entries: OrderedEntries<RawEntry> =
            serde_json::from_str(source).map_err(|err| match err.classify() {
                Category::Data => ToolError::InvalidMapping(err.to_string()),
                _ => ToolError::Json(err),
            })?;

        let mut columns = Vec::new();
        for (key, entry) in entries.0 {
            match entry {
                RawEntry::Aliases(aliases) => columns.push(OutputColumn::new(key, aliases)),
                RawEntry::Nested(subs) => {
                    for (sub_label, aliases) in subs.0 {
                        columns.push(OutputColumn::new(format!("{key} - {sub_label}"), aliases));
                    }
                }
            }
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.name.trim().is_empty() {
                return Err(ToolError::InvalidMapping("empty output column name".into()));
            }
            if !seen.insert(normalize(&column.name)) {
                return Err(ToolError::InvalidMapping(format!(
                    "output column '{}' is declared more than once",
                    column.name
                )));
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    /// Output column names in schema order.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }
}

/// Loads the mapping stored at `source`, or the built-in mapping when absent.
pub fn load(source: Option<&Path>) -> Result<MappingSpec> {
    match source {
        Some(path) => {
            let data = fs::read_to_string(path)?;
            let spec = MappingSpec::from_json_str(&data)?;
            debug!(
                path = %path.display(),
                column_count = spec.columns.len(),
                "loaded column mapping"
            );
            Ok(spec)
        }
        None => Ok(MappingSpec::builtin()),
    }
}

/// JSON object entries in document order. Duplicate keys are rejected.
struct OrderedEntries<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

struct EntriesVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
    type Value = OrderedEntries<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of column entries")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, V)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            if entries.iter().any(|(existing, _)| *existing == key) {
                return Err(de::Error::custom(format!("duplicate entry '{key}'")));
            }
            let value = map.next_value::<V>()?;
            entries.push((key, value));
        }
        Ok(OrderedEntries(entries))
    }
}

enum RawEntry {
    Aliases(Vec<String>),
    Nested(OrderedEntries<Vec<String>>),
}

impl<'de> Deserialize<'de> for RawEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(RawEntryVisitor)
    }
}

struct RawEntryVisitor;

impl<'de> Visitor<'de> for RawEntryVisitor {
    type Value = RawEntry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of aliases or an object of sub-columns")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
        let mut aliases = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(alias) = seq.next_element::<String>()? {
            aliases.push(alias);
        }
        Ok(RawEntry::Aliases(aliases))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<Self::Value, A::Error> {
        EntriesVisitor(PhantomData).visit_map(map).map(RawEntry::Nested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(spec: &MappingSpec) -> Vec<&str> {
        spec.output_names().collect()
    }

    #[test]
    fn flat_entries_keep_document_order() {
        let spec = MappingSpec::from_json_str(
            r#"{"Zeta": ["z"], "Alpha": ["a", "first"], "Mid": []}"#,
        )
        .expect("mapping parsed");

        assert_eq!(names(&spec), vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(spec.columns()[1].aliases, vec!["a", "first"]);
        assert!(spec.columns()[2].aliases.is_empty());
    }

    #[test]
    fn nested_entries_flatten_with_category_prefix() {
        let spec = MappingSpec::from_json_str(
            r#"{
                "Name": ["Name"],
                "Sales": {"Cash": ["Cash Sales"], "Card": ["Credit card", "CC"]},
                "Remarks": ["Remarks"]
            }"#,
        )
        .expect("mapping parsed");

        assert_eq!(
            names(&spec),
            vec!["Name", "Sales - Cash", "Sales - Card", "Remarks"]
        );
        assert_eq!(spec.columns()[2].aliases, vec!["Credit card", "CC"]);
    }

    #[test]
    fn scalar_entry_is_invalid() {
        let error = MappingSpec::from_json_str(r#"{"Name": "Name"}"#).unwrap_err();
        match error {
            ToolError::InvalidMapping(message) => {
                assert!(message.contains("expected a list of aliases"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nested_non_list_is_invalid() {
        let error = MappingSpec::from_json_str(r#"{"Sales": {"Cash": 3}}"#).unwrap_err();
        assert!(matches!(error, ToolError::InvalidMapping(_)));
    }

    #[test]
    fn top_level_array_is_invalid() {
        let error = MappingSpec::from_json_str(r#"[["Name"]]"#).unwrap_err();
        assert!(matches!(error, ToolError::InvalidMapping(_)));
    }

    #[test]
    fn flattening_collision_is_invalid() {
        let error = MappingSpec::from_json_str(
            r#"{"Sales - Cash": ["a"], "Sales": {"Cash": ["b"]}}"#,
        )
        .unwrap_err();
        match error {
            ToolError::InvalidMapping(message) => assert!(message.contains("Sales - Cash")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_json_key_is_invalid() {
        let error = MappingSpec::from_json_str(r#"{"Name": ["a"], "Name": ["b"]}"#).unwrap_err();
        assert!(matches!(error, ToolError::InvalidMapping(_)));
    }

    #[test]
    fn malformed_json_is_a_syntax_error() {
        let error = MappingSpec::from_json_str(r#"{"Name": ["a""#).unwrap_err();
        assert!(matches!(error, ToolError::Json(_)));
    }

    #[test]
    fn truncated_nested_entry_is_a_syntax_error() {
        let error = MappingSpec::from_json_str(r#"{"Sales": {"Cash": ["a"#).unwrap_err();
        assert!(matches!(error, ToolError::Json(_)));
    }

    #[test]
    fn absent_source_uses_builtin_mapping() {
        let spec = load(None).expect("builtin mapping");
        assert_eq!(spec, MappingSpec::builtin());
        assert_eq!(spec.output_names().next(), Some("POS Name"));
        assert_eq!(spec.columns().len(), 19);
    }
}
