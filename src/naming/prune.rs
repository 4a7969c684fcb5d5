//! Column pruning and schema extension

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::normalize::NameNormalizer;
use crate::flatten::RawTable;
use crate::schema::{Schema, TypeTag};

/// Columns removed or added while reconciling a table with a schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneReport {
    /// Later occurrences of a repeated column name
    pub duplicate_columns: Vec<String>,
    /// Exploded array-index columns
    pub index_artifact_columns: Vec<String>,
    /// Columns with no value in any row
    pub empty_columns: Vec<String>,
    /// Data columns the schema did not know, added as string
    pub unknown_columns: Vec<String>,
}

impl PruneReport {
    pub fn is_empty(&self) -> bool {
        self.duplicate_columns.is_empty()
            && self.index_artifact_columns.is_empty()
            && self.empty_columns.is_empty()
            && self.unknown_columns.is_empty()
    }
}

/// Drop every repeated column name except its left-most occurrence
pub fn drop_duplicate_columns(table: &mut RawTable) -> Vec<String> {
    let mut seen = HashSet::new();
    let removed = table.retain_columns(|_, column| seen.insert(column.name.clone()));
    if !removed.is_empty() {
        info!(
            columns = ?removed,
            "Dropping duplicate columns (keeping first occurrence)"
        );
    }
    removed
}

/// Drop exploded array-index columns such as `items_003_name`
pub fn drop_index_artifacts(table: &mut RawTable, normalizer: &NameNormalizer) -> Vec<String> {
    let removed = table.retain_columns(|_, column| !normalizer.is_index_artifact(&column.name));
    if !removed.is_empty() {
        info!(
            columns = ?removed,
            "Dropping columns with separator-bounded index runs"
        );
    }
    removed
}

/// Drop columns that carry no value in the batch
pub fn drop_empty_columns(table: &mut RawTable) -> Vec<String> {
    let removed = table.drop_all_null_columns();
    if !removed.is_empty() {
        debug!(columns = ?removed, "Dropping all-null columns");
    }
    removed
}

/// Schema extended with every table column it does not define, as string
///
/// Returns the new schema and the names that were added.
pub fn extend_with_unknown(schema: &Schema, table: &RawTable) -> (Schema, Vec<String>) {
    let mut seen = HashSet::new();
    let added: Vec<String> = table
        .column_names()
        .filter(|name| !schema.contains(name) && seen.insert(*name))
        .map(|name| {
            info!(column = name, "Column not in schema, treating as string");
            name.to_string()
        })
        .collect();
    let unknown: Schema = added
        .iter()
        .map(|name| (name.clone(), TypeTag::String))
        .collect();
    (schema.merged_with(&unknown), added)
}

/// Apply every pruning rule to a normalised table
///
/// The table is modified in place; the schema is not touched here because
/// the caller may not have one yet (auto-schema mode infers from the pruned
/// table).
pub fn prune_table(
    table: &mut RawTable,
    normalizer: &NameNormalizer,
    drop_empty: bool,
) -> PruneReport {
    let duplicate_columns = drop_duplicate_columns(table);
    let index_artifact_columns = drop_index_artifacts(table, normalizer);
    let empty_columns = if drop_empty {
        drop_empty_columns(table)
    } else {
        Vec::new()
    };
    PruneReport {
        duplicate_columns,
        index_artifact_columns,
        empty_columns,
        unknown_columns: Vec::new(),
    }
}

/// Reconcile a schema with a pruned table
///
/// Index-artifact names are removed from the schema, unknown columns are
/// added as string. Duplicate names keep their declared type because the
/// surviving left-most column still carries that name.
pub fn reconcile_schema(
    schema: &Schema,
    table: &RawTable,
    report: &mut PruneReport,
) -> Schema {
    let pruned = schema.without(report.index_artifact_columns.iter().map(String::as_str));
    let (extended, added) = extend_with_unknown(&pruned, table);
    report.unknown_columns = added;
    extended
}
