//! What happened to a batch on its way to the target schema

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::naming::PruneReport;
use crate::schema::TypeTag;

/// A column that could not be coerced to its declared type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDegradation {
    pub column: String,
    /// Type the schema asked for
    pub declared: TypeTag,
    /// Type the column was written as (always string)
    pub effective: TypeTag,
    pub reason: String,
    /// First value that failed
    pub offending_value: String,
}

/// Per-batch coercion report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoercionReport {
    /// Columns that fell back to string
    pub degraded_columns: Vec<ColumnDegradation>,
    /// Column -> number of values replaced by the type default
    pub defaulted_values: BTreeMap<String, usize>,
    /// Schema columns absent from the batch, left unset
    pub missing_columns: Vec<String>,
    /// Columns removed or added before coercion
    pub pruning: PruneReport,
}

impl CoercionReport {
    pub fn is_clean(&self) -> bool {
        self.degraded_columns.is_empty()
            && self.defaulted_values.is_empty()
            && self.pruning.is_empty()
    }

    pub fn is_degraded(&self, column: &str) -> bool {
        self.degraded_columns.iter().any(|d| d.column == column)
    }

    pub fn defaulted(&self, column: &str) -> usize {
        self.defaulted_values.get(column).copied().unwrap_or(0)
    }

    pub fn total_defaulted(&self) -> usize {
        self.defaulted_values.values().sum()
    }

    pub(crate) fn record_defaults(&mut self, column: &str, count: usize) {
        if count > 0 {
            *self.defaulted_values.entry(column.to_string()).or_insert(0) += count;
        }
    }
}
