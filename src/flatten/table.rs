//! Column-major view over a batch of flat records

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::flattener::FlatRecord;
use super::value::FlatValue;

/// One column of untyped values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawColumn {
    pub name: String,
    pub values: Vec<FlatValue>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, values: Vec<FlatValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_null()).count()
    }

    pub fn is_all_null(&self) -> bool {
        self.values.iter().all(FlatValue::is_null)
    }

    /// Every non-null value is a number, natively or by declaration
    pub fn is_numeric(&self) -> bool {
        let mut seen = false;
        for value in self.values.iter().filter(|v| !v.is_null()) {
            if !value.is_numeric() {
                return false;
            }
            seen = true;
        }
        seen
    }
}

/// A batch of flattened records, organised by column
///
/// Column names may repeat; duplicate handling is left to the pruning step
/// so that the left-most occurrence can be kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    columns: Vec<RawColumn>,
    row_count: usize,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Align records into columns; keys missing from a record become null
    ///
    /// Columns appear in the order their key was first seen.
    pub fn from_records(records: &[FlatRecord]) -> Self {
        let row_count = records.len();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut columns: Vec<RawColumn> = Vec::new();

        for (row, record) in records.iter().enumerate() {
            for (key, value) in record.iter() {
                let position = *index.entry(key.to_string()).or_insert_with(|| {
                    columns.push(RawColumn::new(key, vec![FlatValue::null(); row_count]));
                    columns.len() - 1
                });
                columns[position].values[row] = value.clone();
            }
        }

        Self { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    /// First column with the given name
    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Append a column, padding or truncating it to the row count
    pub fn push_column(&mut self, mut column: RawColumn) {
        if self.columns.is_empty() && self.row_count == 0 {
            self.row_count = column.values.len();
        }
        column.values.resize(self.row_count, FlatValue::null());
        self.columns.push(column);
    }

    /// Rename every column in place
    pub fn rename_columns(&mut self, mut rename: impl FnMut(&str) -> String) {
        for column in &mut self.columns {
            column.name = rename(&column.name);
        }
    }

    /// Keep only columns accepted by the predicate, returning the removed names
    pub fn retain_columns(&mut self, mut keep: impl FnMut(usize, &RawColumn) -> bool) -> Vec<String> {
        let mut removed = Vec::new();
        let mut position = 0;
        self.columns.retain(|column| {
            let kept = keep(position, column);
            position += 1;
            if !kept {
                removed.push(column.name.clone());
            }
            kept
        });
        removed
    }

    /// Drop columns that hold no value in any row
    pub fn drop_all_null_columns(&mut self) -> Vec<String> {
        self.retain_columns(|_, column| !column.is_all_null())
    }

    pub fn into_columns(self) -> Vec<RawColumn> {
        self.columns
    }
}
