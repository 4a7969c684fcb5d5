//! Typed columnar batches

use serde::Serialize;

use super::value::Value;
use crate::schema::{Schema, TypeTag};

/// One typed output column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub type_tag: TypeTag,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, type_tag: TypeTag, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            type_tag,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered typed columns of equal length
///
/// Every row carries a value (possibly null) for every column of the
/// effective schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Batch {
    columns: Vec<Column>,
    row_count: usize,
}

impl Batch {
    pub fn new(row_count: usize) -> Self {
        Self {
            columns: Vec::new(),
            row_count,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Cell at `row` of the named column
    pub fn value(&self, column: &str, row: usize) -> Option<&Value> {
        self.column(column).and_then(|c| c.values.get(row))
    }

    /// Append a column, padding with nulls or truncating to the row count
    ///
    /// A column with an existing name replaces it in place.
    pub fn push_column(&mut self, mut column: Column) {
        column.values.resize(self.row_count, Value::Null);
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    /// The effective schema, derived from the columns
    pub fn schema(&self) -> Schema {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.type_tag))
            .collect()
    }

    /// Row-oriented JSON objects in column order
    pub fn to_json_rows(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        (0..self.row_count)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), c.values[row].to_json()))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_column_pads_and_replaces() {
        let mut batch = Batch::new(2);
        batch.push_column(Column::new("a", TypeTag::Int32, vec![Value::Int32(1)]));
        assert_eq!(batch.value("a", 1), Some(&Value::Null));

        batch.push_column(Column::new(
            "a",
            TypeTag::String,
            vec![Value::String("x".into()), Value::String("y".into())],
        ));
        assert_eq!(batch.column_count(), 1);
        assert_eq!(batch.schema().get("a"), Some(TypeTag::String));
    }

    #[test]
    fn test_to_json_rows() {
        let mut batch = Batch::new(2);
        batch.push_column(Column::new(
            "id",
            TypeTag::Int64,
            vec![Value::Int64(1), Value::Int64(2)],
        ));
        batch.push_column(Column::new(
            "name",
            TypeTag::String,
            vec![Value::String("a".into()), Value::Null],
        ));

        let rows = batch.to_json_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], serde_json::json!(1));
        assert_eq!(rows[1]["name"], serde_json::Value::Null);
        assert_eq!(rows[1].keys().collect::<Vec<_>>(), vec!["id", "name"]);
    }
}
