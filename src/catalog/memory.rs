//! In-memory catalog

use std::collections::HashMap;

use super::{CatalogError, SchemaCatalog};
use crate::schema::Schema;

/// Catalog backed by a map, for tests and embedded callers
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    tables: HashMap<String, Schema>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration
    pub fn with_table(mut self, table: impl Into<String>, schema: Schema) -> Self {
        self.insert(table, schema);
        self
    }

    /// Register or replace a table schema, returning the previous one
    pub fn insert(&mut self, table: impl Into<String>, schema: Schema) -> Option<Schema> {
        self.tables.insert(table.into(), schema)
    }

    pub fn remove(&mut self, table: &str) -> Option<Schema> {
        self.tables.remove(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl SchemaCatalog for InMemoryCatalog {
    fn get_schema(&self, table: &str) -> Result<Option<Schema>, CatalogError> {
        Ok(self.tables.get(table).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeTag;

    #[test]
    fn test_lookup() {
        let schema: Schema = [("id", TypeTag::Int32)].into_iter().collect();
        let catalog = InMemoryCatalog::new().with_table("orders", schema.clone());

        assert_eq!(catalog.get_schema("orders").unwrap(), Some(schema));
        assert_eq!(catalog.get_schema("missing").unwrap(), None);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_insert_replaces() {
        let mut catalog = InMemoryCatalog::new();
        assert!(catalog.insert("t", Schema::new()).is_none());
        let replaced = catalog.insert("t", [("a", TypeTag::String)].into_iter().collect());
        assert_eq!(replaced, Some(Schema::new()));
        assert!(catalog.remove("t").is_some());
        assert!(catalog.is_empty());
    }
}
