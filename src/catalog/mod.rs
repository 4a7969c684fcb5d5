//! Schema catalogs
//!
//! A catalog answers one question: what is the declared schema of a table?
//! `Ok(None)` means the table is unknown; the pipeline then either infers a
//! schema (auto-schema mode) or stops with `SchemaNotFound`.

mod error;
mod file;
mod memory;

use std::sync::Arc;

pub use error::CatalogError;
pub use file::{CatalogFormat, FileCatalog};
pub use memory::InMemoryCatalog;

use crate::schema::Schema;

/// Source of declared table schemas
pub trait SchemaCatalog: Send + Sync {
    /// Look up the declared schema of a table
    fn get_schema(&self, table: &str) -> Result<Option<Schema>, CatalogError>;
}

impl<C: SchemaCatalog + ?Sized> SchemaCatalog for Arc<C> {
    fn get_schema(&self, table: &str) -> Result<Option<Schema>, CatalogError> {
        (**self).get_schema(table)
    }
}

impl<C: SchemaCatalog + ?Sized> SchemaCatalog for Box<C> {
    fn get_schema(&self, table: &str) -> Result<Option<Schema>, CatalogError> {
        (**self).get_schema(table)
    }
}
