//! File-backed catalog
//!
//! The document maps table names to `{column: type}` objects:
//!
//! ```yaml
//! orders:
//!   id: int
//!   amount: double
//!   updated_at: bigint
//! ```
//!
//! JSON, YAML and TOML are accepted; the format follows the file extension.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{CatalogError, SchemaCatalog};
use crate::schema::Schema;

/// Serialisation format of a catalog document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Yaml,
    Toml,
}

impl CatalogFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(CatalogFormat::Json),
            "yaml" | "yml" => Ok(CatalogFormat::Yaml),
            "toml" => Ok(CatalogFormat::Toml),
            _ => Err(CatalogError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CatalogFormat::Json => "JSON",
            CatalogFormat::Yaml => "YAML",
            CatalogFormat::Toml => "TOML",
        }
    }
}

/// Catalog loaded once from a document on disk
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    source: Option<PathBuf>,
    tables: BTreeMap<String, Schema>,
}

impl FileCatalog {
    /// Read and parse a catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let format = CatalogFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut catalog = Self::parse(&content, format)?;
        catalog.source = Some(path.to_path_buf());
        info!(
            path = %path.display(),
            tables = catalog.tables.len(),
            "Loaded schema catalog"
        );
        Ok(catalog)
    }

    /// Parse a catalog document held in memory
    pub fn parse(content: &str, format: CatalogFormat) -> Result<Self, CatalogError> {
        let tables: BTreeMap<String, Schema> = match format {
            CatalogFormat::Json => serde_json::from_str(content)
                .map_err(|e| CatalogError::parse(format.name(), e))?,
            CatalogFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| CatalogError::parse(format.name(), e))?,
            CatalogFormat::Toml => {
                toml::from_str(content).map_err(|e| CatalogError::parse(format.name(), e))?
            }
        };
        Ok(Self {
            source: None,
            tables,
        })
    }

    /// Path the catalog was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl SchemaCatalog for FileCatalog {
    fn get_schema(&self, table: &str) -> Result<Option<Schema>, CatalogError> {
        Ok(self.tables.get(table).cloned())
    }
}
