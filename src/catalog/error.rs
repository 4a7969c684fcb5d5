//! Error types for schema catalogs

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while looking up a table schema
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog document is malformed
    #[error("Failed to parse {format} catalog: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    /// File extension not recognised
    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),

    /// Failure reported by an external catalog implementation
    #[error("Catalog backend error: {0}")]
    Backend(String),
}

impl CatalogError {
    pub(crate) fn parse(format: &'static str, err: impl std::fmt::Display) -> Self {
        CatalogError::Parse {
            format,
            message: err.to_string(),
        }
    }
}
