//! Error types for batch assembly
//!
//! Only structural misconfiguration aborts a batch. Problems with individual
//! values or columns are reported in the
//! [`CoercionReport`](crate::coercion::CoercionReport) instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::flatten::FlattenError;
use crate::inference::InferenceError;

/// Errors that abort assembling a batch
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The partition key attribute was found in no record of the batch
    #[error("Partition key '{partition_key}' not found in any of {records} records")]
    MissingPartitionKey {
        partition_key: String,
        records: usize,
    },

    /// No catalog schema for the table and auto-schema mode is off
    #[error("Schema for table '{0}' not found in catalog")]
    SchemaNotFound(String),

    /// Catalog lookup failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Stream payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] FlattenError),

    /// Pipeline configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("Failed to read configuration {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    pub(crate) fn config(err: impl std::fmt::Display) -> Self {
        PipelineError::Config(err.to_string())
    }

    /// Whether retrying the same input could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::Catalog(CatalogError::Io { .. } | CatalogError::Backend(_))
        )
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::MissingPartitionKey { partition_key, .. } => format!(
                "Partition key '{partition_key}' is missing from every record.\n\nHint: Check the configured partition key against the table's key attributes."
            ),
            PipelineError::SchemaNotFound(table) => format!(
                "No schema registered for table '{table}'.\n\nHint: Register the table in the catalog or enable auto-schema mode."
            ),
            PipelineError::Config(msg) => {
                format!("Configuration error: {msg}\n\nHint: Check your pipeline configuration file.")
            }
            PipelineError::ConfigIo { path, .. } => format!(
                "Cannot read configuration: {}\n\nHint: Check that the file exists and the path is correct.",
                path.display()
            ),
            _ => self.to_string(),
        }
    }
}

impl From<InferenceError> for PipelineError {
    fn from(err: InferenceError) -> Self {
        PipelineError::Config(err.to_string())
    }
}
