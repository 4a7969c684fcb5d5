//! Column-level coercion failures

use thiserror::Error;

use crate::inference::DateParseError;

/// Why a column could not be converted to its declared type
///
/// Never surfaces to the caller as an error: the coercer turns it into a
/// string column and a [`ColumnDegradation`](super::ColumnDegradation).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    #[error("Value '{value}' is not a boolean")]
    NotBoolean { value: String },

    #[error(transparent)]
    Date(#[from] DateParseError),
}

impl CoercionError {
    /// The raw value that broke the column
    pub fn value(&self) -> &str {
        match self {
            CoercionError::NotBoolean { value } => value,
            CoercionError::Date(e) => e.value(),
        }
    }
}
