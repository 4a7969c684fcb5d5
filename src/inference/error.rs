//! Error types for date parsing

use thiserror::Error;

/// A value that could not be turned into a UTC instant
///
/// Raised per value; the coercer catches it and degrades the column instead
/// of propagating it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    /// No epoch interpretation and no supported format matched
    #[error("Unable to parse date '{value}' with the supported formats")]
    Unparseable { value: String },

    /// Epoch number outside the representable range
    #[error("Epoch value out of range: {value}")]
    OutOfRange { value: String },
}

impl DateParseError {
    pub(crate) fn unparseable(value: impl Into<String>) -> Self {
        DateParseError::Unparseable {
            value: value.into(),
        }
    }

    /// The offending raw value
    pub fn value(&self) -> &str {
        match self {
            DateParseError::Unparseable { value } | DateParseError::OutOfRange { value } => value,
        }
    }
}

/// Invalid inference settings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// The date-name hint must not be empty
    #[error("Invalid inference configuration: {0}")]
    InvalidConfig(String),
}
