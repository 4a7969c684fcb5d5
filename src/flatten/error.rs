//! Error types for record decoding

use thiserror::Error;

/// Errors raised while turning a stream delivery into raw records
#[derive(Error, Debug)]
pub enum FlattenError {
    /// Payload is not valid base64
    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Payload is not UTF-8 text
    #[error("Payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid JSON structure (not an object at root)
    #[error("Invalid record structure: expected object at root, found {0}")]
    InvalidStructure(String),

    /// Envelope field missing from the delivery
    #[error("Missing field in stream event: {0}")]
    MissingField(&'static str),
}
