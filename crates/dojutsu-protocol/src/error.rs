//! Protocol error types

use thiserror::Error;

/// Errors that can occur while building, encoding or decoding envelopes
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Request was built without an operation name
    #[error("Operation name must not be empty")]
    EmptyOperation,

    /// Response bytes could not be turned into a response envelope
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Create a malformed response error
    pub fn malformed(reason: impl Into<String>) -> Self {
        ProtocolError::MalformedResponse(reason.into())
    }
}
