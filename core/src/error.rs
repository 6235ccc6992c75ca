//! Error types for the CRM SDK.
//!
//! # Design
//! Two families with different handling rules. `ConfigError` covers mistakes
//! in how the SDK is driven (unknown origin, unknown payload field, missing
//! path parameter) and is returned to the caller immediately. `TransportError`
//! covers everything that can go wrong on the wire; it never leaves a
//! transport, which folds it into an `ApiResponse` with an `{"error": ...}`
//! body instead.

use thiserror::Error;

/// Status substituted when a transport failure carries no HTTP status.
pub const INTERNAL_ERROR_STATUS: u16 = 500;

/// Configuration errors, raised synchronously to the calling code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unsupported client origin: {0}")]
    UnsupportedOrigin(String),

    #[error("invalid key '{field}' for payload model {variant}")]
    UnknownPayloadField { field: String, variant: &'static str },

    #[error("payload field '{0}' is fixed by the client origin and cannot be overridden")]
    ReadOnlyPayloadField(String),

    #[error("payload field '{field}' expects {expected}")]
    InvalidFieldValue { field: String, expected: &'static str },

    #[error("missing value for path parameter '{0}'")]
    MissingPathParameter(String),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    /// A request entity could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Failures on the wire. Transports convert these into an `ApiResponse`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be executed, or the HTTP library reported the
    /// response status as an error.
    #[error("{message}")]
    Request { message: String, status: Option<u16> },

    /// The response body was not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// The enclosing task was cancelled while the request was in flight.
    #[error("request cancelled")]
    Cancelled,
}

impl TransportError {
    pub fn request(message: impl Into<String>) -> Self {
        TransportError::Request {
            message: message.into(),
            status: None,
        }
    }

    /// Status reported alongside the error body.
    pub fn status(&self) -> u16 {
        match self {
            TransportError::Request {
                status: Some(status),
                ..
            } => *status,
            _ => INTERNAL_ERROR_STATUS,
        }
    }
}
