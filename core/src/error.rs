//! Error types for the generated client.
//!
//! # Design
//! Four kinds, each carrying the model it came from. `NotFound` is an
//! ordinary outcome and gets its own variant so callers never have to
//! inspect status codes. Everything that went wrong on the far side of the
//! wire (unreachable host, unexpected status, undecodable body) is folded
//! into `Remote`, with the detail kept in `RemoteError`.

use thiserror::Error;

/// Errors returned by the client factory and by model accessors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The client could not be set up, e.g. a malformed base address.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The payload does not match the model's shape, locally or as judged
    /// by the service (400/422).
    #[error("validation failed for {model}: {message}")]
    Validation { model: &'static str, message: String },

    /// No entity with this identifier exists.
    #[error("{model} {id} not found")]
    NotFound { model: &'static str, id: String },

    /// Transport or service-side failure.
    #[error("remote error for {model}: {source}")]
    Remote {
        model: &'static str,
        #[source]
        source: RemoteError,
    },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// Model the failing operation targeted. `None` for configuration errors.
    pub fn model(&self) -> Option<&'static str> {
        match self {
            ClientError::Configuration(_) => None,
            ClientError::Validation { model, .. }
            | ClientError::NotFound { model, .. }
            | ClientError::Remote { model, .. } => Some(model),
        }
    }
}

/// Detail for `ClientError::Remote`.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never produced a response.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The service answered with a status the operation does not expect.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A success response whose body is not a conforming entity.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// I/O-level failure reported by a `Transport`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
