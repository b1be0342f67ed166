//! Error types for NotesAI.

use thiserror::Error;

/// Result type alias using NotesAI's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for NotesAI operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Nothing to process
    #[error("content is empty")]
    EmptyContent,

    /// No prompt template or post-processing exists for this operation
    #[error("No prompt found for operation: {0}")]
    UnknownOperation(String),

    /// Cloud provider selected without an API key on file
    #[error("Missing API key for provider: {0}")]
    MissingCredential(String),

    /// Caller asked for a provider outside the registry
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Provider answered with a non-success status
    #[error("{provider} returned {status}: {body}")]
    Provider {
        provider: String,
        status: u16,
        body: String,
    },

    /// Generation failed or the response did not match the provider schema
    #[error("Inference error: {0}")]
    Inference(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
