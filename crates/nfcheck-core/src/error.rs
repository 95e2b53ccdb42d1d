//! Error types for the nfcheck-core library.

use thiserror::Error;

/// Main error type for the nfcheck library.
#[derive(Error, Debug)]
pub enum NfcheckError {
    /// The inbound batch request was malformed.
    #[error("invalid request: {0}")]
    Request(#[from] RequestError),

    /// A single document could not be processed.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the inbound batch message.
#[derive(Error, Debug)]
pub enum RequestError {
    /// The message body is not valid JSON.
    #[error("message is not valid JSON: {0}")]
    Json(String),

    /// The `documents` field is absent.
    #[error("missing `documents` field")]
    MissingDocuments,

    /// The `documents` field is present but not a sequence.
    #[error("`documents` must be a sequence")]
    DocumentsNotSequence,
}

/// Recoverable errors raised while handling one document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The structured parser rejected the document.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// A `documents` entry could not be decoded into a name and content.
    #[error("malformed entry: {0}")]
    MalformedEntry(String),

    /// The document is larger than the configured limit.
    #[error("document is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

/// Result type for the nfcheck library.
pub type Result<T> = std::result::Result<T, NfcheckError>;
