//! Error types for parlor-client

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using parlor-client Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the chat backend or reading attachments
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the JSON we expected
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Attachment file could not be read
    #[error("failed to read attachment {}: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid endpoint configuration
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl Error {
    /// Create a status error from a code and response body
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}
