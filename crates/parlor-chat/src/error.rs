//! Error types for parlor-chat

use thiserror::Error;

use crate::bubble::BubbleId;

/// Result type alias using parlor-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a chat session
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the backend client or attachment codec
    #[error(transparent)]
    Client(#[from] parlor_client::Error),

    /// No bubble with this id is in the conversation
    #[error("no bubble with id {0}")]
    UnknownBubble(BubbleId),

    /// The bubble exists but holds no image
    #[error("bubble {0} is not an image")]
    NotAnImage(BubbleId),
}

impl Error {
    /// Whether this error came from reading an attachment
    pub fn is_attachment(&self) -> bool {
        matches!(self, Error::Client(parlor_client::Error::Attachment { .. }))
    }
}
