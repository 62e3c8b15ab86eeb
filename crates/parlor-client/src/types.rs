//! Wire types for the chat backend

use serde::{Deserialize, Serialize};

/// Body of a submit request: `{"query": ..., "image_base64": ...}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// User text; empty string when the user only sent an image
    pub query: String,
    /// Base64 payload of the attached image, without data-URI prefix
    pub image_base64: Option<String>,
}

impl SubmitRequest {
    /// Build a request from optional text and an optional image payload
    pub fn new(text: Option<String>, image_base64: Option<String>) -> Self {
        Self {
            query: text.unwrap_or_default(),
            image_base64,
        }
    }

    /// Whether the request carries an image
    pub fn has_image(&self) -> bool {
        self.image_base64.is_some()
    }
}

/// Backend answer to a submit request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// The bot's reply text
    #[serde(rename = "Answer")]
    pub answer: String,
    /// Number of turns the backend keeps for this session, when reported
    #[serde(
        rename = "Chat History Length",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub history_length: Option<u64>,
}

/// Acknowledgement of a clear request. The contents are not interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClearAck(pub serde_json::Value);
