//! Bubbles: rendered chat messages

use chrono::{DateTime, Local};
use std::fmt;

/// Identifier reserved for the typing indicator
pub const TYPING_BUBBLE_ID: &str = "typing-bubble";

/// Who a bubble is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
    System,
}

impl Sender {
    /// Lowercase name, as used in the conversation view
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
            Sender::System => "system",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identifier of a bubble in the conversation view
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BubbleId(String);

impl BubbleId {
    /// A fresh random id
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The reserved typing indicator id
    pub fn typing() -> Self {
        Self(TYPING_BUBBLE_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_typing(&self) -> bool {
        self.0 == TYPING_BUBBLE_ID
    }
}

impl Default for BubbleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a bubble shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BubbleBody {
    /// Text, interpreted as Markdown when `markdown` is set
    Text { content: String, markdown: bool },
    /// Image payload in base64, displayed as a PNG data URI
    Image {
        base64: String,
        /// Decoded payload size, if the payload is valid base64
        size: Option<usize>,
    },
    /// Waiting-for-response placeholder
    Typing,
}

/// A message rendered into the conversation view. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub id: BubbleId,
    pub sender: Sender,
    pub body: BubbleBody,
    /// Wall-clock time the bubble was rendered
    pub rendered_at: DateTime<Local>,
    /// Human-readable time shown under user and bot text bubbles
    pub timestamp: Option<String>,
}

impl Bubble {
    /// Text content, if this is a text bubble
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            BubbleBody::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Image payload, if this is an image bubble
    pub fn image(&self) -> Option<&str> {
        match &self.body {
            BubbleBody::Image { base64, .. } => Some(base64),
            _ => None,
        }
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.body, BubbleBody::Typing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(BubbleId::new(), BubbleId::new());
    }

    #[test]
    fn test_typing_id_is_reserved() {
        assert_eq!(BubbleId::typing().as_str(), "typing-bubble");
        assert!(BubbleId::typing().is_typing());
        assert!(!BubbleId::new().is_typing());
    }

    #[test]
    fn test_sender_names() {
        assert_eq!(Sender::User.to_string(), "user");
        assert_eq!(Sender::Bot.to_string(), "bot");
        assert_eq!(Sender::System.to_string(), "system");
    }
}
