//! Bubble renderer: turns message values into bubbles on a surface

use chrono::Local;
use parlor_client::codec::decoded_len;

use crate::bubble::{Bubble, BubbleBody, BubbleId, Sender};
use crate::surface::ChatSurface;

/// Format of the timestamp shown under user and bot text bubbles
pub const TIMESTAMP_FORMAT: &str = "%H:%M";

/// Appends bubbles to a surface and keeps it scrolled to the latest one
#[derive(Debug, Clone, Copy)]
pub struct BubbleRenderer {
    markdown: bool,
}

impl Default for BubbleRenderer {
    fn default() -> Self {
        Self { markdown: true }
    }
}

impl BubbleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret text bubbles as Markdown (on by default)
    pub fn with_markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }

    /// Render a text bubble
    pub fn render_text<S>(&self, surface: &mut S, content: &str, sender: Sender) -> BubbleId
    where
        S: ChatSurface + ?Sized,
    {
        let body = BubbleBody::Text {
            content: content.to_string(),
            markdown: self.markdown,
        };
        self.push(surface, BubbleId::new(), sender, body)
    }

    /// Render an image bubble from a base64 payload.
    ///
    /// The decoded size is worked out here, once, for display.
    pub fn render_image<S>(&self, surface: &mut S, base64: &str, sender: Sender) -> BubbleId
    where
        S: ChatSurface + ?Sized,
    {
        let body = BubbleBody::Image {
            base64: base64.to_string(),
            size: decoded_len(base64),
        };
        self.push(surface, BubbleId::new(), sender, body)
    }

    /// Render the typing indicator under its reserved id.
    ///
    /// An existing indicator is replaced, so at most one is ever shown.
    pub fn render_typing<S>(&self, surface: &mut S) -> BubbleId
    where
        S: ChatSurface + ?Sized,
    {
        let id = BubbleId::typing();
        surface.remove(&id);
        self.push(surface, id, Sender::Bot, BubbleBody::Typing)
    }

    fn push<S>(&self, surface: &mut S, id: BubbleId, sender: Sender, body: BubbleBody) -> BubbleId
    where
        S: ChatSurface + ?Sized,
    {
        let rendered_at = Local::now();
        let timestamp = match (sender, &body) {
            (Sender::User | Sender::Bot, BubbleBody::Text { .. }) => {
                Some(rendered_at.format(TIMESTAMP_FORMAT).to_string())
            }
            _ => None,
        };

        surface.append(Bubble {
            id: id.clone(),
            sender,
            body,
            rendered_at,
            timestamp,
        });
        surface.scroll_to_latest();
        id
    }
}
