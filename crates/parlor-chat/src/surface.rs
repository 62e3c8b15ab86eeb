//! The surface a controller draws on.
//!
//! [`ChatSurface`] is everything the controller needs from a front-end:
//! the composer, the attachment preview, the conversation list and the
//! image modal. [`ConversationView`] is a complete in-memory surface; the
//! terminal UI builds on it, and tests drive it directly.

use parlor_client::EncodedFile;

use crate::bubble::{Bubble, BubbleId};

/// Front-end handles the chat controller is wired to
pub trait ChatSurface {
    /// Current composer content, untrimmed
    fn composer_text(&self) -> String;

    /// Empty the composer (and shrink it back to one line)
    fn clear_composer(&mut self);

    /// Enable or disable the submit control
    fn set_submit_enabled(&mut self, enabled: bool);

    /// Show the inline preview of a pending attachment
    fn show_preview(&mut self, file: &EncodedFile);

    /// Hide the attachment preview
    fn hide_preview(&mut self);

    /// Append a bubble to the conversation
    fn append(&mut self, bubble: Bubble);

    /// Remove the bubble with the given id; returns whether one was removed
    fn remove(&mut self, id: &BubbleId) -> bool;

    /// Remove every bubble except the most recently appended one
    fn retain_last(&mut self);

    /// Look up a bubble by id
    fn bubble(&self, id: &BubbleId) -> Option<&Bubble>;

    /// Scroll so the latest bubble is visible
    fn scroll_to_latest(&mut self);

    /// Open the zoomed image view
    fn show_image(&mut self, base64: &str);

    /// Close the zoomed image view
    fn hide_image(&mut self);
}

/// In-memory conversation view
#[derive(Debug, Clone)]
pub struct ConversationView {
    bubbles: Vec<Bubble>,
    composer: String,
    submit_enabled: bool,
    preview: Option<EncodedFile>,
    modal_image: Option<String>,
    follow_latest: bool,
}

impl Default for ConversationView {
    fn default() -> Self {
        Self {
            bubbles: Vec::new(),
            composer: String::new(),
            submit_enabled: true,
            preview: None,
            modal_image: None,
            follow_latest: true,
        }
    }
}

impl ConversationView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bubbles in display order
    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn last(&self) -> Option<&Bubble> {
        self.bubbles.last()
    }

    /// Replace the composer content (what the user typed)
    pub fn set_composer(&mut self, text: impl Into<String>) {
        self.composer = text.into();
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    /// Attachment currently previewed, if any
    pub fn preview(&self) -> Option<&EncodedFile> {
        self.preview.as_ref()
    }

    /// Image shown in the modal, if open
    pub fn modal_image(&self) -> Option<&str> {
        self.modal_image.as_deref()
    }

    /// Whether the view should stick to the newest bubble
    pub fn follows_latest(&self) -> bool {
        self.follow_latest
    }

    /// Stop following the newest bubble (the user scrolled away)
    pub fn detach_scroll(&mut self) {
        self.follow_latest = false;
    }

    pub fn has_typing(&self) -> bool {
        self.bubbles.iter().any(Bubble::is_typing)
    }
}

impl ChatSurface for ConversationView {
    fn composer_text(&self) -> String {
        self.composer.clone()
    }

    fn clear_composer(&mut self) {
        self.composer.clear();
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    fn show_preview(&mut self, file: &EncodedFile) {
        self.preview = Some(file.clone());
    }

    fn hide_preview(&mut self) {
        self.preview = None;
    }

    fn append(&mut self, bubble: Bubble) {
        self.bubbles.push(bubble);
    }

    fn remove(&mut self, id: &BubbleId) -> bool {
        let before = self.bubbles.len();
        self.bubbles.retain(|b| &b.id != id);
        self.bubbles.len() != before
    }

    fn retain_last(&mut self) {
        if let Some(last) = self.bubbles.pop() {
            self.bubbles.clear();
            self.bubbles.push(last);
        }
    }

    fn bubble(&self, id: &BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| &b.id == id)
    }

    fn scroll_to_latest(&mut self) {
        self.follow_latest = true;
    }

    fn show_image(&mut self, base64: &str) {
        self.modal_image = Some(base64.to_string());
    }

    fn hide_image(&mut self) {
        self.modal_image = None;
    }
}
