//! Chat session controller
//!
//! Owns the attachment slot, the session flag and the submit/clear
//! lifecycles, and mediates between front-end events and the backend.
//!
//! Network calls are split into a synchronous `begin_*` step that updates
//! the surface and returns what to send, and a `finish_*` step that applies
//! the outcome. Front-ends that must stay responsive run the call in between
//! themselves; the `submit`/`clear_conversation` helpers do all three in
//! sequence.

use std::path::Path;
use std::sync::Arc;

use parlor_client::{
    Backend, ClearAck, EncodedFile, SubmitRequest, SubmitResponse, encode_file,
};

use crate::{
    bubble::{BubbleId, Sender},
    error::{Error, Result},
    renderer::BubbleRenderer,
    session::SessionFlag,
    surface::ChatSurface,
};

/// Bot greeting shown after a fresh load or a clear
pub const DEFAULT_WELCOME: &str = "Hello! How can I help you today?";

/// System notice shown when the user starts over
pub const NEW_CONVERSATION_NOTICE: &str = "Starting new conversation...";

/// Where the controller is in its submit lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Nothing pending
    Idle,
    /// An attachment is staged for the next submit
    AttachmentPending,
    /// A submit request is in flight
    Submitting,
}

/// The chat session controller
pub struct ChatController<B: Backend + ?Sized, S: ChatSurface> {
    backend: Arc<B>,
    surface: S,
    renderer: BubbleRenderer,
    attachment: Option<EncodedFile>,
    session: SessionFlag,
    submitting: bool,
    clearing: bool,
    welcome: String,
    history_length: Option<u64>,
}

impl<B: Backend + ?Sized, S: ChatSurface> ChatController<B, S> {
    /// Create a controller wired to a backend and a surface
    pub fn new(backend: Arc<B>, surface: S, renderer: BubbleRenderer) -> Self {
        Self {
            backend,
            surface,
            renderer,
            attachment: None,
            session: SessionFlag::new(),
            submitting: false,
            clearing: false,
            welcome: DEFAULT_WELCOME.to_string(),
            history_length: None,
        }
    }

    /// Set the bot greeting
    pub fn with_welcome(mut self, welcome: impl Into<String>) -> Self {
        self.welcome = welcome.into();
        self
    }

    /// Shared handle to the backend, for running calls off the controller
    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn renderer(&self) -> &BubbleRenderer {
        &self.renderer
    }

    pub fn state(&self) -> ControllerState {
        if self.submitting {
            ControllerState::Submitting
        } else if self.attachment.is_some() {
            ControllerState::AttachmentPending
        } else {
            ControllerState::Idle
        }
    }

    /// Staged attachment, if any
    pub fn attachment(&self) -> Option<&EncodedFile> {
        self.attachment.as_ref()
    }

    pub fn session_flag(&self) -> SessionFlag {
        self.session
    }

    pub fn is_clearing(&self) -> bool {
        self.clearing
    }

    /// History length last reported by the backend
    pub fn history_length(&self) -> Option<u64> {
        self.history_length
    }

    // --- Load / unload ---

    /// Start the fresh-load reset.
    ///
    /// Returns `false` if this run already cleared the session. Otherwise
    /// marks the session as cleared and returns `true`; the caller then sends
    /// the clear and hands its outcome to
    /// [`finish_initialize`](Self::finish_initialize).
    pub fn begin_initialize(&mut self) -> bool {
        if self.session.is_set() {
            tracing::debug!("session already cleared on load, skipping");
            return false;
        }
        self.session.set();
        true
    }

    /// Apply the outcome of the fresh-load clear: greet on success, log on failure
    pub fn finish_initialize(&mut self, result: parlor_client::Result<ClearAck>) {
        match result {
            Ok(_) => {
                self.renderer
                    .render_text(&mut self.surface, &self.welcome, Sender::Bot);
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to clear session on load");
            }
        }
    }

    /// Fresh-load entry point, waiting for the backend.
    ///
    /// On the first call of a run, asks the backend to clear the session and
    /// greets the user on success; failures are only logged. Later calls do
    /// nothing until [`unload`](Self::unload). Returns whether a clear was issued.
    pub async fn initialize(&mut self) -> bool {
        if !self.begin_initialize() {
            return false;
        }
        let result = self.backend.clear_session().await;
        self.finish_initialize(result);
        true
    }

    /// Page unload: forget that this run cleared the session
    pub fn unload(&mut self) {
        self.session.clear();
    }

    // --- Attachment ---

    /// Read a file and stage it as the pending attachment
    pub async fn attach(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let result = encode_file(path).await;
        self.finish_attach(result)
    }

    /// Apply the outcome of reading an attachment.
    ///
    /// A failed read leaves no attachment pending and shows no bubble; the
    /// error is handed back for the caller to report.
    pub fn finish_attach(&mut self, result: parlor_client::Result<EncodedFile>) -> Result<()> {
        match result {
            Ok(file) => {
                tracing::debug!(file = %file.name, "attachment staged");
                self.surface.show_preview(&file);
                self.attachment = Some(file);
                Ok(())
            }
            Err(e) => {
                self.clear_attachment();
                Err(e.into())
            }
        }
    }

    /// Drop the pending attachment and its preview
    pub fn remove_attachment(&mut self) {
        self.clear_attachment();
    }

    fn clear_attachment(&mut self) {
        self.attachment = None;
        self.surface.hide_preview();
    }

    // --- Submit ---

    /// Start a submit.
    ///
    /// Returns `None` without touching anything when there is neither text
    /// nor an attachment, or when a submit is already in flight. Otherwise
    /// resets the composer and attachment, renders the user's bubbles and
    /// the typing indicator, disables submit and returns the request to send.
    pub fn begin_submit(&mut self) -> Option<SubmitRequest> {
        if self.submitting {
            tracing::debug!("submit ignored, request already in flight");
            return None;
        }

        let composer = self.surface.composer_text();
        let text = composer.trim();
        if text.is_empty() && self.attachment.is_none() {
            return None;
        }
        let text = (!text.is_empty()).then(|| text.to_string());

        self.surface.clear_composer();
        let image = self.attachment.take().map(|file| file.base64);
        self.surface.hide_preview();

        if let Some(ref base64) = image {
            self.renderer
                .render_image(&mut self.surface, base64, Sender::User);
        }
        if let Some(ref text) = text {
            self.renderer.render_text(&mut self.surface, text, Sender::User);
        }
        self.renderer.render_typing(&mut self.surface);

        self.submitting = true;
        self.surface.set_submit_enabled(false);

        Some(SubmitRequest::new(text, image))
    }

    /// Apply the outcome of a submit started with [`begin_submit`](Self::begin_submit)
    pub fn finish_submit(&mut self, result: parlor_client::Result<SubmitResponse>) {
        self.surface.remove(&BubbleId::typing());

        match result {
            Ok(response) => {
                if response.history_length.is_some() {
                    self.history_length = response.history_length;
                }
                self.renderer
                    .render_text(&mut self.surface, &response.answer, Sender::Bot);
            }
            Err(e) => {
                tracing::warn!(error = %e, "submit failed");
                let notice = format!("Error: Failed to fetch response ({})", e);
                self.renderer
                    .render_text(&mut self.surface, &notice, Sender::System);
            }
        }

        self.submitting = false;
        self.surface.set_submit_enabled(true);
    }

    /// Submit the composer and attachment, waiting for the answer.
    /// Returns whether a request was issued.
    pub async fn submit(&mut self) -> bool {
        let Some(request) = self.begin_submit() else {
            return false;
        };
        let result = self.backend.submit(&request).await;
        self.finish_submit(result);
        true
    }

    // --- Clear ---

    /// Start an explicit clear. Returns `false` if one is already running.
    pub fn begin_clear(&mut self) -> bool {
        if self.clearing {
            return false;
        }
        self.clearing = true;
        self.renderer
            .render_text(&mut self.surface, NEW_CONVERSATION_NOTICE, Sender::System);
        true
    }

    /// Apply the outcome of a clear started with [`begin_clear`](Self::begin_clear).
    ///
    /// On success every bubble except the most recently appended one is
    /// removed before the greeting is shown.
    pub fn finish_clear(&mut self, result: parlor_client::Result<ClearAck>) {
        self.clearing = false;

        match result {
            Ok(_) => {
                self.surface.retain_last();
                self.clear_attachment();
                self.history_length = None;
                self.renderer
                    .render_text(&mut self.surface, &self.welcome, Sender::Bot);
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to clear conversation");
                let notice = format!("Error: Failed to clear conversation ({})", e);
                self.renderer
                    .render_text(&mut self.surface, &notice, Sender::System);
            }
        }
    }

    /// Clear the conversation, waiting for the backend.
    /// Returns whether a clear was issued.
    pub async fn clear_conversation(&mut self) -> bool {
        if !self.begin_clear() {
            return false;
        }
        let result = self.backend.clear_session().await;
        self.finish_clear(result);
        true
    }

    // --- Image modal ---

    /// Open the zoomed view of an image bubble
    pub fn open_image(&mut self, id: &BubbleId) -> Result<()> {
        let bubble = self
            .surface
            .bubble(id)
            .ok_or_else(|| Error::UnknownBubble(id.clone()))?;
        let base64 = bubble
            .image()
            .ok_or_else(|| Error::NotAnImage(id.clone()))?
            .to_string();
        self.surface.show_image(&base64);
        Ok(())
    }

    pub fn close_image(&mut self) {
        self.surface.hide_image();
    }
}
