//! TUI implementation for parlor

use tokio::sync::mpsc;

use crossterm::event::EventStream;
use futures::StreamExt;
use parlor_chat::{
    Bubble, BubbleBody, BubbleId, ChatController, ChatSurface, ConversationView, Sender,
};
use parlor_client::{
    Backend, ClearAck, EncodedFile, SubmitResponse,
    codec::{IMAGE_MIME, data_uri, decoded_len},
    encode_file,
};
use parlor_tui::{
    App, Theme,
    input::{Action, event_to_action},
    widgets::{
        ChatMessage, ImageModal, InputBox, MessageLayout, MessageList, PathPrompt, Role, Spinner,
        message_list::message_lines,
    },
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

/// Status shown while the fresh-load clear is in flight
const CONNECTING: &str = "Connecting...";

/// Results of background work, sent back to the UI loop
#[derive(Debug)]
pub enum UiMessage {
    /// The fresh-load clear finished
    Loaded(parlor_client::Result<ClearAck>),
    /// A submit request finished
    Submitted(parlor_client::Result<SubmitResponse>),
    /// A clear request finished
    Cleared(parlor_client::Result<ClearAck>),
    /// An attachment was read
    Attached(parlor_client::Result<EncodedFile>),
}

/// Conversation state plus the live composer
pub struct TuiSurface {
    view: ConversationView,
    input: InputBox,
}

impl TuiSurface {
    pub fn new() -> Self {
        let mut input = InputBox::new().with_placeholder("Type a message...");
        input.set_focused(true);
        Self {
            view: ConversationView::new(),
            input,
        }
    }

    pub fn view(&self) -> &ConversationView {
        &self.view
    }
}

impl Default for TuiSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSurface for TuiSurface {
    fn composer_text(&self) -> String {
        self.input.content().to_string()
    }

    fn clear_composer(&mut self) {
        self.input.clear();
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.view.set_submit_enabled(enabled);
    }

    fn show_preview(&mut self, file: &EncodedFile) {
        self.view.show_preview(file);
    }

    fn hide_preview(&mut self) {
        self.view.hide_preview();
    }

    fn append(&mut self, bubble: Bubble) {
        self.view.append(bubble);
    }

    fn remove(&mut self, id: &BubbleId) -> bool {
        self.view.remove(id)
    }

    fn retain_last(&mut self) {
        self.view.retain_last();
    }

    fn bubble(&self, id: &BubbleId) -> Option<&Bubble> {
        self.view.bubble(id)
    }

    fn scroll_to_latest(&mut self) {
        self.view.scroll_to_latest();
    }

    fn show_image(&mut self, base64: &str) {
        self.view.show_image(base64);
    }

    fn hide_image(&mut self) {
        self.view.hide_image();
    }
}

/// "image/png · 12 KB"
fn size_label(size: Option<usize>) -> String {
    match size {
        Some(bytes) if bytes >= 1024 => format!("{} · {} KB", IMAGE_MIME, bytes.div_ceil(1024)),
        Some(bytes) => format!("{} · {} B", IMAGE_MIME, bytes),
        None => IMAGE_MIME.to_string(),
    }
}

/// Map a bubble onto its display message
fn to_message(bubble: &Bubble) -> ChatMessage {
    let role = match bubble.sender {
        Sender::User => Role::User,
        Sender::Bot => Role::Bot,
        Sender::System => Role::System,
    };
    let message = match &bubble.body {
        BubbleBody::Text { content, markdown } => ChatMessage::text(role, content, *markdown),
        BubbleBody::Image { size, .. } => ChatMessage::image(role, size_label(*size)),
        BubbleBody::Typing => ChatMessage::typing(),
    };
    message.with_timestamp(bubble.timestamp.clone())
}

/// Rendered lines of each bubble at one width.
///
/// Bubbles never change once appended, so their lines are kept until the
/// width changes or the bubble goes away. The typing indicator animates and
/// is never cached.
#[derive(Default)]
struct LineCache {
    width: usize,
    lines: HashMap<BubbleId, Vec<Line<'static>>>,
}

/// Text of the open image modal
struct ModalText {
    uri: String,
    detail: String,
}

/// TUI application state
pub struct TuiState<B: Backend + 'static> {
    controller: ChatController<B, TuiSurface>,
    /// Channel for results of spawned requests
    ui_tx: mpsc::Sender<UiMessage>,
    theme: Theme,
    /// First visible line of the message list
    scroll: usize,
    /// Current status message
    status: String,
    /// Spinner start time for animation
    spinner_start: Instant,
    /// Attachment path prompt, when open
    prompt: Option<InputBox>,
    /// Where the message list was last drawn
    messages_area: Rect,
    /// Composer growth cap
    max_input_lines: u16,
    /// Message list title
    title: String,
    /// Per-bubble rendered lines
    line_cache: LineCache,
    /// Conversation as last drawn
    layout: MessageLayout,
    /// Image modal text, built when the modal opens
    modal: Option<ModalText>,
}

impl<B: Backend + 'static> TuiState<B> {
    pub fn new(
        controller: ChatController<B, TuiSurface>,
        theme: Theme,
        max_input_lines: u16,
        ui_tx: mpsc::Sender<UiMessage>,
    ) -> Self {
        Self {
            controller,
            ui_tx,
            theme,
            scroll: 0,
            status: "Ready".to_string(),
            spinner_start: Instant::now(),
            prompt: None,
            messages_area: Rect::default(),
            max_input_lines,
            title: "parlor".to_string(),
            line_cache: LineCache::default(),
            layout: MessageLayout::new(),
            modal: None,
        }
    }

    /// Set the message list title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn view(&self) -> &ConversationView {
        self.controller.surface().view()
    }

    fn submitting(&self) -> bool {
        !self.view().submit_enabled()
    }

    /// Apply the result of a spawned request
    pub fn handle_message(&mut self, msg: UiMessage) {
        match msg {
            UiMessage::Loaded(result) => {
                if self.status == CONNECTING {
                    self.status = "Ready".to_string();
                }
                self.controller.finish_initialize(result);
            }
            UiMessage::Submitted(result) => {
                self.status = match &result {
                    Ok(_) => "Ready".to_string(),
                    Err(_) => "Request failed".to_string(),
                };
                self.controller.finish_submit(result);
            }
            UiMessage::Cleared(result) => {
                self.status = match &result {
                    Ok(_) => "New conversation".to_string(),
                    Err(_) => "Clear failed".to_string(),
                };
                self.controller.finish_clear(result);
            }
            UiMessage::Attached(result) => {
                if let Err(e) = self.controller.finish_attach(result) {
                    tracing::warn!(error = %e, "attachment failed");
                    self.status = format!("Attachment failed: {}", e);
                } else if let Some(file) = self.controller.attachment() {
                    self.status = format!("Attached {}", file.name);
                }
            }
        }
    }

    /// Handle an input action. Returns `false` when the UI should exit.
    pub fn handle_action(&mut self, action: Action, width: u16) -> bool {
        if matches!(action, Action::Quit | Action::Interrupt) {
            return false;
        }

        // Image modal swallows everything but close
        if self.view().modal_image().is_some() {
            if matches!(action, Action::Escape | Action::Submit | Action::Click { .. }) {
                self.controller.close_image();
                self.modal = None;
            }
            return true;
        }

        // Path prompt
        if let Some(prompt) = self.prompt.as_mut() {
            match action {
                Action::Submit => {
                    let path = prompt.content().trim().to_string();
                    self.prompt = None;
                    if !path.is_empty() {
                        self.spawn_attach(PathBuf::from(path));
                    }
                }
                Action::Escape => self.prompt = None,
                Action::Newline => {}
                other => {
                    prompt.handle_action(&other, width);
                }
            }
            return true;
        }

        match action {
            Action::Submit => {
                if self.view().submit_enabled() {
                    self.spawn_submit();
                }
            }
            Action::Attach => {
                let mut prompt = InputBox::new().with_placeholder("/path/to/image.png");
                prompt.set_focused(true);
                self.prompt = Some(prompt);
            }
            Action::RemoveAttachment => {
                if self.controller.attachment().is_some() {
                    self.controller.remove_attachment();
                    self.status = "Attachment removed".to_string();
                }
            }
            Action::Clear => self.spawn_clear(),
            Action::Click { column, row } => self.click(column, row),
            Action::PageUp => self.scroll_up(10),
            Action::PageDown => self.scroll_down(10),
            Action::ScrollUp => self.scroll_up(3),
            Action::ScrollDown => self.scroll_down(3),
            other => {
                self.controller
                    .surface_mut()
                    .input
                    .handle_action(&other, width);
            }
        }
        true
    }

    /// Reset the backend session once per run without blocking input
    pub fn spawn_initialize(&mut self) {
        if !self.controller.begin_initialize() {
            return;
        }
        self.status = CONNECTING.to_string();

        let backend = self.controller.backend();
        let tx = self.ui_tx.clone();
        tokio::spawn(async move {
            let result = backend.clear_session().await;
            let _ = tx.send(UiMessage::Loaded(result)).await;
        });
    }

    fn spawn_submit(&mut self) {
        let Some(request) = self.controller.begin_submit() else {
            return;
        };
        self.spinner_start = Instant::now();
        self.status = "Waiting for response...".to_string();

        let backend = self.controller.backend();
        let tx = self.ui_tx.clone();
        tokio::spawn(async move {
            let result = backend.submit(&request).await;
            let _ = tx.send(UiMessage::Submitted(result)).await;
        });
    }

    fn spawn_clear(&mut self) {
        if !self.controller.begin_clear() {
            return;
        }
        self.status = "Clearing...".to_string();

        let backend = self.controller.backend();
        let tx = self.ui_tx.clone();
        tokio::spawn(async move {
            let result = backend.clear_session().await;
            let _ = tx.send(UiMessage::Cleared(result)).await;
        });
    }

    fn spawn_attach(&mut self, path: PathBuf) {
        self.status = format!("Reading {}...", path.display());
        let tx = self.ui_tx.clone();
        tokio::spawn(async move {
            let result = encode_file(&path).await;
            let _ = tx.send(UiMessage::Attached(result)).await;
        });
    }

    /// Open the image under the pointer, if any
    fn click(&mut self, column: u16, row: u16) {
        let area = self.messages_area;
        if !area.contains(ratatui::layout::Position::new(column, row)) {
            return;
        }
        let line = self.scroll + (row - area.y) as usize;
        let Some(bubble) = self
            .layout
            .message_at_line(line)
            .and_then(|index| self.view().bubbles().get(index))
        else {
            return;
        };
        let BubbleBody::Image { base64, size } = &bubble.body else {
            return;
        };
        let text = ModalText {
            uri: data_uri(base64),
            detail: size_label(*size),
        };
        let id = bubble.id.clone();
        match self.controller.open_image(&id) {
            Ok(()) => self.modal = Some(text),
            Err(e) => tracing::debug!(error = %e, "click did not open an image"),
        }
    }

    fn scroll_up(&mut self, lines: usize) {
        self.controller.surface_mut().view.detach_scroll();
        self.scroll = self.scroll.saturating_sub(lines);
    }

    fn scroll_down(&mut self, lines: usize) {
        // Clamped (and re-attached at the bottom) during render
        self.scroll = self.scroll.saturating_add(lines);
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();
        let input_height = self
            .controller
            .surface()
            .input
            .desired_height(size.width, self.max_input_lines);
        let preview_height = u16::from(self.view().preview().is_some());

        // Layout: messages (flex), status bar (1), preview (0/1), input (grows)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(preview_height),
                Constraint::Length(input_height),
            ])
            .split(size);

        self.render_messages(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
        self.render_preview(frame, chunks[2]);

        let surface = self.controller.surface();
        surface
            .input
            .render(chunks[3], frame.buffer_mut(), &self.theme);

        if let Some(ref prompt) = self.prompt {
            frame.render_widget(PathPrompt::new("Attach image", prompt, &self.theme), size);
        }

        match self.controller.surface().view().modal_image() {
            Some(base64) => {
                let text = self.modal.get_or_insert_with(|| ModalText {
                    uri: data_uri(base64),
                    detail: size_label(decoded_len(base64)),
                });
                frame.render_widget(ImageModal::new(&text.uri, &text.detail, &self.theme), size);
            }
            None => self.modal = None,
        }
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let title = match self.controller.history_length() {
            Some(len) => format!(" {} │ {} messages ", self.title, len),
            None => format!(" {} ", self.title),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);

        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.messages_area = inner;

        if inner.height == 0 {
            return;
        }

        self.layout_messages(inner.width as usize);
        let content_height = self.layout.height();
        let bottom = content_height.saturating_sub(inner.height as usize);

        if self.view().follows_latest() {
            self.scroll = bottom;
        } else if self.scroll >= bottom {
            self.scroll = bottom;
            self.controller.surface_mut().scroll_to_latest();
        }

        let list = MessageList::new(&self.layout, &self.theme).scroll(self.scroll);
        frame.render_widget(list, inner);

        // Render scrollbar if content overflows
        if content_height > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            let mut scrollbar_state = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);

            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    /// Lay out the conversation at `width`, reusing cached bubble lines
    fn layout_messages(&mut self, width: usize) {
        let bubbles = self.controller.surface().view().bubbles();
        let cache = &mut self.line_cache;
        if cache.width != width {
            cache.lines.clear();
            cache.width = width;
        }

        // Entries for bubbles that were removed are dropped here
        let mut previous = std::mem::take(&mut cache.lines);
        let mut layout = MessageLayout::new();
        for bubble in bubbles {
            let render = || {
                message_lines(&to_message(bubble), &self.theme, width, self.spinner_start)
            };
            if bubble.is_typing() {
                layout.push(render());
                continue;
            }
            let lines = previous.remove(&bubble.id).unwrap_or_else(render);
            layout.push(lines.clone());
            cache.lines.insert(bubble.id.clone(), lines);
        }
        self.layout = layout;
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.submitting() {
            // Use animated spinner while waiting
            let spinner =
                Spinner::new(&self.status, &self.theme).with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
            return;
        }

        let mut left_content = self.status.clone();
        if let Some(len) = self.controller.history_length() {
            left_content.push_str(&format!(" │ history: {}", len));
        }
        let right_content = "Ctrl+O: attach │ Ctrl+L: new chat │ Ctrl+C: quit";

        let left_width = left_content.chars().count();
        let right_width = right_content.chars().count();
        let available = area.width as usize;

        // Build the line with spacing
        let line = if left_width + right_width + 2 <= available {
            let spacing = available - left_width - right_width;
            Line::from(vec![
                Span::styled(left_content, self.theme.dim_style()),
                Span::raw(" ".repeat(spacing)),
                Span::styled(right_content, Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::from(Span::styled(left_content, self.theme.dim_style()))
        };

        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_preview(&self, frame: &mut Frame, area: Rect) {
        let Some(file) = self.view().preview() else {
            return;
        };
        let line = Line::from(vec![
            Span::styled(
                format!(" ▣ {} ", file.name),
                Style::default().fg(self.theme.image),
            ),
            Span::styled(size_label(Some(file.size)), self.theme.dim_style()),
            Span::styled("  (Ctrl+X to remove)", self.theme.dim_style()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Run the TUI application
pub async fn run_tui<B: Backend + 'static>(
    controller: ChatController<B, TuiSurface>,
    theme: Theme,
    max_input_lines: u16,
    title: String,
) -> anyhow::Result<()> {
    let mut app = App::new()?;

    // Create channels
    let (ui_tx, mut ui_rx) = mpsc::channel::<UiMessage>(32);

    // Create state
    let mut state = TuiState::new(controller, theme, max_input_lines, ui_tx).with_title(title);

    // Fresh load: reset the backend session once per run
    state.spawn_initialize();

    // Event stream
    let mut event_stream = EventStream::new();

    // Tick interval for animations
    let mut tick_interval = tokio::time::interval(app.tick_rate());

    let result = loop {
        // Render
        app.draw(|frame| state.render(frame))?;

        let area_width = app.size()?.width;

        tokio::select! {
            biased;

            // Results of spawned requests
            msg = ui_rx.recv() => {
                if let Some(msg) = msg {
                    state.handle_message(msg);
                }
            }

            // Handle terminal events
            event = event_stream.next() => {
                match event {
                    Some(Ok(event)) => {
                        if let Some(action) = event_to_action(event) {
                            if !state.handle_action(action, area_width) {
                                break Ok(());
                            }
                        }
                    }
                    Some(Err(e)) => {
                        break Err(anyhow::anyhow!("Event error: {}", e));
                    }
                    None => {
                        break Ok(());
                    }
                }
            }

            // Tick for animations (spinner updates)
            _ = tick_interval.tick() => {}
        }
    };

    // Leaving the page
    state.controller.unload();
    tracing::debug!("ui closed");

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use parlor_chat::BubbleRenderer;
    use parlor_client::SubmitRequest;
    use ratatui::{Terminal, backend::TestBackend};
    use std::sync::Arc;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct MockBackend {
        requests: Mutex<Vec<SubmitRequest>>,
        /// When set, clears wait for a notification before answering
        clear_gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl Backend for MockBackend {
        async fn submit(&self, request: &SubmitRequest) -> parlor_client::Result<SubmitResponse> {
            self.requests.lock().push(request.clone());
            Ok(SubmitResponse {
                answer: "pong".into(),
                history_length: Some(2),
            })
        }

        async fn clear_session(&self) -> parlor_client::Result<ClearAck> {
            if let Some(gate) = &self.clear_gate {
                gate.notified().await;
            }
            Ok(ClearAck(serde_json::json!({})))
        }
    }

    fn state() -> (TuiState<MockBackend>, mpsc::Receiver<UiMessage>) {
        state_with(MockBackend::default())
    }

    fn state_with(backend: MockBackend) -> (TuiState<MockBackend>, mpsc::Receiver<UiMessage>) {
        let controller = ChatController::new(
            Arc::new(backend),
            TuiSurface::new(),
            BubbleRenderer::new(),
        );
        let (tx, rx) = mpsc::channel(8);
        (TuiState::new(controller, Theme::dark(), 8, tx), rx)
    }

    fn type_text(state: &mut TuiState<MockBackend>, text: &str) {
        for c in text.chars() {
            state.handle_action(Action::Char(c), 80);
        }
    }

    fn draw(state: &mut TuiState<MockBackend>) {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| state.render(frame)).unwrap();
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let (mut state, mut rx) = state();
        type_text(&mut state, "ping");
        assert!(state.handle_action(Action::Submit, 80));

        // User bubble and typing indicator are up, composer is empty
        assert_eq!(state.view().len(), 2);
        assert!(state.view().has_typing());
        assert!(state.controller.surface().input.is_empty());
        assert!(state.submitting());

        let msg = rx.recv().await.unwrap();
        state.handle_message(msg);

        let last = state.view().last().unwrap();
        assert_eq!(last.text(), Some("pong"));
        assert!(!state.view().has_typing());
        assert!(!state.submitting());
        assert_eq!(state.controller.history_length(), Some(2));
    }

    #[tokio::test]
    async fn test_enter_while_waiting_is_ignored() {
        let (mut state, mut rx) = state();
        type_text(&mut state, "one");
        state.handle_action(Action::Submit, 80);
        type_text(&mut state, "two");
        state.handle_action(Action::Submit, 80);

        // The second message stays in the composer
        assert_eq!(state.controller.surface().input.content(), "two");
        state.handle_message(rx.recv().await.unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_attach_via_prompt() {
        let (mut state, mut rx) = state();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"\x89PNG").unwrap();

        state.handle_action(Action::Attach, 80);
        assert!(state.prompt.is_some());
        state.handle_action(Action::Paste(file.path().display().to_string()), 80);
        state.handle_action(Action::Submit, 80);
        assert!(state.prompt.is_none());

        state.handle_message(rx.recv().await.unwrap());
        assert!(state.controller.attachment().is_some());
        assert!(state.view().preview().is_some());

        state.handle_action(Action::RemoveAttachment, 80);
        assert!(state.controller.attachment().is_none());
        assert!(state.view().preview().is_none());
    }

    #[tokio::test]
    async fn test_attach_failure_reports_in_status() {
        let (mut state, mut rx) = state();
        state.handle_action(Action::Attach, 80);
        state.handle_action(Action::Paste("/no/such/file.png".into()), 80);
        state.handle_action(Action::Submit, 80);

        state.handle_message(rx.recv().await.unwrap());
        assert!(state.status.starts_with("Attachment failed"));
        assert!(state.view().is_empty());
    }

    #[tokio::test]
    async fn test_click_opens_image() {
        let (mut state, mut rx) = state();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"\x89PNG").unwrap();
        state.spawn_attach(file.path().to_path_buf());
        state.handle_message(rx.recv().await.unwrap());
        state.handle_action(Action::Submit, 80);
        state.handle_message(rx.recv().await.unwrap());

        draw(&mut state);
        let area = state.messages_area;
        // The image bubble is first: header, then its card
        state.handle_action(
            Action::Click {
                column: area.x + 3,
                row: area.y + 2,
            },
            80,
        );
        assert!(state.view().modal_image().is_some());

        state.handle_action(Action::Escape, 80);
        assert!(state.view().modal_image().is_none());
    }

    #[tokio::test]
    async fn test_input_handled_while_load_clear_pending() {
        let gate = Arc::new(Notify::new());
        let (mut state, mut rx) = state_with(MockBackend {
            clear_gate: Some(Arc::clone(&gate)),
            ..MockBackend::default()
        });

        state.spawn_initialize();
        tokio::task::yield_now().await;
        assert_eq!(state.status, CONNECTING);

        // The backend has not answered yet, but keys still land
        type_text(&mut state, "hi");
        draw(&mut state);
        assert_eq!(state.controller.surface().input.content(), "hi");
        assert!(rx.try_recv().is_err());
        assert!(state.view().is_empty());

        // A second load in the same run sends nothing
        state.spawn_initialize();

        gate.notify_one();
        state.handle_message(rx.recv().await.unwrap());
        assert_eq!(state.view().len(), 1);
        assert_eq!(state.view().last().unwrap().sender, Sender::Bot);
        assert_eq!(state.controller.surface().input.content(), "hi");
        assert_eq!(state.status, "Ready");
        assert!(rx.try_recv().is_err());
        assert!(!state.handle_action(Action::Quit, 80));
    }

    #[test]
    fn test_quit_keys() {
        let (mut state, _rx) = state();
        assert!(!state.handle_action(Action::Quit, 80));
        assert!(!state.handle_action(Action::Interrupt, 80));
    }

    #[test]
    fn test_size_label() {
        assert_eq!(size_label(Some(3)), "image/png · 3 B");
        assert_eq!(size_label(Some(3072)), "image/png · 3 KB");
        assert_eq!(size_label(None), "image/png");
    }

    #[tokio::test]
    async fn test_bubble_lines_are_reused_between_frames() {
        let (mut state, mut rx) = state();
        type_text(&mut state, "ping");
        state.handle_action(Action::Submit, 80);
        draw(&mut state);

        // The typing indicator is drawn but never cached
        assert_eq!(state.view().len(), 2);
        assert_eq!(state.line_cache.lines.len(), 1);
        let user_id = state.view().bubbles()[0].id.clone();
        let first = state.line_cache.lines[&user_id].clone();

        state.handle_message(rx.recv().await.unwrap());
        draw(&mut state);
        assert_eq!(state.line_cache.lines.len(), 2);
        assert_eq!(state.line_cache.lines[&user_id], first);
        assert_eq!(state.layout.height(), 6);

        // Cleared bubbles leave the cache
        state.handle_action(Action::Clear, 80);
        state.handle_message(rx.recv().await.unwrap());
        draw(&mut state);
        assert!(!state.line_cache.lines.contains_key(&user_id));
        assert_eq!(state.line_cache.lines.len(), state.view().len());
    }
}
