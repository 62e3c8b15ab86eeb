//! Message list widget for displaying chat bubbles

use crate::theme::Theme;
use crate::widgets::markdown::render_text;
use crate::widgets::spinner::frame_at;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use std::ops::Range;
use std::time::Instant;
use unicode_width::UnicodeWidthStr;

/// Fixed width of the card shown in place of an image
pub const IMAGE_CARD_WIDTH: usize = 30;

/// Who a message is from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
    System,
}

/// What a message shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Text, optionally interpreted as Markdown
    Text { content: String, markdown: bool },
    /// An image, shown as a card with a short label
    Image { label: String },
    /// Animated waiting indicator
    Typing,
}

/// A single message in the chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub body: MessageBody,
    /// Display time, e.g. "14:05"
    pub timestamp: Option<String>,
}

impl ChatMessage {
    /// Create a text message
    pub fn text(role: Role, content: impl Into<String>, markdown: bool) -> Self {
        Self {
            role,
            body: MessageBody::Text {
                content: content.into(),
                markdown,
            },
            timestamp: None,
        }
    }

    /// Create an image message
    pub fn image(role: Role, label: impl Into<String>) -> Self {
        Self {
            role,
            body: MessageBody::Image {
                label: label.into(),
            },
            timestamp: None,
        }
    }

    /// Create the typing indicator
    pub fn typing() -> Self {
        Self {
            role: Role::Bot,
            body: MessageBody::Typing,
            timestamp: None,
        }
    }

    /// Attach a display timestamp
    pub fn with_timestamp(mut self, timestamp: Option<String>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// System notice reporting a failure ("Error: ...")
    pub fn is_error(&self) -> bool {
        self.role == Role::System
            && matches!(&self.body, MessageBody::Text { content, .. } if content.starts_with("Error:"))
    }
}

/// Render one message: sender header, body, then a blank separator line
pub fn message_lines(
    msg: &ChatMessage,
    theme: &Theme,
    width: usize,
    spinner_start: Instant,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    // Sender header
    let (label, style, prefix) = match msg.role {
        Role::User => (
            "You",
            Style::default().fg(theme.user).add_modifier(Modifier::BOLD),
            "▶ ",
        ),
        Role::Bot => (
            "Bot",
            Style::default().fg(theme.bot).add_modifier(Modifier::BOLD),
            "◀ ",
        ),
        Role::System if msg.is_error() => (
            "Error",
            theme.error_style().add_modifier(Modifier::BOLD),
            "✖ ",
        ),
        Role::System => ("System", theme.system_style(), "● "),
    };
    let mut header = vec![Span::styled(format!("{prefix}{label}"), style)];
    if let Some(ref ts) = msg.timestamp {
        header.push(Span::styled(format!("  {ts}"), theme.dim_style()));
    }
    lines.push(Line::from(header));

    let content_width = width.saturating_sub(2);
    match &msg.body {
        MessageBody::Text { content, markdown } => {
            // System notices are drawn in a single color
            let override_style = if msg.is_error() {
                Some(theme.error_style())
            } else if msg.role == Role::System {
                Some(theme.system_style())
            } else {
                None
            };
            for line in render_text(content, theme, content_width, *markdown) {
                let mut spans = vec![Span::raw("  ")];
                spans.extend(line.spans.into_iter().map(|s| {
                    Span::styled(s.content.into_owned(), override_style.unwrap_or(s.style))
                }));
                lines.push(Line::from(spans));
            }
        }
        MessageBody::Image { label } => {
            lines.extend(image_card(label, theme, content_width));
        }
        MessageBody::Typing => {
            lines.push(Line::from(Span::styled(
                format!("  {} Waiting for response...", frame_at(spinner_start)),
                theme.accent_style(),
            )));
        }
    }

    // Empty line between messages
    lines.push(Line::from(""));

    lines
}

/// The rendered lines of a conversation at one width, with the line range
/// each message occupies
#[derive(Debug, Clone, Default)]
pub struct MessageLayout {
    lines: Vec<Line<'static>>,
    ranges: Vec<Range<usize>>,
}

impl MessageLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render every message from scratch
    pub fn build(
        messages: &[ChatMessage],
        theme: &Theme,
        width: usize,
        spinner_start: Instant,
    ) -> Self {
        let mut layout = Self::new();
        for msg in messages {
            layout.push(message_lines(msg, theme, width, spinner_start));
        }
        layout
    }

    /// Append the lines of the next message
    pub fn push(&mut self, lines: Vec<Line<'static>>) {
        let start = self.lines.len();
        self.lines.extend(lines);
        self.ranges.push(start..self.lines.len());
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    /// Total height in lines
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Index of the message drawn at `line` (absolute, scroll included)
    pub fn message_at_line(&self, line: usize) -> Option<usize> {
        self.ranges.iter().position(|r| r.contains(&line))
    }
}

/// Widget for displaying a laid-out conversation
pub struct MessageList<'a> {
    layout: &'a MessageLayout,
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> MessageList<'a> {
    /// Create a new message list
    pub fn new(layout: &'a MessageLayout, theme: &'a Theme) -> Self {
        Self {
            layout,
            theme,
            scroll: 0,
        }
    }

    /// Set scroll offset (first visible line)
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

/// Boxed card standing in for an image
fn image_card(label: &str, theme: &Theme, max_width: usize) -> Vec<Line<'static>> {
    let inner = IMAGE_CARD_WIDTH.min(max_width.saturating_sub(2)).max(4) - 2;
    let style = Style::default().fg(theme.image);
    let row = |text: &str| {
        let text: String = fit(text, inner);
        let pad = inner.saturating_sub(text.width());
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("│ {text}{} │", " ".repeat(pad)), style),
        ])
    };
    vec![
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("┌{}┐", "─".repeat(inner + 2)), style),
        ]),
        row(&format!("▣ {label}")),
        row("click to view"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("└{}┘", "─".repeat(inner + 2)), style),
        ]),
    ]
}

/// Truncate to at most `width` columns
fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    for c in text.chars() {
        if out.width() + unicode_width::UnicodeWidthChar::width(c).unwrap_or(0) > width {
            break;
        }
        out.push(c);
    }
    out
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let visible_lines: Vec<Line> = self
            .layout
            .lines()
            .iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .cloned()
            .collect();

        Paragraph::new(visible_lines)
            .style(self.theme.base_style())
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(messages: &[ChatMessage], width: usize) -> MessageLayout {
        MessageLayout::build(messages, &Theme::dark(), width, Instant::now())
    }

    fn rendered_rows(messages: &[ChatMessage], width: u16, height: u16) -> Vec<String> {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        let layout = layout(messages, width as usize);
        MessageList::new(&layout, &theme).render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_text_message_has_header_and_body() {
        let messages = vec![
            ChatMessage::text(Role::User, "hello", false).with_timestamp(Some("09:30".into())),
        ];
        let rows = rendered_rows(&messages, 40, 4);
        assert_eq!(rows[0], "▶ You  09:30");
        assert_eq!(rows[1], "  hello");
        assert_eq!(rows[2], "");
    }

    #[test]
    fn test_typing_indicator() {
        let rows = rendered_rows(&[ChatMessage::typing()], 40, 3);
        assert_eq!(rows[0], "◀ Bot");
        assert!(rows[1].contains("Waiting for response..."), "got: {}", rows[1]);
    }

    #[test]
    fn test_image_card_height() {
        let messages = vec![ChatMessage::image(Role::User, "image/png · 2 KB")];
        // header + 4 card lines + separator
        assert_eq!(layout(&messages, 80).height(), 6);
        let rows = rendered_rows(&messages, 80, 6);
        assert!(rows[2].contains("image/png · 2 KB"), "got: {}", rows[2]);
    }

    #[test]
    fn test_height_counts_wrapped_lines() {
        let messages = vec![ChatMessage::text(Role::Bot, "aaaa bbbb", false)];
        // content width is 4: header + 2 lines + separator
        assert_eq!(layout(&messages, 6).height(), 4);
    }

    #[test]
    fn test_message_at_line() {
        let messages = vec![
            ChatMessage::text(Role::System, "hi", false),
            ChatMessage::image(Role::User, "image/png · 1 KB"),
        ];
        let layout = layout(&messages, 80);
        assert_eq!(layout.message_at_line(0), Some(0));
        assert_eq!(layout.message_at_line(2), Some(0));
        assert_eq!(layout.message_at_line(3), Some(1));
        assert_eq!(layout.message_at_line(8), Some(1));
        assert_eq!(layout.message_at_line(9), None);
    }

    #[test]
    fn test_pushed_lines_extend_layout() {
        let theme = Theme::dark();
        let first = ChatMessage::text(Role::User, "one", false);
        let lines = message_lines(&first, &theme, 40, Instant::now());

        let mut layout = MessageLayout::new();
        layout.push(lines.clone());
        layout.push(lines);
        assert_eq!(layout.height(), 6);
        assert_eq!(layout.message_at_line(3), Some(1));
    }

    #[test]
    fn test_error_notice_uses_error_style() {
        let theme = Theme::dark();
        let error = ChatMessage::text(Role::System, "Error: Failed to fetch response (x)", false);
        let notice = ChatMessage::text(Role::System, "Starting new conversation...", false);
        assert!(error.is_error());
        assert!(!notice.is_error());
        assert!(!ChatMessage::text(Role::Bot, "Error: quoted", false).is_error());

        let lines = message_lines(&error, &theme, 80, Instant::now());
        assert_eq!(lines[0].spans[0].content, "✖ Error");
        assert_eq!(lines[0].spans[0].style.fg, Some(theme.error));
        assert!(lines[1].spans.iter().skip(1).all(|s| s.style.fg == Some(theme.error)));

        let lines = message_lines(&notice, &theme, 80, Instant::now());
        assert_eq!(lines[0].spans[0].content, "● System");
        assert_eq!(lines[1].spans[1].style.fg, Some(theme.system));
    }

    #[test]
    fn test_scroll_skips_lines() {
        let messages = vec![
            ChatMessage::text(Role::User, "first", false),
            ChatMessage::text(Role::Bot, "second", false),
        ];
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);
        let layout = layout(&messages, 20);
        MessageList::new(&layout, &theme)
            .scroll(3)
            .render(area, &mut buf);
        let row: String = (0..20).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert_eq!(row.trim_end(), "◀ Bot");
    }
}
