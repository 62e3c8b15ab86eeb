//! Centered popups: the image viewer and the attachment path prompt

use crate::Theme;
use crate::widgets::InputBox;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Maximum width for popups
const MAX_POPUP_WIDTH: u16 = 80;

/// Compute a popup of at most `width` x `height` centered in `area`
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

fn popup_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(theme.accent_bold())
        .borders(Borders::ALL)
        .border_style(theme.accent_style())
}

/// Full view of an image bubble
pub struct ImageModal<'a> {
    uri: &'a str,
    detail: &'a str,
    theme: &'a Theme,
}

impl<'a> ImageModal<'a> {
    /// `uri` is the image data URI, `detail` a short description such as
    /// its type and decoded size.
    pub fn new(uri: &'a str, detail: &'a str, theme: &'a Theme) -> Self {
        Self { uri, detail, theme }
    }
}

impl Widget for ImageModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = centered(area, MAX_POPUP_WIDTH, 9);
        Clear.render(popup, buf);

        let block = popup_block("Image", self.theme);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let max = inner.width.saturating_sub(1) as usize;
        let uri = if self.uri.chars().count() > max {
            let cut: String = self.uri.chars().take(max.saturating_sub(1)).collect();
            format!("{cut}…")
        } else {
            self.uri.to_string()
        };

        let lines = vec![
            Line::from(Span::styled(
                self.detail.to_string(),
                ratatui::style::Style::default().fg(self.theme.image),
            )),
            Line::from(""),
            Line::from(Span::styled(uri, self.theme.code_style())),
            Line::from(""),
            Line::from(Span::styled("Esc to close", self.theme.dim_style())),
        ];
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

/// Prompt for a file path, drawn around an input box
pub struct PathPrompt<'a> {
    title: &'a str,
    input: &'a InputBox,
    theme: &'a Theme,
}

impl<'a> PathPrompt<'a> {
    pub fn new(title: &'a str, input: &'a InputBox, theme: &'a Theme) -> Self {
        Self {
            title,
            input,
            theme,
        }
    }
}

impl Widget for PathPrompt<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (area.width * 2 / 3).clamp(20, MAX_POPUP_WIDTH);
        let popup = centered(area, width, 6);
        Clear.render(popup, buf);

        let block = popup_block(self.title, self.theme);
        let inner = block.inner(popup);
        block.render(popup, buf);

        if inner.height < 4 {
            self.input.render(inner, buf, self.theme);
            return;
        }
        let field = Rect::new(inner.x, inner.y, inner.width, 3);
        self.input.render(field, buf, self.theme);
        Line::from(Span::styled(
            "Enter to attach · Esc to cancel",
            self.theme.dim_style(),
        ))
        .render(Rect::new(inner.x, inner.y + 3, inner.width, 1), buf);
    }
}
