//! Multi-line composer that grows with its content

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// A visual row: start char index and char count (newlines excluded)
type Row = (usize, usize);

/// Multi-line text input widget
#[derive(Debug, Default)]
pub struct InputBox {
    /// Current input text
    content: String,
    /// Cursor position (character index, not byte index)
    cursor: usize,
    /// Placeholder text
    placeholder: String,
    /// Whether the input is focused
    focused: bool,
}

impl InputBox {
    /// Create a new input box
    pub fn new() -> Self {
        Self::default()
    }

    /// Set placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set focus state
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Get the current content
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Set the content, cursor at the end
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.chars().count();
    }

    /// Clear the content
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Height (including borders) needed to show all content at `width`,
    /// capped at `max_lines` text rows.
    pub fn desired_height(&self, width: u16, max_lines: u16) -> u16 {
        let rows = self.visual_rows(inner_width(width)).len() as u16;
        rows.clamp(1, max_lines.max(1)) + 2
    }

    /// Get the byte offset for a character index
    fn byte_offset(&self, char_idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    /// Split the content into rows no wider than `width` columns
    fn visual_rows(&self, width: usize) -> Vec<Row> {
        let width = width.max(1);
        let mut rows = Vec::new();
        let (mut start, mut len, mut row_width) = (0, 0, 0);

        for (i, c) in self.content.chars().enumerate() {
            if c == '\n' {
                rows.push((start, len));
                (start, len, row_width) = (i + 1, 0, 0);
                continue;
            }
            let w = c.width().unwrap_or(0);
            if row_width + w > width && len > 0 {
                rows.push((start, len));
                (start, len, row_width) = (i, 0, 0);
            }
            len += 1;
            row_width += w;
        }
        rows.push((start, len));
        rows
    }

    /// Row index and display column of the cursor
    fn cursor_position(&self, rows: &[Row]) -> (usize, usize) {
        let row = rows
            .iter()
            .rposition(|(start, _)| *start <= self.cursor)
            .unwrap_or(0);
        let (start, _) = rows[row];
        let column = self
            .content
            .chars()
            .skip(start)
            .take(self.cursor - start)
            .filter_map(|c| c.width())
            .sum();
        (row, column)
    }

    /// Char index in `row` closest to display `column`
    fn index_at_column(&self, (start, len): Row, column: usize) -> usize {
        let mut width = 0;
        for (offset, c) in self.content.chars().skip(start).take(len).enumerate() {
            let w = c.width().unwrap_or(0);
            if width + w > column {
                return start + offset;
            }
            width += w;
        }
        start + len
    }

    /// Handle an input action; returns whether it was consumed
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        let char_count = self.content.chars().count();

        match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Newline => {
                self.insert_char('\n');
                true
            }
            Action::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_at(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Delete => {
                if self.cursor < char_count {
                    self.remove_at(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    true
                } else {
                    false
                }
            }
            Action::Right => {
                if self.cursor < char_count {
                    self.cursor += 1;
                    true
                } else {
                    false
                }
            }
            Action::Up | Action::Down => {
                let rows = self.visual_rows(inner_width(width));
                let (row, column) = self.cursor_position(&rows);
                let target = match action {
                    Action::Up if row > 0 => row - 1,
                    Action::Down if row + 1 < rows.len() => row + 1,
                    _ => return false,
                };
                self.cursor = self.index_at_column(rows[target], column);
                true
            }
            Action::Home => {
                let rows = self.visual_rows(inner_width(width));
                let (row, _) = self.cursor_position(&rows);
                self.cursor = rows[row].0;
                true
            }
            Action::End => {
                let rows = self.visual_rows(inner_width(width));
                let (row, _) = self.cursor_position(&rows);
                let (start, len) = rows[row];
                self.cursor = start + len;
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let chars: Vec<char> = self.content.chars().collect();
                let mut new_cursor = self.cursor;

                // Skip trailing whitespace
                while new_cursor > 0 && chars[new_cursor - 1].is_whitespace() {
                    new_cursor -= 1;
                }
                // Skip word characters
                while new_cursor > 0 && !chars[new_cursor - 1].is_whitespace() {
                    new_cursor -= 1;
                }

                let start_byte = self.byte_offset(new_cursor);
                let end_byte = self.byte_offset(self.cursor);
                self.content.drain(start_byte..end_byte);
                self.cursor = new_cursor;
                true
            }
            Action::Paste(text) => {
                let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
                for c in normalized.chars() {
                    self.insert_char(c);
                }
                true
            }
            _ => false,
        }
    }

    fn insert_char(&mut self, c: char) {
        let byte_offset = self.byte_offset(self.cursor);
        self.content.insert(byte_offset, c);
        self.cursor += 1;
    }

    fn remove_at(&mut self, char_idx: usize) {
        let start = self.byte_offset(char_idx);
        let end = self.byte_offset(char_idx + 1);
        self.content.drain(start..end);
    }

    /// Render the input box
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.accent_style()
            } else {
                theme.border_style()
            });

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.content.is_empty() {
            Paragraph::new(self.placeholder.as_str())
                .style(theme.dim_style())
                .render(inner, buf);
        } else {
            let rows = self.visual_rows(inner.width as usize);
            let (cursor_row, _) = self.cursor_position(&rows);
            let first = (cursor_row + 1).saturating_sub(inner.height as usize);

            let lines: Vec<Line> = rows
                .iter()
                .skip(first)
                .take(inner.height as usize)
                .map(|&(start, len)| {
                    Line::from(self.content.chars().skip(start).take(len).collect::<String>())
                })
                .collect();
            Paragraph::new(lines)
                .style(theme.base_style())
                .render(inner, buf);
        }

        // Render cursor if focused
        if self.focused {
            let rows = self.visual_rows(inner.width as usize);
            let (row, column) = self.cursor_position(&rows);
            let first = (row + 1).saturating_sub(inner.height as usize);
            let x = inner.x + (column as u16).min(inner.width - 1);
            let y = inner.y + (row - first) as u16;
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_style(Style::default().bg(theme.accent));
            }
        }
    }
}

/// Text width inside the borders
fn inner_width(width: u16) -> usize {
    width.saturating_sub(2).max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_action(&Action::Char(c), 40);
        }
        input
    }

    #[test]
    fn test_newline_inserts_line_break() {
        let mut input = typed("one");
        input.handle_action(&Action::Newline, 40);
        input.handle_action(&Action::Char('2'), 40);
        assert_eq!(input.content(), "one\n2");
    }

    #[test]
    fn test_height_grows_with_content() {
        let mut input = InputBox::new();
        assert_eq!(input.desired_height(20, 8), 3);

        input.set_content("a\nb\nc");
        assert_eq!(input.desired_height(20, 8), 5);

        // 10 columns inside a 12-wide box: 25 chars wrap to 3 rows
        input.set_content("x".repeat(25));
        assert_eq!(input.desired_height(12, 8), 5);
    }

    #[test]
    fn test_height_is_capped() {
        let mut input = InputBox::new();
        input.set_content("\n".repeat(20));
        assert_eq!(input.desired_height(20, 4), 6);
    }

    #[test]
    fn test_clear_shrinks_back() {
        let mut input = InputBox::new();
        input.set_content("a\nb\nc");
        input.clear();
        assert_eq!(input.desired_height(20, 8), 3);
        assert!(input.is_empty());
    }

    #[test]
    fn test_paste_keeps_newlines() {
        let mut input = InputBox::new();
        input.handle_action(&Action::Paste("a\r\nb".into()), 40);
        assert_eq!(input.content(), "a\nb");
    }

    #[test]
    fn test_backspace_across_multibyte() {
        let mut input = typed("héé");
        input.handle_action(&Action::Backspace, 40);
        assert_eq!(input.content(), "hé");
    }

    #[test]
    fn test_up_down_keep_column() {
        let mut input = InputBox::new();
        input.set_content("abcd\nxy");
        // Cursor at end of "xy"
        input.handle_action(&Action::Up, 40);
        input.handle_action(&Action::Char('!'), 40);
        assert_eq!(input.content(), "ab!cd\nxy");

        input.handle_action(&Action::Down, 40);
        input.handle_action(&Action::Char('?'), 40);
        assert_eq!(input.content(), "ab!cd\nxy?");
    }

    #[test]
    fn test_delete_word() {
        let mut input = typed("hello big world");
        input.handle_action(&Action::DeleteWord, 40);
        assert_eq!(input.content(), "hello big ");
    }
}
