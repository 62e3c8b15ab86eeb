//! Text rendering for bubbles: Markdown when available, plain otherwise

use crate::theme::Theme;
use ratatui::text::{Line, Span};

/// Whether this build can interpret Markdown
pub const MARKDOWN_AVAILABLE: bool = cfg!(feature = "markdown");

/// Render bubble text into lines no wider than `width`.
///
/// Falls back to plain wrapped text when `markdown` is off or the
/// `markdown` feature is not compiled in.
pub fn render_text<'a>(text: &str, theme: &Theme, width: usize, markdown: bool) -> Vec<Line<'a>> {
    if markdown {
        if let Some(lines) = interpret(text, theme, width) {
            return lines;
        }
    }
    render_plain(text, theme.base_style(), width)
}

#[cfg(feature = "markdown")]
fn interpret<'a>(text: &str, theme: &Theme, width: usize) -> Option<Vec<Line<'a>>> {
    Some(render_markdown(text, theme, width))
}

#[cfg(not(feature = "markdown"))]
fn interpret<'a>(_text: &str, _theme: &Theme, _width: usize) -> Option<Vec<Line<'a>>> {
    None
}

/// Plain text, wrapped, with line breaks preserved
pub fn render_plain<'a>(
    text: &str,
    style: ratatui::style::Style,
    width: usize,
) -> Vec<Line<'a>> {
    let width = width.max(1);
    text.split('\n')
        .flat_map(|raw| {
            let wrapped = textwrap::wrap(raw, width);
            if wrapped.is_empty() {
                vec![Line::from("")]
            } else {
                wrapped
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l.into_owned(), style)))
                    .collect()
            }
        })
        .collect()
}

/// Convert markdown text to styled ratatui Lines.
///
/// Soft breaks are rendered as line breaks, links show their target
/// after the link text, and raw HTML is kept as typed.
#[cfg(feature = "markdown")]
pub fn render_markdown<'a>(text: &str, theme: &Theme, width: usize) -> Vec<Line<'a>> {
    use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
    use ratatui::style::{Modifier, Style};

    let mut lines: Vec<Line<'a>> = Vec::new();
    let mut current_line: Vec<Span<'a>> = Vec::new();
    let mut current_style = theme.base_style();
    let mut in_code_block = false;
    let mut code_block_content = String::new();
    // Next item number per open list; `None` for bullet lists
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut link_target: Option<String> = None;

    let flush = |lines: &mut Vec<Line<'a>>, current: &mut Vec<Span<'a>>| {
        if !current.is_empty() {
            lines.push(Line::from(std::mem::take(current)));
        }
    };

    for event in Parser::new(text) {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. } => {
                    flush(&mut lines, &mut current_line);
                    current_style = match level {
                        HeadingLevel::H1 => theme
                            .accent_style()
                            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                        HeadingLevel::H2 => theme.accent_style().add_modifier(Modifier::BOLD),
                        _ => theme.accent_style(),
                    };
                }
                Tag::Paragraph => flush(&mut lines, &mut current_line),
                Tag::CodeBlock(_) => {
                    in_code_block = true;
                    code_block_content.clear();
                    flush(&mut lines, &mut current_line);
                }
                Tag::List(start) => lists.push(start),
                Tag::Item => {
                    flush(&mut lines, &mut current_line);
                    let indent = "  ".repeat(lists.len().saturating_sub(1));
                    let marker = match lists.last_mut() {
                        Some(Some(n)) => {
                            let marker = format!("{}{}. ", indent, n);
                            *n += 1;
                            marker
                        }
                        _ => format!("{}• ", indent),
                    };
                    current_line.push(Span::styled(marker, theme.dim_style()));
                }
                Tag::Emphasis => current_style = current_style.add_modifier(Modifier::ITALIC),
                Tag::Strong => current_style = current_style.add_modifier(Modifier::BOLD),
                Tag::Strikethrough => {
                    current_style = current_style.add_modifier(Modifier::CROSSED_OUT)
                }
                Tag::Link { dest_url, .. } => {
                    link_target = Some(dest_url.to_string());
                    current_style = Style::default()
                        .fg(theme.link)
                        .add_modifier(Modifier::UNDERLINED);
                }
                _ => {}
            },
            Event::End(tag_end) => match tag_end {
                TagEnd::Heading(_) => {
                    flush(&mut lines, &mut current_line);
                    current_style = theme.base_style();
                }
                TagEnd::Paragraph => {
                    flush(&mut lines, &mut current_line);
                    lines.push(Line::from("")); // Blank line after paragraph
                }
                TagEnd::CodeBlock => {
                    in_code_block = false;
                    let code_style = Style::default().fg(theme.code).add_modifier(Modifier::DIM);
                    let max = width.saturating_sub(4);
                    for code_line in code_block_content.lines() {
                        let display_line = if code_line.chars().count() > max {
                            let cut: String = code_line.chars().take(max.saturating_sub(1)).collect();
                            format!("  {}…", cut)
                        } else {
                            format!("  {}", code_line)
                        };
                        lines.push(Line::from(Span::styled(display_line, code_style)));
                    }
                    lines.push(Line::from(""));
                }
                TagEnd::HtmlBlock => lines.push(Line::from("")),
                TagEnd::List(_) => {
                    lists.pop();
                    if lists.is_empty() {
                        lines.push(Line::from(""));
                    }
                }
                TagEnd::Item => flush(&mut lines, &mut current_line),
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                    current_style = theme.base_style();
                }
                TagEnd::Link => {
                    if let Some(target) = link_target.take() {
                        current_line.push(Span::styled(format!(" ({})", target), theme.dim_style()));
                    }
                    current_style = theme.base_style();
                }
                _ => {}
            },
            Event::Text(text) => {
                if in_code_block {
                    code_block_content.push_str(&text);
                } else {
                    current_line.push(Span::styled(text.to_string(), current_style));
                }
            }
            Event::Code(code) => {
                let code_style = Style::default().fg(theme.code).add_modifier(Modifier::BOLD);
                current_line.push(Span::styled(format!("`{}`", code), code_style));
            }
            Event::Html(html) => {
                for raw in html.lines() {
                    current_line.push(Span::styled(raw.to_string(), current_style));
                    flush(&mut lines, &mut current_line);
                }
            }
            Event::InlineHtml(html) => {
                current_line.push(Span::styled(html.to_string(), current_style));
            }
            // Line breaks are enabled: a single newline in the source breaks the line
            Event::SoftBreak | Event::HardBreak => flush(&mut lines, &mut current_line),
            _ => {}
        }
    }

    flush(&mut lines, &mut current_line);

    // Remove trailing empty lines
    while lines.last().is_some_and(|l| {
        l.spans.is_empty() || (l.spans.len() == 1 && l.spans[0].content.is_empty())
    }) {
        lines.pop();
    }

    wrap_lines(lines, width)
}

/// Hard-wrap styled lines to `width` columns, keeping span styles
#[cfg(feature = "markdown")]
fn wrap_lines<'a>(lines: Vec<Line<'a>>, width: usize) -> Vec<Line<'a>> {
    use unicode_width::UnicodeWidthChar;

    let width = width.max(1);
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        if line.width() <= width {
            out.push(line);
            continue;
        }
        let mut row: Vec<Span<'a>> = Vec::new();
        let mut row_width = 0;
        for span in line.spans {
            let mut chunk = String::new();
            for c in span.content.chars() {
                let w = c.width().unwrap_or(0);
                if row_width + w > width {
                    if !chunk.is_empty() {
                        row.push(Span::styled(std::mem::take(&mut chunk), span.style));
                    }
                    out.push(Line::from(std::mem::take(&mut row)));
                    row_width = 0;
                }
                chunk.push(c);
                row_width += w;
            }
            if !chunk.is_empty() {
                row.push(Span::styled(chunk, span.style));
            }
        }
        if !row.is_empty() {
            out.push(Line::from(row));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_plain_keeps_line_breaks() {
        let theme = Theme::dark();
        let lines = render_text("one\ntwo", &theme, 80, false);
        assert_eq!(plain(&lines), vec!["one", "two"]);
    }

    #[test]
    fn test_plain_shows_markup_verbatim() {
        let theme = Theme::dark();
        let lines = render_text("**bold**", &theme, 80, false);
        assert_eq!(plain(&lines), vec!["**bold**"]);
    }

    #[test]
    fn test_plain_wraps() {
        let lines = render_plain("aaaa bbbb", ratatui::style::Style::default(), 4);
        assert_eq!(plain(&lines), vec!["aaaa", "bbbb"]);
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_soft_break_is_line_break() {
        let theme = Theme::dark();
        let lines = render_markdown("first\nsecond", &theme, 80);
        assert_eq!(plain(&lines), vec!["first", "second"]);
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_emphasis_is_styled_not_printed() {
        let theme = Theme::dark();
        let lines = render_markdown("**bold** and *it*", &theme, 80);
        assert_eq!(plain(&lines), vec!["bold and it"]);
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_link_shows_target() {
        let theme = Theme::dark();
        let lines = render_markdown("[docs](https://example.com)", &theme, 80);
        assert_eq!(plain(&lines), vec!["docs (https://example.com)"]);
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_code_block() {
        let theme = Theme::dark();
        let md = "```rust\nfn main() {}\n```";
        let lines = render_markdown(md, &theme, 80);
        assert_eq!(plain(&lines), vec!["  fn main() {}"]);
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_ordered_list_keeps_numbers() {
        let theme = Theme::dark();
        let lines = render_markdown("1. first\n2. second", &theme, 80);
        assert_eq!(plain(&lines), vec!["1. first", "2. second"]);

        let lines = render_markdown("3. third\n4. fourth\n\n- loose", &theme, 80);
        let text = plain(&lines);
        assert_eq!(text[0], "3. third");
        assert_eq!(text[1], "4. fourth");
        assert!(text.contains(&"• loose".to_string()), "got: {:?}", text);
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_nested_bullets_under_numbers() {
        let theme = Theme::dark();
        let lines = render_markdown("1. one\n   - sub\n2. two", &theme, 80);
        assert_eq!(plain(&lines), vec!["1. one", "  • sub", "2. two"]);
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_inline_html_is_kept() {
        let theme = Theme::dark();
        let lines = render_markdown("Wrap it in a <div> element", &theme, 80);
        assert_eq!(plain(&lines), vec!["Wrap it in a <div> element"]);
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_html_block_is_kept() {
        let theme = Theme::dark();
        let lines = render_markdown("a <b>\n\n<!-- hidden -->\nok", &theme, 80);
        let text = plain(&lines);
        assert_eq!(text.first().map(String::as_str), Some("a <b>"));
        assert!(text.contains(&"<!-- hidden -->".to_string()), "got: {:?}", text);
        assert_eq!(text.last().map(String::as_str), Some("ok"));
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_long_lines_are_wrapped() {
        let theme = Theme::dark();
        let lines = render_markdown("abcdefghij", &theme, 4);
        assert_eq!(plain(&lines), vec!["abcd", "efgh", "ij"]);
    }
}
