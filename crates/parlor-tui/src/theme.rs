//! Color theme support

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Primary text color
    pub fg: Color,
    /// Dimmed/secondary text
    pub dim: Color,
    /// Accent color (prompts, focused borders)
    pub accent: Color,
    /// User bubble header color
    pub user: Color,
    /// Bot bubble header color
    pub bot: Color,
    /// System notice color
    pub system: Color,
    /// Error color
    pub error: Color,
    /// Border color
    pub border: Color,
    /// Code/preformatted text color
    pub code: Color,
    /// Link color
    pub link: Color,
    /// Image card color
    pub image: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
            user: Color::Cyan,
            bot: Color::Green,
            system: Color::Yellow,
            error: Color::Red,
            border: Color::DarkGray,
            code: Color::Magenta,
            link: Color::Blue,
            image: Color::LightMagenta,
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Blue,
            user: Color::Blue,
            bot: Color::Rgb(0, 120, 60),
            system: Color::Rgb(180, 120, 0),
            error: Color::Red,
            border: Color::Gray,
            code: Color::Magenta,
            link: Color::Blue,
            image: Color::Magenta,
        }
    }

    /// Pick a theme by name; anything other than "light" is dark
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get base style
    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get dimmed style
    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    /// Get accent style
    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Get bold accent style
    pub fn accent_bold(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Get error style
    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Get system notice style
    pub fn system_style(&self) -> Style {
        Style::default().fg(self.system)
    }

    /// Get code/preformatted style
    pub fn code_style(&self) -> Style {
        Style::default().fg(self.code)
    }

    /// Get border style
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }
}
