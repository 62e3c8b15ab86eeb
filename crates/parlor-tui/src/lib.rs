//! parlor-tui: terminal widgets for the chat window
//!
//! Built on ratatui and crossterm. Knows nothing about the backend; the
//! binary maps conversation state onto these widgets.

pub mod app;
pub mod input;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use theme::Theme;
