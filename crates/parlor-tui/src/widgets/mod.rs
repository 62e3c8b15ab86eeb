//! Custom widgets for the TUI

pub mod input_box;
pub mod markdown;
pub mod message_list;
pub mod popup;
pub mod spinner;

pub use input_box::InputBox;
pub use message_list::{ChatMessage, MessageBody, MessageLayout, MessageList, Role};
pub use popup::{ImageModal, PathPrompt};
pub use spinner::Spinner;
