//! parlor-chat: Chat session controller
//!
//! This crate holds the bubble model, the surface abstraction a front-end
//! implements, the bubble renderer, and the controller that runs the
//! submit, attach and clear lifecycles against a backend.

pub mod bubble;
pub mod controller;
pub mod error;
pub mod renderer;
pub mod session;
pub mod surface;

pub use bubble::{Bubble, BubbleBody, BubbleId, Sender, TYPING_BUBBLE_ID};
pub use controller::{ChatController, ControllerState, DEFAULT_WELCOME, NEW_CONVERSATION_NOTICE};
pub use error::{Error, Result};
pub use renderer::BubbleRenderer;
pub use session::SessionFlag;
pub use surface::{ChatSurface, ConversationView};
