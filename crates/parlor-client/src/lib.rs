//! parlor-client: Backend client for the parlor chat widget
//!
//! This crate talks to a chat backend exposing a submit endpoint and a clear
//! endpoint, and encodes image attachments as base64.

pub mod backend;
pub mod codec;
pub mod error;
pub mod types;

pub use backend::{Backend, DEFAULT_ENDPOINT, HttpBackend};
pub use codec::{EncodedFile, encode_file};
pub use error::{Error, Result};
pub use types::*;
