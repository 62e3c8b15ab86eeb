//! Attachment encoding

use base64::{Engine, engine::general_purpose::STANDARD};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// MIME type used for every image data URI, whatever the source format.
pub const IMAGE_MIME: &str = "image/png";

/// A file read from disk and encoded as base64
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFile {
    /// File name shown in the preview
    pub name: String,
    /// Where the file was read from
    pub path: PathBuf,
    /// Standard base64, padded, without a data-URI prefix
    pub base64: String,
    /// Size of the file in bytes
    pub size: usize,
}

/// Read a file and encode its content as base64.
///
/// Read failures are reported as [`Error::Attachment`]; callers treat them as
/// non-fatal and only abort the current attach step.
pub async fn encode_file(path: impl AsRef<Path>) -> Result<EncodedFile> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|source| Error::Attachment {
        path: path.to_path_buf(),
        source,
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    tracing::debug!(file = %name, bytes = bytes.len(), "encoded attachment");

    Ok(EncodedFile {
        name,
        path: path.to_path_buf(),
        base64: encode_bytes(&bytes),
        size: bytes.len(),
    })
}

/// Encode raw bytes
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Build the data URI an image bubble is displayed with
pub fn data_uri(base64: &str) -> String {
    format!("data:{};base64,{}", IMAGE_MIME, base64)
}

/// Size of the decoded payload, or `None` if it is not valid base64
pub fn decoded_len(base64: &str) -> Option<usize> {
    STANDARD.decode(base64).ok().map(|bytes| bytes.len())
}
