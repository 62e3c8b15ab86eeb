//! Backend client: the submit and clear calls

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::{
    error::{Error, Result},
    types::{ClearAck, SubmitRequest, SubmitResponse},
};

/// Default backend address
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000";

/// The two calls the chat controller makes.
///
/// Failures are reported, never retried.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send user text and/or an image, returning the bot's answer
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse>;

    /// Ask the backend to forget the current conversation
    async fn clear_session(&self) -> Result<ClearAck>;
}

/// Backend reached over HTTP: `POST /` and `POST /clear`
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    chat_url: Url,
    clear_url: Url,
}

impl HttpBackend {
    /// Create a client for the backend rooted at `endpoint`
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Create a client reusing an existing reqwest client
    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Result<Self> {
        let mut base =
            Url::parse(endpoint).map_err(|e| Error::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint(endpoint.to_string()));
        }

        // Treat the endpoint as a directory so "clear" resolves beneath it
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let clear_url = base
            .join("clear")
            .map_err(|e| Error::InvalidEndpoint(e.to_string()))?;

        Ok(Self {
            client,
            chat_url: base,
            clear_url,
        })
    }

    /// URL the submit call posts to
    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    /// URL the clear call posts to
    pub fn clear_url(&self) -> &Url {
        &self.clear_url
    }

    async fn post_json<T, B>(&self, url: &Url, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let response = self.client.post(url.clone()).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%url, status = status.as_u16(), "backend request failed");
            return Err(Error::status(status.as_u16(), text));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse> {
        tracing::debug!(
            url = %self.chat_url,
            query_len = request.query.len(),
            has_image = request.has_image(),
            "submitting message"
        );
        self.post_json(&self.chat_url, request).await
    }

    async fn clear_session(&self) -> Result<ClearAck> {
        tracing::debug!(url = %self.clear_url, "clearing session");
        self.post_json(&self.clear_url, &serde_json::json!({})).await
    }
}
