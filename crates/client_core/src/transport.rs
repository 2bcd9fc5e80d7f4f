//! Transport seam between the session controller and the remote chat service.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{ChatReply, ChatRequest};
use tracing::debug;
use url::Url;

use crate::error::TransportError;

/// Sends one user message and yields the bot reply.
///
/// Implementations report every failure through [`TransportError`]; they must
/// not panic into the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, message: &str) -> Result<String, TransportError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, message: &str) -> Result<String, TransportError> {
        (**self).send(message).await
    }
}

/// `POST {"message": ...}` to a fixed endpoint and read `{"reply": ...}` back.
pub struct HttpTransport {
    http: Client,
    api_url: Url,
}

impl HttpTransport {
    pub fn new(api_url: Url) -> Self {
        Self::with_client(Client::new(), api_url)
    }

    pub fn with_client(http: Client, api_url: Url) -> Self {
        Self { http, api_url }
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, message: &str) -> Result<String, TransportError> {
        debug!(url = %self.api_url, len = message.len(), "posting chat message");
        let res = self
            .http
            .post(self.api_url.clone())
            .json(&ChatRequest::new(message))
            .send()
            .await
            .map_err(TransportError::Network)?;

        let status = res.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = res.bytes().await.map_err(TransportError::Network)?;
        parse_reply(&body)
    }
}

pub(crate) fn parse_reply(body: &[u8]) -> Result<String, TransportError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(TransportError::InvalidJson)?;
    // serde also maps JSON arrays onto structs positionally; only objects count.
    if !value.is_object() {
        return Err(TransportError::MissingReply);
    }
    serde_json::from_value::<ChatReply>(value)
        .map(|body| body.reply)
        .map_err(|_| TransportError::MissingReply)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
