// Streaming chat client over HTTP

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use folio_types::{ChatRequest, StreamEvent};
use futures::Stream;
use tracing::{debug, error};

use crate::decoder::decode_event_stream;
use crate::error::{Result, StreamError};

/// Decoded events of one streamed answer
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Anything that can turn a question into a stream of events
#[async_trait]
pub trait ChatStreamer: Send + Sync {
    async fn ask(&self, request: &ChatRequest) -> Result<EventStream>;
}

#[async_trait]
impl<T: ChatStreamer + ?Sized> ChatStreamer for Arc<T> {
    async fn ask(&self, request: &ChatRequest) -> Result<EventStream> {
        (**self).ask(request).await
    }
}

pub struct ChatStreamClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ChatStreamClient {
    /// `base_url` is the API root, e.g. `http://localhost:8000`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http_client, base_url))
    }

    pub fn with_client(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/stream", self.base_url)
    }
}

#[async_trait]
impl ChatStreamer for ChatStreamClient {
    async fn ask(&self, request: &ChatRequest) -> Result<EventStream> {
        debug!(model = %request.model, history = request.chat_history.len(), "Sending question");

        let response = self
            .http_client
            .post(self.endpoint())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!("Chat request rejected ({}): {}", status, body);
            return Err(StreamError::Status { status, body });
        }

        Ok(decode_event_stream(response.bytes_stream()))
    }
}
