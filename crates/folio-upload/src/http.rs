// Multipart HTTP implementation of the upload transport

use async_trait::async_trait;
use folio_types::UploadResponse;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::error::TransportError;
use crate::file::SizedItem;
use crate::transport::{BatchRequest, UploadTransport};

pub const CHUNK_INDEX_HEADER: &str = "X-Chunk-Index";
pub const TOTAL_CHUNKS_HEADER: &str = "X-Total-Chunks";
pub const UPLOAD_ID_HEADER: &str = "X-Upload-ID";

pub struct HttpUploadTransport {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpUploadTransport {
    /// `endpoint` is the full upload URL, e.g. `http://localhost:8000/upload`
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(http_client, endpoint))
    }

    pub fn with_client(http_client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn build_form(&self, request: &BatchRequest<'_>) -> Result<Form, TransportError> {
        let mut form = Form::new();

        for file in request.files {
            let bytes = file.read().await.map_err(|source| TransportError::Io {
                name: file.name().to_string(),
                source,
            })?;

            let part = Part::bytes(bytes)
                .file_name(file.name().to_string())
                .mime_str(file.content_type())?;
            form = form.part("files", part);
        }

        Ok(form.text("description", request.description.to_string()))
    }
}

/// Pull a message out of `{"error": ..}` or `{"detail": ..}` bodies
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "detail"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl UploadTransport for HttpUploadTransport {
    async fn send(&self, request: BatchRequest<'_>) -> Result<UploadResponse, TransportError> {
        let form = self.build_form(&request).await?;

        let mut builder = self.http_client.post(&self.endpoint).multipart(form);
        if let Some(header) = request.batch {
            builder = builder
                .header(CHUNK_INDEX_HEADER, header.index.to_string())
                .header(TOTAL_CHUNKS_HEADER, header.total.to_string())
                .header(UPLOAD_ID_HEADER, header.upload_id.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| format!("HTTP {}", status));
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<UploadResponse>(&body)
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }
}
