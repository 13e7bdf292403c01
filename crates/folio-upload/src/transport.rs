use async_trait::async_trait;
use folio_types::UploadResponse;

use crate::error::TransportError;
use crate::file::UploadFile;

/// Identifies one batch of a multi-batch upload to the receiving side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchHeader {
    /// Zero-based
    pub index: usize,
    pub total: usize,
    /// Shared by every batch of one upload
    pub upload_id: String,
}

/// One request against the upload endpoint
#[derive(Debug, Clone, Copy)]
pub struct BatchRequest<'a> {
    pub files: &'a [UploadFile],
    pub description: &'a str,
    /// `None` on the single-shot path
    pub batch: Option<&'a BatchHeader>,
}

/// Sends one multipart request and returns the documents the server produced
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn send(&self, request: BatchRequest<'_>) -> Result<UploadResponse, TransportError>;
}

#[async_trait]
impl<T: UploadTransport + ?Sized> UploadTransport for std::sync::Arc<T> {
    async fn send(&self, request: BatchRequest<'_>) -> Result<UploadResponse, TransportError> {
        (**self).send(request).await
    }
}
