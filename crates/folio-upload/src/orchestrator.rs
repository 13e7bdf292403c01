use chrono::Utc;
use folio_types::DocumentData;
use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::batcher::partition;
use crate::error::{Result, UploadError};
use crate::file::{total_size, UploadFile};
use crate::limits::UploadLimits;
use crate::transport::{BatchHeader, BatchRequest, UploadTransport};
use crate::validation::validate_selection;

/// Progress report emitted while an upload runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    pub total_files: usize,
    pub processed_files: usize,
    /// 1-based
    pub current_batch: usize,
    pub total_batches: usize,
    pub percent_complete: u8,
}

impl UploadProgress {
    fn new(
        total_files: usize,
        processed_files: usize,
        current_batch: usize,
        total_batches: usize,
    ) -> Self {
        let percent_complete = if total_files == 0 {
            100
        } else {
            (processed_files as f64 / total_files as f64 * 100.0).round() as u8
        };

        Self {
            total_files,
            processed_files,
            current_batch,
            total_batches,
            percent_complete,
        }
    }
}

/// A file selection to upload
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub files: Vec<UploadFile>,
    pub description: String,
    /// Names of files the caller already holds, for duplicate detection
    pub existing_filenames: Vec<String>,
}

impl UploadRequest {
    pub fn new(files: Vec<UploadFile>, description: impl Into<String>) -> Self {
        Self {
            files,
            description: description.into(),
            existing_filenames: Vec::new(),
        }
    }

    pub fn with_existing<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.existing_filenames = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    /// Server-returned documents, in batch order
    pub documents: Vec<DocumentData>,
    pub batched: bool,
    pub batch_count: usize,
    pub total_files: usize,
    /// Correlation id shared by all batches, multi-batch only
    pub upload_id: Option<String>,
}

/// Drives validation, batching and sequential transmission of one upload
pub struct UploadOrchestrator<T> {
    transport: T,
    limits: UploadLimits,
}

impl<T: UploadTransport> UploadOrchestrator<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            limits: UploadLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// True when the selection is too large for a single request
    pub fn needs_batching(&self, files: &[UploadFile]) -> bool {
        total_size(files) > self.limits.max_payload_bytes
    }

    /// Number of requests `upload` would make for these files
    pub fn estimate_batches(&self, files: &[UploadFile]) -> Result<usize> {
        if !self.needs_batching(files) {
            return Ok(usize::from(!files.is_empty()));
        }
        Ok(partition(files, self.limits.max_file_bytes, self.limits.batch_bytes)?.len())
    }

    pub async fn upload(&self, request: &UploadRequest) -> Result<UploadOutcome> {
        self.upload_with_progress(request, |_| {}).await
    }

    /// Upload the selection, calling `on_progress` as batches complete.
    ///
    /// Fails without any network activity when validation fails. In
    /// multi-batch mode the first failing batch aborts the remaining ones and
    /// documents from earlier batches are dropped.
    pub async fn upload_with_progress<F>(
        &self,
        request: &UploadRequest,
        mut on_progress: F,
    ) -> Result<UploadOutcome>
    where
        F: FnMut(UploadProgress) + Send,
    {
        validate_selection(
            &request.files,
            &request.existing_filenames,
            &request.description,
            &self.limits,
        )?;

        if self.needs_batching(&request.files) {
            self.upload_batched(request, &mut on_progress).await
        } else {
            self.upload_single(request, &mut on_progress).await
        }
    }

    async fn upload_single<F>(
        &self,
        request: &UploadRequest,
        on_progress: &mut F,
    ) -> Result<UploadOutcome>
    where
        F: FnMut(UploadProgress) + Send,
    {
        let total_files = request.files.len();
        debug!(files = total_files, "Uploading in a single request");

        on_progress(UploadProgress::new(total_files, 0, 1, 1));

        let response = self
            .transport
            .send(BatchRequest {
                files: &request.files,
                description: &request.description,
                batch: None,
            })
            .await
            .map_err(|e| {
                error!("Upload failed: {}", e);
                UploadError::Transport(e)
            })?;

        on_progress(UploadProgress::new(total_files, total_files, 1, 1));

        Ok(UploadOutcome {
            documents: response.documents,
            batched: false,
            batch_count: 1,
            total_files,
            upload_id: None,
        })
    }

    async fn upload_batched<F>(
        &self,
        request: &UploadRequest,
        on_progress: &mut F,
    ) -> Result<UploadOutcome>
    where
        F: FnMut(UploadProgress) + Send,
    {
        let total_files = request.files.len();
        let batches = partition(
            &request.files,
            self.limits.max_file_bytes,
            self.limits.batch_bytes,
        )?;
        let total = batches.len();
        let upload_id = generate_upload_id();

        info!(
            upload_id = %upload_id,
            files = total_files,
            batches = total,
            "Starting batched upload"
        );

        let mut merged = Vec::with_capacity(total_files);
        let mut processed = 0;

        for batch in &batches {
            let header = BatchHeader {
                index: batch.index,
                total,
                upload_id: upload_id.clone(),
            };

            debug!(
                upload_id = %upload_id,
                batch = batch.index + 1,
                files = batch.len(),
                bytes = batch.bytes,
                "Sending batch"
            );

            let response = self
                .transport
                .send(BatchRequest {
                    files: batch.items,
                    description: &request.description,
                    batch: Some(&header),
                })
                .await
                .map_err(|source| {
                    error!(
                        upload_id = %upload_id,
                        batch = batch.index + 1,
                        discarded = merged.len(),
                        "Batch failed, aborting upload: {}",
                        source
                    );
                    UploadError::BatchFailed {
                        number: batch.index + 1,
                        total,
                        source,
                    }
                })?;

            processed += batch.len();
            merged.extend(response.documents);
            on_progress(UploadProgress::new(total_files, processed, batch.index + 1, total));
        }

        info!(upload_id = %upload_id, documents = merged.len(), "Batched upload complete");

        Ok(UploadOutcome {
            documents: merged,
            batched: true,
            batch_count: total,
            total_files,
            upload_id: Some(upload_id),
        })
    }
}

/// `upload_<unix millis>_<9 hex chars>`
fn generate_upload_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("upload_{}_{}", Utc::now().timestamp_millis(), &random[..9])
}
