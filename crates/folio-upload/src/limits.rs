use serde::{Deserialize, Serialize};

pub const MIB: u64 = 1024 * 1024;

/// Largest request body the upstream accepts (4.5 MiB)
pub const MAX_PAYLOAD_BYTES: u64 = 9 * MIB / 2;

/// Largest single file (4.5 MiB)
pub const MAX_FILE_BYTES: u64 = 9 * MIB / 2;

/// Target size of one batch in a multi-batch upload (3.5 MiB)
pub const DEFAULT_BATCH_BYTES: u64 = 7 * MIB / 2;

pub const MAX_FILES: usize = 100;

/// Byte count rendered in MB, the unit user-facing messages use
pub(crate) fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / MIB as f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    /// Above this total the upload is split into batches
    pub max_payload_bytes: u64,
    pub max_file_bytes: u64,
    pub batch_bytes: u64,
    /// Applies to the selection and to the selection plus already known files
    pub max_files: usize,
    /// Lower-case extensions including the dot, e.g. ".pdf"
    pub accepted_extensions: Vec<String>,
    pub require_description: bool,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_payload_bytes: MAX_PAYLOAD_BYTES,
            max_file_bytes: MAX_FILE_BYTES,
            batch_bytes: DEFAULT_BATCH_BYTES,
            max_files: MAX_FILES,
            accepted_extensions: vec![".pdf".to_string()],
            require_description: false,
        }
    }
}

impl UploadLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_bytes(mut self, bytes: u64) -> Self {
        self.batch_bytes = bytes;
        self
    }

    pub fn max_payload_bytes(mut self, bytes: u64) -> Self {
        self.max_payload_bytes = bytes;
        self
    }

    pub fn max_file_bytes(mut self, bytes: u64) -> Self {
        self.max_file_bytes = bytes;
        self
    }

    pub fn max_files(mut self, max: usize) -> Self {
        self.max_files = max;
        self
    }

    pub fn require_description(mut self, required: bool) -> Self {
        self.require_description = required;
        self
    }

    /// Case-insensitive extension check
    pub fn accepts(&self, file_name: &str) -> bool {
        let lower = file_name.to_ascii_lowercase();
        self.accepted_extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_ascii_lowercase()))
    }

    /// "PDF" for [".pdf"], "PDF/TXT" for [".pdf", ".txt"]
    pub fn accepted_kinds(&self) -> String {
        self.accepted_extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join("/")
    }
}
