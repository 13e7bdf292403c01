use thiserror::Error;

use crate::limits::megabytes;

/// Failure of a single request against the upload endpoint
#[derive(Error, Debug)]
pub enum TransportError {
    /// The server answered with a non-success status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Please select at least one {kinds} file")]
    EmptySelection { kinds: String },

    #[error("Maximum {max} files allowed")]
    TooManyFiles { count: usize, max: usize },

    #[error("Adding {adding} files would exceed the {max} document limit. Current: {existing}")]
    CollectionFull {
        adding: usize,
        existing: usize,
        max: usize,
    },

    #[error("Only {kinds} files are allowed")]
    UnsupportedFileType { name: String, kinds: String },

    #[error("Files already exist: {}", .0.join(", "))]
    DuplicateFiles(Vec<String>),

    #[error(
        "File \"{name}\" is too large ({:.1}MB). Maximum size is {}MB per file.",
        megabytes(.size),
        megabytes(.limit)
    )]
    OversizedItem { name: String, size: u64, limit: u64 },

    #[error("Please provide a description of your documents")]
    MissingDescription,

    /// A batch of a multi-batch upload failed; `number` is 1-based
    #[error("Batch {number} of {total} failed: {source}")]
    BatchFailed {
        number: usize,
        total: usize,
        #[source]
        source: TransportError,
    },

    /// The single-shot request failed
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl UploadError {
    /// Validation errors are raised before any network activity
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            UploadError::BatchFailed { .. } | UploadError::Transport(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_message() {
        let err = UploadError::OversizedItem {
            name: "big.pdf".to_string(),
            size: 5 * 1024 * 1024 + 200 * 1024,
            limit: 4_718_592,
        };
        assert_eq!(
            err.to_string(),
            "File \"big.pdf\" is too large (5.2MB). Maximum size is 4.5MB per file."
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_duplicate_message() {
        let err = UploadError::DuplicateFiles(vec!["a.pdf".to_string(), "b.pdf".to_string()]);
        assert_eq!(err.to_string(), "Files already exist: a.pdf, b.pdf");
    }

    #[test]
    fn test_batch_failure_message() {
        let err = UploadError::BatchFailed {
            number: 2,
            total: 3,
            source: TransportError::Rejected {
                status: 500,
                message: "Error processing b.pdf".to_string(),
            },
        };
        assert_eq!(err.to_string(), "Batch 2 of 3 failed: Error processing b.pdf");
        assert!(!err.is_validation());
    }
}
