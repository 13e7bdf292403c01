//! Upload side of the Folio client.
//!
//! A selection of files is validated up front, partitioned into batches that
//! fit under the upstream request ceiling, and sent one batch at a time. The
//! merged result is all-or-nothing: the first failing batch aborts the rest.

pub mod batcher;
pub mod error;
pub mod file;
pub mod http;
pub mod limits;
pub mod orchestrator;
pub mod transport;
pub mod validation;

pub use batcher::{partition, Batch};
pub use error::{Result, TransportError, UploadError};
pub use file::{SizedItem, UploadFile};
pub use http::HttpUploadTransport;
pub use limits::UploadLimits;
pub use orchestrator::{UploadOrchestrator, UploadOutcome, UploadProgress, UploadRequest};
pub use transport::{BatchHeader, BatchRequest, UploadTransport};
pub use validation::validate_selection;
