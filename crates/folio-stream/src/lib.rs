//! Response side of the Folio client.
//!
//! The chat endpoint answers with a long-lived body of `data: {json}` lines.
//! [`decode_event_stream`] turns the raw body into typed [`StreamEvent`]s and
//! [`ProgressAccumulator`] folds them into one snapshot per question.

pub mod accumulator;
pub mod buffering;
pub mod client;
pub mod decoder;
pub mod error;
pub mod exchange;

pub use accumulator::{
    AnswerMetadata, CostUpdate, Fold, ProgressAccumulator, ProgressSnapshot, SessionCost,
    StepProgress, StreamState, GENERIC_FAILURE_MESSAGE,
};
pub use buffering::LineBuffer;
pub use client::{ChatStreamClient, ChatStreamer, EventStream};
pub use decoder::{decode_event_stream, decode_line, EventStreamDecoder, EVENT_PREFIX};
pub use error::{Result, StreamError};
pub use exchange::{consume, ExchangeOutcome};
pub use folio_types::StreamEvent;
