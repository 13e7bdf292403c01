use std::fmt::Display;

use folio_types::StreamEvent;
use futures::{Stream, StreamExt};
use tracing::{debug, error, warn};

use crate::buffering::LineBuffer;
use crate::client::EventStream;
use crate::error::StreamError;

/// Marker that starts every event record
pub const EVENT_PREFIX: &str = "data:";

/// Decode one line of the response body.
///
/// Blank lines, lines without the record marker, malformed JSON and unknown
/// event types all yield `None`.
pub fn decode_line(line: &str) -> Option<StreamEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some(data) = line.strip_prefix(EVENT_PREFIX) else {
        debug!("Skipping line without event prefix: {}", line);
        return None;
    };

    match serde_json::from_str::<StreamEvent>(data.trim_start()) {
        Ok(StreamEvent::Unknown) => {
            debug!("Skipping event of unknown type: {}", data);
            None
        }
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Failed to parse stream event: {} ({})", data, e);
            None
        }
    }
}

/// Push-based decoder; feed it fragments in arrival order
pub struct EventStreamDecoder {
    buffer: LineBuffer,
    skipped: usize,
}

impl EventStreamDecoder {
    pub fn new() -> Self {
        Self {
            buffer: LineBuffer::default(),
            skipped: 0,
        }
    }

    /// Append a fragment and return the events completed by it
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend(bytes);

        let mut events = Vec::new();
        while let Some(line) = self.buffer.next_line() {
            if let Some(event) = self.decode(line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing record that was not newline-terminated
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let line = self.buffer.take_remainder()?;
        self.decode(line)
    }

    /// Non-blank lines dropped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn decode(&mut self, line: Result<String, Vec<u8>>) -> Option<StreamEvent> {
        let line = match line {
            Ok(line) => line,
            Err(bytes) => {
                warn!("Skipping line with invalid UTF-8 ({} bytes)", bytes.len());
                self.skipped += 1;
                return None;
            }
        };

        let event = decode_line(&line);
        if event.is_none() && !line.trim().is_empty() {
            self.skipped += 1;
        }
        event
    }
}

impl Default for EventStreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a body of byte fragments into a lazy stream of events.
///
/// The stream ends when the body ends. A transport error is yielded once as
/// `Err` and ends the stream; decode problems never do.
pub fn decode_event_stream<S, B, E>(chunks: S) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut chunks = Box::pin(chunks);
        let mut decoder = EventStreamDecoder::new();
        let mut broken = false;

        while let Some(chunk_result) = chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    for event in decoder.push(bytes.as_ref()) {
                        yield Ok(event);
                    }
                }
                Err(e) => {
                    error!("Response stream broke off: {}", e);
                    yield Err(StreamError::Transport(e.to_string()));
                    broken = true;
                    break;
                }
            }
        }

        if !broken {
            if let Some(event) = decoder.finish() {
                yield Ok(event);
            }
        }

        if decoder.skipped() > 0 {
            debug!("Stream ended, {} malformed lines skipped", decoder.skipped());
        }
    })
}
