use std::collections::VecDeque;

/// Byte buffer that hands out complete `\n`-terminated lines.
///
/// Fragments are appended as they arrive; a line (and any multi-byte UTF-8
/// sequence in it) split across fragments is only decoded once its newline
/// has been seen.
pub struct LineBuffer {
    buffer: VecDeque<u8>,
    /// Bytes already known to hold no newline
    scanned: usize,
}

impl LineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            scanned: 0,
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Next complete line without its terminator, `None` if no newline is buffered.
    ///
    /// `Some(Err(_))` carries the raw bytes of a line that is not valid UTF-8;
    /// the line is consumed either way.
    pub fn next_line(&mut self) -> Option<Result<String, Vec<u8>>> {
        let Some(offset) = self.buffer.range(self.scanned..).position(|&b| b == b'\n') else {
            self.scanned = self.buffer.len();
            return None;
        };

        let line_bytes: Vec<u8> = self.buffer.drain(..=self.scanned + offset).collect();
        self.scanned = 0;
        Some(decode(line_bytes))
    }

    /// Whatever is left after the final newline, for end-of-stream
    pub fn take_remainder(&mut self) -> Option<Result<String, Vec<u8>>> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest: Vec<u8> = self.buffer.drain(..).collect();
        self.scanned = 0;
        Some(decode(rest))
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::with_capacity(4096)
    }
}

fn decode(bytes: Vec<u8>) -> Result<String, Vec<u8>> {
    match String::from_utf8(bytes) {
        Ok(line) => Ok(line.trim_end_matches(&['\n', '\r'][..]).to_string()),
        Err(e) => Err(e.into_bytes()),
    }
}
