use crate::Framer;
use core_types::Frame;

/// Buffers input and emits a frame whenever a newline is encountered.
///
/// Frames keep their terminator (`\n`, and a preceding `\r` if the device
/// sends CRLF); decoders decide what to strip. A line that never receives
/// its terminator can be forced out with [`Framer::flush`].
pub struct LineFramer {
    buffer: Vec<u8>,
    // Timestamp of the *first byte* currently in the buffer.
    start_timestamp_us: Option<u64>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(1024),
            start_timestamp_us: None,
        }
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framer for LineFramer {
    fn push(&mut self, bytes: &[u8], timestamp_us: u64) -> Vec<Frame> {
        let mut frames = Vec::new();

        if self.buffer.is_empty() {
            self.start_timestamp_us = Some(timestamp_us);
        }

        for &b in bytes {
            if self.buffer.is_empty() && self.start_timestamp_us.is_none() {
                self.start_timestamp_us = Some(timestamp_us);
            }
            self.buffer.push(b);
            if b == b'\n' {
                let ts = self.start_timestamp_us.unwrap_or(timestamp_us);
                frames.push(Frame::new_rx(std::mem::take(&mut self.buffer), ts));
                self.start_timestamp_us = None;
            }
        }

        frames
    }

    fn flush(&mut self) -> Option<Frame> {
        if self.buffer.is_empty() {
            return None;
        }
        let ts = self.start_timestamp_us.take().unwrap_or_default();
        Some(Frame::new_rx(std::mem::take(&mut self.buffer), ts))
    }

    fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    fn pending(&self) -> Option<(usize, u64)> {
        if self.buffer.is_empty() {
            return None;
        }
        Some((self.buffer.len(), self.start_timestamp_us.unwrap_or_default()))
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.start_timestamp_us = None;
    }

    fn name(&self) -> &'static str {
        "Lines"
    }
}
