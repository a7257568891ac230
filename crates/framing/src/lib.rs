//! # Framing
//!
//! Outbound: [`compact`] squeezes a script into one line and [`frame`] wraps
//! it in the wire delimiter. Inbound: [`Framer`] implementations split the
//! byte stream coming back from the device.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

use core_types::Frame;

pub mod compact;
pub mod delimited;
pub mod lines;

pub use compact::{compact, COMMENT_INTRODUCER};
pub use delimited::{collisions, frame, CollisionWarning, WireFrame, SCRIPT_DELIMITER};
pub use lines::LineFramer;

/// Trait for converting a stream of bytes into discrete Frames.
pub trait Framer: Send {
    /// Ingest new bytes and return any complete frames found.
    ///
    /// # Arguments
    /// * `bytes` - The new chunk of data read from transport.
    /// * `timestamp_us` - The timestamp associated with this chunk.
    fn push(&mut self, bytes: &[u8], timestamp_us: u64) -> Vec<Frame>;

    /// Emit whatever is buffered as a frame, even if incomplete.
    fn flush(&mut self) -> Option<Frame>;

    /// Whether bytes are buffered waiting for a terminator.
    fn has_pending(&self) -> bool;

    /// Number of buffered bytes and the timestamp of the first one.
    fn pending(&self) -> Option<(usize, u64)>;

    /// Reset internal state (e.g., clear buffers).
    fn reset(&mut self);

    /// Get the name of the framer.
    fn name(&self) -> &'static str;
}
