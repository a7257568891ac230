use serde::{Deserialize, Serialize};

pub mod interfaces;
pub mod transcript;
pub mod transport;

pub use interfaces::{EditSource, PortEnumerator, TranscriptDisplay};
pub use transcript::{Direction, TranscriptEvent};
pub use transport::{PortDescriptor, SerialConfig, Transport, TransportError, TransportFactory};

/// A raw chunk of data received from the device (e.g., a line).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    /// The raw bytes comprising this frame.
    pub bytes: Vec<u8>,
    /// Timestamp in microseconds (relative to session start or epoch).
    pub timestamp_us: u64,
}

impl Frame {
    pub fn new_rx(bytes: Vec<u8>, timestamp_us: u64) -> Self {
        Self {
            bytes,
            timestamp_us,
        }
    }
}

/// A decoded, human-readable interpretation of a Frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecodedLine {
    /// Timestamp inherited from the Frame.
    pub timestamp_us: u64,
    /// Decoder that produced this line (e.g., "UTF-8").
    pub protocol: &'static str,
    /// Decoded text, never containing the line terminator.
    pub text: String,
}

/// Trait for converting Frames into displayable lines.
pub trait Decoder: Send {
    /// Attempt to decode a frame.
    /// Returns None if the frame carries nothing worth showing.
    fn ingest(&mut self, frame: &Frame) -> Option<DecodedLine>;

    /// Get the unique name of this decoder (e.g., "utf8").
    fn id(&self) -> &'static str;

    /// Get a human-readable name.
    fn name(&self) -> &'static str;
}
