//! Collaborator interfaces at the edge of the core.
//!
//! The presentation layer implements these; the core only calls them.

use crate::transcript::TranscriptEvent;
use crate::transport::{PortDescriptor, TransportError};

/// Editable text widget holding the script being composed.
pub trait EditSource {
    fn get_current_text(&self) -> String;
}

/// Receives transcript changes for display.
pub trait TranscriptDisplay {
    fn render_transcript_append(&mut self, event: &TranscriptEvent);

    fn render_transcript_cleared(&mut self) {}
}

/// Lists serial devices available to connect to.
pub trait PortEnumerator {
    fn list_available_ports(&self) -> Result<Vec<PortDescriptor>, TransportError>;
}

impl EditSource for String {
    fn get_current_text(&self) -> String {
        self.clone()
    }
}

impl EditSource for str {
    fn get_current_text(&self) -> String {
        self.to_string()
    }
}
