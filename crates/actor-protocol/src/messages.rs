use crate::state::ConnectionState;
use core_types::{PortDescriptor, TranscriptEvent};
use serde::{Deserialize, Serialize};

/// Commands from UI to Actor system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UiCommand {
    /// Open a serial port, closing any previous one first
    Connect { port: PortDescriptor, baud: u32 },

    /// Close the current port (no-op when already disconnected)
    Disconnect,

    /// Disconnect if connected, connect otherwise
    ToggleConnection { port: PortDescriptor, baud: u32 },

    /// Compact, frame and send a script.
    /// `force` sends even if the script contains the frame delimiter.
    SendScript { source: String, force: bool },

    /// Send a line of text as-is, without compaction or framing
    SendMessage { text: String },

    /// Empty the transcript
    ClearTranscript,

    /// Re-enumerate serial ports
    RefreshPorts,
}

/// Severity of a status bar message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Events from Actor system to UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SystemEvent {
    /// Connection state has changed
    StateChanged { state: ConnectionState },

    /// Status message for user display
    StatusUpdate { message: String, level: StatusLevel },

    /// Error occurred
    Error { message: String },

    /// A new transcript entry was appended
    TranscriptAppended { event: TranscriptEvent },

    /// The transcript was emptied
    TranscriptCleared,

    /// The script contains the frame delimiter. The operator must confirm
    /// by re-sending with `force = true`.
    CollisionWarning { message: String, source: String },

    /// Result of a port refresh
    PortsListed { ports: Vec<PortDescriptor> },
}

impl SystemEvent {
    pub fn status(message: impl Into<String>) -> Self {
        Self::StatusUpdate {
            message: message.into(),
            level: StatusLevel::Info,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::StatusUpdate {
            message: message.into(),
            level: StatusLevel::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::StatusUpdate {
            message: message.into(),
            level: StatusLevel::Error,
        }
    }
}
