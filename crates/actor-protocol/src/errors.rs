//! Error Handling Guidelines
//!
//! All error messages should say what failed and, when known, why:
//! - ✅ "Failed to open /dev/ttyUSB0: Device or resource busy"
//! - ❌ "Error" (too vague)
//!
//! None of these are fatal. Connection failures leave the link
//! Disconnected, write failures leave it as it was.

use thiserror::Error;

/// Opening a port failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionError {
    #[error("No serial port selected")]
    NoPortSelected,

    #[error("Failed to open {port}: {reason}")]
    Open { port: String, reason: String },
}

/// Writing to the link failed. No partial-write recovery is attempted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WriteError {
    #[error("Not connected to serial port")]
    NotConnected,

    #[error("Write failed: {0}")]
    Io(String),
}

/// Unified error type for actor operations
#[derive(Error, Debug, Clone)]
pub enum ActorError {
    /// Communication channel closed
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Write(#[from] WriteError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for ActorError {
    fn from(s: String) -> Self {
        ActorError::Other(s)
    }
}

impl From<&str> for ActorError {
    fn from(s: &str) -> Self {
        ActorError::Other(s.to_string())
    }
}
