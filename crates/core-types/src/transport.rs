use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Not connected")]
    NotConnected,
    #[error("Other: {0}")]
    Other(String),
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io(e.to_string())
    }
}

/// Identifier of a serial device (e.g. `/dev/ttyUSB0` or `COM3`).
///
/// Opaque beyond equality and display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortDescriptor(String);

impl PortDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PortDescriptor {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Serial line parameters used when opening a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    /// Upper bound for a single blocking read.
    pub read_timeout: Duration,
}

impl SerialConfig {
    /// Standard 8N1 configuration at the given baud rate.
    pub fn new_8n1(baud_rate: u32, read_timeout: Duration) -> Self {
        Self {
            baud_rate,
            data_bits: 8,
            stop_bits: 1,
            read_timeout,
        }
    }
}

/// An open, byte-oriented duplex serial channel.
///
/// Calls are synchronous and short: `read` is only issued after
/// `bytes_available` reported pending input, so it never waits longer
/// than the configured read timeout.
pub trait Transport: Send {
    /// Number of bytes that can be read without blocking.
    fn bytes_available(&mut self) -> Result<usize, TransportError>;

    /// Read up to `buf.len()` bytes, returning how many were read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write all bytes. No partial-write recovery is attempted.
    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Close the connection. Dropping the transport must have the same effect.
    fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Opens transports by port name.
pub trait TransportFactory: Send + Sync {
    fn open(
        &self,
        port: &PortDescriptor,
        config: &SerialConfig,
    ) -> Result<Box<dyn Transport>, TransportError>;

    /// Enumerate serial devices currently present.
    fn list_ports(&self) -> Result<Vec<PortDescriptor>, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_descriptor_display() {
        let port = PortDescriptor::new("/dev/ttyUSB0");
        assert_eq!(port.to_string(), "/dev/ttyUSB0");
        assert_eq!(port, PortDescriptor::from("/dev/ttyUSB0"));
        assert!(PortDescriptor::new("  ").is_empty());
    }

    #[test]
    fn test_serial_config_8n1() {
        let config = SerialConfig::new_8n1(115200, Duration::from_millis(100));
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.data_bits, 8);
        assert_eq!(config.stop_bits, 1);
    }

    #[test]
    fn test_io_error_conversion() {
        let err: TransportError =
            std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out").into();
        assert_eq!(err, TransportError::Io("timed out".into()));
    }
}
