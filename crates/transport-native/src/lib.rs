//! # Native Transport
//!
//! Serial port access on Linux, macOS and Windows through the `serialport`
//! crate. The port is opened 8N1 with the configured read timeout and no
//! flow control.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

use std::io::{ErrorKind, Read, Write};

use core_types::{
    PortDescriptor, PortEnumerator, SerialConfig, Transport, TransportError, TransportFactory,
};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

/// Opens OS serial devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTransportFactory;

impl NativeTransportFactory {
    pub fn new() -> Self {
        Self
    }
}

fn data_bits(bits: u8) -> Result<DataBits, TransportError> {
    match bits {
        5 => Ok(DataBits::Five),
        6 => Ok(DataBits::Six),
        7 => Ok(DataBits::Seven),
        8 => Ok(DataBits::Eight),
        other => Err(TransportError::Other(format!(
            "Unsupported data bits: {}",
            other
        ))),
    }
}

fn stop_bits(bits: u8) -> Result<StopBits, TransportError> {
    match bits {
        1 => Ok(StopBits::One),
        2 => Ok(StopBits::Two),
        other => Err(TransportError::Other(format!(
            "Unsupported stop bits: {}",
            other
        ))),
    }
}

fn map_error(e: serialport::Error) -> TransportError {
    match e.kind() {
        serialport::ErrorKind::Io(_) => TransportError::Io(e.to_string()),
        _ => TransportError::ConnectionFailed(e.to_string()),
    }
}

impl TransportFactory for NativeTransportFactory {
    fn open(
        &self,
        port: &PortDescriptor,
        config: &SerialConfig,
    ) -> Result<Box<dyn Transport>, TransportError> {
        let serial = serialport::new(port.as_str(), config.baud_rate)
            .data_bits(data_bits(config.data_bits)?)
            .stop_bits(stop_bits(config.stop_bits)?)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        tracing::debug!("Opened {} at {} baud", port, config.baud_rate);
        Ok(Box::new(NativeTransport {
            port: Some(serial),
        }))
    }

    fn list_ports(&self) -> Result<Vec<PortDescriptor>, TransportError> {
        let ports = serialport::available_ports().map_err(map_error)?;
        Ok(ports
            .into_iter()
            .map(|p| PortDescriptor::new(p.port_name))
            .collect())
    }
}

impl PortEnumerator for NativeTransportFactory {
    fn list_available_ports(&self) -> Result<Vec<PortDescriptor>, TransportError> {
        self.list_ports()
    }
}

/// An open OS serial port.
pub struct NativeTransport {
    port: Option<Box<dyn SerialPort>>,
}

impl NativeTransport {
    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, TransportError> {
        self.port.as_mut().ok_or(TransportError::NotConnected)
    }
}

impl Transport for NativeTransport {
    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        let pending = self.port()?.bytes_to_read().map_err(map_error)?;
        Ok(usize::try_from(pending).unwrap_or(usize::MAX))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.port()?.read(buf) {
            Ok(n) => Ok(n),
            // The read timeout expiring just means nothing arrived
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let port = self.port()?;
        port.write_all(data)?;
        port.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        // serialport closes the device on drop
        self.port = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_open_missing_port_fails() {
        let factory = NativeTransportFactory::new();
        let config = SerialConfig::new_8n1(115200, Duration::from_millis(100));
        let result = factory.open(&PortDescriptor::new("/dev/scriptlink-does-not-exist"), &config);
        assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
    }

    #[test]
    fn test_line_settings() {
        assert_eq!(data_bits(8).unwrap(), DataBits::Eight);
        assert_eq!(stop_bits(1).unwrap(), StopBits::One);
        assert!(data_bits(9).is_err());
        assert!(stop_bits(3).is_err());
    }

    #[test]
    fn test_closed_transport_reports_not_connected() {
        let mut transport = NativeTransport { port: None };
        assert_eq!(transport.bytes_available(), Err(TransportError::NotConnected));
        assert_eq!(transport.write_all(b"x"), Err(TransportError::NotConnected));
        assert!(transport.close().is_ok());
    }
}
