//! In-memory transport.
//!
//! Lets tests and demos drive a [`SerialLink`](crate::SerialLink) without
//! hardware: inject incoming bytes or read errors, inspect what was written.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use core_types::{PortDescriptor, SerialConfig, Transport, TransportError, TransportFactory};

enum Incoming {
    Bytes(VecDeque<u8>),
    Error(TransportError),
}

#[derive(Default)]
struct MockState {
    ports: Vec<PortDescriptor>,
    busy: HashMap<PortDescriptor, String>,
    incoming: VecDeque<Incoming>,
    written: Vec<Vec<u8>>,
    write_error: Option<TransportError>,
    write_delay: Option<Duration>,
    opened: Vec<(PortDescriptor, SerialConfig)>,
    open_handles: usize,
    closes: usize,
}

/// Factory handing out [`MockTransport`]s that share one scripted device.
///
/// Cloning yields another handle onto the same device.
#[derive(Clone, Default)]
pub struct MockTransportFactory {
    state: Arc<Mutex<MockState>>,
}

impl MockTransportFactory {
    /// Device reachable under each of the given port names.
    pub fn with_ports(ports: &[&str]) -> Self {
        let factory = Self::default();
        factory.lock().ports = ports.iter().map(|p| PortDescriptor::new(*p)).collect();
        factory
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        lock(&self.state)
    }

    /// Make opening `port` fail with `reason` even though it is listed.
    pub fn mark_busy(&self, port: &str, reason: &str) {
        self.lock()
            .busy
            .insert(PortDescriptor::new(port), reason.to_string());
    }

    /// Queue bytes for the device to "send".
    pub fn inject_rx(&self, bytes: &[u8]) {
        self.lock()
            .incoming
            .push_back(Incoming::Bytes(bytes.iter().copied().collect()));
    }

    /// Queue a failing read. Bytes queued after it are delivered normally.
    pub fn inject_read_error(&self, reason: &str) {
        self.lock()
            .incoming
            .push_back(Incoming::Error(TransportError::Io(reason.to_string())));
    }

    /// Make every following write fail.
    pub fn fail_writes(&self, reason: &str) {
        self.lock().write_error = Some(TransportError::Io(reason.to_string()));
    }

    /// Make every following write block the calling thread for `delay`.
    pub fn slow_writes(&self, delay: Duration) {
        self.lock().write_delay = Some(delay);
    }

    /// Everything written so far, one entry per `write_all` call.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.lock().written.clone()
    }

    /// Every write, lossily decoded.
    pub fn written_text(&self) -> Vec<String> {
        self.written()
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Ports and configurations passed to successful opens.
    pub fn opened(&self) -> Vec<(PortDescriptor, SerialConfig)> {
        self.lock().opened.clone()
    }

    /// Transports opened and not yet closed or dropped.
    pub fn open_handles(&self) -> usize {
        self.lock().open_handles
    }

    pub fn closes(&self) -> usize {
        self.lock().closes
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TransportFactory for MockTransportFactory {
    fn open(
        &self,
        port: &PortDescriptor,
        config: &SerialConfig,
    ) -> Result<Box<dyn Transport>, TransportError> {
        let mut state = self.lock();
        if let Some(reason) = state.busy.get(port) {
            return Err(TransportError::ConnectionFailed(reason.clone()));
        }
        if !state.ports.contains(port) {
            return Err(TransportError::ConnectionFailed(format!(
                "could not open port {}: No such file or directory",
                port
            )));
        }
        state.opened.push((port.clone(), *config));
        state.open_handles += 1;
        Ok(Box::new(MockTransport {
            state: Arc::clone(&self.state),
            open: true,
        }))
    }

    fn list_ports(&self) -> Result<Vec<PortDescriptor>, TransportError> {
        Ok(self.lock().ports.clone())
    }
}

/// One open handle onto the mock device.
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    open: bool,
}

impl MockTransport {
    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.open {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }
}

impl Transport for MockTransport {
    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        self.ensure_open()?;
        let mut state = lock(&self.state);
        match state.incoming.front() {
            None => Ok(0),
            Some(Incoming::Bytes(bytes)) => Ok(bytes.len()),
            Some(Incoming::Error(_)) => match state.incoming.pop_front() {
                Some(Incoming::Error(e)) => Err(e),
                _ => Ok(0),
            },
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.ensure_open()?;
        let mut state = lock(&self.state);
        let Some(Incoming::Bytes(bytes)) = state.incoming.front_mut() else {
            return Ok(0);
        };
        let mut n = 0;
        for slot in buf.iter_mut() {
            match bytes.pop_front() {
                Some(b) => {
                    *slot = b;
                    n += 1;
                }
                None => break,
            }
        }
        if bytes.is_empty() {
            state.incoming.pop_front();
        }
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.ensure_open()?;
        let delay = lock(&self.state).write_delay;
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        let mut state = lock(&self.state);
        if let Some(e) = &state.write_error {
            return Err(e.clone());
        }
        state.written.push(data.to_vec());
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.open {
            self.open = false;
            let mut state = lock(&self.state);
            state.open_handles = state.open_handles.saturating_sub(1);
            state.closes += 1;
        }
        Ok(())
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
