use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use actor_protocol::{ConnectionError, ConnectionState, WriteError};
use actor_runtime::{actor_debug, actor_error, actor_info, actor_warn};
use actor_runtime::{race_with_cancellation, CancelFlag};
use core_types::{
    Decoder, Direction, PortDescriptor, PortEnumerator, SerialConfig, Transport, TransportError,
    TransportFactory,
};
use decoders::Utf8Decoder;
use framing::{Framer, LineFramer};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::LinkConfig;
use crate::constants;
use crate::transcript::Transcript;

type SharedHandle = Arc<Mutex<Option<Box<dyn Transport>>>>;

/// Read-only view of a link's [`ConnectionState`], cheap to clone.
#[derive(Clone, Debug)]
pub struct StateHandle(Arc<AtomicU8>);

impl StateHandle {
    fn new(state: ConnectionState) -> Self {
        Self(Arc::new(AtomicU8::new(state.to_u8())))
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
            .unwrap_or(ConnectionState::Disconnected)
    }

    fn transition(&self, new_state: ConnectionState) {
        let old_state = self.get();
        if !old_state.can_transition_to(new_state) {
            actor_warn!("Unexpected transition {:?} → {:?}", old_state, new_state);
        }
        self.0.store(new_state.to_u8(), Ordering::Release);
        actor_debug!("State: {:?} → {:?}", old_state, new_state);
    }
}

struct ReadLoop {
    cancel: CancelFlag,
    task: JoinHandle<()>,
}

/// The serial transport: connection state, write path and read loop.
///
/// The transport handle sits behind an async mutex. The read loop holds it
/// only for one poll-and-read, and [`disconnect`](Self::disconnect) stops
/// the loop before closing, so a handle is never read from mid-close.
pub struct SerialLink {
    factory: Arc<dyn TransportFactory>,
    config: LinkConfig,
    transcript: Transcript,
    handle: SharedHandle,
    state: StateHandle,
    port: Option<PortDescriptor>,
    reader: Option<ReadLoop>,
}

impl SerialLink {
    pub fn new(
        factory: Arc<dyn TransportFactory>,
        config: LinkConfig,
        transcript: Transcript,
    ) -> Self {
        Self {
            factory,
            config,
            transcript,
            handle: Arc::new(Mutex::new(None)),
            state: StateHandle::new(ConnectionState::Disconnected),
            port: None,
            reader: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    pub fn state_handle(&self) -> StateHandle {
        self.state.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Port of the live connection, if any.
    pub fn port(&self) -> Option<&PortDescriptor> {
        self.port.as_ref()
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Open `port` at `baud` and start the read loop.
    ///
    /// Any previous connection is closed first. On failure the link is
    /// left Disconnected and the error carries the transport's reason.
    pub async fn connect(
        &mut self,
        port: &PortDescriptor,
        baud: u32,
    ) -> Result<(), ConnectionError> {
        if port.is_empty() {
            return Err(ConnectionError::NoPortSelected);
        }

        self.disconnect().await;

        let serial = SerialConfig::new_8n1(baud, self.config.read_timeout);
        let transport = self.factory.open(port, &serial).map_err(|e| {
            actor_error!("Failed to open {}: {}", port, e);
            ConnectionError::Open {
                port: port.to_string(),
                reason: open_reason(e),
            }
        })?;

        *self.handle.lock().await = Some(transport);
        self.port = Some(port.clone());
        self.state.transition(ConnectionState::Connected);
        actor_info!("Connected to {} at {} baud", port, baud);

        let cancel = CancelFlag::new();
        let task = tokio::spawn(read_loop(
            Arc::clone(&self.handle),
            self.transcript.clone(),
            self.config.clone(),
            cancel.clone(),
        ));
        self.reader = Some(ReadLoop { cancel, task });

        Ok(())
    }

    /// Stop the read loop and close the port.
    ///
    /// Safe to call when already disconnected. Returns whether a
    /// connection was actually closed.
    pub async fn disconnect(&mut self) -> bool {
        if let Some(reader) = self.reader.take() {
            reader.cancel.cancel();
            if let Err(e) = reader.task.await {
                actor_warn!("Read loop ended abnormally: {}", e);
            }
        }

        let closed = match self.handle.lock().await.take() {
            Some(mut transport) => {
                if let Err(e) = transport.close() {
                    actor_warn!("Error while closing port: {}", e);
                }
                true
            }
            None => false,
        };

        if self.state.get() == ConnectionState::Connected {
            if let Some(port) = self.port.take() {
                actor_info!("Disconnected from {}", port);
            }
            self.state.transition(ConnectionState::Disconnected);
        }
        self.port = None;

        closed
    }

    /// Write raw bytes to the open port.
    ///
    /// The transport write blocks, so it runs on the blocking pool. The
    /// handle lock is held until it finishes.
    pub async fn write(&self, data: &[u8]) -> Result<(), WriteError> {
        if !self.is_connected() {
            return Err(WriteError::NotConnected);
        }
        let mut guard = Arc::clone(&self.handle).lock_owned().await;
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || {
            let transport = guard.as_mut().ok_or(WriteError::NotConnected)?;
            transport
                .write_all(&data)
                .map_err(|e| WriteError::Io(e.to_string()))
        })
        .await
        .map_err(|e| WriteError::Io(e.to_string()))?
    }

    pub fn list_ports(&self) -> Result<Vec<PortDescriptor>, TransportError> {
        self.factory.list_ports()
    }
}

impl PortEnumerator for SerialLink {
    fn list_available_ports(&self) -> Result<Vec<PortDescriptor>, TransportError> {
        self.list_ports()
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.cancel.cancel();
        }
    }
}

fn open_reason(e: TransportError) -> String {
    match e {
        TransportError::ConnectionFailed(reason)
        | TransportError::Io(reason)
        | TransportError::Other(reason) => reason,
        TransportError::NotConnected => e.to_string(),
    }
}

/// Poll the transport, split input into lines and append them as
/// Received events until cancelled or the handle is taken away.
async fn read_loop(
    handle: SharedHandle,
    transcript: Transcript,
    config: LinkConfig,
    cancel: CancelFlag,
) {
    let mut framer = LineFramer::new();
    let mut decoder = Utf8Decoder::new();
    let mut buf = vec![0u8; constants::read_loop::READ_CHUNK_SIZE];
    let started = Instant::now();
    let elapsed_us = || u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    let max_wait_us = u64::try_from(config.read_timeout.as_micros()).unwrap_or(u64::MAX);

    actor_debug!("Read loop started");

    while !cancel.is_cancelled() {
        let result = {
            let mut guard = handle.lock().await;
            let Some(transport) = guard.as_mut() else {
                break;
            };
            read_available(transport.as_mut(), &mut buf)
        };

        let pause = match result {
            Ok(0) => {
                flush_stale(&mut framer, &mut decoder, &transcript, elapsed_us(), max_wait_us);
                config.poll_interval
            }
            Ok(n) => {
                let now_us = elapsed_us();
                let chunk = buf.get(..n).unwrap_or_default();
                for frame in framer.push(chunk, now_us) {
                    emit_line(&mut decoder, &transcript, &frame);
                }
                flush_stale(&mut framer, &mut decoder, &transcript, now_us, max_wait_us);
                continue;
            }
            Err(e) => {
                actor_warn!("Read error: {}", e);
                transcript.record(Direction::System, format!("Read error: {}", e));
                config.error_backoff
            }
        };

        if race_with_cancellation(tokio::time::sleep(pause), &cancel)
            .await
            .is_none()
        {
            break;
        }
    }

    if framer.has_pending() {
        actor_debug!("Discarding partial line on shutdown");
    }
    actor_debug!("Read loop stopped");
}

fn read_available(
    transport: &mut dyn Transport,
    buf: &mut [u8],
) -> Result<usize, TransportError> {
    let available = transport.bytes_available()?;
    if available == 0 {
        return Ok(0);
    }
    let want = available.min(buf.len());
    match buf.get_mut(..want) {
        Some(slice) => transport.read(slice),
        None => Ok(0),
    }
}

/// Emit a partial line once its first byte has waited `max_wait_us` or
/// it has reached [`MAX_PENDING_LINE`](constants::read_loop::MAX_PENDING_LINE).
fn flush_stale(
    framer: &mut LineFramer,
    decoder: &mut Utf8Decoder,
    transcript: &Transcript,
    now_us: u64,
    max_wait_us: u64,
) {
    let Some((len, since_us)) = framer.pending() else {
        return;
    };
    if len >= constants::read_loop::MAX_PENDING_LINE
        || now_us.saturating_sub(since_us) >= max_wait_us
    {
        if let Some(frame) = framer.flush() {
            emit_line(decoder, transcript, &frame);
        }
    }
}

fn emit_line(decoder: &mut Utf8Decoder, transcript: &Transcript, frame: &core_types::Frame) {
    if let Some(line) = decoder.ingest(frame) {
        transcript.record(Direction::Received, line.text);
    }
}
