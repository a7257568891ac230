use std::sync::Arc;

use actor_protocol::{ActorError, ConnectionError, SystemEvent, UiCommand, WriteError};
use actor_runtime::{actor_debug, actor_info, Actor, EventSender};
use core_types::{Direction, PortDescriptor, TransportFactory};
use framing::{compact, frame};

use crate::config::LinkConfig;
use crate::link::SerialLink;
use crate::transcript::Transcript;

/// SessionActor is the command layer between the UI and the serial link
///
/// Responsibilities:
/// - Connect/disconnect the link and report state changes
/// - Compact, frame and send scripts, asking for confirmation on collisions
/// - Send raw messages
/// - Record Sent events in the transcript at the call site
/// - Refresh the port list
///
/// Failures are surfaced as status events. None of them stop the actor.
pub struct SessionActor {
    link: SerialLink,
    transcript: Transcript,
    event_tx: EventSender,
    delimiter: u8,
}

impl SessionActor {
    pub fn new(
        factory: Arc<dyn TransportFactory>,
        config: LinkConfig,
        transcript: Transcript,
        event_tx: EventSender,
    ) -> Self {
        let delimiter = config.delimiter;
        Self {
            link: SerialLink::new(factory, config, transcript.clone()),
            transcript,
            event_tx,
            delimiter,
        }
    }

    pub fn link(&self) -> &SerialLink {
        &self.link
    }

    /// Send event to UI (non-critical, can drop)
    fn send_ui_event(&self, event: SystemEvent) {
        if self.event_tx.unbounded_send(event).is_err() {
            actor_debug!("SessionActor: event receiver dropped");
        }
    }

    fn notify_state(&self) {
        self.send_ui_event(SystemEvent::StateChanged {
            state: self.link.state(),
        });
    }

    async fn handle_connect(&mut self, port: PortDescriptor, baud: u32) -> Result<(), ActorError> {
        let result = self.link.connect(&port, baud).await;
        // Connect tears down any previous connection even when the open fails
        self.notify_state();
        result?;
        self.send_ui_event(SystemEvent::status(format!("Connected to {}", port)));
        Ok(())
    }

    async fn handle_disconnect(&mut self) -> Result<(), ActorError> {
        self.link.disconnect().await;
        self.notify_state();
        self.send_ui_event(SystemEvent::status("Disconnected"));
        Ok(())
    }

    async fn handle_toggle(&mut self, port: PortDescriptor, baud: u32) -> Result<(), ActorError> {
        if self.link.is_connected() {
            self.handle_disconnect().await
        } else {
            self.handle_connect(port, baud).await
        }
    }

    async fn handle_send_script(&mut self, source: String, force: bool) -> Result<(), ActorError> {
        if !self.link.is_connected() {
            return Err(WriteError::NotConnected.into());
        }

        let source = source.trim();
        if source.is_empty() {
            self.send_ui_event(SystemEvent::warning("No code to send"));
            return Ok(());
        }

        // Checked on the raw script so a delimiter inside a comment still warns
        if !force {
            if let Err(warning) = frame(source, self.delimiter, false) {
                actor_debug!(
                    "SessionActor: {} delimiter collision(s), awaiting confirmation",
                    warning.occurrences
                );
                self.send_ui_event(SystemEvent::CollisionWarning {
                    message: warning.to_string(),
                    source: source.to_string(),
                });
                return Ok(());
            }
        }

        let wire = frame(&compact(source), self.delimiter, force)
            .map_err(|warning| ActorError::Other(warning.to_string()))?;
        let bytes = wire.to_bytes();

        self.link.write(&bytes).await?;
        self.transcript.record(Direction::Sent, wire.to_text());
        actor_info!("Sent script ({} bytes)", bytes.len());
        self.send_ui_event(SystemEvent::status("Code sent successfully"));
        Ok(())
    }

    async fn handle_send_message(&mut self, text: String) -> Result<(), ActorError> {
        if !self.link.is_connected() {
            return Err(WriteError::NotConnected.into());
        }

        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        self.link.write(text.as_bytes()).await?;
        self.transcript.record(Direction::Sent, text);
        self.send_ui_event(SystemEvent::status("Message sent"));
        Ok(())
    }

    fn handle_clear(&mut self) {
        self.transcript.clear();
        self.send_ui_event(SystemEvent::status("Serial monitor cleared"));
    }

    fn handle_refresh_ports(&mut self) -> Result<(), ActorError> {
        let ports = self
            .link
            .list_ports()
            .map_err(|e| ActorError::Other(format!("Port refresh error: {}", e)))?;

        let status = match ports.len() {
            0 => SystemEvent::warning("No serial ports found"),
            1 => SystemEvent::status("Found 1 serial port"),
            n => SystemEvent::status(format!("Found {} serial ports", n)),
        };
        self.send_ui_event(SystemEvent::PortsListed { ports });
        self.send_ui_event(status);
        Ok(())
    }

    /// Operator-facing text for a failure that was already handled.
    fn surface(&self, err: ActorError) -> Result<(), ActorError> {
        let message = match err {
            ActorError::Connection(ConnectionError::NoPortSelected) => {
                "No serial port selected".to_string()
            }
            ActorError::Connection(ConnectionError::Open { reason, .. }) => {
                format!("Connection failed: {}", reason)
            }
            ActorError::Write(WriteError::NotConnected) => {
                WriteError::NotConnected.to_string()
            }
            ActorError::Write(WriteError::Io(reason)) => format!("Send error: {}", reason),
            ActorError::Other(message) => message,
            other => return Err(other),
        };
        self.send_ui_event(SystemEvent::error(message));
        Ok(())
    }
}

impl Actor for SessionActor {
    type Message = UiCommand;

    fn name(&self) -> &'static str {
        "SessionActor"
    }

    async fn init(&mut self) -> Result<(), ActorError> {
        self.notify_state();
        Ok(())
    }

    async fn handle(&mut self, msg: UiCommand) -> Result<(), ActorError> {
        let result = match msg {
            UiCommand::Connect { port, baud } => self.handle_connect(port, baud).await,
            UiCommand::Disconnect => self.handle_disconnect().await,
            UiCommand::ToggleConnection { port, baud } => self.handle_toggle(port, baud).await,
            UiCommand::SendScript { source, force } => {
                self.handle_send_script(source, force).await
            }
            UiCommand::SendMessage { text } => self.handle_send_message(text).await,
            UiCommand::ClearTranscript => {
                self.handle_clear();
                Ok(())
            }
            UiCommand::RefreshPorts => self.handle_refresh_ports(),
        };

        match result {
            Ok(()) => Ok(()),
            Err(err) => self.surface(err),
        }
    }

    async fn shutdown(&mut self) {
        if self.link.disconnect().await {
            self.notify_state();
        }
    }
}
