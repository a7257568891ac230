use actor_protocol::{ActorError, SystemEvent, UiCommand};
use futures_channel::mpsc;

/// Outbox for events towards the presentation layer.
///
/// Unbounded so that producers (including the read loop) never block or
/// drop transcript events when the display falls behind.
pub type EventSender = mpsc::UnboundedSender<SystemEvent>;

/// Handles for spawning actors
pub struct ActorHandles {
    pub session_rx: mpsc::Receiver<UiCommand>,
    pub event_tx: EventSender,
}

/// Channel manager for actor communication
///
/// Owns the UI side of the command inbox and the event outbox.
pub struct ChannelManager {
    // Bounded to push back on a UI that floods commands
    session_tx: mpsc::Sender<UiCommand>,
    event_tx: EventSender,
    event_rx: Option<mpsc::UnboundedReceiver<SystemEvent>>,
}

impl ChannelManager {
    /// Commands are low frequency; 64 pending is plenty.
    pub const COMMAND_CAPACITY: usize = 64;

    /// Create a new channel manager and actor handles
    ///
    /// Returns (ChannelManager for UI, ActorHandles for spawning actors)
    pub fn new() -> (Self, ActorHandles) {
        let (session_tx, session_rx) = mpsc::channel(Self::COMMAND_CAPACITY);
        let (event_tx, event_rx) = mpsc::unbounded();

        let handles = ActorHandles {
            session_rx,
            event_tx: event_tx.clone(),
        };

        let manager = Self {
            session_tx,
            event_tx,
            event_rx: Some(event_rx),
        };

        (manager, handles)
    }

    /// Send a UI command to the session actor
    pub fn send_command(&self, cmd: UiCommand) -> Result<(), ActorError> {
        self.session_tx.clone().try_send(cmd).map_err(|e| {
            if e.is_full() {
                ActorError::Other(
                    "System overloaded: Too many pending commands. Please slow down.".into(),
                )
            } else {
                ActorError::ChannelClosed("Session actor has shut down".into())
            }
        })
    }

    /// Take ownership of event receiver
    ///
    /// Returns None if it was already taken.
    pub fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<SystemEvent>> {
        self.event_rx.take()
    }

    /// Close the command inbox so the session actor shuts down
    pub fn close(&mut self) {
        self.session_tx.close_channel();
    }
}
