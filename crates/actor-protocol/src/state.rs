/// # Connection State Machine
///
/// ```text
///                  connect(port, baud) ok
///  ┌──────────────┐ ─────────────────────► ┌───────────┐
///  │ Disconnected │                        │ Connected │
///  └──────────────┘ ◄───────────────────── └───────────┘
///                    disconnect() / shutdown
/// ```
///
/// A failed open stays in Disconnected. Connecting while Connected closes
/// the old handle first (Connected → Disconnected → Connected).
///
/// ## State Invariants
///
/// - **Disconnected**: No port handle, no read loop running
/// - **Connected**: Port handle open, exactly one read loop running
///
/// Transitions happen only through explicit connect/disconnect. Read or
/// write failures never move the state except to force Disconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ConnectionState {
    /// No active connection, ready to connect
    Disconnected,

    /// Port open and read loop running
    Connected,
}

impl ConnectionState {
    /// Should the connect button show "Disconnect"?
    pub fn button_shows_disconnect(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// User-facing status text
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Disconnected => "Ready to connect",
            Self::Connected => "Connected",
        }
    }

    /// Validate if transition to new_state is allowed from current state
    pub fn can_transition_to(&self, new_state: ConnectionState) -> bool {
        use ConnectionState::*;

        match (self, new_state) {
            (Disconnected, Connected) => true,
            (Disconnected, Disconnected) => true, // Idempotent disconnect
            (Connected, Disconnected) => true,
            // Reconnect goes through Disconnected first
            (Connected, Connected) => false,
        }
    }

    /// Convert state to u8 value for atomic storage
    pub fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connected => 1,
        }
    }

    /// Convert u8 value back to state. Returns None if value is invalid
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ConnectionState::Disconnected),
            1 => Some(ConnectionState::Connected),
            _ => None,
        }
    }
}
