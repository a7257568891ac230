use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Which side of the link produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Sent,
    Received,
    System,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sent => "SENT",
            Self::Received => "RECV",
            Self::System => "SYS",
        }
    }
}

/// One entry of the operator-visible transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    /// Position in append order, assigned by the sink. Strictly increasing.
    pub seq: u64,
    pub timestamp: DateTime<Local>,
    pub direction: Direction,
    pub text: String,
}

impl TranscriptEvent {
    pub fn new(direction: Direction, text: impl Into<String>) -> Self {
        Self {
            seq: 0,
            timestamp: Local::now(),
            direction,
            text: text.into(),
        }
    }

    /// Format as a single display line, e.g. `[12:30:01] RECV: ok`.
    pub fn render(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.timestamp.format("%H:%M:%S"),
            self.direction.label(),
            self.text
        )
    }
}
