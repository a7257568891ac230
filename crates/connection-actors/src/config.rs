use std::time::Duration;

use framing::SCRIPT_DELIMITER;
use serde::Deserialize;

use crate::constants;

/// Parameters for a [`SerialLink`](crate::SerialLink).
///
/// Deserializable so that a presentation layer can load it from its own
/// settings file. Missing fields fall back to the defaults in
/// [`constants`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    #[serde(with = "millis")]
    pub read_timeout: Duration,
    #[serde(with = "millis")]
    pub poll_interval: Duration,
    #[serde(with = "millis")]
    pub error_backoff: Duration,
    /// Byte that starts and ends a script frame on the wire.
    pub delimiter: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(constants::port::READ_TIMEOUT_MS),
            poll_interval: Duration::from_millis(constants::read_loop::POLL_INTERVAL_MS),
            error_backoff: Duration::from_millis(constants::read_loop::ERROR_BACKOFF_MS),
            delimiter: SCRIPT_DELIMITER,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
