//! Centralized configuration constants for the serial link
//!
//! Timing values are tuned for USB-UART bridges on small microcontroller
//! boards. [`LinkConfig`](crate::LinkConfig) defaults to these.

/// Serial line defaults
pub mod port {
    /// Baud rate used when the operator does not pick one
    ///
    /// **Value**: 115200
    ///
    /// **Rationale**: Default console speed of the target firmware. The
    /// device does not auto-baud, so the host must match it exactly.
    pub const DEFAULT_BAUD: u32 = 115200;

    /// Upper bound for a single blocking read (milliseconds)
    ///
    /// **Value**: 100ms
    ///
    /// **Rationale**: Short enough that disconnect never waits on a read,
    /// long enough that a reply split over several USB packets arrives as
    /// one line. Also the longest a line without a terminating newline
    /// is held back, counted from its first byte.
    pub const READ_TIMEOUT_MS: u64 = 100;
}

/// Background read loop pacing
pub mod read_loop {
    /// Sleep between polls when no input is pending (milliseconds)
    ///
    /// **Value**: 10ms
    ///
    /// **Rationale**: Keeps CPU usage negligible while adding at most 10ms
    /// of latency to incoming lines.
    pub const POLL_INTERVAL_MS: u64 = 10;

    /// Pause after a failed read before polling again (milliseconds)
    ///
    /// **Value**: 100ms
    ///
    /// **Rationale**: A failing port tends to fail on every call. Backing
    /// off keeps the transcript from flooding with identical errors.
    pub const ERROR_BACKOFF_MS: u64 = 100;

    /// Maximum bytes pulled from the transport per iteration
    ///
    /// **Value**: 1024 bytes
    ///
    /// **Rationale**: At 115200 baud roughly 11.5 bytes arrive per
    /// millisecond, so one chunk covers a full poll interval with headroom.
    pub const READ_CHUNK_SIZE: usize = 1024;

    /// Longest partial line held back waiting for a newline (bytes)
    ///
    /// **Value**: 1024 bytes
    ///
    /// **Rationale**: A device at the wrong baud rate produces noise with no
    /// newlines. Past this size the buffer is emitted as its own line.
    pub const MAX_PENDING_LINE: usize = 1024;
}
