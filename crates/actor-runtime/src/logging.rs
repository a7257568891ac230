/// Centralized logging macros for the actor system
///
/// These forward to `tracing` so every crate logs the same way and the
/// binary decides filtering and output with a subscriber.
///
/// Log debug-level message
///
/// # Example
/// ```
/// use actor_runtime::actor_debug;
/// actor_debug!("SerialLink: {:?} → {:?}", "Disconnected", "Connected");
/// ```
#[macro_export]
macro_rules! actor_debug {
    ($($arg:tt)*) => {
        $crate::__tracing::debug!($($arg)*)
    };
}

/// Log info-level message
///
/// Use for important state changes and user-facing events
#[macro_export]
macro_rules! actor_info {
    ($($arg:tt)*) => {
        $crate::__tracing::info!($($arg)*)
    };
}

/// Log warning-level message
///
/// Use for recoverable errors and unexpected conditions
#[macro_export]
macro_rules! actor_warn {
    ($($arg:tt)*) => {
        $crate::__tracing::warn!($($arg)*)
    };
}

/// Log error-level message
///
/// Use for failures the operator should know about
#[macro_export]
macro_rules! actor_error {
    ($($arg:tt)*) => {
        $crate::__tracing::error!($($arg)*)
    };
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    #[test]
    fn test_logging_macros_compile() {
        actor_debug!("test debug");
        actor_info!("test info");
        actor_warn!("test warn");
        actor_error!("test error");
    }

    #[test]
    fn test_logging_with_format_args() {
        actor_debug!("SerialLink: {} → {}", "Connected", "Disconnected");
        actor_info!("Port opened at {} baud", 115200);
        actor_warn!("Read error on {}: {}", "/dev/ttyUSB0", "timed out");
        actor_error!("Failed to open port: {}", "Access denied");
    }
}
