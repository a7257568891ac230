//! Cancellation utilities for interruptible actor operations
//!
//! Provides helpers for racing futures against a cancellation flag,
//! so a sleeping loop stops as soon as the flag is raised instead of
//! finishing its sleep first.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// One-shot cancellation flag shared between a controller and a task.
///
/// Clones observe the same flag. Once cancelled it stays cancelled.
#[derive(Clone, Default)]
pub struct CancelFlag {
    inner: Arc<Inner>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Completes when the flag is set
    pub async fn cancelled(&self) {
        loop {
            // Register before checking so a concurrent cancel() is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for CancelFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelFlag")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Races a future against cancellation, returns None if cancelled
///
/// # Example
/// ```ignore
/// match race_with_cancellation(tokio::time::sleep(poll), &flag).await {
///     Some(()) => continue,   // slept normally
///     None => break,          // disconnected while sleeping
/// }
/// ```
pub async fn race_with_cancellation<T, F>(fut: F, flag: &CancelFlag) -> Option<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = flag.cancelled() => None,
        result = fut => Some(result),
    }
}
