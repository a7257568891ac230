use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use actor_protocol::SystemEvent;
use actor_runtime::EventSender;
use core_types::{Direction, TranscriptDisplay, TranscriptEvent};

/// Ordered, append-only log shared by the session actor and the read loop.
///
/// Appends and clears are serialized by one lock, and the matching
/// [`SystemEvent`] is published while that lock is held. Observers of the
/// event channel therefore see the same order as [`snapshot`](Self::snapshot),
/// and a clear never lets an earlier append show up after it.
#[derive(Clone, Default)]
pub struct Transcript {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    events: Vec<TranscriptEvent>,
    next_seq: u64,
    event_tx: Option<EventSender>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript that also publishes every change as a [`SystemEvent`].
    pub fn with_events(event_tx: EventSender) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                event_tx: Some(event_tx),
                ..Inner::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an event, assigning it the next sequence number.
    pub fn append(&self, mut event: TranscriptEvent) -> TranscriptEvent {
        let mut inner = self.lock();
        event.seq = inner.next_seq;
        inner.next_seq += 1;
        inner.events.push(event.clone());
        if let Some(tx) = &inner.event_tx {
            // Receiver may be gone
            let _ = tx.unbounded_send(SystemEvent::TranscriptAppended {
                event: event.clone(),
            });
        }
        event
    }

    /// Shorthand for appending a freshly timestamped event.
    pub fn record(&self, direction: Direction, text: impl Into<String>) -> TranscriptEvent {
        self.append(TranscriptEvent::new(direction, text))
    }

    /// Drop every event appended so far.
    ///
    /// Sequence numbers keep increasing across clears.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.events.clear();
        if let Some(tx) = &inner.event_tx {
            let _ = tx.unbounded_send(SystemEvent::TranscriptCleared);
        }
    }

    /// All events so far, in append order.
    pub fn snapshot(&self) -> Vec<TranscriptEvent> {
        self.lock().events.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }

    /// Render the current contents into a display from scratch.
    pub fn replay_into(&self, display: &mut dyn TranscriptDisplay) {
        display.render_transcript_cleared();
        for event in self.snapshot() {
            display.render_transcript_append(&event);
        }
    }
}

/// Pass transcript-related events on to a display.
///
/// Returns false for events that are not about the transcript.
pub fn forward_event(display: &mut dyn TranscriptDisplay, event: &SystemEvent) -> bool {
    match event {
        SystemEvent::TranscriptAppended { event } => {
            display.render_transcript_append(event);
            true
        }
        SystemEvent::TranscriptCleared => {
            display.render_transcript_cleared();
            true
        }
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use futures::stream::StreamExt;
    use futures_channel::mpsc;

    #[derive(Default)]
    struct Lines(Vec<String>);

    impl TranscriptDisplay for Lines {
        fn render_transcript_append(&mut self, event: &TranscriptEvent) {
            self.0.push(format!("{}: {}", event.direction.label(), event.text));
        }

        fn render_transcript_cleared(&mut self) {
            self.0.clear();
        }
    }

    #[test]
    fn test_append_assigns_increasing_seq() {
        let transcript = Transcript::new();
        let a = transcript.record(Direction::Sent, "$a$");
        let b = transcript.record(Direction::Received, "ok");
        assert!(b.seq > a.seq);
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_clear_keeps_seq_monotonic() {
        let transcript = Transcript::new();
        let before = transcript.record(Direction::System, "one");
        transcript.clear();
        assert!(transcript.is_empty());
        let after = transcript.record(Direction::System, "two");
        assert!(after.seq > before.seq);
        assert_eq!(transcript.snapshot().len(), 1);
    }

    #[test]
    fn test_concurrent_appends_keep_per_writer_order() {
        let transcript = Transcript::new();
        let writers: Vec<_> = [Direction::Sent, Direction::Received]
            .into_iter()
            .map(|direction| {
                let transcript = transcript.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        transcript.record(direction, i.to_string());
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let events = transcript.snapshot();
        assert_eq!(events.len(), 400);
        for direction in [Direction::Sent, Direction::Received] {
            let texts: Vec<usize> = events
                .iter()
                .filter(|e| e.direction == direction)
                .map(|e| e.text.parse().unwrap())
                .collect();
            assert_eq!(texts, (0..200).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn test_events_published_in_append_order() {
        let (tx, rx) = mpsc::unbounded();
        let transcript = Transcript::with_events(tx);
        transcript.record(Direction::Sent, "$x$");
        transcript.clear();
        transcript.record(Direction::Received, "done");
        drop(transcript);

        let mut display = Lines::default();
        let events: Vec<_> = rx.collect().await;
        assert_eq!(events.len(), 3);
        for event in &events {
            assert!(forward_event(&mut display, event));
        }
        assert_eq!(display.0, vec!["RECV: done".to_string()]);
        assert!(!forward_event(&mut display, &SystemEvent::status("Ready")));
    }

    #[test]
    fn test_replay_into_display() {
        let transcript = Transcript::new();
        transcript.record(Direction::Sent, "$print(1)$");
        transcript.record(Direction::Received, "1");

        let mut display = Lines(vec!["stale".into()]);
        transcript.replay_into(&mut display);
        assert_eq!(display.0, vec!["SENT: $print(1)$", "RECV: 1"]);
    }
}
