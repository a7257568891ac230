//! Debounced re-highlighting.
//!
//! Edits only mark the scheduler dirty. The tokenizer runs when the caller
//! reaches an idle point, and at most one run is ever pending, so N edits
//! between two idle points cost one run instead of N.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use actor_runtime::actor_debug;
use core_types::EditSource;
use futures::stream::StreamExt;
use futures_channel::mpsc;

use crate::span::SpanSet;
use crate::tokenizer::tokenize_with;
use crate::vocabulary::Vocabulary;

/// Display collaborator that paints spans.
pub trait SpanRenderer {
    fn render_spans(&mut self, spans: &SpanSet);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct HighlightScheduler {
    vocab: Vocabulary,
    pending: AtomicBool,
    text: Mutex<String>,
    latest: Mutex<Arc<SpanSet>>,
    runs: AtomicU64,
}

impl HighlightScheduler {
    pub fn new() -> Self {
        Self::with_vocabulary(Vocabulary::LUA)
    }

    pub fn with_vocabulary(vocab: Vocabulary) -> Self {
        Self {
            vocab,
            pending: AtomicBool::new(false),
            text: Mutex::new(String::new()),
            latest: Mutex::new(Arc::new(SpanSet::default())),
            runs: AtomicU64::new(0),
        }
    }

    /// Record an edit. Returns `true` if this call queued a run, `false`
    /// if a run was already pending.
    pub fn on_text_changed(&self, full_text: &str) -> bool {
        {
            let mut text = lock(&self.text);
            text.clear();
            text.push_str(full_text);
        }
        self.mark_pending()
    }

    /// Record an edit without its text; the text is pulled at idle time via
    /// [`HighlightScheduler::on_idle_from`].
    pub fn notify(&self) -> bool {
        self.mark_pending()
    }

    fn mark_pending(&self) -> bool {
        !self.pending.swap(true, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Idle point: re-tokenize the last notified text if a run is pending.
    pub fn on_idle<R: SpanRenderer + ?Sized>(&self, renderer: &mut R) -> bool {
        if !self.pending.swap(false, Ordering::AcqRel) {
            return false;
        }
        let text = lock(&self.text).clone();
        self.run(&text, renderer);
        true
    }

    /// Idle point: re-tokenize the editor's current text if a run is pending.
    pub fn on_idle_from<E, R>(&self, source: &E, renderer: &mut R) -> bool
    where
        E: EditSource + ?Sized,
        R: SpanRenderer + ?Sized,
    {
        if !self.pending.swap(false, Ordering::AcqRel) {
            return false;
        }
        let text = source.get_current_text();
        self.run(&text, renderer);
        true
    }

    fn run<R: SpanRenderer + ?Sized>(&self, text: &str, renderer: &mut R) {
        let spans = Arc::new(tokenize_with(text, &self.vocab));
        // Replace the whole set in one step.
        *lock(&self.latest) = Arc::clone(&spans);
        let run = self.runs.fetch_add(1, Ordering::AcqRel) + 1;
        actor_debug!("Highlight run #{}: {} spans", run, spans.len());
        renderer.render_spans(&spans);
    }

    /// Span set from the most recent run.
    pub fn latest(&self) -> Arc<SpanSet> {
        Arc::clone(&lock(&self.latest))
    }

    /// Number of tokenizer runs so far.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Acquire)
    }
}

impl Default for HighlightScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive a scheduler from edit notifications.
///
/// Each message on the returned sender marks the text as changed. Once no
/// notification arrived for `idle`, the text is read from `source` and
/// tokenized. Dropping the sender flushes any pending run and stops the
/// task.
pub fn spawn_debounced<S, R>(
    scheduler: Arc<HighlightScheduler>,
    idle: Duration,
    source: S,
    mut renderer: R,
) -> (mpsc::UnboundedSender<()>, tokio::task::JoinHandle<()>)
where
    S: EditSource + Send + Sync + 'static,
    R: SpanRenderer + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded::<()>();

    let handle = tokio::spawn(async move {
        while rx.next().await.is_some() {
            scheduler.notify();
            loop {
                match tokio::time::timeout(idle, rx.next()).await {
                    Ok(Some(())) => {
                        scheduler.notify();
                    }
                    Ok(None) => {
                        scheduler.on_idle_from(&source, &mut renderer);
                        return;
                    }
                    Err(_) => break,
                }
            }
            scheduler.on_idle_from(&source, &mut renderer);
        }
    });

    (tx, handle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::span::SpanCategory;

    #[derive(Clone, Default)]
    struct Recorder {
        renders: Arc<Mutex<Vec<usize>>>,
    }

    impl SpanRenderer for Recorder {
        fn render_spans(&mut self, spans: &SpanSet) {
            self.renders.lock().unwrap().push(spans.len());
        }
    }

    #[test]
    fn test_burst_coalesces_to_one_run() {
        let scheduler = HighlightScheduler::new();
        let mut recorder = Recorder::default();

        assert!(scheduler.on_text_changed("l"));
        for text in ["lo", "loc", "loca", "local"] {
            assert!(!scheduler.on_text_changed(text));
        }
        assert!(scheduler.is_pending());

        assert!(scheduler.on_idle(&mut recorder));
        assert!(!scheduler.on_idle(&mut recorder));

        assert_eq!(scheduler.runs(), 1);
        assert_eq!(recorder.renders.lock().unwrap().len(), 1);
        let latest = scheduler.latest();
        assert_eq!(
            latest.iter().next().map(|s| s.category),
            Some(SpanCategory::Keyword)
        );
    }

    #[test]
    fn test_idle_without_edits_does_nothing() {
        let scheduler = HighlightScheduler::new();
        let mut recorder = Recorder::default();
        assert!(!scheduler.on_idle(&mut recorder));
        assert_eq!(scheduler.runs(), 0);
        assert!(scheduler.latest().is_empty());
    }

    #[test]
    fn test_pull_from_edit_source() {
        let scheduler = HighlightScheduler::new();
        let mut recorder = Recorder::default();
        let editor = String::from("x = 1 -- one");

        scheduler.notify();
        scheduler.notify();
        assert!(scheduler.on_idle_from(&editor, &mut recorder));
        assert_eq!(scheduler.runs(), 1);
        assert_eq!(scheduler.latest().of(SpanCategory::Comment).count(), 1);
    }

    #[test]
    fn test_each_run_replaces_spans() {
        let scheduler = HighlightScheduler::new();
        let mut recorder = Recorder::default();

        scheduler.on_text_changed("local a = 1");
        scheduler.on_idle(&mut recorder);
        scheduler.on_text_changed("b");
        scheduler.on_idle(&mut recorder);

        assert!(scheduler.latest().is_empty());
        assert_eq!(*recorder.renders.lock().unwrap(), vec![3, 0]);
    }

    #[derive(Clone, Default)]
    struct SharedEditor(Arc<Mutex<String>>);

    impl EditSource for SharedEditor {
        fn get_current_text(&self) -> String {
            self.0.lock().unwrap().clone()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_driver_reads_text_at_idle() {
        let scheduler = Arc::new(HighlightScheduler::new());
        let editor = SharedEditor::default();
        let recorder = Recorder::default();
        let (tx, handle) = spawn_debounced(
            scheduler.clone(),
            Duration::from_millis(50),
            editor.clone(),
            recorder.clone(),
        );

        for text in ["l", "lo", "local x = 1"] {
            *editor.0.lock().unwrap() = text.to_string();
            tx.unbounded_send(()).unwrap();
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(scheduler.runs(), 1);
        assert_eq!(scheduler.latest().of(SpanCategory::Keyword).count(), 1);
        assert_eq!(scheduler.latest().of(SpanCategory::Number).count(), 1);

        *editor.0.lock().unwrap() = "y = 2".to_string();
        tx.unbounded_send(()).unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(scheduler.runs(), 2);
        assert_eq!(recorder.renders.lock().unwrap().len(), 2);
    }
}
