//! Debounced "active pane item stopped changing" notification.
//!
//! Every active-item change replaces the pending event and restarts the
//! quiet-period timer, so a burst of changes yields one notification carrying
//! the last state. With a tokio runtime the timer is a spawned task that is
//! aborted on the next change; without one the event waits for `flush`.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::events::{ActiveItemEvent, Emitter};

pub(crate) struct StopChangingDebouncer {
    delay: Duration,
    emitter: Emitter<ActiveItemEvent>,
    pending: Arc<Mutex<Option<ActiveItemEvent>>>,
    timer: Option<JoinHandle<()>>,
}

impl StopChangingDebouncer {
    pub(crate) fn new(delay: Duration, emitter: Emitter<ActiveItemEvent>) -> Self {
        Self {
            delay,
            emitter,
            pending: Arc::new(Mutex::new(None)),
            timer: None,
        }
    }

    /// Record a change and restart the quiet period.
    pub(crate) fn schedule(&mut self, event: ActiveItemEvent) {
        *self.pending.lock() = Some(event);

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let Ok(handle) = Handle::try_current() else {
            crate::debug_trace!("STOP_CHANGING", "no runtime, event waits for flush");
            return;
        };

        let delay = self.delay;
        let pending = Arc::clone(&self.pending);
        let emitter = self.emitter.clone();
        self.timer = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let event = pending.lock().take();
            if let Some(event) = event {
                emitter.emit(&event);
            }
        }));
    }

    /// Deliver the pending event now, if any.
    pub(crate) fn flush(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let event = self.pending.lock().take();
        if let Some(event) = event {
            self.emitter.emit(&event);
        }
    }

    #[cfg(test)]
    pub(crate) fn has_pending(&self) -> bool {
        self.pending.lock().is_some()
    }
}

impl Drop for StopChangingDebouncer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::PaneId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event() -> ActiveItemEvent {
        ActiveItemEvent {
            pane: PaneId::new(1),
            item: None,
        }
    }

    fn counting(emitter: &Emitter<ActiveItemEvent>) -> Arc<AtomicUsize> {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        emitter
            .subscribe(move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            })
            .detach();
        hits
    }

    #[test]
    fn test_without_runtime_waits_for_flush() {
        let emitter = Emitter::new();
        let hits = counting(&emitter);
        let mut debouncer = StopChangingDebouncer::new(Duration::from_millis(100), emitter);

        debouncer.schedule(event());
        debouncer.schedule(event());
        assert!(debouncer.has_pending());
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        debouncer.flush();
        debouncer.flush();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!debouncer.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_one_notification() {
        let emitter = Emitter::new();
        let hits = counting(&emitter);
        let mut debouncer = StopChangingDebouncer::new(Duration::from_millis(100), emitter);

        debouncer.schedule(event());
        tokio::time::sleep(Duration::from_millis(60)).await;
        debouncer.schedule(event());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
