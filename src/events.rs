//! Typed event dispatch for panes, containers and the workspace facade.
//!
//! Each component owns one [`Emitter`] per event kind. Listeners run
//! synchronously, in registration order, inside the mutating call that
//! produced the event. Subscribing returns a [`Subscription`] that removes the
//! listener when disposed or dropped.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::item::ItemHandle;
use crate::pane::PaneId;

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Listeners<E> {
    next_id: u64,
    entries: Vec<(u64, Listener<E>)>,
}

/// Synchronous single-kind event dispatcher.
pub struct Emitter<E> {
    listeners: Arc<Mutex<Listeners<E>>>,
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<E: 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Emitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a listener.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = {
            let mut listeners = self.listeners.lock();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, Arc::new(listener)));
            id
        };

        let weak: Weak<Mutex<Listeners<E>>> = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.lock().entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Invoke every listener with `event`.
    ///
    /// The listener list is snapshotted first, so listeners may subscribe or
    /// dispose while the event is being delivered.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .listeners
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().entries.len()
    }
}

/// Disposable handle returned by [`Emitter::subscribe`].
///
/// Dropping the handle disposes it; call [`Subscription::detach`] to keep the
/// listener for as long as the emitter lives.
#[must_use = "dropping a Subscription removes the listener immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Remove the listener now.
    pub fn dispose(mut self) {
        self.run();
    }

    /// Keep the listener registered for the lifetime of the emitter.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.unsubscribe.is_none()
    }

    fn run(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// Several subscriptions disposed together.
#[derive(Debug, Default)]
pub struct CompositeSubscription {
    subscriptions: Vec<Subscription>,
}

impl CompositeSubscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn dispose(self) {
        for subscription in self.subscriptions {
            subscription.dispose();
        }
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// A pane was added, is about to be destroyed, or was destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneEvent {
    pub pane: PaneId,
}

/// An item entered or left a pane.
#[derive(Clone)]
pub struct PaneItemEvent {
    pub item: ItemHandle,
    pub pane: PaneId,
    pub index: usize,
}

/// The container's active pane changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePaneEvent {
    /// Previously active pane; `None` when it no longer exists.
    pub previous: Option<PaneId>,
    pub current: PaneId,
}

/// A pane's active item changed (or, at container level, the active pane's).
#[derive(Clone)]
pub struct ActiveItemEvent {
    pub pane: PaneId,
    pub item: Option<ItemHandle>,
}

/// An item changed position, within a pane or between panes.
#[derive(Clone)]
pub struct MoveItemEvent {
    pub item: ItemHandle,
    pub from_pane: PaneId,
    pub from_index: usize,
    pub to_pane: PaneId,
    pub to_index: usize,
}

/// An item in the container reported a new title.
#[derive(Clone)]
pub struct ItemTitleEvent {
    pub item: ItemHandle,
    pub title: Option<String>,
}

/// Event re-emitted by a workspace location, tagged with that location.
#[derive(Clone)]
pub struct Located<E> {
    pub location: Arc<str>,
    pub event: E,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_listeners_run_in_registration_order() {
        let emitter: Emitter<u32> = Emitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first_log = Arc::clone(&log);
        let _a = emitter.subscribe(move |v| first_log.lock().push(("a", *v)));
        let second_log = Arc::clone(&log);
        let _b = emitter.subscribe(move |v| second_log.lock().push(("b", *v)));

        emitter.emit(&7);
        assert_eq!(*log.lock(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_dispose_and_drop_remove_listener() {
        let emitter: Emitter<()> = Emitter::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = Arc::clone(&hits);
        let sub = emitter.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        emitter.emit(&());
        sub.dispose();
        emitter.emit(&());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        {
            let h = Arc::clone(&hits);
            let _scoped = emitter.subscribe(move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            });
            assert_eq!(emitter.listener_count(), 1);
        }
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn test_detach_keeps_listener() {
        let emitter: Emitter<()> = Emitter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        emitter
            .subscribe(move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            })
            .detach();
        emitter.emit(&());
        emitter.emit(&());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_may_subscribe_during_dispatch() {
        let emitter: Emitter<()> = Emitter::new();
        let inner = emitter.clone();
        let late = Arc::new(Mutex::new(Vec::new()));
        let late_clone = Arc::clone(&late);
        emitter
            .subscribe(move |_| {
                late_clone.lock().push(inner.subscribe(|_| {}));
            })
            .detach();

        emitter.emit(&());
        assert_eq!(emitter.listener_count(), 2);
    }

    #[test]
    fn test_subscription_outliving_emitter_is_harmless() {
        let emitter: Emitter<()> = Emitter::new();
        let sub = emitter.subscribe(|_| {});
        drop(emitter);
        sub.dispose();
    }

    #[test]
    fn test_composite_disposes_all() {
        let emitter: Emitter<()> = Emitter::new();
        let mut composite = CompositeSubscription::new();
        composite.add(emitter.subscribe(|_| {}));
        composite.add(emitter.subscribe(|_| {}));
        assert_eq!(composite.len(), 2);
        assert_eq!(emitter.listener_count(), 2);
        composite.dispose();
        assert_eq!(emitter.listener_count(), 0);
    }
}
