//! The "center" location of a workspace.
//!
//! Wraps exactly one [`PaneContainer`] behind a mutex and forwards every
//! operation to it. Container events are re-emitted as [`Located`] events
//! through the facade's own emitters; the wiring is done once, in the
//! constructor, against a fixed set of container emitters.
//!
//! Listeners run while the container lock is held. A listener must not call
//! back into the same `WorkspaceCenter` synchronously; defer such work (spawn
//! a task or queue it) instead. The stop-changing notification is the one
//! exception: it is delivered from a timer task without the lock.
//!
//! An item that destroys itself is removed right away when the container is
//! free, otherwise by the next facade call that locks it.

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use par_workspace_config::LayoutConfig;

use crate::close_confirmation::{
    self, CloseOptions, CloseReport, DestroyOutcome, DestroyReport, SavePrompt,
};
use crate::error::Result;
use crate::events::{
    ActiveItemEvent, ActivePaneEvent, CompositeSubscription, Emitter, ItemTitleEvent, Located,
    MoveItemEvent, PaneEvent, PaneItemEvent, Subscription,
};
use crate::item::{ItemDeserializers, ItemHandle};
use crate::pane::{
    AddItemOptions, PaneContainer, PaneId, SaveAllReport, SplitDirection, SplitOptions,
};
use crate::session::{LayoutState, RestoreReport};

#[derive(Default)]
struct CenterEvents {
    did_add_pane: Emitter<Located<PaneEvent>>,
    will_destroy_pane: Emitter<Located<PaneEvent>>,
    did_destroy_pane: Emitter<Located<PaneEvent>>,
    did_change_active_pane: Emitter<Located<ActivePaneEvent>>,
    did_add_pane_item: Emitter<Located<PaneItemEvent>>,
    will_destroy_pane_item: Emitter<Located<PaneItemEvent>>,
    did_destroy_pane_item: Emitter<Located<PaneItemEvent>>,
    did_change_active_pane_item: Emitter<Located<ActiveItemEvent>>,
    did_stop_changing_active_pane_item: Emitter<Located<ActiveItemEvent>>,
    did_move_pane_item: Emitter<Located<MoveItemEvent>>,
    did_change_pane_item_title: Emitter<Located<ItemTitleEvent>>,
}

/// Subscribe `$target` to the container emitter `$source`, wrapping each
/// event with the location.
macro_rules! relay {
    ($wiring:expr, $location:expr, $source:expr, $target:expr) => {{
        let location = Arc::clone(&$location);
        let target = $target.clone();
        $wiring.add($source.subscribe(move |event| {
            target.emit(&Located {
                location: Arc::clone(&location),
                event: event.clone(),
            })
        }));
    }};
}

/// Facade over the center pane container; cheap to clone
#[derive(Clone)]
pub struct WorkspaceCenter {
    location: Arc<str>,
    container: Arc<Mutex<PaneContainer>>,
    events: Arc<CenterEvents>,
    _wiring: Arc<CompositeSubscription>,
}

impl WorkspaceCenter {
    pub fn new(config: LayoutConfig) -> Self {
        Self::with_container(PaneContainer::new(config))
    }

    /// Wrap an existing container
    pub fn with_container(container: PaneContainer) -> Self {
        let location: Arc<str> = Arc::from(container.location());
        let events = Arc::new(CenterEvents::default());
        let mut wiring = CompositeSubscription::new();

        {
            let source = &container.events;
            relay!(wiring, location, source.did_add_pane, events.did_add_pane);
            relay!(wiring, location, source.will_destroy_pane, events.will_destroy_pane);
            relay!(wiring, location, source.did_destroy_pane, events.did_destroy_pane);
            relay!(
                wiring,
                location,
                source.did_change_active_pane,
                events.did_change_active_pane
            );
            relay!(wiring, location, source.did_add_pane_item, events.did_add_pane_item);
            relay!(
                wiring,
                location,
                source.will_destroy_pane_item,
                events.will_destroy_pane_item
            );
            relay!(
                wiring,
                location,
                source.did_destroy_pane_item,
                events.did_destroy_pane_item
            );
            relay!(
                wiring,
                location,
                source.did_change_active_pane_item,
                events.did_change_active_pane_item
            );
            relay!(
                wiring,
                location,
                source.did_stop_changing_active_pane_item,
                events.did_stop_changing_active_pane_item
            );
            relay!(wiring, location, source.did_move_pane_item, events.did_move_pane_item);
            relay!(
                wiring,
                location,
                source.did_change_pane_item_title,
                events.did_change_pane_item_title
            );
        }
        log::info!("Workspace location '{}' ready ({} relays)", location, wiring.len());

        let container = Arc::new(Mutex::new(container));
        let weak = Arc::downgrade(&container);
        let on_destroyed = container.lock().destroyed_items.did_queue.subscribe(move |_| {
            let Some(container) = weak.upgrade() else {
                return;
            };
            // Busy: the next facade call removes the item
            if let Some(mut container) = container.try_lock()
                && let Err(e) = container.remove_destroyed_items()
            {
                log::warn!("Failed to remove self-destroyed items: {}", e);
            }
        });
        wiring.add(on_destroyed);

        Self {
            location,
            container,
            events,
            _wiring: Arc::new(wiring),
        }
    }

    /// Lock the container, first removing items that destroyed themselves
    /// while it was busy.
    fn lock(&self) -> MutexGuard<'_, PaneContainer> {
        let mut container = self.container.lock();
        if container.pending_destroyed_items() > 0
            && let Err(e) = container.remove_destroyed_items()
        {
            log::warn!("Failed to remove self-destroyed items: {}", e);
        }
        container
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// The shared container, for callers that drive the
    /// [`close_confirmation`] functions directly.
    pub fn container(&self) -> &Arc<Mutex<PaneContainer>> {
        &self.container
    }

    /// Run `f` with the container locked
    pub fn with<R>(&self, f: impl FnOnce(&PaneContainer) -> R) -> R {
        f(&self.lock())
    }

    /// Run `f` with the container locked mutably
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut PaneContainer) -> R) -> R {
        f(&mut self.lock())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn get_panes(&self) -> Vec<PaneId> {
        self.lock().get_panes()
    }

    pub fn get_active_pane(&self) -> PaneId {
        self.lock().active_pane_id()
    }

    pub fn get_active_pane_item(&self) -> Option<ItemHandle> {
        self.lock().active_item()
    }

    /// Every item of every pane, in pane order
    pub fn get_pane_items(&self) -> Vec<ItemHandle> {
        self.lock().get_items()
    }

    pub fn pane_for_item(&self, item: &ItemHandle) -> Option<PaneId> {
        self.lock().pane_for_item(item)
    }

    pub fn pane_for_uri(&self, uri: &str) -> Option<PaneId> {
        self.lock().pane_for_uri(uri)
    }

    pub fn item_for_uri(&self, uri: &str) -> Option<ItemHandle> {
        self.lock().item_for_uri(uri)
    }

    // ------------------------------------------------------------------------
    // Synchronous operations
    // ------------------------------------------------------------------------

    pub fn set_active_pane(&self, pane: PaneId) -> Result<()> {
        self.lock().set_active_pane(pane)
    }

    pub fn activate_next_pane(&self) -> bool {
        self.lock().activate_next_pane()
    }

    pub fn activate_previous_pane(&self) -> bool {
        self.lock().activate_previous_pane()
    }

    pub fn split(
        &self,
        pane: PaneId,
        direction: SplitDirection,
        options: SplitOptions,
    ) -> Result<PaneId> {
        self.lock().split(pane, direction, options)
    }

    /// Add an item to the active pane
    pub fn add_item(&self, item: ItemHandle, options: AddItemOptions) -> Result<usize> {
        let mut container = self.lock();
        let pane = container.active_pane_id();
        container.add_item(pane, item, options)
    }

    pub fn add_item_to_pane(
        &self,
        pane: PaneId,
        item: ItemHandle,
        options: AddItemOptions,
    ) -> Result<usize> {
        self.lock().add_item(pane, item, options)
    }

    pub fn activate_item(&self, pane: PaneId, item: &ItemHandle) -> Result<()> {
        self.lock().activate_item(pane, item)
    }

    pub fn activate_item_for_uri(&self, uri: &str) -> bool {
        self.lock().activate_item_for_uri(uri)
    }

    pub fn move_item_to_pane(
        &self,
        from: PaneId,
        item: &ItemHandle,
        to: PaneId,
        index: Option<usize>,
    ) -> Result<usize> {
        self.lock().move_item_to_pane(from, item, to, index)
    }

    pub fn destroy_empty_panes(&self) -> usize {
        self.lock().destroy_empty_panes()
    }

    /// Save the active item of the active pane
    pub fn save_active_pane_item(&self) -> Result<bool> {
        let container = self.lock();
        container.save_active_item(container.active_pane_id())
    }

    pub fn save_active_pane_item_as(&self, path: &Path) -> Result<bool> {
        let container = self.lock();
        container.save_active_item_as(container.active_pane_id(), path)
    }

    pub fn save_all(&self) -> SaveAllReport {
        self.lock().save_all()
    }

    pub fn serialize(&self) -> LayoutState {
        self.lock().serialize()
    }

    pub fn deserialize(
        &self,
        state: LayoutState,
        deserializers: &ItemDeserializers,
    ) -> RestoreReport {
        self.lock().deserialize(state, deserializers)
    }

    pub fn deserialize_value(
        &self,
        value: serde_json::Value,
        deserializers: &ItemDeserializers,
    ) -> RestoreReport {
        self.lock().deserialize_value(value, deserializers)
    }

    /// Destroy everything and start over with one empty pane
    pub fn destroy(&self, force: bool) -> bool {
        self.lock().destroy(force)
    }

    pub fn flush_stop_changing(&self) {
        self.lock().flush_stop_changing();
    }

    // ------------------------------------------------------------------------
    // Operations that may prompt
    // ------------------------------------------------------------------------

    pub async fn destroy_item<P: SavePrompt>(
        &self,
        pane: PaneId,
        item: &ItemHandle,
        force: bool,
        prompt: &P,
    ) -> Result<DestroyOutcome> {
        close_confirmation::destroy_item(&self.container, pane, item, force, prompt).await
    }

    pub async fn destroy_active_pane_item<P: SavePrompt>(
        &self,
        force: bool,
        prompt: &P,
    ) -> Result<Option<DestroyOutcome>> {
        close_confirmation::destroy_active_item(&self.container, force, prompt).await
    }

    pub async fn destroy_active_pane<P: SavePrompt>(&self, prompt: &P) -> Result<CloseReport> {
        close_confirmation::close_active_pane(&self.container, prompt).await
    }

    /// Close every item of the active pane except its active item
    pub async fn close_other_items<P: SavePrompt>(&self, prompt: &P) -> Result<DestroyReport> {
        let pane = self.get_active_pane();
        close_confirmation::destroy_inactive_items(&self.container, pane, prompt).await
    }

    pub async fn confirm_close<P: SavePrompt>(
        &self,
        options: CloseOptions,
        prompt: &P,
    ) -> CloseReport {
        close_confirmation::confirm_close(&self.container, options, prompt).await
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    pub fn on_did_add_pane(
        &self,
        f: impl Fn(&Located<PaneEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_add_pane.subscribe(f)
    }

    pub fn on_will_destroy_pane(
        &self,
        f: impl Fn(&Located<PaneEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.will_destroy_pane.subscribe(f)
    }

    pub fn on_did_destroy_pane(
        &self,
        f: impl Fn(&Located<PaneEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_destroy_pane.subscribe(f)
    }

    pub fn on_did_change_active_pane(
        &self,
        f: impl Fn(&Located<ActivePaneEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_change_active_pane.subscribe(f)
    }

    pub fn on_did_add_pane_item(
        &self,
        f: impl Fn(&Located<PaneItemEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_add_pane_item.subscribe(f)
    }

    pub fn on_will_destroy_pane_item(
        &self,
        f: impl Fn(&Located<PaneItemEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.will_destroy_pane_item.subscribe(f)
    }

    pub fn on_did_destroy_pane_item(
        &self,
        f: impl Fn(&Located<PaneItemEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_destroy_pane_item.subscribe(f)
    }

    pub fn on_did_change_active_pane_item(
        &self,
        f: impl Fn(&Located<ActiveItemEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_change_active_pane_item.subscribe(f)
    }

    pub fn on_did_stop_changing_active_pane_item(
        &self,
        f: impl Fn(&Located<ActiveItemEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_stop_changing_active_pane_item.subscribe(f)
    }

    pub fn on_did_move_pane_item(
        &self,
        f: impl Fn(&Located<MoveItemEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_move_pane_item.subscribe(f)
    }

    pub fn on_did_change_pane_item_title(
        &self,
        f: impl Fn(&Located<ItemTitleEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_change_pane_item_title.subscribe(f)
    }

    /// Call `f` for every current pane, then for each pane added later
    pub fn observe_panes(
        &self,
        f: impl Fn(&Located<PaneEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        for pane in self.get_panes() {
            f(&self.located(PaneEvent { pane }));
        }
        self.events.did_add_pane.subscribe(f)
    }

    /// Call `f` for every current item, then for each item added later
    pub fn observe_pane_items(
        &self,
        f: impl Fn(&Located<PaneItemEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        let existing: Vec<PaneItemEvent> = {
            let container = self.lock();
            let events: Vec<PaneItemEvent> = container
                .get_panes()
                .into_iter()
                .filter_map(|id| container.pane(id))
                .flat_map(|pane| {
                    pane.items()
                        .iter()
                        .enumerate()
                        .map(move |(index, item)| PaneItemEvent {
                            item: item.clone(),
                            pane: pane.id(),
                            index,
                        })
                })
                .collect();
            events
        };
        for event in existing {
            f(&self.located(event));
        }
        self.events.did_add_pane_item.subscribe(f)
    }

    /// Call `f` with the current active item, then on every change
    pub fn observe_active_pane_item(
        &self,
        f: impl Fn(&Located<ActiveItemEvent>) + Send + Sync + 'static,
    ) -> Subscription {
        let current = {
            let container = self.lock();
            ActiveItemEvent {
                pane: container.active_pane_id(),
                item: container.active_item(),
            }
        };
        f(&self.located(current));
        self.events.did_change_active_pane_item.subscribe(f)
    }

    fn located<E>(&self, event: E) -> Located<E> {
        Located {
            location: Arc::clone(&self.location),
            event,
        }
    }
}

impl std::fmt::Debug for WorkspaceCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceCenter")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
