//! Leaf node holding an ordered list of items and one active item.
//!
//! The pane only enforces its local invariants (no duplicate items, the
//! active item is always one of `items`, `None` only when empty). Anything
//! that touches the rest of the tree (activation of the pane itself, pane
//! destruction, event re-emission) is orchestrated by `PaneContainer`.

use crate::events::{
    ActiveItemEvent, Emitter, MoveItemEvent, PaneEvent, PaneItemEvent, Subscription,
};
use crate::item::{ItemHandle, item_uri, same_item};

use super::common::{PaneId, ParentRef};

/// Per-pane event emitters.
#[derive(Default)]
pub(crate) struct PaneEvents {
    pub(crate) did_add_item: Emitter<PaneItemEvent>,
    pub(crate) did_remove_item: Emitter<PaneItemEvent>,
    pub(crate) will_destroy_item: Emitter<PaneItemEvent>,
    pub(crate) did_destroy_item: Emitter<PaneItemEvent>,
    pub(crate) did_move_item: Emitter<MoveItemEvent>,
    pub(crate) did_change_active_item: Emitter<ActiveItemEvent>,
    pub(crate) did_change_active: Emitter<bool>,
    pub(crate) will_destroy: Emitter<PaneEvent>,
    pub(crate) did_destroy: Emitter<PaneEvent>,
}

/// A single pane with its items
pub struct Pane {
    /// Unique identifier for this pane
    id: PaneId,
    /// Items in display order
    items: Vec<ItemHandle>,
    /// Active item; always an element of `items` when `items` is non-empty
    active_item: Option<ItemHandle>,
    /// Preview item replaced (rather than appended to) by the next pending add
    pending_item: Option<ItemHandle>,
    /// Axis holding this pane, or the container when the pane is the root
    parent: ParentRef,
    pub(crate) events: PaneEvents,
}

impl Pane {
    pub(crate) fn new(id: PaneId, parent: ParentRef) -> Self {
        Self {
            id,
            items: Vec::new(),
            active_item: None,
            pending_item: None,
            parent,
            events: PaneEvents::default(),
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn parent(&self) -> ParentRef {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: ParentRef) {
        self.parent = parent;
    }

    pub fn items(&self) -> &[ItemHandle] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_at(&self, index: usize) -> Option<&ItemHandle> {
        self.items.get(index)
    }

    pub fn active_item(&self) -> Option<&ItemHandle> {
        self.active_item.as_ref()
    }

    pub fn active_item_index(&self) -> Option<usize> {
        self.active_item.as_ref().and_then(|item| self.index_of(item))
    }

    pub fn pending_item(&self) -> Option<&ItemHandle> {
        self.pending_item.as_ref()
    }

    pub fn index_of(&self, item: &ItemHandle) -> Option<usize> {
        self.items.iter().position(|candidate| same_item(candidate, item))
    }

    pub fn contains(&self, item: &ItemHandle) -> bool {
        self.index_of(item).is_some()
    }

    /// First item whose URI matches.
    pub fn item_for_uri(&self, uri: &str) -> Option<&ItemHandle> {
        self.items
            .iter()
            .find(|item| item_uri(item).as_deref() == Some(uri))
    }

    // ------------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------------

    pub fn on_did_add_item(
        &self,
        f: impl Fn(&PaneItemEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_add_item.subscribe(f)
    }

    /// Item left this pane without the pane destroying it: it moved to
    /// another pane or destroyed itself.
    pub fn on_did_remove_item(
        &self,
        f: impl Fn(&PaneItemEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_remove_item.subscribe(f)
    }

    pub fn on_will_destroy_item(
        &self,
        f: impl Fn(&PaneItemEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.will_destroy_item.subscribe(f)
    }

    pub fn on_did_destroy_item(
        &self,
        f: impl Fn(&PaneItemEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_destroy_item.subscribe(f)
    }

    pub fn on_did_move_item(
        &self,
        f: impl Fn(&MoveItemEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_move_item.subscribe(f)
    }

    pub fn on_did_change_active_item(
        &self,
        f: impl Fn(&ActiveItemEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_change_active_item.subscribe(f)
    }

    /// Fires `true` when this pane becomes the container's active pane and
    /// `false` when it stops being active.
    pub fn on_did_change_active(&self, f: impl Fn(&bool) + Send + Sync + 'static) -> Subscription {
        self.events.did_change_active.subscribe(f)
    }

    pub fn on_will_destroy(&self, f: impl Fn(&PaneEvent) + Send + Sync + 'static) -> Subscription {
        self.events.will_destroy.subscribe(f)
    }

    pub fn on_did_destroy(&self, f: impl Fn(&PaneEvent) + Send + Sync + 'static) -> Subscription {
        self.events.did_destroy.subscribe(f)
    }

    // ------------------------------------------------------------------------
    // Local mutations (container-driven)
    // ------------------------------------------------------------------------

    /// Insert an item, clamping the index to the valid range.
    ///
    /// The caller has already rejected duplicates. Returns the final index.
    pub(crate) fn insert_item(&mut self, item: ItemHandle, index: Option<usize>) -> usize {
        let index = index.unwrap_or(self.items.len()).min(self.items.len());
        self.items.insert(index, item);
        index
    }

    /// Set the active item. Returns `true` when it changed.
    pub(crate) fn set_active_item(&mut self, item: Option<ItemHandle>) -> bool {
        let changed = match (&self.active_item, &item) {
            (Some(current), Some(next)) => !same_item(current, next),
            (None, None) => false,
            _ => true,
        };
        if changed {
            self.active_item = item;
        }
        changed
    }

    pub(crate) fn set_pending_item(&mut self, item: Option<ItemHandle>) {
        self.pending_item = item;
    }

    /// Remove the item at `index`.
    ///
    /// If it was active, the item now at `index` becomes active, else the new
    /// last item, else none. Returns the removed item and whether the active
    /// item changed.
    pub(crate) fn take_item(&mut self, index: usize) -> (ItemHandle, bool) {
        let item = self.items.remove(index);

        if self
            .pending_item
            .as_ref()
            .is_some_and(|pending| same_item(pending, &item))
        {
            self.pending_item = None;
        }

        let was_active = self
            .active_item
            .as_ref()
            .is_some_and(|active| same_item(active, &item));
        if was_active {
            let next = self
                .items
                .get(index)
                .or_else(|| self.items.last())
                .cloned();
            self.active_item = next;
        }
        (item, was_active)
    }

    /// Move an item within this pane. Returns the clamped destination index.
    pub(crate) fn reorder_item(&mut self, from: usize, to: usize) -> usize {
        let item = self.items.remove(from);
        let to = to.min(self.items.len());
        self.items.insert(to, item);
        to
    }

    /// Remove every item at once (container teardown).
    pub(crate) fn drain_items(&mut self) -> Vec<ItemHandle> {
        self.active_item = None;
        self.pending_item = None;
        std::mem::take(&mut self.items)
    }
}

impl std::fmt::Debug for Pane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pane")
            .field("id", &self.id)
            .field("items", &self.items.len())
            .field("active_item_index", &self.active_item_index())
            .field("parent", &self.parent)
            .finish()
    }
}
