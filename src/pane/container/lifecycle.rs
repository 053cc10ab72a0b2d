//! Item self-destruction and retitling
//!
//! Items with the lifecycle capability are watched for as long as they are
//! part of the layout. A retitle is re-emitted right away. A self-destroy
//! only queues the item: the callback may fire while the container is busy,
//! so the removal happens in [`PaneContainer::remove_destroyed_items`].

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::PaneContainer;
use crate::error::Result;
use crate::events::{CompositeSubscription, Emitter, ItemTitleEvent};
use crate::item::{Item, ItemHandle, item_title};

/// Identity key of an item handle
fn item_key(item: &ItemHandle) -> usize {
    Arc::as_ptr(item) as *const () as usize
}

/// Items that destroyed themselves and still sit in a pane.
#[derive(Clone, Default)]
pub(crate) struct DestroyedItemQueue {
    queue: Arc<Mutex<Vec<Weak<dyn Item>>>>,
    /// Fires after an item was queued
    pub(crate) did_queue: Emitter<()>,
}

impl DestroyedItemQueue {
    fn push(&self, item: Weak<dyn Item>) {
        self.queue.lock().push(item);
        self.did_queue.emit(&());
    }

    fn take(&self) -> Vec<Weak<dyn Item>> {
        std::mem::take(&mut *self.queue.lock())
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

impl PaneContainer {
    /// Subscribe to an item that just entered the layout.
    pub(crate) fn watch_item(&mut self, item: &ItemHandle) {
        let Some(lifecycle) = item.as_lifecycle() else {
            return;
        };
        let mut subscriptions = CompositeSubscription::new();

        let queue = self.destroyed_items.clone();
        let weak = Arc::downgrade(item);
        subscriptions.add(lifecycle.on_did_destroy(Box::new(move || {
            queue.push(weak.clone());
        })));

        let titles = self.events.did_change_pane_item_title.clone();
        let weak = Arc::downgrade(item);
        subscriptions.add(lifecycle.on_did_change_title(Box::new(move || {
            if let Some(item) = weak.upgrade() {
                let title = item_title(&item);
                titles.emit(&ItemTitleEvent { item, title });
            }
        })));

        self.watched_items.insert(item_key(item), subscriptions);
    }

    /// Drop the subscriptions of an item that is leaving the layout.
    pub(crate) fn unwatch_item(&mut self, item: &ItemHandle) {
        self.watched_items.remove(&item_key(item));
    }

    /// Number of self-destroyed items waiting for removal
    pub fn pending_destroyed_items(&self) -> usize {
        self.destroyed_items.len()
    }

    /// Remove items that destroyed themselves from their panes.
    ///
    /// The item's own `destroy` is not called again. Panes left empty follow
    /// the `destroy_empty_panes` setting, as for any other removal. Returns
    /// the number of items removed.
    pub fn remove_destroyed_items(&mut self) -> Result<usize> {
        let mut removed = 0;
        for weak in self.destroyed_items.take() {
            let Some(item) = weak.upgrade() else {
                continue;
            };
            let Some(pane) = self.pane_for_item(&item) else {
                continue;
            };
            let index = self.require_item_index(pane, &item)?;
            self.unwatch_item(&item);
            self.remove_item(pane, index)?;
            crate::debug_info!("ITEM_DESTROY", "item {} of {} destroyed itself", index, pane);
            self.destroy_if_emptied(pane)?;
            removed += 1;
        }
        if removed > 0 {
            self.verify_tree("remove_destroyed_items");
        }
        Ok(removed)
    }
}
