//! Item operations for PaneContainer
//!
//! Adding, activating, reordering, moving and destroying items, plus the
//! save entry points. Every operation is keyed by the pane holding the item.

use std::path::Path;

use super::PaneContainer;
use crate::error::{PaneError, Result};
use crate::events::{ActiveItemEvent, MoveItemEvent, PaneItemEvent};
use crate::item::{ItemHandle, destroy_item_resources, display_title, is_modified, same_item};
use crate::pane::types::{AddItemOptions, PaneId};

/// Result of the synchronous part of destroying an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemDestroy {
    /// The item was removed and its resources released
    Destroyed,
    /// The item has unsaved changes; nothing happened
    NeedsConfirmation,
}

/// Aggregate outcome of [`PaneContainer::save_all`]
#[derive(Debug, Default)]
pub struct SaveAllReport {
    /// Items saved successfully
    pub saved: usize,
    /// One entry per item whose save failed
    pub failures: Vec<PaneError>,
}

impl SaveAllReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl PaneContainer {
    // ------------------------------------------------------------------------
    // Active item bookkeeping
    // ------------------------------------------------------------------------

    /// Change a pane's active item and emit the resulting events.
    fn change_active_item(&mut self, pane: PaneId, item: Option<ItemHandle>) {
        let changed = self
            .panes
            .get_mut(&pane)
            .is_some_and(|p| p.set_active_item(item));
        if changed {
            self.announce_active_item(pane);
        }
    }

    /// Emit active-item events for a pane whose active item just changed.
    fn announce_active_item(&mut self, pane: PaneId) {
        let Some(p) = self.panes.get(&pane) else {
            return;
        };
        let event = ActiveItemEvent {
            pane,
            item: p.active_item().cloned(),
        };
        p.events.did_change_active_item.emit(&event);

        if pane == self.active_pane {
            self.events.did_change_active_pane_item.emit(&event);
            self.stop_changing.schedule(event);
        }
    }

    pub(super) fn require_item_index(&self, pane: PaneId, item: &ItemHandle) -> Result<usize> {
        self.require_pane(pane)?
            .index_of(item)
            .ok_or(PaneError::ItemNotFound { pane })
    }

    /// Remove an item from its pane without destroying it.
    ///
    /// Emits the pane's did-remove-item event and re-activates a neighbor
    /// when the removed item was active.
    pub(super) fn remove_item(&mut self, pane: PaneId, index: usize) -> Result<ItemHandle> {
        let p = self.require_pane_mut(pane)?;
        let (item, was_active) = p.take_item(index);
        p.events.did_remove_item.emit(&PaneItemEvent {
            item: item.clone(),
            pane,
            index,
        });
        if was_active {
            self.announce_active_item(pane);
        }
        Ok(item)
    }

    /// Destroy a pane left empty by an item removal, when configured to.
    pub(super) fn destroy_if_emptied(&mut self, pane: PaneId) -> Result<()> {
        let empty = self.panes.get(&pane).is_some_and(|p| p.is_empty());
        if empty && self.config.destroy_empty_panes && self.panes.len() > 1 {
            self.destroy_pane(pane)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Adding and activating
    // ------------------------------------------------------------------------

    /// Add an item to a pane.
    ///
    /// Fails with `DuplicateItem` when any pane of the container already
    /// holds the item. A pending add replaces the pane's current pending item
    /// (taking its slot) instead of appending. A replaced pending item with
    /// unsaved changes is pinned instead and the new item goes right after
    /// it. The first item of an empty pane becomes its active item. Returns
    /// the final index.
    pub fn add_item(
        &mut self,
        pane: PaneId,
        item: ItemHandle,
        options: AddItemOptions,
    ) -> Result<usize> {
        self.require_pane(pane)?;
        if let Some(holder) = self.pane_for_item(&item) {
            return Err(PaneError::DuplicateItem { pane: holder });
        }
        self.watch_item(&item);

        let p = self.require_pane_mut(pane)?;
        let replaced = if options.pending {
            p.pending_item().cloned()
        } else {
            None
        };
        let pin_replaced = replaced.as_ref().is_some_and(is_modified);
        let index = options.index.or_else(|| {
            let old = p.index_of(replaced.as_ref()?)?;
            Some(if pin_replaced { old + 1 } else { old })
        });
        let was_empty = p.is_empty();
        let index = p.insert_item(item.clone(), index);
        if options.pending {
            p.set_pending_item(Some(item.clone()));
        }

        crate::debug_log!("PANE_ITEM", "added item at {} of {}", index, pane);
        p.events.did_add_item.emit(&PaneItemEvent {
            item: item.clone(),
            pane,
            index,
        });

        let replaced_was_active = replaced
            .as_ref()
            .is_some_and(|old| p.active_item().is_some_and(|active| same_item(active, old)));
        if was_empty || replaced_was_active {
            self.change_active_item(pane, Some(item));
        }

        match replaced {
            Some(old) if pin_replaced => {
                crate::debug_info!(
                    "PANE_ITEM",
                    "kept modified pending item '{}' in {}",
                    display_title(&old),
                    pane
                );
            }
            Some(old) => self.commit_destroy_item(pane, &old)?,
            None => {}
        }
        Ok(index)
    }

    /// Make `item` the pane's active item and the pane the active pane.
    pub fn activate_item(&mut self, pane: PaneId, item: &ItemHandle) -> Result<()> {
        self.require_item_index(pane, item)?;
        self.change_active_item(pane, Some(item.clone()));
        self.set_active_pane(pane)
    }

    pub fn activate_item_at_index(&mut self, pane: PaneId, index: usize) -> Result<()> {
        let item = self
            .require_pane(pane)?
            .item_at(index)
            .cloned()
            .ok_or(PaneError::ItemNotFound { pane })?;
        self.activate_item(pane, &item)
    }

    /// Activate the item after the active one, wrapping around.
    ///
    /// Returns `false` when the pane holds fewer than two items.
    pub fn activate_next_item(&mut self, pane: PaneId) -> Result<bool> {
        self.activate_relative_item(pane, 1)
    }

    /// Activate the item before the active one, wrapping around.
    pub fn activate_previous_item(&mut self, pane: PaneId) -> Result<bool> {
        self.activate_relative_item(pane, -1)
    }

    fn activate_relative_item(&mut self, pane: PaneId, step: isize) -> Result<bool> {
        let p = self.require_pane(pane)?;
        let count = p.item_count();
        if count <= 1 {
            return Ok(false);
        }
        let current = p.active_item_index().unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(count as isize) as usize;
        self.activate_item_at_index(pane, next)?;
        Ok(true)
    }

    /// Activate the first item with this URI and its pane.
    ///
    /// Returns `false` when no item matches.
    pub fn activate_item_for_uri(&mut self, uri: &str) -> bool {
        let Some(pane) = self.pane_for_uri(uri) else {
            return false;
        };
        let Some(item) = self.panes.get(&pane).and_then(|p| p.item_for_uri(uri).cloned()) else {
            return false;
        };
        self.activate_item(pane, &item).is_ok()
    }

    pub fn set_pending_item(&mut self, pane: PaneId, item: &ItemHandle) -> Result<()> {
        self.require_item_index(pane, item)?;
        self.require_pane_mut(pane)?
            .set_pending_item(Some(item.clone()));
        Ok(())
    }

    /// Pin the pane's pending item so the next pending add appends.
    pub fn clear_pending_item(&mut self, pane: PaneId) -> Result<()> {
        self.require_pane_mut(pane)?.set_pending_item(None);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Moving
    // ------------------------------------------------------------------------

    /// Reorder an item within its pane. Returns the clamped new index.
    pub fn move_item(
        &mut self,
        pane: PaneId,
        item: &ItemHandle,
        new_index: usize,
    ) -> Result<usize> {
        let from_index = self.require_item_index(pane, item)?;
        let p = self.require_pane_mut(pane)?;
        let to_index = p.reorder_item(from_index, new_index);
        if to_index != from_index {
            p.events.did_move_item.emit(&MoveItemEvent {
                item: item.clone(),
                from_pane: pane,
                from_index,
                to_pane: pane,
                to_index,
            });
        }
        Ok(to_index)
    }

    /// Move an item into another pane as one step; the item is never
    /// destroyed.
    ///
    /// The item becomes the target pane's active item. A source pane left
    /// empty is destroyed under the `destroy_empty_panes` setting. Returns the
    /// index in the target pane.
    pub fn move_item_to_pane(
        &mut self,
        from: PaneId,
        item: &ItemHandle,
        to: PaneId,
        index: Option<usize>,
    ) -> Result<usize> {
        if from == to {
            let last = self.require_pane(from)?.item_count().saturating_sub(1);
            return self.move_item(from, item, index.unwrap_or(last));
        }
        let from_index = self.require_item_index(from, item)?;
        self.require_pane(to)?;

        let item = self.remove_item(from, from_index)?;

        let target = self.require_pane_mut(to)?;
        let to_index = target.insert_item(item.clone(), index);
        target.events.did_add_item.emit(&PaneItemEvent {
            item: item.clone(),
            pane: to,
            index: to_index,
        });
        self.change_active_item(to, Some(item.clone()));

        if let Some(source) = self.panes.get(&from) {
            source.events.did_move_item.emit(&MoveItemEvent {
                item,
                from_pane: from,
                from_index,
                to_pane: to,
                to_index,
            });
        }
        crate::debug_info!(
            "PANE_ITEM",
            "moved item {}[{}] -> {}[{}]",
            from,
            from_index,
            to,
            to_index
        );

        self.destroy_if_emptied(from)?;
        self.verify_tree("move_item_to_pane");
        Ok(to_index)
    }

    // ------------------------------------------------------------------------
    // Destroying
    // ------------------------------------------------------------------------

    /// Synchronous part of item destruction.
    ///
    /// With `force`, or when the item has no unsaved changes, the item is
    /// destroyed right away. Otherwise nothing changes and the caller must
    /// obtain a save decision first (see the close-confirmation protocol).
    pub fn try_destroy_item(
        &mut self,
        pane: PaneId,
        item: &ItemHandle,
        force: bool,
    ) -> Result<ItemDestroy> {
        self.require_item_index(pane, item)?;
        if !force && is_modified(item) {
            crate::debug_info!("ITEM_DESTROY", "item in {} needs confirmation", pane);
            return Ok(ItemDestroy::NeedsConfirmation);
        }
        self.commit_destroy_item(pane, item)?;
        Ok(ItemDestroy::Destroyed)
    }

    /// Remove and destroy an item unconditionally.
    ///
    /// Fires will-destroy before removal and did-destroy after. The pane is
    /// destroyed afterwards when it is left empty, configured to, and not the
    /// last pane.
    pub(crate) fn commit_destroy_item(&mut self, pane: PaneId, item: &ItemHandle) -> Result<()> {
        let index = self.require_item_index(pane, item)?;
        let event = PaneItemEvent {
            item: item.clone(),
            pane,
            index,
        };

        self.unwatch_item(item);
        let p = self.require_pane_mut(pane)?;
        p.events.will_destroy_item.emit(&event);
        let (_, was_active) = p.take_item(index);
        destroy_item_resources(item);
        p.events.did_destroy_item.emit(&event);
        crate::debug_info!("ITEM_DESTROY", "destroyed item {} of {}", index, pane);

        if was_active {
            self.announce_active_item(pane);
        }
        self.destroy_if_emptied(pane)?;
        self.verify_tree("destroy_item");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------------

    /// Save the pane's active item.
    ///
    /// Returns `Ok(false)` when the pane has no active item and
    /// `NotSavable` when the item cannot be saved.
    pub fn save_active_item(&self, pane: PaneId) -> Result<bool> {
        let Some(item) = self.require_pane(pane)?.active_item() else {
            return Ok(false);
        };
        save_item(item)?;
        Ok(true)
    }

    /// Save the pane's active item to a new path.
    pub fn save_active_item_as(&self, pane: PaneId, path: &Path) -> Result<bool> {
        let Some(item) = self.require_pane(pane)?.active_item() else {
            return Ok(false);
        };
        let savable = item.as_savable().ok_or_else(|| PaneError::NotSavable {
            title: display_title(item),
        })?;
        savable
            .save_as(path)
            .map_err(|e| PaneError::save_failed(display_title(item), e))?;
        Ok(true)
    }

    /// Save every savable item; failures are collected, not propagated.
    pub fn save_all(&self) -> SaveAllReport {
        let mut report = SaveAllReport::default();
        for item in self.get_items() {
            if item.as_savable().is_none() {
                continue;
            }
            match save_item(&item) {
                Ok(()) => report.saved += 1,
                Err(e) => {
                    log::warn!("save_all: {}", e);
                    report.failures.push(e);
                }
            }
        }
        report
    }
}

/// Invoke an item's save capability.
pub(crate) fn save_item(item: &ItemHandle) -> Result<()> {
    let savable = item.as_savable().ok_or_else(|| PaneError::NotSavable {
        title: display_title(item),
    })?;
    savable
        .save()
        .map_err(|e| PaneError::save_failed(display_title(item), e))
}
