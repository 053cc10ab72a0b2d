//! Active pane management and pane destruction for PaneContainer
//!
//! Handles the single-active-pane invariant, cyclic next/previous
//! navigation, and destroying panes with automatic activation transfer.

use super::PaneContainer;
use crate::error::Result;
use crate::events::{ActiveItemEvent, ActivePaneEvent, PaneEvent, PaneItemEvent};
use crate::item::{destroy_item_resources, is_modified};
use crate::pane::types::{NodeId, PaneId, ParentRef};

impl PaneContainer {
    /// Make `id` the active pane.
    ///
    /// No events fire when it is already active.
    pub fn set_active_pane(&mut self, id: PaneId) -> Result<()> {
        self.require_pane(id)?;
        if self.active_pane == id {
            return Ok(());
        }

        let previous = self.active_pane;
        self.active_pane = id;
        log::debug!("Active pane {} -> {}", previous, id);

        let previous = self.panes.get(&previous).map(|pane| {
            pane.events.did_change_active.emit(&false);
            pane.id()
        });
        self.announce_active_pane(previous);
        Ok(())
    }

    /// Fire the events that follow a change of `active_pane`.
    fn announce_active_pane(&mut self, previous: Option<PaneId>) {
        let current = self.active_pane;
        let item = match self.panes.get(&current) {
            Some(pane) => {
                pane.events.did_change_active.emit(&true);
                pane.active_item().cloned()
            }
            None => None,
        };
        self.events
            .did_change_active_pane
            .emit(&ActivePaneEvent { previous, current });

        let event = ActiveItemEvent {
            pane: current,
            item,
        };
        self.events.did_change_active_pane_item.emit(&event);
        self.stop_changing.schedule(event);
    }

    /// Activate the pane after the active one, wrapping to the first.
    ///
    /// Returns `false` when there is only one pane.
    pub fn activate_next_pane(&mut self) -> bool {
        self.activate_relative_pane(1)
    }

    /// Activate the pane before the active one, wrapping to the last.
    pub fn activate_previous_pane(&mut self) -> bool {
        self.activate_relative_pane(-1)
    }

    fn activate_relative_pane(&mut self, step: isize) -> bool {
        let panes = self.get_panes();
        if panes.len() <= 1 {
            return false;
        }
        let current = panes
            .iter()
            .position(|id| *id == self.active_pane)
            .unwrap_or(0);
        let len = panes.len() as isize;
        let next = (current as isize + step).rem_euclid(len) as usize;
        self.set_active_pane(panes[next]).is_ok()
    }

    // ------------------------------------------------------------------------
    // Destruction
    // ------------------------------------------------------------------------

    /// Destroy a pane and every item it holds.
    ///
    /// A no-op returning `false` when the pane is gone already or is the
    /// container's only pane. Items are destroyed without confirmation; run
    /// the close-confirmation protocol first when unsaved changes matter.
    pub fn destroy_pane(&mut self, id: PaneId) -> Result<bool> {
        if !self.panes.contains_key(&id) {
            crate::debug_info!("PANE_CLOSE", "{} already destroyed", id);
            return Ok(false);
        }
        if self.panes.len() == 1 {
            crate::debug_info!("PANE_CLOSE", "{} is the last pane, keeping it", id);
            return Ok(false);
        }

        let was_active = self.active_pane == id;
        let successor = self.successor_of(id);

        self.tear_down_pane(id)?;

        if was_active {
            let next = successor
                .filter(|candidate| self.panes.contains_key(candidate))
                .or_else(|| self.get_panes().first().copied());
            if let Some(next) = next {
                self.active_pane = next;
                crate::debug_info!("PANE_CLOSE", "closed active {}, new active {}", id, next);
                self.announce_active_pane(None);
            }
        }

        self.verify_tree("destroy_pane");
        Ok(true)
    }

    /// Destroy a pane even when it is the last one.
    ///
    /// The last pane is replaced by a fresh empty pane so the container never
    /// ends up without one.
    pub fn destroy_pane_forced(&mut self, id: PaneId) -> Result<()> {
        self.require_pane(id)?;
        if self.panes.len() > 1 {
            self.destroy_pane(id)?;
            return Ok(());
        }

        self.tear_down_pane(id)?;
        self.reseed_root();
        self.verify_tree("destroy_pane_forced");
        Ok(())
    }

    /// Destroy every empty pane, keeping at least one pane.
    ///
    /// Returns how many panes were destroyed.
    pub fn destroy_empty_panes(&mut self) -> usize {
        let mut destroyed = 0;
        for id in self.get_panes() {
            let empty = self.panes.get(&id).is_some_and(|pane| pane.is_empty());
            if empty && matches!(self.destroy_pane(id), Ok(true)) {
                destroyed += 1;
            }
        }
        destroyed
    }

    /// Destroy every pane and item and start over with one empty pane.
    ///
    /// Without `force` nothing happens when an item has unsaved changes;
    /// returns whether the container was reset.
    pub fn destroy(&mut self, force: bool) -> bool {
        if !force && self.get_items().iter().any(is_modified) {
            log::info!(
                "Container '{}' holds modified items, not destroying",
                self.location
            );
            return false;
        }

        self.clear_tree();
        self.reseed_root();
        true
    }

    /// Tear down every pane, leaving the arena empty.
    ///
    /// The caller must install a new root before returning to the user.
    pub(crate) fn clear_tree(&mut self) {
        let panes = self.get_panes();
        log::info!(
            "Destroying {} panes of container '{}'",
            panes.len(),
            self.location
        );
        for id in panes {
            if let Some(pane) = self.panes.get(&id) {
                pane.events.will_destroy.emit(&PaneEvent { pane: id });
            }
            self.events.will_destroy_pane.emit(&PaneEvent { pane: id });
            self.destroy_pane_contents(id);
            if let Some(pane) = self.panes.remove(&id) {
                pane.events.did_destroy.emit(&PaneEvent { pane: id });
                self.events.did_destroy_pane.emit(&PaneEvent { pane: id });
            }
        }
        self.axes.clear();
    }

    /// Install a fresh empty pane as root and make it active.
    pub(crate) fn reseed_root(&mut self) {
        let id = self.create_pane(ParentRef::Container);
        self.root = NodeId::Pane(id);
        self.active_pane = id;
        self.emit_pane_added(id);
        self.announce_active_pane(None);
    }

    /// Pane that takes over activation when `id` goes away: the next
    /// sibling, else the previous one, entering axes at their first leaf.
    fn successor_of(&self, id: PaneId) -> Option<PaneId> {
        let Some(ParentRef::Axis(axis_id)) = self.parent_of(NodeId::Pane(id)) else {
            return None;
        };
        let sibling = self.axes.get(&axis_id)?.adjacent_child(NodeId::Pane(id))?;
        self.first_leaf(sibling)
    }

    /// Emit will-destroy, destroy items, unlink, drop from the arena and emit
    /// did-destroy. Activation is left to the caller.
    fn tear_down_pane(&mut self, id: PaneId) -> Result<()> {
        crate::debug_info!("PANE_CLOSE", "destroying {}", id);
        if let Some(pane) = self.panes.get(&id) {
            pane.events.will_destroy.emit(&PaneEvent { pane: id });
        }
        self.events.will_destroy_pane.emit(&PaneEvent { pane: id });

        self.destroy_pane_contents(id);

        if self.root != NodeId::Pane(id) {
            self.detach_node(NodeId::Pane(id))?;
        }
        if let Some(pane) = self.panes.remove(&id) {
            pane.events.did_destroy.emit(&PaneEvent { pane: id });
        }
        self.events.did_destroy_pane.emit(&PaneEvent { pane: id });
        Ok(())
    }

    /// Destroy every item of a pane, front to back.
    fn destroy_pane_contents(&mut self, id: PaneId) {
        let Some(items) = self.panes.get_mut(&id).map(|pane| pane.drain_items()) else {
            return;
        };
        for item in &items {
            self.unwatch_item(item);
        }
        let Some(pane) = self.panes.get(&id) else {
            return;
        };
        for (index, item) in items.into_iter().enumerate() {
            let event = PaneItemEvent {
                item,
                pane: id,
                index,
            };
            pane.events.will_destroy_item.emit(&event);
            destroy_item_resources(&event.item);
            pane.events.did_destroy_item.emit(&event);
        }
    }
}
