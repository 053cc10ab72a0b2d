//! Restore a pane container from layout state
//!
//! Items that fail to deserialize are dropped and reported. A pane that loses
//! all of its items that way is pruned, and axes left with fewer than two
//! children collapse. An unusable root falls back to a single empty pane.

use std::collections::HashMap;

use super::{AxisState, LAYOUT_STATE_VERSION, LayoutState, NodeState, PaneState};
use crate::error::PaneError;
use crate::events::{ActiveItemEvent, ActivePaneEvent, PaneItemEvent};
use crate::item::{ItemDeserializers, ItemHandle, display_title, same_item};
use crate::pane::{NodeId, PaneContainer, PaneId, ParentRef};

/// Summary of a restore
#[derive(Debug, Default)]
pub struct RestoreReport {
    /// Per-item failures, in tree order
    pub dropped: Vec<PaneError>,
    /// Panes removed because none of their items could be restored
    pub pruned_panes: usize,
    /// The state was unusable and the container was reset to one empty pane
    pub fell_back: bool,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.pruned_panes == 0 && !self.fell_back
    }
}

/// Mapping from saved pane ids to the ids issued during this restore
type IdMap = HashMap<PaneId, PaneId>;

impl PaneContainer {
    /// Replace the current tree with the one described by `state`.
    ///
    /// Current panes and items are destroyed first. Saved pane ids are
    /// remapped to fresh ids; the pane saved as active becomes active, or the
    /// first pane when it did not survive or the state names none.
    pub fn deserialize(
        &mut self,
        state: LayoutState,
        deserializers: &ItemDeserializers,
    ) -> RestoreReport {
        let mut report = RestoreReport::default();
        self.clear_tree();

        if state.version != LAYOUT_STATE_VERSION {
            log::warn!(
                "Layout state version {} is not supported (expected {}), starting empty",
                state.version,
                LAYOUT_STATE_VERSION
            );
            report.fell_back = true;
            self.reseed_root();
            return report;
        }

        let mut ids = IdMap::new();
        let root = self.restore_node(
            state.root,
            ParentRef::Container,
            deserializers,
            &mut ids,
            &mut report,
        );
        let Some(root) = root else {
            crate::debug_info!("SESSION", "nothing survived restore, starting empty");
            self.reseed_root();
            return report;
        };
        self.root = root;
        self.set_node_parent(root, ParentRef::Container);

        let panes = self.get_panes();
        let active = state
            .active_pane_id
            .and_then(|saved| ids.get(&saved).copied())
            .filter(|id| self.panes.contains_key(id))
            .or_else(|| panes.first().copied());
        if let Some(active) = active {
            self.active_pane = active;
        }

        for id in &panes {
            self.emit_pane_added(*id);
            self.announce_restored_items(*id);
        }
        crate::debug_info!(
            "SESSION",
            "restored {} panes, {} items dropped, {} panes pruned",
            panes.len(),
            report.dropped.len(),
            report.pruned_panes
        );
        self.announce_restored_activation();
        self.verify_tree("deserialize");
        report
    }

    /// Restore from raw persisted JSON; unparseable input falls back to a
    /// single empty pane.
    pub fn deserialize_value(
        &mut self,
        value: serde_json::Value,
        deserializers: &ItemDeserializers,
    ) -> RestoreReport {
        match serde_json::from_value::<LayoutState>(value) {
            Ok(state) => self.deserialize(state, deserializers),
            Err(e) => {
                log::warn!("Failed to parse layout state, starting empty: {}", e);
                self.clear_tree();
                self.reseed_root();
                RestoreReport {
                    fell_back: true,
                    ..RestoreReport::default()
                }
            }
        }
    }

    fn restore_node(
        &mut self,
        node: NodeState,
        parent: ParentRef,
        deserializers: &ItemDeserializers,
        ids: &mut IdMap,
        report: &mut RestoreReport,
    ) -> Option<NodeId> {
        match node {
            NodeState::Pane(pane) => self
                .restore_pane(pane, parent, deserializers, ids, report)
                .map(NodeId::Pane),
            NodeState::Axis(axis) => self.restore_axis(axis, parent, deserializers, ids, report),
        }
    }

    fn restore_pane(
        &mut self,
        state: PaneState,
        parent: ParentRef,
        deserializers: &ItemDeserializers,
        ids: &mut IdMap,
        report: &mut RestoreReport,
    ) -> Option<PaneId> {
        let had_items = !state.items.is_empty();
        let mut restored: Vec<(usize, ItemHandle)> = Vec::new();

        for (index, raw) in state.items.into_iter().enumerate() {
            match deserializers.deserialize_value(raw) {
                Ok(item) => {
                    if self.panes.values().any(|p| p.contains(&item))
                        || restored.iter().any(|(_, r)| same_item(r, &item))
                    {
                        log::warn!(
                            "Restore: skipping item '{}' already in the layout",
                            display_title(&item)
                        );
                        continue;
                    }
                    restored.push((index, item));
                }
                Err(e) => {
                    log::warn!("Restore: {}", e);
                    report.dropped.push(e);
                }
            }
        }

        if had_items && restored.is_empty() {
            report.pruned_panes += 1;
            crate::debug_info!(
                "SESSION",
                "pruned saved pane {:?} with no restorable items",
                state.id
            );
            return None;
        }

        let active = state
            .active_item_index
            .and_then(|saved| nearest_survivor(&restored, saved));

        for (_, item) in &restored {
            self.watch_item(item);
        }
        let id = self.create_pane(parent);
        let pane = self.panes.get_mut(&id)?;
        for (_, item) in &restored {
            pane.insert_item(item.clone(), None);
        }
        let active = active.or(if restored.is_empty() { None } else { Some(0) });
        if let Some(position) = active {
            pane.set_active_item(pane.item_at(position).cloned());
        }
        if let Some(saved) = state.id {
            ids.insert(saved, id);
        }
        Some(id)
    }

    fn restore_axis(
        &mut self,
        state: AxisState,
        parent: ParentRef,
        deserializers: &ItemDeserializers,
        ids: &mut IdMap,
        report: &mut RestoreReport,
    ) -> Option<NodeId> {
        let axis_id = self.create_axis(state.orientation, parent);
        let mut children = Vec::new();
        for child in state.children {
            if let Some(node) =
                self.restore_node(child, ParentRef::Axis(axis_id), deserializers, ids, report)
            {
                children.push(node);
            }
        }

        match children.len() {
            0 => {
                self.axes.remove(&axis_id);
                None
            }
            1 => {
                self.axes.remove(&axis_id);
                let only = children[0];
                self.set_node_parent(only, parent);
                Some(only)
            }
            _ => {
                let axis = self.axes.get_mut(&axis_id)?;
                for child in children {
                    axis.add_child(child, None);
                }
                Some(NodeId::Axis(axis_id))
            }
        }
    }

    fn announce_restored_items(&self, id: PaneId) {
        let Some(pane) = self.panes.get(&id) else {
            return;
        };
        for (index, item) in pane.items().iter().enumerate() {
            pane.events.did_add_item.emit(&PaneItemEvent {
                item: item.clone(),
                pane: id,
                index,
            });
        }
    }

    fn announce_restored_activation(&mut self) {
        let current = self.active_pane;
        let item = self.active_item();
        if let Some(pane) = self.panes.get(&current) {
            pane.events.did_change_active.emit(&true);
        }
        self.events
            .did_change_active_pane
            .emit(&ActivePaneEvent {
                previous: None,
                current,
            });
        let event = ActiveItemEvent {
            pane: current,
            item,
        };
        self.events.did_change_active_pane_item.emit(&event);
        self.stop_changing.schedule(event);
    }
}

/// Position among `restored` of the saved index, or of the nearest survivor
/// after it, else before it.
fn nearest_survivor(restored: &[(usize, ItemHandle)], saved: usize) -> Option<usize> {
    restored
        .iter()
        .position(|(original, _)| *original >= saved)
        .or_else(|| restored.len().checked_sub(1))
}
