//! Node creation and tree manipulation for PaneContainer
//!
//! Handles creating panes and axes, splitting, and removing nodes with the
//! single-child collapse rule.

use super::PaneContainer;
use crate::error::{PaneError, Result};
use crate::events::PaneEvent;
use crate::item::{ItemHandle, same_item};
use crate::pane::types::{
    AxisId, NodeId, Orientation, Pane, PaneAxis, PaneId, ParentRef, SplitDirection, SplitOptions,
};

impl PaneContainer {
    fn next_raw_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Create a pane in the arena and wire its item events to the container.
    ///
    /// The pane is not linked into the tree and no did-add-pane event fires;
    /// the caller does both once the pane is in place.
    pub(crate) fn create_pane(&mut self, parent: ParentRef) -> PaneId {
        let id = PaneId::new(self.next_raw_id());
        let pane = Pane::new(id, parent);

        let forward = self.events.did_add_pane_item.clone();
        pane.events
            .did_add_item
            .subscribe(move |e| forward.emit(e))
            .detach();
        let forward = self.events.will_destroy_pane_item.clone();
        pane.events
            .will_destroy_item
            .subscribe(move |e| forward.emit(e))
            .detach();
        let forward = self.events.did_destroy_pane_item.clone();
        pane.events
            .did_destroy_item
            .subscribe(move |e| forward.emit(e))
            .detach();
        let forward = self.events.did_move_pane_item.clone();
        pane.events
            .did_move_item
            .subscribe(move |e| forward.emit(e))
            .detach();

        self.panes.insert(id, pane);
        crate::debug_trace!("PANE_CREATE", "created {} under {:?}", id, parent);
        id
    }

    pub(crate) fn create_axis(&mut self, orientation: Orientation, parent: ParentRef) -> AxisId {
        let id = AxisId::new(self.next_raw_id());
        self.axes.insert(id, PaneAxis::new(id, orientation, parent));
        id
    }

    /// Announce a pane that is now linked into the tree.
    pub(crate) fn emit_pane_added(&self, pane: PaneId) {
        self.events.did_add_pane.emit(&PaneEvent { pane });
    }

    pub(crate) fn parent_of(&self, node: NodeId) -> Option<ParentRef> {
        match node {
            NodeId::Pane(id) => self.panes.get(&id).map(Pane::parent),
            NodeId::Axis(id) => self.axes.get(&id).map(PaneAxis::parent),
        }
    }

    pub(crate) fn set_node_parent(&mut self, node: NodeId, parent: ParentRef) {
        match node {
            NodeId::Pane(id) => {
                if let Some(pane) = self.panes.get_mut(&id) {
                    pane.set_parent(parent);
                }
            }
            NodeId::Axis(id) => {
                if let Some(axis) = self.axes.get_mut(&id) {
                    axis.set_parent(parent);
                }
            }
        }
    }

    /// First leaf of a subtree in pre-order.
    pub(crate) fn first_leaf(&self, node: NodeId) -> Option<PaneId> {
        match node {
            NodeId::Pane(id) => Some(id),
            NodeId::Axis(id) => {
                let first = *self.axes.get(&id)?.children().first()?;
                self.first_leaf(first)
            }
        }
    }

    /// Put `new` where `old` sits under `parent` and re-link `new`.
    fn replace_in_parent(&mut self, old: NodeId, new: NodeId, parent: ParentRef) -> Result<()> {
        match parent {
            ParentRef::Container => self.root = new,
            ParentRef::Axis(axis_id) => {
                let axis = self
                    .axes
                    .get_mut(&axis_id)
                    .ok_or_else(|| missing_axis(axis_id))?;
                axis.replace_child(old, new)?;
            }
        }
        self.set_node_parent(new, parent);
        Ok(())
    }

    /// Unlink a non-root node from its parent axis.
    ///
    /// An axis left with one child is replaced by that child in its own
    /// parent; an axis left with none is unlinked in turn. The node itself
    /// stays in the arena.
    pub(crate) fn detach_node(&mut self, node: NodeId) -> Result<()> {
        let Some(ParentRef::Axis(axis_id)) = self.parent_of(node) else {
            return Err(PaneError::InvariantViolation(format!(
                "{} has no parent axis to detach from",
                node
            )));
        };

        let axis = self
            .axes
            .get_mut(&axis_id)
            .ok_or_else(|| missing_axis(axis_id))?;
        let remaining = axis.remove_child(node)?;
        let grandparent = axis.parent();

        match remaining {
            0 => {
                if grandparent == ParentRef::Container {
                    return Err(PaneError::InvariantViolation(format!(
                        "root {} lost its last child",
                        axis_id
                    )));
                }
                self.detach_node(NodeId::Axis(axis_id))?;
                self.axes.remove(&axis_id);
            }
            1 => {
                let only = axis.children()[0];
                self.replace_in_parent(NodeId::Axis(axis_id), only, grandparent)?;
                self.axes.remove(&axis_id);
                crate::debug_info!(
                    "PANE_COLLAPSE",
                    "collapsed {} into {} (parent {:?})",
                    axis_id,
                    only,
                    grandparent
                );
            }
            _ => {}
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Splitting
    // ------------------------------------------------------------------------

    /// Split a pane, placing a new pane on the given side.
    ///
    /// The parent axis is reused when its orientation matches; otherwise the
    /// pane is wrapped in a new axis first. The new pane is seeded with
    /// `options.items`, or with a copy of the split pane's active item when
    /// copying is requested (explicitly or via the layout config) and no items
    /// were given. Activation does not change.
    pub fn split(
        &mut self,
        pane: PaneId,
        direction: SplitDirection,
        options: SplitOptions,
    ) -> Result<PaneId> {
        let parent = self.require_pane(pane)?.parent();
        let seed = self.split_seed(pane, options)?;
        let orientation = direction.orientation();

        let axis_id = match parent {
            ParentRef::Axis(axis_id)
                if self
                    .axes
                    .get(&axis_id)
                    .is_some_and(|axis| axis.orientation() == orientation) =>
            {
                axis_id
            }
            _ => {
                let axis_id = self.create_axis(orientation, parent);
                self.replace_in_parent(NodeId::Pane(pane), NodeId::Axis(axis_id), parent)?;
                if let Some(axis) = self.axes.get_mut(&axis_id) {
                    axis.add_child(NodeId::Pane(pane), None);
                }
                self.set_node_parent(NodeId::Pane(pane), ParentRef::Axis(axis_id));
                axis_id
            }
        };

        let new_pane = self.create_pane(ParentRef::Axis(axis_id));
        let axis = self
            .axes
            .get_mut(&axis_id)
            .ok_or_else(|| missing_axis(axis_id))?;
        if direction.inserts_before() {
            axis.insert_child_before(NodeId::Pane(pane), NodeId::Pane(new_pane))?;
        } else {
            axis.insert_child_after(NodeId::Pane(pane), NodeId::Pane(new_pane))?;
        }

        crate::debug_info!(
            "PANE_SPLIT",
            "split {} {:?}: new {} in {} ({} seed items)",
            pane,
            direction,
            new_pane,
            axis_id,
            seed.len()
        );
        self.emit_pane_added(new_pane);

        for item in seed {
            self.add_item(new_pane, item, Default::default())?;
        }

        self.verify_tree("split");
        Ok(new_pane)
    }

    pub fn split_left(&mut self, pane: PaneId, options: SplitOptions) -> Result<PaneId> {
        self.split(pane, SplitDirection::Left, options)
    }

    pub fn split_right(&mut self, pane: PaneId, options: SplitOptions) -> Result<PaneId> {
        self.split(pane, SplitDirection::Right, options)
    }

    pub fn split_up(&mut self, pane: PaneId, options: SplitOptions) -> Result<PaneId> {
        self.split(pane, SplitDirection::Up, options)
    }

    pub fn split_down(&mut self, pane: PaneId, options: SplitOptions) -> Result<PaneId> {
        self.split(pane, SplitDirection::Down, options)
    }

    /// Resolve and validate the items a split pane starts with, before the
    /// tree is touched.
    fn split_seed(&self, pane: PaneId, options: SplitOptions) -> Result<Vec<ItemHandle>> {
        if !options.items.is_empty() {
            for (i, item) in options.items.iter().enumerate() {
                if let Some(holder) = self.pane_for_item(item) {
                    return Err(PaneError::DuplicateItem { pane: holder });
                }
                if options.items[..i].iter().any(|prior| same_item(prior, item)) {
                    return Err(PaneError::DuplicateItem { pane });
                }
            }
            return Ok(options.items);
        }

        let copy = options
            .copy_active_item
            .unwrap_or(self.config.copy_active_item_on_split);
        if !copy {
            return Ok(Vec::new());
        }

        let copied = self
            .require_pane(pane)?
            .active_item()
            .and_then(|item| item.as_copyable())
            .map(|copyable| copyable.copy_item());
        Ok(copied.into_iter().collect())
    }
}

fn missing_axis(id: AxisId) -> PaneError {
    PaneError::InvariantViolation(format!("{} is referenced but not in the arena", id))
}
