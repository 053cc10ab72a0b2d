//! Split node with an ordered list of children.
//!
//! Orientation is fixed at construction; changing split direction means
//! wrapping nodes in a new axis. Collapsing an axis left with one child is
//! done by the container, which owns parent re-linking.

use crate::error::{PaneError, Result};

use super::common::{AxisId, NodeId, Orientation, ParentRef};

/// Tree node for a split
#[derive(Debug, Clone)]
pub struct PaneAxis {
    id: AxisId,
    orientation: Orientation,
    children: Vec<NodeId>,
    parent: ParentRef,
}

impl PaneAxis {
    pub fn new(id: AxisId, orientation: Orientation, parent: ParentRef) -> Self {
        Self {
            id,
            orientation,
            children: Vec::new(),
            parent,
        }
    }

    pub fn id(&self) -> AxisId {
        self.id
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> ParentRef {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: ParentRef) {
        self.parent = parent;
    }

    pub fn index_of(&self, child: NodeId) -> Option<usize> {
        self.children.iter().position(|c| *c == child)
    }

    fn require_index(&self, child: NodeId) -> Result<usize> {
        self.index_of(child).ok_or(PaneError::ChildNotFound {
            axis: self.id,
            child,
        })
    }

    /// Insert a child at `index` (clamped), or append when `None`.
    pub fn add_child(&mut self, child: NodeId, index: Option<usize>) -> usize {
        let index = index
            .unwrap_or(self.children.len())
            .min(self.children.len());
        self.children.insert(index, child);
        index
    }

    pub fn insert_child_before(&mut self, reference: NodeId, child: NodeId) -> Result<usize> {
        let index = self.require_index(reference)?;
        self.children.insert(index, child);
        Ok(index)
    }

    pub fn insert_child_after(&mut self, reference: NodeId, child: NodeId) -> Result<usize> {
        let index = self.require_index(reference)? + 1;
        self.children.insert(index, child);
        Ok(index)
    }

    /// Remove a child. Returns how many children remain.
    pub fn remove_child(&mut self, child: NodeId) -> Result<usize> {
        let index = self.require_index(child)?;
        self.children.remove(index);
        Ok(self.children.len())
    }

    /// Put `new` where `old` was.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        let index = self.require_index(old)?;
        self.children[index] = new;
        Ok(())
    }

    /// Neighbor used when a child leaves: the next sibling, else the previous.
    pub fn adjacent_child(&self, child: NodeId) -> Option<NodeId> {
        let index = self.index_of(child)?;
        self.children
            .get(index + 1)
            .or_else(|| index.checked_sub(1).and_then(|i| self.children.get(i)))
            .copied()
    }
}
