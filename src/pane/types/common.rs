//! Identifiers and shared enums for the pane system.

use crate::item::ItemHandle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a pane (leaf node) inside one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneId(u64);

impl PaneId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pane-{}", self.0)
    }
}

/// Stable identifier of an axis (split node) inside one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AxisId(u64);

impl AxisId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "axis-{}", self.0)
    }
}

/// Reference to any tree node: the children of an axis and the container root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    Pane(PaneId),
    Axis(AxisId),
}

impl NodeId {
    pub fn as_pane(self) -> Option<PaneId> {
        match self {
            NodeId::Pane(id) => Some(id),
            NodeId::Axis(_) => None,
        }
    }

    pub fn as_axis(self) -> Option<AxisId> {
        match self {
            NodeId::Axis(id) => Some(id),
            NodeId::Pane(_) => None,
        }
    }
}

impl From<PaneId> for NodeId {
    fn from(id: PaneId) -> Self {
        NodeId::Pane(id)
    }
}

impl From<AxisId> for NodeId {
    fn from(id: AxisId) -> Self {
        NodeId::Axis(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Pane(id) => id.fmt(f),
            NodeId::Axis(id) => id.fmt(f),
        }
    }
}

/// Non-owning back-reference from a node to whatever holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentRef {
    /// The node is the container root.
    Container,
    /// The node is a child of this axis.
    Axis(AxisId),
}

/// Orientation of an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Children are side by side (left/right splits)
    Horizontal,
    /// Children are stacked (up/down splits)
    Vertical,
}

/// Side on which a split places the new pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SplitDirection {
    /// Orientation of the axis that holds both panes after the split.
    pub fn orientation(self) -> Orientation {
        match self {
            SplitDirection::Left | SplitDirection::Right => Orientation::Horizontal,
            SplitDirection::Up | SplitDirection::Down => Orientation::Vertical,
        }
    }

    /// Whether the new pane goes before the split pane in child order.
    pub fn inserts_before(self) -> bool {
        matches!(self, SplitDirection::Left | SplitDirection::Up)
    }
}

/// Options for adding an item to a pane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddItemOptions {
    /// Insertion index; `None` appends.
    pub index: Option<usize>,
    /// Insert as the pane's preview item, replacing any previous preview.
    pub pending: bool,
}

impl AddItemOptions {
    pub fn at(index: usize) -> Self {
        Self {
            index: Some(index),
            pending: false,
        }
    }

    pub fn pending() -> Self {
        Self {
            index: None,
            pending: true,
        }
    }
}

/// Options for splitting a pane
#[derive(Clone, Default)]
pub struct SplitOptions {
    /// Items that seed the new pane.
    pub items: Vec<ItemHandle>,
    /// Seed the new pane with a copy of the split pane's active item.
    /// `None` falls back to the layout configuration.
    pub copy_active_item: Option<bool>,
}

impl SplitOptions {
    pub fn with_items(items: Vec<ItemHandle>) -> Self {
        Self {
            items,
            copy_active_item: None,
        }
    }

    pub fn copy_active_item() -> Self {
        Self {
            items: Vec::new(),
            copy_active_item: Some(true),
        }
    }
}
