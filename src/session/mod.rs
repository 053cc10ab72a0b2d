//! Layout state types for save/restore across restarts
//!
//! This module provides the persisted form of a pane container: the tree of
//! panes and axes, each pane's serialized items, and the active selection.
//! Where the state is stored is up to the caller.

pub mod capture;
pub mod restore;

pub use restore::RestoreReport;

use crate::pane::{Orientation, PaneId};
use serde::{Deserialize, Serialize};

/// Current version of the layout state format
pub const LAYOUT_STATE_VERSION: u32 = 1;

fn current_version() -> u32 {
    LAYOUT_STATE_VERSION
}

/// Top-level layout state of one container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    /// Format version; other versions are not restored
    #[serde(default = "current_version")]
    pub version: u32,
    /// Root of the pane tree
    pub root: NodeState,
    /// `id` of the pane that was active when the state was captured
    #[serde(default)]
    pub active_pane_id: Option<PaneId>,
}

/// Recursive tree node for layout persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeState {
    /// A pane leaf
    Pane(PaneState),
    /// A split with ordered children
    Axis(AxisState),
}

/// A single pane in a saved layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaneState {
    /// Pane id at capture time; only meaningful within this state
    #[serde(default)]
    pub id: Option<PaneId>,
    /// Serialized items in pane order. Entries are kept as raw JSON so one
    /// malformed entry only drops that item on restore.
    pub items: Vec<serde_json::Value>,
    /// Index into `items` of the active item
    #[serde(default)]
    pub active_item_index: Option<usize>,
}

/// A split node in a saved layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisState {
    pub orientation: Orientation,
    pub children: Vec<NodeState>,
}

impl NodeState {
    /// Number of pane leaves in this subtree
    pub fn pane_count(&self) -> usize {
        match self {
            NodeState::Pane(_) => 1,
            NodeState::Axis(axis) => axis.children.iter().map(NodeState::pane_count).sum(),
        }
    }
}
