//! Pane layout tree
//!
//! This module provides the layout infrastructure of a workspace location:
//! - `Pane`: Leaf node holding ordered items and one active item
//! - `PaneAxis`: Split node grouping panes and axes along an orientation
//! - `PaneContainer`: Owns one tree and its single active pane
//! - `PaneId` / `AxisId` / `NodeId`: Arena identifiers

mod container;
mod types;

pub use container::{ItemDestroy, PaneContainer, SaveAllReport};
pub(crate) use container::save_item;
pub use types::{
    AddItemOptions, AxisId, NodeId, Orientation, Pane, PaneAxis, PaneId, ParentRef,
    SplitDirection, SplitOptions,
};
