//! Core types for the pane system.
//!
//! This module defines the node data structures of the layout tree:
//! - Leaf panes holding ordered items
//! - Axes holding ordered children of either kind
//! - Identifiers and back-references used by the arena in `PaneContainer`
//!
//! Sub-modules:
//! - [`axis`]: `PaneAxis` split node
//! - [`common`]: `PaneId`, `AxisId`, `NodeId`, `ParentRef`, `Orientation`,
//!   `SplitDirection`, option structs
//! - [`pane`]: `Pane` leaf node and its local item bookkeeping

mod axis;
mod common;
mod pane;


pub use axis::PaneAxis;
pub use common::{
    AddItemOptions, AxisId, NodeId, Orientation, PaneId, ParentRef, SplitDirection, SplitOptions,
};
pub use pane::Pane;
