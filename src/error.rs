//! Typed error types for the pane layout engine.
//!
//! Structural lookup failures (`ItemNotFound`, `ChildNotFound`,
//! `PaneNotInContainer`) always reach the immediate caller. Per-item failures
//! during bulk operations (restore, save-all) are collected into reports
//! instead of aborting the batch.

use crate::pane::{AxisId, NodeId, PaneId};
use thiserror::Error;

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, PaneError>;

/// Errors produced by pane, axis and container operations.
#[derive(Debug, Error)]
pub enum PaneError {
    // -----------------------------------------------------------------------
    // Structural lookups
    // -----------------------------------------------------------------------
    /// The item is already held by a pane of this container.
    #[error("Item is already present in pane {pane}")]
    DuplicateItem {
        /// Pane that currently holds the item.
        pane: PaneId,
    },

    /// The item is not one of the pane's items.
    #[error("Item not found in pane {pane}")]
    ItemNotFound {
        /// Pane that was searched.
        pane: PaneId,
    },

    /// The pane is not reachable from the container root (never existed or
    /// already destroyed).
    #[error("Pane {0} is not part of this container")]
    PaneNotInContainer(PaneId),

    /// The reference node is not a current child of the axis.
    #[error("Node {child} is not a child of axis {axis}")]
    ChildNotFound {
        /// Axis that was searched.
        axis: AxisId,
        /// Node that was expected among its children.
        child: NodeId,
    },

    // -----------------------------------------------------------------------
    // Item capabilities
    // -----------------------------------------------------------------------
    /// The item exposes no save capability.
    #[error("Item '{title}' cannot be saved")]
    NotSavable {
        /// Item title, or a placeholder for untitled items.
        title: String,
    },

    /// The item's save capability reported a failure.
    #[error("Failed to save '{title}': {source}")]
    SaveFailed {
        /// Item title, or a placeholder for untitled items.
        title: String,
        /// Failure reported by the item.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A persisted item could not be reconstructed.
    #[error("Failed to restore item '{deserializer}': {reason}")]
    Deserialization {
        /// Type tag recorded in the persisted item state.
        deserializer: String,
        /// Human-readable failure description.
        reason: String,
    },

    // -----------------------------------------------------------------------
    // Engine bugs
    // -----------------------------------------------------------------------
    /// The tree is in a state no completed operation may leave behind.
    #[error("Pane tree invariant violated: {0}")]
    InvariantViolation(String),
}

impl PaneError {
    /// Wrap a failure reported by an item's save capability.
    pub fn save_failed(title: impl Into<String>, source: anyhow::Error) -> Self {
        PaneError::SaveFailed {
            title: title.into(),
            source: source.into(),
        }
    }

    /// Whether this error reports a per-item failure that bulk operations
    /// collect instead of propagating.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            PaneError::SaveFailed { .. }
                | PaneError::NotSavable { .. }
                | PaneError::Deserialization { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_failed_keeps_source_message() {
        let err = PaneError::save_failed("notes.txt", anyhow::anyhow!("disk full"));
        assert_eq!(err.to_string(), "Failed to save 'notes.txt': disk full");
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.is_per_item());
    }

    #[test]
    fn test_structural_errors_are_not_per_item() {
        assert!(!PaneError::PaneNotInContainer(PaneId::new(3)).is_per_item());
        assert!(!PaneError::InvariantViolation("x".into()).is_per_item());
    }
}
