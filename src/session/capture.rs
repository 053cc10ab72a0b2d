//! Capture the layout state of a pane container

use super::{AxisState, LAYOUT_STATE_VERSION, LayoutState, NodeState, PaneState};
use crate::item::display_title;
use crate::pane::{NodeId, Pane, PaneContainer};

impl PaneContainer {
    /// Snapshot the tree, the serializable items and the active selection.
    ///
    /// Items without the serialize capability are skipped; the active item
    /// index is adjusted to the items that remain.
    pub fn serialize(&self) -> LayoutState {
        let root = self.capture_node(self.root).unwrap_or_else(|| {
            NodeState::Pane(PaneState {
                id: Some(self.active_pane),
                items: Vec::new(),
                active_item_index: None,
            })
        });
        LayoutState {
            version: LAYOUT_STATE_VERSION,
            root,
            active_pane_id: Some(self.active_pane),
        }
    }

    fn capture_node(&self, node: NodeId) -> Option<NodeState> {
        match node {
            NodeId::Pane(id) => self
                .panes
                .get(&id)
                .map(|pane| NodeState::Pane(capture_pane(pane))),
            NodeId::Axis(id) => {
                let axis = self.axes.get(&id)?;
                Some(NodeState::Axis(AxisState {
                    orientation: axis.orientation(),
                    children: axis
                        .children()
                        .iter()
                        .filter_map(|child| self.capture_node(*child))
                        .collect(),
                }))
            }
        }
    }
}

fn capture_pane(pane: &Pane) -> PaneState {
    let active_index = pane.active_item_index();
    let mut items = Vec::new();
    let mut active_item_index = None;

    for (index, item) in pane.items().iter().enumerate() {
        let Some(serializable) = item.as_serializable() else {
            continue;
        };
        let value = match serde_json::to_value(serializable.serialize()) {
            Ok(value) => value,
            Err(e) => {
                log::warn!(
                    "Skipping item '{}' that failed to serialize: {}",
                    display_title(item),
                    e
                );
                continue;
            }
        };
        // Items before the active one that were skipped shift it left; a
        // skipped active item maps to the next serialized item.
        if active_item_index.is_none() && active_index.is_some_and(|active| index >= active) {
            active_item_index = Some(items.len());
        }
        items.push(value);
    }

    if active_item_index.is_none() && active_index.is_some() && !items.is_empty() {
        active_item_index = Some(items.len() - 1);
    }

    PaneState {
        id: Some(pane.id()),
        items,
        active_item_index,
    }
}
