//! Pane container owning one layout tree
//!
//! The PaneContainer owns the node arena and provides operations for:
//! - Splitting panes and collapsing axes
//! - Adding, activating, moving and destroying items
//! - Tracking the single active pane
//! - Re-emitting pane events with container-level payloads
//!
//! Sub-modules:
//! - [`creation`]: Node creation and tree manipulation (split, remove, collapse).
//! - [`focus`]: Active pane management, navigation and pane destruction.
//! - [`items`]: Item lifecycle within and across panes, saving.
//! - [`lifecycle`]: Items that destroy or retitle themselves.
//! - [`stop_changing`]: Debounced "active item stopped changing" notification.

mod creation;
mod focus;
mod items;
mod lifecycle;
mod stop_changing;

pub(crate) use items::save_item;
pub use items::{ItemDestroy, SaveAllReport};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use par_workspace_config::LayoutConfig;

use crate::error::{PaneError, Result};
use crate::events::{
    ActiveItemEvent, ActivePaneEvent, CompositeSubscription, Emitter, ItemTitleEvent,
    MoveItemEvent, PaneEvent, PaneItemEvent, Subscription,
};
use crate::item::{ItemHandle, same_item};
use crate::pane::types::{AxisId, NodeId, Pane, PaneAxis, PaneId, ParentRef};

use lifecycle::DestroyedItemQueue;
use stop_changing::StopChangingDebouncer;

/// Container-level event emitters.
#[derive(Default)]
pub(crate) struct ContainerEvents {
    pub(crate) did_add_pane: Emitter<PaneEvent>,
    pub(crate) will_destroy_pane: Emitter<PaneEvent>,
    pub(crate) did_destroy_pane: Emitter<PaneEvent>,
    pub(crate) did_change_active_pane: Emitter<ActivePaneEvent>,
    pub(crate) did_add_pane_item: Emitter<PaneItemEvent>,
    pub(crate) will_destroy_pane_item: Emitter<PaneItemEvent>,
    pub(crate) did_destroy_pane_item: Emitter<PaneItemEvent>,
    pub(crate) did_change_active_pane_item: Emitter<ActiveItemEvent>,
    pub(crate) did_stop_changing_active_pane_item: Emitter<ActiveItemEvent>,
    pub(crate) did_move_pane_item: Emitter<MoveItemEvent>,
    pub(crate) did_change_pane_item_title: Emitter<ItemTitleEvent>,
}

/// Owns one pane tree and its single active pane
pub struct PaneContainer {
    /// Root of the tree; always present in `panes` or `axes`
    pub(crate) root: NodeId,
    /// Leaf nodes by id
    pub(crate) panes: HashMap<PaneId, Pane>,
    /// Split nodes by id
    pub(crate) axes: HashMap<AxisId, PaneAxis>,
    /// The globally active pane
    pub(crate) active_pane: PaneId,
    /// Counter shared by pane and axis ids
    pub(crate) next_id: u64,
    pub(crate) config: LayoutConfig,
    pub(crate) location: Arc<str>,
    pub(crate) events: ContainerEvents,
    pub(crate) stop_changing: StopChangingDebouncer,
    /// Lifecycle subscriptions of the items in the layout, by item identity
    pub(crate) watched_items: HashMap<usize, CompositeSubscription>,
    pub(crate) destroyed_items: DestroyedItemQueue,
}

impl PaneContainer {
    /// Create a container holding a single empty, active pane
    pub fn new(config: LayoutConfig) -> Self {
        let events = ContainerEvents::default();
        let stop_changing = StopChangingDebouncer::new(
            config.stop_changing_delay(),
            events.did_stop_changing_active_pane_item.clone(),
        );
        let location: Arc<str> = Arc::from(config.location.as_str());

        let mut container = Self {
            root: NodeId::Pane(PaneId::new(0)),
            panes: HashMap::new(),
            axes: HashMap::new(),
            active_pane: PaneId::new(0),
            next_id: 1,
            config,
            location,
            events,
            stop_changing,
            watched_items: HashMap::new(),
            destroyed_items: DestroyedItemQueue::default(),
        };
        let id = container.create_pane(ParentRef::Container);
        container.root = NodeId::Pane(id);
        container.active_pane = id;
        log::info!("Pane container '{}' created with pane {}", container.location, id);
        container
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a pane by ID
    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.panes.get(&id)
    }

    /// Get an axis by ID
    pub fn axis(&self, id: AxisId) -> Option<&PaneAxis> {
        self.axes.get(&id)
    }

    pub fn contains_pane(&self, id: PaneId) -> bool {
        self.panes.contains_key(&id)
    }

    pub(crate) fn require_pane(&self, id: PaneId) -> Result<&Pane> {
        self.panes.get(&id).ok_or(PaneError::PaneNotInContainer(id))
    }

    pub(crate) fn require_pane_mut(&mut self, id: PaneId) -> Result<&mut Pane> {
        self.panes
            .get_mut(&id)
            .ok_or(PaneError::PaneNotInContainer(id))
    }

    /// Get the number of panes
    pub fn pane_count(&self) -> usize {
        self.panes.len()
    }

    /// Leaf panes in pre-order (children visited in stored order).
    ///
    /// Next/previous pane navigation follows this order.
    pub fn get_panes(&self) -> Vec<PaneId> {
        let mut out = Vec::with_capacity(self.panes.len());
        self.collect_panes(self.root, &mut out);
        out
    }

    fn collect_panes(&self, node: NodeId, out: &mut Vec<PaneId>) {
        match node {
            NodeId::Pane(id) => out.push(id),
            NodeId::Axis(id) => {
                if let Some(axis) = self.axes.get(&id) {
                    for child in axis.children() {
                        self.collect_panes(*child, out);
                    }
                }
            }
        }
    }

    pub fn active_pane_id(&self) -> PaneId {
        self.active_pane
    }

    pub fn active_pane(&self) -> Option<&Pane> {
        self.panes.get(&self.active_pane)
    }

    /// Active item of the active pane
    pub fn active_item(&self) -> Option<ItemHandle> {
        self.active_pane()?.active_item().cloned()
    }

    /// Every item, pane by pane in pre-order
    pub fn get_items(&self) -> Vec<ItemHandle> {
        self.get_panes()
            .into_iter()
            .filter_map(|id| self.panes.get(&id))
            .flat_map(|pane| pane.items().iter().cloned())
            .collect()
    }

    /// Pane currently holding `item`
    pub fn pane_for_item(&self, item: &ItemHandle) -> Option<PaneId> {
        self.get_panes()
            .into_iter()
            .find(|id| self.panes.get(id).is_some_and(|pane| pane.contains(item)))
    }

    /// First pane holding an item with this URI
    pub fn pane_for_uri(&self, uri: &str) -> Option<PaneId> {
        self.get_panes().into_iter().find(|id| {
            self.panes
                .get(id)
                .is_some_and(|pane| pane.item_for_uri(uri).is_some())
        })
    }

    /// First item with this URI, searching panes in pre-order
    pub fn item_for_uri(&self, uri: &str) -> Option<ItemHandle> {
        let pane = self.pane_for_uri(uri)?;
        self.panes.get(&pane)?.item_for_uri(uri).cloned()
    }

    // ------------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------------

    pub fn on_did_add_pane(&self, f: impl Fn(&PaneEvent) + Send + Sync + 'static) -> Subscription {
        self.events.did_add_pane.subscribe(f)
    }

    pub fn on_will_destroy_pane(
        &self,
        f: impl Fn(&PaneEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.will_destroy_pane.subscribe(f)
    }

    pub fn on_did_destroy_pane(
        &self,
        f: impl Fn(&PaneEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_destroy_pane.subscribe(f)
    }

    pub fn on_did_change_active_pane(
        &self,
        f: impl Fn(&ActivePaneEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_change_active_pane.subscribe(f)
    }

    pub fn on_did_add_pane_item(
        &self,
        f: impl Fn(&PaneItemEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_add_pane_item.subscribe(f)
    }

    pub fn on_will_destroy_pane_item(
        &self,
        f: impl Fn(&PaneItemEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.will_destroy_pane_item.subscribe(f)
    }

    pub fn on_did_destroy_pane_item(
        &self,
        f: impl Fn(&PaneItemEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_destroy_pane_item.subscribe(f)
    }

    /// Active item of the active pane changed, either inside that pane or
    /// because another pane became active.
    pub fn on_did_change_active_pane_item(
        &self,
        f: impl Fn(&ActiveItemEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_change_active_pane_item.subscribe(f)
    }

    /// Debounced variant of [`Self::on_did_change_active_pane_item`]: fires
    /// once after a burst of changes settles.
    pub fn on_did_stop_changing_active_pane_item(
        &self,
        f: impl Fn(&ActiveItemEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_stop_changing_active_pane_item.subscribe(f)
    }

    pub fn on_did_move_pane_item(
        &self,
        f: impl Fn(&MoveItemEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_move_pane_item.subscribe(f)
    }

    /// An item in the layout changed its own title
    pub fn on_did_change_pane_item_title(
        &self,
        f: impl Fn(&ItemTitleEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.did_change_pane_item_title.subscribe(f)
    }

    /// Call `f` for every existing pane, then for every pane added later
    pub fn observe_panes(&self, f: impl Fn(&PaneEvent) + Send + Sync + 'static) -> Subscription {
        for pane in self.get_panes() {
            f(&PaneEvent { pane });
        }
        self.events.did_add_pane.subscribe(f)
    }

    /// Call `f` for every existing item, then for every item added later
    pub fn observe_pane_items(
        &self,
        f: impl Fn(&PaneItemEvent) + Send + Sync + 'static,
    ) -> Subscription {
        for id in self.get_panes() {
            if let Some(pane) = self.panes.get(&id) {
                for (index, item) in pane.items().iter().enumerate() {
                    f(&PaneItemEvent {
                        item: item.clone(),
                        pane: id,
                        index,
                    });
                }
            }
        }
        self.events.did_add_pane_item.subscribe(f)
    }

    /// Deliver a pending stop-changing notification immediately.
    ///
    /// Used when no tokio runtime drives the debounce timer.
    pub fn flush_stop_changing(&mut self) {
        self.stop_changing.flush();
    }

    // ------------------------------------------------------------------------
    // Consistency
    // ------------------------------------------------------------------------

    /// Verify every structural invariant of the tree.
    pub fn check_invariants(&self) -> Result<()> {
        let violation = |msg: String| Err(PaneError::InvariantViolation(msg));

        let mut seen_panes = HashSet::new();
        let mut seen_axes = HashSet::new();
        let mut stack = vec![(self.root, ParentRef::Container)];

        while let Some((node, expected_parent)) = stack.pop() {
            match node {
                NodeId::Pane(id) => {
                    let Some(pane) = self.panes.get(&id) else {
                        return violation(format!("{} is referenced but not in the arena", id));
                    };
                    if pane.parent() != expected_parent {
                        return violation(format!("{} has a stale parent link", id));
                    }
                    if !seen_panes.insert(id) {
                        return violation(format!("{} is reachable twice", id));
                    }
                }
                NodeId::Axis(id) => {
                    let Some(axis) = self.axes.get(&id) else {
                        return violation(format!("{} is referenced but not in the arena", id));
                    };
                    if axis.parent() != expected_parent {
                        return violation(format!("{} has a stale parent link", id));
                    }
                    if axis.children().len() < 2 {
                        return violation(format!(
                            "{} has {} children",
                            id,
                            axis.children().len()
                        ));
                    }
                    if !seen_axes.insert(id) {
                        return violation(format!("{} is reachable twice", id));
                    }
                    for child in axis.children().iter().rev() {
                        stack.push((*child, ParentRef::Axis(id)));
                    }
                }
            }
        }

        if seen_panes.is_empty() {
            return violation("tree holds no pane".to_string());
        }
        if seen_panes.len() != self.panes.len() || seen_axes.len() != self.axes.len() {
            return violation("arena holds unreachable nodes".to_string());
        }
        if !seen_panes.contains(&self.active_pane) {
            return violation(format!("active {} is not in the tree", self.active_pane));
        }

        let mut all_items: Vec<&ItemHandle> = Vec::new();
        for pane in self.panes.values() {
            match (pane.is_empty(), pane.active_item()) {
                (true, Some(_)) => {
                    return violation(format!("empty {} has an active item", pane.id()));
                }
                (false, None) => {
                    return violation(format!("{} has items but no active item", pane.id()));
                }
                (false, Some(active)) if !pane.contains(active) => {
                    return violation(format!("{} has a foreign active item", pane.id()));
                }
                _ => {}
            }
            if let Some(pending) = pane.pending_item()
                && !pane.contains(pending)
            {
                return violation(format!("{} has a foreign pending item", pane.id()));
            }
            for item in pane.items() {
                if all_items.iter().any(|seen| same_item(seen, item)) {
                    return violation(format!("an item of {} appears twice", pane.id()));
                }
                all_items.push(item);
            }
        }
        Ok(())
    }

    /// Log a violation after a mutation instead of panicking mid-operation.
    pub(crate) fn verify_tree(&self, operation: &str) {
        if let Err(e) = self.check_invariants() {
            crate::debug_error!("PANE_TREE", "after {}: {}", operation, e);
            log::error!("Pane tree corrupted after {}: {}", operation, e);
        }
    }
}

impl std::fmt::Debug for PaneContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaneContainer")
            .field("location", &self.location)
            .field("root", &self.root)
            .field("panes", &self.panes.len())
            .field("axes", &self.axes.len())
            .field("active_pane", &self.active_pane)
            .finish()
    }
}
