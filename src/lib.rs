// Pane layout engine of a workspace location
//
// # Mutex Usage Policy
//
//   - `parking_lot::Mutex` guards the `PaneContainer` inside
//     `WorkspaceCenter` and the listener lists of every `Emitter`. Held only
//     for synchronous work; never held across an `.await`.
//
//   - Event listeners run while the container lock is held. A listener must
//     not call back into the same `WorkspaceCenter`; defer such work instead.
//
//   - The save prompt is the only suspension point. The close-confirmation
//     functions release the lock before awaiting it and re-validate their
//     target after re-locking.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod close_confirmation;
pub mod error;
pub mod events;
pub mod item;
pub mod pane;
pub mod session;
pub mod workspace_center;

pub use close_confirmation::{
    CloseOptions, CloseOutcome, CloseReport, DestroyOutcome, DestroyReport, PromptReason,
    SaveDecision, SavePrompt,
};
pub use error::{PaneError, Result};
pub use events::{
    ActiveItemEvent, ActivePaneEvent, CompositeSubscription, Emitter, ItemTitleEvent, Located,
    MoveItemEvent, PaneEvent, PaneItemEvent, Subscription,
};
pub use item::{
    Addressable, Copyable, Destroyable, Item, ItemDeserializers, ItemHandle, ItemLifecycle,
    ItemState, LifecycleCallback, Modifiable, Savable, SerializableItem, Titled,
};
pub use pane::{
    AddItemOptions, AxisId, ItemDestroy, NodeId, Orientation, Pane, PaneAxis, PaneContainer,
    PaneId, ParentRef, SaveAllReport, SplitDirection, SplitOptions,
};
pub use par_workspace_config::{ConfigError, LayoutConfig};
pub use session::{LAYOUT_STATE_VERSION, LayoutState, NodeState, RestoreReport};
pub use workspace_center::WorkspaceCenter;
