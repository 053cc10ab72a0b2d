//! Item capability interfaces and the item deserializer registry.
//!
//! An item is any content unit a pane can hold (a document view, a preview,
//! a settings page). The engine never looks at an item's concrete type: it
//! asks the item for small capability views and skips whatever the item does
//! not provide.
//!
//! - [`Titled`]: display title
//! - [`Addressable`]: URI identity used by `pane_for_uri`
//! - [`Modifiable`]: unsaved-changes flag that triggers the save prompt
//! - [`Savable`]: `save` / `save_as`
//! - [`Destroyable`]: release resources when the item leaves the layout
//! - [`SerializableItem`]: persisted state for layout restore
//! - [`Copyable`]: duplicate for "split and copy active item"
//! - [`ItemLifecycle`]: notifications when the item destroys itself or
//!   retitles itself

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{PaneError, Result};
use crate::events::Subscription;

/// Shared handle to an item. Identity is pointer identity.
pub type ItemHandle = Arc<dyn Item>;

/// Capability discovery for an opaque item.
///
/// Every accessor defaults to `None`, so an implementor only overrides the
/// capabilities it actually has.
pub trait Item: Send + Sync {
    fn as_titled(&self) -> Option<&dyn Titled> {
        None
    }

    fn as_addressable(&self) -> Option<&dyn Addressable> {
        None
    }

    fn as_modifiable(&self) -> Option<&dyn Modifiable> {
        None
    }

    fn as_savable(&self) -> Option<&dyn Savable> {
        None
    }

    fn as_destroyable(&self) -> Option<&dyn Destroyable> {
        None
    }

    fn as_serializable(&self) -> Option<&dyn SerializableItem> {
        None
    }

    fn as_copyable(&self) -> Option<&dyn Copyable> {
        None
    }

    fn as_lifecycle(&self) -> Option<&dyn ItemLifecycle> {
        None
    }
}

/// Items with a display title.
pub trait Titled {
    fn title(&self) -> String;
}

/// Items identified by a URI (usually a file path).
pub trait Addressable {
    fn uri(&self) -> String;
}

/// Items that can carry unsaved changes.
pub trait Modifiable {
    fn is_modified(&self) -> bool;
}

/// Items that can be written back to their source.
pub trait Savable {
    fn save(&self) -> anyhow::Result<()>;

    fn save_as(&self, path: &Path) -> anyhow::Result<()>;
}

/// Items that hold resources to release when they leave the layout.
pub trait Destroyable {
    fn destroy(&self);
}

/// Items that can be persisted with the layout.
pub trait SerializableItem {
    fn serialize(&self) -> ItemState;
}

/// Items that can produce an independent duplicate of themselves.
pub trait Copyable {
    fn copy_item(&self) -> ItemHandle;
}

/// Callback registered through [`ItemLifecycle`].
pub type LifecycleCallback = Box<dyn Fn() + Send + Sync>;

/// Items that can go away or change title on their own, e.g. a document
/// whose file was deleted or renamed.
///
/// The container subscribes while the item is part of its layout. An item
/// that destroys itself is removed from its pane without a second `destroy`
/// call.
pub trait ItemLifecycle {
    fn on_did_destroy(&self, callback: LifecycleCallback) -> Subscription;

    fn on_did_change_title(&self, callback: LifecycleCallback) -> Subscription;
}

/// Persisted form of one item: a deserializer tag plus free-form data.
///
/// Serialized flat, e.g. `{"deserializer": "TextEditor", "path": "/a.rs"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
    /// Registry key of the constructor that rebuilds the item.
    pub deserializer: String,
    /// Item-specific payload.
    #[serde(flatten)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl ItemState {
    /// Create a state with an empty payload.
    pub fn new(deserializer: impl Into<String>) -> Self {
        Self {
            deserializer: deserializer.into(),
            data: serde_json::Map::new(),
        }
    }

    /// Builder-style payload field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Look up a string payload field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }
}

type DeserializeFn = Box<dyn Fn(&ItemState) -> anyhow::Result<ItemHandle> + Send + Sync>;

/// Registry from deserializer tag to item constructor.
#[derive(Default)]
pub struct ItemDeserializers {
    constructors: HashMap<String, DeserializeFn>,
}

impl ItemDeserializers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the constructor for a tag.
    pub fn register<F>(&mut self, tag: impl Into<String>, constructor: F)
    where
        F: Fn(&ItemState) -> anyhow::Result<ItemHandle> + Send + Sync + 'static,
    {
        self.constructors.insert(tag.into(), Box::new(constructor));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Rebuild an item from its persisted state.
    pub fn deserialize(&self, state: &ItemState) -> Result<ItemHandle> {
        let constructor =
            self.constructors
                .get(&state.deserializer)
                .ok_or_else(|| PaneError::Deserialization {
                    deserializer: state.deserializer.clone(),
                    reason: "no deserializer registered".to_string(),
                })?;

        constructor(state).map_err(|e| PaneError::Deserialization {
            deserializer: state.deserializer.clone(),
            reason: e.to_string(),
        })
    }

    /// Rebuild an item from a raw persisted entry.
    ///
    /// Entries that are not an [`ItemState`] object fail with the same
    /// `Deserialization` error as an unknown tag.
    pub fn deserialize_value(&self, value: serde_json::Value) -> Result<ItemHandle> {
        let tag = value
            .get("deserializer")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("<untagged>")
            .to_string();
        let state: ItemState =
            serde_json::from_value(value).map_err(|e| PaneError::Deserialization {
                deserializer: tag,
                reason: e.to_string(),
            })?;
        self.deserialize(&state)
    }
}

impl std::fmt::Debug for ItemDeserializers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&String> = self.constructors.keys().collect();
        tags.sort();
        f.debug_struct("ItemDeserializers")
            .field("tags", &tags)
            .finish()
    }
}

/// Pointer identity of two item handles.
pub fn same_item(a: &ItemHandle, b: &ItemHandle) -> bool {
    Arc::ptr_eq(a, b)
}

/// Title of an item, if it has one.
pub fn item_title(item: &ItemHandle) -> Option<String> {
    item.as_titled().map(|t| t.title())
}

/// Title of an item for messages, with a placeholder for untitled items.
pub fn display_title(item: &ItemHandle) -> String {
    item_title(item).unwrap_or_else(|| "untitled".to_string())
}

/// URI of an item, if it has one.
pub fn item_uri(item: &ItemHandle) -> Option<String> {
    item.as_addressable().map(|a| a.uri())
}

/// Whether the item reports unsaved changes. Items without the capability
/// are never modified.
pub fn is_modified(item: &ItemHandle) -> bool {
    item.as_modifiable().is_some_and(|m| m.is_modified())
}

/// Invoke the destroy capability if the item has one.
pub(crate) fn destroy_item_resources(item: &ItemHandle) {
    if let Some(destroyable) = item.as_destroyable() {
        destroyable.destroy();
    }
}
