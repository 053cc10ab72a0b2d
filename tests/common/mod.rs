//! Shared integration test helpers for par-workspace.
//!
//! This module provides test items with switchable capabilities, a scripted
//! save prompt, and a deserializer registry that understands the test items.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{TestItem, TestPrompt};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers are used per file.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use par_workspace::{
    Addressable, Copyable, Destroyable, Emitter, Item, ItemDeserializers, ItemHandle,
    ItemLifecycle, ItemState, LayoutConfig, LifecycleCallback, Modifiable, PaneContainer,
    PromptReason, Savable, SaveDecision, SavePrompt, SerializableItem, Subscription, Titled,
};

/// Deserializer tag of [`TestItem`]
pub const TEST_ITEM_TAG: &str = "TestItem";

/// Item whose capabilities are chosen at construction.
#[derive(Default)]
pub struct TestItem {
    pub title: String,
    pub uri: Option<String>,
    pub modifiable: bool,
    pub savable: bool,
    pub serializable: bool,
    pub copyable: bool,
    pub lifecycle: bool,
    pub renamed: Mutex<Option<String>>,
    pub did_destroy: Emitter<()>,
    pub did_change_title: Emitter<()>,
    pub modified: AtomicBool,
    pub fail_save: AtomicBool,
    pub saves: AtomicUsize,
    pub saved_as: Mutex<Option<PathBuf>>,
    pub destroyed: AtomicUsize,
}

impl TestItem {
    /// Item with a title and no other capability
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Document-like item: addressable, modifiable, savable, serializable
    pub fn document(title: &str) -> Self {
        Self {
            title: title.to_string(),
            uri: Some(format!("/project/{}", title)),
            modifiable: true,
            savable: true,
            serializable: true,
            ..Self::default()
        }
    }

    pub fn modified(self) -> Self {
        self.modified.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_save(self) -> Self {
        self.fail_save.store(true, Ordering::SeqCst);
        self
    }

    pub fn copyable(mut self) -> Self {
        self.copyable = true;
        self
    }

    /// Report self-destruction and retitling to the layout
    pub fn with_lifecycle(mut self) -> Self {
        self.lifecycle = true;
        self
    }

    /// Destroy the item from the outside, as when its file is deleted
    pub fn destroy_self(&self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        self.did_destroy.emit(&());
    }

    pub fn rename(&self, title: &str) {
        *self.renamed.lock() = Some(title.to_string());
        self.did_change_title.emit(&());
    }

    pub fn arc(self) -> Arc<TestItem> {
        Arc::new(self)
    }

    pub fn is_modified_now(&self) -> bool {
        self.modified.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn destroy_count(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl Item for TestItem {
    fn as_titled(&self) -> Option<&dyn Titled> {
        Some(self)
    }

    fn as_addressable(&self) -> Option<&dyn Addressable> {
        self.uri.as_ref().map(|_| self as &dyn Addressable)
    }

    fn as_modifiable(&self) -> Option<&dyn Modifiable> {
        self.modifiable.then_some(self as &dyn Modifiable)
    }

    fn as_savable(&self) -> Option<&dyn Savable> {
        self.savable.then_some(self as &dyn Savable)
    }

    fn as_destroyable(&self) -> Option<&dyn Destroyable> {
        Some(self)
    }

    fn as_serializable(&self) -> Option<&dyn SerializableItem> {
        self.serializable.then_some(self as &dyn SerializableItem)
    }

    fn as_copyable(&self) -> Option<&dyn Copyable> {
        self.copyable.then_some(self as &dyn Copyable)
    }

    fn as_lifecycle(&self) -> Option<&dyn ItemLifecycle> {
        self.lifecycle.then_some(self as &dyn ItemLifecycle)
    }
}

impl Titled for TestItem {
    fn title(&self) -> String {
        self.renamed.lock().clone().unwrap_or_else(|| self.title.clone())
    }
}

impl ItemLifecycle for TestItem {
    fn on_did_destroy(&self, callback: LifecycleCallback) -> Subscription {
        self.did_destroy.subscribe(move |_| callback())
    }

    fn on_did_change_title(&self, callback: LifecycleCallback) -> Subscription {
        self.did_change_title.subscribe(move |_| callback())
    }
}

impl Addressable for TestItem {
    fn uri(&self) -> String {
        self.uri.clone().unwrap_or_default()
    }
}

impl Modifiable for TestItem {
    fn is_modified(&self) -> bool {
        self.modified.load(Ordering::SeqCst)
    }
}

impl Savable for TestItem {
    fn save(&self) -> anyhow::Result<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.modified.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn save_as(&self, path: &Path) -> anyhow::Result<()> {
        self.save()?;
        *self.saved_as.lock() = Some(path.to_path_buf());
        Ok(())
    }
}

impl Destroyable for TestItem {
    fn destroy(&self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

impl SerializableItem for TestItem {
    fn serialize(&self) -> ItemState {
        ItemState::new(TEST_ITEM_TAG).with("title", self.title.clone())
    }
}

impl Copyable for TestItem {
    fn copy_item(&self) -> ItemHandle {
        Arc::new(TestItem {
            title: format!("{} (copy)", self.title),
            uri: self.uri.clone(),
            modifiable: self.modifiable,
            savable: self.savable,
            serializable: self.serializable,
            copyable: self.copyable,
            lifecycle: self.lifecycle,
            ..TestItem::default()
        })
    }
}

/// Handle for an `Arc<TestItem>`
pub fn handle(item: &Arc<TestItem>) -> ItemHandle {
    item.clone()
}

/// Title of an item handle, for assertions
pub fn title_of(item: &ItemHandle) -> String {
    par_workspace::item::item_title(item).unwrap_or_default()
}

/// Titles of every item in a pane
pub fn pane_titles(container: &PaneContainer, pane: par_workspace::PaneId) -> Vec<String> {
    container
        .pane(pane)
        .map(|p| p.items().iter().map(title_of).collect())
        .unwrap_or_default()
}

/// Registry rebuilding [`TestItem`]s as documents; titles starting with
/// "broken" fail to restore.
pub fn test_deserializers() -> ItemDeserializers {
    let mut registry = ItemDeserializers::new();
    registry.register(TEST_ITEM_TAG, |state: &ItemState| {
        let title = state
            .get_str("title")
            .ok_or_else(|| anyhow::anyhow!("missing title"))?;
        if title.starts_with("broken") {
            anyhow::bail!("cannot reopen {}", title);
        }
        Ok(Arc::new(TestItem::document(title)) as ItemHandle)
    });
    registry
}

pub fn test_config() -> LayoutConfig {
    LayoutConfig::default()
}

/// Save prompt answering from a script; answers `Cancel` once exhausted.
#[derive(Default)]
pub struct TestPrompt {
    decisions: Mutex<VecDeque<SaveDecision>>,
    asked: Mutex<Vec<(String, PromptReason)>>,
}

impl TestPrompt {
    pub fn new(decisions: impl IntoIterator<Item = SaveDecision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Titles prompted for, in order
    pub fn asked_titles(&self) -> Vec<String> {
        self.asked.lock().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn asked_reasons(&self) -> Vec<PromptReason> {
        self.asked.lock().iter().map(|(_, r)| *r).collect()
    }
}

impl SavePrompt for TestPrompt {
    fn prompt_save_decision(
        &self,
        item: &ItemHandle,
        reason: PromptReason,
    ) -> impl Future<Output = SaveDecision> + Send {
        self.asked.lock().push((title_of(item), reason));
        let decision = self
            .decisions
            .lock()
            .pop_front()
            .unwrap_or(SaveDecision::Cancel);
        std::future::ready(decision)
    }
}
