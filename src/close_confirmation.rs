//! Save-confirmation protocol run before destroying modified items.
//!
//! The container mutations stay synchronous; only the prompt suspends. Each
//! entry point locks the container to plan, releases the lock while the
//! prompt is pending, then re-locks and re-validates its target: an item that
//! disappeared in the meantime counts as discarded, and an item that moved is
//! destroyed in the pane that holds it now.

use std::future::Future;

use parking_lot::Mutex;

use crate::error::{PaneError, Result};
use crate::item::{ItemHandle, display_title, is_modified, same_item};
use crate::pane::{ItemDestroy, PaneContainer, PaneId, save_item};

/// Answer of the user (or of a policy) to "save changes?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    Save,
    Discard,
    Cancel,
}

/// Why the prompt is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptReason {
    /// A single item is being closed
    DestroyItem,
    /// The window hosting the workspace is closing
    CloseWindow,
    /// The workspace is closing without the window
    CloseWorkspace,
}

/// External collaborator that asks for a save decision.
///
/// The returned future may take arbitrarily long; there is no timeout.
pub trait SavePrompt: Send + Sync {
    fn prompt_save_decision(
        &self,
        item: &ItemHandle,
        reason: PromptReason,
    ) -> impl Future<Output = SaveDecision> + Send;
}

/// Outcome of destroying one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    Destroyed,
    /// The prompt answered `Cancel`; the item stays open
    Cancelled,
    /// The item left the layout while the prompt was pending
    AlreadyGone,
}

/// Aggregate outcome of a batch of item destructions
#[derive(Default)]
pub struct DestroyReport {
    pub destroyed: usize,
    /// Items kept open because their prompt was cancelled or their save failed
    pub kept: Vec<ItemHandle>,
    pub failures: Vec<PaneError>,
}

impl DestroyReport {
    /// Every item of the batch is gone
    pub fn all_destroyed(&self) -> bool {
        self.kept.is_empty()
    }
}

impl std::fmt::Debug for DestroyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestroyReport")
            .field("destroyed", &self.destroyed)
            .field("kept", &self.kept.len())
            .field("failures", &self.failures)
            .finish()
    }
}

/// Options for [`confirm_close`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseOptions {
    /// The whole window is closing, not just the workspace
    pub window_close_requested: bool,
}

/// Whether a close sequence may proceed
#[derive(Clone)]
pub enum CloseOutcome {
    Confirmed,
    /// Aborted at this item (cancelled prompt or failed save)
    Cancelled { item: ItemHandle },
}

impl std::fmt::Debug for CloseOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseOutcome::Confirmed => write!(f, "Confirmed"),
            CloseOutcome::Cancelled { item } => {
                write!(f, "Cancelled({})", display_title(item))
            }
        }
    }
}

/// Result of [`confirm_close`]
#[derive(Debug)]
pub struct CloseReport {
    pub outcome: CloseOutcome,
    pub saved: usize,
    pub discarded: usize,
    pub failures: Vec<PaneError>,
}

impl CloseReport {
    pub fn is_confirmed(&self) -> bool {
        matches!(self.outcome, CloseOutcome::Confirmed)
    }
}

/// Whether destroying the item requires a save decision
pub fn promptable(item: &ItemHandle) -> bool {
    is_modified(item)
}

// ============================================================================
// Single item
// ============================================================================

/// Destroy one item, prompting first when it has unsaved changes.
///
/// `Save` saves and then destroys; a failed save keeps the item and returns
/// the error. `Discard` destroys without saving. `Cancel` keeps the item.
pub async fn destroy_item<P: SavePrompt>(
    container: &Mutex<PaneContainer>,
    pane: PaneId,
    item: &ItemHandle,
    force: bool,
    prompt: &P,
) -> Result<DestroyOutcome> {
    let first = container.lock().try_destroy_item(pane, item, force)?;
    if first == ItemDestroy::Destroyed {
        return Ok(DestroyOutcome::Destroyed);
    }

    crate::debug_info!(
        "ITEM_DESTROY",
        "prompting for '{}' in {}",
        display_title(item),
        pane
    );
    let decision = prompt
        .prompt_save_decision(item, PromptReason::DestroyItem)
        .await;
    resolve_destroy(container, item, decision)
}

/// Act on a save decision for an item whose prompt has resolved.
fn resolve_destroy(
    container: &Mutex<PaneContainer>,
    item: &ItemHandle,
    decision: SaveDecision,
) -> Result<DestroyOutcome> {
    if decision == SaveDecision::Cancel {
        crate::debug_info!("ITEM_DESTROY", "'{}' kept (cancelled)", display_title(item));
        return Ok(DestroyOutcome::Cancelled);
    }

    if container.lock().pane_for_item(item).is_none() {
        crate::debug_info!("ITEM_DESTROY", "'{}' already gone", display_title(item));
        return Ok(DestroyOutcome::AlreadyGone);
    }

    if decision == SaveDecision::Save {
        save_item(item)?;
    }

    let mut guard = container.lock();
    let Some(current) = guard.pane_for_item(item) else {
        return Ok(DestroyOutcome::AlreadyGone);
    };
    guard.commit_destroy_item(current, item)?;
    Ok(DestroyOutcome::Destroyed)
}

// ============================================================================
// Batches
// ============================================================================

/// Destroy several items; a cancelled or failed item is kept and the rest
/// of the batch still runs.
pub async fn destroy_items<P: SavePrompt>(
    container: &Mutex<PaneContainer>,
    items: Vec<ItemHandle>,
    prompt: &P,
) -> DestroyReport {
    let mut report = DestroyReport::default();
    for item in items {
        let Some(pane) = container.lock().pane_for_item(&item) else {
            continue;
        };
        match destroy_item(container, pane, &item, false, prompt).await {
            Ok(DestroyOutcome::Destroyed) => report.destroyed += 1,
            Ok(DestroyOutcome::AlreadyGone) => {}
            Ok(DestroyOutcome::Cancelled) => report.kept.push(item),
            Err(e) => {
                log::warn!("Keeping '{}': {}", display_title(&item), e);
                report.failures.push(e);
                report.kept.push(item);
            }
        }
    }
    report
}

/// Destroy the active item of the active pane.
///
/// Returns `None` when the active pane is empty.
pub async fn destroy_active_item<P: SavePrompt>(
    container: &Mutex<PaneContainer>,
    force: bool,
    prompt: &P,
) -> Result<Option<DestroyOutcome>> {
    let target = {
        let guard = container.lock();
        let pane = guard.active_pane_id();
        guard.active_item().map(|item| (pane, item))
    };
    let Some((pane, item)) = target else {
        return Ok(None);
    };
    destroy_item(container, pane, &item, force, prompt)
        .await
        .map(Some)
}

/// Destroy every item of the pane except `keep`.
pub async fn destroy_other_items<P: SavePrompt>(
    container: &Mutex<PaneContainer>,
    pane: PaneId,
    keep: &ItemHandle,
    prompt: &P,
) -> Result<DestroyReport> {
    let items = pane_items_except(container, pane, Some(keep))?;
    Ok(destroy_items(container, items, prompt).await)
}

/// Destroy every item of the pane except its active item.
pub async fn destroy_inactive_items<P: SavePrompt>(
    container: &Mutex<PaneContainer>,
    pane: PaneId,
    prompt: &P,
) -> Result<DestroyReport> {
    let active = container.lock().pane(pane).and_then(|p| p.active_item().cloned());
    let items = pane_items_except(container, pane, active.as_ref())?;
    Ok(destroy_items(container, items, prompt).await)
}

fn pane_items_except(
    container: &Mutex<PaneContainer>,
    pane: PaneId,
    keep: Option<&ItemHandle>,
) -> Result<Vec<ItemHandle>> {
    let guard = container.lock();
    let pane = guard
        .pane(pane)
        .ok_or(PaneError::PaneNotInContainer(pane))?;
    Ok(pane
        .items()
        .iter()
        .filter(|item| !keep.is_some_and(|k| same_item(k, item)))
        .cloned()
        .collect())
}

// ============================================================================
// Closing
// ============================================================================

/// Confirm closing the whole container.
///
/// Every modified item is prompted for in pane order. The first `Cancel`,
/// or the first failed save, aborts the sequence; items confirmed before it
/// stay saved or discarded. Nothing is destroyed here.
pub async fn confirm_close<P: SavePrompt>(
    container: &Mutex<PaneContainer>,
    options: CloseOptions,
    prompt: &P,
) -> CloseReport {
    let items = container.lock().get_items();
    confirm_items(container, items, options, prompt).await
}

/// Confirm and then destroy one pane.
///
/// Returns the confirmation report; the pane is destroyed only when it is
/// confirmed. The container's last pane is kept, but its items are
/// destroyed.
pub async fn close_pane<P: SavePrompt>(
    container: &Mutex<PaneContainer>,
    pane: PaneId,
    prompt: &P,
) -> Result<CloseReport> {
    let items = pane_items_except(container, pane, None)?;
    let report = confirm_items(container, items, CloseOptions::default(), prompt).await;
    if !report.is_confirmed() {
        return Ok(report);
    }

    let mut guard = container.lock();
    if guard.pane_count() == 1 && guard.contains_pane(pane) {
        let remaining = guard
            .pane(pane)
            .map(|p| p.items().to_vec())
            .unwrap_or_default();
        crate::debug_info!(
            "PANE_CLOSE",
            "{} is the last pane, destroying its {} items",
            pane,
            remaining.len()
        );
        for item in &remaining {
            guard.try_destroy_item(pane, item, true)?;
        }
    } else {
        guard.destroy_pane(pane)?;
    }
    Ok(report)
}

/// Confirm and destroy the active pane.
pub async fn close_active_pane<P: SavePrompt>(
    container: &Mutex<PaneContainer>,
    prompt: &P,
) -> Result<CloseReport> {
    let pane = container.lock().active_pane_id();
    close_pane(container, pane, prompt).await
}

async fn confirm_items<P: SavePrompt>(
    container: &Mutex<PaneContainer>,
    items: Vec<ItemHandle>,
    options: CloseOptions,
    prompt: &P,
) -> CloseReport {
    let reason = if options.window_close_requested {
        PromptReason::CloseWindow
    } else {
        PromptReason::CloseWorkspace
    };
    let mut report = CloseReport {
        outcome: CloseOutcome::Confirmed,
        saved: 0,
        discarded: 0,
        failures: Vec::new(),
    };

    for item in items.into_iter().filter(promptable) {
        let decision = prompt.prompt_save_decision(&item, reason).await;
        if container.lock().pane_for_item(&item).is_none() {
            continue;
        }
        match decision {
            SaveDecision::Save => match save_item(&item) {
                Ok(()) => report.saved += 1,
                Err(e) => {
                    log::warn!("Close aborted, save failed: {}", e);
                    report.failures.push(e);
                    report.outcome = CloseOutcome::Cancelled { item };
                    break;
                }
            },
            SaveDecision::Discard => report.discarded += 1,
            SaveDecision::Cancel => {
                crate::debug_info!("PANE_CLOSE", "close cancelled at '{}'", display_title(&item));
                report.outcome = CloseOutcome::Cancelled { item };
                break;
            }
        }
    }
    report
}
