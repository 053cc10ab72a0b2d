//! Integration tests for the WorkspaceCenter facade.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{TestItem, TestPrompt, handle, test_config, test_deserializers, title_of};
use parking_lot::Mutex;
use par_workspace::{
    AddItemOptions, CloseOptions, DestroyOutcome, LayoutConfig, SaveDecision, SplitDirection,
    SplitOptions, WorkspaceCenter,
};

fn center() -> WorkspaceCenter {
    WorkspaceCenter::new(test_config())
}

#[test]
fn test_events_carry_location() {
    let center = WorkspaceCenter::new(LayoutConfig {
        location: "left-dock".to_string(),
        ..LayoutConfig::default()
    });
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let _sub = center.on_did_add_pane(move |e| {
        s.lock().push((e.location.to_string(), e.event.pane));
    });

    let first = center.get_active_pane();
    let second = center
        .split(first, SplitDirection::Down, SplitOptions::default())
        .unwrap();

    assert_eq!(center.location(), "left-dock");
    assert_eq!(*seen.lock(), vec![("left-dock".to_string(), second)]);
}

#[test]
fn test_item_events_are_relayed() {
    let center = center();
    let added = Arc::new(Mutex::new(Vec::new()));
    let destroyed = Arc::new(Mutex::new(Vec::new()));

    let a = Arc::clone(&added);
    let _on_add = center.on_did_add_pane_item(move |e| {
        a.lock().push((title_of(&e.event.item), e.event.index));
    });
    let d = Arc::clone(&destroyed);
    let _on_destroy = center.on_did_destroy_pane_item(move |e| {
        d.lock().push(title_of(&e.event.item));
    });

    let one = TestItem::new("one").arc();
    let two = TestItem::new("two").arc();
    center.add_item(handle(&one), AddItemOptions::default()).unwrap();
    center.add_item(handle(&two), AddItemOptions::at(0)).unwrap();
    center.with_mut(|c| {
        let pane = c.active_pane_id();
        c.try_destroy_item(pane, &handle(&one), true).unwrap();
    });

    assert_eq!(
        *added.lock(),
        vec![("one".to_string(), 0), ("two".to_string(), 0)]
    );
    assert_eq!(*destroyed.lock(), vec!["one".to_string()]);
}

#[test]
fn test_observe_panes_replays_existing_panes() {
    let center = center();
    let first = center.get_active_pane();
    let second = center
        .split(first, SplitDirection::Right, SplitOptions::default())
        .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let _sub = center.observe_panes(move |e| s.lock().push(e.event.pane));
    let third = center
        .split(second, SplitDirection::Right, SplitOptions::default())
        .unwrap();

    assert_eq!(*seen.lock(), vec![first, second, third]);
}

#[test]
fn test_observe_pane_items_replays_existing_items() {
    let center = center();
    center
        .add_item(handle(&TestItem::new("old").arc()), AddItemOptions::default())
        .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let _sub = center.observe_pane_items(move |e| s.lock().push(title_of(&e.event.item)));
    center
        .add_item(handle(&TestItem::new("new").arc()), AddItemOptions::default())
        .unwrap();

    assert_eq!(*seen.lock(), vec!["old".to_string(), "new".to_string()]);
}

#[test]
fn test_observe_active_pane_item_follows_pane_switches() {
    let center = center();
    let left = center.get_active_pane();
    let right = center
        .split(left, SplitDirection::Right, SplitOptions::default())
        .unwrap();
    center
        .add_item_to_pane(left, handle(&TestItem::new("left.rs").arc()), AddItemOptions::default())
        .unwrap();
    center
        .add_item_to_pane(
            right,
            handle(&TestItem::new("right.rs").arc()),
            AddItemOptions::default(),
        )
        .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let _sub = center.observe_active_pane_item(move |e| {
        s.lock().push(e.event.item.as_ref().map(title_of));
    });

    center.set_active_pane(right).unwrap();
    assert!(center.activate_previous_pane());

    assert_eq!(
        *seen.lock(),
        vec![
            Some("left.rs".to_string()),
            Some("right.rs".to_string()),
            Some("left.rs".to_string()),
        ]
    );
}

#[test]
fn test_dropped_subscription_stops_delivery() {
    let center = center();
    let count = Arc::new(Mutex::new(0));
    let c = Arc::clone(&count);
    let sub = center.on_did_add_pane(move |_| *c.lock() += 1);

    let first = center.get_active_pane();
    center
        .split(first, SplitDirection::Left, SplitOptions::default())
        .unwrap();
    drop(sub);
    center
        .split(first, SplitDirection::Left, SplitOptions::default())
        .unwrap();

    assert_eq!(*count.lock(), 1);
}

#[test]
fn test_clones_share_the_container() {
    let center = center();
    let other = center.clone();
    let doc = TestItem::document("shared.rs").arc();
    center.add_item(handle(&doc), AddItemOptions::default()).unwrap();

    assert_eq!(other.pane_for_uri("/project/shared.rs"), Some(center.get_active_pane()));
    assert_eq!(other.get_pane_items().len(), 1);
}

#[test]
fn test_stop_changing_without_runtime_waits_for_flush() {
    let center = center();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let _sub = center.on_did_stop_changing_active_pane_item(move |e| {
        s.lock().push(e.event.item.as_ref().map(title_of));
    });

    center
        .add_item(handle(&TestItem::new("a").arc()), AddItemOptions::default())
        .unwrap();
    assert!(seen.lock().is_empty());

    center.flush_stop_changing();
    assert_eq!(*seen.lock(), vec![Some("a".to_string())]);
}

#[tokio::test(start_paused = true)]
async fn test_stop_changing_fires_once_after_burst() {
    let center = center();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let _sub = center.on_did_stop_changing_active_pane_item(move |e| {
        s.lock().push(e.event.item.as_ref().map(title_of));
    });

    let a = TestItem::new("a").arc();
    let b = TestItem::new("b").arc();
    center.add_item(handle(&a), AddItemOptions::default()).unwrap();
    center.add_item(handle(&b), AddItemOptions::default()).unwrap();
    let pane = center.get_active_pane();
    center.activate_item(pane, &handle(&b)).unwrap();
    center.activate_item(pane, &handle(&a)).unwrap();
    center.activate_item(pane, &handle(&b)).unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(seen.lock().is_empty());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*seen.lock(), vec![Some("b".to_string())]);
}

#[tokio::test]
async fn test_destroy_active_pane_item_prompts() {
    let center = center();
    let dirty = TestItem::document("dirty.rs").modified().arc();
    center.add_item(handle(&dirty), AddItemOptions::default()).unwrap();

    let prompt = TestPrompt::new([SaveDecision::Save]);
    let outcome = center.destroy_active_pane_item(false, &prompt).await.unwrap();
    assert_eq!(outcome, Some(DestroyOutcome::Destroyed));
    assert_eq!(dirty.save_count(), 1);
    assert!(center.get_active_pane_item().is_none());
}

#[tokio::test]
async fn test_close_other_items_keeps_active_item() {
    let center = center();
    let items: Vec<_> = ["a.rs", "b.rs", "c.rs"]
        .iter()
        .map(|t| TestItem::document(t).arc())
        .collect();
    for item in &items {
        center.add_item(handle(item), AddItemOptions::default()).unwrap();
    }
    center
        .activate_item(center.get_active_pane(), &handle(&items[1]))
        .unwrap();

    let report = center.close_other_items(&TestPrompt::default()).await.unwrap();
    assert_eq!(report.destroyed, 2);
    let remaining: Vec<String> = center.get_pane_items().iter().map(title_of).collect();
    assert_eq!(remaining, vec!["b.rs".to_string()]);
}

#[tokio::test]
async fn test_destroy_active_pane_moves_focus() {
    let center = center();
    let left = center.get_active_pane();
    let right = center
        .split(left, SplitDirection::Right, SplitOptions::default())
        .unwrap();
    center.set_active_pane(right).unwrap();

    let report = center.destroy_active_pane(&TestPrompt::default()).await.unwrap();
    assert!(report.is_confirmed());
    assert_eq!(center.get_panes(), vec![left]);
    assert_eq!(center.get_active_pane(), left);
}

#[tokio::test]
async fn test_confirm_close_with_nothing_modified() {
    let center = center();
    center
        .add_item(handle(&TestItem::document("clean.rs").arc()), AddItemOptions::default())
        .unwrap();
    let prompt = TestPrompt::default();
    let report = center.confirm_close(CloseOptions::default(), &prompt).await;
    assert!(report.is_confirmed());
    assert!(prompt.asked_titles().is_empty());
}

#[test]
fn test_facade_round_trips_layout() {
    let center = center();
    let left = center.get_active_pane();
    center
        .add_item(handle(&TestItem::document("main.rs").arc()), AddItemOptions::default())
        .unwrap();
    let right = center
        .split(left, SplitDirection::Right, SplitOptions::default())
        .unwrap();
    center
        .add_item_to_pane(
            right,
            handle(&TestItem::document("lib.rs").arc()),
            AddItemOptions::default(),
        )
        .unwrap();
    center.set_active_pane(right).unwrap();

    let state = center.serialize();
    let restored = WorkspaceCenter::new(test_config());
    let report = restored.deserialize(state, &test_deserializers());

    assert!(report.is_clean());
    assert_eq!(restored.get_panes().len(), 2);
    assert_eq!(
        restored.get_active_pane_item().map(|i| title_of(&i)).as_deref(),
        Some("lib.rs")
    );
    assert!(restored.pane_for_uri("/project/main.rs").is_some());
}

#[test]
fn test_destroy_resets_to_single_pane() {
    let center = center();
    let first = center.get_active_pane();
    center
        .split(first, SplitDirection::Up, SplitOptions::default())
        .unwrap();
    center
        .add_item(handle(&TestItem::document("x.rs").modified().arc()), AddItemOptions::default())
        .unwrap();

    assert!(!center.destroy(false));
    assert!(center.destroy(true));
    assert_eq!(center.get_panes().len(), 1);
    assert!(center.get_pane_items().is_empty());
}
