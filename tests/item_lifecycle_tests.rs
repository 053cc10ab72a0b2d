//! Integration tests for items that destroy or retitle themselves.

mod common;

use std::sync::Arc;

use common::{TestItem, handle, pane_titles, test_config, title_of};
use parking_lot::Mutex;
use par_workspace::{
    AddItemOptions, ItemDeserializers, ItemHandle, ItemState, PaneContainer, SplitDirection,
    SplitOptions, WorkspaceCenter,
};
use serde_json::json;

fn watched(title: &str) -> Arc<TestItem> {
    TestItem::document(title).with_lifecycle().arc()
}

#[test]
fn test_self_destroyed_item_is_removed_and_pane_collapses() {
    let mut c = PaneContainer::new(test_config());
    let left = c.active_pane_id();
    let right = c.split_right(left, SplitOptions::default()).unwrap();
    let keep = watched("keep.rs");
    let gone = watched("gone.rs");
    c.add_item(left, handle(&keep), AddItemOptions::default()).unwrap();
    c.add_item(right, handle(&gone), AddItemOptions::default()).unwrap();

    gone.destroy_self();
    assert_eq!(c.pending_destroyed_items(), 1);
    assert_eq!(c.pane_for_item(&handle(&gone)), Some(right));

    assert_eq!(c.remove_destroyed_items().unwrap(), 1);
    assert_eq!(c.pending_destroyed_items(), 0);
    assert!(c.pane_for_item(&handle(&gone)).is_none());
    assert!(!c.contains_pane(right));
    assert_eq!(c.get_panes(), vec![left]);
    // The item's own destroy already ran; removal must not repeat it
    assert_eq!(gone.destroy_count(), 1);
    assert_eq!(gone.did_destroy.listener_count(), 0);
    c.check_invariants().unwrap();
}

#[test]
fn test_self_destroy_follows_the_item_across_panes() {
    let mut c = PaneContainer::new(test_config());
    let left = c.active_pane_id();
    let right = c.split_right(left, SplitOptions::default()).unwrap();
    let anchor = watched("anchor.rs");
    let roaming = watched("roaming.rs");
    let other = watched("other.rs");
    c.add_item(left, handle(&anchor), AddItemOptions::default()).unwrap();
    c.add_item(left, handle(&roaming), AddItemOptions::default()).unwrap();
    c.add_item(right, handle(&other), AddItemOptions::default()).unwrap();

    c.move_item_to_pane(left, &handle(&roaming), right, None).unwrap();
    assert_eq!(roaming.did_destroy.listener_count(), 1);

    roaming.destroy_self();
    c.remove_destroyed_items().unwrap();
    assert_eq!(pane_titles(&c, left), vec!["anchor.rs"]);
    assert_eq!(pane_titles(&c, right), vec!["other.rs"]);
    assert_eq!(
        c.pane(right).unwrap().active_item().map(title_of).as_deref(),
        Some("other.rs")
    );
    c.check_invariants().unwrap();
}

#[test]
fn test_subscriptions_end_when_the_layout_destroys_the_item() {
    let mut c = PaneContainer::new(test_config());
    let pane = c.active_pane_id();
    let doc = watched("doc.rs");
    c.add_item(pane, handle(&doc), AddItemOptions::default()).unwrap();
    assert_eq!(doc.did_destroy.listener_count(), 1);
    assert_eq!(doc.did_change_title.listener_count(), 1);

    c.try_destroy_item(pane, &handle(&doc), true).unwrap();
    assert_eq!(doc.did_destroy.listener_count(), 0);
    assert_eq!(doc.did_change_title.listener_count(), 0);
    assert_eq!(c.pending_destroyed_items(), 0);

    let closing = watched("closing.rs");
    c.add_item(pane, handle(&closing), AddItemOptions::default()).unwrap();
    assert!(c.destroy(true));
    assert_eq!(closing.did_destroy.listener_count(), 0);
}

#[test]
fn test_retitle_is_announced() {
    let mut c = PaneContainer::new(test_config());
    let pane = c.active_pane_id();
    let doc = watched("draft.md");
    c.add_item(pane, handle(&doc), AddItemOptions::default()).unwrap();

    let titles = Arc::new(Mutex::new(Vec::new()));
    let t = Arc::clone(&titles);
    let _sub = c.on_did_change_pane_item_title(move |e| {
        t.lock().push((title_of(&e.item), e.title.clone()));
    });

    doc.rename("notes.md");
    assert_eq!(
        *titles.lock(),
        vec![("notes.md".to_string(), Some("notes.md".to_string()))]
    );
}

#[test]
fn test_restored_items_are_watched() {
    let created: Arc<Mutex<Vec<Arc<TestItem>>>> = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ItemDeserializers::new();
    let sink = Arc::clone(&created);
    registry.register("Watched", move |state: &ItemState| {
        let item = watched(state.get_str("title").unwrap_or("untitled"));
        sink.lock().push(Arc::clone(&item));
        Ok(item as ItemHandle)
    });

    let mut c = PaneContainer::new(test_config());
    let report = c.deserialize_value(
        json!({
            "root": {
                "items": [
                    {"deserializer": "Watched", "title": "a.rs"},
                    {"deserializer": "Watched", "title": "b.rs"}
                ],
                "activeItemIndex": 1
            }
        }),
        &registry,
    );
    assert!(report.is_clean());

    let b = Arc::clone(&created.lock()[1]);
    b.destroy_self();
    assert_eq!(c.remove_destroyed_items().unwrap(), 1);
    let pane = c.active_pane_id();
    assert_eq!(pane_titles(&c, pane), vec!["a.rs"]);
    assert_eq!(c.active_item().map(|i| title_of(&i)).as_deref(), Some("a.rs"));
}

#[test]
fn test_center_removes_self_destroyed_item_immediately() {
    let center = WorkspaceCenter::new(test_config());
    let first = center.get_active_pane();
    let second = center
        .split(first, SplitDirection::Right, SplitOptions::default())
        .unwrap();
    let anchor = watched("anchor.rs");
    let gone = watched("gone.rs");
    center
        .add_item_to_pane(first, handle(&anchor), AddItemOptions::default())
        .unwrap();
    center
        .add_item_to_pane(second, handle(&gone), AddItemOptions::default())
        .unwrap();

    let titles = Arc::new(Mutex::new(Vec::new()));
    let t = Arc::clone(&titles);
    let _sub = center.on_did_change_pane_item_title(move |e| {
        t.lock().push((e.location.to_string(), e.event.title.clone()));
    });
    anchor.rename("renamed.rs");

    gone.destroy_self();
    assert_eq!(center.with(|c| c.pending_destroyed_items()), 0);
    assert_eq!(center.get_panes(), vec![first]);
    assert_eq!(
        *titles.lock(),
        vec![("center".to_string(), Some("renamed.rs".to_string()))]
    );
}

#[test]
fn test_center_defers_removal_while_busy() {
    let center = WorkspaceCenter::new(test_config());
    let victim = watched("victim.rs");
    center.add_item(handle(&victim), AddItemOptions::default()).unwrap();

    // The item goes away from inside a listener, while the container is locked
    let v = Arc::clone(&victim);
    let _sub = center.on_did_add_pane_item(move |e| {
        if title_of(&e.event.item) == "trigger.rs" {
            v.destroy_self();
        }
    });
    center
        .add_item(handle(&watched("trigger.rs")), AddItemOptions::default())
        .unwrap();

    let titles: Vec<String> = center.get_pane_items().iter().map(title_of).collect();
    assert_eq!(titles, vec!["trigger.rs".to_string()]);
    assert_eq!(victim.destroy_count(), 1);
    center.with(|c| c.check_invariants()).unwrap();
}
