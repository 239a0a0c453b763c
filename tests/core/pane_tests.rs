// Tests for the pane: listing order, cursor and viewport, selection,
// navigation and the optional capabilities

use ferry::error::{Capability, PaneError, StoreError};
use ferry::fs::{EntryKind, StoreBackend};
use ferry::ui::Pane;

use crate::common::{dyn_store, full_backend, MemoryStore};

fn store_with_files(count: usize) -> std::sync::Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.add_dir("/data");
    for i in 0..count {
        store.add_file(&format!("/data/file{:02}.txt", i), b"x");
    }
    store
}

async fn pane_over(store: &std::sync::Arc<MemoryStore>, location: &str) -> Pane {
    let peer = MemoryStore::new();
    Pane::new("Test", location, full_backend(store, &peer)).await.unwrap()
}

#[tokio::test]
async fn test_listing_is_sorted_directories_first() {
    let store = MemoryStore::new();
    store.add_file("/root/b.txt", b"bb");
    store.add_file("/root/A.txt", b"a");
    store.add_dir("/root/zeta");
    store.add_dir("/root/alpha");

    let pane = pane_over(&store, "/root").await;
    let names: Vec<&str> = pane.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta", "A.txt", "b.txt"]);
    assert_eq!(pane.entries()[0].kind, EntryKind::Directory);
    assert_eq!(pane.entries()[3].size, 2);
}

#[tokio::test]
async fn test_location_is_normalized() {
    let store = store_with_files(1);
    let pane = pane_over(&store, "//data/./").await;
    assert_eq!(pane.location(), "/data");
}

#[tokio::test]
async fn test_cursor_stays_in_bounds() {
    let store = store_with_files(3);
    let mut pane = pane_over(&store, "/data").await;

    pane.up();
    assert_eq!(pane.cursor(), 0);

    for _ in 0..10 {
        pane.down();
    }
    assert_eq!(pane.cursor(), 2);
}

#[tokio::test]
async fn test_cursor_on_empty_listing() {
    let store = MemoryStore::new();
    store.add_dir("/empty");
    let mut pane = pane_over(&store, "/empty").await;

    pane.down();
    pane.up();
    pane.toggle_selection();
    assert_eq!(pane.cursor(), 0);
    assert_eq!(pane.selection_count(), 0);
    assert!(pane.current_entry().is_none());
}

#[tokio::test]
async fn test_viewport_follows_cursor() {
    let store = store_with_files(25);
    let mut pane = pane_over(&store, "/data").await;
    assert_eq!(pane.viewport_height(), 10);

    for _ in 0..12 {
        pane.down();
    }
    assert_eq!(pane.cursor(), 12);
    assert_eq!(pane.viewport_top(), 3);
    assert_eq!(pane.visible_range(), 3..13);

    for _ in 0..5 {
        pane.up();
    }
    assert_eq!(pane.cursor(), 7);
    assert_eq!(pane.viewport_top(), 3);

    for _ in 0..5 {
        pane.up();
    }
    assert_eq!(pane.cursor(), 2);
    assert_eq!(pane.viewport_top(), 2);
}

#[tokio::test]
async fn test_viewport_invariant_holds_throughout() {
    let store = store_with_files(17);
    let peer = MemoryStore::new();
    let mut pane = Pane::with_viewport_height("Test", "/data", full_backend(&store, &peer), 4)
        .await
        .unwrap();

    let moves = [1, 1, 1, 1, 1, 1, -1, -1, -1, -1, -1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1];
    for step in moves {
        if step > 0 {
            pane.down();
        } else {
            pane.up();
        }
        let top = pane.viewport_top();
        assert!(top <= pane.cursor());
        assert!(pane.cursor() < top + pane.viewport_height());
        assert!(pane.cursor() < pane.entries().len());
    }
}

#[tokio::test]
async fn test_toggle_selection_twice_restores() {
    let store = store_with_files(3);
    let mut pane = pane_over(&store, "/data").await;

    pane.down();
    pane.toggle_selection();
    assert!(pane.is_selected(1));
    assert_eq!(pane.selected_names(), vec!["file01.txt"]);
    assert_eq!(pane.selected_paths(), vec!["/data/file01.txt".to_string()]);

    pane.toggle_selection();
    assert_eq!(pane.selection_count(), 0);
}

#[tokio::test]
async fn test_enter_and_leave_reset_state() {
    let store = MemoryStore::new();
    store.add_file("/top/inner/x.txt", b"x");
    store.add_file("/top/y.txt", b"y");
    let mut pane = pane_over(&store, "/top").await;

    pane.down();
    pane.toggle_selection();
    pane.up();
    pane.enter().await.unwrap();
    assert_eq!(pane.location(), "/top/inner");
    assert_eq!(pane.cursor(), 0);
    assert_eq!(pane.viewport_top(), 0);
    assert_eq!(pane.selection_count(), 0);

    pane.leave().await.unwrap();
    assert_eq!(pane.location(), "/top");
    assert_eq!(pane.entries().len(), 2);
}

#[tokio::test]
async fn test_leave_at_root_stays_at_root() {
    let store = MemoryStore::new();
    store.add_file("/a.txt", b"a");
    let mut pane = pane_over(&store, "/").await;

    pane.leave().await.unwrap();
    assert_eq!(pane.location(), "/");
}

#[tokio::test]
async fn test_enter_on_empty_listing_is_noop() {
    let store = MemoryStore::new();
    store.add_dir("/empty");
    let mut pane = pane_over(&store, "/empty").await;
    store.clear_calls();

    pane.enter().await.unwrap();
    assert_eq!(pane.location(), "/empty");
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_failed_listing_leaves_state_untouched() {
    let store = MemoryStore::new();
    store.add_file("/top/a.txt", b"a");
    store.add_file("/top/b.txt", b"b");
    let mut pane = pane_over(&store, "/top").await;

    pane.down();
    pane.toggle_selection();

    // Entering a file asks the store to list it, which fails
    let err = pane.enter().await.unwrap_err();
    assert!(matches!(
        err,
        PaneError::ListingFailed {
            source: StoreError::NotFound { .. },
            ..
        }
    ));
    assert_eq!(pane.location(), "/top");
    assert_eq!(pane.cursor(), 1);
    assert!(pane.is_selected(1));
    assert_eq!(pane.entries().len(), 2);
}

#[tokio::test]
async fn test_refresh_picks_up_changes_and_clears_selection() {
    let store = store_with_files(2);
    let mut pane = pane_over(&store, "/data").await;
    pane.toggle_selection();

    store.add_file("/data/new.txt", b"n");
    pane.refresh().await.unwrap();
    assert_eq!(pane.entries().len(), 3);
    assert_eq!(pane.selection_count(), 0);
}

#[tokio::test]
async fn test_missing_capabilities_are_reported() {
    let store = store_with_files(2);
    let mut pane = Pane::new("Test", "/data", Box::new(StoreBackend::new(dyn_store(&store))))
        .await
        .unwrap();
    pane.toggle_selection();

    let err = pane.transfer("/elsewhere").await.unwrap_err();
    assert!(matches!(err, PaneError::CapabilityNotConfigured(Capability::Transfer)));

    let err = pane.delete().await.unwrap_err();
    assert!(matches!(err, PaneError::CapabilityNotConfigured(Capability::Delete)));
    assert_eq!(err.to_string(), "delete capability is not configured");
}

#[tokio::test]
async fn test_empty_selection_is_noop() {
    let store = store_with_files(2);
    let peer = MemoryStore::new();
    let mut pane = Pane::new("Test", "/data", full_backend(&store, &peer)).await.unwrap();
    store.clear_calls();

    pane.transfer("/").await.unwrap();
    pane.delete().await.unwrap();
    assert!(store.calls().is_empty());
    assert!(peer.calls().is_empty());
}

#[tokio::test]
async fn test_delete_removes_selection_and_refreshes() {
    let store = MemoryStore::new();
    store.add_file("/w/sub/deep.txt", b"d");
    store.add_file("/w/keep.txt", b"k");
    store.add_file("/w/drop.txt", b"x");
    let mut pane = pane_over(&store, "/w").await;

    // sub, drop.txt, keep.txt
    pane.toggle_selection();
    pane.down();
    pane.toggle_selection();
    pane.delete().await.unwrap();

    assert!(!store.exists("/w/sub"));
    assert!(!store.exists("/w/sub/deep.txt"));
    assert!(!store.exists("/w/drop.txt"));
    let names: Vec<&str> = pane.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["keep.txt"]);
    assert_eq!(pane.selection_count(), 0);
}

#[tokio::test]
async fn test_delete_failure_is_wrapped() {
    let store = MemoryStore::new();
    store.add_file("/w/a.txt", b"a");
    let mut pane = pane_over(&store, "/w").await;
    store.fail_on("rm /w/a.txt");

    pane.toggle_selection();
    let err = pane.delete().await.unwrap_err();
    assert!(matches!(err, PaneError::DeleteFailed(StoreError::Io { .. })));
    assert!(err.store_error().is_some());
    assert!(pane.is_selected(0));
}
