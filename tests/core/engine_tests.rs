// Tests for the transfer and delete engine

use ferry::error::StoreError;
use ferry::fs::engine;
use ferry::fs::{Backend, Entry};
use ferry::ui::Pane;

use crate::common::{full_backend, MemoryStore};

#[tokio::test]
async fn test_transfer_tree_maps_paths_against_source_root() {
    let source = MemoryStore::new();
    source.add_file("/src/docs/a.txt", b"alpha");
    source.add_file("/src/docs/sub/b.txt", b"beta");
    let destination = MemoryStore::new();
    destination.add_dir("/dst");

    engine::transfer(&*source, "/src", &[Entry::dir("docs")], &*destination, "/dst")
        .await
        .unwrap();

    assert_eq!(
        destination.calls(),
        vec![
            "mkdir /dst/docs",
            "write /dst/docs/a.txt",
            "mkdir /dst/docs/sub",
            "write /dst/docs/sub/b.txt",
        ]
    );
    assert_eq!(destination.contents("/dst/docs/a.txt").unwrap(), b"alpha");
    assert_eq!(destination.contents("/dst/docs/sub/b.txt").unwrap(), b"beta");
    assert_eq!(
        source.calls(),
        vec!["walk /src/docs", "read /src/docs/a.txt", "read /src/docs/sub/b.txt"]
    );
}

#[tokio::test]
async fn test_transfer_into_existing_directory_is_idempotent() {
    let source = MemoryStore::new();
    source.add_file("/src/docs/a.txt", b"new");
    let destination = MemoryStore::new();
    destination.add_file("/dst/docs/a.txt", b"old");

    engine::transfer(&*source, "/src", &[Entry::dir("docs")], &*destination, "/dst")
        .await
        .unwrap();
    assert_eq!(destination.contents("/dst/docs/a.txt").unwrap(), b"new");

    // Second run hits only existing directories and overwrites again
    engine::transfer(&*source, "/src", &[Entry::dir("docs")], &*destination, "/dst")
        .await
        .unwrap();
    assert!(destination.is_dir("/dst/docs"));
}

#[tokio::test]
async fn test_transfer_mixed_selection_in_order() {
    let source = MemoryStore::new();
    source.add_file("/src/dir/x.txt", b"x");
    source.add_file("/src/one.txt", b"1");
    let destination = MemoryStore::new();
    destination.add_dir("/dst");

    let selection = [Entry::dir("dir"), Entry::file("one.txt", 1)];
    engine::transfer(&*source, "/src", &selection, &*destination, "/dst")
        .await
        .unwrap();

    assert_eq!(
        destination.calls(),
        vec!["mkdir /dst/dir", "write /dst/dir/x.txt", "write /dst/one.txt"]
    );
}

#[tokio::test]
async fn test_transfer_stops_at_first_failure() {
    let source = MemoryStore::new();
    source.add_file("/src/a.txt", b"a");
    source.add_file("/src/b.txt", b"b");
    source.add_file("/src/c.txt", b"c");
    let destination = MemoryStore::new();
    destination.add_dir("/dst");
    destination.fail_on("write /dst/b.txt");

    let selection = [
        Entry::file("a.txt", 1),
        Entry::file("b.txt", 1),
        Entry::file("c.txt", 1),
    ];
    let err = engine::transfer(&*source, "/src", &selection, &*destination, "/dst")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Io { .. }));
    assert!(destination.exists("/dst/a.txt"));
    assert!(!destination.exists("/dst/b.txt"));
    assert!(!destination.exists("/dst/c.txt"));
}

#[tokio::test]
async fn test_transfer_stops_when_directory_cannot_be_created() {
    let source = MemoryStore::new();
    source.add_file("/src/docs/a.txt", b"alpha");
    source.add_file("/src/docs/sub/b.txt", b"beta");
    let destination = MemoryStore::new();
    destination.add_dir("/dst");
    destination.fail_on("mkdir /dst/docs");

    let err = engine::transfer(&*source, "/src", &[Entry::dir("docs")], &*destination, "/dst")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Io { ref path, .. } if path == "/dst/docs"));
    assert_eq!(destination.calls(), vec!["mkdir /dst/docs"]);
    assert!(!destination.exists("/dst/docs"));
}

#[tokio::test]
async fn test_delete_is_fail_fast() {
    let store = MemoryStore::new();
    store.add_file("/w/a.txt", b"a");
    store.add_file("/w/b.txt", b"b");
    store.add_file("/w/c.txt", b"c");
    store.fail_on("rm /w/b.txt");

    let selection = [
        Entry::file("a.txt", 1),
        Entry::file("b.txt", 1),
        Entry::file("c.txt", 1),
    ];
    let err = engine::delete(&*store, "/w", &selection).await.unwrap_err();

    assert!(matches!(err, StoreError::Io { ref path, .. } if path == "/w/b.txt"));
    assert_eq!(store.calls(), vec!["rm /w/a.txt", "rm /w/b.txt"]);
    assert!(!store.exists("/w/a.txt"));
    assert!(store.exists("/w/b.txt"));
    assert!(store.exists("/w/c.txt"));
}

#[tokio::test]
async fn test_delete_directory_is_one_recursive_call() {
    let store = MemoryStore::new();
    store.add_file("/w/tree/a/b/c.txt", b"c");

    engine::delete(&*store, "/w", &[Entry::dir("tree")]).await.unwrap();
    assert_eq!(store.calls(), vec!["rmdir /w/tree"]);
    assert!(!store.exists("/w/tree/a"));
}

#[tokio::test]
async fn test_backend_without_peer_refuses_transfer() {
    let store = MemoryStore::new();
    store.add_file("/a.txt", b"a");
    let backend = ferry::fs::StoreBackend::new(crate::common::dyn_store(&store));

    assert_eq!(backend.capabilities(), ferry::fs::BackendCapabilities::read_only());
    let err = backend
        .transfer("/", &[Entry::file("a.txt", 1)], "/x")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unsupported("transfer")));
}

#[tokio::test]
async fn test_pane_transfer_copies_selection_to_peer() {
    let source = MemoryStore::new();
    source.add_file("/src/docs/a.txt", b"alpha");
    source.add_file("/src/skip.txt", b"s");
    let destination = MemoryStore::new();
    destination.add_dir("/dst");

    let mut pane = Pane::new("Left", "/src", full_backend(&source, &destination))
        .await
        .unwrap();
    assert_eq!(pane.capabilities(), ferry::fs::BackendCapabilities::full());
    assert_eq!(pane.backend_name(), "Memory");
    pane.toggle_selection();
    pane.transfer("/dst").await.unwrap();

    assert!(destination.is_dir("/dst/docs"));
    assert!(destination.exists("/dst/docs/a.txt"));
    assert!(!destination.exists("/dst/skip.txt"));
    // The caller clears the selection
    assert_eq!(pane.selection_count(), 1);
}
