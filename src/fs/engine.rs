//! Transfer and delete engine for cross-store operations.
//!
//! Expands a selection of entries (files, links and whole directory trees)
//! into an ordered sequence of store primitives. Works for any pair of
//! stores: local to FTP, FTP to local, or local to local.
//!
//! Both operations are fail-fast: the first failing primitive aborts the
//! remaining work and nothing already done is rolled back.

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::fs::backend::Store;
use crate::fs::path;
use crate::fs::types::{Entry, EntryKind};

/// Copy `entries`, children of `source_root` on `source`, into
/// `destination_root` on `destination`.
pub async fn transfer(
    source: &dyn Store,
    source_root: &str,
    entries: &[Entry],
    destination: &dyn Store,
    destination_root: &str,
) -> StoreResult<()> {
    for entry in entries {
        if entry.is_dir() {
            transfer_tree(source, source_root, &entry.name, destination, destination_root).await?;
        } else {
            copy_file(
                source,
                &path::join(source_root, &entry.name),
                destination,
                &path::join(destination_root, &entry.name),
            )
            .await?;
        }
    }
    Ok(())
}

/// Copy one directory tree. The walk reports absolute paths, so each node is
/// re-rooted against `source_root`, never against the directory itself.
async fn transfer_tree(
    source: &dyn Store,
    source_root: &str,
    name: &str,
    destination: &dyn Store,
    destination_root: &str,
) -> StoreResult<()> {
    let tree_root = path::join(source_root, name);
    let nodes = source.walk(&tree_root).await?;

    for node in nodes {
        let target = map_path(source_root, &node.path, destination_root)?;
        match node.kind {
            EntryKind::Directory => ensure_dir(destination, &target).await?,
            EntryKind::File | EntryKind::Link => {
                copy_file(source, &node.path, destination, &target).await?
            }
        }
    }

    Ok(())
}

/// Destination path for a node found under `source_root`.
pub fn map_path(source_root: &str, node_path: &str, destination_root: &str) -> StoreResult<String> {
    let relative =
        path::relative_to(source_root, node_path).ok_or_else(|| StoreError::OutsideRoot {
            path: node_path.to_string(),
            root: source_root.to_string(),
        })?;
    Ok(path::join(destination_root, &relative))
}

/// Create a directory, accepting one that already exists.
pub async fn ensure_dir(store: &dyn Store, path: &str) -> StoreResult<()> {
    match store.create_dir(path).await {
        Ok(()) => {
            debug!(store = store.name(), path, "created directory");
            Ok(())
        }
        Err(err) if err.is_already_exists() => {
            debug!(store = store.name(), path, "directory already exists");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Read a whole object from `source` and write it to `destination`.
pub async fn copy_file(
    source: &dyn Store,
    from: &str,
    destination: &dyn Store,
    to: &str,
) -> StoreResult<()> {
    let data = source.read_file(from).await?;
    let size = data.len();
    destination.write_file(to, data).await?;
    debug!(
        from = %format!("{}:{}", source.name(), from),
        to = %format!("{}:{}", destination.name(), to),
        size,
        "copied file"
    );
    Ok(())
}

/// Remove `entries`, children of `location`. Directories go in one
/// recursive call each.
pub async fn delete(store: &dyn Store, location: &str, entries: &[Entry]) -> StoreResult<()> {
    for entry in entries {
        let target = path::join(location, &entry.name);
        if entry.is_dir() {
            store.remove_dir_all(&target).await?;
        } else {
            store.remove_file(&target).await?;
        }
        debug!(store = store.name(), path = %target, "removed");
    }
    Ok(())
}
