use async_trait::async_trait;
use std::fs;
use std::path::Path;

use crate::error::{StoreError, StoreResult};
use crate::fs::backend::Store;
use crate::fs::types::{Entry, EntryKind, WalkNode};

/// Local filesystem store. Locations are absolute paths on this machine.
pub struct LocalStore {
    name: String,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::named("Local")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn list_dir_blocking(path: &str) -> StoreResult<Vec<Entry>> {
        let mut entries = Vec::new();
        let read_dir = fs::read_dir(path).map_err(|e| StoreError::io(path, e))?;

        for entry in read_dir {
            let entry = entry.map_err(|e| StoreError::io(path, e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            let file_type = entry.file_type().map_err(|e| StoreError::io(path, e))?;

            let kind = kind_of(&file_type);
            let size = entry_size(path, kind, || entry.metadata())?;

            entries.push(Entry { name, kind, size });
        }

        Ok(entries)
    }

    fn walk_blocking(root: &str) -> StoreResult<Vec<WalkNode>> {
        let meta = fs::symlink_metadata(root).map_err(|e| StoreError::io(root, e))?;
        if !meta.is_dir() {
            return Ok(vec![WalkNode::new(root, kind_of(&meta.file_type()))]);
        }

        let mut nodes = Vec::new();
        // jwalk yields parents before children when sorted
        let walker = jwalk::WalkDir::new(root)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false);

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_else(|| root.to_string());
                StoreError::Io {
                    path,
                    source: std::io::Error::other(e.to_string()),
                }
            })?;
            let kind = kind_of(&entry.file_type());
            nodes.push(WalkNode::new(entry.path().to_string_lossy().to_string(), kind));
        }

        Ok(nodes)
    }

    fn remove_dir_all_blocking(path: &str) -> StoreResult<()> {
        if !Path::new(path).is_dir() {
            return Err(StoreError::Io {
                path: path.to_string(),
                source: std::io::Error::other("not a directory"),
            });
        }
        fs::remove_dir_all(path).map_err(|e| StoreError::io(path, e))
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Size of a listed object. Only files carry one; metadata is read for
/// files only and a failure to read it fails the listing.
fn entry_size(
    path: &str,
    kind: EntryKind,
    metadata: impl FnOnce() -> std::io::Result<fs::Metadata>,
) -> StoreResult<u64> {
    match kind {
        EntryKind::File => metadata().map(|m| m.len()).map_err(|e| StoreError::io(path, e)),
        _ => Ok(0),
    }
}

fn kind_of(file_type: &fs::FileType) -> EntryKind {
    if file_type.is_symlink() {
        EntryKind::Link
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    }
}

#[async_trait]
impl Store for LocalStore {
    async fn list_dir(&self, path: &str) -> StoreResult<Vec<Entry>> {
        let path = path.to_string();
        tokio::task::spawn_blocking(move || Self::list_dir_blocking(&path)).await?
    }

    async fn walk(&self, root: &str) -> StoreResult<Vec<WalkNode>> {
        let root = root.to_string();
        tokio::task::spawn_blocking(move || Self::walk_blocking(&root)).await?
    }

    async fn read_file(&self, path: &str) -> StoreResult<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::io(path, e))
    }

    async fn write_file(&self, path: &str, data: Vec<u8>) -> StoreResult<()> {
        tokio::fs::write(path, data)
            .await
            .map_err(|e| StoreError::io(path, e))
    }

    async fn create_dir(&self, path: &str) -> StoreResult<()> {
        tokio::fs::create_dir(path)
            .await
            .map_err(|e| StoreError::io(path, e))
    }

    async fn remove_file(&self, path: &str) -> StoreResult<()> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| StoreError::io(path, e))
    }

    async fn remove_dir_all(&self, path: &str) -> StoreResult<()> {
        let path = path.to_string();
        tokio::task::spawn_blocking(move || Self::remove_dir_all_blocking(&path)).await?
    }

    fn name(&self) -> &str {
        &self.name
    }
}
