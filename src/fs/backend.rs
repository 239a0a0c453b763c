use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::fs::engine;
use crate::fs::types::{Entry, WalkNode};

/// Storage primitives a backend must provide. Paths are absolute,
/// `/`-separated locations within the store.
#[async_trait]
pub trait Store: Send + Sync {
    // ========== Listing ==========

    /// Direct children of a directory, in no particular order.
    async fn list_dir(&self, path: &str) -> StoreResult<Vec<Entry>>;

    /// Depth-first traversal rooted at `root`, root included. Every directory
    /// is reported before anything inside it.
    async fn walk(&self, root: &str) -> StoreResult<Vec<WalkNode>>;

    // ========== File Transfer ==========

    /// Read a whole file.
    async fn read_file(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Write a whole file, truncating any existing object.
    async fn write_file(&self, path: &str, data: Vec<u8>) -> StoreResult<()>;

    /// Create one directory. An existing directory must be reported as
    /// `StoreError::AlreadyExists`.
    async fn create_dir(&self, path: &str) -> StoreResult<()>;

    // ========== Removal ==========

    async fn remove_file(&self, path: &str) -> StoreResult<()>;

    /// Remove a directory together with everything inside it.
    async fn remove_dir_all(&self, path: &str) -> StoreResult<()>;

    // ========== Info ==========

    /// Short name shown in pane titles and logs.
    fn name(&self) -> &str;
}

/// Which optional operations a pane's backend supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendCapabilities {
    pub transfer: bool,
    pub delete: bool,
}

impl BackendCapabilities {
    /// Listing only.
    pub fn read_only() -> Self {
        Self::default()
    }

    pub fn full() -> Self {
        Self {
            transfer: true,
            delete: true,
        }
    }
}

/// The capability set a pane is configured with.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list(&self, location: &str) -> StoreResult<Vec<Entry>>;

    /// Copy `selected` (children of `source_root`) into `destination_root`.
    async fn transfer(
        &self,
        source_root: &str,
        selected: &[Entry],
        destination_root: &str,
    ) -> StoreResult<()>;

    /// Remove `selected` (children of `location`).
    async fn delete(&self, location: &str, selected: &[Entry]) -> StoreResult<()>;

    fn capabilities(&self) -> BackendCapabilities;

    fn name(&self) -> &str;
}

/// A `Backend` composed from stores: listing and deleting on its own store,
/// transferring from its own store into an optional peer.
pub struct StoreBackend {
    store: Arc<dyn Store>,
    peer: Option<Arc<dyn Store>>,
    deletable: bool,
}

impl StoreBackend {
    /// Listing only; no transfer target, no deletion.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            peer: None,
            deletable: false,
        }
    }

    pub fn with_transfer_to(mut self, peer: Arc<dyn Store>) -> Self {
        self.peer = Some(peer);
        self
    }

    pub fn with_delete(mut self) -> Self {
        self.deletable = true;
        self
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }
}

#[async_trait]
impl Backend for StoreBackend {
    async fn list(&self, location: &str) -> StoreResult<Vec<Entry>> {
        self.store.list_dir(location).await
    }

    async fn transfer(
        &self,
        source_root: &str,
        selected: &[Entry],
        destination_root: &str,
    ) -> StoreResult<()> {
        let Some(peer) = self.peer.as_deref() else {
            return Err(StoreError::Unsupported("transfer"));
        };
        engine::transfer(&*self.store, source_root, selected, peer, destination_root).await
    }

    async fn delete(&self, location: &str, selected: &[Entry]) -> StoreResult<()> {
        if !self.deletable {
            return Err(StoreError::Unsupported("delete"));
        }
        engine::delete(&*self.store, location, selected).await
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            transfer: self.peer.is_some(),
            delete: self.deletable,
        }
    }

    fn name(&self) -> &str {
        self.store.name()
    }
}
