//! In-memory object store.
//!
//! Primarily for tests and examples of the capability interface; also
//! handy as a scratch store in tooling.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use chunkpipe_core::error::StoreError;
use chunkpipe_core::result::StoreResult;
use chunkpipe_core::traits::store::{ObjectStore, StoredObject};

/// Object store backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    /// Map of object path → content.
    objects: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch an object's content, if present.
    pub async fn get(&self, path: &str) -> Option<Bytes> {
        let objects = self.objects.read().await;
        objects.get(path).cloned()
    }

    /// Number of objects currently stored.
    pub async fn object_count(&self) -> usize {
        let objects = self.objects.read().await;
        objects.len()
    }

    /// Paths of all stored objects, sorted.
    pub async fn paths(&self) -> Vec<String> {
        let objects = self.objects.read().await;
        let mut paths: Vec<String> = objects.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn url_for(path: &str) -> String {
        format!("memory://{path}")
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn store_type(&self) -> &str {
        "memory"
    }

    async fn put(&self, path: &str, data: Bytes) -> StoreResult<StoredObject> {
        let mut objects = self.objects.write().await;
        objects.insert(path.to_string(), data);
        Ok(StoredObject {
            url: Self::url_for(path),
            path: path.to_string(),
        })
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let mut objects = self.objects.write().await;
        objects.remove(path);
        Ok(())
    }

    async fn download_url(&self, path: &str) -> StoreResult<String> {
        let objects = self.objects.read().await;
        if !objects.contains_key(path) {
            return Err(StoreError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(Self::url_for(path))
    }
}
