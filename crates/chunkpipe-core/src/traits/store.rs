//! Object-store capability trait for pluggable storage backends.
//!
//! The pipeline never talks to a vendor SDK directly; it is handed an
//! implementation of [`ObjectStore`] at construction time. The trait is
//! deliberately minimal — create/overwrite, delete, and URL resolution
//! are the only operations the pipeline needs.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::StoreResult;

/// A handle to an object created in the store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredObject {
    /// Public URL from which the object can be fetched.
    pub url: String,
    /// Canonical path of the object within the store.
    pub path: String,
}

/// Trait for object storage backends.
///
/// Implementations exist for the local filesystem and an in-memory map
/// in `chunkpipe-store`. A `put` to an existing path overwrites the
/// object in place; retried uploads rely on this to avoid duplicates.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the store type name (e.g., "local", "memory").
    fn store_type(&self) -> &str;

    /// Create or overwrite an object and return its handle.
    async fn put(&self, path: &str, data: Bytes) -> StoreResult<StoredObject>;

    /// Remove an object. Deleting a missing object is not an error.
    async fn delete(&self, path: &str) -> StoreResult<()>;

    /// Resolve an existing object path to a fetchable URL.
    async fn download_url(&self, path: &str) -> StoreResult<String>;
}
