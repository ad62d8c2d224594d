//! Local filesystem object store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use chunkpipe_core::error::StoreError;
use chunkpipe_core::result::StoreResult;
use chunkpipe_core::traits::store::{ObjectStore, StoredObject};

/// Object store backed by a rooted directory on the local filesystem.
///
/// Object paths map to files under the root; `file://` URLs point at
/// the absolute file location.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    /// Root directory for all stored objects.
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a new local store rooted at the given path.
    pub async fn new(root_path: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root_path.into();
        fs::create_dir_all(&root).await.map_err(|e| StoreError::Io {
            path: root.display().to_string(),
            source: e,
        })?;
        Ok(Self { root })
    }

    /// Resolve an object path to an absolute path within the root.
    fn resolve(&self, path: &str) -> PathBuf {
        let clean = path.trim_start_matches('/');
        self.root.join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| StoreError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    fn url_for(&self, path: &str) -> String {
        format!("file://{}", self.resolve(path).display())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn store_type(&self) -> &str {
        "local"
    }

    async fn put(&self, path: &str, data: Bytes) -> StoreResult<StoredObject> {
        let full_path = self.resolve(path);
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| StoreError::Io {
            path: path.to_string(),
            source: e,
        })?;

        debug!(path, bytes = data.len(), "Wrote object");
        Ok(StoredObject {
            url: self.url_for(path),
            path: path.to_string(),
        })
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let full_path = self.resolve(path);
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(path, "Deleted object");
                Ok(())
            }
            // Idempotent: deleting a missing object is fine.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io {
                path: path.to_string(),
                source: e,
            }),
        }
    }

    async fn download_url(&self, path: &str) -> StoreResult<String> {
        let full_path = self.resolve(path);
        if !fs::try_exists(&full_path).await.unwrap_or(false) {
            return Err(StoreError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(self.url_for(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_download_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalObjectStore::new(dir.path()).await.expect("store");

        let object = store
            .put("uploads/a/b.bin", Bytes::from_static(b"hello"))
            .await
            .expect("put");
        assert_eq!(object.path, "uploads/a/b.bin");
        assert!(object.url.starts_with("file://"));

        let url = store.download_url("uploads/a/b.bin").await.expect("url");
        assert_eq!(url, object.url);

        let on_disk = std::fs::read(dir.path().join("uploads/a/b.bin")).expect("read");
        assert_eq!(on_disk, b"hello");
    }

    #[tokio::test]
    async fn test_put_overwrites_in_place() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalObjectStore::new(dir.path()).await.expect("store");

        store.put("x", Bytes::from_static(b"first")).await.expect("put");
        store.put("x", Bytes::from_static(b"second")).await.expect("put");

        let on_disk = std::fs::read(dir.path().join("x")).expect("read");
        assert_eq!(on_disk, b"second");
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalObjectStore::new(dir.path()).await.expect("store");
        assert!(store.delete("never-written").await.is_ok());
    }

    #[tokio::test]
    async fn test_download_url_for_missing_object() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalObjectStore::new(dir.path()).await.expect("store");
        assert!(matches!(
            store.download_url("missing").await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
