//! Single-attempt object upload with a per-attempt timeout.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use chunkpipe_core::error::StoreError;
use chunkpipe_core::result::StoreResult;
use chunkpipe_core::traits::store::{ObjectStore, StoredObject};

/// Uploads one object per call, racing the store against a timer.
///
/// Retry policy lives in the batch scheduler; this type only knows how
/// to make exactly one bounded attempt. Retried attempts reuse the same
/// path, so a retry overwrites rather than duplicates.
#[derive(Debug, Clone)]
pub struct ChunkUploader {
    /// The destination object store.
    store: Arc<dyn ObjectStore>,
    /// Time budget for a single attempt.
    timeout: Duration,
}

impl ChunkUploader {
    /// Create a new uploader.
    pub fn new(store: Arc<dyn ObjectStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Attempt one upload. If the store does not answer within the
    /// configured timeout the attempt fails with [`StoreError::Timeout`].
    pub async fn put_with_timeout(&self, path: &str, data: Bytes) -> StoreResult<StoredObject> {
        let timeout_ms = self.timeout.as_millis() as u64;
        match tokio::time::timeout(self.timeout, self.store.put(path, data)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout { timeout_ms }),
        }
    }
}
