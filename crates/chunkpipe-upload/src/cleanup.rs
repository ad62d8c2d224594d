//! Best-effort deletion of intermediate chunk objects.

use std::sync::Arc;

use tracing::{debug, warn};

use chunkpipe_core::traits::store::ObjectStore;
use chunkpipe_core::types::chunk::UploadedChunk;

/// Deletes chunk objects after assembly or after an aborted task.
///
/// Every deletion is attempted independently; failures are logged and
/// swallowed. Cleanup can never fail the task that invoked it.
#[derive(Debug, Clone)]
pub struct ChunkCleanup {
    /// Store holding the chunk objects.
    store: Arc<dyn ObjectStore>,
}

impl ChunkCleanup {
    /// Create a new cleanup agent.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Delete the objects behind every chunk in the list.
    pub async fn remove_chunks(&self, chunks: &[UploadedChunk]) {
        let mut removed = 0usize;
        for chunk in chunks {
            match self.store.delete(&chunk.path).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!(
                        chunk = chunk.spec.index,
                        path = %chunk.path,
                        error = %e,
                        "Failed to delete chunk object"
                    );
                }
            }
        }
        debug!(removed, total = chunks.len(), "Cleaned up chunk objects");
    }
}
