//! Assembly — rebuilds the file and uploads it as one final object.
//!
//! Reconstruction re-slices the **original in-memory file**, never the
//! uploaded chunk objects: the chunk objects only prove the pipeline's
//! segments went through and are deleted right after the final upload
//! succeeds.

use bytes::BytesMut;
use tokio_util::sync::CancellationToken;
use tracing::info;

use chunkpipe_core::error::UploadError;
use chunkpipe_core::result::UploadResult;
use chunkpipe_core::traits::store::StoredObject;
use chunkpipe_core::types::chunk::UploadedChunk;
use chunkpipe_core::types::file::SourceFile;

use crate::cleanup::ChunkCleanup;
use crate::uploader::ChunkUploader;

/// Assembles the final object once every chunk has succeeded.
#[derive(Debug, Clone)]
pub struct Assembler {
    /// Uploader for the final object (same timeout as a chunk attempt).
    uploader: ChunkUploader,
    /// Cleanup agent for the now-redundant chunk objects.
    cleanup: ChunkCleanup,
}

impl Assembler {
    /// Create a new assembler.
    pub fn new(uploader: ChunkUploader, cleanup: ChunkCleanup) -> Self {
        Self { uploader, cleanup }
    }

    /// Rebuild the file from the original bytes in chunk-index order,
    /// upload it to `dest_path`, then delete the chunk objects.
    pub async fn assemble(
        &self,
        file: &SourceFile,
        chunks: &[UploadedChunk],
        dest_path: &str,
        cancel: &CancellationToken,
    ) -> UploadResult<StoredObject> {
        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        let mut assembled = BytesMut::with_capacity(file.data.len());
        let mut ordered: Vec<&UploadedChunk> = chunks.iter().collect();
        ordered.sort_by_key(|chunk| chunk.spec.index);
        for chunk in &ordered {
            assembled.extend_from_slice(&file.slice(&chunk.spec));
        }

        let object = self
            .uploader
            .put_with_timeout(dest_path, assembled.freeze())
            .await
            .map_err(|source| UploadError::AssemblyFailed { source })?;

        info!(
            path = %object.path,
            bytes = file.data.len(),
            chunks = chunks.len(),
            "Assembly upload complete"
        );

        // Chunk objects are redundant once the final object exists.
        self.cleanup.remove_chunks(chunks).await;

        Ok(object)
    }
}
