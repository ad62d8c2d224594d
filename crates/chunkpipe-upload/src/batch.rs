//! Batch scheduling — drives all chunks to completion or fails the task.
//!
//! Chunks are processed in fixed-size batches whose members upload
//! concurrently; batches themselves run strictly sequentially with a
//! short pause between them. Each chunk retries independently with
//! exponential backoff. When a chunk exhausts its retries the sibling
//! attempts in the same batch are allowed to settle, but no further
//! batch is scheduled.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use chunkpipe_core::config::UploadConfig;
use chunkpipe_core::error::{StoreError, UploadError};
use chunkpipe_core::result::UploadResult;
use chunkpipe_core::traits::store::StoredObject;
use chunkpipe_core::types::chunk::{ChunkSpec, UploadedChunk, chunk_object_path};
use chunkpipe_core::types::file::SourceFile;

use crate::progress::ProgressReporter;
use crate::uploader::ChunkUploader;

/// A batch run that did not complete, with whatever succeeded so far.
///
/// The orchestrator needs the partial successes to drive cleanup.
#[derive(Debug)]
pub struct BatchFailure {
    /// The first error observed.
    pub error: UploadError,
    /// Chunks that succeeded before the failure.
    pub uploaded: Vec<UploadedChunk>,
}

/// Schedules chunk uploads in bounded concurrent batches.
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    uploader: ChunkUploader,
    config: UploadConfig,
    reporter: Arc<ProgressReporter>,
}

impl BatchScheduler {
    /// Create a new scheduler.
    pub fn new(uploader: ChunkUploader, config: UploadConfig, reporter: Arc<ProgressReporter>) -> Self {
        Self {
            uploader,
            config,
            reporter,
        }
    }

    /// Drive every chunk to success, or stop after the first exhausted
    /// chunk. Returned chunks are ordered by index regardless of
    /// completion order.
    pub async fn run(
        &self,
        upload_id: Uuid,
        file: &SourceFile,
        specs: &[ChunkSpec],
        cancel: &CancellationToken,
    ) -> Result<Vec<UploadedChunk>, BatchFailure> {
        let mut uploaded: Vec<UploadedChunk> = Vec::with_capacity(specs.len());

        for (batch_index, batch) in specs.chunks(self.config.batch_size).enumerate() {
            if batch_index > 0 {
                tokio::time::sleep(self.config.batch_delay()).await;
            }
            if cancel.is_cancelled() {
                return Err(BatchFailure {
                    error: UploadError::Cancelled,
                    uploaded,
                });
            }

            debug!(
                batch = batch_index,
                chunks = batch.len(),
                "Starting upload batch"
            );

            let attempts = batch
                .iter()
                .map(|spec| self.drive_chunk(upload_id, file.slice(spec), spec.clone(), cancel));
            let results = join_all(attempts).await;

            let mut error = None;
            for result in results {
                match result {
                    Ok(chunk) => uploaded.push(chunk),
                    Err(e) => {
                        if error.is_none() {
                            error = Some(e);
                        }
                    }
                }
            }
            if let Some(error) = error {
                return Err(BatchFailure { error, uploaded });
            }
        }

        uploaded.sort_by_key(|chunk| chunk.spec.index);
        Ok(uploaded)
    }

    /// Upload a whole file directly to its destination path, with the
    /// same retry policy as a chunk. Used for the small-file bypass.
    pub async fn upload_direct(
        &self,
        path: &str,
        data: Bytes,
        cancel: &CancellationToken,
    ) -> UploadResult<(StoredObject, u32)> {
        self.retry_put(path, 0, data, cancel).await
    }

    /// Drive one chunk through its retry loop and record progress.
    async fn drive_chunk(
        &self,
        upload_id: Uuid,
        data: Bytes,
        spec: ChunkSpec,
        cancel: &CancellationToken,
    ) -> UploadResult<UploadedChunk> {
        let path = chunk_object_path(upload_id, spec.index);
        let (object, attempts) = self.retry_put(&path, spec.index, data, cancel).await?;

        self.reporter.chunk_done(&spec);
        debug!(
            chunk = spec.index,
            attempts,
            path = %object.path,
            "Chunk uploaded"
        );

        Ok(UploadedChunk {
            spec,
            url: object.url,
            path: object.path,
            attempts,
        })
    }

    /// Retry loop: up to `max_retries + 1` total attempts, sleeping the
    /// backoff delay before each retry. Retries reuse the same path so
    /// an earlier partial write is overwritten, never double-counted.
    async fn retry_put(
        &self,
        path: &str,
        index: usize,
        data: Bytes,
        cancel: &CancellationToken,
    ) -> UploadResult<(StoredObject, u32)> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if cancel.is_cancelled() {
                return Err(UploadError::Cancelled);
            }

            if attempt > 0 {
                let delay = self.config.backoff_delay(attempt);
                warn!(
                    chunk = index,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying chunk upload"
                );
                tokio::time::sleep(delay).await;
            }

            let outcome = tokio::select! {
                result = self.uploader.put_with_timeout(path, data.clone()) => result,
                _ = cancel.cancelled() => return Err(UploadError::Cancelled),
            };

            match outcome {
                Ok(object) => return Ok((object, attempt + 1)),
                Err(e) => {
                    warn!(
                        chunk = index,
                        attempt,
                        error = %e,
                        "Chunk upload attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(UploadError::ChunkFailed {
            index,
            attempts: self.config.max_retries + 1,
            source: last_error.unwrap_or(StoreError::Backend {
                message: "no upload attempt was made".to_string(),
            }),
        })
    }
}
