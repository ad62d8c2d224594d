//! The public entry point that drives the pipeline stages in order:
//! prepare → upload → assemble → cleanup → complete.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use chunkpipe_core::config::UploadConfig;
use chunkpipe_core::error::UploadError;
use chunkpipe_core::result::UploadResult;
use chunkpipe_core::traits::store::{ObjectStore, StoredObject};
use chunkpipe_core::types::chunk::ChunkSpec;
use chunkpipe_core::types::file::{CompletedUpload, SourceFile};
use chunkpipe_core::types::progress::UploadStage;

use crate::assembler::Assembler;
use crate::batch::BatchScheduler;
use crate::cleanup::ChunkCleanup;
use crate::planner;
use crate::progress::{ProgressReporter, UploadHooks};
use crate::uploader::ChunkUploader;

/// Uploads large files into an object store via chunking, with retry,
/// progress reporting, and best-effort cleanup.
///
/// Files at or below the configured chunk size skip the chunk machinery
/// and go up as one direct upload with the same progress contract.
#[derive(Debug, Clone)]
pub struct LargeFileUploader {
    /// The destination object store.
    store: Arc<dyn ObjectStore>,
    /// Pipeline configuration.
    config: UploadConfig,
}

impl LargeFileUploader {
    /// Create a new uploader. Rejects configurations that cannot drive
    /// a pipeline (zero chunk or batch size).
    pub fn new(store: Arc<dyn ObjectStore>, config: UploadConfig) -> UploadResult<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Upload a file to `dest_path` (convenience wrapper without
    /// cancellation).
    pub async fn upload(
        &self,
        file: SourceFile,
        dest_path: &str,
        hooks: UploadHooks,
    ) -> UploadResult<CompletedUpload> {
        self.upload_with_cancel(file, dest_path, hooks, CancellationToken::new())
            .await
    }

    /// Upload a file to `dest_path`, honoring the cancellation token at
    /// every stage boundary and retry attempt.
    pub async fn upload_with_cancel(
        &self,
        file: SourceFile,
        dest_path: &str,
        hooks: UploadHooks,
        cancel: CancellationToken,
    ) -> UploadResult<CompletedUpload> {
        // Validation happens before any network activity.
        self.validate(&file)?;

        match self.config.task_timeout_ms {
            None => self.run(file, dest_path, hooks, cancel).await,
            Some(timeout_ms) => {
                // The aggregate budget rides on the cancellation token so
                // that in-flight chunks still get cleaned up on expiry.
                let cancel = cancel.child_token();
                let expired = Arc::new(AtomicBool::new(false));
                let timer = {
                    let cancel = cancel.clone();
                    let expired = expired.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
                        expired.store(true, Ordering::SeqCst);
                        cancel.cancel();
                    })
                };

                let result = self.run(file, dest_path, hooks, cancel).await;
                timer.abort();

                match result {
                    Err(UploadError::Cancelled) if expired.load(Ordering::SeqCst) => {
                        Err(UploadError::TaskTimeout { timeout_ms })
                    }
                    other => other,
                }
            }
        }
    }

    /// Synchronous input validation: size ceiling, empty files, and the
    /// MIME allow-list.
    fn validate(&self, file: &SourceFile) -> UploadResult<()> {
        let size_bytes = file.size_bytes();
        if size_bytes == 0 {
            return Err(UploadError::EmptyFile);
        }
        if size_bytes > self.config.max_file_size_bytes {
            return Err(UploadError::FileTooLarge {
                size_bytes,
                limit_bytes: self.config.max_file_size_bytes,
            });
        }
        if let Some(mime_type) = &file.mime_type
            && !self.config.is_mime_allowed(mime_type)
        {
            return Err(UploadError::DisallowedMimeType {
                mime_type: mime_type.clone(),
            });
        }
        Ok(())
    }

    async fn run(
        &self,
        file: SourceFile,
        dest_path: &str,
        hooks: UploadHooks,
        cancel: CancellationToken,
    ) -> UploadResult<CompletedUpload> {
        let started = Instant::now();
        let size_bytes = file.size_bytes();
        let bypass = size_bytes <= self.config.chunk_size_bytes;

        let specs = if bypass {
            vec![ChunkSpec {
                index: 0,
                start: 0,
                end: size_bytes,
            }]
        } else {
            planner::plan(size_bytes, self.config.chunk_size_bytes)?
        };

        let reporter = Arc::new(ProgressReporter::new(
            hooks,
            size_bytes,
            specs.len(),
            started,
        ));
        reporter.stage(UploadStage::Preparing, "Preparing upload");

        let uploader = ChunkUploader::new(self.store.clone(), self.config.chunk_timeout());
        let cleanup = ChunkCleanup::new(self.store.clone());
        let scheduler = BatchScheduler::new(uploader.clone(), self.config.clone(), reporter.clone());

        if bypass {
            return self
                .direct_upload(file, dest_path, &specs[0], &scheduler, &reporter, &cancel, started)
                .await;
        }

        let upload_id = Uuid::new_v4();
        info!(
            upload_id = %upload_id,
            file = %file.name,
            size = size_bytes,
            chunks = specs.len(),
            "Starting chunked upload"
        );

        reporter.stage(UploadStage::Uploading, "Uploading chunks");
        let uploaded = match scheduler.run(upload_id, &file, &specs, &cancel).await {
            Ok(uploaded) => uploaded,
            Err(failure) => {
                // Every chunk that made it up gets cleaned, whatever the
                // task outcome.
                cleanup.remove_chunks(&failure.uploaded).await;
                return Err(match failure.error {
                    UploadError::Cancelled => UploadError::Cancelled,
                    error => UploadError::TaskFailed {
                        chunks_completed: failure.uploaded.len(),
                        total_chunks: specs.len(),
                        source: Box::new(error),
                    },
                });
            }
        };

        reporter.stage(UploadStage::Assembling, "Assembling file");
        let assembler = Assembler::new(uploader, cleanup.clone());
        let object = match assembler.assemble(&file, &uploaded, dest_path, &cancel).await {
            Ok(object) => object,
            Err(error) => {
                cleanup.remove_chunks(&uploaded).await;
                return Err(match error {
                    UploadError::Cancelled => UploadError::Cancelled,
                    error => UploadError::TaskFailed {
                        chunks_completed: uploaded.len(),
                        total_chunks: specs.len(),
                        source: Box::new(error),
                    },
                });
            }
        };

        reporter.completed();
        let completed = self.completed(file, object, specs.len(), started);
        info!(
            upload_id = %upload_id,
            path = %completed.path,
            size = completed.size_bytes,
            chunks = completed.chunks,
            elapsed_ms = completed.elapsed.as_millis() as u64,
            "Chunked upload completed"
        );
        Ok(completed)
    }

    /// Small-file bypass: one direct upload, no chunk objects, no
    /// assembly, same progress shape with a single chunk of count 1.
    #[allow(clippy::too_many_arguments)]
    async fn direct_upload(
        &self,
        file: SourceFile,
        dest_path: &str,
        spec: &ChunkSpec,
        scheduler: &BatchScheduler,
        reporter: &ProgressReporter,
        cancel: &CancellationToken,
        started: Instant,
    ) -> UploadResult<CompletedUpload> {
        reporter.stage(UploadStage::Uploading, "Uploading file");

        let (object, attempts) = scheduler
            .upload_direct(dest_path, file.data.clone(), cancel)
            .await
            .map_err(|error| match error {
                UploadError::Cancelled => UploadError::Cancelled,
                error => UploadError::TaskFailed {
                    chunks_completed: 0,
                    total_chunks: 1,
                    source: Box::new(error),
                },
            })?;

        reporter.chunk_done(spec);
        reporter.completed();

        let completed = self.completed(file, object, 1, started);
        info!(
            path = %completed.path,
            size = completed.size_bytes,
            attempts,
            "Direct upload completed"
        );
        Ok(completed)
    }

    fn completed(
        &self,
        file: SourceFile,
        object: StoredObject,
        chunks: usize,
        started: Instant,
    ) -> CompletedUpload {
        CompletedUpload {
            url: object.url,
            path: object.path,
            file_name: file.name,
            mime_type: file.mime_type,
            size_bytes: file.data.len() as u64,
            chunks,
            elapsed: started.elapsed(),
            completed_at: Utc::now(),
        }
    }
}
