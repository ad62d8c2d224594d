//! Unified error types for the upload pipeline.
//!
//! The object-store boundary has its own error type ([`StoreError`]) so
//! that store implementations never need to know about pipeline stages.
//! Everything above the boundary maps into [`UploadError`] and propagates
//! through the ? operator.

use thiserror::Error;

/// Errors raised at the object-store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested object does not exist.
    #[error("object not found: {path}")]
    NotFound {
        /// Path that was requested.
        path: String,
    },

    /// An underlying I/O operation failed.
    #[error("I/O error for '{path}'")]
    Io {
        /// Path the operation was addressing.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The storage backend rejected the operation.
    #[error("storage backend error: {message}")]
    Backend {
        /// Description from the backend.
        message: String,
    },

    /// A single attempt exceeded its time budget.
    #[error("store operation timed out after {timeout_ms} ms")]
    Timeout {
        /// The per-attempt timeout that elapsed.
        timeout_ms: u64,
    },
}

/// Unified error type for all upload pipeline operations.
#[derive(Debug, Error)]
pub enum UploadError {
    // --- Validation errors (raised before any network activity) ---
    /// The file exceeds the configured hard size ceiling.
    #[error(
        "file is {size_bytes} bytes, exceeding the maximum upload size of {limit_bytes} bytes"
    )]
    FileTooLarge {
        /// Actual file size in bytes.
        size_bytes: u64,
        /// The configured ceiling in bytes.
        limit_bytes: u64,
    },

    /// The file has no content.
    #[error("file is empty, nothing to upload")]
    EmptyFile,

    /// The file's MIME type is not on the configured allow-list.
    #[error("MIME type '{mime_type}' is not allowed for upload")]
    DisallowedMimeType {
        /// The rejected MIME type.
        mime_type: String,
    },

    /// The configured chunk size cannot partition a file.
    #[error("chunk size must be positive, got {chunk_size}")]
    InvalidChunkSize {
        /// The rejected chunk size.
        chunk_size: u64,
    },

    /// The configured batch size cannot schedule chunks.
    #[error("batch size must be positive, got {batch_size}")]
    InvalidBatchSize {
        /// The rejected batch size.
        batch_size: usize,
    },

    // --- Pipeline errors ---
    /// A chunk exhausted all of its upload attempts.
    #[error("chunk {index} failed after {attempts} attempts")]
    ChunkFailed {
        /// Zero-based chunk index.
        index: usize,
        /// Total attempts made (initial try plus retries).
        attempts: u32,
        /// The error from the final attempt.
        #[source]
        source: StoreError,
    },

    /// The final single-object upload after chunking failed.
    #[error("final assembly upload failed")]
    AssemblyFailed {
        /// The underlying store error.
        #[source]
        source: StoreError,
    },

    /// Terminal failure wrapper carrying task-level context.
    #[error("upload failed with {chunks_completed}/{total_chunks} chunks uploaded")]
    TaskFailed {
        /// Chunks that had succeeded before the task aborted.
        chunks_completed: usize,
        /// Total chunks planned for the task.
        total_chunks: usize,
        /// The root cause.
        #[source]
        source: Box<UploadError>,
    },

    /// The upload was cancelled via its cancellation token.
    #[error("upload cancelled")]
    Cancelled,

    /// The whole task exceeded its aggregate time budget.
    #[error("upload timed out after {timeout_ms} ms")]
    TaskTimeout {
        /// The aggregate timeout that elapsed.
        timeout_ms: u64,
    },

    // --- Configuration errors ---
    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl From<config::ConfigError> for UploadError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}
