//! Convenience result type aliases for ChunkPipe.

use crate::error::{StoreError, UploadError};

/// A specialized `Result` type for upload pipeline operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// A specialized `Result` type for object-store operations.
pub type StoreResult<T> = Result<T, StoreError>;
