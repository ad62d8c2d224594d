//! Value types flowing through the upload pipeline.

pub mod chunk;
pub mod file;
pub mod progress;

pub use chunk::{ChunkSpec, UploadedChunk, chunk_object_path};
pub use file::{CompletedUpload, SourceFile};
pub use progress::{UploadProgress, UploadStage};
