//! # chunkpipe-upload
//!
//! The chunked upload pipeline. A file is split into byte-range chunks,
//! the chunks are uploaded in bounded concurrent batches with timeouts
//! and exponential backoff retries, the file is reassembled from the
//! original bytes and uploaded as one final object, and the
//! intermediate chunk objects are deleted best-effort.
//!
//! [`LargeFileUploader`] is the public entry point; everything else is
//! the machinery behind it.

pub mod assembler;
pub mod batch;
pub mod cleanup;
pub mod orchestrator;
pub mod planner;
pub mod progress;
pub mod uploader;

pub use orchestrator::LargeFileUploader;
pub use progress::{ChunkCompleteSink, ProgressSink, UploadHooks};
