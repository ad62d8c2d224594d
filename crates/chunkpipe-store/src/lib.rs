//! # chunkpipe-store
//!
//! Object store implementations for ChunkPipe. Ships a local-filesystem
//! store and an in-memory store; anything else (S3, GCS, ...) plugs in
//! by implementing [`chunkpipe_core::traits::ObjectStore`].

pub mod local;
pub mod memory;

pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;
