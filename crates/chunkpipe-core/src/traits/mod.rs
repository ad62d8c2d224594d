//! Capability traits implemented by other ChunkPipe crates.

pub mod store;

pub use store::{ObjectStore, StoredObject};
