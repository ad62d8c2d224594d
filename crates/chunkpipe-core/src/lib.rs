//! # chunkpipe-core
//!
//! Core crate for ChunkPipe. Contains the object-store capability trait,
//! configuration schemas, value types for the upload pipeline, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other ChunkPipe crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{StoreError, UploadError};
pub use result::{StoreResult, UploadResult};
