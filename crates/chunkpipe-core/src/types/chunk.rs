//! Chunk descriptors.
//!
//! A chunk's lifecycle is a pure state transition: the planner produces
//! immutable [`ChunkSpec`]s, and each successful upload attempt produces
//! a fresh [`UploadedChunk`] — no descriptor is ever mutated in place.

use uuid::Uuid;

/// One planned byte-range slice of a source file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChunkSpec {
    /// Zero-based chunk index.
    pub index: usize,
    /// Byte offset of the first byte in this chunk.
    pub start: u64,
    /// Byte offset one past the last byte in this chunk.
    pub end: u64,
}

impl ChunkSpec {
    /// Size of this chunk in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Whether the chunk covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A chunk that has been uploaded successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedChunk {
    /// The planned slice this result corresponds to.
    pub spec: ChunkSpec,
    /// Public URL of the chunk object.
    pub url: String,
    /// Canonical store path of the chunk object.
    pub path: String,
    /// Total attempts the chunk took (initial try plus retries).
    pub attempts: u32,
}

/// Store path for an intermediate chunk object.
///
/// Chunks are namespaced under a per-task upload ID so concurrent tasks
/// never collide.
pub fn chunk_object_path(upload_id: Uuid, index: usize) -> String {
    format!("_chunks/{upload_id}/{index:06}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_len() {
        let spec = ChunkSpec {
            index: 2,
            start: 10 * 1024 * 1024,
            end: 12 * 1024 * 1024,
        };
        assert_eq!(spec.len(), 2 * 1024 * 1024);
        assert!(!spec.is_empty());
    }

    #[test]
    fn test_chunk_path_is_zero_padded_and_namespaced() {
        let upload_id = Uuid::new_v4();
        let path = chunk_object_path(upload_id, 7);
        assert_eq!(path, format!("_chunks/{upload_id}/000007"));
    }
}
