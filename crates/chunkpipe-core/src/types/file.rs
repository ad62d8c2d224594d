//! Source file and terminal upload result types.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::chunk::ChunkSpec;

/// One logical file to upload: the full content held in memory plus
/// its identifying metadata. Consumed entirely within one pipeline
/// invocation; never persisted.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Original file name.
    pub name: String,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// Complete file content.
    pub data: Bytes,
}

impl SourceFile {
    /// Create a new source file.
    pub fn new(name: impl Into<String>, mime_type: Option<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            mime_type,
            data,
        }
    }

    /// Total file size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Cheap view of the bytes covered by a chunk spec.
    pub fn slice(&self, spec: &ChunkSpec) -> Bytes {
        self.data.slice(spec.start as usize..spec.end as usize)
    }
}

/// The terminal success value of one upload task.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CompletedUpload {
    /// Public URL of the final object.
    pub url: String,
    /// Canonical store path of the final object.
    pub path: String,
    /// Original file name.
    pub file_name: String,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Number of chunks the upload used (1 for the small-file bypass).
    pub chunks: usize,
    /// Wall-clock duration of the upload.
    pub elapsed: Duration,
    /// When the upload completed.
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_covers_spec_range() {
        let file = SourceFile::new("a.bin", None, Bytes::from(vec![1u8, 2, 3, 4, 5]));
        let spec = ChunkSpec {
            index: 0,
            start: 1,
            end: 4,
        };
        assert_eq!(file.slice(&spec).as_ref(), &[2, 3, 4]);
        assert_eq!(file.size_bytes(), 5);
    }

    #[test]
    fn test_completed_upload_serializes() {
        let done = CompletedUpload {
            url: "memory://final/report.pdf".to_string(),
            path: "final/report.pdf".to_string(),
            file_name: "report.pdf".to_string(),
            mime_type: Some("application/pdf".to_string()),
            size_bytes: 42,
            chunks: 1,
            elapsed: Duration::from_millis(10),
            completed_at: Utc::now(),
        };
        let json = serde_json::to_value(&done).expect("serializable");
        assert_eq!(json["chunks"], 1);
        assert_eq!(json["file_name"], "report.pdf");
    }
}
