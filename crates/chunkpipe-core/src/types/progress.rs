//! Progress reporting types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The stage an upload task is currently in.
///
/// Stages advance strictly forward: `Preparing` → `Uploading` →
/// `Assembling` → `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStage {
    /// Validating and planning, before any network activity.
    Preparing,
    /// Chunk (or direct) uploads in flight.
    Uploading,
    /// Final single-object upload of the reassembled file.
    Assembling,
    /// The task finished successfully.
    Completed,
}

impl UploadStage {
    /// The overall percentage window `[start, end]` this stage maps to.
    ///
    /// Callers polling percentages see monotone progress regardless of
    /// file size because every stage owns a fixed slice of 0–100.
    pub fn window(self) -> (f64, f64) {
        match self {
            Self::Preparing => (0.0, 5.0),
            Self::Uploading => (5.0, 90.0),
            Self::Assembling => (90.0, 100.0),
            Self::Completed => (100.0, 100.0),
        }
    }
}

impl std::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preparing => write!(f, "preparing"),
            Self::Uploading => write!(f, "uploading"),
            Self::Assembling => write!(f, "assembling"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A point-in-time snapshot of upload progress.
///
/// Each emission is a fresh value; snapshots are never mutated after
/// being handed to the progress sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadProgress {
    /// Current pipeline stage.
    pub stage: UploadStage,
    /// Overall completion percentage, 0–100, non-decreasing within a task.
    pub percent: f64,
    /// Bytes uploaded so far.
    pub bytes_uploaded: u64,
    /// Total bytes in the file.
    pub total_bytes: u64,
    /// Chunks completed so far.
    pub chunks_completed: usize,
    /// Total chunks planned.
    pub total_chunks: usize,
    /// Human-readable description of the current operation.
    pub operation: String,
    /// Estimated time remaining, when enough data exists to guess.
    pub estimated_remaining: Option<Duration>,
}
