//! Progress accounting and emission.
//!
//! The reporter owns the running byte/chunk counters for one task and
//! funnels fresh [`UploadProgress`] snapshots to the caller's sinks.
//! Emitted percentages are clamped to be non-decreasing, so a caller
//! polling them sees monotone progress across stage boundaries.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use chunkpipe_core::types::chunk::ChunkSpec;
use chunkpipe_core::types::progress::{UploadProgress, UploadStage};

/// Caller-supplied callback receiving progress snapshots.
pub type ProgressSink = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// Caller-supplied callback invoked after each chunk completes, with
/// `(completed_chunks, total_chunks)`.
pub type ChunkCompleteSink = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Optional per-upload callbacks.
#[derive(Clone, Default)]
pub struct UploadHooks {
    /// Receives a snapshot on every progress change.
    pub on_progress: Option<ProgressSink>,
    /// Invoked after each individual chunk success.
    pub on_chunk_complete: Option<ChunkCompleteSink>,
}

impl UploadHooks {
    /// Hooks with only a progress sink.
    pub fn with_progress(sink: impl Fn(UploadProgress) + Send + Sync + 'static) -> Self {
        Self {
            on_progress: Some(Arc::new(sink)),
            on_chunk_complete: None,
        }
    }

    /// Add a chunk-completion sink.
    pub fn and_chunk_complete(
        mut self,
        sink: impl Fn(usize, usize) + Send + Sync + 'static,
    ) -> Self {
        self.on_chunk_complete = Some(Arc::new(sink));
        self
    }
}

impl fmt::Debug for UploadHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadHooks")
            .field("on_progress", &self.on_progress.is_some())
            .field("on_chunk_complete", &self.on_chunk_complete.is_some())
            .finish()
    }
}

/// Progress state for one upload task.
#[derive(Debug)]
pub struct ProgressReporter {
    hooks: UploadHooks,
    total_bytes: u64,
    total_chunks: usize,
    started: Instant,
    bytes_uploaded: AtomicU64,
    chunks_completed: AtomicUsize,
    /// Bit pattern of the highest percentage emitted so far.
    last_percent: AtomicU64,
}

impl ProgressReporter {
    /// Create a reporter for a task of `total_bytes` across
    /// `total_chunks` chunks.
    pub fn new(hooks: UploadHooks, total_bytes: u64, total_chunks: usize, started: Instant) -> Self {
        Self {
            hooks,
            total_bytes,
            total_chunks,
            started,
            bytes_uploaded: AtomicU64::new(0),
            chunks_completed: AtomicUsize::new(0),
            last_percent: AtomicU64::new(0f64.to_bits()),
        }
    }

    /// Announce entry into a stage at the start of its window.
    pub fn stage(&self, stage: UploadStage, operation: &str) {
        let (start, _) = stage.window();
        self.emit(stage, start, operation);
    }

    /// Record a chunk success: advance counters, emit a snapshot scaled
    /// into the uploading window, and fire the chunk-complete sink.
    pub fn chunk_done(&self, spec: &ChunkSpec) {
        let bytes = self
            .bytes_uploaded
            .fetch_add(spec.len(), Ordering::Relaxed)
            + spec.len();
        let done = self.chunks_completed.fetch_add(1, Ordering::Relaxed) + 1;

        let (start, end) = UploadStage::Uploading.window();
        let ratio = if self.total_bytes == 0 {
            1.0
        } else {
            bytes as f64 / self.total_bytes as f64
        };
        let percent = start + ratio.min(1.0) * (end - start);
        self.emit(
            UploadStage::Uploading,
            percent,
            &format!("Uploaded chunk {done} of {}", self.total_chunks),
        );

        if let Some(sink) = &self.hooks.on_chunk_complete {
            sink(done, self.total_chunks);
        }
    }

    /// Announce successful completion at 100%.
    pub fn completed(&self) {
        self.emit(UploadStage::Completed, 100.0, "Upload complete");
    }

    fn emit(&self, stage: UploadStage, percent: f64, operation: &str) {
        let percent = self.clamp_monotonic(percent);
        let Some(sink) = &self.hooks.on_progress else {
            return;
        };

        let bytes_uploaded = self.bytes_uploaded.load(Ordering::Relaxed);
        sink(UploadProgress {
            stage,
            percent,
            bytes_uploaded,
            total_bytes: self.total_bytes,
            chunks_completed: self.chunks_completed.load(Ordering::Relaxed),
            total_chunks: self.total_chunks,
            operation: operation.to_string(),
            estimated_remaining: self.estimate_remaining(stage, bytes_uploaded),
        });
    }

    /// Never let an emitted percentage drop below a previous one.
    fn clamp_monotonic(&self, percent: f64) -> f64 {
        let mut current = self.last_percent.load(Ordering::Relaxed);
        loop {
            let previous = f64::from_bits(current);
            if percent <= previous {
                return previous;
            }
            match self.last_percent.compare_exchange_weak(
                current,
                percent.to_bits(),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return percent,
                Err(observed) => current = observed,
            }
        }
    }

    /// Rough remaining-time estimate from the observed byte rate.
    fn estimate_remaining(&self, stage: UploadStage, bytes_uploaded: u64) -> Option<Duration> {
        if stage != UploadStage::Uploading || bytes_uploaded == 0 {
            return None;
        }
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }
        let rate = bytes_uploaded as f64 / elapsed;
        let remaining = self.total_bytes.saturating_sub(bytes_uploaded) as f64;
        Some(Duration::from_secs_f64(remaining / rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn capture() -> (UploadHooks, Arc<Mutex<Vec<UploadProgress>>>) {
        let seen: Arc<Mutex<Vec<UploadProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let hooks = UploadHooks::with_progress(move |p| {
            sink_seen.lock().expect("lock").push(p);
        });
        (hooks, seen)
    }

    #[test]
    fn test_chunk_done_scales_into_uploading_window() {
        let (hooks, seen) = capture();
        let reporter = ProgressReporter::new(hooks, 100, 2, Instant::now());

        reporter.chunk_done(&ChunkSpec {
            index: 0,
            start: 0,
            end: 50,
        });
        reporter.chunk_done(&ChunkSpec {
            index: 1,
            start: 50,
            end: 100,
        });

        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 2);
        assert!((seen[0].percent - 47.5).abs() < 1e-9); // 5 + 0.5 * 85
        assert!((seen[1].percent - 90.0).abs() < 1e-9);
        assert_eq!(seen[1].chunks_completed, 2);
        assert_eq!(seen[1].bytes_uploaded, 100);
    }

    #[test]
    fn test_percent_never_decreases() {
        let (hooks, seen) = capture();
        let reporter = ProgressReporter::new(hooks, 100, 1, Instant::now());

        reporter.stage(UploadStage::Assembling, "Assembling file");
        // A late uploading emission must not drop below 90.
        reporter.chunk_done(&ChunkSpec {
            index: 0,
            start: 0,
            end: 10,
        });
        reporter.completed();

        let seen = seen.lock().expect("lock");
        let percents: Vec<f64> = seen.iter().map(|p| p.percent).collect();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{percents:?}");
        assert_eq!(*percents.last().expect("non-empty"), 100.0);
    }

    #[test]
    fn test_chunk_complete_sink_sees_counts() {
        let counts: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_counts = counts.clone();
        let hooks = UploadHooks::default().and_chunk_complete(move |done, total| {
            sink_counts.lock().expect("lock").push((done, total));
        });
        let reporter = ProgressReporter::new(hooks, 10, 2, Instant::now());

        reporter.chunk_done(&ChunkSpec {
            index: 1,
            start: 5,
            end: 10,
        });
        assert_eq!(*counts.lock().expect("lock"), vec![(1, 2)]);
    }
}
