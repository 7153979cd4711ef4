//! Progress reporting.
//!
//! Long operations (decoding a container, writing a folder of images,
//! encoding a video) report `(completed, total, label)` snapshots through a
//! [`ProgressCallback`] passed in via
//! [`ExportOptions`](crate::ExportOptions). Reports are advisory; they never
//! change what is decoded or in which order it is written, and the core runs
//! headless with the default no-op callback.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use camroll::{ExportOptions, ProgressFn};
//!
//! let options = ExportOptions::new().with_progress(Arc::new(ProgressFn(
//!     |completed: u64, total: u64, label: &str| {
//!         eprintln!("{label}: {completed}/{total}");
//!     },
//! )));
//! let report = camroll::decode_container("LHPG-1730122064.bin", &options)?;
//! # Ok::<(), camroll::CamrollError>(())
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Splitting and decoding the frames of one container.
    ContainerDecode,
    /// Writing decoded frames as still images.
    ImageExport,
    /// Encoding ordered frames into a video.
    VideoExport,
}

/// A snapshot of progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// Human-readable subject of the work, usually a file name.
    pub label: String,
    /// Items completed so far.
    pub current: u64,
    /// Items expected in total.
    pub total: u64,
    /// Completion percentage (0.0 – 100.0).
    pub percentage: f32,
    /// Wall-clock time since the operation started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
}

/// Receives progress updates.
///
/// Implementations must be [`Send`] and [`Sync`]: decode progress is reported
/// from worker threads, in completion order.
pub trait ProgressCallback: Send + Sync {
    /// Called as items complete.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Adapts a plain `(completed, total, label)` closure into a [`ProgressCallback`].
pub struct ProgressFn<F>(pub F);

impl<F> ProgressCallback for ProgressFn<F>
where
    F: Fn(u64, u64, &str) + Send + Sync,
{
    fn on_progress(&self, info: &ProgressInfo) {
        (self.0)(info.current, info.total, &info.label);
    }
}

/// Counts completed items from any thread and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    label: String,
    total: u64,
    current: AtomicU64,
    batch_size: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        label: impl Into<String>,
        total: u64,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            label: label.into(),
            total,
            current: AtomicU64::new(0),
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
        }
    }

    /// Record one completed item, reporting every `batch_size` items.
    pub(crate) fn advance(&self) {
        let current = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        if current % self.batch_size == 0 {
            self.report(current);
        }
    }

    /// Unconditionally emit a final report.
    pub(crate) fn finish(&self) {
        self.report(self.current.load(Ordering::Acquire));
    }

    fn report(&self, current: u64) {
        let elapsed = self.start_time.elapsed();

        let percentage = if self.total > 0 {
            (current as f32 / self.total as f32) * 100.0
        } else {
            100.0
        };

        let estimated_remaining = (current > 0).then(|| {
            let remaining = self.total.saturating_sub(current);
            elapsed.mul_f64(remaining as f64 / current as f64)
        });

        let info = ProgressInfo {
            operation: self.operation,
            label: self.label.clone(),
            current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
        };

        self.callback.on_progress(&info);
    }
}
