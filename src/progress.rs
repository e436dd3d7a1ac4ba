//! Progress reporting, per-frame log lines, and cancellation.
//!
//! Both pipelines report through two injected sinks: a [`ProgressCallback`]
//! receiving a [`ProgressInfo`] snapshot (`current` out of a known `total`)
//! for each processed frame, and a [`LogSink`] receiving one human-readable
//! line per frame in processing order. A [`CancellationToken`] is checked
//! once per loop iteration.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use reframe::{
//!     ExtractOptions, FfmpegBackend, FrameRate, ProgressCallback, ProgressInfo, ReframeError,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.operation);
//!         }
//!     }
//! }
//!
//! let options = ExtractOptions::new()
//!     .with_progress(Arc::new(PrintProgress))
//!     .with_log(Arc::new(|line: &str| println!("{line}")));
//!
//! reframe::extract_frames(
//!     &FfmpegBackend::new(),
//!     "input.mp4",
//!     "frames",
//!     FrameRate::new(10)?,
//!     &options,
//! )?;
//! # Ok::<(), ReframeError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// The pipeline a progress snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Decoding a video into frame images.
    FrameExtraction,
    /// Encoding frame images into a video.
    VideoAssembly,
}

/// A snapshot of pipeline progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Which pipeline is running.
    pub operation: OperationType,
    /// Frames written so far.
    pub current: u64,
    /// Frames expected in total, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known and non-zero.
    pub percentage: Option<f32>,
    /// Wall-clock time since the pipeline started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Index of the frame just processed (the output ordinal during
    /// extraction, the position in sort order during assembly).
    pub current_frame: Option<u64>,
}

/// Trait for receiving progress updates.
///
/// Progress callbacks are **infallible**: they observe but cannot halt the
/// pipeline. Use [`CancellationToken`] for cooperative cancellation.
pub trait ProgressCallback: Send + Sync {
    /// Called after each processed frame (or batch of frames).
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Receives one human-readable line per processed frame.
///
/// Any `Fn(&str) + Send + Sync` closure is a `LogSink`.
pub trait LogSink: Send + Sync {
    /// Append a line.
    fn log_line(&self, line: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log_line(&self, line: &str) {
        self(line)
    }
}

/// Discards all log lines. The default.
pub(crate) struct NoOpLog;

impl LogSink for NoOpLog {
    fn log_line(&self, _line: &str) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from any thread to stop the
/// associated pipeline at its next frame boundary. Frames already written stay
/// on disk.
///
/// # Example
///
/// ```
/// use reframe::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    ///
    /// All clones of this token will observe the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks progress timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one completed frame and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self, frame_index: u64) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(Some(frame_index));
            self.items_since_last_report = 0;
        }
    }

    /// Emit a trailing report if the last batch was not reported.
    pub(crate) fn finish(&mut self) {
        if self.items_since_last_report > 0 {
            self.report(None);
            self.items_since_last_report = 0;
        }
    }

    pub(crate) fn current(&self) -> u64 {
        self.current
    }

    fn report(&self, frame_index: Option<u64>) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| ((self.current as f32 / t as f32) * 100.0).min(100.0));

        let estimated_remaining = if self.current > 0 {
            self.total.map(|t| {
                let remaining = t.saturating_sub(self.current);
                elapsed.mul_f64(remaining as f64 / self.current as f64)
            })
        } else {
            None
        };

        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_frame: frame_index,
        };

        self.callback.on_progress(&info);
    }
}
