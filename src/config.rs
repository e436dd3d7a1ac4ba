//! Pipeline configuration.
//!
//! [`ExtractOptions`] and [`AssembleOptions`] are builders that thread the
//! progress and log sinks, cancellation, and tuning settings through the two
//! pipelines without widening every function signature.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use reframe::{AssembleOptions, CancellationToken, DimensionPolicy, FrameOrder, VideoCodec};
//!
//! let token = CancellationToken::new();
//! let options = AssembleOptions::new()
//!     .with_codec(VideoCodec::from_fourcc("avc1").unwrap())
//!     .with_frame_order(FrameOrder::Numeric)
//!     .with_dimension_policy(DimensionPolicy::Reject)
//!     .with_cancellation(token.clone())
//!     .with_log(Arc::new(|line: &str| eprintln!("{line}")));
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::encode::VideoCodec;
use crate::naming::FrameOrder;
use crate::progress::{CancellationToken, LogSink, NoOpLog, NoOpProgress, ProgressCallback};

/// JPEG quality used for extracted frames unless overridden.
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

/// What assembly does with an image whose dimensions differ from the first
/// image's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DimensionPolicy {
    /// Hand the image to the video sink unchanged. The FFmpeg sink rescales
    /// it to the locked dimensions.
    #[default]
    PassThrough,
    /// Stop with [`ReframeError::DimensionMismatch`](crate::ReframeError::DimensionMismatch).
    Reject,
}

/// Sinks and cancellation shared by both pipelines.
#[derive(Clone)]
pub(crate) struct Hooks {
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) log: Arc<dyn LogSink>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: u64,
}

impl Hooks {
    fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            log: Arc::new(NoOpLog),
            cancellation: None,
            batch_size: 1,
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}

/// Configuration for [`extract_frames`](crate::extract_frames).
///
/// A default-constructed value reports nothing, never cancels, and writes
/// JPEGs at quality 100.
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) hooks: Hooks,
    pub(crate) jpeg_quality: u8,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("has_cancellation", &self.hooks.cancellation.is_some())
            .field("batch_size", &self.hooks.batch_size)
            .field("jpeg_quality", &self.jpeg_quality)
            .finish_non_exhaustive()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            hooks: Hooks::new(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.hooks.progress = callback;
        self
    }

    /// Attach a per-frame log sink.
    #[must_use]
    pub fn with_log(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.hooks.log = sink;
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.hooks.cancellation = Some(token);
        self
    }

    /// Fire the progress callback every `size` frames. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.hooks.batch_size = size.max(1);
        self
    }

    /// Set the JPEG quality (1–100).
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// The configured JPEG quality.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}

/// Configuration for [`assemble_video`](crate::assemble_video).
///
/// Defaults: `mp4v` codec, lexicographic order, mismatched frames passed
/// through.
#[derive(Clone)]
pub struct AssembleOptions {
    pub(crate) hooks: Hooks,
    pub(crate) codec: VideoCodec,
    pub(crate) frame_order: FrameOrder,
    pub(crate) dimension_policy: DimensionPolicy,
}

impl Debug for AssembleOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AssembleOptions")
            .field("has_cancellation", &self.hooks.cancellation.is_some())
            .field("batch_size", &self.hooks.batch_size)
            .field("codec", &self.codec)
            .field("frame_order", &self.frame_order)
            .field("dimension_policy", &self.dimension_policy)
            .finish_non_exhaustive()
    }
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AssembleOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            hooks: Hooks::new(),
            codec: VideoCodec::default(),
            frame_order: FrameOrder::default(),
            dimension_policy: DimensionPolicy::default(),
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.hooks.progress = callback;
        self
    }

    /// Attach a per-frame log sink.
    #[must_use]
    pub fn with_log(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.hooks.log = sink;
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.hooks.cancellation = Some(token);
        self
    }

    /// Fire the progress callback every `size` frames. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.hooks.batch_size = size.max(1);
        self
    }

    /// Choose the output codec.
    #[must_use]
    pub fn with_codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Choose how frame files are ordered.
    #[must_use]
    pub fn with_frame_order(mut self, order: FrameOrder) -> Self {
        self.frame_order = order;
        self
    }

    /// Choose how frames with unexpected dimensions are handled.
    #[must_use]
    pub fn with_dimension_policy(mut self, policy: DimensionPolicy) -> Self {
        self.dimension_policy = policy;
        self
    }

    /// The configured codec.
    pub fn codec(&self) -> VideoCodec {
        self.codec
    }
}
