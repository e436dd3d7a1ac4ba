//! Source video metadata.
//!
//! [`VideoInfo`] is read once when a source is opened. Extraction only needs
//! `frames_per_second` and `frame_count`; the rest is informational.

use std::path::Path;

use crate::{error::ReframeError, media::{MediaBackend, VideoSource}, rate::FrameRate};

/// Metadata for a video stream.
///
/// # Example
///
/// ```no_run
/// use reframe::FfmpegBackend;
///
/// let info = reframe::probe(&FfmpegBackend::new(), "input.mp4").unwrap();
/// println!("{}x{} @ {} fps, {} frames", info.width, info.height, info.frames_per_second, info.frame_count);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second as reported by the container. Zero when unknown.
    pub frames_per_second: f64,
    /// Total number of frames as reported by the container, or estimated
    /// from duration. Zero when unknown.
    pub frame_count: u64,
    /// `true` when `frame_count` was estimated from duration rather than
    /// read from the container.
    pub frame_count_estimated: bool,
    /// Codec name (e.g. `"h264"`, `"mpeg4"`).
    pub codec: String,
}

impl VideoInfo {
    /// The source rate truncated to a whole number, for use as a default
    /// requested rate.
    pub fn default_frame_rate(&self) -> Option<FrameRate> {
        FrameRate::from_source_rate(self.frames_per_second)
    }
}

/// Open `path` with `backend` and return its metadata without decoding.
///
/// # Errors
///
/// [`ReframeError::MissingPath`] for an empty path, or whatever the backend
/// reports when opening fails.
pub fn probe<B: MediaBackend>(backend: &B, path: impl AsRef<Path>) -> Result<VideoInfo, ReframeError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(ReframeError::MissingPath { role: "input video" });
    }
    let source = backend.open_source(path)?;
    Ok(source.info().clone())
}
