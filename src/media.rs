//! Media I/O seams.
//!
//! The pipelines never talk to a codec library directly. A [`MediaBackend`]
//! opens a [`VideoSource`] for reading and creates a [`VideoSink`] for
//! writing; [`FfmpegBackend`](crate::FfmpegBackend) is the production
//! implementation and tests substitute in-memory fakes.

use std::path::Path;

use image::DynamicImage;

use crate::{encode::VideoCodec, error::ReframeError, metadata::VideoInfo, rate::FrameRate};

/// A readable video: metadata plus frames in decode order.
pub trait VideoSource {
    /// Stream metadata, available before any frame is read.
    fn info(&self) -> &VideoInfo;

    /// Decode the next frame. Returns `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> Result<Option<DynamicImage>, ReframeError>;
}

/// A writable video whose dimensions and rate are fixed at creation.
pub trait VideoSink {
    /// Append one frame.
    fn write_frame(&mut self, frame: &DynamicImage) -> Result<(), ReframeError>;

    /// Flush buffered frames and close the container.
    ///
    /// The output is complete only once this returns `Ok`.
    fn finish(self) -> Result<(), ReframeError>;
}

/// Settings a [`VideoSink`] is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkSettings {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub frame_rate: FrameRate,
    /// Output codec.
    pub codec: VideoCodec,
}

/// Opens sources and creates sinks.
pub trait MediaBackend {
    /// Source type produced by [`open_source`](MediaBackend::open_source).
    type Source: VideoSource;
    /// Sink type produced by [`create_sink`](MediaBackend::create_sink).
    type Sink: VideoSink;

    /// Open a video file for sequential decoding.
    fn open_source(&self, path: &Path) -> Result<Self::Source, ReframeError>;

    /// Create (or truncate) a video file for sequential encoding.
    fn create_sink(&self, path: &Path, settings: SinkSettings) -> Result<Self::Sink, ReframeError>;
}
