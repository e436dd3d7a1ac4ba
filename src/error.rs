//! Error types for the `reframe` crate.
//!
//! This module defines [`ReframeError`], the unified error type returned by all
//! fallible operations in the crate. Validation failures are raised before any
//! bulk I/O begins; failures inside a per-frame loop are wrapped in
//! [`ReframeError::Aborted`] together with the last frame index that completed.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `reframe` operations.
///
/// Every public function that can fail returns `Result<T, ReframeError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReframeError {
    /// The requested frame rate is not a positive decimal integer.
    #[error("Invalid frame rate {0:?}: expected a positive whole number")]
    InvalidFrameRate(String),

    /// A required path argument was empty.
    #[error("Missing {role} path")]
    MissingPath {
        /// Which argument was missing (e.g. `"input video"`).
        role: &'static str,
    },

    /// The requested rate is higher than the source rate (or the source rate
    /// is unknown), so no whole-number frame interval exists.
    #[error(
        "Requested frame rate {requested_frame_rate} exceeds the source frame rate \
         {original_frame_rate}; frame interval would be zero"
    )]
    DegenerateFrameInterval {
        /// Frame rate reported by the source video.
        original_frame_rate: f64,
        /// Frame rate asked for by the caller.
        requested_frame_rate: u32,
    },

    /// The assembly input directory holds no qualifying images.
    #[error("No frame images found in {}", .0.display())]
    EmptySourceDirectory(PathBuf),

    /// A video file could not be opened for reading.
    #[error("Failed to open media file at {}: {reason}", path.display())]
    FileOpen {
        /// Path that was passed to the backend.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// The video encoder could not be created or rejected a frame.
    #[error("Video encoding error: {0}")]
    VideoEncodeError(String),

    /// The output container could not be written.
    #[error("Video write error: {0}")]
    VideoWriteError(String),

    /// A frame image does not match the dimensions locked from the first image.
    #[error(
        "Frame {} is {}x{}, expected {}x{}",
        path.display(), actual.0, actual.1, expected.0, expected.1
    )]
    DimensionMismatch {
        /// The offending image.
        path: PathBuf,
        /// Locked `(width, height)`.
        expected: (u32, u32),
        /// The image's own `(width, height)`.
        actual: (u32, u32),
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding or decoding a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// A collaborator failed part-way through a pipeline.
    ///
    /// Output written before the failure is left in place.
    #[error("Aborted after {}: {source}", describe_last_index(*last_index))]
    Aborted {
        /// Index of the last frame that was fully processed, if any.
        last_index: Option<u64>,
        /// The underlying failure.
        #[source]
        source: Box<ReframeError>,
    },
}

impl ReframeError {
    /// Returns `true` for errors raised by input validation, before any
    /// output was produced.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ReframeError::InvalidFrameRate(_)
                | ReframeError::MissingPath { .. }
                | ReframeError::DegenerateFrameInterval { .. }
                | ReframeError::EmptySourceDirectory(_)
        )
    }

    /// Wrap a mid-loop failure with the last completed index.
    ///
    /// Cancellation passes through unwrapped.
    pub(crate) fn aborted(self, last_index: Option<u64>) -> Self {
        match self {
            ReframeError::Cancelled => ReframeError::Cancelled,
            other => ReframeError::Aborted {
                last_index,
                source: Box::new(other),
            },
        }
    }
}

fn describe_last_index(last_index: Option<u64>) -> String {
    match last_index {
        Some(index) => format!("frame {index}"),
        None => "no frames".to_string(),
    }
}

impl From<FfmpegError> for ReframeError {
    fn from(error: FfmpegError) -> Self {
        ReframeError::FfmpegError(error.to_string())
    }
}
