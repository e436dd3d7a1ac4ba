//! # reframe
//!
//! Split a video into a numbered JPEG sequence, and stitch a JPEG sequence
//! back into a video.
//!
//! Extraction samples the source at a requested whole-number rate: with a
//! 30 fps source and a requested rate of 10, every third frame is kept and
//! written as `frame_000000.jpg`, `frame_000001.jpg`, …, followed by a
//! `FRAME_RATE.txt` record of the rate. Assembly reads such a folder back in
//! file-name order and encodes it at a chosen rate, with the output
//! dimensions taken from the first image.
//!
//! Decoding and encoding go through the [`MediaBackend`] trait.
//! [`FfmpegBackend`] is the production implementation, powered by
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next); tests can plug in
//! in-memory backends.
//!
//! ## Quick Start
//!
//! ### Extract Frames
//!
//! ```no_run
//! use reframe::{ExtractOptions, FfmpegBackend, FrameRate};
//!
//! let report = reframe::extract_frames(
//!     &FfmpegBackend::new(),
//!     "input.mp4",
//!     "frames",
//!     FrameRate::new(10).unwrap(),
//!     &ExtractOptions::default(),
//! )
//! .unwrap();
//! println!("kept every {}th frame, wrote {}", report.frame_interval, report.frames_written);
//! ```
//!
//! ### Assemble a Video
//!
//! ```no_run
//! use reframe::{AssembleOptions, FfmpegBackend, FrameRate};
//!
//! reframe::assemble_video(
//!     &FfmpegBackend::new(),
//!     "frames",
//!     FrameRate::new(10).unwrap(),
//!     "output.mp4",
//!     &AssembleOptions::default(),
//! )
//! .unwrap();
//! ```
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed to build the crate.

mod assemble;
pub mod config;
mod conversion;
mod decode;
mod encode;
pub mod error;
mod extract;
pub mod ffmpeg;
mod image_io;
pub mod media;
pub mod metadata;
pub mod naming;
pub mod progress;
pub mod rate;
mod sampler;

pub use assemble::{AssemblyReport, assemble_video};
pub use config::{AssembleOptions, DEFAULT_JPEG_QUALITY, DimensionPolicy, ExtractOptions};
pub use decode::FfmpegVideoSource;
pub use encode::{FfmpegVideoSink, VideoCodec};
pub use error::ReframeError;
pub use extract::{ExtractionReport, extract_frames};
pub use ffmpeg::{FfmpegBackend, FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use image_io::{read_image, write_jpeg};
pub use media::{MediaBackend, SinkSettings, VideoSink, VideoSource};
pub use metadata::{VideoInfo, probe};
pub use naming::{
    FrameOrder, IMAGE_EXTENSION, RATE_RECORD_FILE_NAME, frame_file_name, list_frames,
    parse_ordinal, read_rate_record, write_rate_record,
};
pub use progress::{CancellationToken, LogSink, OperationType, ProgressCallback, ProgressInfo};
pub use rate::{FrameRate, expected_output_count, frame_interval};
pub use sampler::FrameSampler;
