//! FFmpeg integration: the production [`MediaBackend`] and log-level control.
//!
//! [`FfmpegBackend`] decodes with [`FfmpegVideoSource`] and encodes with
//! [`FfmpegVideoSink`]. Container and codec support depend on the FFmpeg
//! build linked at compile time.
//!
//! FFmpeg also has its own console logging, separate from the Rust
//! [`log`](https://crates.io/crates/log) facade. It prints warnings to stderr
//! by default; [`set_ffmpeg_log_level`] tunes or silences it.
//!
//! # Example
//!
//! ```no_run
//! use reframe::{FfmpegBackend, FfmpegLogLevel};
//!
//! reframe::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! let info = reframe::probe(&FfmpegBackend::new(), "input.mp4").unwrap();
//! ```

use std::{path::Path, str::FromStr};

use ffmpeg_next::util::log::Level;

use crate::{
    decode::FfmpegVideoSource,
    encode::FfmpegVideoSink,
    error::ReframeError,
    media::{MediaBackend, SinkSettings},
};

/// The production [`MediaBackend`], backed by FFmpeg.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    /// Create a backend. FFmpeg itself is initialised lazily on first use.
    pub fn new() -> Self {
        Self
    }
}

impl MediaBackend for FfmpegBackend {
    type Source = FfmpegVideoSource;
    type Sink = FfmpegVideoSink;

    fn open_source(&self, path: &Path) -> Result<Self::Source, ReframeError> {
        FfmpegVideoSource::open(path)
    }

    fn create_sink(&self, path: &Path, settings: SinkSettings) -> Result<Self::Sink, ReframeError> {
        FfmpegVideoSink::create(path, settings)
    }
}

/// FFmpeg console verbosity, from silent to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// No output.
    Quiet,
    /// Unrecoverable conditions that abort the process.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings. FFmpeg's own default.
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Tracing output.
    Trace,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }

    fn from_ffmpeg_level(level: Level) -> Self {
        match level {
            Level::Quiet => FfmpegLogLevel::Quiet,
            Level::Panic => FfmpegLogLevel::Panic,
            Level::Fatal => FfmpegLogLevel::Fatal,
            Level::Error => FfmpegLogLevel::Error,
            Level::Warning => FfmpegLogLevel::Warning,
            Level::Info => FfmpegLogLevel::Info,
            Level::Verbose => FfmpegLogLevel::Verbose,
            Level::Debug => FfmpegLogLevel::Debug,
            Level::Trace => FfmpegLogLevel::Trace,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.to_ascii_lowercase().as_str() {
            "quiet" => Ok(FfmpegLogLevel::Quiet),
            "panic" => Ok(FfmpegLogLevel::Panic),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "verbose" => Ok(FfmpegLogLevel::Verbose),
            "debug" => Ok(FfmpegLogLevel::Debug),
            "trace" => Ok(FfmpegLogLevel::Trace),
            other => Err(format!("unknown FFmpeg log level: {other}")),
        }
    }
}

/// Set FFmpeg's console verbosity. Does not affect the `log` facade.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

/// Current FFmpeg console verbosity, if it maps to a known level.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level()
        .ok()
        .map(FfmpegLogLevel::from_ffmpeg_level)
}
