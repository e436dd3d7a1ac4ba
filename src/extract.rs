//! Video → JPEG frame sequence.
//!
//! [`extract_frames`] decodes a video front to back, keeps the first frame of
//! every run of `frame_interval` source frames, and writes each kept frame as
//! `frame_NNNNNN.jpg`. A `FRAME_RATE.txt` record of the requested rate is
//! written last; the run only counts as successful once it exists.
//!
//! Writes are not transactional. If a run fails part-way, the frames written
//! so far stay on disk as a gap-free prefix of the sequence.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::ExtractOptions,
    error::ReframeError,
    image_io::write_jpeg,
    media::{MediaBackend, VideoSource},
    naming::{frame_path, write_rate_record},
    progress::{OperationType, ProgressTracker},
    rate::{FrameRate, expected_output_count, frame_interval},
    sampler::FrameSampler,
};

/// Summary of a completed extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ExtractionReport {
    /// Stride between kept source frames.
    pub frame_interval: u64,
    /// `floor(total_frame_count / frame_interval)`, or `None` if the source
    /// length is unknown. Approximate when the length was estimated from the
    /// duration.
    pub expected_frames: Option<u64>,
    /// Source frames decoded.
    pub frames_decoded: u64,
    /// Frame files written.
    pub frames_written: u64,
    /// Directory holding the frames.
    pub output_dir: PathBuf,
    /// Path of the rate record.
    pub rate_record: PathBuf,
}

/// Decode `input` and write a sampled JPEG sequence into `output_dir`.
///
/// `output_dir` is created if missing. Existing files with the same names are
/// overwritten; other files are left alone.
///
/// # Errors
///
/// Raised before anything is written:
/// - [`ReframeError::MissingPath`] for an empty path.
/// - [`ReframeError::DegenerateFrameInterval`] if `frame_rate` is above the
///   source rate or the source rate is unknown.
/// - Backend errors from opening the source.
///
/// Raised mid-run, leaving earlier frames in place:
/// - [`ReframeError::Cancelled`] if the cancellation token fires.
/// - [`ReframeError::Aborted`] wrapping any decode, encode, or write failure.
///
/// # Example
///
/// ```no_run
/// use reframe::{ExtractOptions, FfmpegBackend, FrameRate, ReframeError};
///
/// let report = reframe::extract_frames(
///     &FfmpegBackend::new(),
///     "input.mp4",
///     "frames",
///     "10".parse::<FrameRate>()?,
///     &ExtractOptions::default(),
/// )?;
/// println!("wrote {} frames", report.frames_written);
/// # Ok::<(), ReframeError>(())
/// ```
pub fn extract_frames<B: MediaBackend>(
    backend: &B,
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    frame_rate: FrameRate,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ReframeError> {
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();
    if input.as_os_str().is_empty() {
        return Err(ReframeError::MissingPath { role: "input video" });
    }
    if output_dir.as_os_str().is_empty() {
        return Err(ReframeError::MissingPath { role: "output directory" });
    }

    let mut source = backend.open_source(input)?;
    let info = source.info().clone();
    let interval = frame_interval(info.frames_per_second, frame_rate)?;

    // An estimated length only bounds progress; decoding runs to end of stream.
    let reported_length = (!info.frame_count_estimated).then_some(info.frame_count);
    let mut sampler = FrameSampler::new(interval, reported_length);
    let expected_frames = (info.frame_count > 0)
        .then(|| expected_output_count(info.frame_count, interval));
    log::info!(
        "Extracting {} at {} fps (source {:.3} fps, interval {}, expecting {:?} frames)",
        input.display(),
        frame_rate,
        info.frames_per_second,
        interval,
        expected_frames,
    );

    fs::create_dir_all(output_dir)?;

    let hooks = &options.hooks;
    let mut tracker = ProgressTracker::new(
        hooks.progress.clone(),
        OperationType::FrameExtraction,
        expected_frames,
        hooks.batch_size,
    );
    let mut last_written: Option<u64> = None;

    while !sampler.is_complete() {
        if hooks.is_cancelled() {
            log::info!("Extraction cancelled after {} frame(s)", tracker.current());
            return Err(ReframeError::Cancelled);
        }

        let Some(frame) = source
            .next_frame()
            .map_err(|error| error.aborted(last_written))?
        else {
            break;
        };

        let Some(ordinal) = sampler.offer() else {
            continue;
        };

        let path = frame_path(output_dir, ordinal);
        write_jpeg(&frame, &path, options.jpeg_quality)
            .map_err(|error| error.aborted(last_written))?;

        log::debug!("Wrote frame {ordinal} to {}", path.display());
        hooks.log.log_line(&format!("Extracted {}", path.display()));
        tracker.advance(ordinal);
        last_written = Some(ordinal);
    }

    let frames_decoded = sampler.source_count();
    drop(source);
    tracker.finish();

    if let Some(expected) = sampler.expected_count() {
        if sampler.saved_count() < expected {
            log::warn!(
                "Source ended early: wrote {} of {} expected frames",
                sampler.saved_count(),
                expected,
            );
        }
    }

    let rate_record =
        write_rate_record(output_dir, frame_rate).map_err(|error| error.aborted(last_written))?;

    log::info!(
        "Extracted {} frame(s) from {} decoded into {}",
        sampler.saved_count(),
        frames_decoded,
        output_dir.display(),
    );

    Ok(ExtractionReport {
        frame_interval: interval,
        expected_frames,
        frames_decoded,
        frames_written: sampler.saved_count(),
        output_dir: output_dir.to_path_buf(),
        rate_record,
    })
}
