//! JPEG frame folder → video.
//!
//! [`assemble_video`] lists the `.jpg` files in a directory, orders them (by
//! file name unless configured otherwise), and encodes them into one video at
//! the requested rate. The first image fixes the output dimensions for the
//! whole run.

use std::path::{Path, PathBuf};

use image::GenericImageView;

use crate::{
    config::{AssembleOptions, DimensionPolicy},
    encode::VideoCodec,
    error::ReframeError,
    image_io::read_image,
    media::{MediaBackend, SinkSettings, VideoSink},
    naming::list_frames,
    progress::{OperationType, ProgressTracker},
    rate::FrameRate,
};

/// Summary of a completed assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct AssemblyReport {
    /// Frames encoded into the video.
    pub frames_written: u64,
    /// Output width, taken from the first image.
    pub width: u32,
    /// Output height, taken from the first image.
    pub height: u32,
    /// Output frame rate.
    pub frame_rate: FrameRate,
    /// Output codec.
    pub codec: VideoCodec,
    /// Path of the written video.
    pub output: PathBuf,
}

/// Encode every qualifying image in `input_dir` into a video at `output`.
///
/// # Errors
///
/// Raised before the output is created:
/// - [`ReframeError::MissingPath`] for an empty path.
/// - [`ReframeError::EmptySourceDirectory`] when no `.jpg` files are found.
/// - [`ReframeError::IoError`] or [`ReframeError::ImageError`] if the
///   directory or the first image cannot be read.
/// - Backend errors from creating the sink.
///
/// Raised mid-run, leaving a partial output file:
/// - [`ReframeError::Cancelled`] if the cancellation token fires.
/// - [`ReframeError::Aborted`] wrapping any decode, encode, or close failure,
///   including [`ReframeError::DimensionMismatch`] under
///   [`DimensionPolicy::Reject`].
///
/// # Example
///
/// ```no_run
/// use reframe::{AssembleOptions, FfmpegBackend, FrameRate, ReframeError};
///
/// let report = reframe::assemble_video(
///     &FfmpegBackend::new(),
///     "frames",
///     FrameRate::new(10)?,
///     "output.mp4",
///     &AssembleOptions::default(),
/// )?;
/// println!("{}x{}, {} frames", report.width, report.height, report.frames_written);
/// # Ok::<(), ReframeError>(())
/// ```
pub fn assemble_video<B: MediaBackend>(
    backend: &B,
    input_dir: impl AsRef<Path>,
    frame_rate: FrameRate,
    output: impl AsRef<Path>,
    options: &AssembleOptions,
) -> Result<AssemblyReport, ReframeError> {
    let input_dir = input_dir.as_ref();
    let output = output.as_ref();
    if input_dir.as_os_str().is_empty() {
        return Err(ReframeError::MissingPath { role: "input directory" });
    }
    if output.as_os_str().is_empty() {
        return Err(ReframeError::MissingPath { role: "output video" });
    }

    let frames = list_frames(input_dir, options.frame_order)?;
    let Some(first_path) = frames.first() else {
        return Err(ReframeError::EmptySourceDirectory(input_dir.to_path_buf()));
    };

    let first_image = read_image(first_path)?;
    let (width, height) = first_image.dimensions();

    log::info!(
        "Assembling {} frame(s) from {} into {} ({}x{}, {} fps, codec {})",
        frames.len(),
        input_dir.display(),
        output.display(),
        width,
        height,
        frame_rate,
        options.codec,
    );

    let mut sink = backend.create_sink(
        output,
        SinkSettings {
            width,
            height,
            frame_rate,
            codec: options.codec,
        },
    )?;

    let hooks = &options.hooks;
    let mut tracker = ProgressTracker::new(
        hooks.progress.clone(),
        OperationType::VideoAssembly,
        Some(frames.len() as u64),
        hooks.batch_size,
    );
    let mut pending_first = Some(first_image);
    let mut last_written: Option<u64> = None;

    for (index, path) in frames.iter().enumerate() {
        let index = index as u64;
        if hooks.is_cancelled() {
            log::info!("Assembly cancelled after {} frame(s)", tracker.current());
            return Err(ReframeError::Cancelled);
        }

        let frame = match pending_first.take() {
            Some(image) => image,
            None => read_image(path).map_err(|error| error.aborted(last_written))?,
        };

        if options.dimension_policy == DimensionPolicy::Reject {
            let actual = frame.dimensions();
            if actual != (width, height) {
                return Err(ReframeError::DimensionMismatch {
                    path: path.clone(),
                    expected: (width, height),
                    actual,
                }
                .aborted(last_written));
            }
        }

        sink.write_frame(&frame)
            .map_err(|error| error.aborted(last_written))?;

        log::debug!("Encoded frame {index} from {}", path.display());
        hooks.log.log_line(&format!("Added {} to video", path.display()));
        tracker.advance(index);
        last_written = Some(index);
    }

    tracker.finish();
    sink.finish().map_err(|error| error.aborted(last_written))?;

    log::info!("Assembled {} frame(s) into {}", frames.len(), output.display());

    Ok(AssemblyReport {
        frames_written: frames.len() as u64,
        width,
        height,
        frame_rate,
        codec: options.codec,
        output: output.to_path_buf(),
    })
}
