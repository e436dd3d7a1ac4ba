//! FFmpeg-backed sequential video decoding.
//!
//! [`FfmpegVideoSource`] reads packets from the best video stream, decodes
//! them, and converts each frame to RGB8. Frames come out in decode order,
//! one per [`next_frame`](VideoSource::next_frame) call, without seeking.

use std::{path::Path, time::Duration};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    util::error::EAGAIN,
};
use image::DynamicImage;

use crate::{
    conversion::rgb_frame_to_image, error::ReframeError, media::VideoSource, metadata::VideoInfo,
};

/// A video file opened for sequential decoding.
///
/// Dropping the source closes the file.
pub struct FfmpegVideoSource {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    info: VideoInfo,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    eof_sent: bool,
    done: bool,
    read_retries: u32,
}

impl FfmpegVideoSource {
    /// Open `path` and prepare a decoder for its best video stream.
    ///
    /// # Errors
    ///
    /// - [`ReframeError::FileOpen`] if FFmpeg cannot open the file.
    /// - [`ReframeError::NoVideoStream`] if there is no video stream.
    pub fn open(path: &Path) -> Result<Self, ReframeError> {
        log::debug!("Opening video source: {}", path.display());

        ffmpeg_next::init().map_err(|error| ReframeError::FileOpen {
            path: path.to_path_buf(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| ReframeError::FileOpen {
                path: path.to_path_buf(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(ReframeError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let decoder = decoder_context.decoder().video()?;

        // Prefer the average rate; fall back to the stream's base rate.
        let average = stream.avg_frame_rate();
        let frames_per_second = if average.numerator() > 0 && average.denominator() > 0 {
            f64::from(average.numerator()) / f64::from(average.denominator())
        } else {
            let rate = stream.rate();
            if rate.numerator() > 0 && rate.denominator() > 0 {
                f64::from(rate.numerator()) / f64::from(rate.denominator())
            } else {
                0.0
            }
        };

        let (frame_count, frame_count_estimated) = if stream.frames() > 0 {
            (stream.frames() as u64, false)
        } else if frames_per_second > 0.0 && input_context.duration() > 0 {
            let duration = Duration::from_micros(input_context.duration() as u64);
            ((duration.as_secs_f64() * frames_per_second).round() as u64, true)
        } else {
            (0, false)
        };

        if frames_per_second <= 0.0 {
            log::warn!("{} does not report a frame rate", path.display());
        }

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let info = VideoInfo {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            frame_count_estimated,
            codec,
        };

        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ScalingFlags::BILINEAR,
        )?;

        log::info!(
            "Opened {} ({}x{}, {:.3} fps, {} frames, {})",
            path.display(),
            info.width,
            info.height,
            info.frames_per_second,
            info.frame_count,
            info.codec,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            info,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            eof_sent: false,
            done: false,
            read_retries: 0,
        })
    }

    fn convert_current_frame(&mut self) -> Result<DynamicImage, ReframeError> {
        self.scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;
        rgb_frame_to_image(&self.rgb_frame, self.info.width, self.info.height)
    }
}

impl VideoSource for FfmpegVideoSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>, ReframeError> {
        if self.done {
            return Ok(None);
        }

        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                return self.convert_current_frame().map(Some);
            }

            // Decoder has no buffered frames. Feed it more packets.
            if self.eof_sent {
                self.done = true;
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        self.decoder.send_packet(&packet).map_err(|error| {
                            ReframeError::VideoDecodeError(format!("send_packet failed: {error}"))
                        })?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => match classify_read_error(&error) {
                    ReadFailure::Retry if self.read_retries < MAX_READ_RETRIES => {
                        self.read_retries += 1;
                        log::debug!("Packet not ready, retrying: {error}");
                        continue;
                    }
                    ReadFailure::Retry | ReadFailure::Fatal => {
                        self.done = true;
                        return Err(ReframeError::VideoDecodeError(format!(
                            "reading packet failed: {error}"
                        )));
                    }
                },
            }
            self.read_retries = 0;
        }
    }
}

/// Consecutive `EAGAIN` reads tolerated before giving up.
const MAX_READ_RETRIES: u32 = 64;

/// How a failed packet read is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadFailure {
    /// The demuxer has nothing yet; read again.
    Retry,
    /// Anything else ends decoding with an error.
    Fatal,
}

/// End of stream is handled before this is consulted.
fn classify_read_error(error: &FfmpegError) -> ReadFailure {
    match error {
        FfmpegError::Other { errno } if *errno == EAGAIN => ReadFailure::Retry,
        _ => ReadFailure::Fatal,
    }
}
