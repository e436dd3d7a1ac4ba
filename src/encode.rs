//! FFmpeg-backed sequential video encoding.
//!
//! [`FfmpegVideoSink`] opens an output container (format chosen from the file
//! extension), adds one video stream with fixed dimensions and rate, and
//! encodes [`DynamicImage`] frames one at a time. The container is only
//! complete after [`finish`](VideoSink::finish).

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

use ffmpeg_next::codec::Id;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::codec::encoder::video::Encoder as OpenedVideoEncoder;
use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg_next::{Packet, Rational};
use image::DynamicImage;
use image::imageops::FilterType;

use crate::conversion::rgb_image_to_frame;
use crate::error::ReframeError;
use crate::media::{SinkSettings, VideoSink};

/// Supported output video codecs.
///
/// Codecs are usually named by their four-character code; see
/// [`from_fourcc`](VideoCodec::from_fourcc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoCodec {
    /// MPEG-4 Part 2 (`mp4v`). The default; built into every FFmpeg.
    #[default]
    Mpeg4,
    /// H.264 / AVC (`avc1`).
    H264,
    /// H.265 / HEVC (`hvc1`).
    H265,
    /// Motion JPEG (`MJPG`).
    Mjpeg,
}

impl VideoCodec {
    /// Look up a codec by four-character code (case-insensitive).
    ///
    /// ```
    /// use reframe::VideoCodec;
    ///
    /// assert_eq!(VideoCodec::from_fourcc("mp4v"), Some(VideoCodec::Mpeg4));
    /// assert_eq!(VideoCodec::from_fourcc("H264"), Some(VideoCodec::H264));
    /// assert_eq!(VideoCodec::from_fourcc("vp80"), None);
    /// ```
    pub fn from_fourcc(fourcc: &str) -> Option<Self> {
        match fourcc.to_ascii_lowercase().as_str() {
            "mp4v" | "fmp4" | "xvid" | "divx" => Some(VideoCodec::Mpeg4),
            "avc1" | "h264" | "x264" => Some(VideoCodec::H264),
            "hvc1" | "hev1" | "hevc" | "h265" => Some(VideoCodec::H265),
            "mjpg" => Some(VideoCodec::Mjpeg),
            _ => None,
        }
    }

    /// The canonical four-character code.
    pub fn fourcc(self) -> &'static str {
        match self {
            VideoCodec::Mpeg4 => "mp4v",
            VideoCodec::H264 => "avc1",
            VideoCodec::H265 => "hvc1",
            VideoCodec::Mjpeg => "MJPG",
        }
    }

    fn to_codec_id(self) -> Id {
        match self {
            VideoCodec::Mpeg4 => Id::MPEG4,
            VideoCodec::H264 => Id::H264,
            VideoCodec::H265 => Id::HEVC,
            VideoCodec::Mjpeg => Id::MJPEG,
        }
    }

    fn input_pixel_format(self) -> Pixel {
        match self {
            // The MJPEG encoder only takes full-range YUV.
            VideoCodec::Mjpeg => Pixel::YUVJ420P,
            _ => Pixel::YUV420P,
        }
    }
}

impl Display for VideoCodec {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.fourcc())
    }
}

/// A video file being written frame by frame.
///
/// Created via [`FfmpegBackend::create_sink`](crate::FfmpegBackend). Frames
/// whose dimensions differ from the sink's are rescaled to fit.
pub struct FfmpegVideoSink {
    output: Output,
    encoder: OpenedVideoEncoder,
    scaler: ScalingContext,
    stream_index: usize,
    encoder_time_base: Rational,
    stream_time_base: Rational,
    width: u32,
    height: u32,
    frame_index: i64,
}

impl FfmpegVideoSink {
    /// Create `path` and write the container header.
    ///
    /// # Errors
    ///
    /// - [`ReframeError::VideoEncodeError`] if the codec is unavailable or
    ///   cannot be opened with these settings. Frames are encoded as 4:2:0, so
    ///   an odd width or height is rejected here by encoders that need even
    ///   dimensions (libx264 for `avc1`, for example).
    /// - [`ReframeError::VideoWriteError`] if the file or header cannot be
    ///   written.
    pub fn create(path: &Path, settings: SinkSettings) -> Result<Self, ReframeError> {
        let SinkSettings {
            width,
            height,
            frame_rate,
            codec,
        } = settings;
        let fps = i32::try_from(frame_rate.get()).map_err(|_| {
            ReframeError::VideoEncodeError(format!("frame rate {frame_rate} is too large"))
        })?;

        log::info!(
            "Creating {} ({}x{}, codec={}, fps={})",
            path.display(),
            width,
            height,
            codec,
            fps,
        );

        ffmpeg_next::init()
            .map_err(|e| ReframeError::VideoWriteError(format!("FFmpeg initialisation failed: {e}")))?;

        let codec_id = codec.to_codec_id();
        let target_pixel = codec.input_pixel_format();
        let encoder_time_base = Rational::new(1, fps);

        let mut output = ffmpeg_next::format::output(&path)
            .map_err(|e| ReframeError::VideoWriteError(format!("cannot open output: {e}")))?;

        // Read before add_stream borrows `output` mutably.
        let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

        let encoder_codec = ffmpeg_next::encoder::find(codec_id).ok_or_else(|| {
            ReframeError::VideoEncodeError(format!("codec {codec_id:?} not available"))
        })?;

        let mut stream = output
            .add_stream(encoder_codec)
            .map_err(|e| ReframeError::VideoWriteError(format!("cannot add stream: {e}")))?;
        let stream_index = stream.index();

        let mut encoder = CodecContext::from_parameters(stream.parameters())
            .map_err(|e| ReframeError::VideoEncodeError(format!("cannot create codec context: {e}")))?
            .encoder()
            .video()
            .map_err(|e| ReframeError::VideoEncodeError(format!("cannot open video encoder: {e}")))?;

        encoder.set_width(width);
        encoder.set_height(height);
        encoder.set_format(target_pixel);
        encoder.set_time_base(encoder_time_base);
        encoder.set_frame_rate(Some(Rational::new(fps, 1)));

        if needs_global_header {
            // SAFETY: the context is exclusively owned here and not yet opened.
            unsafe {
                (*encoder.as_mut_ptr()).flags |=
                    ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
            }
        }

        let encoder = encoder
            .open_as(encoder_codec)
            .map_err(|e| ReframeError::VideoEncodeError(format!("cannot open encoder: {e}")))?;

        stream.set_parameters(&encoder);
        stream.set_time_base(encoder_time_base);

        output
            .write_header()
            .map_err(|e| ReframeError::VideoWriteError(format!("cannot write header: {e}")))?;

        // The muxer may pick its own time base while writing the header.
        let stream_time_base = output
            .stream(stream_index)
            .map(|stream| stream.time_base())
            .ok_or_else(|| ReframeError::VideoWriteError("output stream vanished".to_string()))?;

        let scaler = ScalingContext::get(
            Pixel::RGB24,
            width,
            height,
            target_pixel,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|e| ReframeError::VideoWriteError(format!("cannot create scaler: {e}")))?;

        Ok(Self {
            output,
            encoder,
            scaler,
            stream_index,
            encoder_time_base,
            stream_time_base,
            width,
            height,
            frame_index: 0,
        })
    }

    fn drain_packets(&mut self) -> Result<(), ReframeError> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.encoder_time_base, self.stream_time_base);
            packet
                .write_interleaved(&mut self.output)
                .map_err(|e| ReframeError::VideoWriteError(format!("write packet failed: {e}")))?;
        }
        Ok(())
    }
}

impl VideoSink for FfmpegVideoSink {
    fn write_frame(&mut self, frame: &DynamicImage) -> Result<(), ReframeError> {
        let rgb = if frame.width() != self.width || frame.height() != self.height {
            log::warn!(
                "Rescaling {}x{} frame to {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height,
            );
            frame
                .resize_exact(self.width, self.height, FilterType::Lanczos3)
                .to_rgb8()
        } else {
            frame.to_rgb8()
        };

        let source_frame = rgb_image_to_frame(&rgb);
        let mut encoded_frame = VideoFrame::empty();
        self.scaler
            .run(&source_frame, &mut encoded_frame)
            .map_err(|e| ReframeError::VideoWriteError(format!("scaling failed: {e}")))?;

        encoded_frame.set_pts(Some(self.frame_index));
        self.frame_index += 1;

        self.encoder
            .send_frame(&encoded_frame)
            .map_err(|e| ReframeError::VideoEncodeError(format!("send_frame failed: {e}")))?;

        self.drain_packets()
    }

    fn finish(mut self) -> Result<(), ReframeError> {
        self.encoder
            .send_eof()
            .map_err(|e| ReframeError::VideoEncodeError(format!("send_eof failed: {e}")))?;
        self.drain_packets()?;

        self.output
            .write_trailer()
            .map_err(|e| ReframeError::VideoWriteError(format!("cannot write trailer: {e}")))?;

        log::info!("Closed video after {} frame(s)", self.frame_index);
        Ok(())
    }
}
