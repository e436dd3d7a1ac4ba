//! In-memory media backend shared by the integration tests.
//!
//! Source frames are solid colours whose red channel encodes the source
//! index (`index * 2`), so a decoded JPEG reveals which source frame it came
//! from.

#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use reframe::{
    MediaBackend, ProgressCallback, ProgressInfo, ReframeError, SinkSettings, VideoInfo,
    VideoSink, VideoSource,
};

pub const WIDTH: u32 = 16;
pub const HEIGHT: u32 = 12;

/// Solid frame whose red channel identifies `source_index`.
pub fn coloured_frame(source_index: u64, width: u32, height: u32) -> DynamicImage {
    let red = ((source_index * 2) % 256) as u8;
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([red, 64, 32])))
}

/// Recover the red channel from the middle of a frame.
pub fn red_of(image: &DynamicImage) -> u8 {
    let (width, height) = image.dimensions();
    image.to_rgb8().get_pixel(width / 2, height / 2).0[0]
}

/// Shape of the fake source video.
#[derive(Debug, Clone)]
pub struct FakeVideo {
    pub frames_per_second: f64,
    /// Length the source reports.
    pub reported_frames: u64,
    /// Whether `reported_frames` is a duration-based estimate.
    pub estimated: bool,
    /// Frames actually produced before end of stream.
    pub actual_frames: u64,
    /// Source index whose decode fails, if any.
    pub fail_at: Option<u64>,
}

impl FakeVideo {
    pub fn new(frames_per_second: f64, frames: u64) -> Self {
        Self {
            frames_per_second,
            reported_frames: frames,
            estimated: false,
            actual_frames: frames,
            fail_at: None,
        }
    }
}

pub struct FakeSource {
    info: VideoInfo,
    video: FakeVideo,
    next_index: u64,
}

impl VideoSource for FakeSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>, ReframeError> {
        if self.next_index >= self.video.actual_frames {
            return Ok(None);
        }
        if self.video.fail_at == Some(self.next_index) {
            return Err(ReframeError::VideoDecodeError(format!(
                "corrupt packet at {}",
                self.next_index
            )));
        }
        let frame = coloured_frame(self.next_index, WIDTH, HEIGHT);
        self.next_index += 1;
        Ok(Some(frame))
    }
}

/// Everything a fake sink saw.
#[derive(Debug, Default)]
pub struct SinkRecord {
    pub settings: Option<SinkSettings>,
    pub path: Option<PathBuf>,
    pub frames: Vec<DynamicImage>,
    pub finished: bool,
}

pub struct FakeSink {
    record: Arc<Mutex<SinkRecord>>,
    fail_at: Option<usize>,
}

impl VideoSink for FakeSink {
    fn write_frame(&mut self, frame: &DynamicImage) -> Result<(), ReframeError> {
        let mut record = self.record.lock().unwrap();
        if self.fail_at == Some(record.frames.len()) {
            return Err(ReframeError::VideoEncodeError("disk full".to_string()));
        }
        record.frames.push(frame.clone());
        Ok(())
    }

    fn finish(self) -> Result<(), ReframeError> {
        self.record.lock().unwrap().finished = true;
        Ok(())
    }
}

/// A [`MediaBackend`] that never touches FFmpeg.
pub struct MemoryBackend {
    pub video: FakeVideo,
    pub sink_fail_at: Option<usize>,
    pub opened: AtomicUsize,
    pub sink: Arc<Mutex<SinkRecord>>,
}

impl MemoryBackend {
    pub fn with_video(video: FakeVideo) -> Self {
        Self {
            video,
            sink_fail_at: None,
            opened: AtomicUsize::new(0),
            sink: Arc::new(Mutex::new(SinkRecord::default())),
        }
    }

    pub fn new() -> Self {
        Self::with_video(FakeVideo::new(30.0, 90))
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn sink_created(&self) -> bool {
        self.sink.lock().unwrap().settings.is_some()
    }
}

impl MediaBackend for MemoryBackend {
    type Source = FakeSource;
    type Sink = FakeSink;

    fn open_source(&self, path: &Path) -> Result<Self::Source, ReframeError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSource {
            info: VideoInfo {
                width: WIDTH,
                height: HEIGHT,
                frames_per_second: self.video.frames_per_second,
                frame_count: self.video.reported_frames,
                frame_count_estimated: self.video.estimated,
                codec: format!("fake:{}", path.display()),
            },
            video: self.video.clone(),
            next_index: 0,
        })
    }

    fn create_sink(&self, path: &Path, settings: SinkSettings) -> Result<Self::Sink, ReframeError> {
        let mut record = self.sink.lock().unwrap();
        record.settings = Some(settings);
        record.path = Some(path.to_path_buf());
        Ok(FakeSink {
            record: self.sink.clone(),
            fail_at: self.sink_fail_at,
        })
    }
}

/// Records every progress snapshot.
#[derive(Default)]
pub struct RecordingProgress {
    pub infos: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.infos.lock().unwrap().push(info.clone());
    }
}

/// Collects log lines.
pub fn line_collector() -> (Arc<Mutex<Vec<String>>>, Arc<dyn reframe::LogSink>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink_lines = lines.clone();
    let sink: Arc<dyn reframe::LogSink> = Arc::new(move |line: &str| {
        sink_lines.lock().unwrap().push(line.to_string());
    });
    (lines, sink)
}

/// Sorted file names in `directory`.
pub fn file_names(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(directory)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

/// Flag flipped by a progress callback once `after` frames have been reported.
pub struct CancelAfter {
    pub after: u64,
    pub token: reframe::CancellationToken,
    pub fired: AtomicBool,
}

impl ProgressCallback for CancelAfter {
    fn on_progress(&self, info: &ProgressInfo) {
        if info.current >= self.after {
            self.token.cancel();
            self.fired.store(true, Ordering::SeqCst);
        }
    }
}
