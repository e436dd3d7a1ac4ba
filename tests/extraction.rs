//! Extraction pipeline integration tests.
//!
//! These run against the in-memory backend in `common`, with real JPEG
//! encoding into temporary directories.

mod common;

use std::{fs, sync::Arc};

use common::{
    CancelAfter, FakeVideo, MemoryBackend, RecordingProgress, file_names, line_collector, red_of,
};
use reframe::{
    CancellationToken, ExtractOptions, FrameOrder, FrameRate, OperationType, RATE_RECORD_FILE_NAME,
    ReframeError,
};

fn rate(value: u32) -> FrameRate {
    FrameRate::new(value).expect("valid rate")
}

// ── Scenarios ──────────────────────────────────────────────────────

#[test]
fn thirty_fps_source_sampled_at_ten() {
    let backend = MemoryBackend::with_video(FakeVideo::new(30.0, 90));
    let directory = tempfile::tempdir().expect("tempdir");

    let report = reframe::extract_frames(
        &backend,
        "clip.mp4",
        directory.path(),
        rate(10),
        &ExtractOptions::default(),
    )
    .expect("extract");

    assert_eq!(report.frame_interval, 3);
    assert_eq!(report.expected_frames, Some(30));
    assert_eq!(report.frames_written, 30);

    let mut expected: Vec<String> = (0..30).map(reframe::frame_file_name).collect();
    expected.push(RATE_RECORD_FILE_NAME.to_string());
    expected.sort();
    assert_eq!(file_names(directory.path()), expected);
    assert!(directory.path().join("frame_000029.jpg").exists());
    assert!(!directory.path().join("frame_000030.jpg").exists());

    let record = fs::read_to_string(directory.path().join(RATE_RECORD_FILE_NAME)).unwrap();
    assert_eq!(record, "10");
    assert_eq!(report.rate_record, directory.path().join(RATE_RECORD_FILE_NAME));
}

#[test]
fn kept_frames_come_from_multiples_of_the_interval() {
    let backend = MemoryBackend::with_video(FakeVideo::new(30.0, 90));
    let directory = tempfile::tempdir().expect("tempdir");

    reframe::extract_frames(
        &backend,
        "clip.mp4",
        directory.path(),
        rate(10),
        &ExtractOptions::default(),
    )
    .expect("extract");

    for ordinal in [0u64, 1, 7, 29] {
        let image = reframe::read_image(&directory.path().join(reframe::frame_file_name(ordinal)))
            .expect("decode frame");
        let expected_red = (ordinal * 3 * 2) as u8;
        let red = red_of(&image);
        assert!(
            red.abs_diff(expected_red) <= 4,
            "ordinal {ordinal}: red {red}, expected {expected_red}"
        );
    }
}

#[test]
fn equal_rates_keep_every_frame() {
    let backend = MemoryBackend::with_video(FakeVideo::new(25.0, 40));
    let directory = tempfile::tempdir().expect("tempdir");

    let report = reframe::extract_frames(
        &backend,
        "clip.mp4",
        directory.path(),
        rate(25),
        &ExtractOptions::default(),
    )
    .expect("extract");

    assert_eq!(report.frame_interval, 1);
    assert_eq!(report.frames_written, 40);
    assert_eq!(report.frames_decoded, 40);
}

#[test]
fn trailing_partial_group_is_not_kept() {
    let backend = MemoryBackend::with_video(FakeVideo::new(30.0, 91));
    let directory = tempfile::tempdir().expect("tempdir");

    let report = reframe::extract_frames(
        &backend,
        "clip.mp4",
        directory.path(),
        rate(10),
        &ExtractOptions::default(),
    )
    .expect("extract");

    assert_eq!(report.frames_written, 30);
    assert!(!directory.path().join("frame_000030.jpg").exists());
}

#[test]
fn fractional_source_rate_floors_interval() {
    let backend = MemoryBackend::with_video(FakeVideo::new(29.97, 100));
    let directory = tempfile::tempdir().expect("tempdir");

    let report = reframe::extract_frames(
        &backend,
        "clip.mp4",
        directory.path(),
        rate(10),
        &ExtractOptions::default(),
    )
    .expect("extract");

    assert_eq!(report.frame_interval, 2);
    assert_eq!(report.frames_written, 50);
}

#[test]
fn unknown_length_runs_until_the_source_ends() {
    let mut video = FakeVideo::new(30.0, 10);
    video.reported_frames = 0;
    let backend = MemoryBackend::with_video(video);
    let directory = tempfile::tempdir().expect("tempdir");

    let report = reframe::extract_frames(
        &backend,
        "clip.mp4",
        directory.path(),
        rate(10),
        &ExtractOptions::default(),
    )
    .expect("extract");

    assert_eq!(report.expected_frames, None);
    assert_eq!(report.frames_written, 4);
    assert_eq!(report.frames_decoded, 10);
}

#[test]
fn short_source_writes_what_it_has() {
    let mut video = FakeVideo::new(30.0, 90);
    video.actual_frames = 20;
    let backend = MemoryBackend::with_video(video);
    let directory = tempfile::tempdir().expect("tempdir");

    let report = reframe::extract_frames(
        &backend,
        "clip.mp4",
        directory.path(),
        rate(10),
        &ExtractOptions::default(),
    )
    .expect("extract");

    assert_eq!(report.expected_frames, Some(30));
    assert_eq!(report.frames_written, 7);
    assert!(directory.path().join(RATE_RECORD_FILE_NAME).exists());
}

#[test]
fn output_directory_is_created() {
    let backend = MemoryBackend::new();
    let root = tempfile::tempdir().expect("tempdir");
    let nested = root.path().join("a").join("b");

    reframe::extract_frames(&backend, "clip.mp4", &nested, rate(10), &ExtractOptions::default())
        .expect("extract");

    assert!(nested.join("frame_000000.jpg").exists());
}

// ── Validation ─────────────────────────────────────────────────────

#[test]
fn requested_rate_above_source_is_rejected() {
    let backend = MemoryBackend::with_video(FakeVideo::new(24.0, 48));
    let root = tempfile::tempdir().expect("tempdir");
    let output = root.path().join("frames");

    let error = reframe::extract_frames(
        &backend,
        "clip.mp4",
        &output,
        rate(30),
        &ExtractOptions::default(),
    )
    .unwrap_err();

    assert!(
        matches!(error, ReframeError::DegenerateFrameInterval { requested_frame_rate: 30, .. }),
        "got {error}"
    );
    assert!(error.is_invalid_input());
    assert!(!output.exists(), "no output should be produced");
}

#[test]
fn zero_source_rate_is_rejected() {
    let backend = MemoryBackend::with_video(FakeVideo::new(0.0, 48));
    let directory = tempfile::tempdir().expect("tempdir");

    let error = reframe::extract_frames(
        &backend,
        "clip.mp4",
        directory.path(),
        rate(1),
        &ExtractOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(error, ReframeError::DegenerateFrameInterval { .. }));
    assert!(file_names(directory.path()).is_empty());
}

#[test]
fn non_numeric_rate_fails_before_any_access() {
    let backend = MemoryBackend::new();
    let root = tempfile::tempdir().expect("tempdir");
    let output = root.path().join("frames");

    let result = "ten"
        .parse::<FrameRate>()
        .and_then(|rate| {
            reframe::extract_frames(&backend, "clip.mp4", &output, rate, &ExtractOptions::default())
        });

    let error = result.unwrap_err();
    assert!(matches!(error, ReframeError::InvalidFrameRate(_)));
    assert!(error.is_invalid_input());
    assert_eq!(backend.open_count(), 0);
    assert!(!output.exists());
}

#[test]
fn empty_paths_are_rejected() {
    let backend = MemoryBackend::new();
    let directory = tempfile::tempdir().expect("tempdir");

    let error =
        reframe::extract_frames(&backend, "", directory.path(), rate(10), &ExtractOptions::default())
            .unwrap_err();
    assert!(matches!(error, ReframeError::MissingPath { role: "input video" }));

    let error = reframe::extract_frames(&backend, "clip.mp4", "", rate(10), &ExtractOptions::default())
        .unwrap_err();
    assert!(matches!(error, ReframeError::MissingPath { role: "output directory" }));

    assert_eq!(backend.open_count(), 0);
}

// ── Determinism and ordering ───────────────────────────────────────

#[test]
fn repeated_runs_produce_identical_sequences() {
    let backend = MemoryBackend::with_video(FakeVideo::new(30.0, 45));
    let first = tempfile::tempdir().expect("tempdir");
    let second = tempfile::tempdir().expect("tempdir");

    for directory in [&first, &second] {
        reframe::extract_frames(
            &backend,
            "clip.mp4",
            directory.path(),
            rate(15),
            &ExtractOptions::default(),
        )
        .expect("extract");
    }

    let names = file_names(first.path());
    assert_eq!(names, file_names(second.path()));
    for name in names {
        assert_eq!(
            fs::read(first.path().join(&name)).unwrap(),
            fs::read(second.path().join(&name)).unwrap(),
            "{name} differs"
        );
    }
}

#[test]
fn listing_reproduces_extraction_order() {
    let backend = MemoryBackend::with_video(FakeVideo::new(30.0, 90));
    let directory = tempfile::tempdir().expect("tempdir");

    reframe::extract_frames(
        &backend,
        "clip.mp4",
        directory.path(),
        rate(30),
        &ExtractOptions::default(),
    )
    .expect("extract");

    let listed = reframe::list_frames(directory.path(), FrameOrder::Lexicographic).unwrap();
    let ordinals: Vec<u64> = listed
        .iter()
        .map(|path| reframe::parse_ordinal(path.file_name().unwrap().to_str().unwrap()).unwrap())
        .collect();
    assert_eq!(ordinals, (0..90).collect::<Vec<_>>());
}

// ── Progress, logging, cancellation ────────────────────────────────

#[test]
fn progress_and_log_follow_each_kept_frame() {
    let backend = MemoryBackend::with_video(FakeVideo::new(30.0, 90));
    let directory = tempfile::tempdir().expect("tempdir");
    let recorder = Arc::new(RecordingProgress::default());
    let (lines, sink) = line_collector();

    let options = ExtractOptions::new()
        .with_progress(recorder.clone())
        .with_log(sink);
    reframe::extract_frames(&backend, "clip.mp4", directory.path(), rate(10), &options)
        .expect("extract");

    let infos = recorder.infos.lock().unwrap();
    assert_eq!(infos.len(), 30);
    for (position, info) in infos.iter().enumerate() {
        assert_eq!(info.operation, OperationType::FrameExtraction);
        assert_eq!(info.current, position as u64 + 1);
        assert_eq!(info.total, Some(30));
        assert_eq!(info.current_frame, Some(position as u64));
    }
    assert_eq!(infos.last().unwrap().percentage, Some(100.0));

    let lines = lines.lock().unwrap();
    assert_eq!(lines.len(), 30);
    assert!(lines[0].starts_with("Extracted "));
    assert!(lines[0].ends_with("frame_000000.jpg"), "{}", lines[0]);
    assert!(lines[29].ends_with("frame_000029.jpg"), "{}", lines[29]);
}

#[test]
fn cancellation_leaves_written_prefix() {
    let backend = MemoryBackend::with_video(FakeVideo::new(30.0, 90));
    let directory = tempfile::tempdir().expect("tempdir");
    let token = CancellationToken::new();
    let canceller = Arc::new(CancelAfter {
        after: 5,
        token: token.clone(),
        fired: Default::default(),
    });

    let options = ExtractOptions::new()
        .with_progress(canceller)
        .with_cancellation(token);
    let error = reframe::extract_frames(&backend, "clip.mp4", directory.path(), rate(10), &options)
        .unwrap_err();

    assert!(matches!(error, ReframeError::Cancelled));
    let expected: Vec<String> = (0..5).map(reframe::frame_file_name).collect();
    assert_eq!(file_names(directory.path()), expected);
}

#[test]
fn decode_failure_is_decorated_with_last_ordinal() {
    let mut video = FakeVideo::new(30.0, 90);
    video.fail_at = Some(10);
    let backend = MemoryBackend::with_video(video);
    let directory = tempfile::tempdir().expect("tempdir");

    let error = reframe::extract_frames(
        &backend,
        "clip.mp4",
        directory.path(),
        rate(10),
        &ExtractOptions::default(),
    )
    .unwrap_err();

    match &error {
        ReframeError::Aborted { last_index, source } => {
            assert_eq!(*last_index, Some(3));
            assert!(matches!(**source, ReframeError::VideoDecodeError(_)));
        }
        other => panic!("expected Aborted, got {other}"),
    }
    assert!(error.to_string().contains("frame 3"), "{error}");

    let expected: Vec<String> = (0..4).map(reframe::frame_file_name).collect();
    assert_eq!(file_names(directory.path()), expected, "no rate record after a failure");
}

#[test]
fn lower_quality_makes_smaller_files() {
    let backend = MemoryBackend::with_video(FakeVideo::new(30.0, 3));
    let high = tempfile::tempdir().expect("tempdir");
    let low = tempfile::tempdir().expect("tempdir");

    reframe::extract_frames(&backend, "clip.mp4", high.path(), rate(30), &ExtractOptions::new())
        .expect("extract");
    reframe::extract_frames(
        &backend,
        "clip.mp4",
        low.path(),
        rate(30),
        &ExtractOptions::new().with_jpeg_quality(10),
    )
    .expect("extract");

    let size = |dir: &std::path::Path| fs::metadata(dir.join("frame_000000.jpg")).unwrap().len();
    assert!(size(low.path()) <= size(high.path()));
}

#[test]
fn estimated_length_does_not_stop_decoding_early() {
    let mut video = FakeVideo::new(30.0, 30);
    video.reported_frames = 29;
    video.estimated = true;
    let backend = MemoryBackend::with_video(video);
    let directory = tempfile::tempdir().expect("tempdir");

    let report = reframe::extract_frames(
        &backend,
        "clip.mkv",
        directory.path(),
        rate(30),
        &ExtractOptions::default(),
    )
    .expect("extract");

    assert_eq!(report.expected_frames, Some(29));
    assert_eq!(report.frames_written, 30);
    assert!(directory.path().join("frame_000029.jpg").exists());
}

#[test]
fn estimated_length_still_bounds_progress() {
    let mut video = FakeVideo::new(30.0, 12);
    video.reported_frames = 10;
    video.estimated = true;
    let backend = MemoryBackend::with_video(video);
    let directory = tempfile::tempdir().expect("tempdir");
    let recorder = Arc::new(RecordingProgress::default());

    reframe::extract_frames(
        &backend,
        "clip.mkv",
        directory.path(),
        rate(30),
        &ExtractOptions::new().with_progress(recorder.clone()),
    )
    .expect("extract");

    let infos = recorder.infos.lock().unwrap();
    assert_eq!(infos.len(), 12);
    assert!(infos.iter().all(|info| info.total == Some(10)));
    assert!(infos.iter().all(|info| info.percentage.is_some_and(|pct| pct <= 100.0)));
}

#[test]
fn container_reported_length_caps_output() {
    let mut video = FakeVideo::new(30.0, 30);
    video.reported_frames = 29;
    let backend = MemoryBackend::with_video(video);
    let directory = tempfile::tempdir().expect("tempdir");

    let report = reframe::extract_frames(
        &backend,
        "clip.mp4",
        directory.path(),
        rate(30),
        &ExtractOptions::default(),
    )
    .expect("extract");

    assert_eq!(report.frames_written, 29);
    assert!(!directory.path().join("frame_000029.jpg").exists());
}

#[test]
fn persistent_read_failure_ends_the_run() {
    // The fake source fails at the same index on every call.
    let mut video = FakeVideo::new(30.0, 90);
    video.fail_at = Some(0);
    let backend = MemoryBackend::with_video(video);
    let directory = tempfile::tempdir().expect("tempdir");

    let error = reframe::extract_frames(
        &backend,
        "clip.mp4",
        directory.path(),
        rate(10),
        &ExtractOptions::default(),
    )
    .unwrap_err();

    match &error {
        ReframeError::Aborted { last_index, source } => {
            assert_eq!(*last_index, None);
            assert!(matches!(**source, ReframeError::VideoDecodeError(_)));
        }
        other => panic!("expected Aborted, got {other}"),
    }
    assert!(file_names(directory.path()).is_empty());
}
