//! FFmpeg video writer integration tests.
//!
//! These encode real files and skip when the codec is not built into the
//! local FFmpeg.

mod common;

use std::path::Path;

use camroll::{
    CamrollError, DecodedFrame, ExportOptions, FfmpegEncoder, FfmpegLogLevel, PixelLayout,
    VideoCodec, convert_to_video, export_video,
};
use common::{gray_record, write_container};

fn gray(timestamp: u64, width: u16, height: u16) -> DecodedFrame {
    let pixels = common::pattern(timestamp, usize::from(width) * usize::from(height));
    DecodedFrame::from_pixels(timestamp, height, width, PixelLayout::Grayscale, &pixels)
        .expect("frame")
}

fn encoder_unavailable<T>(result: &Result<T, CamrollError>) -> bool {
    if let Err(e) = result {
        let msg = format!("{e}");
        if msg.contains("cannot open encoder") || msg.contains("not available") {
            eprintln!("Skipping: encoder not available ({msg})");
            return true;
        }
    }
    false
}

#[test]
fn write_grayscale_frames_to_mp4() {
    camroll::set_ffmpeg_log_level(FfmpegLogLevel::Error);
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("clip.mp4");
    let frames: Vec<DecodedFrame> = (0..10).map(|ts| gray(ts, 64, 48)).collect();

    let result = export_video(&frames, &output, 10, &ExportOptions::new());
    if encoder_unavailable(&result) {
        return;
    }
    let report = result.expect("write video");

    assert_eq!(report.frames_written, 10);
    assert_eq!((report.width, report.height), (64, 48));
    assert!(Path::new(&output).exists());
    let file_size = std::fs::metadata(&output).unwrap().len();
    assert!(file_size > 0, "output file should be non-empty");
}

#[test]
fn odd_dimensions_are_encoded() {
    camroll::set_ffmpeg_log_level(FfmpegLogLevel::Error);
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("odd.mp4");
    let frames: Vec<DecodedFrame> = (0..3).map(|ts| gray(ts, 33, 17)).collect();

    let result = export_video(&frames, &output, 5, &ExportOptions::new());
    if encoder_unavailable(&result) {
        return;
    }
    result.expect("write odd-sized video");
    assert!(output.exists());
}

#[test]
fn rgb_frames_encode_with_h264() {
    camroll::set_ffmpeg_log_level(FfmpegLogLevel::Error);
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("rgb.mp4");
    let frames: Vec<DecodedFrame> = (0..4)
        .map(|ts| {
            let pixels = common::pattern(ts, 32 * 32 * 3);
            DecodedFrame::from_pixels(ts, 32, 32, PixelLayout::Multi(3), &pixels).expect("frame")
        })
        .collect();

    let options = ExportOptions::new().with_codec(VideoCodec::H264);
    let result = export_video(&frames, &output, 8, &options);
    if encoder_unavailable(&result) {
        return;
    }
    result.expect("write h264 video");
    assert!(output.exists());
}

#[test]
fn empty_input_creates_no_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("empty.mp4");

    let result = export_video(&[], &output, 30, &ExportOptions::new());
    assert!(matches!(result, Err(CamrollError::NoValidFrames)));
    assert!(!output.exists());
}

#[test]
fn frame_rate_beyond_time_base_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("fast.mp4");

    let result = FfmpegEncoder::open(&output, 16, 16, u32::MAX, VideoCodec::Mpeg4);
    assert!(matches!(result, Err(CamrollError::VideoEncodeError(_))));
    assert!(!output.exists());

    let frames = vec![gray(1, 16, 16)];
    let result = export_video(&frames, &output, u32::MAX, &ExportOptions::new());
    assert!(matches!(result, Err(CamrollError::VideoEncodeError(_))));
    assert!(!output.exists());
}

#[test]
fn convert_to_video_writes_under_video_folder() {
    camroll::set_ffmpeg_log_level(FfmpegLogLevel::Error);
    let dir = tempfile::tempdir().expect("tempdir");
    let a = write_container(
        dir.path(),
        "LHPG-1730122064.bin",
        &(0..5).map(|ts| gray_record(ts, 16, 16)).collect::<Vec<_>>(),
    );
    let b = write_container(
        dir.path(),
        "LHPG-1730122124.bin",
        &(5..10).map(|ts| gray_record(ts, 16, 16)).collect::<Vec<_>>(),
    );

    let result = convert_to_video(&[a, b], dir.path(), &ExportOptions::new());
    if encoder_unavailable(&result) {
        return;
    }
    let report = result.expect("convert");

    assert_eq!(report.video.frames_written, 10);
    assert!(report.video.path.starts_with(dir.path().join("video")));
    assert_eq!(report.video.path.extension().and_then(|e| e.to_str()), Some("mp4"));
    assert!(report.video.path.exists());
}
