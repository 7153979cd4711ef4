//! Entry points for host applications.
//!
//! These functions string the pipeline together:
//!
//! ```text
//! container -> FrameSplitter -> decode (parallel) -> order_frames -> ImageSink | VideoSink
//! ```
//!
//! # Example
//!
//! ```no_run
//! use camroll::ExportOptions;
//!
//! let files = ["run/LHPG-1730122064.bin", "run/LHPG-1730122124.bin"];
//! let options = ExportOptions::new().with_fps(30);
//!
//! let images = camroll::convert_to_images(&files, "run", &options)?;
//! println!("{} images written", images.images.written.len());
//!
//! let video = camroll::convert_to_video(&files, "run", &options)?;
//! println!("video at {}", video.video.path.display());
//! # Ok::<(), camroll::CamrollError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::batch::{BatchDecoder, DecodeReport, DroppedFrame};
use crate::configuration::ExportOptions;
use crate::container::ContainerName;
use crate::encode::FfmpegBackend;
use crate::error::CamrollError;
use crate::frame::DecodedFrame;
use crate::image_sink::{ImageExportReport, ImageSink};
use crate::order::{is_time_ordered, order_report};
use crate::progress::{OperationType, ProgressTracker};
use crate::video_sink::{VideoBackend, VideoExportReport, VideoSink};

/// Decode every frame of one container.
///
/// The returned frames are unordered; see [`order_frames`](crate::order_frames).
///
/// # Errors
///
/// Returns [`CamrollError::ContainerOpen`] if the file cannot be opened.
/// Undecodable frames are listed in [`DecodeReport::dropped`].
pub fn decode_container<P: AsRef<Path>>(
    path: P,
    options: &ExportOptions,
) -> Result<DecodeReport, CamrollError> {
    BatchDecoder::new(options)?.decode_file(path)
}

/// Decode several containers into one merged, unordered report.
///
/// # Errors
///
/// Stops at the first container that cannot be opened.
pub fn decode_containers<P: AsRef<Path>>(
    paths: &[P],
    options: &ExportOptions,
) -> Result<DecodeReport, CamrollError> {
    BatchDecoder::new(options)?.decode_files(paths)
}

/// Write frames as `<timestamp>.<ext>` into `output_dir`, skipping files
/// that already exist.
///
/// # Errors
///
/// Returns the first I/O or image-encoding failure.
pub fn export_images<P: AsRef<Path>>(
    frames: &[DecodedFrame],
    output_dir: P,
    options: &ExportOptions,
) -> Result<ImageExportReport, CamrollError> {
    ImageSink::new(output_dir, options).write_all(frames)
}

/// Encode frames into one video at a fixed `fps` with FFmpeg.
///
/// Frames are expected in timestamp order; an unordered slice is ordered
/// first (with a warning) rather than written out of order.
///
/// # Errors
///
/// - [`CamrollError::NoValidFrames`] for an empty slice; no file is created.
/// - Encoder failures.
pub fn export_video<P: AsRef<Path>>(
    ordered_frames: &[DecodedFrame],
    output_path: P,
    fps: u32,
    options: &ExportOptions,
) -> Result<VideoExportReport, CamrollError> {
    export_video_with(
        FfmpegBackend::new(options.codec()),
        ordered_frames,
        output_path,
        fps,
        options,
    )
}

/// [`export_video`] with a caller-supplied encoder backend.
///
/// # Errors
///
/// See [`export_video`].
pub fn export_video_with<B: VideoBackend, P: AsRef<Path>>(
    backend: B,
    ordered_frames: &[DecodedFrame],
    output_path: P,
    fps: u32,
    options: &ExportOptions,
) -> Result<VideoExportReport, CamrollError> {
    let output_path = output_path.as_ref();

    let mut sequence: Vec<&DecodedFrame> = ordered_frames.iter().collect();
    if !is_time_ordered(ordered_frames) {
        log::warn!("Frames for {} were not time-ordered; ordering them", output_path.display());
        sequence.sort_unstable_by_key(|frame| frame.timestamp);
    }

    let tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::VideoExport,
        output_path.display().to_string(),
        sequence.len() as u64,
        options.batch_size,
    );

    let mut sink = VideoSink::new(backend, output_path, fps);
    for frame in sequence {
        sink.push(frame)?;
        tracker.advance();
    }
    tracker.finish();
    sink.finish()
}

/// Where [`convert_to_video`] will write, derived from the first input's
/// embedded start time: `<output_root>/<video_dir>/<datetime>.<ext>`.
///
/// # Errors
///
/// [`CamrollError::NoInputFiles`] for an empty list, or
/// [`CamrollError::InvalidContainerName`] if the first name does not parse.
pub fn video_output_path<P: AsRef<Path>>(
    files: &[P],
    output_root: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<PathBuf, CamrollError> {
    let first = files.first().ok_or(CamrollError::NoInputFiles)?;
    let name = ContainerName::from_path(first)?;
    let stem = name.format_local(&options.datetime_format)?;
    Ok(output_root
        .as_ref()
        .join(&options.video_dir_name)
        .join(format!("{stem}.{}", options.video_extension())))
}

/// Result of [`convert_to_images`].
#[derive(Debug, Clone, Default)]
pub struct ImageConversionReport {
    /// Records split out of all inputs.
    pub records: usize,
    /// Records that failed to decode.
    pub dropped: Vec<DroppedFrame>,
    /// Files written or skipped.
    pub images: ImageExportReport,
}

/// Result of [`convert_to_video`].
#[derive(Debug, Clone)]
pub struct VideoConversionReport {
    /// Records split out of all inputs.
    pub records: usize,
    /// Records that failed to decode.
    pub dropped: Vec<DroppedFrame>,
    /// The finished video.
    pub video: VideoExportReport,
}

/// Decode each container and write its frames into
/// `<output_root>/<image_dir>`, one container at a time.
///
/// # Errors
///
/// [`CamrollError::NoInputFiles`] for an empty list; otherwise the first
/// open or write failure.
pub fn convert_to_images<P: AsRef<Path>>(
    files: &[P],
    output_root: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<ImageConversionReport, CamrollError> {
    if files.is_empty() {
        return Err(CamrollError::NoInputFiles);
    }

    let decoder = BatchDecoder::new(options)?;
    let sink = ImageSink::new(output_root.as_ref().join(&options.image_dir_name), options);
    let mut summary = ImageConversionReport::default();

    for path in files {
        let report = decoder.decode_file(path)?;
        let images = sink.write_all(&report.frames)?;
        summary.records += report.records;
        summary.dropped.extend(report.dropped);
        summary.images.written.extend(images.written);
        summary.images.skipped.extend(images.skipped);
    }

    Ok(summary)
}

/// Decode every container, order all frames by timestamp across files, and
/// encode them into one video under `<output_root>/<video_dir>`.
///
/// # Errors
///
/// [`CamrollError::NoInputFiles`], [`CamrollError::NoValidFrames`], or the
/// first open or encode failure.
pub fn convert_to_video<P: AsRef<Path>>(
    files: &[P],
    output_root: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<VideoConversionReport, CamrollError> {
    convert_to_video_with(FfmpegBackend::new(options.codec()), files, output_root, options)
}

/// [`convert_to_video`] with a caller-supplied encoder backend.
///
/// # Errors
///
/// See [`convert_to_video`].
pub fn convert_to_video_with<B: VideoBackend, P: AsRef<Path>>(
    backend: B,
    files: &[P],
    output_root: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<VideoConversionReport, CamrollError> {
    let output_path = video_output_path(files, output_root, options)?;

    let report = BatchDecoder::new(options)?.decode_files(files)?;
    let records = report.records;
    let dropped = report.dropped.clone();
    let frames = order_report(report);

    let video = export_video_with(backend, &frames, &output_path, options.fps(), options)?;
    Ok(VideoConversionReport {
        records,
        dropped,
        video,
    })
}
