//! Still-image output.
//!
//! Every decoded frame becomes `<timestamp>.<ext>` in one output directory.
//! A file that already exists is left untouched and reported as skipped, so
//! running an export twice over the same input does no duplicate work.
//! Writes run concurrently on a pool bounded by
//! [`ExportOptions::worker_count`]; targets are unique per timestamp and each
//! file is claimed with `create_new`, so two writers never share a path.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Error as IoError, ErrorKind, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use rayon::ThreadPoolBuilder;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::configuration::ExportOptions;
use crate::error::CamrollError;
use crate::frame::DecodedFrame;
use crate::progress::{OperationType, ProgressTracker};

/// What an image export did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageExportReport {
    /// Files created by this run.
    pub written: Vec<PathBuf>,
    /// Files that already existed and were left alone.
    pub skipped: Vec<PathBuf>,
}

enum WriteOutcome {
    Written(PathBuf),
    Skipped(PathBuf),
}

/// Writes decoded frames as timestamp-named still images.
pub struct ImageSink {
    output_dir: PathBuf,
    options: ExportOptions,
}

impl ImageSink {
    /// Create a sink targeting `output_dir`. The directory is created on
    /// the first [`write_all`](ImageSink::write_all).
    pub fn new<P: AsRef<Path>>(output_dir: P, options: &ExportOptions) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            options: options.clone(),
        }
    }

    /// The directory images are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target path for a frame.
    pub fn path_for(&self, frame: &DecodedFrame) -> PathBuf {
        self.output_dir.join(format!(
            "{}.{}",
            frame.timestamp,
            self.options.image_extension()
        ))
    }

    /// Write every frame, skipping existing files.
    ///
    /// # Errors
    ///
    /// Returns [`CamrollError::ThreadPool`] if the write pool cannot be
    /// spawned, otherwise the first I/O or image-encoding failure. Files written before
    /// the failure stay on disk.
    pub fn write_all(&self, frames: &[DecodedFrame]) -> Result<ImageExportReport, CamrollError> {
        fs::create_dir_all(&self.output_dir)?;
        log::debug!(
            "Writing {} frames as {:?} into {}",
            frames.len(),
            self.options.image_format(),
            self.output_dir.display(),
        );

        let tracker = ProgressTracker::new(
            self.options.progress.clone(),
            OperationType::ImageExport,
            self.output_dir.display().to_string(),
            frames.len() as u64,
            self.options.batch_size,
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.worker_count())
            .thread_name(|index| format!("camroll-write-{index}"))
            .build()
            .map_err(|error| CamrollError::ThreadPool(error.to_string()))?;

        let outcomes: Result<Vec<WriteOutcome>, CamrollError> = pool.install(|| {
            frames
                .par_iter()
                .map(|frame| {
                    let outcome = self.write_frame(frame);
                    tracker.advance();
                    outcome
                })
                .collect()
        });
        tracker.finish();

        let mut report = ImageExportReport::default();
        for outcome in outcomes? {
            match outcome {
                WriteOutcome::Written(path) => report.written.push(path),
                WriteOutcome::Skipped(path) => report.skipped.push(path),
            }
        }
        report.written.sort();
        report.skipped.sort();

        log::info!(
            "Image export into {}: {} written, {} skipped",
            self.output_dir.display(),
            report.written.len(),
            report.skipped.len(),
        );
        Ok(report)
    }

    fn write_frame(&self, frame: &DecodedFrame) -> Result<WriteOutcome, CamrollError> {
        let path = self.path_for(frame);

        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                log::info!("{} already exists, skipping", path.display());
                return Ok(WriteOutcome::Skipped(path));
            }
            Err(error) => return Err(error.into()),
        };

        if let Err(error) = encode_into(file, frame, self.options.image_format()) {
            // Do not leave a half-written file that a re-run would skip.
            let _ = fs::remove_file(&path);
            return Err(error);
        }
        Ok(WriteOutcome::Written(path))
    }
}

fn encode_into(file: File, frame: &DecodedFrame, format: ImageFormat) -> Result<(), CamrollError> {
    let image = frame.to_image().ok_or_else(|| {
        IoError::new(
            ErrorKind::InvalidData,
            format!("frame {} has no image representation", frame.timestamp),
        )
    })?;

    // JPEG has no alpha channel.
    let image = match (format, image) {
        (ImageFormat::Jpeg, DynamicImage::ImageRgba8(rgba)) => {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8())
        }
        (_, image) => image,
    };

    let mut writer = BufWriter::new(file);
    image.write_to(&mut writer, format)?;
    writer.flush()?;
    Ok(())
}
