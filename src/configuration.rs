//! Export configuration.
//!
//! [`ExportOptions`] is a builder that threads progress callbacks, worker
//! count, and output naming through the decode and export functions without
//! widening every signature.
//!
//! # Example
//!
//! ```no_run
//! use camroll::{ExportOptions, VideoCodec};
//! use image::ImageFormat;
//!
//! let options = ExportOptions::new()
//!     .with_threads(4)
//!     .with_image_format(ImageFormat::Png)
//!     .with_fps(25)
//!     .with_codec(VideoCodec::H264);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use image::ImageFormat;

use crate::encode::VideoCodec;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Options shared by decode and export operations.
///
/// A default-constructed value reproduces the camera tool's behaviour:
/// JPEG stills in `photo/`, a 30 fps MPEG-4 video in `video/`.
#[derive(Clone)]
pub struct ExportOptions {
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Fire the progress callback every N items.
    pub(crate) batch_size: u64,
    /// Worker count for decoding and image writes. `None` uses the host's available parallelism.
    pub(crate) threads: Option<usize>,
    pub(crate) image_format: ImageFormat,
    pub(crate) fps: u32,
    pub(crate) codec: VideoCodec,
    pub(crate) video_extension: String,
    /// `strftime` pattern applied to the first container's local start time.
    pub(crate) datetime_format: String,
    pub(crate) image_dir_name: String,
    pub(crate) video_dir_name: String,
}

impl Debug for ExportOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExportOptions")
            .field("batch_size", &self.batch_size)
            .field("threads", &self.threads)
            .field("image_format", &self.image_format)
            .field("fps", &self.fps)
            .field("codec", &self.codec)
            .field("video_extension", &self.video_extension)
            .field("datetime_format", &self.datetime_format)
            .field("image_dir_name", &self.image_dir_name)
            .field("video_dir_name", &self.video_dir_name)
            .finish_non_exhaustive()
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
            threads: None,
            image_format: ImageFormat::Jpeg,
            fps: 30,
            codec: VideoCodec::Mpeg4,
            video_extension: "mp4".to_string(),
            datetime_format: "%Y%m%d-%Hh%Mm".to_string(),
            image_dir_name: "photo".to_string(),
            video_dir_name: "video".to_string(),
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how often the progress callback fires. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Bound the decode and image-write pools to `threads` workers. Zero restores the default.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = (threads > 0).then_some(threads);
        self
    }

    /// Set the still-image format. The file extension follows the format.
    #[must_use]
    pub fn with_image_format(mut self, format: ImageFormat) -> Self {
        self.image_format = format;
        self
    }

    /// Set the fixed output frame rate. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    /// Set the video codec.
    #[must_use]
    pub fn with_codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Set the video container extension (selects the muxer).
    #[must_use]
    pub fn with_video_extension(mut self, extension: impl Into<String>) -> Self {
        self.video_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Set the `strftime` pattern used to name videos.
    #[must_use]
    pub fn with_datetime_format(mut self, pattern: impl Into<String>) -> Self {
        self.datetime_format = pattern.into();
        self
    }

    /// Set the subdirectory that receives still images.
    #[must_use]
    pub fn with_image_dir_name(mut self, name: impl Into<String>) -> Self {
        self.image_dir_name = name.into();
        self
    }

    /// Set the subdirectory that receives videos.
    #[must_use]
    pub fn with_video_dir_name(mut self, name: impl Into<String>) -> Self {
        self.video_dir_name = name.into();
        self
    }

    /// The configured still-image format.
    pub fn image_format(&self) -> ImageFormat {
        self.image_format
    }

    /// File extension for still images.
    pub fn image_extension(&self) -> &'static str {
        self.image_format
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("img")
    }

    /// The configured output frame rate.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// The configured video codec.
    pub fn codec(&self) -> VideoCodec {
        self.codec
    }

    /// The configured video extension.
    pub fn video_extension(&self) -> &str {
        &self.video_extension
    }

    /// The `strftime` pattern used to name videos.
    pub fn datetime_format(&self) -> &str {
        &self.datetime_format
    }

    /// Subdirectory that receives still images.
    pub fn image_dir_name(&self) -> &str {
        &self.image_dir_name
    }

    /// Subdirectory that receives videos.
    pub fn video_dir_name(&self) -> &str {
        &self.video_dir_name
    }

    /// Worker count the decode and image-write pools will use.
    pub fn worker_count(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(1)
        })
    }
}
