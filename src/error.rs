//! Error types for the `camroll` crate.
//!
//! Two levels of failure exist. [`CamrollError`] aborts one whole operation
//! (a container that cannot be opened, an export with no usable frames, an
//! encoder that refuses to start). [`FrameDropReason`] describes why a single
//! frame record was discarded; those never abort a batch and are collected
//! into the decode report instead.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `camroll` operations.
///
/// Every public method that can fail returns `Result<T, CamrollError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CamrollError {
    /// A container file could not be opened or its header could not be read.
    #[error("Failed to open container file at {path}: {reason}")]
    ContainerOpen {
        /// Path that was passed in.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// A file name does not follow the `<prefix>-<unix_timestamp>.<ext>` convention.
    #[error("Invalid container file name {name:?}: {reason}")]
    InvalidContainerName {
        /// The offending file name.
        name: String,
        /// What part of the convention was violated.
        reason: String,
    },

    /// A video naming pattern contains a specifier `strftime` does not know.
    #[error("Invalid datetime format {pattern:?}")]
    InvalidDatetimeFormat {
        /// The rejected pattern.
        pattern: String,
    },

    /// An export was requested with an empty input list.
    #[error("No input files were given")]
    NoInputFiles,

    /// Not a single frame decoded, so no encoder dimensions are known.
    #[error("No valid frames found in the input files")]
    NoValidFrames,

    /// The video encoder could not be created or configured.
    #[error("Video encoding error: {0}")]
    VideoEncodeError(String),

    /// Writing encoded video to the output container failed.
    #[error("Video write error: {0}")]
    VideoWriteError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// The decode worker pool could not be built.
    #[error("Failed to build decode thread pool: {0}")]
    ThreadPool(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding a still image.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for CamrollError {
    fn from(error: FfmpegError) -> Self {
        CamrollError::FfmpegError(error.to_string())
    }
}

/// Why a single frame record was dropped during decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FrameDropReason {
    /// The zstd payload could not be decompressed.
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// Decompression produced no bytes.
    #[error("decompressed payload is empty")]
    Empty,

    /// Fewer bytes than a frame header were available.
    #[error("payload of {len} bytes is too short for a frame header")]
    TruncatedHeader {
        /// Decompressed length.
        len: usize,
    },

    /// The header's `frame_length` claims more bytes than were decompressed.
    #[error("declared frame length {declared} exceeds decompressed size {available}")]
    LengthExceedsBuffer {
        /// `frame_length` from the header.
        declared: usize,
        /// Bytes actually decompressed.
        available: usize,
    },

    /// `height * width * channels` does not fit inside the declared frame.
    #[error("pixel data needs {required} bytes but frame declares {declared}")]
    PixelsExceedFrame {
        /// Header plus pixel bytes.
        required: usize,
        /// `frame_length` from the header.
        declared: usize,
    },

    /// Width, height, or channel count is zero.
    #[error("frame has a zero dimension")]
    ZeroDimension,

    /// Channel counts other than 1, 3 or 4.
    #[error("unsupported channel count {0}")]
    UnsupportedChannels(u16),
}
