//! Video output.
//!
//! [`VideoSink`] turns a timestamp-ordered frame sequence into one video
//! file. It is an explicit state machine:
//!
//! ```text
//! Uninitialized --first frame--> Open(width, height) --finish--> Closed
//!       |                                                         ^
//!       +-------------------- finish / failure -------------------+
//! ```
//!
//! The encoder is only opened once a frame has actually decoded, sized to
//! that frame. If no frame ever arrives, [`VideoSink::finish`] reports
//! [`CamrollError::NoValidFrames`] and no file is created. Frames from
//! several containers flow into the same encoder; it is never reset between
//! files. A write or close failure removes the incomplete file.
//!
//! # Known limitation
//!
//! Output uses a fixed frame rate. The recording's real inter-frame spacing
//! is not reproduced, so playback speed does not match acquisition speed.

use std::fs;
use std::io::ErrorKind;
use std::mem;
use std::path::{Path, PathBuf};

use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::error::CamrollError;
use crate::frame::DecodedFrame;
use crate::utilities::frame_to_rgb;

/// Opens encoders for a [`VideoSink`].
pub trait VideoBackend {
    /// The open encoder handle.
    type Encoder: FrameEncoder;

    /// Create `path` and start a `width` x `height` stream at `fps`.
    ///
    /// # Errors
    ///
    /// Any failure to create the output or configure the codec.
    fn open(
        &mut self,
        path: &Path,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Self::Encoder, CamrollError>;
}

/// An open encoder that accepts packed RGB frames.
pub trait FrameEncoder {
    /// Encode one frame with the dimensions the encoder was opened with.
    ///
    /// # Errors
    ///
    /// Any encode or write failure.
    fn write_frame(&mut self, frame: &RgbImage) -> Result<(), CamrollError>;

    /// Flush and close. Consumes the encoder, so it runs at most once.
    ///
    /// # Errors
    ///
    /// Any flush or trailer failure.
    fn finish(self) -> Result<(), CamrollError>;
}

enum SinkState<E> {
    Uninitialized,
    Open { encoder: E, width: u32, height: u32 },
    Closed,
}

/// Lifecycle of a [`VideoSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkPhase {
    /// No frame seen yet, no file exists.
    Uninitialized,
    /// Encoder open at these dimensions.
    Open {
        /// Encoder width.
        width: u32,
        /// Encoder height.
        height: u32,
    },
    /// Encoder closed, or never opened and finished.
    Closed,
}

/// Summary of a finished video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoExportReport {
    /// The file that was written.
    pub path: PathBuf,
    /// Frames encoded.
    pub frames_written: u64,
    /// Frame width the encoder was opened with.
    pub width: u32,
    /// Frame height the encoder was opened with.
    pub height: u32,
    /// Fixed output frame rate.
    pub fps: u32,
}

/// Writes ordered frames into one video, opening the encoder lazily.
pub struct VideoSink<B: VideoBackend> {
    backend: B,
    path: PathBuf,
    fps: u32,
    state: SinkState<B::Encoder>,
    frames_written: u64,
}

impl<B: VideoBackend> VideoSink<B> {
    /// Create a sink that will write to `path` at `fps` once a frame arrives.
    pub fn new<P: AsRef<Path>>(backend: B, path: P, fps: u32) -> Self {
        Self {
            backend,
            path: path.as_ref().to_path_buf(),
            fps: fps.max(1),
            state: SinkState::Uninitialized,
            frames_written: 0,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SinkPhase {
        match &self.state {
            SinkState::Uninitialized => SinkPhase::Uninitialized,
            SinkState::Open { width, height, .. } => SinkPhase::Open {
                width: *width,
                height: *height,
            },
            SinkState::Closed => SinkPhase::Closed,
        }
    }

    /// Frames encoded so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Encode the next frame, opening the encoder on the first call.
    ///
    /// Frames whose size differs from the first frame are resized to it.
    /// On any failure the encoder is closed and the incomplete file removed
    /// before the error is returned, and the sink rejects further frames.
    ///
    /// # Errors
    ///
    /// Encoder open or write failures, or a push after the sink closed.
    pub fn push(&mut self, frame: &DecodedFrame) -> Result<(), CamrollError> {
        if let SinkState::Uninitialized = self.state {
            let encoder = self.open_encoder(frame.width, frame.height).inspect_err(|_| {
                self.state = SinkState::Closed;
            })?;
            self.state = SinkState::Open {
                encoder,
                width: frame.width,
                height: frame.height,
            };
        }

        let result = match &mut self.state {
            SinkState::Open {
                encoder,
                width,
                height,
            } => write_converted(encoder, frame, *width, *height),
            SinkState::Uninitialized | SinkState::Closed => {
                return Err(CamrollError::VideoWriteError(
                    "video sink is already closed".to_string(),
                ));
            }
        };

        match result {
            Ok(()) => {
                self.frames_written += 1;
                Ok(())
            }
            Err(error) => {
                self.close_after_failure();
                Err(error)
            }
        }
    }

    /// Close the encoder and report what was written.
    ///
    /// # Errors
    ///
    /// - [`CamrollError::NoValidFrames`] if no frame was ever pushed; no
    ///   file is created in that case.
    /// - Encoder flush failures; the incomplete file is removed.
    pub fn finish(mut self) -> Result<VideoExportReport, CamrollError> {
        match mem::replace(&mut self.state, SinkState::Closed) {
            SinkState::Uninitialized => Err(CamrollError::NoValidFrames),
            SinkState::Open {
                encoder,
                width,
                height,
            } => {
                if let Err(error) = encoder.finish() {
                    self.discard_output();
                    return Err(error);
                }
                log::info!(
                    "Wrote {} frames to {} ({width}x{height} @ {} fps)",
                    self.frames_written,
                    self.path.display(),
                    self.fps,
                );
                Ok(VideoExportReport {
                    path: self.path.clone(),
                    frames_written: self.frames_written,
                    width,
                    height,
                    fps: self.fps,
                })
            }
            SinkState::Closed => Err(CamrollError::VideoWriteError(
                "video sink was closed after an earlier failure".to_string(),
            )),
        }
    }

    fn open_encoder(&mut self, width: u32, height: u32) -> Result<B::Encoder, CamrollError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.backend.open(&self.path, width, height, self.fps)
    }

    fn close_after_failure(&mut self) {
        if let SinkState::Open { encoder, .. } = mem::replace(&mut self.state, SinkState::Closed) {
            if let Err(error) = encoder.finish() {
                log::warn!(
                    "Closing encoder for {} after a failure also failed: {error}",
                    self.path.display(),
                );
            }
            self.discard_output();
        }
    }

    fn discard_output(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => log::info!("Removed incomplete video {}", self.path.display()),
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => log::warn!(
                "Could not remove incomplete video {}: {error}",
                self.path.display(),
            ),
        }
    }
}

impl<B: VideoBackend> Drop for VideoSink<B> {
    fn drop(&mut self) {
        if let SinkState::Open { encoder, .. } = mem::replace(&mut self.state, SinkState::Closed) {
            log::warn!(
                "Video sink for {} dropped while open; closing encoder",
                self.path.display(),
            );
            if let Err(error) = encoder.finish() {
                log::warn!("Closing encoder for {} failed: {error}", self.path.display());
            }
        }
    }
}

fn write_converted<E: FrameEncoder>(
    encoder: &mut E,
    frame: &DecodedFrame,
    width: u32,
    height: u32,
) -> Result<(), CamrollError> {
    let rgb = frame_to_rgb(frame).ok_or_else(|| {
        CamrollError::VideoEncodeError(format!(
            "frame {} cannot be converted to RGB",
            frame.timestamp
        ))
    })?;

    if rgb.width() == width && rgb.height() == height {
        return encoder.write_frame(&rgb);
    }

    log::warn!(
        "Frame {} is {}x{}, resizing to {width}x{height}",
        frame.timestamp,
        frame.width,
        frame.height,
    );
    let resized = imageops::resize(&rgb, width, height, FilterType::Lanczos3);
    encoder.write_frame(&resized)
}
