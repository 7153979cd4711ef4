//! # camroll
//!
//! Convert high-speed camera recordings into still images and video.
//!
//! A recording is a sequence of container files named
//! `<prefix>-<unix_seconds>.<ext>`. Each container holds a 32-byte file
//! header followed by length-prefixed, zstd-compressed frame records; each
//! record decompresses to a 24-byte frame header and a raw pixel buffer.
//! `camroll` splits the records out, decodes them in parallel, orders them
//! by their embedded timestamp, and writes them as images (one file per
//! timestamp) or as a single video via FFmpeg through the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Export Still Images
//!
//! ```no_run
//! use camroll::ExportOptions;
//!
//! let files = ["run/LHPG-1730122064.bin"];
//! let report = camroll::convert_to_images(&files, "run", &ExportOptions::new()).unwrap();
//! println!("{} written, {} skipped", report.images.written.len(), report.images.skipped.len());
//! ```
//!
//! ### Export a Video
//!
//! ```no_run
//! use camroll::ExportOptions;
//!
//! let files = ["run/LHPG-1730122064.bin", "run/LHPG-1730122124.bin"];
//! let options = ExportOptions::new().with_fps(60);
//! let report = camroll::convert_to_video(&files, "run", &options).unwrap();
//! println!("{} frames in {}", report.video.frames_written, report.video.path.display());
//! ```
//!
//! ### Work With Frames Directly
//!
//! ```no_run
//! use camroll::{ExportOptions, order_report};
//!
//! let report = camroll::decode_container("LHPG-1730122064.bin", &ExportOptions::new()).unwrap();
//! for dropped in &report.dropped {
//!     eprintln!("record {} dropped: {}", dropped.index, dropped.reason);
//! }
//! let frames = order_report(report);
//! if let Some(first) = frames.first() {
//!     println!("{}x{} at {}", first.width, first.height, first.timestamp);
//! }
//! ```
//!
//! ## Features
//!
//! - **Robust splitting**: a truncated or zero-length record ends the stream
//!   without an error; everything before it is kept
//! - **Isolated frame failures**: a corrupt record is dropped and reported,
//!   never aborting the batch
//! - **Parallel decoding**: bounded rayon pool, results reordered by timestamp
//! - **Idempotent image export**: existing files are skipped, never rewritten
//! - **Lazy video encoder**: no file is created when nothing decodes
//! - **Progress callbacks**: per operation, safe to call from worker threads
//!
//! ## Requirements
//!
//! Video export needs the FFmpeg development libraries installed on your
//! system.

pub mod batch;
pub mod configuration;
pub mod container;
pub mod decoder;
pub mod encode;
pub mod error;
pub mod export;
pub mod ffmpeg;
pub mod frame;
pub mod image_sink;
pub mod order;
pub mod progress;
pub mod splitter;
mod utilities;
pub mod video_sink;

pub use batch::{BatchDecoder, DecodeReport, DroppedFrame};
pub use configuration::ExportOptions;
pub use container::{ContainerName, FILE_HEADER_SIZE, open_container};
pub use decoder::{decode_frame, decode_record, parse_decompressed};
pub use encode::{FfmpegBackend, FfmpegEncoder, VideoCodec};
pub use error::{CamrollError, FrameDropReason};
pub use export::{
    ImageConversionReport, VideoConversionReport, convert_to_images, convert_to_video,
    convert_to_video_with, decode_container, decode_containers, export_images, export_video,
    export_video_with, video_output_path,
};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use frame::{DecodedFrame, FRAME_HEADER_SIZE, FrameHeader, PixelLayout};
pub use image_sink::{ImageExportReport, ImageSink};
pub use order::{is_time_ordered, order_frames, order_report};
pub use progress::{OperationType, ProgressCallback, ProgressFn, ProgressInfo};
pub use splitter::{FrameSplitter, LENGTH_PREFIX_SIZE, RawFrame, split_frames};
pub use video_sink::{FrameEncoder, SinkPhase, VideoBackend, VideoExportReport, VideoSink};
