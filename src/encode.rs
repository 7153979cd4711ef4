//! FFmpeg-backed video encoding.
//!
//! [`FfmpegBackend`] opens an [`FfmpegEncoder`] for the
//! [`VideoSink`](crate::VideoSink). Frames arrive as packed RGB, are scaled
//! into the codec's YUV 4:2:0 input format, and are stamped with consecutive
//! presentation times at the configured fixed frame rate. The container is
//! chosen from the output file extension.

use std::fs;
use std::path::Path;

use ffmpeg_next::codec::Id;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::codec::encoder::video::Encoder as OpenedVideoEncoder;
use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg_next::{Packet, Rational};
use image::RgbImage;

use crate::error::CamrollError;
use crate::ffmpeg::ensure_initialized;
use crate::utilities::{copy_rows_into_plane, even_dimension};
use crate::video_sink::{FrameEncoder, VideoBackend};

/// Supported output video codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoCodec {
    /// MPEG-4 Part 2, the camera tool's `mp4v`. This is the default.
    #[default]
    Mpeg4,
    /// H.264 / AVC.
    H264,
    /// H.265 / HEVC.
    H265,
}

impl VideoCodec {
    fn to_codec_id(self) -> Id {
        match self {
            VideoCodec::Mpeg4 => Id::MPEG4,
            VideoCodec::H264 => Id::H264,
            VideoCodec::H265 => Id::HEVC,
        }
    }

    /// Parse a codec name as accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mpeg4" | "mp4v" => Some(VideoCodec::Mpeg4),
            "h264" | "avc" => Some(VideoCodec::H264),
            "h265" | "hevc" => Some(VideoCodec::H265),
            _ => None,
        }
    }
}

/// Opens FFmpeg encoders.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegBackend {
    codec: VideoCodec,
}

impl FfmpegBackend {
    /// A backend producing `codec` streams.
    pub fn new(codec: VideoCodec) -> Self {
        Self { codec }
    }
}

impl VideoBackend for FfmpegBackend {
    type Encoder = FfmpegEncoder;

    fn open(
        &mut self,
        path: &Path,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Self::Encoder, CamrollError> {
        FfmpegEncoder::open(path, width, height, fps, self.codec)
    }
}

/// An open FFmpeg output with one video stream.
pub struct FfmpegEncoder {
    output: Output,
    encoder: OpenedVideoEncoder,
    scaler: ScalingContext,
    stream_index: usize,
    encoder_time_base: Rational,
    stream_time_base: Rational,
    width: u32,
    height: u32,
    next_pts: i64,
}

impl FfmpegEncoder {
    /// Create the output file, configure the stream, and write its header.
    ///
    /// `width` and `height` are the source frame size; the coded size is
    /// rounded down to even values and frames are scaled to fit.
    ///
    /// # Errors
    ///
    /// - [`CamrollError::VideoWriteError`] if the output cannot be created.
    /// - [`CamrollError::VideoEncodeError`] if the codec cannot be opened or
    ///   `fps` does not fit a time base.
    ///
    /// A file created before the failure is removed.
    pub fn open(
        path: &Path,
        width: u32,
        height: u32,
        fps: u32,
        codec: VideoCodec,
    ) -> Result<Self, CamrollError> {
        let fps = i32::try_from(fps.max(1)).map_err(|_| {
            CamrollError::VideoEncodeError(format!("frame rate {fps} is out of range"))
        })?;
        ensure_initialized()?;

        let coded_width = even_dimension(width);
        let coded_height = even_dimension(height);

        log::info!(
            "Opening {codec:?} encoder for {} ({width}x{height} -> {coded_width}x{coded_height}, {fps} fps)",
            path.display(),
        );

        let output = ffmpeg_next::format::output(&path)
            .map_err(|e| CamrollError::VideoWriteError(format!("cannot open output: {e}")))?;

        // The muxer has created the file; do not leave it behind on failure.
        Self::start(output, width, height, coded_width, coded_height, fps, codec).inspect_err(
            |_| {
                if let Err(error) = fs::remove_file(path) {
                    log::warn!("Could not remove {}: {error}", path.display());
                }
            },
        )
    }

    fn start(
        mut output: Output,
        width: u32,
        height: u32,
        coded_width: u32,
        coded_height: u32,
        fps: i32,
        codec: VideoCodec,
    ) -> Result<Self, CamrollError> {
        let target_pixel = Pixel::YUV420P;
        let codec_id = codec.to_codec_id();
        let encoder_time_base = Rational::new(1, fps);

        let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

        let encoder_codec = ffmpeg_next::encoder::find(codec_id).ok_or_else(|| {
            CamrollError::VideoEncodeError(format!("codec {codec_id:?} not available"))
        })?;

        let mut stream = output
            .add_stream(encoder_codec)
            .map_err(|e| CamrollError::VideoWriteError(format!("cannot add stream: {e}")))?;
        let stream_index = stream.index();

        let mut encoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.encoder().video())
            .map_err(|e| CamrollError::VideoEncodeError(format!("cannot create encoder: {e}")))?;

        encoder.set_width(coded_width);
        encoder.set_height(coded_height);
        encoder.set_format(target_pixel);
        encoder.set_time_base(encoder_time_base);
        encoder.set_frame_rate(Some(Rational::new(fps, 1)));

        if needs_global_header {
            // SAFETY: the context is live and not yet opened.
            unsafe {
                (*encoder.as_mut_ptr()).flags |=
                    ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
            }
        }

        let encoder = encoder
            .open_as(encoder_codec)
            .map_err(|e| CamrollError::VideoEncodeError(format!("cannot open encoder: {e}")))?;

        stream.set_parameters(&encoder);
        stream.set_time_base(encoder_time_base);

        output
            .write_header()
            .map_err(|e| CamrollError::VideoWriteError(format!("cannot write header: {e}")))?;

        let stream_time_base = output
            .stream(stream_index)
            .map(|stream| stream.time_base())
            .unwrap_or(encoder_time_base);

        let scaler = ScalingContext::get(
            Pixel::RGB24,
            width,
            height,
            target_pixel,
            coded_width,
            coded_height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|e| CamrollError::VideoWriteError(format!("cannot create scaler: {e}")))?;

        Ok(Self {
            output,
            encoder,
            scaler,
            stream_index,
            encoder_time_base,
            stream_time_base,
            width,
            height,
            next_pts: 0,
        })
    }

    fn drain_packets(&mut self) -> Result<(), CamrollError> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.encoder_time_base, self.stream_time_base);
            packet
                .write_interleaved(&mut self.output)
                .map_err(|e| CamrollError::VideoWriteError(format!("write packet failed: {e}")))?;
        }
        Ok(())
    }
}

impl FrameEncoder for FfmpegEncoder {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<(), CamrollError> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(CamrollError::VideoEncodeError(format!(
                "frame is {}x{}, encoder expects {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height,
            )));
        }

        let mut source = VideoFrame::new(Pixel::RGB24, self.width, self.height);
        let stride = source.stride(0);
        copy_rows_into_plane(
            source.data_mut(0),
            stride,
            frame.as_raw(),
            self.width as usize * 3,
            self.height as usize,
        );

        let mut scaled = VideoFrame::empty();
        self.scaler
            .run(&source, &mut scaled)
            .map_err(|e| CamrollError::VideoWriteError(format!("scaling failed: {e}")))?;

        scaled.set_pts(Some(self.next_pts));
        self.next_pts += 1;

        self.encoder
            .send_frame(&scaled)
            .map_err(|e| CamrollError::VideoEncodeError(format!("send_frame failed: {e}")))?;
        self.drain_packets()
    }

    fn finish(mut self) -> Result<(), CamrollError> {
        self.encoder
            .send_eof()
            .map_err(|e| CamrollError::VideoEncodeError(format!("send_eof failed: {e}")))?;
        self.drain_packets()?;
        self.output
            .write_trailer()
            .map_err(|e| CamrollError::VideoWriteError(format!("cannot write trailer: {e}")))?;
        log::debug!("Encoder closed after {} frames", self.next_pts);
        Ok(())
    }
}
