//! Decoded frame types.
//!
//! A decompressed frame record starts with a 24-byte little-endian header:
//!
//! | Offset | Type  | Field          |
//! |--------|-------|----------------|
//! | 0      | `u32` | `frame_length` |
//! | 4      | `u16` | reserved       |
//! | 6      | `u16` | `height`       |
//! | 8      | `u16` | `width`        |
//! | 10     | `u16` | `channels`     |
//! | 12     | `u32` | `ts_high`      |
//! | 16     | `u32` | `ts_low`       |
//! | 20     | `f32` | reserved       |
//!
//! The pixel bytes follow immediately, row-major without padding.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::error::FrameDropReason;

/// Size of the header at the start of every decompressed frame.
pub const FRAME_HEADER_SIZE: usize = 24;

/// The fixed header of a decompressed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameHeader {
    /// Bytes of header plus pixels that belong to this frame.
    pub frame_length: u32,
    /// Unused by the decoder.
    pub reserved0: u16,
    /// Rows of pixels.
    pub height: u16,
    /// Pixels per row.
    pub width: u16,
    /// Bytes per pixel.
    pub channels: u16,
    /// Upper half of the acquisition timestamp.
    pub ts_high: u32,
    /// Lower half of the acquisition timestamp.
    pub ts_low: u32,
    /// Unused by the decoder.
    pub reserved1: f32,
}

impl FrameHeader {
    /// Unpack a header from the start of a decompressed buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FrameDropReason::TruncatedHeader`] if fewer than
    /// [`FRAME_HEADER_SIZE`] bytes are available.
    pub fn parse(buffer: &[u8]) -> Result<Self, FrameDropReason> {
        let header: &[u8; FRAME_HEADER_SIZE] = buffer
            .get(..FRAME_HEADER_SIZE)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(FrameDropReason::TruncatedHeader { len: buffer.len() })?;

        let u16_at = |offset: usize| u16::from_le_bytes([header[offset], header[offset + 1]]);
        let u32_at = |offset: usize| {
            u32::from_le_bytes([
                header[offset],
                header[offset + 1],
                header[offset + 2],
                header[offset + 3],
            ])
        };

        Ok(Self {
            frame_length: u32_at(0),
            reserved0: u16_at(4),
            height: u16_at(6),
            width: u16_at(8),
            channels: u16_at(10),
            ts_high: u32_at(12),
            ts_low: u32_at(16),
            reserved1: f32::from_bits(u32_at(20)),
        })
    }

    /// Pack the header back into its wire form.
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut bytes = [0_u8; FRAME_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.frame_length.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.reserved0.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.height.to_le_bytes());
        bytes[8..10].copy_from_slice(&self.width.to_le_bytes());
        bytes[10..12].copy_from_slice(&self.channels.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.ts_high.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.ts_low.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.reserved1.to_bits().to_le_bytes());
        bytes
    }

    /// `(ts_high << 32) | ts_low`.
    pub fn timestamp(&self) -> u64 {
        (u64::from(self.ts_high) << 32) | u64::from(self.ts_low)
    }

    /// Number of pixel bytes the header describes.
    pub fn pixel_len(&self) -> usize {
        usize::from(self.height) * usize::from(self.width) * usize::from(self.channels)
    }
}

/// How the pixel bytes of a frame are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// One byte per pixel, shaped `(height, width)`.
    Grayscale,
    /// `channels` interleaved bytes per pixel, shaped `(height, width, channels)`.
    ///
    /// No recording with more than one channel has been checked against this
    /// interpretation; see [`PixelLayout::is_verified`].
    Multi(u16),
}

impl PixelLayout {
    /// Map a header channel count to a layout.
    ///
    /// # Errors
    ///
    /// Returns [`FrameDropReason::ZeroDimension`] for 0 channels and
    /// [`FrameDropReason::UnsupportedChannels`] for anything but 1, 3 or 4.
    pub fn from_channels(channels: u16) -> Result<Self, FrameDropReason> {
        match channels {
            0 => Err(FrameDropReason::ZeroDimension),
            1 => Ok(PixelLayout::Grayscale),
            3 | 4 => Ok(PixelLayout::Multi(channels)),
            other => Err(FrameDropReason::UnsupportedChannels(other)),
        }
    }

    /// Bytes per pixel.
    pub fn channels(self) -> u16 {
        match self {
            PixelLayout::Grayscale => 1,
            PixelLayout::Multi(channels) => channels,
        }
    }

    /// `false` for the multi-channel path, which is best-effort only.
    pub fn is_verified(self) -> bool {
        matches!(self, PixelLayout::Grayscale)
    }
}

/// One successfully decoded frame.
///
/// Owns the decompressed buffer; [`pixels`](DecodedFrame::pixels) is a view
/// into it starting after the header.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Acquisition time in the camera's own unit. Only used as a sort key.
    pub timestamp: u64,
    /// Rows of pixels.
    pub height: u32,
    /// Pixels per row.
    pub width: u32,
    /// Pixel layout.
    pub layout: PixelLayout,
    buffer: Vec<u8>,
}

impl DecodedFrame {
    /// Build a frame around a decompressed buffer whose header was already
    /// checked against its length.
    pub(crate) fn from_checked_buffer(
        header: &FrameHeader,
        layout: PixelLayout,
        buffer: Vec<u8>,
    ) -> Self {
        Self {
            timestamp: header.timestamp(),
            height: u32::from(header.height),
            width: u32::from(header.width),
            layout,
            buffer,
        }
    }

    /// Build a frame from bare pixel bytes, synthesising a header.
    ///
    /// Returns `None` if `pixels` does not match the dimensions or the
    /// dimensions do not fit a header.
    pub fn from_pixels(
        timestamp: u64,
        height: u16,
        width: u16,
        layout: PixelLayout,
        pixels: &[u8],
    ) -> Option<Self> {
        if PixelLayout::from_channels(layout.channels()).ok()? != layout || height == 0 || width == 0 {
            return None;
        }
        let header = FrameHeader {
            frame_length: u32::try_from(FRAME_HEADER_SIZE + pixels.len()).ok()?,
            reserved0: 0,
            height,
            width,
            channels: layout.channels(),
            ts_high: (timestamp >> 32) as u32,
            ts_low: timestamp as u32,
            reserved1: 0.0,
        };
        if header.pixel_len() != pixels.len() {
            return None;
        }
        let mut buffer = Vec::with_capacity(FRAME_HEADER_SIZE + pixels.len());
        buffer.extend_from_slice(&header.to_bytes());
        buffer.extend_from_slice(pixels);
        Some(Self::from_checked_buffer(&header, layout, buffer))
    }

    /// Pixel bytes, `height * width * channels` long.
    pub fn pixels(&self) -> &[u8] {
        let end = FRAME_HEADER_SIZE + self.pixel_len();
        &self.buffer[FRAME_HEADER_SIZE..end]
    }

    /// Length of [`pixels`](DecodedFrame::pixels).
    pub fn pixel_len(&self) -> usize {
        self.height as usize * self.width as usize * usize::from(self.layout.channels())
    }

    /// One row of pixels, or `None` past the last row.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.width as usize * usize::from(self.layout.channels());
        let start = y as usize * stride;
        self.pixels().get(start..start + stride)
    }

    /// Copy the pixels into an [`image::DynamicImage`].
    pub fn to_image(&self) -> Option<DynamicImage> {
        let pixels = self.pixels().to_vec();
        match self.layout {
            PixelLayout::Grayscale => {
                GrayImage::from_raw(self.width, self.height, pixels).map(DynamicImage::ImageLuma8)
            }
            PixelLayout::Multi(3) => {
                RgbImage::from_raw(self.width, self.height, pixels).map(DynamicImage::ImageRgb8)
            }
            PixelLayout::Multi(4) => {
                RgbaImage::from_raw(self.width, self.height, pixels).map(DynamicImage::ImageRgba8)
            }
            PixelLayout::Multi(_) => None,
        }
    }
}
