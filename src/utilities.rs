//! Internal utility functions.
//!
//! Pixel-layout conversion and plane copying shared by the sinks and the
//! FFmpeg encoder.

use image::{DynamicImage, RgbImage};

use crate::frame::{DecodedFrame, PixelLayout};

/// Replicate each grayscale byte into an RGB triple.
///
/// Returns `None` if `pixels` is not exactly `width * height` bytes.
pub fn gray_to_rgb(width: u32, height: u32, pixels: &[u8]) -> Option<RgbImage> {
    if pixels.len() != width as usize * height as usize {
        return None;
    }
    let mut rgb = Vec::with_capacity(pixels.len() * 3);
    for &value in pixels {
        rgb.extend_from_slice(&[value, value, value]);
    }
    RgbImage::from_raw(width, height, rgb)
}

/// Convert a decoded frame to the 3-channel layout video encoders take.
///
/// Grayscale is expanded, RGB is copied as-is, RGBA drops its alpha.
pub fn frame_to_rgb(frame: &DecodedFrame) -> Option<RgbImage> {
    match frame.layout {
        PixelLayout::Grayscale => gray_to_rgb(frame.width, frame.height, frame.pixels()),
        PixelLayout::Multi(3) => RgbImage::from_raw(frame.width, frame.height, frame.pixels().to_vec()),
        PixelLayout::Multi(_) => frame.to_image().map(|image| DynamicImage::to_rgb8(&image)),
    }
}

/// Copy tightly packed rows into a plane whose stride may include padding.
///
/// FFmpeg frames frequently carry per-row padding (stride > row length).
pub fn copy_rows_into_plane(
    plane: &mut [u8],
    stride: usize,
    packed: &[u8],
    row_len: usize,
    rows: usize,
) {
    if stride == row_len {
        let len = row_len * rows;
        plane[..len].copy_from_slice(&packed[..len]);
        return;
    }
    for row in 0..rows {
        let src = row * row_len;
        let dst = row * stride;
        plane[dst..dst + row_len].copy_from_slice(&packed[src..src + row_len]);
    }
}

/// Round down to an even value of at least 2; 4:2:0 encoders reject odd sizes.
pub fn even_dimension(value: u32) -> u32 {
    (value & !1).max(2)
}
