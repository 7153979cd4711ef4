//! Frame record decoding.
//!
//! Turns one [`RawFrame`] into a [`DecodedFrame`]: strip the length prefix,
//! zstd-decompress the payload, unpack the 24-byte header and bound-check the
//! pixel data against it. Any failure is reported as a [`FrameDropReason`];
//! nothing here panics on malformed input.

use crate::error::FrameDropReason;
use crate::frame::{DecodedFrame, FRAME_HEADER_SIZE, FrameHeader, PixelLayout};
use crate::splitter::{LENGTH_PREFIX_SIZE, RawFrame};

/// Decode a record given as prefix + payload bytes.
///
/// # Errors
///
/// Returns the [`FrameDropReason`] that disqualified the record.
pub fn decode_record(bytes: &[u8]) -> Result<DecodedFrame, FrameDropReason> {
    let payload = bytes.get(LENGTH_PREFIX_SIZE..).unwrap_or_default();
    let buffer = zstd::stream::decode_all(payload)
        .map_err(|error| FrameDropReason::Decompression(error.to_string()))?;
    parse_decompressed(buffer)
}

/// Validate a decompressed buffer and wrap it as a frame.
///
/// # Errors
///
/// Returns the [`FrameDropReason`] that disqualified the buffer.
pub fn parse_decompressed(buffer: Vec<u8>) -> Result<DecodedFrame, FrameDropReason> {
    if buffer.is_empty() {
        return Err(FrameDropReason::Empty);
    }

    let header = FrameHeader::parse(&buffer)?;

    let declared = header.frame_length as usize;
    if declared > buffer.len() {
        return Err(FrameDropReason::LengthExceedsBuffer {
            declared,
            available: buffer.len(),
        });
    }

    if header.height == 0 || header.width == 0 {
        return Err(FrameDropReason::ZeroDimension);
    }
    let layout = PixelLayout::from_channels(header.channels)?;

    let required = FRAME_HEADER_SIZE + header.pixel_len();
    if required > declared {
        return Err(FrameDropReason::PixelsExceedFrame { required, declared });
    }

    Ok(DecodedFrame::from_checked_buffer(&header, layout, buffer))
}

/// Decode one record, logging and discarding it on failure.
///
/// Use [`decode_record`] when the caller needs the reason.
pub fn decode_frame(raw: &RawFrame) -> Option<DecodedFrame> {
    match decode_record(&raw.bytes) {
        Ok(frame) => Some(frame),
        Err(FrameDropReason::Empty) => None,
        Err(reason) => {
            log::warn!("Dropping frame record {}: {reason}", raw.index);
            None
        }
    }
}
