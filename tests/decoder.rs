//! Frame decoder integration tests.

mod common;

use camroll::{
    DecodedFrame, FrameDropReason, PixelLayout, RawFrame, decode_frame, decode_record,
};
use common::{compressed_record, corrupt_record, frame_bytes, gray_record, pattern};

// ── Successful decodes ─────────────────────────────────────────────

#[test]
fn grayscale_frame_round_trips_byte_for_byte() {
    let pixels = [1_u8, 2, 3, 4, 5, 6];
    let frame = decode_record(&compressed_record(&frame_bytes(42, 2, 3, 1, &pixels))).expect("decode");

    assert_eq!(frame.timestamp, 42);
    assert_eq!((frame.height, frame.width), (2, 3));
    assert_eq!(frame.layout, PixelLayout::Grayscale);
    assert_eq!(frame.pixels(), &pixels);
    assert_eq!(frame.row(1), Some(&pixels[3..]));
    assert_eq!(frame.row(2), None);
}

#[test]
fn timestamp_combines_high_and_low_words() {
    let timestamp = (7_u64 << 32) | 0xDEAD_BEEF;
    let frame = decode_record(&gray_record(timestamp, 1, 1)).expect("decode");
    assert_eq!(frame.timestamp, 30_064_771_072 + 0xDEAD_BEEF);
}

#[test]
fn rgb_frame_is_interleaved_and_unverified() {
    let pixels = pattern(5, 2 * 2 * 3);
    let frame = decode_record(&compressed_record(&frame_bytes(5, 2, 2, 3, &pixels))).expect("decode");

    assert_eq!(frame.layout, PixelLayout::Multi(3));
    assert!(!frame.layout.is_verified());
    let image = frame.to_image().expect("image").to_rgb8();
    assert_eq!(image.get_pixel(1, 0).0, [pixels[3], pixels[4], pixels[5]]);
}

#[test]
fn decoded_frame_matches_from_pixels() {
    let pixels = pattern(9, 12);
    let decoded = decode_record(&compressed_record(&frame_bytes(9, 3, 4, 1, &pixels))).expect("decode");
    let built = DecodedFrame::from_pixels(9, 3, 4, PixelLayout::Grayscale, &pixels).expect("build");
    assert_eq!(decoded, built);
}

// ── Dropped records ────────────────────────────────────────────────

#[test]
fn corrupt_payload_is_a_decompression_drop() {
    let result = decode_record(&corrupt_record());
    assert!(matches!(result, Err(FrameDropReason::Decompression(_))));
}

#[test]
fn empty_decompressed_buffer_is_dropped_quietly() {
    let raw = RawFrame {
        index: 0,
        bytes: compressed_record(&[]),
    };
    assert_eq!(decode_record(&raw.bytes), Err(FrameDropReason::Empty));
    assert!(decode_frame(&raw).is_none());
}

#[test]
fn short_pixel_buffer_is_rejected() {
    // Header claims 4x4 but only 4 pixel bytes follow.
    let mut frame = frame_bytes(1, 4, 4, 1, &[0; 4]);
    frame[0..4].copy_from_slice(&40_u32.to_le_bytes());
    let result = decode_record(&compressed_record(&frame));
    assert_eq!(
        result,
        Err(FrameDropReason::LengthExceedsBuffer {
            declared: 40,
            available: 28,
        })
    );
}

#[test]
fn decode_frame_discards_failures() {
    let raw = RawFrame {
        index: 3,
        bytes: corrupt_record(),
    };
    assert!(decode_frame(&raw).is_none());
}

#[test]
fn from_pixels_rejects_mismatched_lengths() {
    assert!(DecodedFrame::from_pixels(1, 2, 2, PixelLayout::Grayscale, &[0; 3]).is_none());
    assert!(DecodedFrame::from_pixels(1, 0, 2, PixelLayout::Grayscale, &[]).is_none());
    assert!(DecodedFrame::from_pixels(1, 1, 1, PixelLayout::Multi(2), &[0; 2]).is_none());
}
