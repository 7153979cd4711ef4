//! Synthetic container fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use camroll::{FILE_HEADER_SIZE, FrameHeader};

/// A decompressed frame: header plus `height * width * channels` pixel bytes.
pub fn frame_bytes(timestamp: u64, height: u16, width: u16, channels: u16, pixels: &[u8]) -> Vec<u8> {
    let header = FrameHeader {
        frame_length: (24 + pixels.len()) as u32,
        reserved0: 0,
        height,
        width,
        channels,
        ts_high: (timestamp >> 32) as u32,
        ts_low: timestamp as u32,
        reserved1: 0.0,
    };
    let mut bytes = header.to_bytes().to_vec();
    bytes.extend_from_slice(pixels);
    bytes
}

/// Deterministic pixel pattern seeded by the timestamp.
pub fn pattern(timestamp: u64, len: usize) -> Vec<u8> {
    (0..len)
        .map(|index| (index as u64).wrapping_mul(31).wrapping_add(timestamp) as u8)
        .collect()
}

/// Length-prefix a payload.
pub fn record(payload: &[u8]) -> Vec<u8> {
    let mut bytes = (payload.len() as u32).to_le_bytes().to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

/// A complete compressed record for a grayscale frame.
pub fn gray_record(timestamp: u64, height: u16, width: u16) -> Vec<u8> {
    let pixels = pattern(timestamp, usize::from(height) * usize::from(width));
    compressed_record(&frame_bytes(timestamp, height, width, 1, &pixels))
}

/// Compress a decompressed frame and length-prefix it.
pub fn compressed_record(frame: &[u8]) -> Vec<u8> {
    let payload = zstd::encode_all(frame, 3).expect("zstd compress");
    record(&payload)
}

/// A record whose payload is not a zstd stream.
pub fn corrupt_record() -> Vec<u8> {
    record(b"definitely not zstd")
}

/// File header followed by the given records.
pub fn container_bytes(records: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = vec![0xAB_u8; FILE_HEADER_SIZE as usize];
    for record in records {
        bytes.extend_from_slice(record);
    }
    bytes
}

/// Write a container named `name` into `dir`.
pub fn write_container(dir: &Path, name: &str, records: &[Vec<u8>]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, container_bytes(records)).expect("write container");
    path
}
