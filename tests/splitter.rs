//! Frame splitter integration tests.

mod common;

use std::io::{self, Cursor, Read};

use camroll::{FILE_HEADER_SIZE, FrameSplitter, LENGTH_PREFIX_SIZE, open_container, split_frames};
use common::{container_bytes, gray_record, record, write_container};

fn split_after_header(bytes: Vec<u8>) -> Vec<camroll::RawFrame> {
    let mut reader = Cursor::new(bytes);
    reader.set_position(FILE_HEADER_SIZE);
    split_frames(reader)
}

// ── Stream boundaries ──────────────────────────────────────────────

#[test]
fn records_are_split_in_file_order() {
    let first = gray_record(1, 2, 2);
    let second = gray_record(2, 2, 2);
    let frames = split_after_header(container_bytes(&[first.clone(), second.clone()]));

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].index, 0);
    assert_eq!(frames[0].bytes, first);
    assert_eq!(frames[1].index, 1);
    assert_eq!(frames[1].bytes, second);
}

#[test]
fn zero_length_prefix_ends_the_stream() {
    let a = gray_record(10, 2, 2);
    let b = gray_record(20, 2, 2);
    let frames = split_after_header(container_bytes(&[a.clone(), vec![0, 0, 0, 0], b]));

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].bytes, a);
}

#[test]
fn truncated_payload_ends_the_stream_without_error() {
    let whole = gray_record(1, 2, 2);
    let mut short = record(&[7_u8; 100]);
    short.truncate(LENGTH_PREFIX_SIZE + 40);

    let frames = split_after_header(container_bytes(&[whole.clone(), short]));
    assert_eq!(frames, vec![camroll::RawFrame { index: 0, bytes: whole }]);
}

#[test]
fn partial_length_prefix_ends_the_stream() {
    let whole = gray_record(1, 2, 2);
    let mut bytes = container_bytes(&[whole]);
    bytes.extend_from_slice(&[9, 0]);

    assert_eq!(split_after_header(bytes).len(), 1);
}

#[test]
fn header_only_container_has_no_records() {
    assert!(split_after_header(container_bytes(&[])).is_empty());
}

#[test]
fn payload_excludes_length_prefix() {
    let frames = split_after_header(container_bytes(&[record(b"abc")]));
    assert_eq!(frames[0].payload(), b"abc");
    assert_eq!(frames[0].bytes.len(), LENGTH_PREFIX_SIZE + 3);
}

#[test]
fn splitter_is_fused_after_the_end() {
    let mut reader = Cursor::new(container_bytes(&[record(b"x"), vec![0, 0, 0, 0], record(b"y")]));
    reader.set_position(FILE_HEADER_SIZE);
    let mut splitter = FrameSplitter::new(reader);

    assert!(splitter.next().is_some());
    assert!(splitter.next().is_none());
    assert!(splitter.next().is_none());
}

// ── Read errors ────────────────────────────────────────────────────

/// Serves `data`, then fails every read once it has been consumed.
struct FailingReader {
    data: Cursor<Vec<u8>>,
}

impl FailingReader {
    fn new(data: Vec<u8>) -> Self {
        Self {
            data: Cursor::new(data),
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.data.read(buf)?;
        if read == 0 && !buf.is_empty() {
            return Err(io::Error::new(io::ErrorKind::Other, "device went away"));
        }
        Ok(read)
    }
}

#[test]
fn read_error_on_length_prefix_ends_the_stream() {
    let first = gray_record(1, 2, 2);
    let mut splitter = FrameSplitter::new(FailingReader::new(first.clone()));

    let yielded = splitter.next().expect("first record");
    assert_eq!(yielded.bytes, first);
    assert!(splitter.next().is_none());
    assert!(splitter.next().is_none());
}

#[test]
fn read_error_inside_payload_ends_the_stream() {
    let first = gray_record(1, 2, 2);
    let mut data = first.clone();
    // A prefix promising 64 bytes, followed by only 10.
    data.extend_from_slice(&64_u32.to_le_bytes());
    data.extend_from_slice(&[5_u8; 10]);

    let mut splitter = FrameSplitter::new(FailingReader::new(data));
    assert_eq!(splitter.next().map(|raw| raw.bytes), Some(first));
    assert!(splitter.next().is_none());
    assert!(splitter.next().is_none());
}

#[test]
fn read_error_before_any_record_yields_nothing() {
    assert!(split_frames(FailingReader::new(Vec::new())).is_empty());
}

// ── Files on disk ──────────────────────────────────────────────────

#[test]
fn open_container_skips_the_file_header() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_container(dir.path(), "LHPG-1730122064.bin", &[record(b"payload")]);

    let reader = open_container(&path).expect("open");
    let frames: Vec<_> = FrameSplitter::new(reader).collect();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].payload(), b"payload");
}

#[test]
fn missing_container_is_an_open_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = open_container(dir.path().join("missing.bin"));
    assert!(matches!(result, Err(camroll::CamrollError::ContainerOpen { .. })));
}
