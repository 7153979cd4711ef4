//! Benchmarks for splitting and decoding synthetic containers.
//!
//! Run with: cargo bench

use std::io::Cursor;

use camroll::{BatchDecoder, ExportOptions, FILE_HEADER_SIZE, FrameHeader, order_report, split_frames};
use criterion::{BenchmarkId, Criterion, Throughput};

const WIDTH: u16 = 320;
const HEIGHT: u16 = 240;

fn compressed_record(timestamp: u64) -> Vec<u8> {
    let pixel_len = usize::from(WIDTH) * usize::from(HEIGHT);
    let header = FrameHeader {
        frame_length: (24 + pixel_len) as u32,
        reserved0: 0,
        height: HEIGHT,
        width: WIDTH,
        channels: 1,
        ts_high: (timestamp >> 32) as u32,
        ts_low: timestamp as u32,
        reserved1: 0.0,
    };
    let mut frame = header.to_bytes().to_vec();
    frame.extend((0..pixel_len).map(|index| (index as u64 ^ timestamp) as u8));
    let payload = zstd::encode_all(frame.as_slice(), 3).unwrap();

    let mut record = (payload.len() as u32).to_le_bytes().to_vec();
    record.extend(payload);
    record
}

fn synthetic_container(frames: u64) -> Vec<u8> {
    let mut bytes = vec![0_u8; FILE_HEADER_SIZE as usize];
    // Reverse order so the orderer has real work to do.
    for timestamp in (0..frames).rev() {
        bytes.extend(compressed_record(timestamp));
    }
    bytes
}

fn benchmark_split(criterion: &mut Criterion) {
    let container = synthetic_container(200);

    let mut group = criterion.benchmark_group("split");
    group.throughput(Throughput::Bytes(container.len() as u64));
    group.bench_function("split 200 records", |bencher| {
        bencher.iter(|| {
            let mut reader = Cursor::new(&container);
            reader.set_position(FILE_HEADER_SIZE);
            split_frames(reader)
        });
    });
    group.finish();
}

fn benchmark_decode(criterion: &mut Criterion) {
    let container = synthetic_container(200);
    let mut reader = Cursor::new(&container);
    reader.set_position(FILE_HEADER_SIZE);
    let records = split_frames(reader);

    let mut group = criterion.benchmark_group("decode");
    group.throughput(Throughput::Elements(records.len() as u64));
    for threads in [1_usize, 2, 4, 8] {
        let decoder = BatchDecoder::new(&ExportOptions::new().with_threads(threads)).unwrap();
        group.bench_with_input(
            BenchmarkId::new("decode and order 200 frames", threads),
            &records,
            |bencher, records| {
                bencher.iter(|| order_report(decoder.decode_records(records.clone(), "bench")));
            },
        );
    }
    group.finish();
}

criterion::criterion_group!(benches, benchmark_split, benchmark_decode);
criterion::criterion_main!(benches);
