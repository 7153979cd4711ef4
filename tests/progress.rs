//! Progress reporting integration tests.

mod common;

use std::sync::{Arc, Mutex};

use camroll::{
    DecodedFrame, ExportOptions, OperationType, PixelLayout, ProgressCallback, ProgressFn,
    ProgressInfo, decode_container, export_images,
};
use common::{gray_record, write_container};
use image::ImageFormat;

#[derive(Default)]
struct Recorder {
    infos: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for Recorder {
    fn on_progress(&self, info: &ProgressInfo) {
        self.infos.lock().unwrap().push(info.clone());
    }
}

#[test]
fn closure_receives_completed_total_and_label() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_container(
        dir.path(),
        "LHPG-42.bin",
        &[gray_record(1, 2, 2), gray_record(2, 2, 2)],
    );

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let options = ExportOptions::new().with_progress(Arc::new(ProgressFn(
        move |completed: u64, total: u64, label: &str| {
            sink.lock().unwrap().push((completed, total, label.to_string()));
        },
    )));
    decode_container(&path, &options).expect("decode");

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|(_, total, label)| *total == 2 && label == "LHPG-42.bin"));
    assert_eq!(seen.last().map(|entry| entry.0), Some(2));
}

#[test]
fn batch_size_limits_callback_frequency() {
    let dir = tempfile::tempdir().expect("tempdir");
    let records: Vec<Vec<u8>> = (0..10).map(|ts| gray_record(ts, 2, 2)).collect();
    let path = write_container(dir.path(), "LHPG-1.bin", &records);

    let recorder = Arc::new(Recorder::default());
    let options = ExportOptions::new()
        .with_progress(recorder.clone())
        .with_batch_size(5);
    decode_container(&path, &options).expect("decode");

    // Reports at 5 and 10, plus the final one.
    let infos = recorder.infos.lock().unwrap();
    assert_eq!(infos.len(), 3);
    let last = infos.last().expect("final report");
    assert_eq!(last.current, 10);
    assert!((last.percentage - 100.0).abs() < f32::EPSILON);
    assert_eq!(last.estimated_remaining, Some(std::time::Duration::ZERO));
}

#[test]
fn image_export_reports_its_own_operation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let frames: Vec<DecodedFrame> = (0..3)
        .map(|ts| {
            DecodedFrame::from_pixels(ts, 2, 2, PixelLayout::Grayscale, &[0; 4]).expect("frame")
        })
        .collect();

    let recorder = Arc::new(Recorder::default());
    let options = ExportOptions::new()
        .with_progress(recorder.clone())
        .with_image_format(ImageFormat::Png);
    export_images(&frames, dir.path(), &options).expect("export");

    let infos = recorder.infos.lock().unwrap();
    assert!(infos.iter().all(|info| info.operation == OperationType::ImageExport));
    assert_eq!(infos.last().map(|info| (info.current, info.total)), Some((3, 3)));
}

#[test]
fn empty_operation_reports_zero_of_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_container(dir.path(), "LHPG-1.bin", &[]);

    let recorder = Arc::new(Recorder::default());
    let options = ExportOptions::new().with_progress(recorder.clone());
    decode_container(&path, &options).expect("decode");

    let infos = recorder.infos.lock().unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!((infos[0].current, infos[0].total), (0, 0));
}
