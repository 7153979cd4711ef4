//! Parallel frame decoding.
//!
//! [`BatchDecoder`] owns a bounded rayon pool and decodes every record of a
//! container on it. Records are decoded in whatever order the workers pick
//! them up; the resulting [`DecodeReport`] is an unordered set and must go
//! through [`order_frames`](crate::order_frames) before anything depends on
//! frame order. Files are processed one after another, frames within a file
//! concurrently.

use std::path::Path;

use rayon::iter::{Either, IntoParallelIterator, ParallelIterator};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::configuration::ExportOptions;
use crate::container::open_container;
use crate::decoder::decode_record;
use crate::error::{CamrollError, FrameDropReason};
use crate::frame::DecodedFrame;
use crate::progress::{OperationType, ProgressTracker};
use crate::splitter::{FrameSplitter, RawFrame};

/// A frame record that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFrame {
    /// Label of the container the record came from (its file name).
    pub container: String,
    /// Record position within that container.
    pub index: usize,
    /// Why it was dropped.
    pub reason: FrameDropReason,
}

/// The outcome of decoding one or more containers.
#[derive(Debug, Clone, Default)]
pub struct DecodeReport {
    /// Successfully decoded frames, in no particular order.
    pub frames: Vec<DecodedFrame>,
    /// Records that were split out but failed to decode.
    pub dropped: Vec<DroppedFrame>,
    /// Total records split out of the inputs.
    pub records: usize,
}

impl DecodeReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: DecodeReport) {
        self.frames.extend(other.frames);
        self.dropped.extend(other.dropped);
        self.records += other.records;
    }

    /// `true` when no record decoded.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Decodes containers on a bounded worker pool.
pub struct BatchDecoder {
    pool: ThreadPool,
    options: ExportOptions,
}

impl BatchDecoder {
    /// Build a decoder with `options.worker_count()` workers.
    ///
    /// # Errors
    ///
    /// Returns [`CamrollError::ThreadPool`] if the pool cannot be spawned.
    pub fn new(options: &ExportOptions) -> Result<Self, CamrollError> {
        let workers = options.worker_count();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("camroll-decode-{index}"))
            .build()
            .map_err(|error| CamrollError::ThreadPool(error.to_string()))?;
        log::debug!("Decode pool ready with {workers} workers");
        Ok(Self {
            pool,
            options: options.clone(),
        })
    }

    /// Number of workers in the pool.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Split and decode one container file.
    ///
    /// # Errors
    ///
    /// Returns [`CamrollError::ContainerOpen`] if the file cannot be opened.
    /// Per-frame failures end up in [`DecodeReport::dropped`] instead.
    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> Result<DecodeReport, CamrollError> {
        let path = path.as_ref();
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.pool.install(|| {
            let reader = open_container(path)?;
            let records: Vec<RawFrame> = FrameSplitter::new(reader).collect();
            Ok(self.decode_records(records, &label))
        })
    }

    /// Decode several container files into one merged, unordered report.
    ///
    /// # Errors
    ///
    /// Stops at the first file that cannot be opened.
    pub fn decode_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<DecodeReport, CamrollError> {
        let mut report = DecodeReport::default();
        for path in paths {
            report.merge(self.decode_file(path)?);
        }
        Ok(report)
    }

    /// Decode already-split records concurrently.
    pub fn decode_records(&self, records: Vec<RawFrame>, label: &str) -> DecodeReport {
        let total = records.len();
        log::debug!("Decoding {total} frame records from {label}");

        let tracker = ProgressTracker::new(
            self.options.progress.clone(),
            OperationType::ContainerDecode,
            label,
            total as u64,
            self.options.batch_size,
        );

        let (frames, dropped): (Vec<DecodedFrame>, Vec<DroppedFrame>) = self.pool.install(|| {
            records.into_par_iter().partition_map(|raw| {
                let outcome = decode_record(&raw.bytes);
                tracker.advance();
                match outcome {
                    Ok(frame) => Either::Left(frame),
                    Err(reason) => {
                        if reason == FrameDropReason::Empty {
                            log::debug!("Record {} of {label} is empty", raw.index);
                        } else {
                            log::warn!("Dropping record {} of {label}: {reason}", raw.index);
                        }
                        Either::Right(DroppedFrame {
                            container: label.to_string(),
                            index: raw.index,
                            reason,
                        })
                    }
                }
            })
        });
        tracker.finish();

        let unverified = frames
            .iter()
            .filter(|frame| !frame.layout.is_verified())
            .count();
        if unverified > 0 {
            log::warn!(
                "{unverified} frames in {label} are multi-channel; that layout is best-effort and unverified",
            );
        }

        DecodeReport {
            frames,
            dropped,
            records: total,
        }
    }
}
