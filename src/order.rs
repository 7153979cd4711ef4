//! Frame ordering.
//!
//! Camera files are processed in file-name order, but the embedded frame
//! timestamps are the only reliable ordering signal, inside a file and across
//! files. [`order_frames`] merges decode results into one ascending sequence.
//! Frames with equal timestamps may come out in either relative order; the
//! format offers no secondary key.

use crate::batch::DecodeReport;
use crate::frame::DecodedFrame;

/// Merge any number of unordered frame sets into one sequence sorted by
/// ascending timestamp.
pub fn order_frames<I>(sets: I) -> Vec<DecodedFrame>
where
    I: IntoIterator<Item = Vec<DecodedFrame>>,
{
    let mut frames: Vec<DecodedFrame> = sets.into_iter().flatten().collect();
    frames.sort_unstable_by_key(|frame| frame.timestamp);
    frames
}

/// Take the frames out of a report in timestamp order.
pub fn order_report(report: DecodeReport) -> Vec<DecodedFrame> {
    order_frames([report.frames])
}

/// `true` if timestamps never decrease along the slice.
pub fn is_time_ordered(frames: &[DecodedFrame]) -> bool {
    frames
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp)
}
