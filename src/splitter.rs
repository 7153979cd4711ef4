//! Frame record splitting.
//!
//! After the file header, a container is a run of frame records:
//!
//! ```text
//! [u32 LE length][compressed payload: length bytes][u32 LE length][...]
//! ```
//!
//! [`FrameSplitter`] walks that run lazily and yields each record as one
//! [`RawFrame`]. It never looks inside the payload. The run ends at end of
//! file, at a zero length, or at a payload shorter than its prefix claims;
//! a truncated tail is end-of-stream, not an error.
//!
//! # Example
//!
//! ```no_run
//! use camroll::{FrameSplitter, open_container};
//!
//! let reader = open_container("LHPG-1730122064.bin")?;
//! for raw in FrameSplitter::new(reader) {
//!     println!("record {} is {} bytes", raw.index, raw.payload().len());
//! }
//! # Ok::<(), camroll::CamrollError>(())
//! ```

use std::io::{ErrorKind, Read};

/// Width of the little-endian length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// One undecoded frame record: the length prefix followed by its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Position of the record within its container, starting at 0.
    pub index: usize,
    /// Prefix and payload bytes, exactly as stored.
    pub bytes: Vec<u8>,
}

impl RawFrame {
    /// The compressed payload without the length prefix.
    pub fn payload(&self) -> &[u8] {
        self.bytes.get(LENGTH_PREFIX_SIZE..).unwrap_or_default()
    }
}

/// A lazy iterator over the frame records of a container.
///
/// The reader should already be positioned after the file header, as
/// returned by [`open_container`](crate::open_container).
pub struct FrameSplitter<R> {
    reader: R,
    next_index: usize,
    done: bool,
}

impl<R: Read> FrameSplitter<R> {
    /// Wrap a reader positioned at the first frame record.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            next_index: 0,
            done: false,
        }
    }

    fn read_length(&mut self) -> Option<u32> {
        let mut prefix = [0_u8; LENGTH_PREFIX_SIZE];
        match self.reader.read_exact(&mut prefix) {
            Ok(()) => Some(u32::from_le_bytes(prefix)),
            Err(error) if error.kind() == ErrorKind::UnexpectedEof => None,
            Err(error) => {
                log::error!(
                    "Failed to read length prefix of record {}: {error}; treating as end of stream",
                    self.next_index,
                );
                None
            }
        }
    }
}

impl<R: Read> Iterator for FrameSplitter<R> {
    type Item = RawFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let length = match self.read_length() {
            Some(0) | None => {
                self.done = true;
                return None;
            }
            Some(length) => length,
        };

        let mut bytes = Vec::with_capacity(LENGTH_PREFIX_SIZE);
        bytes.extend_from_slice(&length.to_le_bytes());

        // `take` keeps a garbage length from forcing a huge allocation up front.
        let read = match (&mut self.reader)
            .take(u64::from(length))
            .read_to_end(&mut bytes)
        {
            Ok(read) => read,
            Err(error) => {
                log::error!(
                    "Failed to read payload of record {}: {error}; treating as end of stream",
                    self.next_index,
                );
                self.done = true;
                return None;
            }
        };

        if read < length as usize {
            log::debug!(
                "Record {} is truncated ({read} of {length} bytes); stopping",
                self.next_index,
            );
            self.done = true;
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;
        Some(RawFrame { index, bytes })
    }
}

/// Collect every record of a reader into memory.
pub fn split_frames<R: Read>(reader: R) -> Vec<RawFrame> {
    FrameSplitter::new(reader).collect()
}
