//! Container files on disk.
//!
//! A container starts with a 32-byte file header that carries nothing the
//! decoder needs, followed by length-prefixed frame records (see
//! [`splitter`](crate::splitter)). The camera names its recordings
//! `<prefix>-<unix_timestamp>.<ext>`, e.g. `LHPG-1730122064.bin`; that name is
//! only used to label derived outputs.
//!
//! # Example
//!
//! ```
//! use camroll::ContainerName;
//!
//! let name = ContainerName::parse("LHPG-1730122064.bin")?;
//! assert_eq!(name.prefix, "LHPG");
//! assert_eq!(name.unix_timestamp, 1_730_122_064);
//! # Ok::<(), camroll::CamrollError>(())
//! ```

use std::fmt::Write;
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::error::CamrollError;

/// Size of the fixed file header that precedes the first frame record.
pub const FILE_HEADER_SIZE: u64 = 32;

/// Open a container and position the reader just past its file header.
///
/// A file shorter than the header is not an error; it simply yields no
/// frames.
///
/// # Errors
///
/// Returns [`CamrollError::ContainerOpen`] if the file cannot be opened or
/// seeked.
pub fn open_container<P: AsRef<Path>>(path: P) -> Result<BufReader<File>, CamrollError> {
    let path = path.as_ref();
    log::debug!("Opening container file: {}", path.display());

    let open_error = |error: std::io::Error| CamrollError::ContainerOpen {
        path: path.to_path_buf(),
        reason: error.to_string(),
    };

    let file = File::open(path).map_err(open_error)?;
    let mut reader = BufReader::new(file);
    reader
        .seek(SeekFrom::Start(FILE_HEADER_SIZE))
        .map_err(open_error)?;
    Ok(reader)
}

/// The parts of a `<prefix>-<unix_timestamp>.<ext>` file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerName {
    /// Everything before the last `-` of the stem.
    pub prefix: String,
    /// Recording start, in seconds since the Unix epoch.
    pub unix_timestamp: i64,
    /// Extension without the dot, empty if there was none.
    pub extension: String,
}

impl ContainerName {
    /// Parse a bare file name.
    ///
    /// The stem ends at the first `.`; the timestamp is the field after the
    /// last `-` of the stem.
    ///
    /// # Errors
    ///
    /// Returns [`CamrollError::InvalidContainerName`] if there is no `-` or
    /// the trailing field is not an integer.
    pub fn parse(file_name: &str) -> Result<Self, CamrollError> {
        let invalid = |reason: &str| CamrollError::InvalidContainerName {
            name: file_name.to_string(),
            reason: reason.to_string(),
        };

        let (stem, extension) = match file_name.split_once('.') {
            Some((stem, extension)) => (stem, extension),
            None => (file_name, ""),
        };

        let (prefix, timestamp) = stem
            .rsplit_once('-')
            .ok_or_else(|| invalid("missing '-' before the timestamp"))?;

        let unix_timestamp = timestamp
            .parse::<i64>()
            .map_err(|_| invalid("timestamp field is not an integer"))?;

        Ok(Self {
            prefix: prefix.to_string(),
            unix_timestamp,
            extension: extension.to_string(),
        })
    }

    /// Parse the file-name component of a path.
    ///
    /// # Errors
    ///
    /// Returns [`CamrollError::InvalidContainerName`] if the path has no
    /// UTF-8 file name or the name does not parse.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CamrollError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| CamrollError::InvalidContainerName {
                name: path.display().to_string(),
                reason: "path has no UTF-8 file name".to_string(),
            })?;
        Self::parse(file_name)
    }

    /// Recording start as UTC.
    pub fn datetime_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.unix_timestamp, 0)
    }

    /// Recording start in the host's local time zone.
    pub fn datetime_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_opt(self.unix_timestamp, 0).single()
    }

    /// Format the local recording start with a `strftime`-style pattern.
    ///
    /// # Errors
    ///
    /// Returns [`CamrollError::InvalidContainerName`] if the timestamp is out
    /// of the representable range, or [`CamrollError::InvalidDatetimeFormat`]
    /// if `pattern` contains an unknown specifier.
    pub fn format_local(&self, pattern: &str) -> Result<String, CamrollError> {
        let datetime = self
            .datetime_local()
            .ok_or_else(|| CamrollError::InvalidContainerName {
                name: format!("{}-{}", self.prefix, self.unix_timestamp),
                reason: "timestamp is out of range".to_string(),
            })?;

        // `DelayedFormat` fails on unknown specifiers.
        let mut formatted = String::new();
        write!(formatted, "{}", datetime.format(pattern)).map_err(|_| {
            CamrollError::InvalidDatetimeFormat {
                pattern: pattern.to_string(),
            }
        })?;
        Ok(formatted)
    }
}
